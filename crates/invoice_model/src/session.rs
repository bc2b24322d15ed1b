//! The editing session
//!
//! An `InvoiceSession` owns the line items and metadata being edited. Layout
//! and export work from an immutable [`InvoiceSnapshot`] taken from it.

use crate::{
    parse_decimal, DocumentMetadata, ItemId, LineItem, LogoImage, ModelError, Result, Totals,
    TotalsCalculator, Unit,
};
use serde::{Deserialize, Serialize};

/// Values given to a newly added line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemDefaults {
    pub unit_rate: f64,
    pub quantity: f64,
    pub unit: Unit,
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self {
            unit_rate: 25.0,
            quantity: 1.0,
            unit: Unit::Hours,
        }
    }
}

impl ItemDefaults {
    fn new_item(&self) -> LineItem {
        LineItem::new("", self.unit_rate, self.quantity, self.unit)
    }
}

/// A point-in-time copy of the session contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSnapshot {
    pub items: Vec<LineItem>,
    pub metadata: DocumentMetadata,
}

impl InvoiceSnapshot {
    pub fn totals(&self) -> Totals {
        TotalsCalculator::summarize(&self.items)
    }
}

/// In-memory state of one invoice being edited
#[derive(Debug, Clone)]
pub struct InvoiceSession {
    items: Vec<LineItem>,
    metadata: DocumentMetadata,
    defaults: ItemDefaults,
}

impl InvoiceSession {
    /// Create a session holding a single default item
    pub fn new(metadata: DocumentMetadata, defaults: ItemDefaults) -> Self {
        let items = vec![defaults.new_item()];
        Self {
            items,
            metadata,
            defaults,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut DocumentMetadata {
        &mut self.metadata
    }

    pub fn defaults(&self) -> &ItemDefaults {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: ItemDefaults) {
        self.defaults = defaults;
    }

    /// Append a default item and return its id
    pub fn add_item(&mut self) -> ItemId {
        let item = self.defaults.new_item();
        let id = item.id;
        self.items.push(item);
        tracing::debug!(%id, count = self.items.len(), "line item added");
        id
    }

    /// Remove an item. The last remaining item cannot be removed.
    pub fn remove_item(&mut self, id: ItemId) -> Result<LineItem> {
        let index = self.index_of(id)?;
        if self.items.len() <= 1 {
            return Err(ModelError::LastItem);
        }
        let removed = self.items.remove(index);
        tracing::debug!(%id, count = self.items.len(), "line item removed");
        Ok(removed)
    }

    pub fn set_description(&mut self, id: ItemId, description: impl Into<String>) -> Result<()> {
        self.item_mut(id)?.description = description.into();
        Ok(())
    }

    /// Set the rate from raw user input; unparseable input becomes 0
    pub fn set_unit_rate(&mut self, id: ItemId, input: &str) -> Result<f64> {
        let item = self.item_mut(id)?;
        item.set_unit_rate(parse_decimal(input));
        Ok(item.amount())
    }

    /// Set the quantity from raw user input; unparseable input becomes 0
    pub fn set_quantity(&mut self, id: ItemId, input: &str) -> Result<f64> {
        let item = self.item_mut(id)?;
        item.set_quantity(parse_decimal(input));
        Ok(item.amount())
    }

    pub fn set_unit(&mut self, id: ItemId, unit: Unit) -> Result<()> {
        self.item_mut(id)?.unit = unit;
        Ok(())
    }

    /// Attach a logo from raw file bytes.
    ///
    /// On a decode failure the previous logo is dropped, so the document
    /// falls back to the initials placeholder, and the error is returned for
    /// reporting.
    pub fn attach_logo(&mut self, bytes: Vec<u8>) -> Result<()> {
        match LogoImage::decode(bytes) {
            Ok(logo) => {
                tracing::debug!(width = logo.width, height = logo.height, "logo attached");
                self.metadata.logo = Some(logo);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Logo could not be decoded, using placeholder: {}", e);
                self.metadata.logo = None;
                Err(e)
            }
        }
    }

    pub fn clear_logo(&mut self) {
        self.metadata.logo = None;
    }

    pub fn totals(&self) -> Totals {
        TotalsCalculator::summarize(&self.items)
    }

    pub fn snapshot(&self) -> InvoiceSnapshot {
        InvoiceSnapshot {
            items: self.items.clone(),
            metadata: self.metadata.clone(),
        }
    }

    fn index_of(&self, id: ItemId) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(ModelError::ItemNotFound(id))
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut LineItem> {
        let index = self.index_of(id)?;
        Ok(&mut self.items[index])
    }
}
