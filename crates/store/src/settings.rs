//! Invoice settings management
//!
//! Settings seed every new invoice: who is billing, where payment goes, the
//! values a new line item starts with, and the page setup. They are kept as
//! pretty-printed JSON in the application data directory.

use crate::file_io::write_atomic;
use crate::Result;
use invoice_model::{BankDetails, BusinessProfile, DocumentMetadata, ItemDefaults, Unit};
use layout_engine::{LayoutConfig, PageSize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Main settings container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceSettings {
    pub business: BusinessProfile,
    pub bank: BankDetails,
    pub defaults: DefaultSettings,
    pub page: PageSettings,
}

/// Values used for new invoices and new line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultSettings {
    pub unit_rate: f64,
    pub quantity: f64,
    pub unit: Unit,
    pub currency_symbol: String,
    pub currency_code: String,
    pub due_terms: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            unit_rate: 25.0,
            quantity: 1.0,
            unit: Unit::Hours,
            currency_symbol: "£".to_string(),
            currency_code: "GBP".to_string(),
            due_terms: "On Receipt".to_string(),
        }
    }
}

/// Page setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSettings {
    pub size: PageSize,
    /// Uniform margin in millimetres
    pub margin_mm: f32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin_mm: 15.0,
        }
    }
}

impl InvoiceSettings {
    pub fn item_defaults(&self) -> ItemDefaults {
        ItemDefaults {
            unit_rate: self.defaults.unit_rate,
            quantity: self.defaults.quantity,
            unit: self.defaults.unit,
        }
    }

    /// Layout configuration for the configured page
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig::for_page(self.page.size).with_margin(self.page.margin_mm)
    }

    /// Copy the business, bank and currency settings into `metadata`
    pub fn apply_to(&self, metadata: &mut DocumentMetadata) {
        metadata.business = self.business.clone();
        metadata.bank = self.bank.clone();
        metadata.currency_symbol = self.defaults.currency_symbol.clone();
        metadata.currency_code = self.defaults.currency_code.clone();
        metadata.due_terms = self.defaults.due_terms.clone();
    }
}

/// Loads, saves and updates the settings file
pub struct SettingsManager {
    settings_path: PathBuf,
    current: InvoiceSettings,
}

impl SettingsManager {
    /// Manager for `settings.json` inside `app_data_dir`
    pub fn new(app_data_dir: impl AsRef<Path>) -> Self {
        Self {
            settings_path: app_data_dir.as_ref().join(SETTINGS_FILE_NAME),
            current: InvoiceSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk; a missing file gives the defaults, and so
    /// does a file that is not valid settings JSON
    pub fn load_sync(&mut self) -> Result<&InvoiceSettings> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<InvoiceSettings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(
                        path = %self.settings_path.display(),
                        "Failed to parse settings file, using defaults: {}",
                        e
                    );
                    InvoiceSettings::default()
                }
            }
        } else {
            InvoiceSettings::default()
        };
        Ok(&self.current)
    }

    pub fn save_sync(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.current)?;
        write_atomic(&self.settings_path, content.as_bytes())?;
        tracing::debug!(path = %self.settings_path.display(), "settings saved");
        Ok(())
    }

    pub fn get(&self) -> &InvoiceSettings {
        &self.current
    }

    pub fn update_sync(&mut self, settings: InvoiceSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    pub fn reset_sync(&mut self) -> Result<&InvoiceSettings> {
        self.current = InvoiceSettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}
