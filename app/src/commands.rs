//! UI commands for invoice editing, preview and export
//!
//! Each command locks the shared [`AppState`], performs one action and
//! returns a serializable result, with errors flattened to strings for the
//! UI. Outcomes the user should see as a toast are queued as notifications
//! and collected with [`take_notifications`].

use crate::{AppState, InvoiceApp, Notification, Notifier};
use chrono::{Local, NaiveDate};
use invoice_model::{format_money, BankDetails, BusinessProfile, ClientDetails, ItemId, LineItem, Unit};
use serde::{Deserialize, Serialize};
use store::InvoiceSettings;

// =============================================================================
// DTOs
// =============================================================================

/// One row of the item table as the editor shows it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDto {
    pub id: String,
    pub description: String,
    pub unit_rate: f64,
    pub quantity: f64,
    pub unit: Unit,
    /// Formatted with the currency symbol
    pub amount: String,
}

impl LineItemDto {
    fn from_item(item: &LineItem, currency_symbol: &str) -> Self {
        Self {
            id: item.id.to_string(),
            description: item.description.clone(),
            unit_rate: item.unit_rate(),
            quantity: item.quantity(),
            unit: item.unit,
            amount: format_money(currency_symbol, item.amount()),
        }
    }
}

/// The invoice being edited, with formatted totals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub display_date: String,
    pub due_terms: String,
    pub currency_symbol: String,
    pub currency_code: String,
    pub business: BusinessProfile,
    pub client: ClientDetails,
    pub bank: BankDetails,
    pub has_logo: bool,
    pub logo_initials: String,
    pub items: Vec<LineItemDto>,
    pub subtotal: String,
    pub total: String,
    pub balance_due: String,
}

impl<N: Notifier> From<&InvoiceApp<N>> for InvoiceDto {
    fn from(app: &InvoiceApp<N>) -> Self {
        let metadata = app.session().metadata();
        let symbol = metadata.currency_symbol.as_str();
        let totals = app.totals();
        Self {
            invoice_number: metadata.invoice_number.clone(),
            issue_date: metadata.issue_date,
            display_date: metadata.display_date(),
            due_terms: metadata.due_terms.clone(),
            currency_symbol: metadata.currency_symbol.clone(),
            currency_code: metadata.currency_code.clone(),
            business: metadata.business.clone(),
            client: metadata.client.clone(),
            bank: metadata.bank.clone(),
            has_logo: metadata.logo.is_some(),
            logo_initials: metadata.business.logo_initials(),
            items: app
                .session()
                .items()
                .iter()
                .map(|item| LineItemDto::from_item(item, symbol))
                .collect(),
            subtotal: format_money(symbol, totals.subtotal),
            total: format_money(symbol, totals.total),
            balance_due: format_money(symbol, totals.balance_due),
        }
    }
}

/// Field edits for one line item. Rate and quantity arrive as the raw text
/// of their input fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemUpdateDto {
    pub description: Option<String>,
    pub unit_rate: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<Unit>,
}

/// Invoice identity and client fields edited on the form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailsDto {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_terms: String,
    pub client: ClientDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResultDto {
    pub path: String,
    pub file_name: String,
}

fn parse_item_id(id: &str) -> Result<ItemId, String> {
    ItemId::parse(id).ok_or_else(|| format!("Invalid item id: {}", id))
}

// =============================================================================
// Invoice Commands
// =============================================================================

/// Get the invoice being edited
pub fn get_invoice(state: &AppState) -> Result<InvoiceDto, String> {
    let app = state.lock().map_err(|e| e.to_string())?;
    Ok(InvoiceDto::from(&*app))
}

/// Discard the current invoice and start a new one dated today
pub fn new_invoice(state: &AppState) -> Result<InvoiceDto, String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    app.new_invoice(Local::now().date_naive());
    Ok(InvoiceDto::from(&*app))
}

pub fn update_invoice_details(details: InvoiceDetailsDto, state: &AppState) -> Result<InvoiceDto, String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    let metadata = app.metadata_mut();
    metadata.invoice_number = details.invoice_number;
    metadata.issue_date = details.issue_date;
    metadata.due_terms = details.due_terms;
    metadata.client = details.client;
    Ok(InvoiceDto::from(&*app))
}

/// Append a line item with the default values
pub fn add_item(state: &AppState) -> Result<InvoiceDto, String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    app.add_item();
    Ok(InvoiceDto::from(&*app))
}

/// Remove a line item. The last remaining item cannot be removed.
pub fn remove_item(id: String, state: &AppState) -> Result<InvoiceDto, String> {
    let id = parse_item_id(&id)?;
    let mut app = state.lock().map_err(|e| e.to_string())?;
    app.remove_item(id).map_err(|e| e.to_string())?;
    Ok(InvoiceDto::from(&*app))
}

pub fn update_item(id: String, update: ItemUpdateDto, state: &AppState) -> Result<InvoiceDto, String> {
    let id = parse_item_id(&id)?;
    let mut app = state.lock().map_err(|e| e.to_string())?;
    if let Some(description) = update.description {
        app.set_description(id, description).map_err(|e| e.to_string())?;
    }
    if let Some(rate) = update.unit_rate {
        app.set_unit_rate(id, &rate).map_err(|e| e.to_string())?;
    }
    if let Some(quantity) = update.quantity {
        app.set_quantity(id, &quantity).map_err(|e| e.to_string())?;
    }
    if let Some(unit) = update.unit {
        app.set_unit(id, unit).map_err(|e| e.to_string())?;
    }
    Ok(InvoiceDto::from(&*app))
}

/// Attach a logo from the bytes of a JPEG or PNG file
pub fn attach_logo(bytes: Vec<u8>, state: &AppState) -> Result<InvoiceDto, String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    app.attach_logo(bytes).map_err(|e| e.to_string())?;
    Ok(InvoiceDto::from(&*app))
}

pub fn clear_logo(state: &AppState) -> Result<InvoiceDto, String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    app.clear_logo();
    Ok(InvoiceDto::from(&*app))
}

// =============================================================================
// Preview and Export Commands
// =============================================================================

/// HTML preview of every page
pub fn get_preview(state: &AppState) -> Result<String, String> {
    let app = state.lock().map_err(|e| e.to_string())?;
    app.preview_html().map_err(|e| e.to_string())
}

/// Export the invoice as a PDF into the export directory
pub fn export_pdf(state: &AppState) -> Result<ExportResultDto, String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    let path = app.export_pdf().map_err(|e| e.to_string())?;
    Ok(ExportResultDto {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.display().to_string(),
    })
}

/// Notifications queued since the last call, oldest first
pub fn take_notifications(state: &AppState) -> Vec<Notification> {
    state.notifications().drain()
}

// =============================================================================
// Settings Commands
// =============================================================================

/// Get current invoice settings
pub fn get_settings(state: &AppState) -> Result<InvoiceSettings, String> {
    let app = state.lock().map_err(|e| e.to_string())?;
    Ok(app.settings().clone())
}

/// Save invoice settings and apply them to the invoice being edited
pub fn update_settings(settings: InvoiceSettings, state: &AppState) -> Result<(), String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    app.update_settings(settings).map_err(|e| e.to_string())
}

/// Reset settings to defaults
pub fn reset_settings(state: &AppState) -> Result<InvoiceSettings, String> {
    let mut app = state.lock().map_err(|e| e.to_string())?;
    app.reset_settings().map_err(|e| e.to_string())?;
    Ok(app.settings().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state() -> (TempDir, TempDir, AppState) {
        let data = TempDir::new().unwrap();
        let exports = TempDir::new().unwrap();
        let state = AppState::new(data.path().to_path_buf(), exports.path().to_path_buf());
        (data, exports, state)
    }

    #[test]
    fn test_update_item_recomputes_amount() {
        let (_data, _exports, state) = state();
        let invoice = get_invoice(&state).unwrap();
        let id = invoice.items[0].id.clone();

        let update = ItemUpdateDto {
            unit_rate: Some("40".to_string()),
            quantity: Some("2.5".to_string()),
            unit: Some(Unit::Days),
            ..Default::default()
        };
        let invoice = update_item(id, update, &state).unwrap();
        assert_eq!(invoice.items[0].amount, "£100.00");
        assert_eq!(invoice.items[0].unit, Unit::Days);
        assert_eq!(invoice.total, "£100.00");
    }

    #[test]
    fn test_invalid_input_counts_as_zero() {
        let (_data, _exports, state) = state();
        let id = get_invoice(&state).unwrap().items[0].id.clone();
        let update = ItemUpdateDto {
            quantity: Some("abc".to_string()),
            ..Default::default()
        };
        let invoice = update_item(id, update, &state).unwrap();
        assert_eq!(invoice.items[0].quantity, 0.0);
        assert_eq!(invoice.balance_due, "£0.00");
    }

    #[test]
    fn test_remove_item_errors() {
        let (_data, _exports, state) = state();
        assert!(remove_item("not-an-id".to_string(), &state).is_err());

        let id = get_invoice(&state).unwrap().items[0].id.clone();
        let err = remove_item(id, &state).unwrap_err();
        assert_eq!(err, "You must have at least one item.");
        assert_eq!(take_notifications(&state).len(), 1);

        add_item(&state).unwrap();
        let id = get_invoice(&state).unwrap().items[0].id.clone();
        let invoice = remove_item(id, &state).unwrap();
        assert_eq!(invoice.items.len(), 1);
    }

    #[test]
    fn test_settings_round_trip_through_commands() {
        let (data, _exports, state) = state();
        let mut settings = get_settings(&state).unwrap();
        settings.business.name = "Jane Doe".to_string();
        update_settings(settings, &state).unwrap();

        assert_eq!(get_invoice(&state).unwrap().business.name, "Jane Doe");
        assert_eq!(get_invoice(&state).unwrap().logo_initials, "JD");
        assert!(data.path().join(store::SETTINGS_FILE_NAME).exists());

        let reset = reset_settings(&state).unwrap();
        assert_eq!(reset, InvoiceSettings::default());
    }

    #[test]
    fn test_export_command_reports_file_name() {
        let (_data, exports, state) = state();
        let mut details = {
            let invoice = get_invoice(&state).unwrap();
            InvoiceDetailsDto {
                invoice_number: "INV20261018".to_string(),
                issue_date: invoice.issue_date,
                due_terms: invoice.due_terms,
                client: invoice.client,
            }
        };
        details.client.name = "Acme  Widgets".to_string();
        update_invoice_details(details, &state).unwrap();

        let result = export_pdf(&state).unwrap();
        assert_eq!(result.file_name, "Invoice-INV20261018-Acme_Widgets.pdf");
        assert!(exports.path().join(&result.file_name).exists());

        let notes = take_notifications(&state);
        assert_eq!(notes, vec![Notification::success("Invoice downloaded: Invoice-INV20261018-Acme_Widgets.pdf")]);
    }
}
