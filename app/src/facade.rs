//! The invoice application facade
//!
//! `InvoiceApp` owns the editing session and the settings, and runs the
//! preview and export pipelines: snapshot, layout, render, and for export a
//! PDF written atomically into the export directory.

use crate::{AppError, Notification, Notifier, Result, TracingNotifier};
use chrono::{Local, NaiveDate};
use invoice_model::{
    default_invoice_number, export_file_name, DocumentMetadata, ItemId, InvoiceSession, LineItem,
    Totals, Unit,
};
use layout_engine::{LayoutEngine, Page};
use rand::Rng;
use render_model::{DocumentRenderer, HtmlPreviewRenderer};
use std::path::{Path, PathBuf};
use store::{save_export, InvoiceSettings, PdfDocumentRenderer, PdfExportOptions, SettingsManager};

pub struct InvoiceApp<N: Notifier = TracingNotifier> {
    session: InvoiceSession,
    settings: SettingsManager,
    notifier: N,
    export_dir: PathBuf,
    export_options: PdfExportOptions,
}

impl<N: Notifier> InvoiceApp<N> {
    /// Load settings from `app_data_dir` and start a new invoice dated today
    pub fn new(app_data_dir: impl AsRef<Path>, export_dir: impl Into<PathBuf>, notifier: N) -> Self {
        let mut settings = SettingsManager::new(app_data_dir);
        if let Err(e) = settings.load_sync() {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
        }
        let export_dir = export_dir.into();
        let session = new_session(settings.get(), Local::now().date_naive(), &mut rand::thread_rng());
        tracing::info!(
            invoice = %session.metadata().invoice_number,
            export_dir = %export_dir.display(),
            "invoice app started"
        );
        Self {
            session,
            settings,
            notifier,
            export_dir,
            export_options: PdfExportOptions::default(),
        }
    }

    pub fn with_export_options(mut self, options: PdfExportOptions) -> Self {
        self.export_options = options;
        self
    }

    pub fn session(&self) -> &InvoiceSession {
        &self.session
    }

    pub fn metadata_mut(&mut self) -> &mut DocumentMetadata {
        self.session.metadata_mut()
    }

    pub fn settings(&self) -> &InvoiceSettings {
        self.settings.get()
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Discard the current invoice and start a new one dated `date`
    pub fn new_invoice(&mut self, date: NaiveDate) {
        self.session = new_session(self.settings.get(), date, &mut rand::thread_rng());
        tracing::debug!(invoice = %self.session.metadata().invoice_number, "new invoice");
    }

    /// Save new settings and apply them to the invoice being edited
    pub fn update_settings(&mut self, settings: InvoiceSettings) -> Result<()> {
        self.settings.update_sync(settings)?;
        self.apply_settings();
        Ok(())
    }

    pub fn reset_settings(&mut self) -> Result<()> {
        self.settings.reset_sync()?;
        self.apply_settings();
        Ok(())
    }

    fn apply_settings(&mut self) {
        let settings = self.settings.get();
        self.session.set_defaults(settings.item_defaults());
        settings.apply_to(self.session.metadata_mut());
    }

    pub fn add_item(&mut self) -> ItemId {
        self.session.add_item()
    }

    /// Remove an item; removing the last one is refused with a message to
    /// the user and leaves the invoice unchanged
    pub fn remove_item(&mut self, id: ItemId) -> Result<LineItem> {
        self.session.remove_item(id).map_err(|e| self.report(AppError::from(e)))
    }

    pub fn set_description(&mut self, id: ItemId, description: impl Into<String>) -> Result<()> {
        Ok(self.session.set_description(id, description)?)
    }

    /// Returns the recomputed amount
    pub fn set_unit_rate(&mut self, id: ItemId, input: &str) -> Result<f64> {
        Ok(self.session.set_unit_rate(id, input)?)
    }

    /// Returns the recomputed amount
    pub fn set_quantity(&mut self, id: ItemId, input: &str) -> Result<f64> {
        Ok(self.session.set_quantity(id, input)?)
    }

    pub fn set_unit(&mut self, id: ItemId, unit: Unit) -> Result<()> {
        Ok(self.session.set_unit(id, unit)?)
    }

    /// Attach a logo; an unreadable image leaves the initials placeholder
    /// in place and tells the user
    pub fn attach_logo(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.session.attach_logo(bytes).map_err(|e| {
            self.notifier
                .notify(Notification::error("The logo could not be read; showing initials instead."));
            AppError::from(e)
        })
    }

    pub fn clear_logo(&mut self) {
        self.session.clear_logo();
    }

    pub fn totals(&self) -> Totals {
        self.session.totals()
    }

    fn layout_engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.settings.get().layout_config())
    }

    /// Lay out the current invoice
    pub fn layout(&self) -> Result<Vec<Page>> {
        let snapshot = self.session.snapshot();
        Ok(self.layout_engine().layout(&snapshot.items, &snapshot.metadata)?)
    }

    /// HTML markup of the current invoice, page for page as it will export
    pub fn preview_html(&self) -> Result<String> {
        let pages = self.layout()?;
        Ok(HtmlPreviewRenderer::default().render(&pages)?)
    }

    /// Export the current invoice as a PDF into the export directory and
    /// tell the user how it went
    pub fn export_pdf(&mut self) -> Result<PathBuf> {
        match self.write_pdf() {
            Ok(path) => {
                let file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::info!(path = %path.display(), "invoice exported");
                self.notifier.notify(Notification::success(format!("Invoice downloaded: {}", file)));
                Ok(path)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    fn write_pdf(&self) -> Result<PathBuf> {
        let snapshot = self.session.snapshot();
        let pages = self.layout_engine().layout(&snapshot.items, &snapshot.metadata)?;

        let metadata = &snapshot.metadata;
        let mut options = self
            .export_options
            .clone()
            .with_title(format!("Invoice {}", metadata.display_invoice_number()))
            .with_subject(format!("Invoice for {}", metadata.client.display_name()))
            .with_creation_date(metadata.issue_date);
        if !metadata.business.name.trim().is_empty() {
            options = options.with_author(metadata.business.name.clone());
        }

        let bytes = PdfDocumentRenderer::with_options(options).render(&pages)?;
        Ok(save_export(&self.export_dir, &export_file_name(metadata), &bytes)?)
    }

    fn report(&self, error: AppError) -> AppError {
        let message = match &error {
            AppError::Model(e) => e.to_string(),
            other => format!("Export failed: {}", other),
        };
        self.notifier.notify(Notification::error(message));
        error
    }
}

fn new_session<R: Rng + ?Sized>(settings: &InvoiceSettings, date: NaiveDate, rng: &mut R) -> InvoiceSession {
    let mut metadata = DocumentMetadata::new(default_invoice_number(date, rng), date);
    settings.apply_to(&mut metadata);
    InvoiceSession::new(metadata, settings.item_defaults())
}
