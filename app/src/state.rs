//! Application state management

use crate::{AppError, InvoiceApp, QueuedNotifier, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared state behind the UI commands: one invoice being edited plus the
/// queue of notifications the UI has not shown yet
pub struct AppState {
    pub invoice: Mutex<InvoiceApp<Arc<QueuedNotifier>>>,
    notifications: Arc<QueuedNotifier>,
}

impl AppState {
    /// Create the state, loading settings from `app_data_dir`
    pub fn new(app_data_dir: PathBuf, export_dir: PathBuf) -> Self {
        let notifications = Arc::new(QueuedNotifier::new());
        let invoice = InvoiceApp::new(app_data_dir, export_dir, Arc::clone(&notifications));
        Self {
            invoice: Mutex::new(invoice),
            notifications,
        }
    }

    /// Lock the invoice for a command
    pub fn lock(&self) -> Result<MutexGuard<'_, InvoiceApp<Arc<QueuedNotifier>>>> {
        self.invoice
            .lock()
            .map_err(|e| AppError::StatePoisoned(e.to_string()))
    }

    pub fn notifications(&self) -> &QueuedNotifier {
        &self.notifications
    }
}
