//! The vitals dashboard: record list, add-record form and last-reading summary.
//!
//! The dashboard owns its form state and modal visibility locally and talks
//! to storage only through an injected [`RecordStore`]. Store calls are made
//! one at a time and each is awaited before the next is issued.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{RecordId, VitalForm, VitalRecord};
use crate::storage::RecordStore;
use crate::view::Summary;

/// Presentation-layer state for the vitals screen.
#[derive(Debug)]
pub struct Dashboard {
    store: Box<dyn RecordStore>,
    /// Records as of the last refresh, newest first.
    records: Vec<VitalRecord>,
    form: VitalForm,
    form_open: bool,
}

impl Dashboard {
    /// Create a dashboard over `store`. Call [`start`](Self::start) before use.
    #[must_use]
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            store,
            records: Vec::new(),
            form: VitalForm::new(),
            form_open: false,
        }
    }

    /// Initialize the store and load the current records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be initialized or read.
    pub async fn start(&mut self) -> Result<()> {
        self.store.initialize().await?;
        self.refresh().await
    }

    /// Reload the record list from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn refresh(&mut self) -> Result<()> {
        self.records = self.store.list_all().await?;
        debug!(count = self.records.len(), "Loaded vital records");
        Ok(())
    }

    /// The store behind this dashboard.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Records as of the last refresh, newest first.
    #[must_use]
    pub fn records(&self) -> &[VitalRecord] {
        &self.records
    }

    /// The most recent record.
    #[must_use]
    pub fn last_record(&self) -> Option<&VitalRecord> {
        self.records.first()
    }

    /// Summary card for the most recent record.
    #[must_use]
    pub fn summary(&self, time_format: &str) -> Summary {
        Summary::of(self.last_record(), time_format)
    }

    /// Show the add-record form.
    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    /// Hide the add-record form, keeping whatever was typed.
    pub fn close_form(&mut self) {
        self.form_open = false;
    }

    /// Whether the add-record form is showing.
    #[must_use]
    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    /// The add-record form.
    #[must_use]
    pub fn form(&self) -> &VitalForm {
        &self.form
    }

    /// Mutable access to the add-record form fields.
    pub fn form_mut(&mut self) -> &mut VitalForm {
        &mut self.form
    }

    /// Save the form as a new record.
    ///
    /// Unparseable numbers are stored as absent rather than rejected. On
    /// success the list is reloaded, the form closed and its fields cleared.
    /// If the store is not initialized nothing changes and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn submit(&mut self) -> Result<Option<RecordId>> {
        let vitals = self.form.to_new_vitals();
        let Some(id) = self.store.insert(vitals).await? else {
            return Ok(None);
        };

        info!("Saved vital record {}", id);
        self.refresh().await?;
        self.form_open = false;
        self.form.clear();
        Ok(Some(id))
    }

    /// Delete a record and reload the list.
    ///
    /// Returns `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn delete(&mut self, id: RecordId) -> Result<bool> {
        let deleted = self.store.delete_by_id(id).await?;
        self.refresh().await?;
        Ok(deleted)
    }

    /// Delete a record that is expected to exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if nothing was removed, or an error
    /// if the store fails.
    pub async fn delete_existing(&mut self, id: RecordId) -> Result<()> {
        if self.delete(id).await? {
            Ok(())
        } else {
            Err(Error::RecordNotFound { id })
        }
    }
}
