//! One console panel: the loaded rows of an entity, its search box, the
//! create/edit modal and the delete confirmation.
//!
//! Mutations run in three steps so a shell can keep working with the loaded
//! rows while a request is outstanding:
//!
//! ```ignore
//! let request = panel.prepare_submit()?;   // validates, marks in flight
//! let outcome = request.execute().await;    // talks to the store only
//! panel.complete_save(outcome)?;            // applies the result
//! ```
//!
//! [`Panel::submit`] and [`Panel::delete_confirmed`] chain the steps.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::core::{ID_COLUMN, PanelError, Record, RecordId, StoreResult, Value};
use crate::form::{Draft, FormView, render_form};
use crate::list::ListView;
use crate::loader::RecordSet;
use crate::resolver::{FkOptions, resolve_all};
use crate::schema::EntitySchema;
use crate::storage::{Projection, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Idle,
    Loading,
    Loaded,
}

/// The open form, if any. At most one exists per panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Creating(Draft),
    Editing { original: Record, draft: Draft },
}

impl Modal {
    pub fn draft(&self) -> &Draft {
        match self {
            Modal::Creating(draft) | Modal::Editing { draft, .. } => draft,
        }
    }

    fn draft_mut(&mut self) -> &mut Draft {
        match self {
            Modal::Creating(draft) | Modal::Editing { draft, .. } => draft,
        }
    }
}

/// Holds the panel's single mutation slot. Dropping it, with or without
/// completing the request, frees the slot.
#[derive(Debug)]
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(slot: &Arc<AtomicBool>) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(slot)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A validated insert or update, detached from the panel.
pub struct SaveRequest {
    store: Arc<dyn Store>,
    collection: String,
    projection: Option<Projection>,
    id: Option<RecordId>,
    payload: Record,
    form: u64,
    slot: InFlight,
}

impl SaveRequest {
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    pub fn payload(&self) -> &Record {
        &self.payload
    }

    pub async fn execute(self) -> SaveOutcome {
        let result = match &self.id {
            Some(id) => {
                self.store
                    .update(&self.collection, id, self.payload, self.projection.as_ref())
                    .await
            }
            None => {
                self.store
                    .insert(&self.collection, self.payload, self.projection.as_ref())
                    .await
            }
        };
        SaveOutcome {
            id: self.id,
            result,
            form: self.form,
            _slot: self.slot,
        }
    }
}

pub struct SaveOutcome {
    id: Option<RecordId>,
    result: StoreResult<Record>,
    form: u64,
    _slot: InFlight,
}

pub struct DeleteRequest {
    store: Arc<dyn Store>,
    collection: String,
    id: RecordId,
    slot: InFlight,
}

impl DeleteRequest {
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub async fn execute(self) -> DeleteOutcome {
        let result = self.store.delete(&self.collection, &self.id).await;
        DeleteOutcome {
            id: self.id,
            result,
            _slot: self.slot,
        }
    }
}

pub struct DeleteOutcome {
    id: RecordId,
    result: StoreResult<()>,
    _slot: InFlight,
}

pub struct Panel {
    schema: Arc<EntitySchema>,
    store: Arc<dyn Store>,
    phase: PanelPhase,
    records: RecordSet,
    fk_options: FkOptions,
    resolution_failures: Vec<PanelError>,
    query: String,
    modal: Option<Modal>,
    /// Bumped whenever a form is opened or closed.
    form: u64,
    pending_delete: Option<RecordId>,
    in_flight: Arc<AtomicBool>,
    error: Option<PanelError>,
}

impl Panel {
    pub fn new(schema: Arc<EntitySchema>, store: Arc<dyn Store>) -> Self {
        Self {
            schema,
            store,
            phase: PanelPhase::Idle,
            records: RecordSet::default(),
            fk_options: FkOptions::new(),
            resolution_failures: Vec::new(),
            query: String::new(),
            modal: None,
            form: 0,
            pending_delete: None,
            in_flight: Arc::new(AtomicBool::new(false)),
            error: None,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn fk_options(&self) -> &FkOptions {
        &self.fk_options
    }

    /// Per-field option lookups that failed during the last mount or refresh.
    pub fn resolution_failures(&self) -> &[PanelError] {
        &self.resolution_failures
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.modal.as_ref().map(Modal::draft)
    }

    pub fn pending_delete(&self) -> Option<&RecordId> {
        self.pending_delete.as_ref()
    }

    /// `true` while a save or delete request is alive.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The last surfaced error; kept until the next user action.
    pub fn error(&self) -> Option<&PanelError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Loads the rows and resolves foreign-key options side by side. A load
    /// failure still ends in `Loaded`, with no rows and the error surfaced.
    pub async fn mount(&mut self) {
        self.phase = PanelPhase::Loading;
        self.error = None;

        let store = self.store.as_ref();
        let (loaded, resolution) = futures::join!(
            RecordSet::load(store, &self.schema),
            resolve_all(store, &self.schema)
        );

        match loaded {
            Ok(set) => {
                debug!(
                    "panel '{}' loaded {} rows",
                    self.schema.title(),
                    set.len()
                );
                self.records = set;
            }
            Err(source) => {
                self.records.clear();
                self.fail(PanelError::Load {
                    entity: self.schema.title().to_string(),
                    source,
                });
            }
        }
        self.fk_options = resolution.options;
        self.resolution_failures = resolution.failures;
        self.phase = PanelPhase::Loaded;
    }

    /// Re-runs the row load and every option lookup.
    pub async fn refresh(&mut self) {
        self.mount().await;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Loaded rows matching the current query, in loaded order.
    pub fn visible_rows(&self) -> Vec<&Record> {
        self.records.filter(&self.schema, &self.query)
    }

    pub fn open_create(&mut self) {
        self.error = None;
        self.set_modal(Some(Modal::Creating(Draft::new(&self.schema))));
    }

    pub fn open_edit(&mut self, id: &RecordId) -> Result<(), PanelError> {
        self.error = None;
        let original = self
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| PanelError::UnknownRow(id.clone()))?;
        let draft = Draft::from_record(&self.schema, &original);
        self.set_modal(Some(Modal::Editing { original, draft }));
        Ok(())
    }

    /// Closes the modal and discards the draft.
    pub fn cancel(&mut self) {
        self.set_modal(None);
    }

    fn set_modal(&mut self, modal: Option<Modal>) {
        self.form = self.form.wrapping_add(1);
        self.modal = modal;
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.modal.as_mut().map(Modal::draft_mut)
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<Value>) -> Result<(), PanelError> {
        let draft = self.draft_mut().ok_or(PanelError::NoModal)?;
        draft.set(key, value)?;
        Ok(())
    }

    /// Validates the open draft and detaches the request that saves it.
    pub fn prepare_submit(&mut self) -> Result<SaveRequest, PanelError> {
        if self.is_busy() {
            return Err(PanelError::Busy);
        }
        let draft = self.draft().ok_or(PanelError::NoModal)?;
        let id = draft.id().cloned();
        let payload = match draft.build_payload(&self.schema) {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail(err.into())),
        };

        let slot = InFlight::acquire(&self.in_flight).ok_or(PanelError::Busy)?;
        self.error = None;
        Ok(SaveRequest {
            store: Arc::clone(&self.store),
            collection: self.schema.collection().to_string(),
            projection: self.schema.projection().cloned(),
            id,
            payload,
            form: self.form,
            slot,
        })
    }

    /// Applies a finished save. The modal closes only if it still holds the
    /// form that was submitted; on failure the draft stays open untouched.
    pub fn complete_save(&mut self, outcome: SaveOutcome) -> Result<Record, PanelError> {
        let SaveOutcome {
            id, result, form, ..
        } = outcome;
        match result {
            Ok(row) => {
                if id.is_some() {
                    if !self.records.replace(row.clone()) {
                        debug!("updated row is no longer loaded; leaving the set as is");
                    }
                } else {
                    self.records.prepend(row.clone());
                }
                debug!(
                    "saved '{}' row {}",
                    self.schema.collection(),
                    row.value(ID_COLUMN)
                );
                if self.form == form {
                    self.set_modal(None);
                } else {
                    debug!("form changed while saving; leaving the open modal");
                }
                Ok(row)
            }
            Err(source) => Err(self.fail(PanelError::Save {
                entity: self.schema.title().to_string(),
                source,
            })),
        }
    }

    pub async fn submit(&mut self) -> Result<Record, PanelError> {
        let request = self.prepare_submit()?;
        let outcome = request.execute().await;
        self.complete_save(outcome)
    }

    /// Asks for confirmation before deleting `id`. Returns the prompt.
    pub fn request_delete(&mut self, id: &RecordId) -> Result<String, PanelError> {
        self.error = None;
        if self.records.get(id).is_none() {
            return Err(PanelError::UnknownRow(id.clone()));
        }
        self.pending_delete = Some(id.clone());
        Ok(self.delete_prompt())
    }

    pub fn delete_prompt(&self) -> String {
        format!("Delete this {}?", self.schema.singular_noun())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Result<DeleteRequest, PanelError> {
        if self.pending_delete.is_none() {
            return Err(PanelError::NothingToConfirm);
        }
        let slot = InFlight::acquire(&self.in_flight).ok_or(PanelError::Busy)?;
        let id = self
            .pending_delete
            .take()
            .ok_or(PanelError::NothingToConfirm)?;
        Ok(DeleteRequest {
            store: Arc::clone(&self.store),
            collection: self.schema.collection().to_string(),
            id,
            slot,
        })
    }

    /// Applies a finished delete. On failure the row stays listed.
    pub fn complete_delete(&mut self, outcome: DeleteOutcome) -> Result<(), PanelError> {
        let DeleteOutcome { id, result, .. } = outcome;
        match result {
            Ok(()) => {
                self.records.remove(&id);
                debug!("deleted '{}' row {}", self.schema.collection(), id);
                Ok(())
            }
            Err(source) => Err(self.fail(PanelError::Delete { id, source })),
        }
    }

    pub async fn delete_confirmed(&mut self) -> Result<(), PanelError> {
        let request = self.confirm_delete()?;
        let outcome = request.execute().await;
        self.complete_delete(outcome)
    }

    /// The open form; submit is disabled while a request is in flight.
    pub fn form_view(&self) -> Option<FormView> {
        self.draft()
            .map(|draft| render_form(&self.schema, draft, &self.fk_options, self.is_busy()))
    }

    pub fn list_view(&self) -> ListView {
        ListView::render(&self.schema, self.visible_rows())
    }

    /// Message shown in place of an empty table.
    pub fn empty_message(&self) -> Option<String> {
        let noun = self.schema.title().to_lowercase();
        match self.phase {
            PanelPhase::Idle => None,
            PanelPhase::Loading => Some(format!("Loading {}…", noun)),
            PanelPhase::Loaded if !self.visible_rows().is_empty() => None,
            PanelPhase::Loaded if !self.query.is_empty() => {
                Some("No results for your search.".to_string())
            }
            PanelPhase::Loaded => Some(format!("No {} yet.", noun)),
        }
    }

    fn fail(&mut self, err: PanelError) -> PanelError {
        warn!("{}", err);
        self.error = Some(err.clone());
        err
    }
}
