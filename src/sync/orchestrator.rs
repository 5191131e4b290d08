//! Sync orchestration
//!
//! [`DocSync`] drives one addon's documentation through the pipeline:
//!
//! ```text
//! validate_key ──► check key ──► download ──► (delay) ──► upload
//!    (worker thread, detached)                 (scheduler)
//! ```
//!
//! The key moves through `Unvalidated → Validating → Valid | Invalid`. Both
//! outcomes are final: a settled key is never sent to the service again. A
//! network failure during the check returns it to `Unvalidated` so a later
//! attempt can retry.
//!
//! Uploading requires a present, valid key, a host that has finished
//! accepting registrations, and the addon being registered with the host.
//! Each upload re-extracts the local records, reconciles them against the
//! last download and posts the survivors in one batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Span};

use super::client::DocsApi;
use super::error::{Precondition, SyncError, SyncResult};
use super::scheduler::{Scheduler, ThreadScheduler};
use crate::domain::{reconcile, Field, Record, RecordSet, ReconcileSummary, SyntaxCategory};
use crate::source::{extract_record, AddonIdentity, DefaultExtractor, FieldExtractor, SyntaxHost};
use crate::storage::{SyncConfig, WireConverter};

/// Validation state of the API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Unvalidated,
    Validating,
    Valid,
    Invalid,
}

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Delay between download and upload
    pub upload_delay: Duration,

    /// Categories extracted from the host
    pub categories: Vec<SyntaxCategory>,

    /// Leave out extracted records without a detected owner
    pub owned_only: bool,

    /// Rewrite registration patterns into their readable form
    pub friendly_patterns: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            upload_delay: config.upload_delay(),
            categories: config.categories.clone(),
            owned_only: config.owned_only,
            friendly_patterns: config.friendly_patterns,
        }
    }
}

/// What an upload would send
#[derive(Debug, Clone)]
pub struct UploadPlan {
    /// Records to post, in extraction order
    pub records: RecordSet,

    pub summary: ReconcileSummary,
}

/// Outcome of one upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReport {
    /// Records posted without a remote id
    pub added: usize,

    /// Records posted with a remote id
    pub edited: usize,

    /// Records left out because the published copy is identical
    pub unchanged: usize,

    /// When the batch was posted; `None` if there was nothing to send
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl UploadReport {
    fn for_plan(plan: &UploadPlan) -> Self {
        Self {
            added: plan.records.additions().count(),
            edited: plan.records.edits().count(),
            unchanged: plan.summary.unchanged,
            uploaded_at: None,
        }
    }

    /// Returns true if a batch was posted
    pub fn is_uploaded(&self) -> bool {
        self.uploaded_at.is_some()
    }
}

struct Inner {
    addon: AddonIdentity,
    key: Option<String>,
    settings: SyncSettings,
    api: Arc<dyn DocsApi>,
    host: Arc<dyn SyntaxHost>,
    scheduler: Arc<dyn Scheduler>,
    extractor: RwLock<Arc<dyn FieldExtractor>>,
    converter: WireConverter,
    state: Mutex<KeyState>,
    remote: Mutex<RecordSet>,
    manual: Mutex<Vec<Record>>,
    in_flight: AtomicBool,
}

/// Documentation sync for one addon
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct DocSync {
    inner: Arc<Inner>,
}

impl DocSync {
    /// Creates a sync with uploads scheduled on a [`ThreadScheduler`]
    pub fn new(
        addon: AddonIdentity,
        key: Option<String>,
        settings: SyncSettings,
        api: Arc<dyn DocsApi>,
        host: Arc<dyn SyntaxHost>,
    ) -> Self {
        let scheduler = Arc::new(ThreadScheduler::new(format!("docsync-upload-{}", addon.name)));
        Self::with_scheduler(addon, key, settings, api, host, scheduler)
    }

    /// Creates a sync that schedules uploads on `scheduler`
    pub fn with_scheduler(
        addon: AddonIdentity,
        key: Option<String>,
        settings: SyncSettings,
        api: Arc<dyn DocsApi>,
        host: Arc<dyn SyntaxHost>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let extractor: Arc<dyn FieldExtractor> = Arc::new(DefaultExtractor::new(
            addon.clone(),
            settings.friendly_patterns,
        ));
        let converter = WireConverter::new(addon.name.clone());

        Self {
            inner: Arc::new(Inner {
                addon,
                key,
                settings,
                api,
                host,
                scheduler,
                extractor: RwLock::new(extractor),
                converter,
                state: Mutex::new(KeyState::Unvalidated),
                remote: Mutex::new(RecordSet::new()),
                manual: Mutex::new(Vec::new()),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a sync and starts key validation in the background
    pub fn launch(
        addon: AddonIdentity,
        key: Option<String>,
        settings: SyncSettings,
        api: Arc<dyn DocsApi>,
        host: Arc<dyn SyntaxHost>,
    ) -> Self {
        let sync = Self::new(addon, key, settings, api, host);
        let _ = sync.validate_key();
        sync
    }

    pub fn addon(&self) -> &AddonIdentity {
        &self.inner.addon
    }

    pub fn has_key(&self) -> bool {
        self.inner.key.is_some()
    }

    pub fn key_state(&self) -> KeyState {
        *lock(&self.inner.state)
    }

    /// Number of records in the last download
    pub fn remote_count(&self) -> usize {
        lock(&self.inner.remote).len()
    }

    /// Replaces the extractor used for host sources
    pub fn set_extractor(&self, extractor: Arc<dyn FieldExtractor>) {
        let mut current = self
            .inner
            .extractor
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = extractor;
    }

    /// Adds a hand-written record to every later upload
    ///
    /// Refused without a key or when the record lacks a name or pattern. The
    /// owner defaults to this addon.
    pub fn add_syntax(&self, mut record: Record) -> bool {
        if self.inner.key.is_none() || !record.is_valid() {
            return false;
        }
        if !record.has(Field::OwnerAddon) {
            // Every category carries the owner field
            let _ = record.set(Field::OwnerAddon, self.inner.addon.name.clone());
        }
        lock(&self.inner.manual).push(record);
        true
    }

    /// Starts the background pipeline
    ///
    /// Does nothing without a key, while a validation is running, or once the
    /// key is settled. The returned handle may be dropped; the worker is
    /// detached.
    pub fn validate_key(&self) -> Option<JoinHandle<()>> {
        let _span = self.span().entered();

        if self.inner.key.is_none() {
            debug!("No API key found, documentation sync is disabled");
            return None;
        }

        {
            let mut state = lock(&self.inner.state);
            if matches!(
                *state,
                KeyState::Validating | KeyState::Valid | KeyState::Invalid
            ) {
                return None;
            }
            *state = KeyState::Validating;
        }

        info!("An API key was found, validating it");
        let worker = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("docsync-key-{}", self.inner.addon.name))
            .spawn(move || worker.run_background());

        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!(error = %err, "Failed to start key validation");
                *lock(&self.inner.state) = KeyState::Unvalidated;
                None
            }
        }
    }

    fn run_background(&self) {
        let _span = self.span().entered();

        match self.check_key() {
            Ok(true) => {}
            Ok(false) => return,
            Err(err) => return log_failure("key check", &err),
        }

        if let Err(err) = self.download() {
            return log_failure("download", &err);
        }

        let worker = self.clone();
        self.inner.scheduler.schedule(
            self.inner.settings.upload_delay,
            Box::new(move || {
                let _span = worker.span().entered();
                if let Err(err) = worker.upload() {
                    log_failure("upload", &err);
                }
            }),
        );
    }

    /// Checks the key against the service on the calling thread
    ///
    /// A key that is already `Valid` or `Invalid` answers from its state
    /// without a request.
    pub fn check_key(&self) -> SyncResult<bool> {
        let key = self.key()?;
        {
            let mut state = lock(&self.inner.state);
            match *state {
                KeyState::Valid => return Ok(true),
                KeyState::Invalid => return Ok(false),
                KeyState::Unvalidated | KeyState::Validating => {
                    *state = KeyState::Validating
                }
            }
        }

        match self.inner.api.check_key(key) {
            Ok(true) => {
                *lock(&self.inner.state) = KeyState::Valid;
                info!("The API key is valid, waiting for the host to finish loading");
                Ok(true)
            }
            Ok(false) => {
                *lock(&self.inner.state) = KeyState::Invalid;
                warn!("The API key was rejected, check the key on your addon page");
                Ok(false)
            }
            Err(err) => {
                *lock(&self.inner.state) = KeyState::Unvalidated;
                Err(err)
            }
        }
    }

    /// Replaces the remote set with the currently published records
    pub fn download(&self) -> SyncResult<usize> {
        let key = self.valid_key()?;

        let payloads = self.inner.api.addon_syntax(key, &self.inner.addon.name)?;
        let records = self.inner.converter.decode_all(&payloads);
        let count = records.len();
        if count < payloads.len() {
            debug!(skipped = payloads.len() - count, "Skipped undecodable payloads");
        }

        *lock(&self.inner.remote) = records;
        info!("A total of {} syntaxes were found on the docs site", count);
        Ok(count)
    }

    /// Computes the records an upload would send, without sending them
    pub fn plan(&self) -> SyncResult<UploadPlan> {
        let _flight = FlightGuard::acquire(&self.inner.in_flight)?;
        self.build_plan()
    }

    /// Posts every new or changed record in one batch
    pub fn upload(&self) -> SyncResult<UploadReport> {
        let _flight = FlightGuard::acquire(&self.inner.in_flight)?;
        let plan = self.build_plan()?;
        let mut report = UploadReport::for_plan(&plan);

        if plan.records.is_empty() {
            info!("Documentation is up to date, nothing to upload");
            return Ok(report);
        }

        let key = self.valid_key()?;
        let payloads = self.inner.converter.encode_all(&plan.records);
        self.inner.api.mass_create(key, &payloads)?;

        report.uploaded_at = Some(Utc::now());
        info!(
            "A total of {} syntaxes were added and {} edited",
            report.added, report.edited
        );
        Ok(report)
    }

    /// Check, download and upload on the calling thread
    pub fn run_cycle(&self) -> SyncResult<UploadReport> {
        let _span = self.span().entered();

        if !self.check_key()? {
            return Err(Precondition::InvalidKey.into());
        }
        self.download()?;
        self.upload()
    }

    fn build_plan(&self) -> SyncResult<UploadPlan> {
        self.ensure_ready()?;

        let mut records = self.local_records();
        let summary = {
            let remote = lock(&self.inner.remote);
            reconcile(&mut records, &remote)
        };

        debug!(
            added = summary.added,
            edited = summary.edited,
            unchanged = summary.unchanged,
            "Reconciled local records"
        );
        Ok(UploadPlan { records, summary })
    }

    /// Manual records followed by a fresh extraction from the host
    ///
    /// Runs no guards and touches no network.
    pub fn local_records(&self) -> RecordSet {
        let extractor = self
            .inner
            .extractor
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        let host = &self.inner.host;

        let mut records = RecordSet::from(lock(&self.inner.manual).clone());
        for &category in &self.inner.settings.categories {
            for source in host.sources(category) {
                let Some(record) = extract_record(extractor.as_ref(), &source, host.types())
                else {
                    continue;
                };

                if !record.is_valid() {
                    debug!(class = %source.class().class_name, "Skipping record without name or pattern");
                    continue;
                }
                if self.inner.settings.owned_only && !record.has(Field::OwnerAddon) {
                    debug!(class = %source.class().class_name, "Skipping record of another addon");
                    continue;
                }
                records.push(record);
            }
        }
        records
    }

    fn ensure_ready(&self) -> SyncResult<()> {
        self.valid_key()?;

        if self.inner.host.is_accepting_registrations() {
            return Err(Precondition::AcceptingRegistrations.into());
        }
        if !self.inner.host.is_registered_addon(&self.inner.addon.name) {
            return Err(Precondition::UnregisteredAddon.into());
        }
        Ok(())
    }

    fn key(&self) -> SyncResult<&str> {
        self.inner
            .key
            .as_deref()
            .ok_or(SyncError::Precondition(Precondition::MissingKey))
    }

    fn valid_key(&self) -> SyncResult<&str> {
        let key = self.key()?;
        if self.key_state() != KeyState::Valid {
            return Err(Precondition::InvalidKey.into());
        }
        Ok(key)
    }

    fn span(&self) -> Span {
        info_span!("docsync", addon = %self.inner.addon.name)
    }
}

/// Holds the single-flight flag for the duration of a plan or upload
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> SyncResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SyncError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn log_failure(stage: &str, err: &SyncError) {
    match err {
        e if e.is_network() => {
            warn!(stage, error = %e, "Couldn't reach the docs service, check your connection")
        }
        SyncError::Precondition(p) => warn!(stage, "Skipping {}: {}", stage, p),
        SyncError::Busy => debug!(stage, "Another sync pass is running"),
        e => error!(stage, error = %e, "Documentation {} failed", stage),
    }
}
