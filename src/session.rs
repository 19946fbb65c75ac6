//! Dissection session: ties file bytes, the active dissector and the
//! projected tree together.
//!
//! Every public operation runs to completion before returning. Dissection
//! failures never escape as errors: they leave the session with no tree and
//! the failure recorded in [`DissectionSession::last_error`]. Only caller
//! mistakes (an unknown dissector name, a bad plugin set) are returned as
//! `Err`.
//!
//! [`DissectionSession::dissect_in_background`] runs the same dissection on a
//! [`DissectionWorker`]; its result only lands through
//! [`DissectionSession::apply_background`] if nothing changed in between.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::DissectConfig;
use crate::core::{count_nodes, DisplayNode};
use crate::dissect::registry::DissectorRegistry;
use crate::dissect::{dissect_guarded, DissectorRef};
use crate::error::{DissectError, MalformedInputError, Result};
use crate::project::project;
use crate::sniff::{CombinedSniffer, MediaTypeSniffer};
use crate::span_trace;
use crate::worker::{BackgroundTree, DissectionWorker};

/// What a session operation did to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DissectionOutcome {
    /// No file is loaded; nothing to dissect.
    NoFile,
    /// No dissector is assigned; the tree is absent.
    Unassigned,
    /// The byte buffer is empty; the tree is absent.
    Empty,
    /// A fresh tree was computed.
    Dissected { nodes: usize },
    /// The dissector rejected the bytes; the tree is absent.
    Failed(MalformedInputError),
    /// Re-dissection was skipped because the change came from a tree edit.
    Suppressed,
}

/// Session state while a file is loaded.
#[derive(Clone)]
pub struct LoadedFileState {
    file_name: String,
    bytes: Bytes,
    dissector: Option<DissectorRef>,
    tree: Option<Vec<DisplayNode>>,
    last_error: Option<MalformedInputError>,
}

impl LoadedFileState {
    fn new(file_name: String, bytes: Bytes) -> Self {
        Self {
            file_name,
            bytes,
            dissector: None,
            tree: None,
            last_error: None,
        }
    }

    /// Recomputes the tree from the current bytes and dissector.
    fn redissect(&mut self) -> DissectionOutcome {
        self.tree = None;
        self.last_error = None;

        let Some(dissector) = self.dissector.clone() else {
            return DissectionOutcome::Unassigned;
        };
        if self.bytes.is_empty() {
            return DissectionOutcome::Empty;
        }

        let span = span_trace!(
            "dissect",
            dissector = %dissector.name(),
            file = %self.file_name,
            size = self.bytes.len()
        );
        let _guard = span.enter();

        match dissect_guarded(dissector.as_ref(), &self.bytes) {
            Ok(value) => {
                let nodes = project(&value);
                let count = count_nodes(&nodes);
                debug!(nodes = count, "Dissection projected");
                self.tree = Some(nodes);
                DissectionOutcome::Dissected { nodes: count }
            }
            Err(e) => {
                warn!(error = %e, "Dissection failed");
                self.last_error = Some(e.clone());
                DissectionOutcome::Failed(e)
            }
        }
    }
}

/// A finished background request, tagged with the session state it started from.
#[derive(Debug)]
pub struct BackgroundResult {
    epoch: u64,
    result: Result<BackgroundTree>,
}

/// Either nothing is loaded or a file is.
#[derive(Clone, Default)]
pub enum SessionState {
    #[default]
    NoFile,
    FileLoaded(LoadedFileState),
}

/// Orchestrates auto-selection, dissection and projection for one open file.
pub struct DissectionSession {
    registry: Arc<DissectorRegistry>,
    sniffer: Box<dyn MediaTypeSniffer>,
    state: SessionState,
    suppress_next: AtomicBool,
    worker: Arc<DissectionWorker>,
    // Bumped by every operation that makes an in-flight background result stale.
    epoch: u64,
}

impl DissectionSession {
    pub fn new(registry: Arc<DissectorRegistry>, sniffer: Box<dyn MediaTypeSniffer>) -> Self {
        Self::with_worker(registry, sniffer, DissectionWorker::default())
    }

    pub fn with_worker(
        registry: Arc<DissectorRegistry>,
        sniffer: Box<dyn MediaTypeSniffer>,
        worker: DissectionWorker,
    ) -> Self {
        Self {
            registry,
            sniffer,
            state: SessionState::NoFile,
            suppress_next: AtomicBool::new(false),
            worker: Arc::new(worker),
            epoch: 0,
        }
    }

    /// A session using the sniffer chain and worker described by `config`.
    pub fn from_config(registry: Arc<DissectorRegistry>, config: &DissectConfig) -> Self {
        Self::with_worker(
            registry,
            Box::new(CombinedSniffer::from_config(&config.sniff)),
            DissectionWorker::from_config(&config.worker),
        )
    }

    fn invalidate_background(&mut self) {
        self.epoch += 1;
        self.worker.cancel_current();
    }

    pub fn registry(&self) -> &Arc<DissectorRegistry> {
        &self.registry
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn loaded(&self) -> Option<&LoadedFileState> {
        match &self.state {
            SessionState::FileLoaded(loaded) => Some(loaded),
            SessionState::NoFile => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded().is_some()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.loaded().map(|l| l.file_name.as_str())
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        self.loaded().map(|l| &l.bytes)
    }

    pub fn active_dissector(&self) -> Option<&DissectorRef> {
        self.loaded().and_then(|l| l.dissector.as_ref())
    }

    pub fn active_dissector_name(&self) -> Option<&str> {
        self.active_dissector().map(|d| d.name())
    }

    /// The projected tree, absent when unassigned, empty or failed.
    pub fn tree(&self) -> Option<&[DisplayNode]> {
        self.loaded().and_then(|l| l.tree.as_deref())
    }

    pub fn last_error(&self) -> Option<&MalformedInputError> {
        self.loaded().and_then(|l| l.last_error.as_ref())
    }

    /// Loads a new file, auto-selects a dissector and dissects.
    pub fn load_file(&mut self, bytes: impl Into<Bytes>, file_name: &str) -> DissectionOutcome {
        let bytes = bytes.into();
        info!(file = %file_name, size = bytes.len(), "Loading file");
        self.invalidate_background();

        let mut loaded = LoadedFileState::new(file_name.to_string(), bytes);
        let sniffer = &self.sniffer;
        loaded.dissector = self.registry.select_for_file(file_name, || {
            sniffer.media_type_of(file_name, &loaded.bytes)
        });
        if loaded.dissector.is_none() {
            debug!(file = %file_name, "No dissector assigned");
        }

        let outcome = loaded.redissect();
        self.state = SessionState::FileLoaded(loaded);
        outcome
    }

    /// Manually selects a dissector by name and re-dissects the loaded bytes.
    ///
    /// An unknown name leaves the session untouched.
    pub fn set_dissector(&mut self, name: &str) -> Result<DissectionOutcome> {
        let dissector = self
            .registry
            .get(name)
            .ok_or_else(|| DissectError::UnknownDissector(name.to_string()))?;
        info!(dissector = %name, "Dissector set manually");
        self.invalidate_background();

        match &mut self.state {
            SessionState::NoFile => Ok(DissectionOutcome::NoFile),
            SessionState::FileLoaded(loaded) => {
                loaded.dissector = Some(dissector);
                Ok(loaded.redissect())
            }
        }
    }

    /// Drops the active dissector and the tree.
    pub fn clear_dissector(&mut self) -> DissectionOutcome {
        self.invalidate_background();
        match &mut self.state {
            SessionState::NoFile => DissectionOutcome::NoFile,
            SessionState::FileLoaded(loaded) => {
                loaded.dissector = None;
                loaded.redissect()
            }
        }
    }

    /// Marks the next data change as coming from a tree edit.
    ///
    /// The flag is consumed by the next [`on_data_changed`](Self::on_data_changed) call.
    pub fn suppress_next_change(&self) {
        self.suppress_next.store(true, Ordering::Release);
    }

    /// Replaces the byte snapshot after an edit.
    ///
    /// When the change came from a tree edit (either flagged here or through
    /// [`suppress_next_change`](Self::suppress_next_change)) the current tree
    /// is kept and re-dissection is skipped once.
    pub fn on_data_changed(
        &mut self,
        bytes: impl Into<Bytes>,
        originated_from_tree_edit: bool,
    ) -> DissectionOutcome {
        if originated_from_tree_edit {
            self.suppress_next.store(true, Ordering::Release);
        }
        let suppressed = self.suppress_next.swap(false, Ordering::AcqRel);
        self.invalidate_background();

        let SessionState::FileLoaded(loaded) = &mut self.state else {
            return DissectionOutcome::NoFile;
        };
        loaded.bytes = bytes.into();

        if suppressed {
            debug!(file = %loaded.file_name, "Data change from tree edit; dissection skipped");
            return DissectionOutcome::Suppressed;
        }
        loaded.redissect()
    }

    /// Swaps in a new dissector set and re-resolves the active dissector by name.
    ///
    /// On a rejected set the session and registry are unchanged.
    pub fn reload_plugins(&mut self, dissectors: Vec<DissectorRef>) -> Result<DissectionOutcome> {
        self.registry.reload(dissectors)?;
        self.invalidate_background();

        let SessionState::FileLoaded(loaded) = &mut self.state else {
            return Ok(DissectionOutcome::NoFile);
        };
        let Some(active) = loaded.dissector.take() else {
            return Ok(loaded.redissect());
        };

        loaded.dissector = self.registry.get(active.name());
        match &loaded.dissector {
            Some(_) => info!(dissector = %active.name(), "Active dissector survived reload"),
            None => info!(dissector = %active.name(), "Active dissector unloaded"),
        }
        Ok(loaded.redissect())
    }

    /// Starts dissecting the current bytes with the active dissector on the
    /// background worker.
    ///
    /// Returns `None` when there is nothing to dissect: no file, no dissector
    /// or an empty buffer. A newer background request supersedes this one.
    pub fn dissect_in_background(
        &self,
    ) -> Option<impl Future<Output = BackgroundResult> + Send + 'static> {
        let loaded = self.loaded()?;
        let dissector = loaded.dissector.clone()?;
        if loaded.bytes.is_empty() {
            return None;
        }
        debug!(dissector = %dissector.name(), file = %loaded.file_name, "Background dissection requested");

        let worker = Arc::clone(&self.worker);
        let bytes = loaded.bytes.clone();
        let epoch = self.epoch;
        Some(async move {
            BackgroundResult {
                epoch,
                result: worker.dissect(dissector, bytes).await,
            }
        })
    }

    /// Installs a finished background result.
    ///
    /// Results overtaken by a newer request, or by any session change since
    /// the request started, are rejected with `DissectError::Superseded` and
    /// leave the session untouched. A malformed-input failure is recorded the
    /// same way a synchronous one is.
    pub fn apply_background(&mut self, finished: BackgroundResult) -> Result<DissectionOutcome> {
        if finished.epoch != self.epoch {
            debug!(epoch = finished.epoch, current = self.epoch, "Stale background result dropped");
            return Err(DissectError::Superseded);
        }
        let SessionState::FileLoaded(loaded) = &mut self.state else {
            return Err(DissectError::Superseded);
        };

        match finished.result {
            Ok(tree) if self.worker.is_current(tree.generation) => {
                let count = count_nodes(&tree.nodes);
                loaded.tree = Some(tree.nodes);
                loaded.last_error = None;
                Ok(DissectionOutcome::Dissected { nodes: count })
            }
            Ok(_) => Err(DissectError::Superseded),
            Err(DissectError::Malformed(e)) => {
                loaded.tree = None;
                loaded.last_error = Some(e.clone());
                Ok(DissectionOutcome::Failed(e))
            }
            Err(other) => Err(other),
        }
    }
}
