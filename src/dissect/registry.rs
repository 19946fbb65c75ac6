//! Registry of available dissectors and auto-selection.
//!
//! The live set is an immutable snapshot behind an `RwLock`; `reload` builds
//! the replacement first and swaps it in whole, so a reader holding a
//! snapshot never observes a half-updated set.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::dissect::{builtin_dissectors, DissectorRef};
use crate::error::{DissectError, Result};

/// An immutable set of dissectors in registration order.
#[derive(Default, Clone)]
pub struct RegistrySnapshot {
    entries: Vec<DissectorRef>,
}

impl RegistrySnapshot {
    /// Builds a snapshot, rejecting duplicate names.
    pub fn new(dissectors: Vec<DissectorRef>) -> Result<Self> {
        let mut seen = HashSet::new();
        for d in &dissectors {
            if !seen.insert(d.name().to_string()) {
                return Err(DissectError::DuplicateDissector(d.name().to_string()));
            }
        }
        Ok(Self {
            entries: dissectors,
        })
    }

    pub fn get(&self, name: &str) -> Option<DissectorRef> {
        self.entries.iter().find(|d| d.name() == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DissectorRef> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Two-pass auto-selection.
    ///
    /// 1. First dissector with an extension that `file_name` ends with.
    /// 2. Otherwise `sniff` is called for the content media type and compared
    ///    against each declared media type.
    ///
    /// `sniff` is only invoked when the extension pass finds nothing. `None`
    /// is the normal "unassigned" outcome.
    pub fn select_for_file<F>(&self, file_name: &str, sniff: F) -> Option<DissectorRef>
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(d) = self
            .entries
            .iter()
            .find(|d| d.descriptor().matches_file_name(file_name))
        {
            debug!(file = %file_name, dissector = %d.name(), "Selected dissector by extension");
            return Some(d.clone());
        }

        let Some(media_type) = sniff() else {
            debug!(file = %file_name, "No media type sniffed; no dissector assigned");
            return None;
        };

        let selected = self
            .entries
            .iter()
            .find(|d| d.descriptor().matches_media_type(&media_type))
            .cloned();
        match &selected {
            Some(d) => debug!(
                file = %file_name,
                media_type = %media_type,
                dissector = %d.name(),
                "Selected dissector by media type"
            ),
            None => debug!(
                file = %file_name,
                media_type = %media_type,
                "No dissector declares the sniffed media type"
            ),
        }
        selected
    }
}

/// Holds the live dissector set.
#[derive(Default)]
pub struct DissectorRegistry {
    live: RwLock<Arc<RegistrySnapshot>>,
}

impl DissectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dissectors(dissectors: Vec<DissectorRef>) -> Result<Self> {
        Ok(Self {
            live: RwLock::new(Arc::new(RegistrySnapshot::new(dissectors)?)),
        })
    }

    /// A registry holding the dissectors shipped with the crate.
    pub fn with_builtins() -> Self {
        Self {
            live: RwLock::new(Arc::new(RegistrySnapshot {
                entries: builtin_dissectors(),
            })),
        }
    }

    /// The current set. Later reloads do not affect a snapshot already taken.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        match self.live.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the whole set. On error the previous set stays live.
    pub fn reload(&self, dissectors: Vec<DissectorRef>) -> Result<()> {
        let next = Arc::new(RegistrySnapshot::new(dissectors).inspect_err(|e| {
            warn!(error = %e, "Rejected dissector reload");
        })?);
        info!(dissectors = ?next.names(), "Dissector set reloaded");
        match self.live.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<DissectorRef> {
        self.snapshot().get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.snapshot().names()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// See [`RegistrySnapshot::select_for_file`].
    pub fn select_for_file<F>(&self, file_name: &str, sniff: F) -> Option<DissectorRef>
    where
        F: FnOnce() -> Option<String>,
    {
        self.snapshot().select_for_file(file_name, sniff)
    }
}
