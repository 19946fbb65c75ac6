//! Identity and matching metadata for a dissector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name, file extensions and media types a dissector answers to.
///
/// Built once when the dissector is created and never mutated; a plugin
/// reload replaces dissectors wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissectorDescriptor {
    name: String,
    extensions: Vec<String>,
    media_types: Vec<String>,
}

impl DissectorDescriptor {
    pub fn new<E, M>(name: impl Into<String>, extensions: E, media_types: M) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            name: name.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
            media_types: media_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Unique, human-readable registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suffixes matched against the file name, case-sensitively.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn media_types(&self) -> &[String] {
        &self.media_types
    }

    /// True when `file_name` ends with one of the declared extensions.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
    }

    /// True when `media_type` equals one of the declared media types.
    pub fn matches_media_type(&self, media_type: &str) -> bool {
        self.media_types.iter().any(|m| m == media_type)
    }
}

impl fmt::Display for DissectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (extensions: [{}], media types: [{}])",
            self.name,
            self.extensions.join(", "),
            self.media_types.join(", ")
        )
    }
}
