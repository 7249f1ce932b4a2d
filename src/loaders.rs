//! Resource loading utilities
//!
//! This module handles loading of structure definitions and instance
//! documents from the file system.

use crate::error::{Error, Result};
use crate::limits::Limits;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Resource loader for definitions and documents
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The limits this loader enforces
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a file as a string
    pub fn load(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;

        self.limits.check_document_size(content.len())?;
        debug!(path = %path.display(), bytes = content.len(), "loaded resource");

        Ok(content)
    }
}
