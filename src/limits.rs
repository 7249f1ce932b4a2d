//! Limits and constraints for loading instances and definitions
//!
//! This module defines limits that keep document and definition loading
//! bounded. The matching core itself is always bounded by its inputs and
//! takes no configuration.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum nesting depth of an instance document
    pub max_document_depth: usize,

    /// Maximum document or definition file size in bytes
    pub max_document_size: usize,

    /// Maximum number of children of a single instance element
    pub max_children: usize,

    /// Maximum number of elements in a structure definition snapshot
    pub max_definition_elements: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_depth: 1000,
            max_document_size: 100 * 1024 * 1024, // 100 MB
            max_children: 100_000,
            max_definition_elements: 100_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_document_depth: 100,
            max_document_size: 10 * 1024 * 1024, // 10 MB
            max_children: 10_000,
            max_definition_elements: 10_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_document_depth: 10_000,
            max_document_size: 1024 * 1024 * 1024, // 1 GB
            max_children: 1_000_000,
            max_definition_elements: 1_000_000,
        }
    }

    /// Check if document depth is within limits
    pub fn check_document_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_document_depth {
            Err(Error::LimitExceeded(format!(
                "document depth {} exceeds maximum {}",
                depth, self.max_document_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if document size is within limits
    pub fn check_document_size(&self, size: usize) -> Result<()> {
        if size > self.max_document_size {
            Err(Error::LimitExceeded(format!(
                "document size {} bytes exceeds maximum {} bytes",
                size, self.max_document_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the child count of one element is within limits
    pub fn check_children(&self, count: usize) -> Result<()> {
        if count > self.max_children {
            Err(Error::LimitExceeded(format!(
                "element has {} children, maximum is {}",
                count, self.max_children
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a definition snapshot size is within limits
    pub fn check_definition_elements(&self, count: usize) -> Result<()> {
        if count > self.max_definition_elements {
            Err(Error::LimitExceeded(format!(
                "definition has {} elements, maximum is {}",
                count, self.max_definition_elements
            )))
        } else {
            Ok(())
        }
    }
}
