//! # fhir-childmatch
//!
//! Aligns the children declared by a FHIR element definition with the
//! children actually present in an instance element, so that a validator can
//! check each instance child against the definition that describes it.
//!
//! ## Features
//!
//! - Harvesting declared children, with slice entries collapsed
//! - Name matching with type-suffix shorthand (`deceasedBoolean`) and
//!   choice wildcards (`value[x]`)
//! - A complete partition of instance children into matched and unmatched
//! - Structure definition loading from FHIR JSON
//! - Instance loading from FHIR XML
//! - Type reference helpers (canonical URI, display form, value pattern)
//!
//! ## Example
//!
//! ```rust,ignore
//! use childmatch::{match_children, Document, ElementDefinitionNavigator, StructureDefinition};
//! use std::sync::Arc;
//!
//! let definition = Arc::new(StructureDefinition::from_file("patient.profile.json")?);
//! let document = Document::from_file("patient.xml")?;
//!
//! let mut nav = ElementDefinitionNavigator::new(definition);
//! let result = match_children(&mut nav, document.root().unwrap())?;
//! for unmatched in &result.unmatched {
//!     println!("unexpected element '{}'", unmatched.node.name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod loaders;

// Definitions and instances
pub mod definitions;
pub mod documents;
pub mod navigator;
pub mod typeref;

// Matching
pub mod matching;
pub mod report;

// Re-exports for convenience
pub use definitions::{ElementDefinition, StructureDefinition};
pub use documents::{Document, ElementNode, InstanceNode};
pub use error::{Error, Result};
pub use matching::{
    harvest, match_children, match_declared, name_matches, Correspondence, DeclaredChild,
    InstanceChild, InstanceRef, MatchResult, NameRule,
};
pub use navigator::{Bookmark, DefinitionCursor, ElementDefinitionNavigator};
pub use report::MatchReport;
pub use typeref::{Extension, TypeRef};

/// Version of the fhir-childmatch library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FHIR namespace of instance XML
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// Base of the canonical URIs of core structure definitions
pub const STRUCTURE_DEFINITION_BASE: &str = "http://hl7.org/fhir/StructureDefinition/";

/// Extension holding the validation pattern of a primitive type
pub const REGEX_EXTENSION_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/structuredefinition-regex";

/// Prefix stripped from value patterns
pub const OID_URN_PREFIX: &str = "urn:oid:";
