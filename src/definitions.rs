//! Structure definitions and their element definitions
//!
//! A structure definition is a flat, ordered list of element definitions
//! (its snapshot). Hierarchy is implied by the dotted paths: an element is
//! followed by all of its descendants before its next sibling, and slices
//! of one element repeat the same path.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::typeref::TypeRef;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

static ELEMENT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\[x\])?(\.[A-Za-z][A-Za-z0-9_]*(\[x\])?)*$").unwrap()
});

/// One entry of a structure definition snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Dotted element path, e.g. `Patient.name.family`
    pub path: String,
    /// Slice name, when this entry constrains one slice of the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_name: Option<String>,
    /// Permitted types
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeRef>,
    /// Minimum cardinality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    /// Maximum cardinality (`*` for unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl ElementDefinition {
    /// Create an element definition for a path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the slice name
    pub fn with_slice_name(mut self, name: impl Into<String>) -> Self {
        self.slice_name = Some(name.into());
        self
    }

    /// Add a permitted type
    pub fn with_type(mut self, type_ref: TypeRef) -> Self {
        self.types.push(type_ref);
        self
    }

    /// Last segment of the path
    pub fn path_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Number of path segments
    pub fn depth(&self) -> usize {
        self.path.split('.').count()
    }

    /// Whether this element is the scalar value of a primitive type.
    ///
    /// That element sits directly below the root, is named `value`, and has
    /// no type code: its type is a language primitive rather than a FHIR type.
    pub fn is_primitive_value_constraint(&self) -> bool {
        self.depth() == 2
            && self.path_name() == "value"
            && self.types.iter().all(|t| t.code.is_none())
    }

    /// Whether this element is a choice of types (`[x]` suffix)
    pub fn is_choice(&self) -> bool {
        self.path.ends_with("[x]")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStructureDefinition {
    resource_type: String,
    url: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    type_name: Option<String>,
    #[serde(default)]
    snapshot: Option<RawSnapshot>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    element: Vec<ElementDefinition>,
}

/// A structure definition snapshot
#[derive(Debug, Clone)]
pub struct StructureDefinition {
    /// Canonical URL
    pub url: Option<Url>,
    /// Computer-friendly name
    pub name: Option<String>,
    /// Type constrained by this definition
    pub type_name: Option<String>,
    elements: Vec<ElementDefinition>,
    /// First position of each distinct path
    index: IndexMap<String, usize>,
}

impl StructureDefinition {
    /// Build a definition from snapshot elements
    pub fn from_elements(elements: Vec<ElementDefinition>) -> Result<Self> {
        let root = elements
            .first()
            .ok_or_else(|| Error::Definition("snapshot has no elements".to_string()))?;
        if root.depth() != 1 {
            return Err(Error::Definition(format!(
                "first element '{}' is not a root element",
                root.path
            )));
        }
        let prefix = format!("{}.", root.path);

        let mut index = IndexMap::new();
        for (position, element) in elements.iter().enumerate() {
            if !ELEMENT_PATH.is_match(&element.path) {
                return Err(Error::Definition(format!(
                    "invalid element path '{}'",
                    element.path
                )));
            }
            if position > 0 && !element.path.starts_with(&prefix) {
                return Err(Error::Definition(format!(
                    "element '{}' is outside root '{}'",
                    element.path, root.path
                )));
            }
            index.entry(element.path.clone()).or_insert(position);
        }

        Ok(Self {
            url: None,
            name: None,
            type_name: None,
            elements,
            index,
        })
    }

    /// Parse a FHIR JSON structure definition
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_limits(json, &Limits::default())
    }

    /// Parse a FHIR JSON structure definition, enforcing limits
    pub fn from_json_with_limits(json: &str, limits: &Limits) -> Result<Self> {
        limits.check_document_size(json.len())?;
        let raw: RawStructureDefinition = serde_json::from_str(json)?;

        if raw.resource_type != "StructureDefinition" {
            return Err(Error::Definition(format!(
                "expected a StructureDefinition, found '{}'",
                raw.resource_type
            )));
        }
        let url = Url::parse(&raw.url)?;
        let elements = raw.snapshot.map(|s| s.element).unwrap_or_default();
        limits.check_definition_elements(elements.len())?;

        let mut definition = Self::from_elements(elements)?;
        definition.url = Some(url);
        definition.name = raw.name;
        definition.type_name = raw.type_name;

        debug!(
            url = %raw.url,
            elements = definition.len(),
            "loaded structure definition"
        );
        Ok(definition)
    }

    /// Load a FHIR JSON structure definition from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let loader = Loader::new();
        let json = loader.load(path.as_ref())?;
        Self::from_json_with_limits(&json, loader.limits())
    }

    /// All snapshot elements, in order
    pub fn elements(&self) -> &[ElementDefinition] {
        &self.elements
    }

    /// Element at a snapshot position
    pub fn get(&self, position: usize) -> Option<&ElementDefinition> {
        self.elements.get(position)
    }

    /// The root element
    pub fn root(&self) -> &ElementDefinition {
        &self.elements[0]
    }

    /// Number of snapshot elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false: a definition has at least its root element
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Position of the first element with the given path
    pub fn position_of(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENT: &str = r#"{
        "resourceType": "StructureDefinition",
        "url": "http://hl7.org/fhir/StructureDefinition/Patient",
        "name": "Patient",
        "type": "Patient",
        "snapshot": {
            "element": [
                {"path": "Patient", "min": 0, "max": "*"},
                {"path": "Patient.name", "type": [{"code": "HumanName"}], "max": "*"},
                {"path": "Patient.birthDate", "type": [{"code": "date"}]},
                {"path": "Patient.deceased[x]", "type": [{"code": "boolean"}, {"code": "dateTime"}]}
            ]
        }
    }"#;

    #[test]
    fn test_from_json() {
        let sd = StructureDefinition::from_json(PATIENT).unwrap();
        assert_eq!(sd.len(), 4);
        assert_eq!(sd.name.as_deref(), Some("Patient"));
        assert_eq!(sd.type_name.as_deref(), Some("Patient"));
        assert_eq!(
            sd.url.as_ref().map(Url::as_str),
            Some("http://hl7.org/fhir/StructureDefinition/Patient")
        );
        assert_eq!(sd.root().path, "Patient");
        assert_eq!(sd.elements()[3].types.len(), 2);
        assert_eq!(sd.elements()[1].max.as_deref(), Some("*"));
    }

    #[test]
    fn test_position_of_returns_first() {
        let sd = StructureDefinition::from_elements(vec![
            ElementDefinition::new("Patient"),
            ElementDefinition::new("Patient.identifier"),
            ElementDefinition::new("Patient.identifier").with_slice_name("mrn"),
            ElementDefinition::new("Patient.name"),
        ])
        .unwrap();
        assert_eq!(sd.position_of("Patient.identifier"), Some(1));
        assert_eq!(sd.position_of("Patient.name"), Some(3));
        assert_eq!(sd.position_of("Patient.gender"), None);
    }

    #[test]
    fn test_wrong_resource_type() {
        let json = r#"{"resourceType":"Patient","url":"http://x/y","snapshot":{"element":[{"path":"Patient"}]}}"#;
        let err = StructureDefinition::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Definition(_)));
    }

    #[test]
    fn test_missing_snapshot() {
        let json = r#"{"resourceType":"StructureDefinition","url":"http://x/y"}"#;
        let err = StructureDefinition::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Definition(_)));
    }

    #[test]
    fn test_invalid_url() {
        let json = r#"{"resourceType":"StructureDefinition","url":"no scheme","snapshot":{"element":[{"path":"Patient"}]}}"#;
        let err = StructureDefinition::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_element_outside_root() {
        let err = StructureDefinition::from_elements(vec![
            ElementDefinition::new("Patient"),
            ElementDefinition::new("Observation.code"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Definition(_)));
    }

    #[test]
    fn test_invalid_path() {
        let err = StructureDefinition::from_elements(vec![
            ElementDefinition::new("Patient"),
            ElementDefinition::new("Patient..name"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Definition(_)));
    }

    #[test]
    fn test_definition_limit() {
        let limits = Limits {
            max_definition_elements: 2,
            ..Limits::default()
        };
        let err = StructureDefinition::from_json_with_limits(PATIENT, &limits).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }

    #[test]
    fn test_path_name() {
        assert_eq!(ElementDefinition::new("Patient").path_name(), "Patient");
        assert_eq!(
            ElementDefinition::new("Patient.deceased[x]").path_name(),
            "deceased[x]"
        );
        assert!(ElementDefinition::new("Patient.deceased[x]").is_choice());
    }

    #[test]
    fn test_primitive_value_constraint() {
        assert!(ElementDefinition::new("boolean.value")
            .with_type(TypeRef::default())
            .is_primitive_value_constraint());
        assert!(!ElementDefinition::new("boolean.value")
            .with_type(TypeRef::new("boolean"))
            .is_primitive_value_constraint());
        assert!(!ElementDefinition::new("Quantity.value")
            .with_type(TypeRef::new("decimal"))
            .is_primitive_value_constraint());
        assert!(!ElementDefinition::new("Observation.component.value")
            .with_type(TypeRef::default())
            .is_primitive_value_constraint());
        assert!(!ElementDefinition::new("boolean.id").is_primitive_value_constraint());
    }
}
