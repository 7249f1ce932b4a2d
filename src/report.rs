//! Serializable match reports
//!
//! A [`MatchResult`] borrows from the definition and the instance. A
//! [`MatchReport`] is an owned summary of it that can be printed or written
//! as JSON.

use crate::documents::InstanceNode;
use crate::error::Result;
use crate::matching::{InstanceChild, InstanceRef, MatchResult};
use serde::Serialize;
use std::fmt;

/// One instance entry of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceReport {
    /// Element name (for value entries, the parent's name)
    pub name: String,
    /// Position among the parent's children; absent for value entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Type name, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Scalar value, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl InstanceReport {
    fn from_node<N: InstanceNode>(node: &N, position: Option<usize>) -> Self {
        Self {
            name: node.name().to_string(),
            position,
            type_name: node.type_name().map(str::to_string),
            value: node.value().map(str::to_string),
        }
    }

    fn from_ref<N: InstanceNode>(instance: &InstanceRef<'_, N>) -> Self {
        Self::from_node(instance.node(), instance.position())
    }

    fn from_child<N: InstanceNode>(child: &InstanceChild<'_, N>) -> Self {
        Self::from_node(child.node, Some(child.position))
    }
}

impl fmt::Display for InstanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{}#{}", self.name, position)?,
            None => write!(f, "@value")?,
        }
        if let Some(ref value) = self.value {
            write!(f, "={:?}", value)?;
        }
        Ok(())
    }
}

/// One declaration of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrespondenceReport {
    /// Position among the harvested declarations
    pub slot: usize,
    /// Declared name
    pub declared: String,
    /// Whether the declaration is the parent's scalar value
    pub value_constraint: bool,
    /// Matched instance entries
    pub instances: Vec<InstanceReport>,
}

/// Owned summary of a [`MatchResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// Definition path of the matched element, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// One entry per declaration
    pub correspondences: Vec<CorrespondenceReport>,
    /// Instance children no declaration claimed
    pub unmatched: Vec<InstanceReport>,
}

impl MatchReport {
    /// Summarize a match result
    pub fn from_result<C, N: InstanceNode>(result: &MatchResult<'_, C, N>) -> Self {
        let correspondences = result
            .matches
            .iter()
            .map(|m| CorrespondenceReport {
                slot: m.declared.slot(),
                declared: m.declared.path_name().to_string(),
                value_constraint: m.declared.is_value_constraint(),
                instances: m.instances.iter().map(InstanceReport::from_ref).collect(),
            })
            .collect();

        Self {
            path: None,
            correspondences,
            unmatched: result.unmatched.iter().map(InstanceReport::from_child).collect(),
        }
    }

    /// Record the definition path of the matched element
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref path) = self.path {
            writeln!(f, "{}", path)?;
        }
        for c in &self.correspondences {
            write!(f, "  [{}] {} ->", c.slot, c.declared)?;
            if c.instances.is_empty() {
                write!(f, " (none)")?;
            }
            for instance in &c.instances {
                write!(f, " {}", instance)?;
            }
            writeln!(f)?;
        }
        write!(f, "  unmatched:")?;
        if self.unmatched.is_empty() {
            write!(f, " (none)")?;
        }
        for instance in &self.unmatched {
            write!(f, " {}", instance)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{ElementDefinition, StructureDefinition};
    use crate::documents::ElementNode;
    use crate::matching::match_children;
    use crate::navigator::ElementDefinitionNavigator;
    use crate::typeref::TypeRef;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn report_for(elements: Vec<ElementDefinition>, node: &ElementNode) -> MatchReport {
        let mut nav = ElementDefinitionNavigator::new(Arc::new(
            StructureDefinition::from_elements(elements).unwrap(),
        ));
        let result = match_children(&mut nav, node).unwrap();
        MatchReport::from_result(&result).with_path(nav.path())
    }

    #[test]
    fn test_text_rendering() {
        let node = ElementNode::new("Patient")
            .with_child(ElementNode::new("name"))
            .with_child(ElementNode::new("gender").with_value("male"));
        let report = report_for(
            vec![
                ElementDefinition::new("Patient"),
                ElementDefinition::new("Patient.name"),
                ElementDefinition::new("Patient.birthDate"),
            ],
            &node,
        );

        assert_eq!(
            report.to_string(),
            "Patient\n  [0] name -> name#0\n  [1] birthDate -> (none)\n  unmatched: gender#1=\"male\"\n"
        );
    }

    #[test]
    fn test_value_entry_rendering() {
        let node = ElementNode::new("active").with_value("true");
        let report = report_for(
            vec![
                ElementDefinition::new("boolean"),
                ElementDefinition::new("boolean.value").with_type(TypeRef::default()),
            ],
            &node,
        );
        assert!(report.correspondences[0].value_constraint);
        assert_eq!(report.correspondences[0].instances[0].position, None);
        assert!(report.to_string().contains("[0] value -> @value=\"true\""));
    }

    #[test]
    fn test_json_shape() {
        let node = ElementNode::new("Patient")
            .with_child(ElementNode::new("deceased").with_type("boolean"));
        let report = report_for(
            vec![
                ElementDefinition::new("Patient"),
                ElementDefinition::new("Patient.deceased[x]"),
            ],
            &node,
        );

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["path"], "Patient");
        assert_eq!(json["correspondences"][0]["declared"], "deceased[x]");
        assert_eq!(json["correspondences"][0]["valueConstraint"], false);
        assert_eq!(json["correspondences"][0]["instances"][0]["typeName"], "boolean");
        assert_eq!(json["unmatched"].as_array().unwrap().len(), 0);
    }
}
