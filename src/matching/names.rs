//! Declared-name to instance-name matching
//!
//! A declared child name describes an instance child when one of three
//! rules holds, tried in order:
//!
//! 1. the names are equal
//! 2. the declared name is the instance name followed by the capitalized
//!    instance type (`deceasedBoolean` for `deceased` typed `boolean`)
//! 3. the declared name is a choice (`value[x]`) whose stem equals the
//!    instance name
//!
//! Rule 2 applies to every declaration, choice or not.

use crate::documents::InstanceNode;

/// Suffix marking a choice-of-types declaration
pub const CHOICE_SUFFIX: &str = "[x]";

/// One name matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Names are identical
    Exact,
    /// Declared name carries the instance type as a suffix
    TypeSuffix,
    /// Declared name is a choice whose stem is the instance name
    ChoiceWildcard,
}

/// All rules, in the order they are tried
pub const NAME_RULES: [NameRule; 3] = [
    NameRule::Exact,
    NameRule::TypeSuffix,
    NameRule::ChoiceWildcard,
];

impl NameRule {
    /// Whether this rule pairs the declared name with the instance child
    pub fn applies(self, declared: &str, instance_name: &str, type_name: Option<&str>) -> bool {
        match self {
            NameRule::Exact => exact_match(declared, instance_name),
            NameRule::TypeSuffix => type_suffix_match(declared, instance_name, type_name),
            NameRule::ChoiceWildcard => choice_wildcard_match(declared, instance_name),
        }
    }
}

/// Rule 1: identical names
pub fn exact_match(declared: &str, instance_name: &str) -> bool {
    declared == instance_name
}

/// Rule 2: `declared == instance_name + Capitalized(type_name)`.
///
/// Never matches without a (non-empty) type name.
pub fn type_suffix_match(declared: &str, instance_name: &str, type_name: Option<&str>) -> bool {
    let Some(type_name) = type_name.filter(|t| !t.is_empty()) else {
        return false;
    };
    declared
        .strip_prefix(instance_name)
        .is_some_and(|suffix| suffix == capitalize(type_name))
}

/// Rule 3: choice stem equals the instance name
pub fn choice_wildcard_match(declared: &str, instance_name: &str) -> bool {
    declared
        .strip_suffix(CHOICE_SUFFIX)
        .is_some_and(|stem| stem == instance_name)
}

/// First rule that pairs the names, if any
pub fn matching_rule(declared: &str, instance_name: &str, type_name: Option<&str>) -> Option<NameRule> {
    NAME_RULES
        .into_iter()
        .find(|rule| rule.applies(declared, instance_name, type_name))
}

/// Whether the declared name describes an instance child with this name and type
pub fn name_matches(declared: &str, instance_name: &str, type_name: Option<&str>) -> bool {
    matching_rule(declared, instance_name, type_name).is_some()
}

/// Whether the declared name describes the instance node
pub fn node_matches<N: InstanceNode + ?Sized>(declared: &str, node: &N) -> bool {
    name_matches(declared, node.name(), node.type_name())
}

/// Upper-case the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
