//! Type references of element definitions
//!
//! A type reference names the type an element may take (its code), optionally
//! constrained by profiles, and may carry extensions. The helpers here format
//! a type reference for lookups and messages; they never fail on missing
//! data, only on data that is present but unusable.

use crate::error::{Error, Result};
use crate::{OID_URN_PREFIX, REGEX_EXTENSION_URL, STRUCTURE_DEFINITION_BASE};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// An extension carried by a type reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Extension URL
    pub url: String,
    /// String value, if the extension has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    /// URI value, if the extension has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_uri: Option<String>,
}

impl Extension {
    /// Create a string-valued extension
    pub fn string(url: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            value_string: Some(value.into()),
            value_uri: None,
        }
    }
}

/// A type reference (`ElementDefinition.type`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Type code; absent for the scalar value of a primitive type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Profiles constraining the type
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub profile: Vec<String>,
    /// Extensions on the type reference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl TypeRef {
    /// Create a type reference with a code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Default::default()
        }
    }

    /// Add a profile
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile.push(profile.into());
        self
    }

    /// Add an extension
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension.push(extension);
        self
    }

    /// Type code, or the empty string when absent
    pub fn code_literal(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }

    /// First profile, if any
    pub fn first_profile(&self) -> Option<&str> {
        self.profile.first().map(String::as_str)
    }

    /// String value of the first extension with the given URL
    pub fn string_extension(&self, url: &str) -> Option<&str> {
        self.extension
            .iter()
            .find(|ext| ext.url == url)
            .and_then(|ext| ext.value_string.as_deref().or(ext.value_uri.as_deref()))
    }

    /// Canonical URI of the declared type.
    ///
    /// The first explicit profile wins; otherwise the URI is the core
    /// structure definition of the type code.
    pub fn profile_uri(&self) -> String {
        match self.first_profile() {
            Some(profile) => profile.to_string(),
            None => format!("{}{}", STRUCTURE_DEFINITION_BASE, self.code_literal()),
        }
    }

    /// Short rendering: the code, followed by the first profile in parentheses
    pub fn to_human_readable(&self) -> String {
        let mut result = self.code_literal().to_string();
        if let Some(profile) = self.first_profile() {
            result.push_str(&format!(" ({})", profile));
        }
        result
    }

    /// Validation pattern for the primitive value, from the regex extension
    pub fn primitive_value_regex(&self) -> Option<String> {
        let regex = self.string_extension(REGEX_EXTENSION_URL)?;
        Some(regex.strip_prefix(OID_URN_PREFIX).unwrap_or(regex).to_string())
    }

    /// The validation pattern compiled so that it must match a whole value
    pub fn compiled_primitive_value_regex(&self) -> Result<Option<Regex>> {
        let Some(pattern) = self.primitive_value_regex() else {
            return Ok(None);
        };
        Regex::new(&format!("^(?:{})$", pattern))
            .map(Some)
            .map_err(|e| Error::Value(format!("Invalid value pattern '{}': {}", pattern, e)))
    }
}

/// Accept both the single-string and the array form of `profile`
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(profile) => vec![profile],
        OneOrMany::Many(profiles) => profiles,
    })
}
