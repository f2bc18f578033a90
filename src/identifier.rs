//! Operator identifier - the dotted `category.command` name
//!
//! Format: `<category>.<command>`
//!
//! Examples:
//! - `mesh.primitive_cube_add`
//! - `text.edit_operator`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered operator name made of exactly two dotted segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    /// Operator category (`mesh` in `mesh.primitive_cube_add`)
    pub category: String,
    /// Command inside the category
    pub command: String,
}

impl Identifier {
    /// Create a new identifier, validating both segments
    pub fn new(category: impl Into<String>, command: impl Into<String>) -> Result<Self> {
        let category = category.into();
        let command = command.into();
        for segment in [&category, &command] {
            if !is_python_identifier(segment) {
                return Err(Error::InvalidIdentifier(format!(
                    "'{}' is not a valid segment",
                    segment
                )));
            }
        }
        Ok(Self { category, command })
    }

    /// Parse `category.command`
    ///
    /// Exactly one dot is accepted.
    pub fn parse(text: &str) -> Result<Self> {
        let (category, command) = text.split_once('.').ok_or_else(|| {
            Error::InvalidIdentifier(format!("'{}' must be of the form category.command", text))
        })?;
        if command.contains('.') {
            return Err(Error::InvalidIdentifier(format!(
                "'{}' has more than one dot",
                text
            )));
        }
        Self::new(category, command)
    }

    /// Parse a qualified call path such as `bpy.ops.mesh.primitive_cube_add`,
    /// keeping the trailing two segments.
    pub fn from_qualified(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        match segments.as_slice() {
            [.., category, command] => Self::new(*category, *command),
            _ => Err(Error::InvalidIdentifier(format!(
                "'{}' must have at least two segments",
                path
            ))),
        }
    }

    /// Whether the trailing two segments of a dotted chain name this identifier
    pub fn matches_tail(&self, segments: &[&str]) -> bool {
        match segments {
            [.., category, command] => *category == self.category && *command == self.command,
            _ => false,
        }
    }

    /// Full dotted text
    pub fn to_text(&self) -> String {
        format!("{}.{}", self.category, self.command)
    }
}

fn is_python_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.command)
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identifier::parse(&s).map_err(serde::de::Error::custom)
    }
}
