//! @ai:module:intent Define the durable service descriptor and its canonical ordering
//! @ai:module:layer domain
//! @ai:module:public_api ServiceFile, Info, Relationship, RelationshipAction, VERSION
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Format version written into every descriptor.
pub const VERSION: &str = "0.1.0";

/// @ai:intent Declarative descriptor of one service and its relationships
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceFile {
    #[serde(rename = "servicefile")]
    pub version: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

/// @ai:intent Identity block of a service descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Info {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// @ai:intent Directed, typed association between the service and a participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    pub action: RelationshipAction,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub technology: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proto: String,
}

/// @ai:intent Closed set of relationship verbs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipAction {
    Uses,
    Requests,
    Replies,
    Sends,
    Receives,
}

impl RelationshipAction {
    pub const ALL: [RelationshipAction; 5] = [
        RelationshipAction::Uses,
        RelationshipAction::Requests,
        RelationshipAction::Replies,
        RelationshipAction::Sends,
        RelationshipAction::Receives,
    ];

    /// @ai:intent Get the wire name of the action
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipAction::Uses => "uses",
            RelationshipAction::Requests => "requests",
            RelationshipAction::Replies => "replies",
            RelationshipAction::Sends => "sends",
            RelationshipAction::Receives => "receives",
        }
    }
}

impl fmt::Display for RelationshipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown relationship action `{s}`"))
    }
}

impl ServiceFile {
    /// @ai:intent Create an empty descriptor holding only a service name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: VERSION.to_string(),
            info: Info {
                name: name.into(),
                ..Default::default()
            },
            relationships: Vec::new(),
        }
    }

    /// @ai:intent Sort relationships into canonical order
    /// @ai:post relationships ordered by (action, name, technology, proto, description)
    /// @ai:idempotent true
    /// @ai:effects pure
    pub fn sort(&mut self) {
        self.relationships
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    /// @ai:intent Render the descriptor as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// @ai:intent Parse a descriptor from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// @ai:intent Load a descriptor from a YAML file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }
}

impl Relationship {
    /// Plain string comparison on every field, action by its wire name.
    fn sort_key(&self) -> (&str, &str, &str, &str, &str) {
        (
            self.action.as_str(),
            self.name.as_str(),
            self.technology.as_str(),
            self.proto.as_str(),
            self.description.as_str(),
        )
    }
}
