//! @ai:module:intent Define transient declarations produced from one comment block
//! @ai:module:layer domain
//! @ai:module:public_api ServiceDeclaration, RelationshipDeclaration, BlockDeclarations, Addressing
//! @ai:module:stateless true

use crate::servicefile::RelationshipAction;
use std::fmt;

/// @ai:intent Service identity declared by a `service:name` block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDeclaration {
    pub name: String,
    pub description: String,
    pub system: String,
    pub owner: String,
    pub repository: String,
    pub tags: Vec<String>,
}

/// @ai:intent One relationship opened by a `service:<action>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDeclaration {
    /// Owning service, present only with explicit addressing.
    pub service_name: Option<String>,
    pub action: RelationshipAction,
    pub target_name: String,
    pub technology: String,
    pub proto: String,
    pub description: String,
}

/// @ai:intent Relationship addressing style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    Explicit,
    Implicit,
}

/// @ai:intent Everything one comment block declares; a block is never both kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockDeclarations {
    Service(ServiceDeclaration),
    Relationships(Vec<RelationshipDeclaration>),
}

impl RelationshipDeclaration {
    /// @ai:intent Create a relationship with only an action and target
    pub fn new(
        service_name: Option<String>,
        action: RelationshipAction,
        target_name: impl Into<String>,
    ) -> Self {
        Self {
            service_name,
            action,
            target_name: target_name.into(),
            technology: String::new(),
            proto: String::new(),
            description: String::new(),
        }
    }

    /// @ai:intent Report which addressing style this relationship uses
    /// @ai:effects pure
    pub fn addressing(&self) -> Addressing {
        match self.service_name {
            Some(_) => Addressing::Explicit,
            None => Addressing::Implicit,
        }
    }
}

impl fmt::Display for RelationshipDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "service_name: {}, action: {}, target_name: {}, technology: {}, proto: {}, description: {}",
            self.service_name.as_deref().unwrap_or(""),
            self.action,
            self.target_name,
            self.technology,
            self.proto,
            self.description,
        )
    }
}
