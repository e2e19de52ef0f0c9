//! @ai:module:intent Merge declarations from every scanned file into per-service descriptors
//! @ai:module:layer application
//! @ai:module:public_api Accumulator, AggregateConfig, DuplicatePolicy
//! @ai:module:depends_on annotation, servicefile, error
//! @ai:module:stateless false

use crate::annotation::{
    Addressing, BlockDeclarations, RelationshipDeclaration, ServiceDeclaration,
};
use crate::error::{Error, Result};
use crate::servicefile::{Info, Relationship, ServiceFile};
use std::collections::BTreeMap;
use tracing::debug;

/// @ai:intent How to treat two different declarations of the same service name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateService`.
    #[default]
    Reject,
    /// Keep the declaration seen last in traversal order.
    LastWins,
}

/// @ai:intent Configuration for the graph build
#[derive(Debug, Clone, Default)]
pub struct AggregateConfig {
    pub duplicate_services: DuplicatePolicy,
}

/// @ai:intent Declarations collected during one scan, consumed by `build`
#[derive(Debug, Default)]
pub struct Accumulator {
    services: Vec<ServiceDeclaration>,
    relationships: Vec<RelationshipDeclaration>,
}

impl Accumulator {
    /// @ai:intent Create an empty accumulator for a new scan
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Record whatever one comment block declared
    pub fn add(&mut self, declarations: BlockDeclarations) {
        match declarations {
            BlockDeclarations::Service(service) => self.add_service(service),
            BlockDeclarations::Relationships(relationships) => {
                self.relationships.extend(relationships)
            }
        }
    }

    /// @ai:intent Record one service declaration
    pub fn add_service(&mut self, service: ServiceDeclaration) {
        self.services.push(service);
    }

    /// @ai:intent Record one relationship declaration
    pub fn add_relationship(&mut self, relationship: RelationshipDeclaration) {
        self.relationships.push(relationship);
    }

    /// @ai:intent Number of service declarations recorded so far
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// @ai:intent Number of relationship declarations recorded so far
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// @ai:intent Build canonically sorted service descriptors keyed by service name
    /// @ai:post every relationship is attached to exactly one descriptor
    /// @ai:post every descriptor's relationships are in canonical order
    /// @ai:edge_cases mixed addressing, no seeded service for implicit addressing, empty result
    /// @ai:effects pure
    pub fn build(self, config: &AggregateConfig) -> Result<BTreeMap<String, ServiceFile>> {
        check_addressing(&self.relationships)?;

        let mut files = seed(self.services, config.duplicate_services)?;
        let seeded: Vec<String> = files.keys().cloned().collect();

        for declaration in self.relationships {
            let owner = resolve_owner(&declaration, &seeded)?;

            let file = files.entry(owner).or_insert_with_key(|name| {
                debug!(service = %name, "synthesizing service from explicit relationship");
                ServiceFile::new(name.clone())
            });

            file.relationships.push(Relationship {
                action: declaration.action,
                name: declaration.target_name,
                description: declaration.description,
                technology: declaration.technology,
                proto: declaration.proto,
            });
        }

        if files.is_empty() {
            return Err(Error::NoServicesFound);
        }

        for file in files.values_mut() {
            file.sort();
        }

        Ok(files)
    }
}

/// @ai:intent Reject a run whose relationships use both addressing styles
/// @ai:effects pure
fn check_addressing(relationships: &[RelationshipDeclaration]) -> Result<()> {
    let has_explicit = relationships
        .iter()
        .any(|r| r.addressing() == Addressing::Explicit);
    let has_implicit = relationships
        .iter()
        .any(|r| r.addressing() == Addressing::Implicit);

    if has_explicit && has_implicit {
        return Err(Error::MixedAddressing);
    }

    Ok(())
}

/// @ai:intent Create one descriptor per distinct declared service name
/// @ai:edge_cases identical re-declarations are accepted under either policy
/// @ai:effects pure
fn seed(
    services: Vec<ServiceDeclaration>,
    policy: DuplicatePolicy,
) -> Result<BTreeMap<String, ServiceFile>> {
    let mut declared: BTreeMap<String, ServiceDeclaration> = BTreeMap::new();

    for service in services {
        if let Some(previous) = declared.get(&service.name) {
            if *previous != service {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(Error::DuplicateService(service.name));
                    }
                    DuplicatePolicy::LastWins => {
                        debug!(service = %service.name, "later service declaration overrides earlier one");
                    }
                }
            }
        }
        declared.insert(service.name.clone(), service);
    }

    Ok(declared
        .into_iter()
        .map(|(name, service)| {
            let file = ServiceFile {
                info: Info {
                    name: service.name,
                    description: service.description,
                    system: service.system,
                    owner: service.owner,
                    repository: service.repository,
                    tags: service.tags,
                },
                ..ServiceFile::new(String::new())
            };
            (name, file)
        })
        .collect())
}

/// @ai:intent Find the service a relationship belongs to
/// @ai:pre addressing has already been checked for consistency
/// @ai:post implicit relationships resolve only when exactly one service is seeded
/// @ai:effects pure
fn resolve_owner(relationship: &RelationshipDeclaration, seeded: &[String]) -> Result<String> {
    if let Some(name) = &relationship.service_name {
        return Ok(name.clone());
    }

    match seeded {
        [only] => Ok(only.clone()),
        [] => Err(Error::NoServiceFound {
            relationship: relationship.to_string(),
        }),
        candidates => Err(Error::AmbiguousService {
            relationship: relationship.to_string(),
            candidates: candidates.to_vec(),
        }),
    }
}
