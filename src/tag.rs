//! @ai:module:intent Parse service tag directives out of one comment block
//! @ai:module:layer application
//! @ai:module:public_api TagParser, Directive
//! @ai:module:depends_on annotation, language, servicefile
//! @ai:module:stateless true

use crate::annotation::{BlockDeclarations, RelationshipDeclaration, ServiceDeclaration};
use crate::language::strip_comment_markers;
use crate::servicefile::RelationshipAction;
use regex::{Captures, Regex};
use tracing::debug;

/// @ai:intent A single recognized tag line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    ServiceName(String),
    Relationship {
        service_name: Option<String>,
        action: RelationshipAction,
        target: String,
    },
    /// `service:` opener whose action is empty or not a known verb.
    UnknownAction(String),
    Description(String),
    System(String),
    Owner(String),
    Repository(String),
    Tags(Vec<String>),
    Technology(String),
    Proto(String),
}

struct Rule {
    pattern: Regex,
    build: fn(&Captures<'_>) -> Directive,
}

/// @ai:intent Line-oriented grammar with one rule per directive
pub struct TagParser {
    rules: Vec<Rule>,
}

/// Where trailing field lines currently land.
enum Open {
    Nothing,
    Service,
    Relationship,
}

impl TagParser {
    /// @ai:intent Compile the directive grammar
    /// @ai:post rules are tried in order; `service:name` precedes relationship openers
    pub fn new() -> Self {
        let rules = vec![
            rule(r"^service:name(?:\s+(?P<value>.*))?$", |c| {
                Directive::ServiceName(value(c))
            }),
            rule(
                r"^service:(?P<path>\S*)(?:\s+(?P<target>.*))?$",
                build_relationship,
            ),
            rule(r"^description:\s*(?P<value>.*)$", |c| {
                Directive::Description(value(c))
            }),
            rule(r"^system:\s*(?P<value>.*)$", |c| Directive::System(value(c))),
            rule(r"^owner:\s*(?P<value>.*)$", |c| Directive::Owner(value(c))),
            rule(r"^repository:\s*(?P<value>.*)$", |c| {
                Directive::Repository(value(c))
            }),
            rule(r"^tags:\s*(?P<value>.*)$", |c| {
                Directive::Tags(split_tags(&value(c)))
            }),
            rule(r"^technology:\s*(?P<value>.*)$", |c| {
                Directive::Technology(value(c))
            }),
            rule(r"^proto:\s*(?P<value>.*)$", |c| Directive::Proto(value(c))),
        ];

        Self { rules }
    }

    /// @ai:intent Match one marker-stripped line against the grammar
    /// @ai:post None for any line no rule recognizes
    /// @ai:example ("service:uses PostgreSQL") -> Some(Relationship { None, Uses, "PostgreSQL" })
    /// @ai:example ("technology:grpc") -> Some(Technology("grpc"))
    /// @ai:example ("just prose") -> None
    /// @ai:effects pure
    pub fn parse_line(&self, line: &str) -> Option<Directive> {
        self.rules.iter().find_map(|rule| {
            rule.pattern
                .captures(line)
                .map(|captures| (rule.build)(&captures))
        })
    }

    /// @ai:intent Classify a raw comment block and extract its declarations
    /// @ai:pre text holds the block's raw lines, comment markers included
    /// @ai:post a block with a `service:name` line yields only a service declaration
    /// @ai:edge_cases unrecognized lines are skipped, never reported
    /// @ai:effects pure
    pub fn parse_block(&self, text: &str) -> Option<BlockDeclarations> {
        let directives: Vec<Directive> = text
            .lines()
            .map(strip_comment_markers)
            .filter_map(|line| self.parse_line(line))
            .collect();

        if directives
            .iter()
            .any(|d| matches!(d, Directive::ServiceName(_)))
        {
            service_block(directives).map(BlockDeclarations::Service)
        } else {
            let relationships = relationship_block(directives);
            if relationships.is_empty() {
                None
            } else {
                Some(BlockDeclarations::Relationships(relationships))
            }
        }
    }
}

impl Default for TagParser {
    fn default() -> Self {
        Self::new()
    }
}

fn rule(pattern: &str, build: fn(&Captures<'_>) -> Directive) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("Invalid regex"),
        build,
    }
}

fn value(captures: &Captures<'_>) -> String {
    captures
        .name("value")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// @ai:intent Split a `tags:` value on commas, dropping empty entries
/// @ai:example ("a, b ,c") -> ["a", "b", "c"]
/// @ai:example ("") -> []
/// @ai:effects pure
fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// @ai:intent Build a relationship opener from `service:[owner:]action [target]`
/// @ai:post action is the last colon-delimited token, owner everything before it
/// @ai:effects pure
fn build_relationship(captures: &Captures<'_>) -> Directive {
    let path = captures.name("path").map_or("", |m| m.as_str());
    let target = captures
        .name("target")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let (service_name, action) = match path.rsplit_once(':') {
        Some((owner, action)) if !owner.is_empty() => (Some(owner.to_string()), action),
        Some((_, action)) => (None, action),
        None => (None, path),
    };

    match action.parse::<RelationshipAction>() {
        Ok(action) => Directive::Relationship {
            service_name,
            action,
            target,
        },
        Err(_) => Directive::UnknownAction(action.to_string()),
    }
}

/// @ai:intent Fold directives of a service-definition block into one declaration
/// @ai:post None when the declared name is empty
/// @ai:effects pure
fn service_block(directives: Vec<Directive>) -> Option<ServiceDeclaration> {
    let mut service = ServiceDeclaration::default();
    let mut open = Open::Nothing;

    for directive in directives {
        match directive {
            Directive::ServiceName(name) => {
                service.name = name;
                open = Open::Service;
            }
            Directive::Relationship { .. } | Directive::UnknownAction(_) => {
                debug!("ignoring relationship line inside a service definition block");
                open = Open::Relationship;
            }
            field => {
                if matches!(open, Open::Service) {
                    apply_service_field(&mut service, field);
                }
            }
        }
    }

    if service.name.is_empty() {
        debug!("discarding service definition without a name");
        return None;
    }

    Some(service)
}

/// @ai:intent Apply a field directive to the open service declaration
/// @ai:effects pure
fn apply_service_field(service: &mut ServiceDeclaration, directive: Directive) {
    match directive {
        Directive::Description(v) => service.description = v,
        Directive::System(v) => service.system = v,
        Directive::Owner(v) => service.owner = v,
        Directive::Repository(v) => service.repository = v,
        Directive::Tags(tags) => service.tags = tags,
        _ => {}
    }
}

/// @ai:intent Fold directives of a relationship-definition block into declarations
/// @ai:post one declaration per recognized opener, in block order
/// @ai:effects pure
fn relationship_block(directives: Vec<Directive>) -> Vec<RelationshipDeclaration> {
    let mut relationships = Vec::new();
    let mut current: Option<RelationshipDeclaration> = None;

    for directive in directives {
        match directive {
            Directive::Relationship {
                service_name,
                action,
                target,
            } => {
                relationships.extend(current.take());
                current = Some(RelationshipDeclaration::new(service_name, action, target));
            }
            Directive::UnknownAction(action) => {
                debug!(action = %action, "skipping relationship with unknown action");
                relationships.extend(current.take());
            }
            field => {
                if let Some(relationship) = current.as_mut() {
                    apply_relationship_field(relationship, field);
                }
            }
        }
    }

    relationships.extend(current);
    relationships
}

/// @ai:intent Apply a field directive to the open relationship
/// @ai:effects pure
fn apply_relationship_field(relationship: &mut RelationshipDeclaration, directive: Directive) {
    match directive {
        Directive::Description(v) => relationship.description = v,
        Directive::Technology(v) => relationship.technology = v,
        Directive::Proto(v) => relationship.proto = v,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Option<BlockDeclarations> {
        TagParser::new().parse_block(text)
    }

    fn relationships(text: &str) -> Vec<RelationshipDeclaration> {
        match parse(text) {
            Some(BlockDeclarations::Relationships(r)) => r,
            other => panic!("expected relationships, got {other:?}"),
        }
    }

    #[test]
    fn test_service_definition_block() {
        let block = "// service:name Example\n// description: Example service for exampling stuff.\n// system: shop\n// owner: team-a\n// repository: https://example.com/repo\n// tags: core, users";

        let expected = ServiceDeclaration {
            name: "Example".to_string(),
            description: "Example service for exampling stuff.".to_string(),
            system: "shop".to_string(),
            owner: "team-a".to_string(),
            repository: "https://example.com/repo".to_string(),
            tags: vec!["core".to_string(), "users".to_string()],
        };

        assert_eq!(parse(block), Some(BlockDeclarations::Service(expected)));
    }

    #[test]
    fn test_relationship_block_implicit() {
        let block = "/*\nservice:uses PostgreSQL\ndescription: Stores user data and authentication tokens\ntechnology:postgresql\nproto:tcp\n*/";
        let rels = relationships(block);

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].service_name, None);
        assert_eq!(rels[0].action, RelationshipAction::Uses);
        assert_eq!(rels[0].target_name, "PostgreSQL");
        assert_eq!(rels[0].technology, "postgresql");
        assert_eq!(rels[0].proto, "tcp");
        assert_eq!(
            rels[0].description,
            "Stores user data and authentication tokens"
        );
    }

    #[test]
    fn test_relationship_block_explicit() {
        let rels = relationships("// service:auth:replies user\n// technology:jwt");
        assert_eq!(rels[0].service_name.as_deref(), Some("auth"));
        assert_eq!(rels[0].action, RelationshipAction::Replies);
        assert_eq!(rels[0].target_name, "user");
    }

    #[test]
    fn test_owner_is_everything_before_last_colon() {
        let parser = TagParser::new();
        assert_eq!(
            parser.parse_line("service:billing:v2:sends Kafka topic"),
            Some(Directive::Relationship {
                service_name: Some("billing:v2".to_string()),
                action: RelationshipAction::Sends,
                target: "Kafka topic".to_string(),
            })
        );
    }

    #[test]
    fn test_relationship_without_target() {
        let rels = relationships("/*\nservice:replies\ntechnology:grpc\n*/");
        assert_eq!(rels[0].action, RelationshipAction::Replies);
        assert_eq!(rels[0].target_name, "");
    }

    #[test]
    fn test_block_opens_several_relationships() {
        let rels = relationships(
            "# service:uses Redis\n# technology:redis\n# service:sends Kafka\n# proto:tcp",
        );

        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].technology, "redis");
        assert_eq!(rels[0].proto, "");
        assert_eq!(rels[1].target_name, "Kafka");
        assert_eq!(rels[1].proto, "tcp");
    }

    #[test]
    fn test_block_without_service_line_yields_nothing() {
        assert_eq!(parse("// Package foo does things.\n// description: nope"), None);
        assert_eq!(parse("// technology:grpc"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_lines_before_first_directive_are_ignored() {
        let rels = relationships("// description: stray\n// service:uses S3\n// technology:aws");
        assert_eq!(rels[0].description, "");

        match parse("// description: stray\n// service:name Api") {
            Some(BlockDeclarations::Service(s)) => assert_eq!(s.description, ""),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_service_block_never_yields_relationships() {
        let block = "// service:name Api\n// service:uses Redis\n// description: cache";
        match parse(block) {
            Some(BlockDeclarations::Service(s)) => {
                assert_eq!(s.name, "Api");
                assert_eq!(s.description, "");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_service_name_is_discarded() {
        assert_eq!(parse("// service:name\n// description: anonymous"), None);
        assert_eq!(parse("// service:name   "), None);
    }

    #[test]
    fn test_unknown_action_closes_open_relationship() {
        let rels = relationships(
            "// service:uses Redis\n// service:calls Billing\n// technology:http\n// service:sends Kafka",
        );

        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].technology, "");
        assert_eq!(rels[1].action, RelationshipAction::Sends);
    }

    #[test]
    fn test_empty_action_is_discarded() {
        assert_eq!(parse("// service:\n// technology:grpc"), None);
        assert_eq!(parse("// service:auth: user"), None);
    }

    #[test]
    fn test_tags_splitting() {
        let parser = TagParser::new();
        assert_eq!(
            parser.parse_line("tags: a, b ,, c"),
            Some(Directive::Tags(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
        assert_eq!(parser.parse_line("tags:"), Some(Directive::Tags(vec![])));
    }

    #[test]
    fn test_unrecognized_lines() {
        let parser = TagParser::new();
        assert_eq!(parser.parse_line("Service:uses Redis"), None);
        assert_eq!(parser.parse_line("see service:uses docs"), None);
        assert_eq!(parser.parse_line("technology"), None);
    }

    #[test]
    fn test_service_name_prefix_requires_boundary() {
        let parser = TagParser::new();
        assert_eq!(
            parser.parse_line("service:names X"),
            Some(Directive::UnknownAction("names".to_string()))
        );
        assert_eq!(
            parser.parse_line("service:name:uses Redis"),
            Some(Directive::Relationship {
                service_name: Some("name".to_string()),
                action: RelationshipAction::Uses,
                target: "Redis".to_string(),
            })
        );
    }
}
