//! @ai:module:intent Service descriptor generator driven by architecture tags in source comments
//! @ai:module:layer infrastructure
//! @ai:module:public_api scanner, tag, aggregator, repository, servicefile, output, parser, language, error
//! @ai:module:stateless true
//!
//! # servicefile
//!
//! Reads `service:` tags from source comments across a directory tree and
//! assembles them into one descriptor per service: its identity plus its
//! relationships to databases, APIs, queues and other services.
//!
//! ```text
//! // service:name Example
//! // description: Example service for exampling stuff.
//!
//! // service:uses PostgreSQL
//! // description: Stores user data and authentication tokens
//! // technology:postgresql
//! // proto:tcp
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use servicefile::{output, scan, OutputFormat, ScanConfig};
//! use std::path::Path;
//!
//! let files = scan(Path::new("."), &ScanConfig::default()).unwrap();
//! for file in &files {
//!     println!("{}", output::render(file, OutputFormat::Yaml).unwrap());
//! }
//! ```

pub mod aggregator;
pub mod annotation;
pub mod error;
pub mod language;
pub mod output;
pub mod parser;
pub mod repository;
pub mod scanner;
pub mod servicefile;
pub mod tag;

pub use aggregator::{Accumulator, AggregateConfig, DuplicatePolicy};
pub use annotation::{Addressing, BlockDeclarations, RelationshipDeclaration, ServiceDeclaration};
pub use error::{Error, Result};
pub use language::{detect_language, is_supported_file, Language};
pub use output::{format_summary, plan_outputs, render, write_outputs, OutputFormat, PlannedOutput};
pub use repository::{normalize_remote_url, GitRemote, RemoteLookup};
pub use scanner::{scan, scan_with, ScanConfig, Scanner};
pub use servicefile::{Info, Relationship, RelationshipAction, ServiceFile, VERSION};
pub use tag::{Directive, TagParser};
