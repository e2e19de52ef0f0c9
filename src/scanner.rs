//! @ai:module:intent Walk a source tree and turn its tag comments into service descriptors
//! @ai:module:layer application
//! @ai:module:public_api scan, scan_with, Scanner, ScanConfig
//! @ai:module:depends_on parser, tag, aggregator, repository, error
//! @ai:module:stateless false

use crate::aggregator::{Accumulator, AggregateConfig};
use crate::error::{Error, Result};
use crate::language::is_supported_file;
use crate::parser::parse_file;
use crate::repository::{enrich, needs_repository, GitRemote, RemoteLookup};
use crate::servicefile::ServiceFile;
use crate::tag::TagParser;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// @ai:intent Configuration for one directory scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub recursive: bool,
    pub detect_repository: bool,
    pub git_timeout: Duration,
    pub aggregate: AggregateConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            detect_repository: true,
            git_timeout: Duration::from_secs(5),
            aggregate: AggregateConfig::default(),
        }
    }
}

/// @ai:intent Owns the accumulated state of exactly one directory-tree scan
pub struct Scanner {
    tags: TagParser,
    accumulator: Accumulator,
    files_scanned: usize,
}

impl Scanner {
    /// @ai:intent Create a scanner with an empty accumulator
    pub fn new() -> Self {
        Self {
            tags: TagParser::new(),
            accumulator: Accumulator::new(),
            files_scanned: 0,
        }
    }

    /// @ai:intent Accumulate the declarations of every comment block in one file
    /// @ai:pre path has a supported extension
    /// @ai:effects fs:read
    pub fn scan_file(&mut self, path: &Path) -> Result<()> {
        let parsed = parse_file(path)?;
        self.files_scanned += 1;

        for block in &parsed.comment_blocks {
            if let Some(declarations) = self.tags.parse_block(&block.text()) {
                debug!(
                    file = %path.display(),
                    language = parsed.language.name(),
                    line = block.start_line,
                    "found service tags"
                );
                self.accumulator.add(declarations);
            }
        }

        Ok(())
    }

    /// @ai:intent Scan every supported file under dir in file-name order
    /// @ai:post hidden files and directories below dir are skipped
    /// @ai:edge_cases the first unreadable path or malformed file aborts the walk
    /// @ai:effects fs:read
    pub fn scan_dir(&mut self, dir: &Path, recursive: bool) -> Result<()> {
        let mut walker = WalkDir::new(dir).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        for entry in walker.into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = entry.map_err(|e| Error::Walk {
                path: e.path().unwrap_or(dir).to_path_buf(),
                source: e,
            })?;

            if !entry.file_type().is_file() || !is_supported_file(entry.path()) {
                continue;
            }

            self.scan_file(entry.path())?;
        }

        Ok(())
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// @ai:intent Consume the scanner and build descriptors keyed by service name
    pub fn finish(self, config: &AggregateConfig) -> Result<BTreeMap<String, ServiceFile>> {
        info!(
            files = self.files_scanned,
            services = self.accumulator.service_count(),
            relationships = self.accumulator.relationship_count(),
            "scan complete"
        );
        self.accumulator.build(config)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Hidden entries below the scan root, such as .git
/// @ai:effects pure
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// @ai:intent Scan dir and return its service descriptors ordered by service name
/// @ai:effects fs:read, process:spawn
pub fn scan(dir: &Path, config: &ScanConfig) -> Result<Vec<ServiceFile>> {
    let lookup = GitRemote {
        timeout: config.git_timeout,
    };
    scan_with(dir, config, &lookup)
}

/// @ai:intent Scan dir using the given remote lookup for repository detection
/// @ai:post descriptors are ordered by service name, relationships canonically sorted
/// @ai:effects fs:read
pub fn scan_with(
    dir: &Path,
    config: &ScanConfig,
    lookup: &dyn RemoteLookup,
) -> Result<Vec<ServiceFile>> {
    let mut scanner = Scanner::new();
    scanner.scan_dir(dir, config.recursive)?;

    let mut files = scanner.finish(&config.aggregate)?;

    if config.detect_repository && needs_repository(files.values()) {
        if let Some(url) = enrich(files.values_mut(), dir, lookup) {
            info!(repository = %url, "detected repository");
        }
    }

    Ok(files.into_values().collect())
}
