//! @ai:module:intent Render service descriptors and write them to disk
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, PlannedOutput, render, plan_outputs, write_outputs, format_summary
//! @ai:module:depends_on servicefile, error

use crate::error::{Error, Result};
use crate::servicefile::ServiceFile;
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    JsonPretty,
}

/// @ai:intent A rendered descriptor and the path it will be written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOutput {
    pub service: String,
    pub path: PathBuf,
    pub content: String,
}

/// @ai:intent Render one descriptor in the requested format
/// @ai:effects pure
pub fn render(file: &ServiceFile, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => file.to_yaml(),
        OutputFormat::Json => Ok(serde_json::to_string(file)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(file)? + "\n"),
    }
}

/// @ai:intent Render every descriptor and decide its destination before anything is written
/// @ai:post one service is written to output; several go to `<lower name>.<output file name>` beside it
/// @ai:edge_cases two services mapping to the same file name fail the plan
/// @ai:effects pure
pub fn plan_outputs(
    files: &[ServiceFile],
    output: &Path,
    format: OutputFormat,
) -> Result<Vec<PlannedOutput>> {
    let mut planned = Vec::with_capacity(files.len());
    let mut seen = HashSet::new();

    for file in files {
        let path = if files.len() == 1 {
            output.to_path_buf()
        } else {
            per_service_path(output, &file.info.name)
        };

        if !seen.insert(path.clone()) {
            return Err(Error::OutputCollision(path));
        }

        planned.push(PlannedOutput {
            service: file.info.name.clone(),
            path,
            content: render(file, format)?,
        });
    }

    Ok(planned)
}

/// @ai:intent Derive the per-service file path from the output suffix
/// @ai:example ("docs/servicefile.yaml", "Auth") -> "docs/auth.servicefile.yaml"
/// @ai:effects pure
fn per_service_path(output: &Path, service: &str) -> PathBuf {
    let suffix = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem: String = service
        .to_lowercase()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_whitespace() {
                '-'
            } else {
                c
            }
        })
        .collect();

    output.with_file_name(format!("{stem}.{suffix}"))
}

/// @ai:intent Write planned outputs, each through a temp file renamed into place
/// @ai:effects fs:write
pub fn write_outputs(planned: &[PlannedOutput]) -> Result<()> {
    for output in planned {
        write_atomic(&output.path, &output.content)?;
    }
    Ok(())
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&tmp, content).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        fs::remove_file(&tmp).ok();
        write_err(e)
    })
}

/// @ai:intent Format a human-readable report of written descriptors
/// @ai:effects pure
pub fn format_summary(planned: &[PlannedOutput]) -> String {
    let mut output = String::new();

    for item in planned {
        output.push_str(&format!(
            "{} ServiceFile for '{}' saved to {}\n",
            "OK".green().bold(),
            item.service.cyan(),
            item.path.display().to_string().dimmed()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servicefile::{Relationship, RelationshipAction};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn service(name: &str) -> ServiceFile {
        let mut sf = ServiceFile::new(name);
        sf.relationships.push(Relationship {
            action: RelationshipAction::Uses,
            name: "Redis".to_string(),
            description: String::new(),
            technology: "redis".to_string(),
            proto: String::new(),
        });
        sf
    }

    #[test]
    fn test_single_service_goes_to_output_path() {
        let planned = plan_outputs(
            &[service("Example")],
            Path::new("out/servicefile.yaml"),
            OutputFormat::Yaml,
        )
        .unwrap();

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].path, PathBuf::from("out/servicefile.yaml"));
    }

    #[test]
    fn test_multiple_services_use_lowercase_prefix() {
        let planned = plan_outputs(
            &[service("Auth"), service("User Profiles")],
            Path::new("docs/servicefile.yaml"),
            OutputFormat::Yaml,
        )
        .unwrap();

        let paths: Vec<_> = planned.iter().map(|p| p.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("docs/auth.servicefile.yaml"),
                PathBuf::from("docs/user-profiles.servicefile.yaml"),
            ]
        );
    }

    #[test]
    fn test_case_collision_is_rejected() {
        let result = plan_outputs(
            &[service("Auth"), service("auth")],
            Path::new("servicefile.yaml"),
            OutputFormat::Yaml,
        );

        assert!(matches!(result, Err(Error::OutputCollision(_))));
    }

    #[test]
    fn test_render_json_round_trips() {
        let sf = service("Example");
        let json = render(&sf, OutputFormat::Json).unwrap();
        let back: ServiceFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sf);

        let pretty = render(&sf, OutputFormat::JsonPretty).unwrap();
        assert!(pretty.contains("\"servicefile\": \"0.1.0\""));
    }

    #[test]
    fn test_write_outputs_creates_files() {
        let dir = TempDir::new().unwrap();
        let planned = plan_outputs(
            &[service("Auth"), service("User")],
            &dir.path().join("nested/servicefile.yaml"),
            OutputFormat::Yaml,
        )
        .unwrap();

        write_outputs(&planned).unwrap();

        let written = ServiceFile::load(&dir.path().join("nested/auth.servicefile.yaml")).unwrap();
        assert_eq!(written, service("Auth"));
        assert!(dir.path().join("nested/user.servicefile.yaml").exists());

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_outputs_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servicefile.yaml");
        fs::write(&path, "stale").unwrap();

        let planned = plan_outputs(&[service("Example")], &path, OutputFormat::Yaml).unwrap();
        write_outputs(&planned).unwrap();

        assert_eq!(ServiceFile::load(&path).unwrap(), service("Example"));
    }

    #[test]
    fn test_summary_lists_every_service() {
        let planned = plan_outputs(
            &[service("Auth"), service("User")],
            Path::new("servicefile.yaml"),
            OutputFormat::Yaml,
        )
        .unwrap();

        let summary = format_summary(&planned);
        assert!(summary.contains("Auth"));
        assert!(summary.contains("User"));
        assert_eq!(summary.lines().count(), 2);
    }
}
