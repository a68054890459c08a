//! Generation settings resolved from the command line and the project's `Cargo.toml`.

use crate::cli::{CliArgs, OutputFormat};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

/// Version used when neither the command line nor the manifest provides one
pub const DEFAULT_VERSION: &str = "1.0.0";

/// `[package]` metadata of the scanned project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl ProjectMetadata {
    /// Read `Cargo.toml` in `project_path`; a missing manifest yields empty metadata.
    ///
    /// Values that are not plain strings, such as `version.workspace = true`, are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be read or parsed.
    pub fn load(project_path: &Path) -> Result<Self> {
        let manifest_path = project_path.join("Cargo.toml");
        if !manifest_path.exists() {
            debug!("No manifest at {}", manifest_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
        let manifest: Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?;

        let package_field = |key: &str| {
            manifest
                .get("package")
                .and_then(|package| package.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            name: package_field("name"),
            version: package_field("version"),
        })
    }
}

/// Everything one generation run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub project_path: PathBuf,
    /// Used in route paths and the default output directory
    pub artifact_id: String,
    pub title: String,
    pub version: String,
    /// Module path prefixes to search for actions; empty means every module
    pub action_packages: Vec<String>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

impl GeneratorConfig {
    /// Fill in everything the command line leaves open.
    ///
    /// The artifact id falls back to the manifest's package name and then to the project
    /// directory name. The title falls back to the artifact id, the version to the manifest's
    /// version and then [`DEFAULT_VERSION`]. The output directory defaults to
    /// `<project>/target/classes/apps/<artifact id>/docs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is needed but unreadable, or no artifact id can be found.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let metadata = if args.artifact_id.is_some() && args.api_version.is_some() {
            ProjectMetadata::default()
        } else {
            ProjectMetadata::load(&args.project_path)?
        };

        let artifact_id = args
            .artifact_id
            .clone()
            .or(metadata.name)
            .or_else(|| directory_name(&args.project_path))
            .context("Could not determine the artifact id; pass --artifact-id")?;

        let title = args.title.clone().unwrap_or_else(|| artifact_id.clone());
        let version = args
            .api_version
            .clone()
            .or(metadata.version)
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let output_dir = args.output_dir.clone().unwrap_or_else(|| {
            args.project_path
                .join("target")
                .join("classes")
                .join("apps")
                .join(&artifact_id)
                .join("docs")
        });

        if args.action_packages.is_empty() {
            warn!("No action packages configured. Processing all modules of the project.");
        }

        Ok(Self {
            project_path: args.project_path.clone(),
            artifact_id,
            title,
            version,
            action_packages: args.action_packages.clone(),
            output_dir,
            format: args.output_format,
        })
    }
}

fn directory_name(path: &Path) -> Option<String> {
    path.canonicalize()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(project_path: &Path) -> CliArgs {
        CliArgs {
            project_path: project_path.to_path_buf(),
            title: None,
            api_version: None,
            artifact_id: None,
            action_packages: Vec::new(),
            output_dir: None,
            output_format: OutputFormat::Yaml,
            verbose: false,
        }
    }

    #[test]
    fn test_load_manifest() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[package]\nname = \"shop\"\nversion = \"2.3.0\"\n",
        )
        .unwrap();

        let metadata = ProjectMetadata::load(temp_dir.path()).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("shop"));
        assert_eq!(metadata.version.as_deref(), Some("2.3.0"));
    }

    #[test]
    fn test_load_manifest_workspace_version() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[package]\nname = \"shop\"\nversion.workspace = true\n",
        )
        .unwrap();

        let metadata = ProjectMetadata::load(temp_dir.path()).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("shop"));
        assert!(metadata.version.is_none());
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            ProjectMetadata::load(temp_dir.path()).unwrap(),
            ProjectMetadata::default()
        );
    }

    #[test]
    fn test_load_invalid_manifest() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Cargo.toml"), "[package\nname = ").unwrap();

        let err = ProjectMetadata::load(temp_dir.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse manifest"));
    }

    #[test]
    fn test_resolve_defaults_from_manifest() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[package]\nname = \"shop\"\nversion = \"2.3.0\"\n",
        )
        .unwrap();

        let config = GeneratorConfig::resolve(&args(temp_dir.path())).unwrap();
        assert_eq!(config.artifact_id, "shop");
        assert_eq!(config.title, "shop");
        assert_eq!(config.version, "2.3.0");
        assert_eq!(
            config.output_dir,
            temp_dir.path().join("target/classes/apps/shop/docs")
        );
    }

    #[test]
    fn test_resolve_command_line_wins() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[package]\nname = \"shop\"\nversion = \"2.3.0\"\n",
        )
        .unwrap();

        let mut cli_args = args(temp_dir.path());
        cli_args.title = Some("Shop API".to_string());
        cli_args.artifact_id = Some("store".to_string());
        cli_args.output_dir = Some(temp_dir.path().join("out"));

        let config = GeneratorConfig::resolve(&cli_args).unwrap();
        assert_eq!(config.artifact_id, "store");
        assert_eq!(config.title, "Shop API");
        assert_eq!(config.version, "2.3.0");
        assert_eq!(config.output_dir, temp_dir.path().join("out"));
    }

    #[test]
    fn test_resolve_without_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("billing");
        fs::create_dir(&project).unwrap();

        let config = GeneratorConfig::resolve(&args(&project)).unwrap();
        assert_eq!(config.artifact_id, "billing");
        assert_eq!(config.version, DEFAULT_VERSION);
    }
}
