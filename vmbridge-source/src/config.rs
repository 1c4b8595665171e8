//! `vmbridge.toml` configuration.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, SourceContext};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "vmbridge.toml";

/// Root of `vmbridge.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub project: ProjectConfig,

    #[serde(default)]
    pub markers: MarkerConfig,

    #[serde(default)]
    pub generate: GenerateConfig,
}

/// `[project]`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Namespace of the generated code; also drives the schema package.
    pub namespace: String,

    /// Simple or qualified name of the view model to generate for.
    #[serde(default)]
    pub view_model: Option<String>,

    /// Files or directories containing the view model declarations.
    #[serde(default = "default_sources")]
    pub sources: Vec<PathBuf>,

    /// Directories searched for dependent type declarations.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

/// `[markers]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerConfig {
    pub observable_property: String,
    pub command: String,
    pub view_model_base: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            observable_property: "CommunityToolkit.Mvvm.ComponentModel.ObservablePropertyAttribute"
                .to_string(),
            command: "CommunityToolkit.Mvvm.Input.RelayCommandAttribute".to_string(),
            view_model_base: "ObservableObject".to_string(),
        }
    }
}

/// `[generate]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    pub schema: bool,
    pub server: bool,
    pub client: bool,
    pub typescript: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            schema: true,
            server: true,
            client: true,
            typescript: true,
        }
    }
}

fn default_sources() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_output() -> PathBuf {
    PathBuf::from("generated")
}

impl FromStr for Config {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_config(s, CONFIG_FILE)
    }
}

impl Config {
    /// Parse a configuration file. Relative paths in `[project]` are resolved
    /// against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = parse_config(&content, &path.display().to_string())?;
        if let Some(dir) = path.parent() {
            config.project.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Parse a configuration with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_config(content, filename)
    }
}

impl ProjectConfig {
    /// Make relative source, search and output paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &PathBuf| if p.is_relative() { base.join(p) } else { p.clone() };
        self.sources = self.sources.iter().map(join).collect();
        self.search_paths = self.search_paths.iter().map(join).collect();
        self.output = join(&self.output);
    }
}

fn parse_config(content: &str, filename: &str) -> Result<Config> {
    let ctx = SourceContext::new(content, filename);
    let config: Config = toml::from_str(content).map_err(|e| ctx.config_error(e))?;
    validate(&config, &ctx)?;
    Ok(config)
}

fn validate(config: &Config, ctx: &SourceContext) -> Result<()> {
    let namespace = &config.project.namespace;
    if !is_qualified_identifier(namespace) {
        return Err(ctx.invalid_config(format!(
            "project.namespace '{}' is not a valid dotted identifier",
            namespace
        )));
    }

    if let Some(view_model) = &config.project.view_model {
        if !is_qualified_identifier(view_model) {
            return Err(ctx.invalid_config(format!(
                "project.view_model '{}' is not a valid type name",
                view_model
            )));
        }
    }

    let markers = [
        ("observable_property", &config.markers.observable_property),
        ("command", &config.markers.command),
        ("view_model_base", &config.markers.view_model_base),
    ];
    for (key, value) in markers {
        if !is_qualified_identifier(value) {
            return Err(ctx.invalid_config(format!(
                "markers.{} '{}' is not a valid type name",
                key, value
            )));
        }
    }

    if config.project.sources.is_empty() {
        return Err(ctx.invalid_config("project.sources must not be empty"));
    }
    Ok(())
}

fn is_qualified_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = r#"
[project]
namespace = "Demo.ViewModels"
"#
        .parse()
        .unwrap();

        assert_eq!(config.project.namespace, "Demo.ViewModels");
        assert_eq!(config.project.view_model, None);
        assert_eq!(config.project.sources, vec![PathBuf::from(".")]);
        assert_eq!(config.project.output, PathBuf::from("generated"));
        assert_eq!(config.markers, MarkerConfig::default());
        assert_eq!(config.generate, GenerateConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config: Config = r#"
[project]
namespace = "Demo.ViewModels"
view_model = "MainViewModel"
sources = ["src/ViewModels"]
search_paths = ["src/Models", "shared"]
output = "out"

[markers]
observable_property = "ObservableProperty"
command = "RelayCommand"

[generate]
typescript = false
"#
        .parse()
        .unwrap();

        assert_eq!(config.project.view_model.as_deref(), Some("MainViewModel"));
        assert_eq!(config.project.search_paths.len(), 2);
        assert_eq!(config.markers.observable_property, "ObservableProperty");
        assert_eq!(config.markers.view_model_base, "ObservableObject");
        assert!(config.generate.schema);
        assert!(!config.generate.typescript);
    }

    #[test]
    fn test_missing_namespace_is_parse_error() {
        let err = "[project]\nview_model = \"Vm\"\n".parse::<Config>().unwrap_err();
        assert!(matches!(*err, Error::Config { .. }));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = "[project]\nnamespace = \"Demo\"\nnamspace = \"x\"\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(matches!(*err, Error::Config { .. }));
    }

    #[test]
    fn test_invalid_namespace_is_rejected() {
        let err = "[project]\nnamespace = \"Demo..Models\"\n"
            .parse::<Config>()
            .unwrap_err();
        match *err {
            Error::InvalidConfig { message, .. } => assert!(message.contains("project.namespace")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[project]\nnamespace = \"Demo\"\nsources = [\"vm\"]\nsearch_paths = [\"models\"]\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.project.sources, vec![temp.path().join("vm")]);
        assert_eq!(config.project.search_paths, vec![temp.path().join("models")]);
        assert_eq!(config.project.output, temp.path().join("generated"));
    }
}
