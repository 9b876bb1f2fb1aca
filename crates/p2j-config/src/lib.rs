//! Configuration primitives and loader for p2j.
//!
//! Settings are resolved with the precedence
//! override flag → working directory → git root → built-in defaults,
//! each layer read from a `.p2j.toml` file.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".p2j.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub convert: ConvertSettings,
    pub badge: BadgeSettings,
    pub sources: ConfigSources,
}

/// How script lines are turned into cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertSettings {
    pub one_line_comments: bool,
    pub unindent_block_comments: bool,
}

/// Hosted-notebook badge settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BadgeSettings {
    pub enabled: bool,
    /// Fixed repository URL; when absent the URL is looked up with git.
    pub repository_url: Option<String>,
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn default_layer() -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => f.write_str("built-in defaults"),
            (kind, Some(path)) => write!(f, "{} at {}", kind, path.display()),
            (kind, None) => write!(f, "{kind}"),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let mut merged = PartialConfig::defaults();
        let mut layers = vec![ConfigSource::default_layer()];

        let git_config_path = find_git_root(&working_dir).map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                merged.merge(load_layer(path)?);
                layers.push(ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone()));
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            merged.merge(load_layer(&local_config_path)?);
            layers.push(ConfigSource::for_file(
                ConfigSourceKind::Local,
                local_config_path.clone(),
            ));
        }

        if let Some(path) = override_path {
            merged.merge(load_layer(&path)?);
            layers.push(ConfigSource::for_file(ConfigSourceKind::Override, path));
        }

        Ok(merged.finalize(ConfigSources {
            working_directory: working_dir,
            layers,
        }))
    }
}

impl Default for Config {
    fn default() -> Self {
        PartialConfig::defaults().finalize(ConfigSources {
            working_directory: PathBuf::from("."),
            layers: vec![ConfigSource::default_layer()],
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

fn load_layer(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial())
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    one_line_comments: Option<bool>,
    unindent_block_comments: Option<bool>,
    badge_enabled: Option<bool>,
    repository_url: Option<String>,
}

impl PartialConfig {
    fn defaults() -> Self {
        PartialConfig {
            one_line_comments: Some(true),
            unindent_block_comments: Some(true),
            badge_enabled: Some(true),
            repository_url: None,
        }
    }

    fn merge(&mut self, other: PartialConfig) {
        if other.one_line_comments.is_some() {
            self.one_line_comments = other.one_line_comments;
        }
        if other.unindent_block_comments.is_some() {
            self.unindent_block_comments = other.unindent_block_comments;
        }
        if other.badge_enabled.is_some() {
            self.badge_enabled = other.badge_enabled;
        }
        if other.repository_url.is_some() {
            self.repository_url = other.repository_url;
        }
    }

    fn finalize(self, sources: ConfigSources) -> Config {
        Config {
            convert: ConvertSettings {
                one_line_comments: self.one_line_comments.unwrap_or(true),
                unindent_block_comments: self.unindent_block_comments.unwrap_or(true),
            },
            badge: BadgeSettings {
                enabled: self.badge_enabled.unwrap_or(true),
                repository_url: self.repository_url.filter(|url| !url.trim().is_empty()),
            },
            sources,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    convert: Option<RawConvert>,
    #[serde(default)]
    badge: Option<RawBadge>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConvert {
    #[serde(default)]
    one_line_comments: Option<bool>,
    #[serde(default)]
    unindent_block_comments: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBadge {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    repository_url: Option<String>,
}

impl RawConfig {
    fn into_partial(self) -> PartialConfig {
        let convert = self.convert.unwrap_or_default();
        let badge = self.badge.unwrap_or_default();
        PartialConfig {
            one_line_comments: convert.one_line_comments,
            unindent_block_comments: convert.unindent_block_comments,
            badge_enabled: badge.enabled,
            repository_url: badge.repository_url,
        }
    }
}
