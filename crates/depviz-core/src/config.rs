//! TOML configuration.
//!
//! Two optional files share one schema:
//!
//! - project: `.depviz/config.toml`, found by walking up from the working
//!   directory (or given explicitly with `--config`);
//! - user: `<config_dir>/depviz/config.toml`.
//!
//! Project values win over user values key by key. Missing files are not an
//! error; unreadable or unparsable ones are.
//!
//! ```toml
//! [view]
//! options = ["refs", "issues", "hide-orphans"]
//!
//! [relevance]
//! depth_cap = 20
//!
//! [output]
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reduce::relevance::DEFAULT_DEPTH_CAP;

const PROJECT_CONFIG: &str = ".depviz/config.toml";
const USER_CONFIG: &str = "depviz/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepvizConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Flags used when the command line gives none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_cap: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `pretty`, `text` or `json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl DepvizConfig {
    /// Fill every unset key from `base`.
    #[must_use]
    pub fn or(self, base: Self) -> Self {
        Self {
            view: ViewConfig {
                options: self.view.options.or(base.view.options),
            },
            relevance: RelevanceConfig {
                depth_cap: self.relevance.depth_cap.or(base.relevance.depth_cap),
            },
            output: OutputConfig {
                format: self.output.format.or(base.output.format),
            },
        }
    }

    #[must_use]
    pub fn depth_cap(&self) -> usize {
        self.relevance.depth_cap.unwrap_or(DEFAULT_DEPTH_CAP)
    }

    #[must_use]
    pub fn view_flags(&self) -> &[String] {
        self.view.options.as_deref().unwrap_or_default()
    }

    /// Configured output mode, normalized. Unknown values are ignored.
    #[must_use]
    pub fn output_format(&self) -> Option<&'static str> {
        self.output.format.as_deref().and_then(normalize_output_format)
    }
}

/// Map an output mode name (or legacy alias) to `pretty`, `text` or `json`.
#[must_use]
pub fn normalize_output_format(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

/// Merged configuration and the files it came from.
#[derive(Debug, Clone, Default)]
pub struct EffectiveConfig {
    pub config: DepvizConfig,
    pub sources: Vec<PathBuf>,
}

/// Nearest `.depviz/config.toml` at or above `start`.
#[must_use]
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG))
        .find(|candidate| candidate.is_file())
}

/// Read and parse one config file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid config TOML.
pub fn load_config_file(path: &Path) -> Result<DepvizConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// `<config_dir>/depviz/config.toml`, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(USER_CONFIG))
}

/// Load the user config, or defaults when there is none.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<(DepvizConfig, Option<PathBuf>)> {
    match user_config_path().filter(|p| p.is_file()) {
        Some(path) => Ok((load_config_file(&path)?, Some(path))),
        None => Ok((DepvizConfig::default(), None)),
    }
}

/// Merge the project config (explicit path, or found from `start`) over the
/// user config.
///
/// # Errors
///
/// Fails if a config file exists but cannot be read or parsed, or if an
/// explicit path does not exist.
pub fn resolve_config(start: &Path, explicit: Option<&Path>) -> Result<EffectiveConfig> {
    let (user, user_path) = load_user_config()?;
    let project_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_project_config(start),
    };
    let project = match &project_path {
        Some(path) => load_config_file(path)?,
        None => DepvizConfig::default(),
    };

    let sources: Vec<PathBuf> = project_path.into_iter().chain(user_path).collect();
    debug!(?sources, "configuration resolved");

    Ok(EffectiveConfig {
        config: project.or(user),
        sources,
    })
}
