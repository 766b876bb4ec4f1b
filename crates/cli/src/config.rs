use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use unitconv_engine::EngineConfig;

const CONFIG_FILE: &str = "global_config.yaml";
const LOCAL_OVERRIDE_FILE: &str = ".global_config.yaml";
const ENV_PREFIX: &str = "UNITCONV";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LoggingFormatConfig,
    pub levels: LoggingLevelsConfig,
    pub redaction: RedactionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingFormatConfig {
    pub show_time: bool,
    pub show_file: bool,
    pub show_line: bool,
    /// One JSON object per event instead of the human format.
    pub json: bool,
}

impl Default for LoggingFormatConfig {
    fn default() -> Self {
        Self {
            show_time: true,
            show_file: false,
            show_line: false,
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingLevelsConfig {
    pub debug: bool,
    pub info: bool,
    pub warning: bool,
    pub error: bool,
    pub critical: bool,
}

impl Default for LoggingLevelsConfig {
    fn default() -> Self {
        Self {
            debug: false,
            info: false,
            warning: true,
            error: true,
            critical: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub enabled: bool,
    /// Mask `api_key=`/`token=` style query parameters.
    pub use_default_patterns: bool,
    pub patterns: Vec<RedactionPattern>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_default_patterns: true,
            patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedactionPattern {
    pub name: String,
    pub regex: String,
    pub placeholder: String,
}

/// Resolve the base config file: an explicit path, then the working
/// directory, then the one shipped next to this crate.
fn base_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    let cwd = PathBuf::from(CONFIG_FILE);
    if cwd.exists() {
        return Some(cwd);
    }
    let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE);
    crate_dir.exists().then_some(crate_dir)
}

/// Layering, lowest to highest: struct defaults, base YAML, the
/// `.global_config.yaml` beside it, `UNITCONV__SECTION__KEY` env vars.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(base) = base_config_path(explicit) {
        let local = base
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOCAL_OVERRIDE_FILE);
        builder = builder
            // An explicitly named file must exist.
            .add_source(File::from(base).required(explicit.is_some()))
            .add_source(File::from(local).required(false));
    }

    builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}
