//! Configuration file management for boppps.
//!
//! Provides an optional TOML config file at `~/.config/boppps/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use boppps_core::PlannerConfig;
use boppps_core::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use boppps_core::output::OutputDir;

/// Env var holding the completion API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const BASE_URL_ENV: &str = "BOPPPS_BASE_URL";
pub const MODEL_ENV: &str = "BOPPPS_MODEL";
pub const OUTPUT_DIR_ENV: &str = "BOPPPS_OUTPUT_DIR";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Seconds to keep generated files; 0 keeps them forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the boppps config directory.
///
/// Uses XDG layout on every platform: `$XDG_CONFIG_HOME/boppps` or
/// `~/.config/boppps`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("boppps");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("boppps")
}

/// Return the path to the boppps config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load the config file if it exists. A present but unparsable file is an
/// error.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// A config file pre-filled with the defaults.
pub fn default_config_file(api_key: Option<String>) -> ConfigFile {
    ConfigFile {
        llm: LlmSection {
            api_key,
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            temperature: Some(DEFAULT_TEMPERATURE),
        },
        server: ServerSection {
            bind: Some(DEFAULT_BIND.to_string()),
            port: Some(DEFAULT_PORT),
        },
        output: OutputSection {
            dir: Some(OutputDir::default_root()),
            max_age_secs: Some(OutputDir::DEFAULT_MAX_AGE.as_secs()),
        },
    }
}

/// `abcd...wxyz` for display; short keys are fully masked.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line; `None` defers to the next source.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct BopppsConfig {
    /// `None` when no key is configured anywhere. Not an error: the
    /// completion service rejects the first request instead.
    pub api_key: Option<String>,
    pub base_url: String,
    pub planner: PlannerConfig,
    pub output: OutputDir,
    pub bind: String,
    pub port: u16,
}

impl BopppsConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `GROQ_API_KEY` env > `llm.api_key` > none
    /// - Base URL: `--base-url` > `BOPPPS_BASE_URL` > `llm.base_url` > Groq endpoint
    /// - Model: `--model` > `BOPPPS_MODEL` > `llm.model` > `llama3-8b-8192`
    /// - Temperature: `llm.temperature` > 0.7
    /// - Output dir: `--output-dir` > `BOPPPS_OUTPUT_DIR` > `output.dir` > `<tmp>/boppps`
    /// - Bind / port: CLI flag > `server.*` > `127.0.0.1:7860`
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config()?.unwrap_or_default();

        let api_key = env_var(API_KEY_ENV).or(file.llm.api_key);

        let base_url = cli
            .base_url
            .clone()
            .or_else(|| env_var(BASE_URL_ENV))
            .or(file.llm.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = cli
            .model
            .clone()
            .or_else(|| env_var(MODEL_ENV))
            .or(file.llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = file.llm.temperature.unwrap_or(DEFAULT_TEMPERATURE);

        let output_root = cli
            .output_dir
            .clone()
            .or_else(|| env_var(OUTPUT_DIR_ENV).map(PathBuf::from))
            .or(file.output.dir)
            .unwrap_or_else(OutputDir::default_root);
        let max_age = file
            .output
            .max_age_secs
            .map(Duration::from_secs)
            .unwrap_or(OutputDir::DEFAULT_MAX_AGE);

        let bind = cli
            .bind
            .clone()
            .or(file.server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let port = cli.port.or(file.server.port).unwrap_or(DEFAULT_PORT);

        Ok(Self {
            api_key,
            base_url,
            planner: PlannerConfig { model, temperature },
            output: OutputDir::new(output_root, max_age),
            bind,
            port,
        })
    }
}

/// Read an env var, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
