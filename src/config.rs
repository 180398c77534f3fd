use clap::{Parser, ValueEnum};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

/// How validation failures are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorFormat {
    /// 422 with a JSON list of field errors
    Structured,
    /// 400 with one `loc: msg` line per field error
    PlainText,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Configuration for the signpost server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub log_format: LogFormat,
    pub validation_errors: ValidationErrorFormat,
    /// Whether to answer cross-origin requests permissively
    pub allow_cors: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_format: Option<LogFormat>,
    #[serde(default)]
    pub validation_errors: Option<ValidationErrorFormat>,
    #[serde(default)]
    pub allow_cors: Option<bool>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "signpost", about = "A declaratively validated HTTP API")]
pub struct CliArgs {
    /// Address to bind to
    #[clap(long, env = "SIGNPOST_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[clap(long, env = "SIGNPOST_PORT")]
    pub port: Option<u16>,

    /// Default log filter
    #[clap(long, env = "SIGNPOST_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[clap(long, env = "SIGNPOST_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// How validation failures are rendered
    #[clap(long, env = "SIGNPOST_VALIDATION_ERRORS", value_enum)]
    pub validation_errors: Option<ValidationErrorFormat>,

    /// Answer cross-origin requests permissively
    #[clap(long, env = "SIGNPOST_ALLOW_CORS")]
    pub allow_cors: Option<bool>,

    /// Path to a config file, instead of the one in the user config directory
    #[clap(long, env = "SIGNPOST_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            host: update.host.unwrap_or(self.host),
            port: update.port.unwrap_or(self.port),
            log_level: update.log_level.unwrap_or(self.log_level),
            log_format: update.log_format.unwrap_or(self.log_format),
            validation_errors: update.validation_errors.unwrap_or(self.validation_errors),
            allow_cors: update.allow_cors.unwrap_or(self.allow_cors),
        }
    }

    /// The socket address to listen on
    pub fn bind_address(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}

/// Returns the base (default) configuration
pub fn base_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 8000,
        log_level: "info".to_string(),
        log_format: LogFormat::Pretty,
        validation_errors: ValidationErrorFormat::Structured,
        allow_cors: false,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        host: args.host,
        port: args.port,
        log_level: args.log_level,
        log_format: args.log_format,
        validation_errors: args.validation_errors,
        allow_cors: args.allow_cors,
    }
}

/// Location of `config.toml` in the user's config directory
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "signpost", "signpost") {
        Some(proj_dirs) => Some(proj_dirs.config_dir().join("config.toml")),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Gets the complete configuration by combining defaults with
/// values from the config file, environment variables and command line
/// arguments, in order of increasing precedence
///
/// An unreadable or malformed config file is logged and skipped.
pub fn get_config(args: CliArgs) -> Config {
    let config_path = args.config.clone().or_else(get_config_dir_path);

    let file_update = config_from_file(config_path).unwrap_or_default();
    let config = base_config()
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: bind={}:{}, log_level={}, validation_errors={:?}, allow_cors={}",
        config.host, config.port, config.log_level, config.validation_errors, config.allow_cors
    );

    config
}
