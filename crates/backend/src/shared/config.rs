use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

/// Settings of the AI assistant used for tour plan generation
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// Empty value means "take from OPENAI_API_KEY"
    #[serde(default)]
    pub api_key: String,
    /// Empty value switches generation to plain chat completion
    #[serde(default)]
    pub assistant_id: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            api_key: String::new(),
            assistant_id: String::new(),
            model_name: default_model_name(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LlmConfig {
    pub fn uses_assistant(&self) -> bool {
        !self.assistant_id.trim().is_empty()
    }
}

/// Settings of the visit date scheduler
#[derive(Debug, Deserialize, Clone)]
pub struct PlanningConfig {
    /// Weekly off day, e.g. "Sun"
    #[serde(default = "default_weekly_off")]
    pub weekly_off: String,
    /// Max calls per working day before a warning is raised
    #[serde(default = "default_daily_call_capacity")]
    pub daily_call_capacity: u32,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            weekly_off: default_weekly_off(),
            daily_call_capacity: default_daily_call_capacity(),
        }
    }
}

impl PlanningConfig {
    pub fn weekly_off_day(&self) -> anyhow::Result<chrono::Weekday> {
        self.weekly_off
            .parse::<chrono::Weekday>()
            .map_err(|_| anyhow::anyhow!("Invalid planning.weekly_off: {}", self.weekly_off))
    }
}

fn default_port() -> u16 {
    3000
}
fn default_api_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_max_tokens() -> i32 {
    8000
}
fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_max_poll_attempts() -> u32 {
    90
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_weekly_off() -> String {
    "Sun".to_string()
}
fn default_daily_call_capacity() -> u32 {
    14
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/tour_plan.db"

[server]
port = 3000

[llm]
api_endpoint = "https://api.openai.com/v1"
model_name = "gpt-4o-mini"

[planning]
weekly_off = "Sun"
daily_call_capacity = 14
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `OPENAI_API_KEY` and `OPENAI_ASSISTANT_ID` override the file values.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_config_file()?;
    apply_env_overrides(&mut config);
    Ok(config)
}

fn load_config_file() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.trim().is_empty() {
            config.llm.api_key = key;
        }
    }
    if let Ok(assistant_id) = std::env::var("OPENAI_ASSISTANT_ID") {
        if !assistant_id.trim().is_empty() {
            config.llm.assistant_id = assistant_id;
        }
    }
}

/// Load configuration once and keep it for the lifetime of the process
pub fn init_config() -> anyhow::Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}

/// Get loaded configuration; loads it on first access
pub fn get_config() -> anyhow::Result<&'static Config> {
    init_config()
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    // If absolute path, use as is
    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    // If relative path, resolve it relative to the executable directory
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved_path = exe_dir.join(db_path);
            return Ok(resolved_path);
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(db_path_str))
}
