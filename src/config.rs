use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string with comments.
    /// All fields are commented out so defaults are used, but users can uncomment to override.
    pub fn generate_default_config(&self) -> String {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .unwrap_or_else(|e| panic!("Failed to serialize default config: {}", e));

        Self::comment_all_fields(toml_str, Self::collect_all_comments())
    }

    /// Collect all field comments from struct constants into a map
    fn collect_all_comments() -> HashMap<String, String> {
        let mut comments = HashMap::new();

        for (field, comment) in APP_COMMENTS {
            comments.insert(field.to_string(), comment.to_string());
        }
        for (field, comment) in DISPLAY_COMMENTS {
            comments.insert(format!("display.{}", field), comment.to_string());
        }
        for (field, comment) in FILTER_COMMENTS {
            comments.insert(format!("filters.{}", field), comment.to_string());
        }
        for (field, comment) in PERFORMANCE_COMMENTS {
            comments.insert(format!("performance.{}", field), comment.to_string());
        }
        for (field, comment) in DEBUG_COMMENTS {
            comments.insert(format!("debug.{}", field), comment.to_string());
        }

        comments
    }

    /// Comment out all fields in TOML and add comments
    fn comment_all_fields(toml: String, comments: HashMap<String, String>) -> String {
        let mut result = String::new();
        result.push_str("# grantview configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();

        for line in toml.lines() {
            if let Some(section) = Self::extract_section_name(line) {
                current_section = section.clone();

                if let Some(header) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) {
                    result.push_str(header.1);
                    result.push('\n');
                }

                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
                continue;
            }

            if let Some(field_path) = Self::extract_field_path(line, &current_section) {
                if let Some(comment) = comments.get(&field_path) {
                    for comment_line in comment.lines() {
                        result.push_str("# ");
                        result.push_str(comment_line);
                        result.push('\n');
                    }
                }

                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        result
    }

    /// Extract section name from TOML line like "[display]"
    fn extract_section_name(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            Some(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            None
        }
    }

    fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }

        let eq_pos = trimmed.find('=')?;
        let field_name = trimmed[..eq_pos].trim();
        if current_section.is_empty() {
            Some(field_name.to_string())
        } else {
            Some(format!("{}.{}", current_section, field_name))
        }
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;

        let template = self.generate_default_config();
        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub filters: FilterConfig,
    pub performance: PerformanceConfig,
    pub debug: DebugConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    ("display", "\n# Preview grid"),
    ("filters", "\n# Grant filter dropdowns"),
    ("performance", "\n# Event loop"),
    ("debug", "\n# Debug line and log file"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_preview_rows: usize,
    pub column_min_width: u16,
    pub column_max_width: u16,
    pub autosize_sample_rows: usize,
}

const DISPLAY_COMMENTS: &[(&str, &str)] = &[
    (
        "max_preview_rows",
        "Maximum number of filtered rows shown in the preview grid\nCounts in the footer always cover every row",
    ),
    ("column_min_width", "Narrowest preview column, in characters"),
    ("column_max_width", "Widest preview column, in characters"),
    (
        "autosize_sample_rows",
        "Number of rows sampled when sizing preview columns",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub max_options: usize,
}

const FILTER_COMMENTS: &[(&str, &str)] = &[(
    "max_options",
    "Most frequent values offered per filter dropdown",
)];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

const PERFORMANCE_COMMENTS: &[(&str, &str)] = &[(
    "event_poll_interval_ms",
    "How often the terminal is polled for input, in milliseconds",
)];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_level: String,
}

const DEBUG_COMMENTS: &[(&str, &str)] = &[
    ("enabled", "Show the debug line at the bottom of the screen"),
    (
        "log_level",
        "Log file verbosity: error, warn, info, debug or trace\nRUST_LOG takes precedence when set",
    ),
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            filters: FilterConfig::default(),
            performance: PerformanceConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_preview_rows: 250,
            column_min_width: 10,
            column_max_width: 55,
            autosize_sample_rows: 40,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_options: crate::filter::DEFAULT_MAX_OPTIONS,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_level: "info".to_string(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load configuration with the user file from `config_manager`'s directory.
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Some(user_config) = Self::load_user_config(config_manager)? {
            config.merge(user_config);
        }

        config.validate()?;

        Ok(config)
    }

    fn load_user_config(config_manager: &ConfigManager) -> Result<Option<AppConfig>> {
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map(Some).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.filters.merge(other.filters);
        self.performance.merge(other.performance);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.display.max_preview_rows == 0 {
            return Err(eyre!("max_preview_rows must be greater than 0"));
        }

        if self.display.column_min_width == 0 {
            return Err(eyre!("column_min_width must be greater than 0"));
        }

        if self.display.column_min_width > self.display.column_max_width {
            return Err(eyre!(
                "column_min_width ({}) must not exceed column_max_width ({})",
                self.display.column_min_width,
                self.display.column_max_width
            ));
        }

        if self.filters.max_options == 0 {
            return Err(eyre!("max_options must be greater than 0"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if !LOG_LEVELS.contains(&self.debug.log_level.to_lowercase().as_str()) {
            return Err(eyre!(
                "Invalid log_level: {}. Must be one of {}",
                self.debug.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        Ok(())
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.max_preview_rows != default.max_preview_rows {
            self.max_preview_rows = other.max_preview_rows;
        }
        if other.column_min_width != default.column_min_width {
            self.column_min_width = other.column_min_width;
        }
        if other.column_max_width != default.column_max_width {
            self.column_max_width = other.column_max_width;
        }
        if other.autosize_sample_rows != default.autosize_sample_rows {
            self.autosize_sample_rows = other.autosize_sample_rows;
        }
    }
}

impl FilterConfig {
    pub fn merge(&mut self, other: Self) {
        if other.max_options != FilterConfig::default().max_options {
            self.max_options = other.max_options;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        if other.event_poll_interval_ms != PerformanceConfig::default().event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.log_level != default.log_level {
            self.log_level = other.log_level;
        }
    }
}
