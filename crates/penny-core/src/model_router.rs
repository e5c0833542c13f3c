//! Model Router for task-based model selection
//!
//! Routes each LLM task (category classification, subcategory classification,
//! suggestion, beautify) to a model and an HTTP timeout. A task without an
//! explicit model uses the backend's configured model.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/penny/config/models.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/models.toml");

/// Task types for model routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Pick a general category from the taxonomy
    CategoryClassification,
    /// Pick a subcategory under a general category
    SubcategoryClassification,
    /// Free-text spending alternative
    Suggestion,
    /// Reshape free text into JSON
    Beautify,
}

impl TaskType {
    /// Get the config key for this task type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CategoryClassification => "category_classification",
            Self::SubcategoryClassification => "subcategory_classification",
            Self::Suggestion => "suggestion",
            Self::Beautify => "beautify",
        }
    }

    /// Get all task types
    pub fn all() -> &'static [TaskType] {
        &[
            Self::CategoryClassification,
            Self::SubcategoryClassification,
            Self::Suggestion,
            Self::Beautify,
        ]
    }

    fn from_config_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == key)
    }
}

/// Configuration for a specific task type
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    /// Model override for this task
    pub model: Option<String>,
    /// Timeout for API calls
    pub timeout: Duration,
}

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Default timeout
    pub default_timeout: Duration,
    /// Per-task configurations
    pub tasks: HashMap<TaskType, TaskConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(120),
            tasks: HashMap::new(),
        }
    }
}

/// Model Router for task-based model selection
#[derive(Debug, Clone)]
pub struct ModelRouter {
    config: RouterConfig,
    config_path: Option<PathBuf>,
}

impl ModelRouter {
    /// Create a new model router, honouring the user override file
    pub fn new() -> Result<Self> {
        let config = load_config(None)?;
        Ok(Self {
            config,
            config_path: default_config_path(),
        })
    }

    /// Create with a custom config path
    pub fn with_config_path(path: PathBuf) -> Result<Self> {
        let config = load_config(Some(&path))?;
        Ok(Self {
            config,
            config_path: Some(path),
        })
    }

    /// Create with an explicit configuration (for testing)
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Get the model to use for a task, falling back to the backend model
    pub fn model_for_task<'a>(&'a self, task: TaskType, backend_model: &'a str) -> &'a str {
        self.config
            .tasks
            .get(&task)
            .and_then(|c| c.model.as_deref())
            .unwrap_or(backend_model)
    }

    /// Get the timeout for a task
    pub fn timeout_for_task(&self, task: TaskType) -> Duration {
        self.config
            .tasks
            .get(&task)
            .map(|c| c.timeout)
            .unwrap_or(self.config.default_timeout)
    }

    /// Get the router configuration
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Get the config path (if using file-based config)
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_config(RouterConfig::default()))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("penny").join("config").join("models.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&PathBuf>) -> Result<RouterConfig> {
    let path = override_path.cloned().or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => fs::read_to_string(&path)
            .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    models: Option<HashMap<String, RawTaskConfig>>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawTaskConfig {
    model: Option<String>,
    timeout_secs: Option<u64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<RouterConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = RouterConfig::default();

    if let Some(timeout) = raw.defaults.and_then(|d| d.timeout_secs) {
        config.default_timeout = Duration::from_secs(timeout);
    }

    if let Some(models) = raw.models {
        for (task_name, task_config) in models {
            let Some(task) = TaskType::from_config_key(&task_name) else {
                tracing::warn!(task = %task_name, "Ignoring unknown task in model config");
                continue;
            };

            config.tasks.insert(
                task,
                TaskConfig {
                    model: task_config.model.filter(|m| !m.trim().is_empty()),
                    timeout: task_config
                        .timeout_secs
                        .map(Duration::from_secs)
                        .unwrap_or(config.default_timeout),
                },
            );
        }
    }

    Ok(config)
}
