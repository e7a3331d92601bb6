use chopsticks_bot::BotParams;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_SEAT_PERMUTATIONS: usize = 6;
const DEFAULT_MAX_TURNS: u32 = 400;
const DEFAULT_LATENCY_BUDGET_MS: u64 = 25;
const MIN_AGENTS: usize = 2;
const MAX_AGENTS: usize = 8;
const NAME_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Tournament configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub games: GameConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| ConfigError::Read {
            source,
            path: path.clone(),
        })?;
        let mut cfg: BenchmarkConfig = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|source| ConfigError::Parse {
                source,
                path: path.clone(),
            })?;
        cfg.validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(cfg)
    }

    /// Checks every block; fills in a default tracing level if left blank.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        check_name("run_id", &self.run_id)?;
        self.games.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.metrics.validate()?;
        self.logging.normalize();
        validate_agents(&self.agents)?;
        Ok(())
    }

    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GameConfig {
    pub seed: Option<u64>,
    /// Number of distinct game seeds; each is replayed once per permutation.
    pub count: usize,
    #[serde(default = "default_permutations")]
    pub permutations: usize,
    /// Games still running after this many turns are scored as draws.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

impl GameConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::field(
                "games.count",
                "number of games must be greater than zero",
            ));
        }
        if self.permutations == 0 {
            return Err(ValidationError::field(
                "games.permutations",
                "permutations must be at least 1",
            ));
        }
        if self.max_turns == 0 {
            return Err(ValidationError::field(
                "games.max_turns",
                "turn limit must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_permutations() -> usize {
    DEFAULT_SEAT_PERMUTATIONS
}

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub kind: AgentKind,
    #[serde(default)]
    pub params: BotParams,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    #[default]
    Computer,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::field(label, "path must not be empty"));
            }
            if resolve_template(run_id, value).file_name().is_none() {
                return Err(ValidationError::field(label, "path must name a file"));
            }
        }
        if self.jsonl == self.summary_md {
            return Err(ValidationError::field(
                "outputs",
                "jsonl and summary_md must be different files",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

impl MetricsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.latency_budget_ms == 0 {
            return Err(ValidationError::field(
                "metrics.latency_budget_ms",
                "latency budget must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_latency_budget_ms() -> u64 {
    DEFAULT_LATENCY_BUDGET_MS
}

/// Structured logs are off unless asked for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Also log the evaluator's explanation for every computer move.
    #[serde(default)]
    pub evaluation_details: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            evaluation_details: false,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn check_name(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(field, "must not be empty"));
    }
    if !value.chars().all(|c| NAME_ALLOWED.contains(c)) {
        return Err(ValidationError::field(
            field,
            "may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }
    Ok(())
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ValidationError> {
    if !(MIN_AGENTS..=MAX_AGENTS).contains(&agents.len()) {
        return Err(ValidationError::InvalidField {
            field: "agents".to_string(),
            message: format!(
                "between {MIN_AGENTS} and {MAX_AGENTS} agents required, found {}",
                agents.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for (idx, agent) in agents.iter().enumerate() {
        check_name(&format!("agents[{idx}].name"), &agent.name)?;
        if !seen.insert(agent.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "agents".to_string(),
                message: format!("agent name '{}' defined more than once", agent.name),
            });
        }
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

impl ResolvedOutputs {
    /// Directory shared by the summary and the telemetry log.
    pub fn report_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn field(field: &str, message: &str) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
