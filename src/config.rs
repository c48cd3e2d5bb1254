//! Configuration for draftsman.
//!
//! Settings are read from `.draftsman/draftsman.toml` and layered
//! file → environment → CLI. Every key is optional.
//!
//! # Configuration File Format
//!
//! ```toml
//! [generator]
//! command = "claude"
//! args = ["--print"]
//! timeout_secs = 900
//!
//! [retry]
//! max_retries = 1
//! delay_ms = 1000
//!
//! [compaction]
//! enabled = true
//! threshold = "12000"
//! context_budget = 48000
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [review]
//! policy = "auto-advance"
//! ```

use crate::compaction::{CompactionSettings, ContextLimit, DEFAULT_CONTEXT_BUDGET};
use crate::generation::{CommandClient, RetryPolicy};
use crate::logging::LoggingConfig;
use crate::review::{AutoAdvance, HoldForApproval, ReviewPolicy};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable overriding `[generator] command`.
pub const GENERATOR_CMD_ENV: &str = "DRAFTSMAN_GENERATOR_CMD";

const DEFAULT_GENERATOR_CMD: &str = "claude";

/// Directory under the project root holding project state and config.
pub const DRAFTSMAN_DIR: &str = ".draftsman";
pub const CONFIG_FILE: &str = "draftsman.toml";
pub const PROJECT_FILE: &str = "project.json";

/// `[generator]` section: the external command that writes documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default = "default_generator_args")]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generator_args() -> Vec<String> {
    vec!["--print".to_string()]
}

fn default_timeout_secs() -> u64 {
    900
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            command: None,
            args: default_generator_args(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[retry]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_retries() -> u32 {
    crate::generation::DEFAULT_MAX_RETRIES
}

fn default_delay_ms() -> u64 {
    crate::generation::DEFAULT_RETRY_DELAY.as_millis() as u64
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// `[compaction]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompactionSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub threshold: ContextLimit,
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,
}

fn default_true() -> bool {
    true
}

fn default_context_budget() -> usize {
    DEFAULT_CONTEXT_BUDGET
}

impl Default for CompactionSection {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: ContextLimit::default(),
            context_budget: DEFAULT_CONTEXT_BUDGET,
        }
    }
}

/// Which review policy an automated run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewPolicyKind {
    #[default]
    AutoAdvance,
    HoldForApproval,
}

impl std::fmt::Display for ReviewPolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewPolicyKind::AutoAdvance => write!(f, "auto-advance"),
            ReviewPolicyKind::HoldForApproval => write!(f, "hold-for-approval"),
        }
    }
}

/// `[review]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewSection {
    #[serde(default)]
    pub policy: ReviewPolicyKind,
}

/// Root of draftsman.toml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftsmanToml {
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub compaction: CompactionSection,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub review: ReviewSection,
}

impl DraftsmanToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse draftsman.toml")
    }

    /// Load `draftsman.toml` from `draftsman_dir`, or defaults when it is absent.
    pub fn load_or_default(draftsman_dir: &Path) -> Result<Self> {
        let config_path = draftsman_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize draftsman.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Reject values that would make a run misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.generator.timeout_secs == 0 {
            bail!("[generator] timeout_secs must be greater than zero");
        }
        if let Some(command) = &self.generator.command
            && command.trim().is_empty()
        {
            bail!("[generator] command must not be empty");
        }
        if self.compaction.context_budget == 0 && self.compaction.threshold.is_percentage() {
            bail!("[compaction] a percentage threshold needs a non-zero context_budget");
        }
        if crate::logging::parse_level(&self.logging.level).is_none() {
            bail!(
                "[logging] unknown level '{}': expected trace, debug, info, warn or error",
                self.logging.level
            );
        }
        Ok(())
    }
}

/// Pick the generator command: CLI flag, then environment, then file, then default.
pub fn resolve_generator_cmd(
    cli: Option<&str>,
    env: Option<&str>,
    file: Option<&str>,
) -> String {
    [cli, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_GENERATOR_CMD)
        .to_string()
}

/// Effective configuration for one invocation: the loaded file plus CLI overrides.
#[derive(Debug, Clone)]
pub struct DraftsmanConfig {
    pub project_dir: PathBuf,
    pub draftsman_dir: PathBuf,
    pub toml: DraftsmanToml,
    pub verbose: bool,
    pub cli_generator_cmd: Option<String>,
    pub hold_reviews: bool,
}

impl DraftsmanConfig {
    /// Load configuration for `project_dir`. The directory must exist.
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let draftsman_dir = project_dir.join(DRAFTSMAN_DIR);
        let toml = DraftsmanToml::load_or_default(&draftsman_dir)?;
        toml.validate()
            .with_context(|| format!("Invalid {}", draftsman_dir.join(CONFIG_FILE).display()))?;

        Ok(Self {
            project_dir,
            draftsman_dir,
            toml,
            verbose: false,
            cli_generator_cmd: None,
            hold_reviews: false,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_generator_cmd(mut self, cmd: Option<String>) -> Self {
        self.cli_generator_cmd = cmd;
        self
    }

    pub fn with_hold_reviews(mut self, hold: bool) -> Self {
        self.hold_reviews = hold;
        self
    }

    pub fn project_file(&self) -> PathBuf {
        self.draftsman_dir.join(PROJECT_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.draftsman_dir.join(CONFIG_FILE)
    }

    pub fn generator_cmd(&self) -> String {
        let env = std::env::var(GENERATOR_CMD_ENV).ok();
        resolve_generator_cmd(
            self.cli_generator_cmd.as_deref(),
            env.as_deref(),
            self.toml.generator.command.as_deref(),
        )
    }

    pub fn command_client(&self) -> CommandClient {
        CommandClient::new(self.generator_cmd(), self.toml.generator.args.clone())
            .with_timeout(Duration::from_secs(self.toml.generator.timeout_secs))
            .with_working_dir(self.project_dir.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.toml.retry.max_retries,
            Duration::from_millis(self.toml.retry.delay_ms),
        )
    }

    pub fn compaction_settings(&self) -> CompactionSettings {
        CompactionSettings {
            enabled: self.toml.compaction.enabled,
            threshold: self.toml.compaction.threshold.clone(),
            context_budget: self.toml.compaction.context_budget,
        }
    }

    /// The CLI flag wins over the file.
    pub fn review_policy_kind(&self) -> ReviewPolicyKind {
        if self.hold_reviews {
            ReviewPolicyKind::HoldForApproval
        } else {
            self.toml.review.policy
        }
    }

    pub fn review_policy(&self) -> Arc<dyn ReviewPolicy> {
        match self.review_policy_kind() {
            ReviewPolicyKind::AutoAdvance => Arc::new(AutoAdvance),
            ReviewPolicyKind::HoldForApproval => Arc::new(HoldForApproval),
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        if self.verbose {
            self.toml.logging.clone().with_level("debug")
        } else {
            self.toml.logging.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = DraftsmanToml::parse("").unwrap();
        assert_eq!(config, DraftsmanToml::default());
        assert_eq!(config.generator.args, vec!["--print"]);
        assert_eq!(config.generator.timeout_secs, 900);
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.delay_ms, 1000);
        assert!(config.compaction.enabled);
        assert_eq!(config.review.policy, ReviewPolicyKind::AutoAdvance);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_file() {
        let config = DraftsmanToml::parse(
            r#"
[generator]
command = "my-llm"
args = ["--json", "-q"]
timeout_secs = 30

[retry]
max_retries = 2
delay_ms = 10

[compaction]
enabled = false
threshold = "60%"
context_budget = 10000

[logging]
level = "debug"
format = "json"

[review]
policy = "hold-for-approval"
"#,
        )
        .unwrap();

        assert_eq!(config.generator.command.as_deref(), Some("my-llm"));
        assert_eq!(config.generator.args, vec!["--json", "-q"]);
        assert_eq!(config.retry.max_retries, 2);
        assert!(!config.compaction.enabled);
        assert_eq!(config.compaction.threshold, ContextLimit::Percentage(60.0));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.review.policy, ReviewPolicyKind::HoldForApproval);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(DraftsmanToml::parse("[generator]\ncommnd = \"x\"\n").is_err());
        assert!(DraftsmanToml::parse("[reviews]\n").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DraftsmanToml::default();
        config.generator.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = DraftsmanToml::default();
        config.generator.command = Some("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = DraftsmanToml::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_threshold_is_parse_error() {
        assert!(DraftsmanToml::parse("[compaction]\nthreshold = \"lots\"\n").is_err());
    }

    #[test]
    fn test_resolve_generator_cmd_precedence() {
        assert_eq!(
            resolve_generator_cmd(Some("cli"), Some("env"), Some("file")),
            "cli"
        );
        assert_eq!(resolve_generator_cmd(None, Some("env"), Some("file")), "env");
        assert_eq!(resolve_generator_cmd(None, None, Some("file")), "file");
        assert_eq!(resolve_generator_cmd(None, None, None), "claude");
        assert_eq!(resolve_generator_cmd(Some(""), None, Some("file")), "file");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = DraftsmanToml::default();
        config.generator.command = Some("writer".to_string());
        config.compaction.threshold = ContextLimit::Percentage(50.0);
        config.save(&path).unwrap();

        let loaded = DraftsmanToml::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let config = DraftsmanToml::load_or_default(dir.path()).unwrap();
        assert_eq!(config, DraftsmanToml::default());
    }

    #[test]
    fn test_draftsman_config_paths_and_overrides() {
        let dir = tempdir().unwrap();
        let draftsman_dir = dir.path().join(DRAFTSMAN_DIR);
        std::fs::create_dir_all(&draftsman_dir).unwrap();
        std::fs::write(
            draftsman_dir.join(CONFIG_FILE),
            "[retry]\nmax_retries = 0\ndelay_ms = 5\n",
        )
        .unwrap();

        let config = DraftsmanConfig::new(dir.path().to_path_buf())
            .unwrap()
            .with_hold_reviews(true)
            .with_verbose(true);

        assert!(config.project_file().ends_with(".draftsman/project.json"));
        assert!(config.config_file().ends_with(".draftsman/draftsman.toml"));
        assert_eq!(config.retry_policy(), RetryPolicy::new(0, Duration::from_millis(5)));
        assert_eq!(config.review_policy_kind(), ReviewPolicyKind::HoldForApproval);
        assert_eq!(config.review_policy().name(), "hold-for-approval");
        assert_eq!(config.logging().level, "debug");
        assert_eq!(config.compaction_settings(), CompactionSettings::default());
    }

    #[test]
    fn test_draftsman_config_rejects_invalid_file() {
        let dir = tempdir().unwrap();
        let draftsman_dir = dir.path().join(DRAFTSMAN_DIR);
        std::fs::create_dir_all(&draftsman_dir).unwrap();
        std::fs::write(draftsman_dir.join(CONFIG_FILE), "[generator]\ntimeout_secs = 0\n").unwrap();

        assert!(DraftsmanConfig::new(dir.path().to_path_buf()).is_err());
    }
}
