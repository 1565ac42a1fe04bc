use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::{Aggregation, AttributeCost, GroupAttributeCost};
use crate::models::{ClusteringOptions, MatchConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
    pub matching: MatchingSettings,
    #[serde(default)]
    pub clustering: ClusteringOptions,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    pub mentors: PathBuf,
    pub mentees: PathBuf,
    #[serde(default = "default_id_field")]
    pub id_field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    pub group_size: usize,
    pub mentees_per_mentor: usize,
    #[serde(default)]
    pub features_must_be_equal: Vec<String>,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    /// Attribute weights for mentor-mentor similarity (clustering)
    #[serde(default)]
    pub mentor_mentor: BTreeMap<String, f64>,
    /// Attribute weights for mentor-mentee similarity (assignment)
    #[serde(default)]
    pub mentee_group: BTreeMap<String, f64>,
    /// Numeric distance at which two values count as fully different
    #[serde(default)]
    pub scales: BTreeMap<String, f64>,
    #[serde(default)]
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_id_field() -> String { "id".to_string() }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MENTOR_MATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MENTOR_MATCH__MATCHING__GROUP_SIZE -> matching.group_size
            .add_source(environment())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Parse settings from a TOML document, without environment overrides
    pub fn from_toml_str(document: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(document)
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            group_size: self.matching.group_size,
            mentees_per_mentor: self.matching.mentees_per_mentor,
            features_must_be_equal: self.matching.features_must_be_equal.clone(),
            clustering: self.clustering,
        }
    }

    /// Cost function for clustering mentors
    pub fn mentor_cost(&self) -> AttributeCost {
        AttributeCost::new(self.scoring.mentor_mentor.clone())
            .with_scales(self.scoring.scales.clone())
    }

    /// Cost function for matching mentees to mentor groups
    pub fn group_cost(&self) -> GroupAttributeCost {
        let member_cost = AttributeCost::new(self.scoring.mentee_group.clone())
            .with_scales(self.scoring.scales.clone());
        GroupAttributeCost::new(member_cost, self.scoring.aggregation)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MENTOR_MATCH")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("matching.features_must_be_equal")
        .try_parsing(true)
}

/// Apply the short input-path variables, if set
///
/// MENTORS_FILE and MENTEES_FILE take precedence over everything else.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(mentors) = env::var("MENTORS_FILE") {
        builder = builder.set_override("input.mentors", mentors)?;
    }
    if let Ok(mentees) = env::var("MENTEES_FILE") {
        builder = builder.set_override("input.mentees", mentees)?;
    }

    builder.build()
}
