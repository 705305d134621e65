// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{ops::Deref, str::FromStr, sync::OnceLock};

use super::sources::{CompositeConfigSourceResult, CompositeSource};
use super::supported_configurations::SupportedConfigurations;
use crate::log::LevelFilter;

pub const TRACER_VERSION: &str = "0.1.0";

/// A list of `pattern:rate` sampling rules, as carried by
/// `DD_TRACE_SAMPLING_SERVICE_RULES` and `DD_TRACE_SAMPLING_OPERATION_RULES`.
///
/// The rate side stays a string here: numeric validation belongs to sampler
/// construction, so that a bad rate degrades to the accept-all fallback
/// instead of silently disappearing during config parsing.
#[derive(Debug, Default, Clone, PartialEq)]
struct RuleList(Vec<(String, String)>);

impl FromStr for RuleList {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rules = Vec::new();
        for entry in s.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            // the rate is whatever follows the last `:`, patterns may contain
            // colons themselves
            let (pattern, rate) = match entry.rsplit_once(':') {
                Some((pattern, rate)) => (pattern, rate),
                None => (entry, ""),
            };
            rules.push((pattern.to_string(), rate.to_string()));
        }
        Ok(RuleList(rules))
    }
}

#[derive(Debug)]
#[non_exhaustive]
/// Configuration for the tracer
///
/// # Usage
/// ```
/// use dd_trace_api::Config;
///
/// // This pulls configuration from the environment and other sources
/// let mut builder = Config::builder();
///
/// // Manual overrides
/// builder
///     .set_service("my-service".to_string())
///     .set_trace_sample_rate(0.25);
///
/// // Finalize the configuration
/// let config = builder.build();
/// ```
pub struct Config {
    // # Global
    runtime_id: &'static str,
    tracer_version: &'static str,

    // # Service tagging
    service: String,
    env: Option<String>,

    // # Trace sampling
    /// Global fraction of traces to keep, in [0.0, 1.0]
    trace_sample_rate: Option<f64>,
    /// Maximum number of sampled traces per second, per process
    trace_rate_limit: Option<f64>,
    /// Service name pattern to rate rules
    trace_sampling_service_rules: Vec<(String, String)>,
    /// Operation name pattern to rate rules
    trace_sampling_operation_rules: Vec<(String, String)>,
    /// JSON configuration string for explicit sampling rules
    trace_sampling_rules: Option<String>,
    /// Whether priority-based sampling is enabled
    priority_sampling: bool,
    /// Operator escape hatch forcing every sampling decision ("keep"/"drop")
    priority_sampling_force: Option<String>,

    /// Disables the library if this is false
    enabled: bool,
    /// The log level for the tracer
    log_level: LevelFilter,
}

impl Config {
    fn from_sources(sources: &CompositeSource) -> Self {
        let default = Config::default();

        /// Helper function to convert a CompositeConfigSourceResult<T> into an
        /// Option<T>. This drops the origin associated with the configuration
        /// and the errors collected while parsing the value.
        fn to_val<T>(res: CompositeConfigSourceResult<T>) -> Option<T> {
            res.value.map(|c| c.value)
        }

        Self {
            runtime_id: default.runtime_id,
            tracer_version: default.tracer_version,
            service: to_val(sources.get(SupportedConfigurations::DD_SERVICE))
                .unwrap_or(default.service),
            env: to_val(sources.get(SupportedConfigurations::DD_ENV)).or(default.env),
            trace_sample_rate: to_val(
                sources.get_parse(SupportedConfigurations::DD_TRACE_SAMPLE_RATE),
            )
            .or(default.trace_sample_rate),
            trace_rate_limit: to_val(
                sources.get_parse(SupportedConfigurations::DD_TRACE_RATE_LIMIT),
            )
            .or(default.trace_rate_limit),
            trace_sampling_service_rules: to_val(
                sources
                    .get_parse::<RuleList>(SupportedConfigurations::DD_TRACE_SAMPLING_SERVICE_RULES),
            )
            .map(|RuleList(rules)| rules)
            .unwrap_or(default.trace_sampling_service_rules),
            trace_sampling_operation_rules: to_val(
                sources.get_parse::<RuleList>(
                    SupportedConfigurations::DD_TRACE_SAMPLING_OPERATION_RULES,
                ),
            )
            .map(|RuleList(rules)| rules)
            .unwrap_or(default.trace_sampling_operation_rules),
            trace_sampling_rules: to_val(
                sources.get(SupportedConfigurations::DD_TRACE_SAMPLING_RULES),
            )
            .or(default.trace_sampling_rules),
            priority_sampling: to_val(
                sources.get_parse(SupportedConfigurations::DD_PRIORITY_SAMPLING),
            )
            .unwrap_or(default.priority_sampling),
            priority_sampling_force: to_val(
                sources.get(SupportedConfigurations::DD_PRIORITY_SAMPLING_FORCE),
            )
            .or(default.priority_sampling_force),
            enabled: to_val(sources.get_parse(SupportedConfigurations::DD_TRACE_ENABLED))
                .unwrap_or(default.enabled),
            log_level: to_val(sources.get_parse(SupportedConfigurations::DD_LOG_LEVEL))
                .unwrap_or(default.log_level),
        }
    }

    fn builder_with_sources(sources: &CompositeSource) -> ConfigBuilder {
        ConfigBuilder {
            config: Config::from_sources(sources),
        }
    }

    /// Creates a new builder to override detected configuration
    pub fn builder() -> ConfigBuilder {
        Self::builder_with_sources(&CompositeSource::default_sources())
    }

    pub fn runtime_id(&self) -> &str {
        self.runtime_id
    }

    pub fn tracer_version(&self) -> &str {
        self.tracer_version
    }

    pub fn service(&self) -> &str {
        self.service.deref()
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn trace_sample_rate(&self) -> Option<f64> {
        self.trace_sample_rate
    }

    pub fn trace_rate_limit(&self) -> Option<f64> {
        self.trace_rate_limit
    }

    pub fn trace_sampling_service_rules(&self) -> &[(String, String)] {
        &self.trace_sampling_service_rules
    }

    pub fn trace_sampling_operation_rules(&self) -> &[(String, String)] {
        &self.trace_sampling_operation_rules
    }

    pub fn trace_sampling_rules(&self) -> Option<&str> {
        self.trace_sampling_rules.as_deref()
    }

    pub fn priority_sampling_enabled(&self) -> bool {
        self.priority_sampling
    }

    pub fn priority_sampling_force(&self) -> Option<&str> {
        self.priority_sampling_force.as_deref()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// Static runtime id of the process
    fn process_runtime_id() -> &'static str {
        static RUNTIME_ID: OnceLock<String> = OnceLock::new();
        RUNTIME_ID.get_or_init(|| uuid::Uuid::new_v4().to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            runtime_id: Config::process_runtime_id(),
            tracer_version: TRACER_VERSION,
            service: "unnamed-rust-service".to_string(),
            env: None,
            trace_sample_rate: None,
            trace_rate_limit: None,
            trace_sampling_service_rules: Vec::new(),
            trace_sampling_operation_rules: Vec::new(),
            trace_sampling_rules: None,
            priority_sampling: true,
            priority_sampling_force: None,
            enabled: true,
            log_level: LevelFilter::default(),
        }
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Finalizes the builder and returns the configuration
    pub fn build(self) -> Config {
        self.config
    }

    pub fn set_service(&mut self, service: String) -> &mut Self {
        self.config.service = service;
        self
    }

    pub fn set_env(&mut self, env: String) -> &mut Self {
        self.config.env = Some(env);
        self
    }

    pub fn set_trace_sample_rate(&mut self, rate: f64) -> &mut Self {
        self.config.trace_sample_rate = Some(rate);
        self
    }

    pub fn set_trace_rate_limit(&mut self, rate_limit: f64) -> &mut Self {
        self.config.trace_rate_limit = Some(rate_limit);
        self
    }

    pub fn set_trace_sampling_service_rules(
        &mut self,
        rules: Vec<(String, String)>,
    ) -> &mut Self {
        self.config.trace_sampling_service_rules = rules;
        self
    }

    pub fn set_trace_sampling_operation_rules(
        &mut self,
        rules: Vec<(String, String)>,
    ) -> &mut Self {
        self.config.trace_sampling_operation_rules = rules;
        self
    }

    pub fn set_trace_sampling_rules(&mut self, rules_json: String) -> &mut Self {
        self.config.trace_sampling_rules = Some(rules_json);
        self
    }

    pub fn set_priority_sampling(&mut self, enabled: bool) -> &mut Self {
        self.config.priority_sampling = enabled;
        self
    }

    pub fn set_priority_sampling_force(&mut self, force: String) -> &mut Self {
        self.config.priority_sampling_force = Some(force);
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.config.enabled = enabled;
        self
    }

    pub fn set_log_level(&mut self, log_level: LevelFilter) -> &mut Self {
        self.config.log_level = log_level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, RuleList};
    use crate::configuration::sources::{CompositeSource, ConfigSourceOrigin, HashMapSource};
    use crate::log::LevelFilter;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.service(), "unnamed-rust-service");
        assert_eq!(config.env(), None);
        assert_eq!(config.trace_sample_rate(), None);
        assert_eq!(config.trace_rate_limit(), None);
        assert!(config.trace_sampling_service_rules().is_empty());
        assert!(config.trace_sampling_operation_rules().is_empty());
        assert!(config.priority_sampling_enabled());
        assert_eq!(config.priority_sampling_force(), None);
        assert!(config.enabled());
        assert_eq!(config.log_level(), LevelFilter::Error);
        assert!(!config.runtime_id().is_empty());
    }

    #[test]
    fn test_config_from_source() {
        let mut sources = CompositeSource::new();
        sources.add_source(HashMapSource::from_iter(
            [
                ("DD_SERVICE", "test-service"),
                ("DD_ENV", "test-env"),
                ("DD_TRACE_SAMPLE_RATE", "0.3"),
                ("DD_TRACE_RATE_LIMIT", "100"),
                ("DD_TRACE_SAMPLING_SERVICE_RULES", "web-*:0.5,db:1"),
                ("DD_TRACE_SAMPLING_OPERATION_RULES", "http.request:0.1"),
                (
                    "DD_TRACE_SAMPLING_RULES",
                    r#"[{"sample_rate":0.5,"service":"web-api"}]"#,
                ),
                ("DD_PRIORITY_SAMPLING", "false"),
                ("DD_PRIORITY_SAMPLING_FORCE", "KEEP"),
                ("DD_TRACE_ENABLED", "false"),
                ("DD_LOG_LEVEL", "DEBUG"),
            ],
            ConfigSourceOrigin::EnvVar,
        ));
        let config = Config::builder_with_sources(&sources).build();

        assert_eq!(config.service(), "test-service");
        assert_eq!(config.env(), Some("test-env"));
        assert_eq!(config.trace_sample_rate(), Some(0.3));
        assert_eq!(config.trace_rate_limit(), Some(100.0));
        assert_eq!(
            config.trace_sampling_service_rules(),
            &[
                ("web-*".to_string(), "0.5".to_string()),
                ("db".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(
            config.trace_sampling_operation_rules(),
            &[("http.request".to_string(), "0.1".to_string())]
        );
        assert_eq!(
            config.trace_sampling_rules(),
            Some(r#"[{"sample_rate":0.5,"service":"web-api"}]"#)
        );
        assert!(!config.priority_sampling_enabled());
        assert_eq!(config.priority_sampling_force(), Some("KEEP"));
        assert!(!config.enabled());
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_config_manual_override() {
        let mut sources = CompositeSource::new();
        sources.add_source(HashMapSource::from_iter(
            [("DD_SERVICE", "env-service"), ("DD_TRACE_SAMPLE_RATE", "0.3")],
            ConfigSourceOrigin::EnvVar,
        ));
        let mut builder = Config::builder_with_sources(&sources);
        builder.set_service("manual-service".to_string());
        builder.set_env("manual-env".to_string());
        builder.set_trace_sample_rate(0.8);
        builder.set_trace_rate_limit(200.0);
        builder.set_trace_sampling_service_rules(vec![("api".to_string(), "1".to_string())]);
        builder.set_trace_sampling_operation_rules(vec![(
            "db.query".to_string(),
            "0.2".to_string(),
        )]);
        builder.set_priority_sampling(false);
        builder.set_priority_sampling_force("drop".to_string());
        builder.set_log_level(LevelFilter::Warn);

        let config = builder.build();

        assert_eq!(config.service(), "manual-service");
        assert_eq!(config.env(), Some("manual-env"));
        assert_eq!(config.trace_sample_rate(), Some(0.8));
        assert_eq!(config.trace_rate_limit(), Some(200.0));
        assert_eq!(
            config.trace_sampling_service_rules(),
            &[("api".to_string(), "1".to_string())]
        );
        assert_eq!(
            config.trace_sampling_operation_rules(),
            &[("db.query".to_string(), "0.2".to_string())]
        );
        assert!(!config.priority_sampling_enabled());
        assert_eq!(config.priority_sampling_force(), Some("drop"));
        assert_eq!(config.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_rule_list_parsing() {
        let RuleList(rules) = "web-*:0.5, db:1 ,".parse().unwrap();
        assert_eq!(
            rules,
            vec![
                ("web-*".to_string(), "0.5".to_string()),
                ("db".to_string(), "1".to_string()),
            ]
        );

        // patterns may contain colons, the rate is after the last one
        let RuleList(rules) = "grpc://users:0.25".parse().unwrap();
        assert_eq!(
            rules,
            vec![("grpc://users".to_string(), "0.25".to_string())]
        );

        // a missing rate is kept as an empty string so that sampler
        // construction rejects the entry instead of dropping it silently
        let RuleList(rules) = "web".parse().unwrap();
        assert_eq!(rules, vec![("web".to_string(), "".to_string())]);
    }
}
