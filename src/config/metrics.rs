//! Metric definition configuration.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::export::MetricSpec;

use super::validation::ConfigError;

/// One exported metric as declared in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDef {
    /// Destination table name within the dataset.
    pub table: String,

    /// PromQL expression evaluated at each sample time.
    pub promql: String,

    /// Label-to-column renames. Unmapped labels pass through under their
    /// original name.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,

    /// Info tables carry only labels and are fully overwritten on every run.
    #[serde(default)]
    pub info: bool,
}

/// Metric definitions file (`metrics:` list).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Exported metrics, in registration order.
    #[serde(default)]
    pub metrics: Vec<MetricDef>,
}

impl MetricsConfig {
    /// Load and validate metric definitions from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all metric definitions.
    ///
    /// Table names must be non-empty and unique: the destination table
    /// determines the local buffer path and the staging blob key, so two
    /// definitions sharing a table would collide on disk and in the bucket.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_tables = HashSet::new();

        for def in &self.metrics {
            if def.table.is_empty() {
                return Err(ConfigError::ValidationError(
                    "metric table name cannot be empty".to_string(),
                ));
            }
            if !seen_tables.insert(&def.table) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate metric table: '{}'",
                    def.table
                )));
            }
            if def.promql.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "metric '{}': promql cannot be empty",
                    def.table
                )));
            }

            let mut seen_columns = HashSet::new();
            for column in def.columns.values() {
                if !seen_columns.insert(column) {
                    return Err(ConfigError::ValidationError(format!(
                        "metric '{}': duplicate output column '{}'",
                        def.table, column
                    )));
                }
            }
        }

        Ok(())
    }

    /// Convert the definitions into metric specs, in declaration order.
    pub fn to_specs(&self) -> Vec<MetricSpec> {
        self.metrics
            .iter()
            .map(|def| {
                let mut spec =
                    MetricSpec::new(&def.table, &def.promql).with_columns(def.columns.clone());
                if def.info {
                    spec = spec.info();
                }
                spec
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_parse() {
        let yaml = r#"
metrics:
  - table: node_cpu
    promql: 'sum by (instance) (rate(node_cpu_seconds_total[5m]))'
    columns:
      instance: host
  - table: node_info
    promql: node_uname_info
    info: true
"#;

        let config: MetricsConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.metrics.len(), 2);

        let cpu = &config.metrics[0];
        assert_eq!(cpu.table, "node_cpu");
        assert_eq!(cpu.columns.get("instance"), Some(&"host".to_string()));
        assert!(!cpu.info);

        let info = &config.metrics[1];
        assert_eq!(info.table, "node_info");
        assert!(info.columns.is_empty());
        assert!(info.info);
    }

    #[test]
    fn test_metrics_config_duplicate_table() {
        let yaml = r#"
metrics:
  - table: node_cpu
    promql: a
  - table: node_cpu
    promql: b
"#;

        let config: MetricsConfig = serde_yaml::from_str(yaml).unwrap();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_metrics_config_empty_promql() {
        let yaml = r#"
metrics:
  - table: node_cpu
    promql: ''
"#;

        let config: MetricsConfig = serde_yaml::from_str(yaml).unwrap();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("promql"));
    }

    #[test]
    fn test_metrics_config_duplicate_output_column() {
        let yaml = r#"
metrics:
  - table: node_cpu
    promql: a
    columns:
      instance: host
      node: host
"#;

        let config: MetricsConfig = serde_yaml::from_str(yaml).unwrap();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("output column"));
    }

    #[test]
    fn test_to_specs_order_and_flags() {
        let yaml = r#"
metrics:
  - table: first
    promql: up
  - table: second
    promql: node_uname_info
    info: true
"#;

        let config: MetricsConfig = serde_yaml::from_str(yaml).unwrap();
        let specs = config.to_specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].table(), "first");
        assert!(!specs[0].is_info());
        assert_eq!(specs[1].table(), "second");
        assert!(specs[1].is_info());
    }
}
