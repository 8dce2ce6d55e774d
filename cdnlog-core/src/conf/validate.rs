use crate::conf::error::ConfigError;
use crate::conf::types::AnalysisConfig;
use std::collections::BTreeSet;

impl AnalysisConfig {
    /// Rejects values no aggregator can work with. Returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::InvalidTopN);
        }

        non_negative("peak_stddev_factor", self.peak_stddev_factor)?;
        non_negative("spike_threshold_pct", self.spike_threshold_pct)?;

        if self.miss_cluster_window == 0 {
            return Err(ConfigError::threshold("miss_cluster_window", 0.0));
        }

        let density = self.miss_cluster_density;
        if !(density.is_finite() && density > 0.0 && density <= 1.0) {
            return Err(ConfigError::threshold("miss_cluster_density", density));
        }

        percentile("large_response_percentile", self.large_response_percentile)?;
        for p in &self.size_percentiles {
            percentile("size_percentiles", *p)?;
        }

        self.validate_agent_table()
    }

    fn validate_agent_table(&self) -> Result<(), ConfigError> {
        if self.fallback_category.trim().is_empty() {
            return Err(ConfigError::agent_table(
                "fallback_category",
                "must not be empty",
            ));
        }

        let mut seen = BTreeSet::new();
        for (idx, category) in self.agent_categories.iter().enumerate() {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(ConfigError::agent_table(
                    format!("#{idx}"),
                    "category name must not be empty",
                ));
            }
            if !seen.insert(name) {
                return Err(ConfigError::agent_table(name, "duplicate category"));
            }
            if category.keywords.is_empty() {
                return Err(ConfigError::agent_table(name, "no keywords"));
            }
            if category.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::agent_table(name, "blank keyword"));
            }
        }

        Ok(())
    }
}

/// The trailing window must cover a positive, finite span.
pub fn validate_hours(hours: f64) -> Result<(), ConfigError> {
    if hours.is_finite() && hours > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidHours { hours })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::threshold(field, value))
    }
}

fn percentile(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::threshold(field, value))
    }
}
