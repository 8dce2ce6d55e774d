use crate::conf::error::ConfigError;
use crate::conf::types::AnalysisConfig;
use std::fs;
use std::path::Path;

/// Loads and validates an HCL analysis config. Omitted fields keep defaults.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    parse_config(&s, path)
}

/// Parses config text; `origin` is only used in error messages.
pub fn parse_config(s: &str, origin: &Path) -> Result<AnalysisConfig, ConfigError> {
    let config: AnalysisConfig = hcl::from_str(s).map_err(|e| ConfigError::parse(origin, e))?;
    config.validate()?;
    Ok(config)
}
