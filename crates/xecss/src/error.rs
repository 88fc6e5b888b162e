use std::path::PathBuf;

use thiserror::Error;
use xecss_template::TemplateParseError;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("The declaration prefix must not be empty")]
  EmptyPrefix,

  #[error("Invalid pseudo-class name {0:?}")]
  InvalidPseudo(String),

  #[error("Invalid xeCss configuration in package.json: {0}")]
  InvalidPackageJson(#[from] serde_json::Error),

  #[error("Failed to build a matcher: {0}")]
  Matcher(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum ScanError {
  #[error("No <template> region found")]
  MissingTemplateRegion,

  #[error("Failed to parse template: {0}")]
  Parse(#[from] TemplateParseError),

  #[error("Failed to read template source {module_id}")]
  Read {
    module_id: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("No template source is configured")]
  NoTemplateSource,

  #[error("Scan task did not complete: {0}")]
  Aborted(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("Corrupt snapshot cache: {0}")]
  Corrupt(#[from] serde_json::Error),

  #[error(transparent)]
  Store(#[from] anyhow::Error),
}
