use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::ConfigError;

static PSEUDO_NAME: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("pseudo name regex should compile")
});

pub const DEFAULT_PREFIX: &str = "xe";
pub const DEFAULT_PSEUDOS: &[&str] = &["focus", "hover"];

/// Options for one engine instance.
///
/// Rule tables are not part of the options: handlers are code and are passed to the
/// [`EngineBuilder`](crate::EngineBuilder) directly.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct XeCssOptions {
  /// Literal marking an attribute as a utility declaration
  pub prefix: String,
  /// Pseudo-classes accepted as declaration modifiers, e.g. `hover:xe-m-10`
  pub pseudos: Vec<String>,
  /// Report sources without a `<template>` region instead of skipping them silently
  pub require_template: bool,
  /// Where the entry snapshot is persisted between build sessions
  pub cache_file: Option<PathBuf>,
}

impl Default for XeCssOptions {
  fn default() -> Self {
    XeCssOptions {
      prefix: String::from(DEFAULT_PREFIX),
      pseudos: DEFAULT_PSEUDOS.iter().map(|pseudo| pseudo.to_string()).collect(),
      require_template: false,
      cache_file: None,
    }
  }
}

#[derive(Deserialize)]
struct PackageJson {
  #[serde(rename = "xeCss")]
  config: Option<XeCssOptions>,
}

impl XeCssOptions {
  /// Reads options from the `"xeCss"` key of a package.json document
  pub fn from_package_json(contents: &str) -> Result<Self, ConfigError> {
    let package_json: PackageJson = serde_json::from_str(contents)?;
    let options = package_json.config.unwrap_or_default();
    options.validate()?;
    Ok(options)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.prefix.is_empty() {
      return Err(ConfigError::EmptyPrefix);
    }

    if let Some(pseudo) = self
      .pseudos
      .iter()
      .find(|pseudo| !PSEUDO_NAME.is_match(pseudo))
    {
      return Err(ConfigError::InvalidPseudo(pseudo.clone()));
    }

    Ok(())
  }
}
