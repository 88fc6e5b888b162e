use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FromEnvError {
  #[error("Invalid value {value:?} for {key}")]
  InvalidValue { key: String, value: String },
}

/// Reads an environment variable, treating an empty value as unset
pub fn optional_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
