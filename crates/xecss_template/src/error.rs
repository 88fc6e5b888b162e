use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateParseError {
  #[error("Malformed template markup at byte {offset}: expected {expected}")]
  Malformed { offset: usize, expected: String },

  #[error("Unexpected closing tag at byte {offset}")]
  UnexpectedClosingTag { offset: usize },

  #[error("Template markup ended unexpectedly")]
  UnexpectedEof,
}

impl TemplateParseError {
  pub fn offset(&self) -> Option<usize> {
    match self {
      TemplateParseError::Malformed { offset, .. } => Some(*offset),
      TemplateParseError::UnexpectedClosingTag { offset } => Some(*offset),
      TemplateParseError::UnexpectedEof => None,
    }
  }
}
