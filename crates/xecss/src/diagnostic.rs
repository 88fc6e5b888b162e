use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
  #[default]
  Error,
  Warning,
}

/// A soft failure surfaced to the host build, never fatal to it
#[derive(Error, Debug, Deserialize, PartialEq, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
  pub kind: DiagnosticKind,

  /// A summary user-facing message
  pub message: String,

  /// The module the diagnostic relates to, when known
  pub origin: Option<String>,

  /// Hints for the user
  pub hints: Vec<String>,
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.message)
  }
}

impl Diagnostic {
  pub fn error(message: impl Into<String>) -> Self {
    Diagnostic {
      kind: DiagnosticKind::Error,
      message: message.into(),
      ..Default::default()
    }
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Diagnostic {
      kind: DiagnosticKind::Warning,
      message: message.into(),
      ..Default::default()
    }
  }

  pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
    self.origin = Some(origin.into());
    self
  }

  pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
    self.hints.push(hint.into());
    self
  }
}

pub type DiagnosticReporterRef = Arc<dyn DiagnosticReporter>;

/// Receives scan failures on behalf of the host build
#[mockall::automock]
pub trait DiagnosticReporter: Send + Sync {
  fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the tracing subscriber
#[derive(Clone, Debug, Default)]
pub struct TracingReporter;

impl DiagnosticReporter for TracingReporter {
  fn report(&self, diagnostic: Diagnostic) {
    let origin = diagnostic.origin.as_deref().unwrap_or("<inline>");
    match diagnostic.kind {
      DiagnosticKind::Error => {
        tracing::error!(origin, hints = ?diagnostic.hints, "{}", diagnostic.message)
      }
      DiagnosticKind::Warning => {
        tracing::warn!(origin, hints = ?diagnostic.hints, "{}", diagnostic.message)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn serializes_in_camel_case() {
    let diagnostic = Diagnostic::warning("No <template> region found")
      .with_origin("src/App.vue")
      .with_hint("Wrap the markup in <template>");

    assert_eq!(
      serde_json::to_value(&diagnostic).unwrap(),
      serde_json::json!({
        "kind": "warning",
        "message": "No <template> region found",
        "origin": "src/App.vue",
        "hints": ["Wrap the markup in <template>"],
      })
    );
    assert_eq!(diagnostic.to_string(), "No <template> region found");
  }
}
