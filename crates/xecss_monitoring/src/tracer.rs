//! Configures `tracing_subscriber` to write to a rolling log file and/or standard output.
use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::from_env::optional_var;
use crate::from_env::FromEnvError;

pub const TRACING_MODE_VAR: &str = "XECSS_TRACING_MODE";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum TracerMode {
  /// Output the logs to stdout
  Stdout,
  /// Output the logs to hourly rotated files under the temp directory
  File,
}

impl TracerMode {
  /// Parses the comma separated `XECSS_TRACING_MODE` variable, unset means no tracing
  pub fn from_env() -> Result<Vec<Self>, FromEnvError> {
    match optional_var(TRACING_MODE_VAR) {
      Some(modes) => Self::parse_list(&modes),
      None => Ok(vec![]),
    }
  }

  pub fn parse_list(modes: &str) -> Result<Vec<Self>, FromEnvError> {
    let mut seen = HashSet::new();
    let mut tracer_modes = vec![];

    for mode in modes.split(',').map(str::trim) {
      let mode = match mode {
        "stdout" => TracerMode::Stdout,
        "file" => TracerMode::File,
        value => {
          return Err(FromEnvError::InvalidValue {
            key: String::from(TRACING_MODE_VAR),
            value: value.to_string(),
          })
        }
      };
      if seen.insert(mode.clone()) {
        tracer_modes.push(mode);
      }
    }

    Ok(tracer_modes)
  }

  pub fn log_directory() -> PathBuf {
    std::env::temp_dir().join("xecss_trace")
  }
}

/// Keeps the non-blocking writers alive; dropping it flushes pending log lines
pub struct Tracer {
  #[allow(unused)]
  worker_guards: Vec<WorkerGuard>,
}

impl Tracer {
  pub fn new(options: &[TracerMode]) -> anyhow::Result<Self> {
    let mut worker_guards = vec![];

    let file_layer = if options.contains(&TracerMode::File) {
      let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::HOURLY)
        .max_log_files(4)
        .filename_prefix("xecss-tracing")
        .build(TracerMode::log_directory())
        .map_err(|err| anyhow::anyhow!(err))?;
      let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
      worker_guards.push(worker_guard);

      Some(
        tracing_subscriber::fmt::layer()
          .with_writer(non_blocking)
          .with_ansi(false)
          .with_span_events(FmtSpan::CLOSE)
          .with_filter(EnvFilter::from_default_env()),
      )
    } else {
      None
    };

    let stdout_layer = if options.contains(&TracerMode::Stdout) {
      let (non_blocking, worker_guard) = tracing_appender::non_blocking(std::io::stdout());
      worker_guards.push(worker_guard);

      Some(
        tracing_subscriber::fmt::layer()
          .with_writer(non_blocking)
          .with_span_events(FmtSpan::CLOSE)
          .with_filter(EnvFilter::from_default_env()),
      )
    } else {
      None
    };

    let subscriber = Registry::default().with(file_layer).with(stdout_layer);

    // A host may have installed its own subscriber already, ours then stays inactive
    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
      tracing::warn!(%error, "A global tracing subscriber is already installed");
    }

    Ok(Self { worker_guards })
  }
}
