//! Configures tracing for hosts embedding the xecss engine.
//!
//! Tracing is disabled by default and should only be initialized once per process.
use parking_lot::Mutex;

pub use from_env::FromEnvError;
pub use tracer::TracerMode;
pub use tracer::TRACING_MODE_VAR;

mod from_env;
mod tracer;

pub static MONITORING_GUARD: Mutex<Option<MonitoringGuard>> = parking_lot::const_mutex(None);

pub struct MonitoringGuard {
  #[allow(unused)]
  tracer: Option<tracer::Tracer>,
}

#[derive(Debug, Default)]
pub struct MonitoringOptions {
  pub tracing_options: Vec<TracerMode>,
}

impl MonitoringOptions {
  pub fn from_env() -> Result<Self, FromEnvError> {
    Ok(Self {
      tracing_options: TracerMode::from_env()?,
    })
  }
}

pub fn initialize_monitoring(options: MonitoringOptions) -> anyhow::Result<()> {
  let mut global = MONITORING_GUARD.lock();
  if global.is_some() {
    tracing::warn!("Monitoring is getting set-up twice, this will no-op");
    return Ok(());
  }

  let tracer = if options.tracing_options.is_empty() {
    None
  } else {
    Some(tracer::Tracer::new(&options.tracing_options)?)
  };

  *global = Some(MonitoringGuard { tracer });
  Ok(())
}

pub fn initialize_from_env() -> anyhow::Result<()> {
  initialize_monitoring(MonitoringOptions::from_env()?)
}

/// Flushes pending log lines and allows monitoring to be initialized again
pub fn close_monitoring() {
  if MONITORING_GUARD.lock().take().is_some() {
    tracing::debug!("Closed monitoring");
  }
}
