use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use xecss_template::extract_template_region;
use xecss_template::MarkupParser;
use xecss_template::TemplateParserRef;

use crate::cache::read_snapshot;
use crate::cache::write_snapshot;
use crate::CacheError;
use crate::ConfigError;
use crate::Diagnostic;
use crate::DiagnosticReporterRef;
use crate::EntryCollector;
use crate::FsSnapshotStore;
use crate::RuleGenerator;
use crate::RuleTable;
use crate::ScanError;
use crate::Snapshot;
use crate::SnapshotStore;
use crate::TagClassifier;
use crate::TemplateScanner;
use crate::TemplateSourceRef;
use crate::TracingReporter;
use crate::XeCssOptions;

/// What one scan contributed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
  /// Attribute occurrences recognized in the template
  pub candidates: usize,
  /// Entries that did not exist before this scan
  pub new_entries: usize,
}

/// Counts scans that have been started but not merged yet
struct PendingScans {
  count: watch::Sender<usize>,
}

impl PendingScans {
  fn new() -> Self {
    let (count, _) = watch::channel(0);
    PendingScans { count }
  }

  fn enter(self: &Arc<Self>) -> PendingScanGuard {
    self.count.send_modify(|count| *count += 1);
    PendingScanGuard {
      pending: Arc::clone(self),
    }
  }

  fn len(&self) -> usize {
    *self.count.borrow()
  }

  async fn wait_idle(&self) {
    let mut idle = self.count.subscribe();
    // The sender lives in `self`, so the channel cannot close while waiting
    let _ = idle.wait_for(|count| *count == 0).await;
  }
}

/// Releases its pending slot when dropped, including when the scan panics
struct PendingScanGuard {
  pending: Arc<PendingScans>,
}

impl Drop for PendingScanGuard {
  fn drop(&mut self) {
    self
      .pending
      .count
      .send_modify(|count| *count = count.saturating_sub(1));
  }
}

/// Resolves once the scan has been merged into the collector
pub struct ScanHandle {
  state: ScanState,
}

enum ScanState {
  Running(JoinHandle<Result<ScanReport, ScanError>>),
  /// The scan never started, the error is handed out on first poll
  Failed(Option<ScanError>),
}

impl Future for ScanHandle {
  type Output = Result<ScanReport, ScanError>;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    match &mut self.state {
      ScanState::Running(task) => Pin::new(task).poll(cx).map(|joined| match joined {
        Ok(report) => report,
        Err(error) => Err(ScanError::Aborted(error.to_string())),
      }),
      ScanState::Failed(error) => Poll::Ready(Err(
        error
          .take()
          .unwrap_or_else(|| ScanError::Aborted("scan already resolved".into())),
      )),
    }
  }
}

pub struct EngineBuilder {
  options: XeCssOptions,
  rules: Option<RuleTable>,
  parser: Option<TemplateParserRef>,
  reporter: Option<DiagnosticReporterRef>,
  source: Option<TemplateSourceRef>,
}

impl EngineBuilder {
  pub fn new(options: XeCssOptions) -> Self {
    EngineBuilder {
      options,
      rules: None,
      parser: None,
      reporter: None,
      source: None,
    }
  }

  /// Replaces the built-in rule table
  pub fn rules(mut self, rules: RuleTable) -> Self {
    self.rules = Some(rules);
    self
  }

  pub fn parser(mut self, parser: TemplateParserRef) -> Self {
    self.parser = Some(parser);
    self
  }

  pub fn reporter(mut self, reporter: DiagnosticReporterRef) -> Self {
    self.reporter = Some(reporter);
    self
  }

  pub fn source(mut self, source: TemplateSourceRef) -> Self {
    self.source = Some(source);
    self
  }

  pub fn build(self) -> Result<Engine, ConfigError> {
    let classifier = TagClassifier::new(&self.options)?;
    let generator = RuleGenerator::new(
      self.options.prefix.clone(),
      self.rules.unwrap_or_else(RuleTable::with_defaults),
    );

    Ok(Engine {
      inner: Arc::new(EngineInner {
        collector: Mutex::new(EntryCollector::new(classifier.clone())),
        classifier,
        generator,
        parser: self.parser.unwrap_or_else(|| Arc::new(MarkupParser)),
        reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
        source: self.source,
        pending: Arc::new(PendingScans::new()),
        css: tokio::sync::Mutex::new(String::new()),
        options: self.options,
      }),
    })
  }
}

/// Entry point for a host build.
///
/// Scans run on the blocking thread pool and merge their entries into one shared collector;
/// [`Engine::render`] waits for every scan started before it and regenerates the CSS only when
/// the collected entries changed. Cloning is cheap and every clone shares the same state.
///
/// Scanning needs a running Tokio runtime; without one, scan handles resolve to
/// [`ScanError::Aborted`].
#[derive(Clone)]
pub struct Engine {
  inner: Arc<EngineInner>,
}

struct EngineInner {
  options: XeCssOptions,
  classifier: TagClassifier,
  collector: Mutex<EntryCollector>,
  generator: RuleGenerator,
  parser: TemplateParserRef,
  reporter: DiagnosticReporterRef,
  source: Option<TemplateSourceRef>,
  pending: Arc<PendingScans>,
  /// Last rendered output, the lock also serializes renders
  css: tokio::sync::Mutex<String>,
}

impl Engine {
  pub fn new(options: XeCssOptions) -> Result<Self, ConfigError> {
    EngineBuilder::new(options).build()
  }

  pub fn builder(options: XeCssOptions) -> EngineBuilder {
    EngineBuilder::new(options)
  }

  pub fn options(&self) -> &XeCssOptions {
    &self.inner.options
  }

  /// Scans the template region of one module source
  pub fn scan(&self, source: impl Into<String>) -> ScanHandle {
    let source = source.into();
    self.spawn_scan(move |engine| engine.scan_source(&source, None))
  }

  /// Reads a module through the configured [`TemplateSource`](crate::TemplateSource) and scans it
  pub fn scan_module(&self, module_id: impl Into<PathBuf>) -> ScanHandle {
    let module_id = module_id.into();
    self.spawn_scan(move |engine| {
      let source = engine.read_module(&module_id)?;
      engine.scan_source(&source, Some(&module_id))
    })
  }

  fn spawn_scan<F>(&self, scan: F) -> ScanHandle
  where
    F: FnOnce(&EngineInner) -> Result<ScanReport, ScanError> + Send + 'static,
  {
    let runtime = match tokio::runtime::Handle::try_current() {
      Ok(runtime) => runtime,
      Err(error) => {
        tracing::error!(%error, "Scan requested outside a tokio runtime");
        return ScanHandle {
          state: ScanState::Failed(Some(ScanError::Aborted(error.to_string()))),
        };
      }
    };

    let engine = Arc::clone(&self.inner);
    let guard = self.inner.pending.enter();
    let task = runtime.spawn_blocking(move || {
      let _guard = guard;
      scan(&engine)
    });
    ScanHandle {
      state: ScanState::Running(task),
    }
  }

  /// Waits for pending scans, regenerates the CSS if entries changed or `force` is set and
  /// returns the current output
  #[tracing::instrument(level = "debug", skip(self))]
  pub async fn render(&self, force: bool) -> String {
    self.inner.pending.wait_idle().await;
    let mut css = self.inner.css.lock().await;

    let entries = {
      let mut collector = self.inner.collector.lock();
      if !collector.needs_patch() && !force {
        tracing::debug!("Entries unchanged, reusing the previous output");
        return css.clone();
      }
      collector.mark_patched();
      collector.entries()
    };

    *css = self.inner.generator.render(&entries);
    tracing::debug!(entries = entries.len(), bytes = css.len(), "Rendered css");
    css.clone()
  }

  pub fn needs_patch(&self) -> bool {
    self.inner.collector.lock().needs_patch()
  }

  /// Scans started but not yet merged
  pub fn pending_scans(&self) -> usize {
    self.inner.pending.len()
  }

  pub fn len(&self) -> usize {
    self.inner.collector.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.collector.lock().is_empty()
  }

  pub fn export_snapshot(&self) -> Snapshot {
    self.inner.collector.lock().export_snapshot()
  }

  pub fn load_snapshot(&self, snapshot: Snapshot) {
    self.inner.collector.lock().load_snapshot(snapshot);
  }

  /// The store for the configured `cacheFile`, if any
  pub fn cache_store(&self) -> Option<FsSnapshotStore> {
    self
      .inner
      .options
      .cache_file
      .as_ref()
      .map(|path| FsSnapshotStore::new(path.clone()))
  }

  /// Seeds the collector from a persisted snapshot and returns how many pairs were loaded.
  ///
  /// A missing, unreadable or corrupt snapshot is logged and treated as empty.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn load_cache(&self, store: &dyn SnapshotStore) -> usize {
    match read_snapshot(store) {
      Ok(Some(snapshot)) => {
        let loaded = snapshot.len();
        self.load_snapshot(snapshot);
        tracing::debug!(loaded, "Loaded snapshot cache");
        loaded
      }
      Ok(None) => 0,
      Err(error) => {
        tracing::warn!(%error, "Ignoring unusable snapshot cache");
        0
      }
    }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn persist_cache(&self, store: &dyn SnapshotStore) -> Result<(), CacheError> {
    write_snapshot(store, &self.export_snapshot())
  }
}

impl EngineInner {
  fn report(&self, diagnostic: Diagnostic, origin: Option<&Path>) {
    let diagnostic = match origin {
      Some(origin) => diagnostic.with_origin(origin.display().to_string()),
      None => diagnostic,
    };
    self.reporter.report(diagnostic);
  }

  fn read_module(&self, module_id: &Path) -> Result<String, ScanError> {
    let Some(source) = &self.source else {
      self.report(
        Diagnostic::error("Cannot read modules without a template source"),
        Some(module_id),
      );
      return Err(ScanError::NoTemplateSource);
    };

    source.read_template(module_id).map_err(|error| {
      self.report(
        Diagnostic::error(format!("Failed to read template source: {error}")),
        Some(module_id),
      );
      ScanError::Read {
        module_id: module_id.to_path_buf(),
        source: error,
      }
    })
  }

  #[tracing::instrument(level = "debug", skip(self, source))]
  fn scan_source(&self, source: &str, origin: Option<&Path>) -> Result<ScanReport, ScanError> {
    let Some(region) = extract_template_region(source) else {
      if self.options.require_template {
        self.report(
          Diagnostic::warning("No <template> region found")
            .with_hint("Utility attributes are only collected inside <template>...</template>"),
          origin,
        );
        return Err(ScanError::MissingTemplateRegion);
      }
      tracing::debug!("No template region, nothing to scan");
      return Ok(ScanReport::default());
    };

    let nodes = self.parser.parse(region).map_err(|error| {
      self.report(
        Diagnostic::error(format!("Failed to parse template: {error}")),
        origin,
      );
      ScanError::Parse(error)
    })?;

    let candidates = TemplateScanner::new(&self.classifier).scan(&nodes);
    let new_entries = {
      let mut collector = self.collector.lock();
      candidates
        .iter()
        .map(|candidate| collector.collect(&candidate.attribute, &candidate.value, candidate.tag))
        .sum()
    };

    let report = ScanReport {
      candidates: candidates.len(),
      new_entries,
    };
    tracing::debug!(
      candidates = report.candidates,
      new_entries = report.new_entries,
      "Scanned template"
    );
    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use std::io;

  use pretty_assertions::assert_eq;
  use xecss_template::ElementNode;
  use xecss_template::MockTemplateParser;
  use xecss_template::Prop;
  use xecss_template::TemplateNode;

  use super::*;
  use crate::DiagnosticKind;
  use crate::MemorySnapshotStore;
  use crate::MockDiagnosticReporter;
  use crate::MockTemplateSource;
  use crate::ModifierTag;

  fn silent_reporter() -> DiagnosticReporterRef {
    let mut reporter = MockDiagnosticReporter::new();
    reporter.expect_report().never();
    Arc::new(reporter)
  }

  fn engine() -> Engine {
    Engine::builder(XeCssOptions::default())
      .reporter(silent_reporter())
      .build()
      .unwrap()
  }

  #[tokio::test]
  async fn scans_and_renders() {
    let engine = engine();
    let report = engine
      .scan(r#"<template><div xe-m="10" class="box"></div></template>"#)
      .await
      .unwrap();

    assert_eq!(
      report,
      ScanReport {
        candidates: 1,
        new_entries: 1,
      }
    );
    assert_eq!(
      engine.render(false).await,
      "[xe-m=\"10\"] { margin:10px!important; } "
    );
    assert!(!engine.needs_patch());
  }

  #[test]
  fn scanning_outside_a_runtime_fails_without_panicking() {
    let engine = engine();
    let handle = engine.scan(r#"<template><div xe-m="10"></div></template>"#);
    assert_eq!(engine.pending_scans(), 0);

    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .unwrap();
    let result = runtime.block_on(handle);

    assert!(matches!(result, Err(ScanError::Aborted(_))));
    assert!(engine.is_empty());
  }

  #[tokio::test]
  async fn static_declarations_render_after_bindings_on_the_same_element() {
    let engine = engine();
    engine
      .scan(r#"<template><div :xe-bg="on ? 'red' : 'blue'" xe-bg-gray></div></template>"#)
      .await
      .unwrap();

    assert_eq!(
      engine.render(false).await,
      concat!(
        "[xe-bg~=\"red\"] { background-color:rgba(255,51,51,1)!important; } ",
        "[xe-bg~=\"blue\"] { background-color:rgba(51,119,255,1)!important; } ",
        "[xe-bg-gray] { background-color:rgba(140,147,157,1)!important; } ",
      )
    );
  }

  #[tokio::test]
  async fn renders_only_when_entries_change() {
    let engine = Engine::builder(XeCssOptions::default())
      .reporter(silent_reporter())
      .rules(RuleTable::new(vec![crate::Rule::new("margin", r"^m-([0-9]+)$", |found| {
        Some(crate::Declarations::single("margin", format!("{}px", found.group(1))))
      })
      .unwrap()]))
      .build()
      .unwrap();

    engine.scan("<template><i xe-m-1></i></template>").await.unwrap();
    let first = engine.render(false).await;

    let report = engine.scan("<template><i xe-m-1></i></template>").await.unwrap();
    assert_eq!(report.new_entries, 0);
    assert!(!engine.needs_patch());
    assert_eq!(engine.render(false).await, first);

    engine.scan("<template><b xe-m-2></b></template>").await.unwrap();
    assert!(engine.needs_patch());
    assert_eq!(
      engine.render(false).await,
      "[xe-m-1] { margin:1px!important; } [xe-m-2] { margin:2px!important; } "
    );
    assert_eq!(engine.render(true).await, engine.render(false).await);
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn render_waits_for_every_pending_scan() {
    let engine = engine();
    let handles = (1..=20)
      .map(|n| engine.scan(format!("<template><i xe-p=\"{n}\"></i></template>")))
      .collect::<Vec<_>>();

    let css = engine.render(false).await;

    assert_eq!(engine.pending_scans(), 0);
    assert_eq!(engine.len(), 20);
    for n in 1..=20 {
      assert!(css.contains(&format!("[xe-p=\"{n}\"]")), "{n}");
    }
    for handle in handles {
      assert_eq!(handle.await.unwrap().new_entries, 1);
    }
  }

  #[tokio::test]
  async fn sources_without_a_template_are_skipped() {
    let engine = engine();
    let report = engine.scan("export default {}").await.unwrap();

    assert_eq!(report, ScanReport::default());
    assert!(engine.is_empty());
  }

  #[tokio::test]
  async fn missing_templates_are_reported_when_required() {
    let mut reporter = MockDiagnosticReporter::new();
    reporter
      .expect_report()
      .withf(|diagnostic| {
        diagnostic.kind == DiagnosticKind::Warning && diagnostic.message.contains("<template>")
      })
      .times(1)
      .return_const(());

    let engine = Engine::builder(XeCssOptions {
      require_template: true,
      ..Default::default()
    })
    .reporter(Arc::new(reporter))
    .build()
    .unwrap();

    let result = engine.scan("export default {}").await;

    assert!(matches!(result, Err(ScanError::MissingTemplateRegion)));
    assert!(engine.is_empty());
    assert_eq!(engine.render(false).await, "");
  }

  #[tokio::test]
  async fn parse_failures_are_reported_and_leave_entries_alone() {
    let mut reporter = MockDiagnosticReporter::new();
    reporter
      .expect_report()
      .withf(|diagnostic| diagnostic.kind == DiagnosticKind::Error)
      .times(1)
      .return_const(());

    let engine = Engine::builder(XeCssOptions::default())
      .reporter(Arc::new(reporter))
      .build()
      .unwrap();

    let result = engine
      .scan("<template><div xe-m=\"1\"><span></div></template>")
      .await;

    assert!(matches!(result, Err(ScanError::Parse(_))));
    assert!(engine.is_empty());
  }

  #[tokio::test]
  async fn uses_the_configured_parser() {
    let mut parser = MockTemplateParser::new();
    parser
      .expect_parse()
      .withf(|source| source.starts_with("<template"))
      .times(1)
      .returning(|_| {
        Ok(vec![TemplateNode::Element(
          ElementNode::new("div").with_prop(Prop::bind("xe-fc", "on ? 'red' : 'blue'")),
        )])
      });

    let engine = Engine::builder(XeCssOptions::default())
      .parser(Arc::new(parser))
      .reporter(silent_reporter())
      .build()
      .unwrap();

    let report = engine.scan("<template>ignored</template>").await.unwrap();

    assert_eq!(report.new_entries, 2);
    assert_eq!(
      engine.export_snapshot(),
      Snapshot(vec![
        ("xe-fc=red".into(), ModifierTag::COMMON | ModifierTag::MULTIPLY),
        ("xe-fc=blue".into(), ModifierTag::COMMON | ModifierTag::MULTIPLY),
      ])
    );
  }

  #[tokio::test]
  async fn scans_modules_through_the_template_source() {
    let mut source = MockTemplateSource::new();
    source
      .expect_read_template()
      .withf(|module_id| module_id == Path::new("src/App.vue"))
      .returning(|_| Ok(String::from("<template><i xe-w-100></i></template>")));
    source
      .expect_read_template()
      .withf(|module_id| module_id == Path::new("src/Gone.vue"))
      .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "gone")));

    let mut reporter = MockDiagnosticReporter::new();
    reporter
      .expect_report()
      .withf(|diagnostic| diagnostic.origin.as_deref() == Some("src/Gone.vue"))
      .times(1)
      .return_const(());

    let engine = Engine::builder(XeCssOptions::default())
      .source(Arc::new(source))
      .reporter(Arc::new(reporter))
      .build()
      .unwrap();

    assert_eq!(engine.scan_module("src/App.vue").await.unwrap().new_entries, 1);
    assert!(matches!(
      engine.scan_module("src/Gone.vue").await,
      Err(ScanError::Read { module_id, .. }) if module_id == Path::new("src/Gone.vue")
    ));
    assert_eq!(engine.render(false).await, "[xe-w-100] { width:100px!important; } ");
  }

  #[tokio::test]
  async fn module_scans_need_a_template_source() {
    let mut reporter = MockDiagnosticReporter::new();
    reporter.expect_report().times(1).return_const(());
    let engine = Engine::builder(XeCssOptions::default())
      .reporter(Arc::new(reporter))
      .build()
      .unwrap();

    assert!(matches!(
      engine.scan_module("src/App.vue").await,
      Err(ScanError::NoTemplateSource)
    ));
  }

  #[tokio::test]
  async fn caches_round_trip_between_sessions() {
    let store = MemorySnapshotStore::new();
    let first = engine();
    first
      .scan(r#"<template><i xe="m-10 hover:p-4" xe-fc-red></i></template>"#)
      .await
      .unwrap();
    first.persist_cache(&store).unwrap();

    let second = engine();
    assert_eq!(second.load_cache(&store), 3);
    assert_eq!(second.export_snapshot(), first.export_snapshot());
    assert_eq!(second.render(false).await, first.render(false).await);
  }

  #[tokio::test]
  async fn unusable_caches_start_cold() {
    let engine = engine();
    assert_eq!(engine.load_cache(&MemorySnapshotStore::new()), 0);
    assert_eq!(engine.load_cache(&MemorySnapshotStore::with_bytes("[[\"xe-m=1\"")), 0);
    assert!(engine.is_empty());

    engine.scan("<template><i xe-m-1></i></template>").await.unwrap();
    assert_eq!(engine.len(), 1);
  }

  #[test]
  fn cache_store_follows_the_options() {
    let engine = Engine::new(XeCssOptions {
      cache_file: Some(PathBuf::from("node_modules/.cache/xe-css.json")),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(
      engine.cache_store().unwrap().path(),
      Path::new("node_modules/.cache/xe-css.json")
    );
    assert!(Engine::new(XeCssOptions::default())
      .unwrap()
      .cache_store()
      .is_none());
  }
}
