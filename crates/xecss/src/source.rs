use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

pub type TemplateSourceRef = Arc<dyn TemplateSource>;

/// Provides the raw source text of a module for scanning
#[mockall::automock]
pub trait TemplateSource: Send + Sync {
  fn read_template(&self, module_id: &Path) -> std::io::Result<String>;
}

/// Reads modules from disk, relative ids resolve against `root`
#[derive(Clone, Debug, Default)]
pub struct FsTemplateSource {
  root: PathBuf,
}

impl FsTemplateSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl TemplateSource for FsTemplateSource {
  fn read_template(&self, module_id: &Path) -> std::io::Result<String> {
    fs::read_to_string(self.root.join(module_id))
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn reads_relative_to_the_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("App.vue"), "<template><i xe-m=\"1\"></i></template>").unwrap();

    let source = FsTemplateSource::new(dir.path());
    assert_eq!(
      source.read_template(Path::new("App.vue")).unwrap(),
      "<template><i xe-m=\"1\"></i></template>"
    );
    assert!(source.read_template(Path::new("Missing.vue")).is_err());
  }
}
