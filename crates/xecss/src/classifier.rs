use regex::Regex;

use crate::ConfigError;
use crate::ModifierTag;
use crate::XeCssOptions;

/// Classifies attribute names and values into [`ModifierTag`] facets.
///
/// Depends only on the configured prefix and pseudo-class vocabulary. Cloning is cheap, the
/// compiled matchers are reference counted.
#[derive(Clone, Debug)]
pub struct TagClassifier {
  prefix: String,
  common_matcher: Regex,
  append_matcher: Regex,
  /// `None` when the vocabulary is empty, nothing carries a pseudo-class then
  pseudo_matcher: Option<Regex>,
}

impl TagClassifier {
  pub fn new(options: &XeCssOptions) -> Result<Self, ConfigError> {
    options.validate()?;

    let prefix = regex::escape(&options.prefix);
    let pseudo_matcher = if options.pseudos.is_empty() {
      None
    } else {
      let alternatives = options
        .pseudos
        .iter()
        .map(|pseudo| format!("{}:", regex::escape(pseudo)))
        .collect::<Vec<_>>()
        .join("|");
      Some(Regex::new(&format!("^(?:{alternatives})"))?)
    };

    Ok(TagClassifier {
      prefix: options.prefix.clone(),
      common_matcher: Regex::new(&format!("^{prefix}[:-]?"))?,
      append_matcher: Regex::new(&format!("{prefix}.*:.+"))?,
      pseudo_matcher,
    })
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  /// `COMMON` for prefixed attributes, `PSEUDO` for pseudo-class prefixed ones, otherwise empty
  /// and the attribute is not a candidate.
  pub fn classify_attribute(&self, name: &str) -> ModifierTag {
    if self.common_matcher.is_match(name) {
      ModifierTag::COMMON
    } else if self.has_pseudo_prefix(name) {
      ModifierTag::PSEUDO
    } else {
      ModifierTag::empty()
    }
  }

  /// `APPEND` and `MULTIPLY` facets of one attribute occurrence, independent of each other
  pub fn classify_occurrence(&self, name: &str, value: &str) -> ModifierTag {
    let mut tag = ModifierTag::empty();
    if self.append_matcher.is_match(name) {
      tag |= ModifierTag::APPEND;
    }
    if value.contains(' ') {
      tag |= ModifierTag::MULTIPLY;
    }
    tag
  }

  /// `VALUE_PSEUDO` when a single value token starts with a pseudo-class
  pub fn classify_value(&self, token: &str) -> ModifierTag {
    if self.has_pseudo_prefix(token) {
      ModifierTag::VALUE_PSEUDO
    } else {
      ModifierTag::empty()
    }
  }

  pub fn has_pseudo_prefix(&self, text: &str) -> bool {
    self
      .pseudo_matcher
      .as_ref()
      .is_some_and(|matcher| matcher.is_match(text))
  }
}
