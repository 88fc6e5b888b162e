use crate::collector::Entry;
use crate::rules::RuleTable;
use crate::ModifierTag;

/// The token presented to the rule table for one entry, plus the pseudo-class it renders under
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchToken {
  pub token: String,
  pub pseudo: Option<String>,
}

/// Turns collected entries into CSS text
#[derive(Clone, Debug)]
pub struct RuleGenerator {
  prefix: String,
  rules: RuleTable,
}

impl RuleGenerator {
  pub fn new(prefix: impl Into<String>, rules: RuleTable) -> Self {
    RuleGenerator {
      prefix: prefix.into(),
      rules,
    }
  }

  pub fn rules(&self) -> &RuleTable {
    &self.rules
  }

  /// Concatenates the rule for every entry, in entry order
  #[tracing::instrument(level = "debug", skip_all, fields(entries = entries.len()))]
  pub fn render(&self, entries: &[Entry]) -> String {
    entries
      .iter()
      .map(|entry| self.render_entry(entry))
      .collect()
  }

  /// One CSS rule for the entry, or an empty string when nothing matches it
  pub fn render_entry(&self, entry: &Entry) -> String {
    let MatchToken { token, pseudo } = self.normalize(entry);
    let declarations = self.rules.apply(&token).into_declarations();
    if declarations.is_empty() {
      return String::new();
    }

    let (attribute, value) = entry.split();
    let mut selector = String::from(attribute);
    if !value.is_empty() {
      let operator = if entry.tag.contains(ModifierTag::MULTIPLY) {
        "~="
      } else {
        "="
      };
      selector.push_str(&format!("{operator}\"{value}\""));
    }

    let body: String = declarations
      .iter()
      .map(|(property, value)| format!("{property}:{value}!important;"))
      .collect();
    let pseudo = pseudo.map(|pseudo| format!(":{pseudo}")).unwrap_or_default();

    format!("[{}]{pseudo} {{ {body} }} ", escape_selector(&selector))
  }

  /// Rebuilds the canonical `attribute-value` token from however the declaration was written.
  ///
  /// `hover:xe-m="10"`, `xe:10="hover:m"` and `xe-m-10` under a hover tag all normalize to `m-10`.
  pub fn normalize(&self, entry: &Entry) -> MatchToken {
    let (attribute, value) = entry.split();
    let mut attribute = strip_prefix(attribute, &self.prefix);
    let mut value = value.to_string();
    let mut pseudo = None;

    if entry.tag.contains(ModifierTag::PSEUDO) {
      if let Some((name, rest)) = split_pseudo(&attribute) {
        pseudo = Some(name.to_string());
        attribute = rest.to_string();
      }
    }

    if entry.tag.contains(ModifierTag::VALUE_PSEUDO) {
      if let Some((name, rest)) = split_pseudo(&value) {
        pseudo = Some(name.to_string());
        value = rest.to_string();
      }
    }

    if entry.tag.contains(ModifierTag::APPEND) {
      if let Some(index) = attribute.rfind(':').filter(|index| index + 1 < attribute.len()) {
        value.push('-');
        value.push_str(&attribute[index + 1..]);
        attribute.truncate(index);
      }
    }

    let separator = if !attribute.is_empty() && !value.is_empty() {
      "-"
    } else {
      ""
    };

    MatchToken {
      token: format!("{attribute}{separator}{value}"),
      pseudo,
    }
  }
}

/// Removes `prefix` and one `-` following it, either at the start or right after a leading
/// `pseudo:` segment
fn strip_prefix(attribute: &str, prefix: &str) -> String {
  let start = if attribute.starts_with(prefix) {
    0
  } else {
    match attribute.find(':') {
      Some(colon) if attribute[colon + 1..].starts_with(prefix) => colon + 1,
      _ => return attribute.to_string(),
    }
  };

  let rest = &attribute[start + prefix.len()..];
  let rest = rest.strip_prefix('-').unwrap_or(rest);
  format!("{}{rest}", &attribute[..start])
}

/// Splits a leading `name:` segment off
fn split_pseudo(text: &str) -> Option<(&str, &str)> {
  match text.split_once(':') {
    Some((name, rest)) if !name.is_empty() => Some((name, rest)),
    _ => None,
  }
}

fn escape_selector(selector: &str) -> String {
  selector.replace(':', "\\:").replace('/', "\\/")
}
