use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Captures;
use regex::Regex;

pub use self::defaults::default_rules;

mod defaults;

/// CSS property to value map produced by one rule, in declaration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declarations(IndexMap<String, String>);

impl Declarations {
  pub fn new() -> Self {
    Declarations::default()
  }

  pub fn single(property: impl Into<String>, value: impl Into<String>) -> Self {
    Declarations::new().with(property, value)
  }

  pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
    self.insert(property, value);
    self
  }

  pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
    self.0.insert(property.into(), value.into());
  }

  pub fn get(&self, property: &str) -> Option<&str> {
    self.0.get(property).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .0
      .iter()
      .map(|(property, value)| (property.as_str(), value.as_str()))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<P: Into<String>, V: Into<String>> FromIterator<(P, V)> for Declarations {
  fn from_iter<T: IntoIterator<Item = (P, V)>>(iter: T) -> Self {
    let mut declarations = Declarations::new();
    for (property, value) in iter {
      declarations.insert(property, value);
    }
    declarations
  }
}

/// Capture groups of a rule pattern matched against one match token
pub struct RuleMatch<'t> {
  captures: Captures<'t>,
}

impl RuleMatch<'_> {
  /// Capture group `index` (1 based), or an empty string when the group did not participate
  pub fn group(&self, index: usize) -> &str {
    self
      .captures
      .get(index)
      .map_or("", |capture| capture.as_str())
  }

  pub fn token(&self) -> &str {
    self.group(0)
  }
}

/// Returns the declarations for a matched token.
///
/// `None` means the handler could not make sense of a token its own pattern accepted. The entry
/// then contributes nothing, same as an empty map.
pub type RuleHandler = dyn Fn(&RuleMatch<'_>) -> Option<Declarations> + Send + Sync;

#[derive(Clone)]
pub struct Rule {
  name: String,
  pattern: Regex,
  handler: Arc<RuleHandler>,
}

impl fmt::Debug for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Rule")
      .field("name", &self.name)
      .field("pattern", &self.pattern.as_str())
      .finish_non_exhaustive()
  }
}

impl Rule {
  pub fn new<F>(name: impl Into<String>, pattern: &str, handler: F) -> Result<Self, regex::Error>
  where
    F: Fn(&RuleMatch<'_>) -> Option<Declarations> + Send + Sync + 'static,
  {
    Ok(Rule {
      name: name.into(),
      pattern: Regex::new(pattern)?,
      handler: Arc::new(handler),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn pattern(&self) -> &str {
    self.pattern.as_str()
  }

  fn try_match<'t>(&self, token: &'t str) -> Option<RuleMatch<'t>> {
    self
      .pattern
      .captures(token)
      .map(|captures| RuleMatch { captures })
  }
}

/// Outcome of running a match token through a [`RuleTable`]
#[derive(Debug, PartialEq)]
pub enum RuleOutcome<'r> {
  Matched {
    rule: &'r str,
    declarations: Declarations,
  },
  /// A rule claimed the token but its handler produced nothing usable
  Rejected { rule: &'r str },
  Unmatched,
}

impl RuleOutcome<'_> {
  pub fn into_declarations(self) -> Declarations {
    match self {
      RuleOutcome::Matched { declarations, .. } => declarations,
      RuleOutcome::Rejected { .. } | RuleOutcome::Unmatched => Declarations::new(),
    }
  }
}

/// Ordered rules evaluated with first-match-wins semantics
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
  rules: Vec<Rule>,
}

impl RuleTable {
  pub fn new(rules: Vec<Rule>) -> Self {
    RuleTable { rules }
  }

  /// The built-in utility vocabulary
  pub fn with_defaults() -> Self {
    RuleTable::new(default_rules().to_vec())
  }

  /// Adds rules that are tried before every existing one
  pub fn prepend(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
    let mut combined = rules.into_iter().collect::<Vec<_>>();
    combined.append(&mut self.rules);
    self.rules = combined;
    self
  }

  /// Adds a rule that is tried after every existing one
  pub fn push(&mut self, rule: Rule) {
    self.rules.push(rule);
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Runs `token` through the first rule whose pattern matches it. Later rules are never tried.
  pub fn apply(&self, token: &str) -> RuleOutcome<'_> {
    let Some((rule, found)) = self
      .rules
      .iter()
      .find_map(|rule| rule.try_match(token).map(|found| (rule, found)))
    else {
      return RuleOutcome::Unmatched;
    };

    match (rule.handler)(&found) {
      Some(declarations) => RuleOutcome::Matched {
        rule: rule.name(),
        declarations,
      },
      None => {
        tracing::debug!(rule = rule.name(), token, "Rule handler rejected a matching token");
        RuleOutcome::Rejected { rule: rule.name() }
      }
    }
  }
}
