use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::ModifierTag;
use crate::TagClassifier;

/// One canonical `attribute=value` declaration and every facet observed for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
  pub key: String,
  pub tag: ModifierTag,
}

impl Entry {
  pub fn new(attribute: &str, value: &str, tag: ModifierTag) -> Self {
    Entry {
      key: entry_key(attribute, value),
      tag,
    }
  }

  /// Splits the key back into attribute and value.
  ///
  /// Attribute names cannot contain `=`, so the first one separates the two.
  pub fn split(&self) -> (&str, &str) {
    self.key.split_once('=').unwrap_or((self.key.as_str(), ""))
  }
}

fn entry_key(attribute: &str, value: &str) -> String {
  format!("{attribute}={value}")
}

/// Persisted form of the collector: `[[key, tag bits], ...]` in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub Vec<(String, ModifierTag)>);

impl Snapshot {
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl FromIterator<(String, ModifierTag)> for Snapshot {
  fn from_iter<T: IntoIterator<Item = (String, ModifierTag)>>(iter: T) -> Self {
    Snapshot(iter.into_iter().collect())
  }
}

/// Accumulates canonical entries across scans.
///
/// The entry set only ever grows and tags only ever gain facets. `needs_patch` starts out set
/// and is raised whenever an entry is added or its stored tag gains a facet; only the consumer
/// regenerating output clears it.
#[derive(Debug)]
pub struct EntryCollector {
  classifier: TagClassifier,
  entries: IndexMap<String, ModifierTag>,
  needs_patch: bool,
}

impl EntryCollector {
  pub fn new(classifier: TagClassifier) -> Self {
    EntryCollector {
      classifier,
      entries: IndexMap::new(),
      needs_patch: true,
    }
  }

  /// Records one attribute occurrence and returns how many new entries it introduced.
  ///
  /// A `MULTIPLY` value is expanded into one entry per space separated token, each with its own
  /// `VALUE_PSEUDO` facet.
  pub fn collect(&mut self, attribute: &str, value: &str, tag: ModifierTag) -> usize {
    if tag.contains(ModifierTag::MULTIPLY) {
      let mut added = 0;
      for token in value.split(' ').filter(|token| !token.is_empty()) {
        let token_tag = tag | self.classifier.classify_value(token);
        if self.upsert(entry_key(attribute, token), token_tag) {
          added += 1;
        }
      }
      added
    } else {
      let tag = tag | self.classifier.classify_value(value);
      usize::from(self.upsert(entry_key(attribute, value), tag))
    }
  }

  fn upsert(&mut self, key: String, tag: ModifierTag) -> bool {
    match self.entries.get_mut(&key) {
      Some(stored) => {
        let merged = *stored | tag;
        if merged != *stored {
          self.needs_patch = true;
          *stored = merged;
        }
        false
      }
      None => {
        tracing::trace!(key = %key, bits = tag.bits(), "New entry");
        self.entries.insert(key, tag);
        self.needs_patch = true;
        true
      }
    }
  }

  /// Restores previously persisted entries without touching `needs_patch`
  pub fn load_snapshot(&mut self, snapshot: Snapshot) {
    for (key, tag) in snapshot.0 {
      *self.entries.entry(key).or_default() |= tag;
    }
  }

  pub fn export_snapshot(&self) -> Snapshot {
    self
      .entries
      .iter()
      .map(|(key, tag)| (key.clone(), *tag))
      .collect()
  }

  pub fn entries(&self) -> Vec<Entry> {
    self
      .entries
      .iter()
      .map(|(key, tag)| Entry {
        key: key.clone(),
        tag: *tag,
      })
      .collect()
  }

  pub fn get(&self, attribute: &str, value: &str) -> Option<ModifierTag> {
    self.entries.get(&entry_key(attribute, value)).copied()
  }

  pub fn needs_patch(&self) -> bool {
    self.needs_patch
  }

  pub fn mark_patched(&mut self) {
    self.needs_patch = false;
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
