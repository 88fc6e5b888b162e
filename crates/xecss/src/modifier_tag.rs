use bitflags::bitflags;

bitflags! {
  /// Facets of one attribute declaration occurrence.
  ///
  /// The bit values are persisted in snapshot caches and must not change.
  #[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
  pub struct ModifierTag: u32 {
    /// The attribute carries the configured prefix, e.g. `xe-m`
    const COMMON = 1 << 1;
    /// The attribute starts with a pseudo-class, e.g. `hover:xe-m`
    const PSEUDO = 1 << 2;
    /// The value starts with a pseudo-class, e.g. `xe="hover:m-10"`
    const VALUE_PSEUDO = 1 << 3;
    /// The attribute has a trailing `:segment` that belongs to the value, e.g. `xe:10="m"`
    const APPEND = 1 << 4;
    /// The value is a space separated list, e.g. `xe="m-10 p-10"`
    const MULTIPLY = 1 << 5;
  }
}

impl Default for ModifierTag {
  fn default() -> Self {
    ModifierTag::empty()
  }
}

impl ModifierTag {
  /// Whether an attribute with this tag takes part in collection at all
  pub fn is_candidate(self) -> bool {
    self.intersects(ModifierTag::COMMON | ModifierTag::PSEUDO)
  }
}

impl serde::Serialize for ModifierTag {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    self.bits().serialize(serializer)
  }
}

impl<'de> serde::Deserialize<'de> for ModifierTag {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let bits = u32::deserialize(deserializer)?;
    Ok(ModifierTag::from_bits_truncate(bits))
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn serializes_as_bits() {
    let tag = ModifierTag::COMMON | ModifierTag::MULTIPLY;
    assert_eq!(serde_json::to_string(&tag).unwrap(), "34");
  }

  #[test]
  fn unknown_bits_are_dropped_on_load() {
    let tag: ModifierTag = serde_json::from_str("131").unwrap();
    assert_eq!(tag, ModifierTag::COMMON);
  }

  #[test]
  fn candidates_need_a_prefix_or_pseudo_facet() {
    assert!(ModifierTag::COMMON.is_candidate());
    assert!(ModifierTag::PSEUDO.is_candidate());
    assert!(!(ModifierTag::APPEND | ModifierTag::MULTIPLY).is_candidate());
  }
}
