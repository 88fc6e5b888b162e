//! Built-in utility vocabulary.
//!
//! Patterns are matched against the normalized token (`m-10`, `bg-primary-80/40`, ...), never
//! against raw attributes, so one rule covers every way of writing the same declaration.

use std::sync::LazyLock;

use super::Declarations;
use super::Rule;
use super::RuleMatch;
use crate::color::color_value;
use crate::color::percentage;
use crate::units::length;

type Handler = fn(&RuleMatch<'_>) -> Option<Declarations>;

static DEFAULT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
  let rules: [(&str, &str, Handler); 17] = [
    ("spacing", r"^([mp])([tblr]{0,4})-(-?[0-9]+%?)$", spacing),
    ("size", r"^(m|mi)?([wh])-([0-9]+%?)$", size),
    ("font-size", r"^fs-([0-9]+)$", font_size),
    ("display", r"^dp-([a-z]+)$", display),
    ("color", r"^(fc|bg)-([0-9a-z]+)-?([0-9]*)/?([0-9]*)$", color),
    ("visibility", r"^v-([a-z]+)$", |found| keyword("visibility", found)),
    ("text-align", r"^align-([lrc])$", text_align),
    ("flex", r"^flex-?(~|jc|ai|d|wrap|center|[0-9])?-?([a-z-]*)$", flex),
    ("overflow", r"^of-([a-z]+)$", |found| keyword("overflow", found)),
    ("position", r"^pos-([a-z]+)$", |found| keyword("position", found)),
    ("offset", r"^([lrtb])-(-?[0-9]+%?)$", offset),
    ("border", r"^bor-([wcsr])([ltrb]{0,4})-([a-z0-9]+)-?([0-9]+)?(?:/([0-9]+))?$", border),
    ("cursor", r"^cursor-([a-z]+)$", |found| keyword("cursor", found)),
    ("gap", r"^flex-gap-([0-9]+)-?([0-9]+)?$", gap),
    ("box-sizing", r"^border-box$", |_| Some(Declarations::single("box-sizing", "border-box"))),
    ("line-height", r"^lh-([0-9a-z]+)$", |found| keyword("line-height", found)),
    ("vertical-align", r"^valign-([a-z]+)$", |found| keyword("vertical-align", found)),
  ];

  rules
    .into_iter()
    .map(|(name, pattern, handler)| {
      Rule::new(name, pattern, handler).expect("built-in rule pattern should compile")
    })
    .collect()
});

/// The built-in rules in evaluation order
pub fn default_rules() -> &'static [Rule] {
  &DEFAULT_RULES
}

fn direction(letter: char) -> Option<&'static str> {
  match letter {
    'l' => Some("left"),
    'r' => Some("right"),
    't' => Some("top"),
    'b' => Some("bottom"),
    _ => None,
  }
}

/// Property for each direction letter, or the bare property when there are none
fn directional(
  property: &str,
  suffix: &str,
  directions: &str,
  value: &str,
) -> Option<Declarations> {
  if directions.is_empty() {
    return Some(Declarations::single(format!("{property}{suffix}"), value));
  }

  directions
    .chars()
    .map(|letter| {
      direction(letter).map(|side| (format!("{property}-{side}{suffix}"), value.to_string()))
    })
    .collect::<Option<Declarations>>()
}

fn keyword(property: &str, found: &RuleMatch<'_>) -> Option<Declarations> {
  Some(Declarations::single(property, found.group(1)))
}

fn spacing(found: &RuleMatch<'_>) -> Option<Declarations> {
  let property = match found.group(1) {
    "m" => "margin",
    "p" => "padding",
    _ => return None,
  };
  directional(property, "", found.group(2), &length(found.group(3)))
}

fn size(found: &RuleMatch<'_>) -> Option<Declarations> {
  let bound = match found.group(1) {
    "m" => "max-",
    "mi" => "min-",
    _ => "",
  };
  let dimension = match found.group(2) {
    "w" => "width",
    "h" => "height",
    _ => return None,
  };
  Some(Declarations::single(
    format!("{bound}{dimension}"),
    length(found.group(3)),
  ))
}

fn font_size(found: &RuleMatch<'_>) -> Option<Declarations> {
  Some(Declarations::single("font-size", format!("{}px", found.group(1))))
}

fn display(found: &RuleMatch<'_>) -> Option<Declarations> {
  let value = match found.group(1) {
    "ib" => "inline-block",
    "b" => "block",
    "flex" => "flex",
    "iflex" => "inline-flex",
    "i" => "inline",
    "none" => "none",
    other => other,
  };
  Some(Declarations::single("display", value))
}

fn color(found: &RuleMatch<'_>) -> Option<Declarations> {
  let property = match found.group(1) {
    "fc" => "color",
    "bg" => "background-color",
    _ => return None,
  };
  let value = color_value(
    found.group(2),
    percentage(found.group(3)),
    percentage(found.group(4)),
  );
  Some(Declarations::single(property, value))
}

fn text_align(found: &RuleMatch<'_>) -> Option<Declarations> {
  let value = match found.group(1) {
    "l" => "left",
    "r" => "right",
    "c" => "center",
    _ => return None,
  };
  Some(Declarations::single("text-align", value))
}

fn flex(found: &RuleMatch<'_>) -> Option<Declarations> {
  let kind = found.group(1);
  let value = found.group(2);

  let property = match kind {
    "" | "~" => return Some(Declarations::single("display", "flex")),
    "center" => {
      return Some(
        Declarations::single("display", "flex")
          .with("justify-content", "center")
          .with("align-items", "center"),
      )
    }
    digit if digit.bytes().all(|byte| byte.is_ascii_digit()) => {
      return Some(Declarations::single("flex", digit))
    }
    "ai" => "align-items",
    "jc" => "justify-content",
    "d" => "flex-direction",
    "wrap" => "flex-wrap",
    _ => return None,
  };

  // `flex-jc` alone names a property without a value
  if value.is_empty() {
    return Some(Declarations::new());
  }

  let value = match value {
    "start" => "flex-start",
    "end" => "flex-end",
    "around" => "space-around",
    "between" => "space-between",
    other => other,
  };
  Some(Declarations::single(property, value))
}

fn offset(found: &RuleMatch<'_>) -> Option<Declarations> {
  let side = found.group(1).chars().next().and_then(direction)?;
  Some(Declarations::single(side, length(found.group(2))))
}

fn border(found: &RuleMatch<'_>) -> Option<Declarations> {
  let raw = found.group(3);
  let (kind, value) = match found.group(1) {
    "w" => ("width", format!("{raw}px")),
    "r" => ("radius", format!("{raw}px")),
    "c" => (
      "color",
      color_value(raw, percentage(found.group(4)), percentage(found.group(5))),
    ),
    "s" => ("style", raw.to_string()),
    _ => return None,
  };
  directional("border", &format!("-{kind}"), found.group(2), &value)
}

fn gap(found: &RuleMatch<'_>) -> Option<Declarations> {
  let value = match found.group(2) {
    "" => format!("{}px", found.group(1)),
    column => format!("{}px {column}px", found.group(1)),
  };
  Some(Declarations::single("gap", value))
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use crate::rules::RuleTable;

  use super::*;

  fn declarations(token: &str) -> Vec<(String, String)> {
    RuleTable::with_defaults()
      .apply(token)
      .into_declarations()
      .iter()
      .map(|(property, value)| (property.to_string(), value.to_string()))
      .collect()
  }

  fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
      .iter()
      .map(|(property, value)| (property.to_string(), value.to_string()))
      .collect()
  }

  #[test]
  fn spacing_with_and_without_directions() {
    assert_eq!(declarations("m-10"), pairs(&[("margin", "10px")]));
    assert_eq!(declarations("p-50%"), pairs(&[("padding", "50%")]));
    assert_eq!(
      declarations("mtl--10"),
      pairs(&[("margin-top", "-10px"), ("margin-left", "-10px")])
    );
    assert_eq!(
      declarations("pbr-4"),
      pairs(&[("padding-bottom", "4px"), ("padding-right", "4px")])
    );
  }

  #[test]
  fn sizes_with_bounds() {
    assert_eq!(declarations("w-100"), pairs(&[("width", "100px")]));
    assert_eq!(declarations("mh-50%"), pairs(&[("max-height", "50%")]));
    assert_eq!(declarations("miw-20"), pairs(&[("min-width", "20px")]));
    assert!(declarations("w--20").is_empty());
  }

  #[test]
  fn display_abbreviations() {
    assert_eq!(declarations("dp-ib"), pairs(&[("display", "inline-block")]));
    assert_eq!(declarations("dp-iflex"), pairs(&[("display", "inline-flex")]));
    assert_eq!(declarations("dp-grid"), pairs(&[("display", "grid")]));
  }

  #[test]
  fn colors() {
    assert_eq!(
      declarations("bg-primary-80/40"),
      pairs(&[("background-color", "rgba(51,156,255,0.4)")])
    );
    assert_eq!(declarations("fc-red"), pairs(&[("color", "rgba(255,51,51,1)")]));
    assert_eq!(declarations("fc-inherit"), pairs(&[("color", "inherit")]));
    assert_eq!(declarations("bg-000000/50"), pairs(&[("background-color", "rgba(0,0,0,0.5)")]));
  }

  #[test]
  fn flex_family() {
    assert_eq!(declarations("flex"), pairs(&[("display", "flex")]));
    assert_eq!(declarations("flex-~"), pairs(&[("display", "flex")]));
    assert_eq!(declarations("flex-1"), pairs(&[("flex", "1")]));
    assert_eq!(declarations("flex-0"), pairs(&[("flex", "0")]));
    assert_eq!(
      declarations("flex-center"),
      pairs(&[
        ("display", "flex"),
        ("justify-content", "center"),
        ("align-items", "center"),
      ])
    );
    assert_eq!(
      declarations("flex-jc-between"),
      pairs(&[("justify-content", "space-between")])
    );
    assert_eq!(declarations("flex-ai-end"), pairs(&[("align-items", "flex-end")]));
    assert_eq!(declarations("flex-d-column"), pairs(&[("flex-direction", "column")]));
    assert!(declarations("flex-wrap").is_empty());
  }

  #[test]
  fn gap_is_not_claimed_by_the_flex_rule() {
    assert_eq!(declarations("flex-gap-8"), pairs(&[("gap", "8px")]));
    assert_eq!(declarations("flex-gap-8-4"), pairs(&[("gap", "8px 4px")]));
  }

  #[test]
  fn offsets_use_direction_names() {
    assert_eq!(declarations("l-4"), pairs(&[("left", "4px")]));
    assert_eq!(declarations("b--50%"), pairs(&[("bottom", "-50%")]));
  }

  #[test]
  fn borders() {
    assert_eq!(declarations("bor-w-1"), pairs(&[("border-width", "1px")]));
    assert_eq!(
      declarations("bor-rlr-4"),
      pairs(&[("border-left-radius", "4px"), ("border-right-radius", "4px")])
    );
    assert_eq!(declarations("bor-s-dashed"), pairs(&[("border-style", "dashed")]));
    assert_eq!(
      declarations("bor-ct-primary-80/40"),
      pairs(&[("border-top-color", "rgba(51,156,255,0.4)")])
    );
  }

  #[test]
  fn keyword_rules() {
    assert_eq!(declarations("v-hidden"), pairs(&[("visibility", "hidden")]));
    assert_eq!(declarations("align-c"), pairs(&[("text-align", "center")]));
    assert_eq!(declarations("of-auto"), pairs(&[("overflow", "auto")]));
    assert_eq!(declarations("pos-absolute"), pairs(&[("position", "absolute")]));
    assert_eq!(declarations("cursor-pointer"), pairs(&[("cursor", "pointer")]));
    assert_eq!(declarations("lh-20px"), pairs(&[("line-height", "20px")]));
    assert_eq!(declarations("valign-middle"), pairs(&[("vertical-align", "middle")]));
    assert_eq!(declarations("fs-14"), pairs(&[("font-size", "14px")]));
    assert_eq!(declarations("border-box"), pairs(&[("box-sizing", "border-box")]));
  }

  #[test]
  fn every_default_pattern_is_anchored() {
    for rule in default_rules() {
      assert!(rule.pattern().starts_with('^'), "{}", rule.name());
      assert!(rule.pattern().ends_with('$'), "{}", rule.name());
    }
  }
}
