/// A node of a parsed template.
///
/// Conditional chains and loops are represented structurally, the same way a template compiler
/// does: an element carrying `v-if` ends up as the only child of an [`IfBranchNode`], and an
/// element carrying `v-for` as the only child of a [`ForNode`].
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateNode {
  Element(ElementNode),
  Text(String),
  Comment(String),
  Interpolation(String),
  If(IfNode),
  For(ForNode),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementNode {
  pub tag: String,
  pub props: Vec<Prop>,
  pub children: Vec<TemplateNode>,
}

impl ElementNode {
  pub fn new(tag: impl Into<String>) -> Self {
    ElementNode {
      tag: tag.into(),
      ..Default::default()
    }
  }

  pub fn with_prop(mut self, prop: Prop) -> Self {
    self.props.push(prop);
    self
  }

  pub fn with_child(mut self, child: TemplateNode) -> Self {
    self.children.push(child);
    self
  }

  /// Removes the first directive with the given name and returns it
  pub(crate) fn take_directive(&mut self, name: &str) -> Option<DirectiveProp> {
    let index = self
      .props
      .iter()
      .position(|prop| matches!(prop, Prop::Directive(directive) if directive.name == name))?;

    match self.props.remove(index) {
      Prop::Directive(directive) => Some(directive),
      Prop::Attribute(_) => None,
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IfNode {
  pub branches: Vec<IfBranchNode>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IfBranchNode {
  /// `None` for a trailing `v-else` branch
  pub condition: Option<String>,
  pub children: Vec<TemplateNode>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForNode {
  pub source: String,
  pub children: Vec<TemplateNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Prop {
  Attribute(AttributeProp),
  Directive(DirectiveProp),
}

/// A static attribute, e.g. `xe-m="10"` or a bare `xe-flex`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeProp {
  pub name: String,
  pub value: Option<String>,
}

/// A directive such as `v-bind:xe-m="cond ? '10' : '20'"` or its `:xe-m` shorthand
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectiveProp {
  /// Directive name without the `v-` prefix (`bind`, `on`, `if`, ...)
  pub name: String,
  pub arg: Option<String>,
  pub modifiers: Vec<String>,
  pub expression: Option<String>,
}

impl Prop {
  pub fn attribute(name: impl Into<String>, value: Option<&str>) -> Self {
    Prop::Attribute(AttributeProp {
      name: name.into(),
      value: value.map(String::from),
    })
  }

  pub fn bind(arg: impl Into<String>, expression: impl Into<String>) -> Self {
    Prop::Directive(DirectiveProp {
      name: String::from("bind"),
      arg: Some(arg.into()),
      modifiers: Vec::new(),
      expression: Some(expression.into()),
    })
  }

  /// Classifies a raw attribute as written in markup into a static attribute or a directive.
  ///
  /// Supports the `v-name:arg.modifier` long form and the `:`, `@` and `#` shorthands.
  pub fn from_raw(raw_name: &str, value: Option<&str>) -> Self {
    let (name, rest) = if let Some(rest) = raw_name.strip_prefix("v-") {
      let end = rest.find([':', '.']).unwrap_or(rest.len());
      (&rest[..end], &rest[end..])
    } else if let Some(rest) = raw_name.strip_prefix(':') {
      ("bind", rest)
    } else if let Some(rest) = raw_name.strip_prefix('@') {
      ("on", rest)
    } else if let Some(rest) = raw_name.strip_prefix('#') {
      ("slot", rest)
    } else {
      return Prop::attribute(raw_name, value);
    };

    // The shorthands carry the argument directly, the long form separates it with ':'
    let rest = if raw_name.starts_with("v-") {
      rest.strip_prefix(':').map_or(rest, |arg| arg)
    } else {
      rest
    };

    let mut segments = rest.split('.');
    let arg = segments
      .next()
      .filter(|arg| !arg.is_empty() && !rest.starts_with('.'))
      .map(String::from);
    let modifiers = rest
      .split('.')
      .skip(if arg.is_some() { 1 } else { 0 })
      .filter(|modifier| !modifier.is_empty())
      .map(String::from)
      .collect();

    Prop::Directive(DirectiveProp {
      name: name.to_string(),
      arg,
      modifiers,
      expression: value.map(String::from),
    })
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn static_attributes_stay_attributes() {
    assert_eq!(
      Prop::from_raw("hover:xe-m-10", None),
      Prop::attribute("hover:xe-m-10", None)
    );
    assert_eq!(
      Prop::from_raw("xe:10", Some("m p")),
      Prop::attribute("xe:10", Some("m p"))
    );
  }

  #[test]
  fn bind_shorthand_keeps_colons_in_the_argument() {
    assert_eq!(
      Prop::from_raw(":hover:xe-bg", Some("on ? 'red' : 'blue'")),
      Prop::bind("hover:xe-bg", "on ? 'red' : 'blue'")
    );
  }

  #[test]
  fn long_form_directives_with_modifiers() {
    assert_eq!(
      Prop::from_raw("v-bind:xe-m.prop", Some("x")),
      Prop::Directive(DirectiveProp {
        name: "bind".into(),
        arg: Some("xe-m".into()),
        modifiers: vec!["prop".into()],
        expression: Some("x".into()),
      })
    );
    assert_eq!(
      Prop::from_raw("v-if", Some("visible")),
      Prop::Directive(DirectiveProp {
        name: "if".into(),
        arg: None,
        modifiers: vec![],
        expression: Some("visible".into()),
      })
    );
  }

  #[test]
  fn event_and_slot_shorthands() {
    assert_eq!(
      Prop::from_raw("@click.stop", Some("go")),
      Prop::Directive(DirectiveProp {
        name: "on".into(),
        arg: Some("click".into()),
        modifiers: vec!["stop".into()],
        expression: Some("go".into()),
      })
    );
    assert_eq!(
      Prop::from_raw("#header", None),
      Prop::Directive(DirectiveProp {
        name: "slot".into(),
        arg: Some("header".into()),
        modifiers: vec![],
        expression: None,
      })
    );
  }
}
