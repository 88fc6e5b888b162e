use std::sync::LazyLock;

use regex::Regex;
use xecss_template::DirectiveProp;
use xecss_template::ElementNode;
use xecss_template::Prop;
use xecss_template::TemplateNode;

use crate::ModifierTag;
use crate::TagClassifier;

static TERNARY: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(.+)\s*\?\s*(['"].+['"])\s*:\s*(['"].+['"])"#)
    .expect("ternary regex should compile")
});

/// One attribute occurrence worth collecting
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
  pub attribute: String,
  pub value: String,
  pub tag: ModifierTag,
}

/// Walks template trees and surfaces every attribute the classifier recognizes
pub struct TemplateScanner<'a> {
  classifier: &'a TagClassifier,
}

impl<'a> TemplateScanner<'a> {
  pub fn new(classifier: &'a TagClassifier) -> Self {
    TemplateScanner { classifier }
  }

  pub fn scan(&self, nodes: &[TemplateNode]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    self.visit(nodes, &mut candidates);
    candidates
  }

  fn visit(&self, nodes: &[TemplateNode], candidates: &mut Vec<Candidate>) {
    for node in nodes {
      match node {
        // Icon markup carries its own attribute vocabulary
        TemplateNode::Element(element) if element.tag == "svg" => {}
        TemplateNode::Element(element) => self.visit_element(element, candidates),
        TemplateNode::If(chain) => {
          for branch in &chain.branches {
            self.visit(&branch.children, candidates);
          }
        }
        TemplateNode::For(node) => self.visit(&node.children, candidates),
        TemplateNode::Text(_) | TemplateNode::Comment(_) | TemplateNode::Interpolation(_) => {}
      }
    }
  }

  fn visit_element(&self, element: &ElementNode, candidates: &mut Vec<Candidate>) {
    let attributes = element.props.iter().filter_map(|prop| match prop {
      Prop::Attribute(attribute) => Some((
        attribute.name.as_str(),
        attribute.value.clone().unwrap_or_default(),
      )),
      Prop::Directive(_) => None,
    });
    let bindings = element.props.iter().filter_map(|prop| match prop {
      Prop::Directive(directive) => ternary_binding(directive),
      Prop::Attribute(_) => None,
    });

    // Ternary bindings are collected ahead of static attributes
    for (name, value) in bindings.chain(attributes) {
      let tag = self.classifier.classify_attribute(name);
      if !tag.is_candidate() {
        continue;
      }

      candidates.push(Candidate {
        attribute: name.to_string(),
        tag: tag | self.classifier.classify_occurrence(name, &value),
        value,
      });
    }

    self.visit(&element.children, candidates);
  }
}

/// `:attr="cond ? 'a' : 'b'"` yields `(attr, "a b")`, every other binding is out of grammar
fn ternary_binding(directive: &DirectiveProp) -> Option<(&str, String)> {
  if directive.name != "bind" {
    return None;
  }
  let name = directive.arg.as_deref()?;
  let expression = directive.expression.as_deref()?;
  let branches = TERNARY.captures(expression)?;

  let value = format!("{} {}", &branches[2], &branches[3]).replace(['\'', '"'], "");
  Some((name, value))
}
