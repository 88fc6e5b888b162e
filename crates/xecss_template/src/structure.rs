use std::mem;

use crate::ElementNode;
use crate::ForNode;
use crate::IfBranchNode;
use crate::IfNode;
use crate::TemplateNode;

enum Conditional {
  If(Option<String>),
  ElseIf(Option<String>),
  Else,
}

/// Folds `v-if` / `v-else-if` / `v-else` sibling chains into [`IfNode`]s and wraps `v-for`
/// elements into [`ForNode`]s, recursively.
///
/// `v-if` binds tighter than `v-for` when both sit on one element, so the loop ends up inside the
/// branch.
pub(crate) fn fold_structural_directives(nodes: Vec<TemplateNode>) -> Vec<TemplateNode> {
  let mut output: Vec<TemplateNode> = Vec::with_capacity(nodes.len());

  for node in nodes {
    let TemplateNode::Element(mut element) = node else {
      output.push(node);
      continue;
    };

    element.children = fold_structural_directives(mem::take(&mut element.children));
    let conditional = take_conditional(&mut element);
    let node = wrap_loop(element);

    match conditional {
      None => output.push(node),
      Some(Conditional::If(condition)) => output.push(TemplateNode::If(IfNode {
        branches: vec![branch(condition, node)],
      })),
      Some(Conditional::ElseIf(condition)) => attach_branch(&mut output, branch(condition, node)),
      Some(Conditional::Else) => attach_branch(&mut output, branch(None, node)),
    }
  }

  output
}

fn take_conditional(element: &mut ElementNode) -> Option<Conditional> {
  if let Some(directive) = element.take_directive("if") {
    return Some(Conditional::If(directive.expression));
  }
  if let Some(directive) = element.take_directive("else-if") {
    return Some(Conditional::ElseIf(directive.expression));
  }
  element
    .take_directive("else")
    .map(|_| Conditional::Else)
}

fn wrap_loop(mut element: ElementNode) -> TemplateNode {
  match element.take_directive("for") {
    Some(directive) => TemplateNode::For(ForNode {
      source: directive.expression.unwrap_or_default(),
      children: vec![TemplateNode::Element(element)],
    }),
    None => TemplateNode::Element(element),
  }
}

fn branch(condition: Option<String>, node: TemplateNode) -> IfBranchNode {
  IfBranchNode {
    condition,
    children: vec![node],
  }
}

/// Appends an else branch to the preceding `v-if` chain, skipping comments in between.
///
/// A dangling else branch becomes a chain of its own so its subtree is still visited.
fn attach_branch(output: &mut Vec<TemplateNode>, branch: IfBranchNode) {
  let previous = output
    .iter_mut()
    .rev()
    .find(|node| !matches!(node, TemplateNode::Comment(_)));

  match previous {
    Some(TemplateNode::If(chain)) => chain.branches.push(branch),
    _ => {
      tracing::debug!("v-else without a preceding v-if");
      output.push(TemplateNode::If(IfNode {
        branches: vec![branch],
      }));
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::Prop;

  #[test]
  fn if_wraps_the_loop_on_the_same_element() {
    let nodes = fold_structural_directives(vec![TemplateNode::Element(
      ElementNode::new("li")
        .with_prop(Prop::from_raw("v-for", Some("item in items")))
        .with_prop(Prop::from_raw("v-if", Some("show")))
        .with_prop(Prop::attribute("xe-m", Some("1"))),
    )]);

    assert_eq!(
      nodes,
      vec![TemplateNode::If(IfNode {
        branches: vec![IfBranchNode {
          condition: Some("show".into()),
          children: vec![TemplateNode::For(ForNode {
            source: "item in items".into(),
            children: vec![TemplateNode::Element(
              ElementNode::new("li").with_prop(Prop::attribute("xe-m", Some("1")))
            )],
          })],
        }],
      })]
    );
  }

  #[test]
  fn else_branches_skip_comments() {
    let nodes = fold_structural_directives(vec![
      TemplateNode::Element(ElementNode::new("a").with_prop(Prop::from_raw("v-if", Some("x")))),
      TemplateNode::Comment("between".into()),
      TemplateNode::Element(ElementNode::new("b").with_prop(Prop::from_raw("v-else", None))),
    ]);

    assert_eq!(
      nodes,
      vec![
        TemplateNode::If(IfNode {
          branches: vec![
            IfBranchNode {
              condition: Some("x".into()),
              children: vec![TemplateNode::Element(ElementNode::new("a"))],
            },
            IfBranchNode {
              condition: None,
              children: vec![TemplateNode::Element(ElementNode::new("b"))],
            },
          ],
        }),
        TemplateNode::Comment("between".into()),
      ]
    );
  }

  #[test]
  fn dangling_else_is_kept() {
    let nodes = fold_structural_directives(vec![TemplateNode::Element(
      ElementNode::new("b").with_prop(Prop::from_raw("v-else", None)),
    )]);

    assert_eq!(
      nodes,
      vec![TemplateNode::If(IfNode {
        branches: vec![IfBranchNode {
          condition: None,
          children: vec![TemplateNode::Element(ElementNode::new("b"))],
        }],
      })]
    );
  }
}
