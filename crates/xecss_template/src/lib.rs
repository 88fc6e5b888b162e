//! Template syntax tree consumed by the xecss attribute collector.
//!
//! The collector never cares how a tree was produced. Hosts that already run a template
//! compiler can hand over their own [`TemplateNode`] trees through the [`TemplateParser`]
//! trait; [`MarkupParser`] is the built-in implementation for single-file-component style
//! markup.
use std::sync::Arc;

pub use self::ast::*;
pub use self::error::*;
pub use self::parser::MarkupParser;
pub use self::region::extract_template_region;

mod ast;
mod error;
mod parser;
mod region;
mod structure;

/// Converts the text of one template region into a tree
#[mockall::automock]
pub trait TemplateParser: Send + Sync {
  fn parse(&self, source: &str) -> Result<Vec<TemplateNode>, TemplateParseError>;
}

pub type TemplateParserRef = Arc<dyn TemplateParser>;
