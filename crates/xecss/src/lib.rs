//! On-demand utility CSS for component templates.
//!
//! Attributes such as `xe-m="10"`, `xe="flex jc-center"` or `hover:xe-bg-primary` are collected
//! from templates as the host build compiles them, and only the rules actually used are
//! generated:
//!
//! ```no_run
//! # async fn build() -> anyhow::Result<()> {
//! let engine = xecss::Engine::new(xecss::XeCssOptions::default())?;
//! engine.scan(r#"<template><div xe-m="10"></div></template>"#).await?;
//! assert_eq!(engine.render(false).await, "[xe-m=\"10\"] { margin:10px!important; } ");
//! # Ok(())
//! # }
//! ```
pub use self::cache::*;
pub use self::classifier::TagClassifier;
pub use self::collector::*;
pub use self::config::*;
pub use self::diagnostic::*;
pub use self::engine::*;
pub use self::error::*;
pub use self::generator::*;
pub use self::modifier_tag::ModifierTag;
pub use self::rules::*;
pub use self::scanner::*;
pub use self::source::*;

mod cache;
mod classifier;
mod collector;
pub mod color;
mod config;
mod diagnostic;
mod engine;
mod error;
mod generator;
mod modifier_tag;
mod rules;
mod scanner;
mod source;
pub mod units;
