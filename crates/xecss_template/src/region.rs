use std::sync::LazyLock;

use regex::Regex;

static TEMPLATE_REGION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)<template(?:\s[^>]*)?>.+</template>").expect("template region regex should compile")
});

/// Returns the template region of a single-file component source.
///
/// The region spans from the first `<template>` opening tag to the last `</template>` closing
/// tag, so nested `<template>` elements stay inside it.
pub fn extract_template_region(source: &str) -> Option<&str> {
  TEMPLATE_REGION.find(source).map(|region| region.as_str())
}
