//! Parser for single-file-component template markup.
//!
//! Not an HTML5 parser: templates must be well formed, and attribute names are kept exactly as
//! written (`hover:xe-m-10`, `xe:10`) where an HTML5 tokenizer would lowercase them.
//!
//! Entities are not decoded and raw-text elements (`<script>`, `<style>`) are not special cased,
//! neither appears inside component templates in practice.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::bytes::complete::take_until;
use nom::bytes::complete::take_while;
use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::character::complete::multispace0;
use nom::character::complete::multispace1;
use nom::character::complete::satisfy;
use nom::combinator::cut;
use nom::combinator::opt;
use nom::combinator::peek;
use nom::error::context;
use nom::error::ErrorKind;
use nom::error::ParseError;
use nom::error::VerboseError;
use nom::error::VerboseErrorKind;
use nom::multi::many0;
use nom::sequence::delimited;
use nom::sequence::preceded;
use nom::IResult;

use crate::structure::fold_structural_directives;
use crate::ElementNode;
use crate::Prop;
use crate::TemplateNode;
use crate::TemplateParseError;
use crate::TemplateParser;

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
  "track", "wbr",
];

/// Built-in [`TemplateParser`] for component template markup
#[derive(Clone, Debug, Default)]
pub struct MarkupParser;

impl TemplateParser for MarkupParser {
  #[tracing::instrument(level = "debug", skip_all)]
  fn parse(&self, source: &str) -> Result<Vec<TemplateNode>, TemplateParseError> {
    parse_markup(source)
  }
}

pub(crate) fn parse_markup(source: &str) -> Result<Vec<TemplateNode>, TemplateParseError> {
  match nodes(source) {
    Ok(("", nodes)) => Ok(fold_structural_directives(nodes)),
    Ok((rest, _)) => Err(TemplateParseError::UnexpectedClosingTag {
      offset: source.len() - rest.len(),
    }),
    Err(nom::Err::Error(error)) | Err(nom::Err::Failure(error)) => {
      Err(to_parse_error(source, error))
    }
    Err(nom::Err::Incomplete(_)) => Err(TemplateParseError::UnexpectedEof),
  }
}

fn to_parse_error(source: &str, error: VerboseError<&str>) -> TemplateParseError {
  let Some((input, _)) = error.errors.first() else {
    return TemplateParseError::UnexpectedEof;
  };

  if input.is_empty() {
    return TemplateParseError::UnexpectedEof;
  }

  let expected = error
    .errors
    .iter()
    .find_map(|(_, kind)| match kind {
      VerboseErrorKind::Context(context) => Some(context.to_string()),
      _ => None,
    })
    .unwrap_or_else(|| String::from("markup"));

  TemplateParseError::Malformed {
    offset: source.len() - input.len(),
    expected,
  }
}

fn is_tag_name_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn is_attribute_name_char(c: char) -> bool {
  !c.is_whitespace() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
}

fn is_unquoted_value_char(c: char) -> bool {
  !c.is_whitespace() && !matches!(c, '"' | '\'' | '>' | '=' | '<' | '`')
}

/// Children of an element (or the top level) up to the next closing tag or the end of input
fn nodes(mut input: &str) -> ParseResult<'_, Vec<TemplateNode>> {
  let mut children = Vec::new();

  loop {
    if input.is_empty() || input.starts_with("</") {
      return Ok((input, children));
    }

    let (rest, node) = alt((comment, element, interpolation, text))(input)?;
    input = rest;

    // Whitespace between tags carries nothing the collector could use
    if matches!(&node, TemplateNode::Text(text) if text.trim().is_empty()) {
      continue;
    }

    children.push(node);
  }
}

fn comment(input: &str) -> ParseResult<'_, TemplateNode> {
  let (input, _) = tag("<!--")(input)?;
  let (input, body) = cut(context("comment terminator", take_until("-->")))(input)?;
  let (input, _) = tag("-->")(input)?;
  Ok((input, TemplateNode::Comment(body.trim().to_string())))
}

fn interpolation(input: &str) -> ParseResult<'_, TemplateNode> {
  let (input, _) = tag("{{")(input)?;
  let (input, body) = cut(context("interpolation terminator", take_until("}}")))(input)?;
  let (input, _) = tag("}}")(input)?;
  Ok((input, TemplateNode::Interpolation(body.trim().to_string())))
}

/// Text runs until the next tag-looking `<` or an interpolation
fn text(input: &str) -> ParseResult<'_, TemplateNode> {
  let mut end = input.len();
  let mut chars = input.char_indices().peekable();
  while let Some((index, c)) = chars.next() {
    let next = chars.peek().map(|(_, next)| *next);
    let starts_markup = match (c, next) {
      ('<', Some(next)) => next.is_ascii_alphabetic() || next == '/' || next == '!',
      ('{', Some('{')) => true,
      _ => false,
    };
    if starts_markup {
      end = index;
      break;
    }
  }

  if end == 0 {
    return Err(nom::Err::Error(VerboseError::from_error_kind(
      input,
      ErrorKind::TakeUntil,
    )));
  }

  Ok((&input[end..], TemplateNode::Text(input[..end].to_string())))
}

fn element(input: &str) -> ParseResult<'_, TemplateNode> {
  let (input, _) = char('<')(input)?;
  let (input, _) = peek(satisfy(|c| c.is_ascii_alphabetic()))(input)?;
  let (input, tag_name) = take_while1(is_tag_name_char)(input)?;
  let (input, props) = many0(preceded(multispace1, attribute))(input)?;
  let (input, _) = multispace0(input)?;
  let (input, terminator) = cut(context("tag terminator", alt((tag("/>"), tag(">")))))(input)?;

  let mut element = ElementNode {
    tag: tag_name.to_string(),
    props,
    children: Vec::new(),
  };

  let is_void = VOID_ELEMENTS.contains(&tag_name.to_ascii_lowercase().as_str());
  if terminator == "/>" || is_void {
    return Ok((input, TemplateNode::Element(element)));
  }

  let (input, children) = nodes(input)?;
  let (input, _) = cut(context("closing tag", closing_tag(tag_name)))(input)?;
  element.children = children;

  Ok((input, TemplateNode::Element(element)))
}

fn closing_tag<'a>(tag_name: &'a str) -> impl FnMut(&'a str) -> ParseResult<'a, ()> {
  move |input: &'a str| {
    let (rest, _) = tag("</")(input)?;
    let (rest, name) = take_while1(is_tag_name_char)(rest)?;
    if name != tag_name {
      return Err(nom::Err::Error(VerboseError::from_error_kind(
        input,
        ErrorKind::Tag,
      )));
    }
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('>')(rest)?;
    Ok((rest, ()))
  }
}

fn attribute(input: &str) -> ParseResult<'_, Prop> {
  let (input, name) = take_while1(is_attribute_name_char)(input)?;
  let (input, value) = opt(preceded(
    delimited(multispace0, char('='), multispace0),
    cut(context("attribute value", attribute_value)),
  ))(input)?;

  Ok((input, Prop::from_raw(name, value)))
}

fn attribute_value(input: &str) -> ParseResult<'_, &str> {
  alt((
    delimited(char('"'), take_while(|c| c != '"'), char('"')),
    delimited(char('\''), take_while(|c| c != '\''), char('\'')),
    take_while1(is_unquoted_value_char),
  ))(input)
}
