/// Turns a numeric token into a CSS length: percentages pass through, bare numbers become pixels.
///
/// ```
/// assert_eq!(xecss::units::length("10"), "10px");
/// assert_eq!(xecss::units::length("-4"), "-4px");
/// assert_eq!(xecss::units::length("50%"), "50%");
/// ```
pub fn length(token: &str) -> String {
  if is_percentage(token) {
    token.to_string()
  } else {
    format!("{token}px")
  }
}

fn is_percentage(token: &str) -> bool {
  let digits = token.strip_prefix('-').unwrap_or(token);
  let Some(digits) = digits.strip_suffix('%') else {
    return false;
  };
  !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_percentages_pass_through() {
    assert_eq!(length("-25%"), "-25%");
  }

  #[test]
  fn zero_is_still_a_pixel_value() {
    assert_eq!(length("0"), "0px");
  }
}
