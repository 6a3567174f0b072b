//! Maincode to short code conversion.
//!
//! An SA1 maincode is an 11-digit area code. Its short form keeps the
//! leading state digit and the trailing six digits:
//!
//! ```text
//! 1 2345 678901
//! ^      ^^^^^^   -> 1678901
//! ```
//!
//! Values are not validated. Anything shorter than seven characters still
//! converts, so first and last characters can overlap.

/// Number of trailing characters kept from the maincode.
pub const TAIL_LEN: usize = 6;

/// Length of a short code built from a well-formed maincode.
pub const SHORT_CODE_LEN: usize = TAIL_LEN + 1;

/// Convert a maincode to its short code.
///
/// Returns `None` for an empty value, which has no first character.
///
/// ```
/// use shorten_maincode::shorten;
///
/// assert_eq!(shorten("12345678901").as_deref(), Some("1678901"));
/// assert_eq!(shorten("123").as_deref(), Some("1123"));
/// assert_eq!(shorten(""), None);
/// ```
pub fn shorten(value: &str) -> Option<String> {
    let first = value.chars().next()?;

    let tail_start = value
        .char_indices()
        .rev()
        .nth(TAIL_LEN - 1)
        .map_or(0, |(idx, _)| idx);

    let mut short = String::with_capacity(first.len_utf8() + value.len() - tail_start);
    short.push(first);
    short.push_str(&value[tail_start..]);
    Some(short)
}
