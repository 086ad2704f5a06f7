//! Test case identifier rules.
//!
//! Identifiers are short tokens made of digits and `#`. Two prefix forms exist
//! and may not be mixed: numeric ids (`12`, `305`) and hash ids (`#`, `##`).
//! A hash id may not continue with a digit right after its leading `#`, and a
//! numeric id may not contain `#` anywhere.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Longest identifier accepted, in characters.
pub const MAX_TEST_CASE_ID_LEN: usize = 5;

/// Identifier used when a suggestion input holds no usable characters.
pub const FALLBACK_TEST_CASE_ID: &str = "1";

static ID_CHARSET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9#]+$").expect("id charset regex should compile"));
static HASH_THEN_DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9]").expect("hash prefix regex should compile"));
static DIGIT_WITH_HASH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9].*#").expect("numeric prefix regex should compile"));

/// Reasons a candidate identifier is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestCaseIdError {
    #[error("test case id cannot be blank")]
    Blank,

    #[error("test case id '{id}' is longer than {max} characters", max = MAX_TEST_CASE_ID_LEN)]
    TooLong { id: String },

    #[error("test case id '{id}' may only contain digits and '#'")]
    InvalidCharacters { id: String },

    #[error("test case id '{id}' mixes the numeric and '#' forms")]
    MixedForm { id: String },

    #[error("test case id '{id}' is already used by another test case")]
    Duplicate { id: String },
}

/// Check the shape of an identifier without looking at other rows.
pub fn check_test_case_id_shape(candidate: &str) -> Result<(), TestCaseIdError> {
    if candidate.trim().is_empty() {
        return Err(TestCaseIdError::Blank);
    }
    if candidate.chars().count() > MAX_TEST_CASE_ID_LEN {
        return Err(TestCaseIdError::TooLong { id: candidate.to_string() });
    }
    if !ID_CHARSET_REGEX.is_match(candidate) {
        return Err(TestCaseIdError::InvalidCharacters { id: candidate.to_string() });
    }
    if HASH_THEN_DIGIT_REGEX.is_match(candidate) || DIGIT_WITH_HASH_REGEX.is_match(candidate) {
        return Err(TestCaseIdError::MixedForm { id: candidate.to_string() });
    }
    Ok(())
}

/// Validate a candidate identifier against the shape rules and the ids already in use.
///
/// Re-committing the value a row already holds is always accepted, so
/// `current_value` is exempt from the duplicate check.
pub fn check_test_case_id<'a, I>(candidate: &str, existing_ids: I, current_value: &str) -> Result<(), TestCaseIdError>
where
    I: IntoIterator<Item = &'a str>,
{
    check_test_case_id_shape(candidate)?;
    if candidate == current_value.trim() {
        return Ok(());
    }
    if existing_ids.into_iter().any(|existing| existing == candidate) {
        return Err(TestCaseIdError::Duplicate { id: candidate.to_string() });
    }
    Ok(())
}

/// Boolean form of [`check_test_case_id`], used for keystroke filtering.
pub fn validate_test_case_id<'a, I>(candidate: &str, existing_ids: I, current_value: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    check_test_case_id(candidate, existing_ids, current_value).is_ok()
}

/// Suggest an identifier close to `input` that no existing row uses.
///
/// Characters outside `[0-9#]` are dropped, then numeric suffixes `1`, `2`, ...
/// are appended until the result is free. The result never exceeds
/// [`MAX_TEST_CASE_ID_LEN`]; the base is shortened to make room for the suffix.
/// The suggestion is advisory and may itself violate the prefix-form rule.
pub fn suggest_unique_test_case_id(input: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut base: String = input.chars().filter(|c| c.is_ascii_digit() || *c == '#').collect();
    if base.is_empty() {
        base = FALLBACK_TEST_CASE_ID.to_string();
    }
    let base = truncate_chars(&base, MAX_TEST_CASE_ID_LEN);
    if !is_taken(&base) {
        return base;
    }

    let mut suffix: u32 = 1;
    loop {
        let suffix_text = suffix.to_string();
        if suffix_text.len() > MAX_TEST_CASE_ID_LEN {
            // every five-character id is taken; hand back the base unchanged
            return base;
        }
        let room = MAX_TEST_CASE_ID_LEN - suffix_text.len();
        let candidate = format!("{}{}", truncate_chars(&base, room), suffix_text);
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
