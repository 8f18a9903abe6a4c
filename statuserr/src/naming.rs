//! Title normalization for error variant identifiers.
//!
//! Every catalog title is reduced to three identifiers that stay stable for
//! the life of the variant:
//!
//! | Identifier  | Shape          | Example (`"Not Found"`) |
//! |-------------|----------------|-------------------------|
//! | `type_name` | PascalCase     | `NotFound`              |
//! | `alias`     | lowerCamelCase | `notFound`              |
//! | `code`      | UPPER_SNAKE    | `NOT_FOUND`             |
//!
//! Normalization first simplifies the title: a leading indefinite article
//! (`"A "` / `"An "`, case-insensitive) and all apostrophes are removed, and
//! hyphens become spaces. `"I'm a Teapot"` therefore yields `ImATeapot` /
//! `IM_A_TEAPOT`, and `"Retry-With"` would normalize the same as
//! `"Retry With"`.
//!
//! All transforms are pure and total over non-empty titles; the catalog
//! guarantees titles are non-empty.

/// The three identifiers derived from a single catalog title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifiers {
    /// PascalCase type name (e.g. `NotFound`).
    pub type_name: String,
    /// lowerCamelCase export alias (e.g. `notFound`).
    pub alias: String,
    /// UPPER_SNAKE machine code (e.g. `NOT_FOUND`).
    pub code: String,
}

/// Derive the identifier triple for a catalog title.
///
/// Deterministic: the same title always yields the same identifiers.
#[must_use]
pub fn normalize(title: &str) -> Identifiers {
    let simple = simplify(title);
    let type_name = pascal_case(&simple);
    let alias = lower_first(&type_name);
    let code = upper_underscore(&simple);
    Identifiers {
        type_name,
        alias,
        code,
    }
}

/// Strip a leading article and apostrophes, collapse hyphens to spaces.
fn simplify(title: &str) -> String {
    strip_article(title).replace('\'', "").replace('-', " ")
}

fn strip_article(title: &str) -> &str {
    for prefix in ["an ", "a "] {
        if let Some(head) = title.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return &title[prefix.len()..];
            }
        }
    }
    title
}

fn pascal_case(simple: &str) -> String {
    simple.split_whitespace().map(title_case_word).collect()
}

/// Uppercase the first character, lowercase the remainder. Interior case
/// from the source title must not survive past this point.
fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_underscore(simple: &str) -> String {
    simple
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_plain_title() {
        let ids = normalize("Not Found");
        assert_eq!(ids.type_name, "NotFound");
        assert_eq!(ids.alias, "notFound");
        assert_eq!(ids.code, "NOT_FOUND");
    }

    #[test]
    fn test_normalize_strips_apostrophes_before_casing() {
        let ids = normalize("I'm a Teapot");
        assert_eq!(ids.type_name, "ImATeapot");
        assert_eq!(ids.alias, "imATeapot");
        assert_eq!(ids.code, "IM_A_TEAPOT");
    }

    #[test]
    fn test_normalize_strips_leading_article() {
        let ids = normalize("A Timeout Occured");
        assert_eq!(ids.type_name, "TimeoutOccured");
        assert_eq!(ids.code, "TIMEOUT_OCCURED");

        let ids = normalize("An Unexpected Error");
        assert_eq!(ids.type_name, "UnexpectedError");
        assert_eq!(ids.code, "UNEXPECTED_ERROR");
    }

    #[test]
    fn test_article_must_be_a_whole_token() {
        // "Authentication" starts with "A" but is not an article.
        let ids = normalize("Authentication Timeout");
        assert_eq!(ids.type_name, "AuthenticationTimeout");
        assert_eq!(ids.code, "AUTHENTICATION_TIMEOUT");
    }

    #[test]
    fn test_normalize_collapses_hyphens() {
        let ids = normalize("Retry-With");
        assert_eq!(ids.type_name, "RetryWith");
        assert_eq!(ids.alias, "retryWith");
        assert_eq!(ids.code, "RETRY_WITH");
    }

    #[test]
    fn test_interior_case_does_not_leak() {
        let ids = normalize("HTTP To HTTPS");
        assert_eq!(ids.type_name, "HttpToHttps");
        assert_eq!(ids.alias, "httpToHttps");
        assert_eq!(ids.code, "HTTP_TO_HTTPS");

        let ids = normalize("nOT fOUND");
        assert_eq!(ids.type_name, "NotFound");
        assert_eq!(ids.code, "NOT_FOUND");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let ids = normalize("Not   Found");
        assert_eq!(ids.type_name, "NotFound");
        assert_eq!(ids.code, "NOT_FOUND");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_deterministic_and_identifier_safe(
            title in "[A-Za-z][A-Za-z '-]{0,40}",
        ) {
            let first = normalize(&title);
            let second = normalize(&title);
            prop_assert_eq!(&first, &second);

            prop_assert!(!first.type_name.contains(' '));
            prop_assert!(!first.type_name.contains('\''));
            prop_assert!(!first.code.contains(' '));
            prop_assert!(!first.code.contains('\''));
            prop_assert_eq!(first.code.to_uppercase(), first.code.clone());
            prop_assert_eq!(lower_first(&first.type_name), first.alias);
        }
    }
}
