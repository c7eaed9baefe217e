//! Route path and prefix-rewrite validation
//!
//! Envoy normalizes request paths on the wire, but it cannot retroactively
//! reject a route that was *configured* with traversal or encoded-separator
//! segments. These checks run before translation output is accepted.

use std::fmt;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// RFC 3986 "pchar" (unreserved / pct-encoded / sub-delims / ":" / "@") plus "/"
pub const VALID_PATH_PATTERN: &str =
    r"^(?:([A-Za-z0-9/:@._~!$&'()*+,:=;-]*|[%][0-9a-fA-F]{2}))*$";

/// Sequences a route path must not contain, checked in order
pub const INVALID_PATH_SEQUENCES: [&str; 6] = ["//", "/./", "/../", "%2f", "%2F", "#"];

/// Suffixes a route path must not end with, checked in order
pub const INVALID_PATH_SUFFIXES: [&str; 2] = ["/..", "/."];

static VALID_PATH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(VALID_PATH_PATTERN).expect("invalid route path regex"));

/// A '%' not followed by two hex digits
static INVALID_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:[^0-9A-Fa-f]|[0-9A-Fa-f](?:[^0-9A-Fa-f]|$)|$)")
        .expect("invalid URL escape regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("must only contain valid characters matching pattern {pattern}")]
    InvalidPattern { pattern: &'static str },

    #[error("path [{path}] cannot contain [{sequence}]")]
    InvalidSequence { path: String, sequence: &'static str },

    #[error("path [{path}] cannot end with [{suffix}]")]
    InvalidSuffix { path: String, suffix: &'static str },

    #[error("malformed url {input:?}: {reason}")]
    MalformedUrl { input: String, reason: String },
}

/// Validate a route match path.
///
/// The empty path is valid. Checks run character class first, then forbidden
/// sequences, then forbidden suffixes; the first failure is returned.
pub fn validate_route_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Ok(());
    }
    if !VALID_PATH_REGEX.is_match(path) {
        return Err(PathError::InvalidPattern {
            pattern: VALID_PATH_PATTERN,
        });
    }
    if let Some(sequence) = INVALID_PATH_SEQUENCES
        .iter()
        .copied()
        .find(|seq| path.contains(seq))
    {
        return Err(PathError::InvalidSequence {
            path: path.to_string(),
            sequence,
        });
    }
    if let Some(suffix) = INVALID_PATH_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| path.ends_with(suffix))
    {
        return Err(PathError::InvalidSuffix {
            path: path.to_string(),
            suffix,
        });
    }
    Ok(())
}

/// Validate a prefix rewrite.
///
/// The rewrite is parsed as a URL (absolute or relative reference). Syntax
/// errors are returned as-is; otherwise only the decoded path component is
/// checked with [`validate_route_path`]. Query and fragment are ignored.
pub fn validate_prefix_rewrite(rewrite: &str) -> Result<(), PathError> {
    let path = url_path(rewrite)?;
    validate_route_path(&path)
}

/// Extract the percent-decoded path component of a URL reference.
///
/// `url::Url` removes dot segments while parsing, which would hide exactly the
/// traversal we want to reject, so it is only used to check syntax and the raw
/// path is sliced out of the input.
fn url_path(input: &str) -> Result<String, PathError> {
    if input.starts_with(':') {
        return Err(malformed(input, "missing protocol scheme"));
    }

    let without_fragment = input.split_once('#').map_or(input, |(head, _)| head);
    let without_query = without_fragment
        .split_once('?')
        .map_or(without_fragment, |(head, _)| head);

    let raw_path = match split_scheme(without_query) {
        Some((_, rest)) => {
            Url::parse(input).map_err(|e| malformed(input, e))?;
            if rest.starts_with('/') {
                strip_authority(rest)
            } else {
                // opaque form, e.g. "mailto:user@example.com", has no path
                ""
            }
        }
        None => {
            let base = Url::parse("http://localhost/").map_err(|e| malformed(input, e))?;
            base.join(input).map_err(|e| malformed(input, e))?;
            // network-path reference, e.g. "//host/a"
            strip_authority(without_query)
        }
    };

    if INVALID_ESCAPE_REGEX.is_match(raw_path) {
        return Err(malformed(input, "invalid URL escape"));
    }
    percent_decode_str(raw_path)
        .decode_utf8()
        .map(|path| path.into_owned())
        .map_err(|e| malformed(input, e))
}

/// Drop a leading `//authority`, leaving the path (possibly empty)
fn strip_authority(hier_part: &str) -> &str {
    match hier_part.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map_or("", |idx| &authority_and_path[idx..]),
        None => hier_part,
    }
}

fn malformed(input: &str, reason: impl fmt::Display) -> PathError {
    PathError::MalformedUrl {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Split a leading RFC 3986 scheme (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`)
fn split_scheme(input: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = input.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some((scheme, rest))
    } else {
        None
    }
}

/// A validation problem attributed to a named route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteValidationError {
    pub route: String,
    pub message: String,
}

impl fmt::Display for RouteValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route {}: {}", self.route, self.message)
    }
}

/// Validate `path` and append a formatted error for `route` instead of returning
pub fn validate_path(path: &str, route: &str, errors: &mut Vec<RouteValidationError>) {
    if let Err(err) = validate_route_path(path) {
        errors.push(RouteValidationError {
            route: route.to_string(),
            message: format!("the path is invalid: {path}: {err}"),
        });
    }
}

/// Validate `rewrite` and append a formatted error for `route` instead of returning
pub fn validate_rewrite(rewrite: &str, route: &str, errors: &mut Vec<RouteValidationError>) {
    if let Err(err) = validate_prefix_rewrite(rewrite) {
        errors.push(RouteValidationError {
            route: route.to_string(),
            message: format!("the rewrite is invalid: {rewrite}: {err}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("/foo/bar")]
    #[case("/api/v1/items;matrix=1")]
    #[case("/~user/file.txt")]
    #[case("/caf%C3%A9")]
    #[case("/a:b@c")]
    fn test_valid_route_paths(#[case] path: &str) {
        assert_eq!(validate_route_path(path), Ok(()));
    }

    #[rstest]
    #[case("/foo/../bar", "/../")]
    #[case("/foo//bar", "//")]
    #[case("/foo/./bar", "/./")]
    #[case("/foo%2fbar", "%2f")]
    #[case("/foo%2Fbar", "%2F")]
    fn test_forbidden_sequences(#[case] path: &str, #[case] sequence: &str) {
        let err = validate_route_path(path).unwrap_err();
        assert!(matches!(
            &err,
            PathError::InvalidSequence { path: p, sequence: s } if p == path && *s == sequence
        ));
        assert!(err.to_string().contains(sequence));
    }

    #[rstest]
    #[case("/foo/..", "/..")]
    #[case("/foo/.", "/.")]
    fn test_forbidden_suffixes(#[case] path: &str, #[case] suffix: &str) {
        let err = validate_route_path(path).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("path [{path}] cannot end with [{suffix}]")
        );
    }

    #[rstest]
    #[case("/foo bar")]
    #[case("/foo\"bar")]
    #[case("/foo<bar>")]
    #[case("/100%")]
    #[case("/foo%zz")]
    fn test_invalid_characters(#[case] path: &str) {
        assert_eq!(
            validate_route_path(path),
            Err(PathError::InvalidPattern {
                pattern: VALID_PATH_PATTERN
            })
        );
    }

    #[test]
    fn test_fragment_is_rejected_by_character_class_first() {
        // '#' is outside the pchar set, so the pattern check wins over the
        // forbidden-sequence check
        assert!(matches!(
            validate_route_path("/foo#bar"),
            Err(PathError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_sequence_check_runs_before_suffix_check() {
        let err = validate_route_path("/a//b/..").unwrap_err();
        assert!(matches!(err, PathError::InvalidSequence { sequence: "//", .. }));
    }

    #[rstest]
    #[case("/just/a/path")]
    #[case("/")]
    #[case("")]
    #[case("http://host/a/b")]
    #[case("https://host:8443/prefix?x=/../#/./")]
    #[case("/prefix?query=/../")]
    #[case("//host/a")]
    #[case("//host:8080/a")]
    #[case("//host")]
    fn test_valid_prefix_rewrites(#[case] rewrite: &str) {
        assert_eq!(validate_prefix_rewrite(rewrite), Ok(()));
    }

    #[rstest]
    #[case("http://host/a/../b")]
    #[case("/a/./b")]
    #[case("/a/%2e%2e/b")]
    #[case("/a/..")]
    fn test_invalid_prefix_rewrites(#[case] rewrite: &str) {
        assert!(validate_prefix_rewrite(rewrite).is_err());
    }

    #[rstest]
    #[case("//host/a/../b", "/../")]
    #[case("//host:8080/a//b", "//")]
    #[case("http://host/a/%2e/b", "/./")]
    fn test_network_path_rewrites_check_the_path_only(
        #[case] rewrite: &str,
        #[case] sequence: &str,
    ) {
        assert!(matches!(
            validate_prefix_rewrite(rewrite),
            Err(PathError::InvalidSequence { sequence: s, .. }) if s == sequence
        ));
    }

    #[rstest]
    #[case(":no-scheme")]
    #[case("/bad%zzescape")]
    #[case("/a%+1")]
    #[case("/a%2")]
    #[case("/a%")]
    #[case("/a%ff")]
    #[case("http://[::1/path")]
    fn test_malformed_prefix_rewrites(#[case] rewrite: &str) {
        assert!(matches!(
            validate_prefix_rewrite(rewrite),
            Err(PathError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_aggregate_helpers_accumulate() {
        let mut errors = Vec::new();
        validate_path("/ok", "default.route", &mut errors);
        validate_path("/a/../b", "default.route", &mut errors);
        validate_rewrite("/fine", "default.route", &mut errors);
        validate_rewrite("/x/./y", "default.route", &mut errors);

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].message,
            "the path is invalid: /a/../b: path [/a/../b] cannot contain [/../]"
        );
        assert!(errors[1].message.starts_with("the rewrite is invalid: /x/./y: "));
        assert_eq!(errors[1].route, "default.route");
    }
}
