//! Path pattern matching with `{param}` placeholders and optional query.

use crate::matching::query::parse_query_string;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathMatchResult {
    pub matched: bool,
    pub params: HashMap<String, String>,
}

/// Path pattern was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("path {0:?} must begin with a slash")]
    MissingLeadingSlash(String),
    #[error("path {path:?} has an unterminated or empty parameter")]
    BadParameter { path: String },
}

/// Compiled path pattern.
///
/// `*` matches every path. Otherwise the path part is exact (trailing slash
/// significant) except for `{name}` segments, and the query part, when
/// present, must decode to the same key/value pairs as the request query.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    Any,
    Path {
        regex: Regex,
        param_names: Vec<String>,
        query: Option<HashMap<String, String>>,
    },
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern == "*" {
            return Ok(Self {
                source: pattern.to_owned(),
                kind: PatternKind::Any,
            });
        }

        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_owned()));
        }

        let (path, query) = match pattern.split_once('?') {
            Some((path, query)) => (path, Some(parse_query_string(query))),
            None => (pattern, None),
        };

        let (regex, param_names) = pattern_to_regex(path).ok_or_else(|| {
            PatternError::BadParameter {
                path: pattern.to_owned(),
            }
        })?;

        Ok(Self {
            source: pattern.to_owned(),
            kind: PatternKind::Path {
                regex,
                param_names,
                query,
            },
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match against a request target (path plus optional query string).
    pub fn matches(&self, target: &str) -> PathMatchResult {
        let (regex, param_names, expected_query) = match &self.kind {
            PatternKind::Any => {
                return PathMatchResult {
                    matched: true,
                    params: HashMap::new(),
                }
            }
            PatternKind::Path {
                regex,
                param_names,
                query,
            } => (regex, param_names, query),
        };

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        let Some(caps) = regex.captures(path) else {
            return PathMatchResult::default();
        };

        let query_matched = match (expected_query, query) {
            (None, None) => true,
            (None, Some(q)) => q.is_empty(),
            (Some(expected), actual) => *expected == parse_query_string(actual.unwrap_or("")),
        };
        if !query_matched {
            return PathMatchResult::default();
        }

        let params = param_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name.clone(), m.as_str().to_owned())))
            .collect();

        PathMatchResult {
            matched: true,
            params,
        }
    }
}

fn pattern_to_regex(pattern: &str) -> Option<(Regex, Vec<String>)> {
    let mut param_names = Vec::new();
    let mut regex_str = String::new();
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c == '{' {
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            if !closed || name.is_empty() {
                return None;
            }
            param_names.push(name);
            regex_str.push_str("([^/]+)");
        } else {
            regex_str.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }

    let regex = Regex::new(&format!("^{regex_str}$")).ok()?;
    Some((regex, param_names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/users", "/api/users", true, &[])]
    #[case("/api/users", "/api/users/", false, &[])]
    #[case("/api/users/", "/api/users/", true, &[])]
    #[case("/api/users/{id}", "/api/users/123", true, &[("id", "123")])]
    #[case("/api/users/{id}", "/api/users/abc-123", true, &[("id", "abc-123")])]
    #[case("/api/users/{a}/posts/{b}", "/api/users/1/posts/2", true, &[("a", "1"), ("b", "2")])]
    #[case("/api/users", "/api/posts", false, &[])]
    #[case("/api/users/{id}", "/api/users", false, &[])]
    #[case("/api/users/{id}", "/api/users/123/extra", false, &[])]
    #[case("/", "/", true, &[])]
    #[case("/", "", true, &[])]
    #[case("/api/users.json", "/api/users.json", true, &[])]
    #[case("/api/users.json", "/api/usersXjson", false, &[])]
    #[case("/api/(v1)", "/api/(v1)", true, &[])]
    #[case("*", "/anything/at/all?x=1", true, &[])]
    fn test_path_matches(
        #[case] pattern: &str,
        #[case] target: &str,
        #[case] expected: bool,
        #[case] params: &[(&str, &str)],
    ) {
        let pattern = PathPattern::parse(pattern).expect("Should compile pattern");
        let result = pattern.matches(target);
        assert_eq!(result.matched, expected);
        for (k, v) in params {
            assert_eq!(result.params.get(*k), Some(&(*v).to_owned()));
        }
    }

    #[rstest]
    #[case("/search?q=rust&page=1", "/search?page=1&q=rust", true)]
    #[case("/search?q=a%20b", "/search?q=a+b", true)]
    #[case("/search?q=rust", "/search?q=go", false)]
    #[case("/search?q=rust", "/search", false)]
    #[case("/search?q=rust", "/search?q=rust&extra=1", false)]
    #[case("/search", "/search?q=rust", false)]
    #[case("/search", "/search?", true)]
    fn test_query_matching(#[case] pattern: &str, #[case] target: &str, #[case] expected: bool) {
        let pattern = PathPattern::parse(pattern).expect("Should compile pattern");
        assert_eq!(pattern.matches(target).matched, expected);
    }

    #[rstest]
    #[case("users", PatternError::MissingLeadingSlash("users".into()))]
    #[case("", PatternError::MissingLeadingSlash("".into()))]
    #[case("/users/{id", PatternError::BadParameter { path: "/users/{id".into() })]
    #[case("/users/{}", PatternError::BadParameter { path: "/users/{}".into() })]
    fn test_invalid_patterns(#[case] pattern: &str, #[case] expected: PatternError) {
        assert_eq!(PathPattern::parse(pattern).unwrap_err(), expected);
    }
}
