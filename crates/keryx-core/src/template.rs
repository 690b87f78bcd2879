//! Path templates with named placeholders.
//!
//! A [`PathTemplate`] is a route string containing zero or more `{name}`
//! placeholders. It is a pure value type: rendering substitutes
//! percent-encoded argument values into the placeholders, and matching
//! extracts named values from a concrete request path. Placeholder names are
//! exact and case-sensitive.

use crate::fault::{Fault, FaultResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Everything except ASCII alphanumerics and the unreserved marks
/// (`-`, `.`, `_`, `~`), per RFC 3986. Matches what the usual URI
/// escaping routines leave intact, so `abc-123` renders as itself.
const PATH_VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A parsed path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Parameter(String),
}

/// A route string with named `{name}` placeholders.
///
/// # Example
///
/// ```
/// use keryx_core::PathTemplate;
///
/// let template = PathTemplate::new("/item/{id}");
/// assert_eq!(template.placeholders(), vec!["id"]);
///
/// let rendered = template.render(&[("id".to_string(), "42".to_string())]).unwrap();
/// assert_eq!(rendered, "/item/42");
///
/// let params = template.match_path("/item/42").unwrap();
/// assert_eq!(params.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a template from its raw string form.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') {
                    Segment::Parameter(segment[1..segment.len() - 1].to_string())
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        Self { raw, segments }
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the placeholder names in path order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Parameter(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Renders a concrete path by substituting route argument values.
    ///
    /// Values are percent-encoded; unreserved characters pass through
    /// unchanged so [`Self::match_path`] decodes back to the original value.
    /// A placeholder with no matching argument is a configuration defect and
    /// fails with a `Conflict` fault rather than leaking a literal `{name}`
    /// into the URL.
    pub fn render(&self, route_args: &[(String, String)]) -> FaultResult<String> {
        let mut rendered = self.raw.clone();
        for (name, value) in route_args {
            let encoded = utf8_percent_encode(value, PATH_VALUE_ENCODE_SET).to_string();
            rendered = rendered.replace(&format!("{{{name}}}"), &encoded);
        }
        if rendered.contains('{') {
            return Err(Fault::conflict(format!(
                "path template '{}' has unresolved placeholders after substitution: '{rendered}'",
                self.raw
            )));
        }
        Ok(rendered)
    }

    /// Matches a concrete request path against this template.
    ///
    /// Returns the extracted named route values, or `None` when the path does
    /// not match. Matched values are percent-decoded, the inverse of
    /// [`Self::render`]. Trailing slashes and empty segments are ignored.
    #[must_use]
    pub fn match_path(&self, request_path: &str) -> Option<Params> {
        let request_segments: Vec<&str> = request_path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if request_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (pattern, actual) in self.segments.iter().zip(request_segments.iter()) {
            match pattern {
                Segment::Literal(lit) => {
                    if lit != *actual {
                        return None;
                    }
                }
                Segment::Parameter(name) => params.push(
                    name.clone(),
                    percent_decode_str(actual).decode_utf8_lossy().into_owned(),
                ),
            }
        }
        Some(params)
    }
}

impl From<String> for PathTemplate {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.raw
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Named route values extracted from a matched path.
///
/// Stored as ordered (name, value) pairs; lookup is by exact name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}
