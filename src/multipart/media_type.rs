//! Structured media types as carried by `Content-Type`.

use std::fmt;

use super::{collect_while, is_token};

fn is_http_whitespace(c: char) -> bool { matches!(c, '\t' | '\n' | '\r' | ' ') }

fn is_quoted_string_char(c: char) -> bool {
    c == '\t' || (' '..='~').contains(&c) || ('\u{80}'..='\u{ff}').contains(&c)
}

/// A parsed media type such as `text/plain; charset=utf-8`.
///
/// Type, subtype and parameter names are lower-cased. Parameter values keep
/// their case with quoting and backslash escapes removed. The first
/// occurrence of a parameter wins.
///
/// # Examples
///
/// ```
/// use eventframe::multipart::MediaType;
///
/// let media = MediaType::parse("Text/Plain; Charset=\"utf-8\"").expect("valid media type");
/// assert_eq!(media.essence(), "text/plain");
/// assert_eq!(media.parameter("charset"), Some("utf-8"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    subtype: String,
    parameters: Vec<(String, String)>,
}

impl MediaType {
    /// Parse a media type, returning `None` if the type or subtype is not a
    /// valid token. Malformed parameters are skipped.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        // Header values are isomorphic-decoded, so every char fits a byte.
        let bytes: Vec<u8> = input
            .trim_matches(is_http_whitespace)
            .chars()
            .map(u8::try_from)
            .collect::<Result<_, _>>()
            .ok()?;
        let mut position = 0;

        let kind = collect_while(&bytes, &mut position, |b| b != b'/');
        if !is_token(kind) || position >= bytes.len() {
            return None;
        }
        position += 1;

        let subtype = collect_while(&bytes, &mut position, |b| b != b';');
        let subtype = trim_end_whitespace(subtype);
        if !is_token(subtype) {
            return None;
        }

        let mut media = Self {
            kind: latin1(kind).to_ascii_lowercase(),
            subtype: latin1(subtype).to_ascii_lowercase(),
            parameters: Vec::new(),
        };

        while position < bytes.len() {
            position += 1;
            collect_while(&bytes, &mut position, |b| is_http_whitespace(char::from(b)));
            let name = latin1(collect_while(&bytes, &mut position, |b| b != b';' && b != b'='))
                .to_ascii_lowercase();

            match bytes.get(position) {
                None => break,
                Some(b';') => continue,
                Some(_) => position += 1,
            }

            let value = if bytes.get(position) == Some(&b'"') {
                let value = collect_quoted_string(&bytes, &mut position);
                collect_while(&bytes, &mut position, |b| b != b';');
                value
            } else {
                let raw = collect_while(&bytes, &mut position, |b| b != b';');
                let raw = trim_end_whitespace(raw);
                if raw.is_empty() {
                    continue;
                }
                latin1(raw)
            };

            if is_token(name.as_bytes())
                && value.chars().all(is_quoted_string_char)
                && media.parameter(&name).is_none()
            {
                media.parameters.push((name, value));
            }
        }

        Some(media)
    }

    /// The top-level type, e.g. `text`.
    #[must_use]
    pub fn kind(&self) -> &str { &self.kind }

    /// The subtype, e.g. `plain`.
    #[must_use]
    pub fn subtype(&self) -> &str { &self.subtype }

    /// `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String { format!("{}/{}", self.kind, self.subtype) }

    /// Look up a parameter by lower-case name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All parameters in order of appearance.
    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] { &self.parameters }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (name, value) in &self.parameters {
            if is_token(value.as_bytes()) {
                write!(f, ";{name}={value}")?;
            } else {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, ";{name}=\"{escaped}\"")?;
            }
        }
        Ok(())
    }
}

fn latin1(bytes: &[u8]) -> String { super::isomorphic_decode(bytes) }

fn trim_end_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| !is_http_whitespace(char::from(b)))
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Read a quoted string starting at the opening `"`, resolving backslash
/// escapes. An unterminated string runs to the end of input.
fn collect_quoted_string(bytes: &[u8], position: &mut usize) -> String {
    let mut value = Vec::new();
    *position += 1;
    loop {
        value.extend_from_slice(collect_while(bytes, position, |b| b != b'"' && b != b'\\'));
        let Some(&delimiter) = bytes.get(*position) else {
            break;
        };
        *position += 1;
        if delimiter != b'\\' {
            break;
        }
        match bytes.get(*position) {
            Some(&escaped) => {
                value.push(escaped);
                *position += 1;
            }
            None => {
                value.push(b'\\');
                break;
            }
        }
    }
    latin1(&value)
}
