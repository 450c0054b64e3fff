//! Walker for complete `multipart/form-data` bodies.

use bytes::Bytes;

use super::{CRLF, MediaType, MultipartError, SectionHeaders, parse_section_headers, starts_with_at};

const MAX_BOUNDARY_LENGTH: usize = 70;

/// One section of a form-data body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormPart {
    /// Parsed section headers.
    pub headers: SectionHeaders,
    /// Raw section body, a view into the original input.
    pub body: Bytes,
}

impl FormPart {
    /// Returns true if the section carries a file.
    #[must_use]
    pub fn is_file(&self) -> bool { self.headers.filename.is_some() }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String { String::from_utf8_lossy(&self.body).into_owned() }
}

/// Extract the `boundary` parameter from a `multipart/form-data` media type.
///
/// # Examples
///
/// ```
/// use eventframe::multipart::{MediaType, boundary_from_content_type};
///
/// let media = MediaType::parse("multipart/form-data; boundary=xyz").expect("valid");
/// assert_eq!(boundary_from_content_type(&media), Some("xyz"));
/// ```
#[must_use]
pub fn boundary_from_content_type(media: &MediaType) -> Option<&str> {
    if media.kind() != "multipart" || media.subtype() != "form-data" {
        return None;
    }
    media.parameter("boundary")
}

/// Parse every section of a form-data body delimited by `boundary`.
///
/// Leading CRLFs before the first delimiter and trailing CRLFs after the
/// closing delimiter are ignored. Section bodies are returned as-is;
/// `Content-Transfer-Encoding` is reported but not applied.
///
/// # Errors
///
/// Returns a [`MultipartError`] when the boundary is invalid, a delimiter or
/// CRLF is missing, a section body is unterminated, or a header block fails
/// to parse.
pub fn parse_form_data(input: &Bytes, boundary: &str) -> Result<Vec<FormPart>, MultipartError> {
    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LENGTH {
        return Err(MultipartError::InvalidBoundary(boundary.to_owned()));
    }
    let delimiter = [&b"--"[..], boundary.as_bytes()].concat();
    let body_end = [CRLF, delimiter.as_slice()].concat();

    let mut end = input.len();
    while end >= CRLF.len() && input[..end].ends_with(CRLF) {
        end -= CRLF.len();
    }
    let input = input.slice(..end);

    let mut position = 0;
    while starts_with_at(&input, position, CRLF) {
        position += CRLF.len();
    }

    let mut parts = Vec::new();
    loop {
        if !starts_with_at(&input, position, &delimiter) {
            return Err(MultipartError::MissingBoundary { offset: position });
        }
        position += delimiter.len();

        if position + 2 == input.len() && starts_with_at(&input, position, b"--") {
            tracing::debug!(parts = parts.len(), "form-data body parsed");
            return Ok(parts);
        }
        if !starts_with_at(&input, position, CRLF) {
            return Err(MultipartError::MissingCrlf { offset: position });
        }
        position += CRLF.len();

        let headers = parse_section_headers(&input, &mut position)?;

        let body_start = position;
        let body_len = input[body_start..]
            .windows(body_end.len())
            .position(|window| window == body_end.as_slice())
            .ok_or(MultipartError::UnterminatedBody { offset: body_start })?;
        let body = input.slice(body_start..body_start + body_len);
        position = body_start + body_len + CRLF.len();

        tracing::trace!(
            name = %headers.name,
            filename = headers.filename.as_deref(),
            size = body.len(),
            "form-data section parsed"
        );
        parts.push(FormPart { headers, body });
    }
}
