//! Header block parser for a single multipart section.

use super::{
    CRLF,
    HeaderParseError,
    MediaType,
    collect_while,
    is_token,
    isomorphic_decode,
    starts_with_at,
};

const FORM_DATA_NAME: &[u8] = b"form-data; name=\"";
const FILENAME: &[u8] = b"; filename";

/// Fields extracted from one section's header block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionHeaders {
    /// Field name from `Content-Disposition`.
    pub name: String,
    /// Optional `filename` (or `filename*`) parameter.
    pub filename: Option<String>,
    /// Parsed `Content-Type`, if present and valid.
    pub content_type: Option<MediaType>,
    /// `Content-Transfer-Encoding` value.
    pub encoding: Option<String>,
}

/// Parse the header block starting at `*position`.
///
/// On success `*position` points just past the blank line that ends the
/// block, i.e. at the first byte of the section body. On failure
/// `*position` is left where parsing stopped and the whole parse should be
/// discarded.
///
/// Unknown headers are skipped. A repeated `Content-Disposition` replaces
/// the earlier name and filename.
///
/// # Errors
///
/// Returns a [`HeaderParseError`] when a header name is not a token, is not
/// followed by `:`, a line does not end in CRLF, `Content-Disposition` is
/// malformed, or the block ends without a `Content-Disposition` name.
///
/// # Examples
///
/// ```
/// use eventframe::multipart::parse_section_headers;
///
/// let input = b"Content-Disposition: form-data; name=\"field\"\r\n\r\nvalue";
/// let mut position = 0;
/// let headers = parse_section_headers(input, &mut position).expect("valid headers");
/// assert_eq!(headers.name, "field");
/// assert_eq!(&input[position..], b"value");
/// ```
pub fn parse_section_headers(
    input: &[u8],
    position: &mut usize,
) -> Result<SectionHeaders, HeaderParseError> {
    let mut name: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<MediaType> = None;
    let mut encoding: Option<String> = None;

    loop {
        if starts_with_at(input, *position, CRLF) {
            let name = name.ok_or(HeaderParseError::MissingName(*position))?;
            *position += CRLF.len();
            return Ok(SectionHeaders {
                name,
                filename,
                content_type,
                encoding,
            });
        }

        let key_start = *position;
        let raw_key = collect_while(input, position, |b| !matches!(b, b'\n' | b'\r' | b':'));
        let key = trim_spaces_and_tabs(raw_key);
        if !is_token(key) {
            return Err(HeaderParseError::InvalidHeaderName(key_start));
        }
        if input.get(*position) != Some(&b':') {
            return Err(HeaderParseError::MissingColon(*position));
        }
        *position += 1;
        collect_while(input, position, |b| matches!(b, b' ' | b'\t'));

        if key.eq_ignore_ascii_case(b"content-disposition") {
            let (parsed_name, parsed_filename) = parse_disposition(input, position)?;
            name = Some(parsed_name);
            filename = parsed_filename;
        } else if key.eq_ignore_ascii_case(b"content-type") {
            let value = line_value(input, position);
            content_type = MediaType::parse(&isomorphic_decode(value));
        } else if key.eq_ignore_ascii_case(b"content-transfer-encoding") {
            encoding = Some(isomorphic_decode(line_value(input, position)));
        } else {
            collect_while(input, position, |b| !matches!(b, b'\n' | b'\r'));
        }

        if !starts_with_at(input, *position, CRLF) {
            return Err(HeaderParseError::MissingCrlf(*position));
        }
        *position += CRLF.len();
    }
}

fn parse_disposition(
    input: &[u8],
    position: &mut usize,
) -> Result<(String, Option<String>), HeaderParseError> {
    if !starts_with_at(input, *position, FORM_DATA_NAME) {
        return Err(HeaderParseError::MalformedDisposition(*position));
    }
    *position += FORM_DATA_NAME.len();
    let name = parse_quoted_value(input, position)?;

    if !starts_with_at(input, *position, FILENAME) {
        return Ok((name, None));
    }
    let mut check = *position + FILENAME.len();
    // `filename*` carries an encoding prefix that is not decoded; only the
    // marker is skipped.
    if input.get(check) == Some(&b'*') {
        *position += 1;
        check += 1;
    }
    if input.get(check) != Some(&b'=') || input.get(check + 1) != Some(&b'"') {
        return Err(HeaderParseError::MalformedDisposition(check));
    }
    *position += FILENAME.len() + 2;
    let filename = parse_quoted_value(input, position)?;
    Ok((name, Some(filename)))
}

/// Read up to the closing quote and step past it.
fn parse_quoted_value(input: &[u8], position: &mut usize) -> Result<String, HeaderParseError> {
    let raw = collect_while(input, position, |b| b != b'"');
    if input.get(*position) != Some(&b'"') {
        return Err(HeaderParseError::MalformedDisposition(*position));
    }
    *position += 1;
    Ok(unescape_quoted(&String::from_utf8_lossy(raw)))
}

/// Resolve the `%0A`, `%0D` (either case) and `%22` escapes used in
/// form-data names.
fn unescape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(index) = rest.find('%') {
        out.push_str(&rest[..index]);
        let escape = rest.get(index..index + 3);
        let replacement = match escape {
            Some(e) if e.eq_ignore_ascii_case("%0a") => Some('\n'),
            Some(e) if e.eq_ignore_ascii_case("%0d") => Some('\r'),
            Some("%22") => Some('"'),
            _ => None,
        };
        if let Some(c) = replacement {
            out.push(c);
            rest = &rest[index + 3..];
        } else {
            out.push('%');
            rest = &rest[index + 1..];
        }
    }
    out.push_str(rest);
    out
}

fn line_value<'a>(input: &'a [u8], position: &mut usize) -> &'a [u8] {
    let value = collect_while(input, position, |b| !matches!(b, b'\n' | b'\r'));
    let end = value
        .iter()
        .rposition(|&b| !matches!(b, b' ' | b'\t'))
        .map_or(0, |i| i + 1);
    &value[..end]
}

fn trim_spaces_and_tabs(bytes: &[u8]) -> &[u8] {
    let is_blank = |b: &u8| matches!(b, b' ' | b'\t');
    let start = bytes.iter().position(|b| !is_blank(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_blank(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}
