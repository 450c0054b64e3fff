//! `multipart/form-data` parsing.
//!
//! [`parse_section_headers`] reads the header block of one section with a
//! byte-exact grammar, advancing a caller-owned cursor. [`parse_form_data`]
//! walks a complete body, delimiting sections by boundary and handing each
//! header block to the section parser.

mod error;
mod form_data;
mod headers;
mod media_type;

pub use error::{HeaderParseError, MultipartError};
pub use form_data::{FormPart, boundary_from_content_type, parse_form_data};
pub use headers::{SectionHeaders, parse_section_headers};
pub use media_type::MediaType;

const CRLF: &[u8] = b"\r\n";

fn starts_with_at(input: &[u8], position: usize, prefix: &[u8]) -> bool {
    input
        .get(position..)
        .is_some_and(|rest| rest.starts_with(prefix))
}

/// Advance `position` over bytes matching `accept`, returning them.
fn collect_while<'a>(input: &'a [u8], position: &mut usize, accept: impl Fn(u8) -> bool) -> &'a [u8] {
    let start = (*position).min(input.len());
    let len = input[start..].iter().take_while(|&&b| accept(b)).count();
    *position = start + len;
    &input[start..start + len]
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

fn is_token(bytes: &[u8]) -> bool { !bytes.is_empty() && bytes.iter().copied().all(is_token_byte) }

/// Map each byte to the code point of the same value.
fn isomorphic_decode(bytes: &[u8]) -> String { bytes.iter().copied().map(char::from).collect() }
