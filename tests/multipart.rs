//! Integration tests for `multipart/form-data` parsing.

use eventframe::multipart::{
    HeaderParseError,
    MediaType,
    MultipartError,
    boundary_from_content_type,
    parse_form_data,
};
use eventframe_testing::form_data_body;

#[test]
fn parses_fields_and_files_from_content_type() {
    let content_type =
        MediaType::parse("multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxk")
            .expect("valid content type");
    let boundary = boundary_from_content_type(&content_type).expect("boundary present");
    let body = form_data_body(
        boundary,
        &[
            ("title", None, &b"quarterly report"[..]),
            ("attachment", Some("report.pdf"), &b"%PDF-1.7\r\n\x00\xff"[..]),
            ("empty", None, &b""[..]),
        ],
    );

    let parts = parse_form_data(&body, boundary).expect("well-formed body");

    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].text(), "quarterly report");
    assert!(parts[1].is_file());
    assert_eq!(parts[1].headers.filename.as_deref(), Some("report.pdf"));
    assert_eq!(
        parts[1].headers.content_type.as_ref().map(MediaType::essence),
        Some("application/octet-stream".to_owned())
    );
    assert_eq!(parts[1].body.as_ref(), b"%PDF-1.7\r\n\x00\xff");
    assert!(parts[2].body.is_empty());
}

#[test]
fn body_with_no_parts_is_empty() {
    let body = form_data_body("b", &[]);
    assert_eq!(parse_form_data(&body, "b").expect("closing delimiter only"), vec![]);
}

#[test]
fn section_bodies_are_views_into_the_input() {
    let body = form_data_body("b", &[("f", None, &b"shared"[..])]);
    let parts = parse_form_data(&body, "b").expect("well-formed body");
    let start = parts[0].body.as_ptr() as usize - body.as_ptr() as usize;
    assert_eq!(&body[start..start + 6], b"shared");
}

#[test]
fn missing_crlf_after_delimiter_fails() {
    let body = bytes::Bytes::from_static(b"--b garbage");
    assert_eq!(
        parse_form_data(&body, "b"),
        Err(MultipartError::MissingCrlf { offset: 3 })
    );
}

#[test]
fn oversized_boundary_is_rejected() {
    let boundary = "x".repeat(71);
    let body = form_data_body("b", &[]);
    assert!(matches!(
        parse_form_data(&body, &boundary),
        Err(MultipartError::InvalidBoundary(_))
    ));
}

#[test]
fn header_errors_carry_offsets() {
    let body = bytes::Bytes::from_static(b"--b\r\nContent-Disposition: inline\r\n\r\nx\r\n--b--");
    let err = parse_form_data(&body, "b").expect_err("not form-data");
    let MultipartError::Headers(header_error) = err else {
        panic!("expected header error, got {err:?}");
    };
    assert_eq!(header_error, HeaderParseError::MalformedDisposition(26));
    assert_eq!(header_error.offset(), 26);
}
