//! Test utilities for Invoicely crates.

use tempfile::TempDir;

/// Boundary used by [`multipart_body`].
pub const MULTIPART_BOUNDARY: &str = "invoicely-test-boundary";

/// Smallest well-formed PNG: a 1x1 transparent pixel.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// `Content-Type` header value matching [`multipart_body`].
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}

/// Encodes a single-file `multipart/form-data` body.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_png_signature() {
        assert_eq!(&PNG_BYTES[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&PNG_BYTES[PNG_BYTES.len() - 8..PNG_BYTES.len() - 4], b"IEND");
    }

    #[test]
    fn test_multipart_body_framing() {
        let body = multipart_body("logo", "logo.png", "image/png", b"abc");
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with(&format!("--{MULTIPART_BOUNDARY}\r\n")));
        assert!(text.contains("name=\"logo\"; filename=\"logo.png\""));
        assert!(text.contains("\r\n\r\nabc\r\n"));
        assert!(text.ends_with(&format!("--{MULTIPART_BOUNDARY}--\r\n")));
        assert!(multipart_content_type().ends_with(MULTIPART_BOUNDARY));
    }

    proptest! {
        #[test]
        fn test_multipart_payload_is_framed_verbatim(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let body = multipart_body("attachment", "a.pdf", "application/pdf", &data);
            let trailer = format!("\r\n--{MULTIPART_BOUNDARY}--\r\n");
            let start = body.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;

            prop_assert_eq!(&body[start..body.len() - trailer.len()], &data[..]);
            prop_assert!(body.ends_with(trailer.as_bytes()));
        }
    }
}
