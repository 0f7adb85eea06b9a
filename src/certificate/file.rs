//! Files carried inline as `data:<mime>;base64,<payload>` urls.

use base64::{engine::general_purpose::STANDARD, Engine};
use certportal_shared::certificate::{handle::FileDescriptor, CertificateFile};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("file isn't a base64 data url")]
    MalformedDataUrl,
    #[error("invalid media type: {0}")]
    Mime(mime::FromStrError),
    #[error("invalid base64 payload: {0}")]
    Base64(base64::DecodeError),
    #[error("declared content type {declared} doesn't match the data url type {actual}")]
    MimeMismatch { declared: String, actual: String },
    #[error("file too large: {size} bytes, max {max}")]
    TooLarge { size: u64, max: u64 },
}

/// Encodes bytes into a data url.
pub fn encode(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Splits a data url into its media type and base64 payload.
pub fn parse(url: &str) -> Result<(mime::Mime, &str), Error> {
    let (header, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(Error::MalformedDataUrl)?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or(Error::MalformedDataUrl)?;
    let mime = media_type.parse().map_err(Error::Mime)?;
    Ok((mime, payload))
}

/// Decodes a data url, refusing payloads larger than `max_size` bytes.
pub fn decode(url: &str, max_size: u64) -> Result<(mime::Mime, Vec<u8>), Error> {
    let (mime, payload) = parse(url)?;

    // Every 4 base64 characters carry at most 3 bytes. Payloads far beyond
    // the limit are refused before decoding.
    let upper_bound = (payload.len() as u64 / 4) * 3;
    if upper_bound > max_size.saturating_mul(2).saturating_add(4) {
        return Err(Error::TooLarge {
            size: upper_bound,
            max: max_size,
        });
    }

    let bytes = STANDARD.decode(payload).map_err(Error::Base64)?;
    if bytes.len() as u64 > max_size {
        return Err(Error::TooLarge {
            size: bytes.len() as u64,
            max: max_size,
        });
    }
    Ok((mime, bytes))
}

/// Checks a file descriptor and turns it into a stored file.
///
/// The content type is the essence of the data url's media type and the
/// size is the decoded length of its payload.
pub fn load(descriptor: FileDescriptor, max_size: u64) -> Result<CertificateFile, Error> {
    let (mime, bytes) = decode(&descriptor.data, max_size)?;
    let actual = mime.essence_str().to_owned();
    if let Some(declared) = descriptor.content_type {
        if !declared.eq_ignore_ascii_case(&actual) {
            return Err(Error::MimeMismatch { declared, actual });
        }
    }

    Ok(CertificateFile {
        file_name: descriptor.file_name.trim().to_owned(),
        content_type: actual,
        size: bytes.len() as u64,
        data: descriptor.data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(data: String, content_type: Option<&str>) -> FileDescriptor {
        FileDescriptor {
            file_name: " constancia.pdf ".to_owned(),
            content_type: content_type.map(str::to_owned),
            data,
        }
    }

    #[test]
    fn round_trip() {
        let bytes = b"%PDF-1.4 certificate";
        let url = encode("application/pdf", bytes);
        assert!(url.starts_with("data:application/pdf;base64,"));

        let (mime, decoded) = decode(&url, 1024).unwrap();
        assert_eq!(mime.essence_str(), "application/pdf");
        assert_eq!(decoded, bytes);

        let file = load(descriptor(url.clone(), Some("application/pdf")), 1024).unwrap();
        assert_eq!(file.file_name, "constancia.pdf");
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.size, bytes.len() as u64);
        assert_eq!(file.data, url);
    }

    #[test]
    fn size_limit() {
        let url = encode("image/png", &[0u8; 100]);
        assert!(decode(&url, 100).is_ok());
        assert!(matches!(
            decode(&url, 99),
            Err(Error::TooLarge { size: 100, max: 99 })
        ));
        assert!(matches!(decode(&url, 10), Err(Error::TooLarge { .. })));
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(matches!(
            parse("image/png;base64,AAAA"),
            Err(Error::MalformedDataUrl)
        ));
        assert!(matches!(
            parse("data:image/png,AAAA"),
            Err(Error::MalformedDataUrl)
        ));
        assert!(matches!(
            decode("data:image/png;base64,@@@@", 1024),
            Err(Error::Base64(_))
        ));
    }

    #[test]
    fn declared_type_must_match() {
        let url = encode("image/png", b"png");
        assert!(matches!(
            load(descriptor(url, Some("application/pdf")), 1024),
            Err(Error::MimeMismatch { .. })
        ));
    }
}
