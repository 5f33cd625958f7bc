//! Media type → file extension lookup.

/// Media types that carry no information about the payload.
const OPAQUE_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

/// Returns the conventional extension for a media type, without the dot.
///
/// Parameters (`; charset=...`) and letter case are ignored.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    let ext = match essence.as_str() {
        "image/apng" => "apng",
        "image/avif" => "avif",
        "image/bmp" | "image/x-ms-bmp" => "bmp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "image/jpeg" | "image/pjpeg" => "jpeg",
        "image/jxl" => "jxl",
        "image/png" | "image/x-png" => "png",
        "image/svg+xml" => "svg",
        "image/tiff" => "tiff",
        "image/vnd.microsoft.icon" | "image/x-icon" => "ico",
        "image/webp" => "webp",
        "image/x-xbitmap" => "xbm",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "text/html" => "html",
        _ => return None,
    };
    Some(ext)
}

/// Extension for a fetched payload.
///
/// Uses the declared content type first; when it is missing, opaque or
/// unknown, sniffs the leading bytes.
pub fn extension_for(content_type: Option<&str>, bytes: &[u8]) -> Option<&'static str> {
    let declared = content_type
        .filter(|mime| !OPAQUE_TYPES.iter().any(|opaque| mime.starts_with(opaque)))
        .and_then(extension_for_mime);

    declared.or_else(|| infer::get(bytes).map(|kind| kind.extension()))
}

/// Media type for a payload: the declared one, else sniffed, else opaque.
pub fn mime_for(content_type: Option<&str>, bytes: &[u8]) -> String {
    match content_type.filter(|mime| !mime.trim().is_empty()) {
        Some(mime) if !OPAQUE_TYPES.iter().any(|opaque| mime.starts_with(opaque)) => {
            mime.split(';').next().unwrap_or(mime).trim().to_string()
        }
        _ => infer::get(bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(OPAQUE_TYPES[0])
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn declared_type_wins() {
        assert_eq!(extension_for(Some("image/webp"), PNG_HEADER), Some("webp"));
        assert_eq!(extension_for(Some("IMAGE/PNG; charset=binary"), &[]), Some("png"));
        assert_eq!(extension_for(Some("image/svg+xml"), &[]), Some("svg"));
    }

    #[test]
    fn opaque_type_falls_back_to_sniffing() {
        assert_eq!(extension_for(Some("application/octet-stream"), PNG_HEADER), Some("png"));
        assert_eq!(extension_for(None, PNG_HEADER), Some("png"));
    }

    #[test]
    fn unknown_everything_is_none() {
        assert_eq!(extension_for(Some("application/x-unknown"), b"hello"), None);
        assert_eq!(extension_for(None, &[]), None);
    }

    #[test]
    fn mime_for_strips_parameters_and_sniffs() {
        assert_eq!(mime_for(Some("image/gif; q=1"), &[]), "image/gif");
        assert_eq!(mime_for(None, PNG_HEADER), "image/png");
        assert_eq!(mime_for(Some(""), b"??"), "application/octet-stream");
    }
}
