//! Upload validation.

use crate::error::{MediaError, MediaResult};

/// Image and video types accepted for profile pictures and exercise media.
pub const ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/quicktime",
    "video/webm",
];

/// Default upload size limit: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Resolve and check the content type of an upload.
///
/// A declared type wins unless it is missing or the generic
/// `application/octet-stream`, in which case the file name's extension
/// decides.
pub fn resolve_content_type(file_name: &str, declared: Option<&str>) -> MediaResult<String> {
    let content_type = match declared.map(str::trim) {
        Some(declared) if !declared.is_empty() && declared != "application/octet-stream" => {
            declared.to_ascii_lowercase()
        }
        _ => mime_guess::from_path(file_name)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .ok_or_else(|| MediaError::UnsupportedType(file_name.to_string()))?,
    };

    // drop parameters such as "; charset=..."
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if ALLOWED_TYPES.contains(&essence.as_str()) {
        Ok(essence)
    } else {
        Err(MediaError::UnsupportedType(essence))
    }
}

/// Check the file name and size of an upload.
pub fn validate_upload(file_name: &str, size: u64, max: u64) -> MediaResult<()> {
    if file_name.trim().is_empty() {
        return Err(MediaError::InvalidFile("file name is required".to_string()));
    }

    if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
        return Err(MediaError::InvalidFile(format!(
            "file name {} is not allowed",
            file_name
        )));
    }

    if size == 0 {
        return Err(MediaError::InvalidFile("file is empty".to_string()));
    }

    if size > max {
        return Err(MediaError::TooLarge { size, max });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_wins() {
        assert_eq!(
            resolve_content_type("squat.bin", Some("image/PNG")).unwrap(),
            "image/png"
        );
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(resolve_content_type("squat.mp4", None).unwrap(), "video/mp4");
        assert_eq!(
            resolve_content_type("me.jpg", Some("application/octet-stream")).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn test_rejects_unsupported_types() {
        assert!(matches!(
            resolve_content_type("notes.txt", None),
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(matches!(
            resolve_content_type("x", Some("application/pdf")),
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(resolve_content_type("no_extension", None).is_err());
    }

    #[test]
    fn test_upload_limits() {
        assert!(validate_upload("a.png", 10, 100).is_ok());
        assert!(matches!(
            validate_upload("a.png", 0, 100),
            Err(MediaError::InvalidFile(_))
        ));
        assert!(matches!(
            validate_upload("a.png", 101, 100),
            Err(MediaError::TooLarge { size: 101, max: 100 })
        ));
        assert!(validate_upload("../a.png", 10, 100).is_err());
        assert!(validate_upload(" ", 10, 100).is_err());
    }
}
