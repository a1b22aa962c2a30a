use std::path::Path;
use tracing::debug;

/// MIME type recorded when detection is inconclusive.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Part of the MIME type before the first `/`, e.g. `video`.
    pub category: String,
    /// Full MIME type, e.g. `video/mp4`.
    pub mime: String,
}

impl Classification {
    pub fn from_mime(mime: &str) -> Self {
        let category = mime.split('/').next().unwrap_or(mime);
        Self {
            category: category.to_string(),
            mime: mime.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::from_mime(UNKNOWN_MIME)
    }

    pub fn is_unknown(&self) -> bool {
        self.mime == UNKNOWN_MIME
    }
}

/// Determine the MIME type of a file.
///
/// Content sniffing wins; when it is inconclusive the extension is
/// consulted. Never fails: unreadable or unrecognised files are classified
/// as [`UNKNOWN_MIME`].
pub fn classify(path: &Path) -> Classification {
    if let Some(mime) = tree_magic_mini::from_filepath(path).filter(|m| *m != UNKNOWN_MIME) {
        return Classification::from_mime(mime);
    }
    if let Some(guess) = mime_guess::from_path(path).first() {
        return Classification::from_mime(guess.essence_str());
    }

    debug!("MIME detection inconclusive for {}", path.display());
    Classification::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_category_is_prefix_of_mime() {
        let c = Classification::from_mime("video/mp4");
        assert_eq!(c.category, "video");
        assert_eq!(c.mime, "video/mp4");
    }

    #[test]
    fn test_unknown_classification() {
        let c = Classification::unknown();
        assert_eq!(c.category, "application");
        assert!(c.is_unknown());
    }

    #[test]
    fn test_content_beats_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("picture.txt");
        fs::write(&path, b"\x89PNG\r\n\x1A\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0").unwrap();

        let c = classify(&path);
        assert_eq!(c.mime, "image/png");
        assert_eq!(c.category, "image");
    }

    #[test]
    fn test_pdf_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report");
        fs::write(&path, "%PDF-1.7\n%\u{e2}\u{e3}\n1 0 obj\n<<>>\nendobj\n").unwrap();

        assert_eq!(classify(&path).mime, "application/pdf");
    }

    #[test]
    fn test_plain_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "plain text content\n").unwrap();

        let c = classify(&path);
        assert_eq!(c.category, "text");
    }

    #[test]
    fn test_missing_file_is_unknown() {
        let dir = tempdir().unwrap();
        assert!(classify(&dir.path().join("gone")).is_unknown());
    }

    #[test]
    fn test_extension_used_when_file_cannot_be_sniffed() {
        let dir = tempdir().unwrap();
        assert_eq!(classify(&dir.path().join("gone.mp3")).mime, "audio/mpeg");
    }
}
