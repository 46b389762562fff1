use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::RecodeError;

/// Image container formats the pipeline understands.
///
/// GIF is the source side of the re-encode, WebP the target side; both can be
/// decoded for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Gif,
    WebP,
}

impl SourceFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Gif => &["gif"],
            Self::WebP => &["webp"],
        }
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }
}

impl FromStr for SourceFormat {
    type Err = RecodeError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::WebP),
            _ => Err(RecodeError::validation(format!(
                "Unsupported image format: {}", ext
            ))),
        }
    }
}

/// Derive the format from a path's extension.
pub fn format_from_extension(path: &str) -> Result<SourceFormat, RecodeError> {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| RecodeError::validation(format!("File has no extension: {}", path)))?
        .parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_gif_extension() {
        assert_eq!(format_from_extension("anim.gif").unwrap(), SourceFormat::Gif);
        assert_eq!(format_from_extension("out.WEBP").unwrap(), SourceFormat::WebP);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(format_from_extension("photo.jpg").is_err());
        assert!(format_from_extension("noext").is_err());
    }
}
