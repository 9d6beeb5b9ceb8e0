//! Loading the reference and candidate samples from disk.
//!
//! Both samples are read completely and checked before any request is built.
//! The image format is detected from the file's magic bytes, not its
//! extension, since reference files in the wild are often named `.PNG` or
//! carry no extension at all.

use std::path::{Path, PathBuf};

use crate::config::{LimitsConfig, SpeciesProfile};
use crate::error::SampleError;

/// Image formats every supported provider accepts inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Detect the format from file contents.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }

    /// MIME type sent alongside the image data.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// An image read into memory.
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImageSample {
    /// Read and check an image file.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - Content is PNG, JPEG, WebP or GIF
    pub fn load(path: &Path, limits: &LimitsConfig) -> Result<Self, SampleError> {
        if !path.exists() {
            return Err(SampleError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| SampleError::Read {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {e}"),
        })?;
        if !metadata.is_file() {
            return Err(SampleError::Read {
                path: path.to_path_buf(),
                message: "Not a regular file".to_string(),
            });
        }

        let max_bytes = limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(SampleError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: limits.max_file_size_mb,
            });
        }

        let bytes = std::fs::read(path).map_err(|e| SampleError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let format = ImageFormat::detect(&bytes).ok_or_else(|| SampleError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: describe_unknown(&bytes),
        })?;

        tracing::debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            format.media_type()
        );

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            format,
        })
    }

    /// File name portion of the path, for reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn describe_unknown(bytes: &[u8]) -> String {
    match image::guess_format(bytes) {
        Ok(format) => format!("{format:?}"),
        Err(_) if bytes.len() < 4 => "file too small to be an image".to_string(),
        Err(_) => "unrecognized magic bytes".to_string(),
    }
}

/// The known sample for the target species.
#[derive(Debug, Clone)]
pub struct ReferenceSample {
    /// Catalog label, e.g. "L. annulata"
    pub label: String,
    /// Binomial name used in the prompt
    pub scientific_name: String,
    pub description: Option<String>,
    pub image: Option<ImageSample>,
}

impl ReferenceSample {
    /// Assemble a reference from already-loaded parts.
    ///
    /// A blank description counts as absent. Fails when neither an image nor
    /// a description remains.
    pub fn from_parts(
        label: impl Into<String>,
        scientific_name: impl Into<String>,
        description: Option<String>,
        image: Option<ImageSample>,
    ) -> Result<Self, SampleError> {
        let label = label.into();
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description.is_none() && image.is_none() {
            return Err(SampleError::EmptyReference { species: label });
        }
        Ok(Self {
            label,
            scientific_name: scientific_name.into(),
            description,
            image,
        })
    }

    /// Load a catalog profile, reading its image from `image_path` if given.
    pub fn load(
        profile: &SpeciesProfile,
        image_path: Option<&Path>,
        limits: &LimitsConfig,
    ) -> Result<Self, SampleError> {
        let image = image_path
            .map(|path| ImageSample::load(path, limits))
            .transpose()?;
        Self::from_parts(
            profile.label.clone(),
            profile.scientific_name.clone(),
            profile.description.clone(),
            image,
        )
    }

    /// Reference image file name, or the label when text-only.
    pub fn display_name(&self) -> String {
        self.image
            .as_ref()
            .map(ImageSample::file_name)
            .unwrap_or_else(|| self.label.clone())
    }
}

/// The unknown sample being identified.
#[derive(Debug, Clone)]
pub struct CandidateSample {
    pub image: ImageSample,
}

impl CandidateSample {
    pub fn load(path: &Path, limits: &LimitsConfig) -> Result<Self, SampleError> {
        Ok(Self {
            image: ImageSample::load(path, limits)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: [u8; 16] = [
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
    ];

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::detect(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a\0\0"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"not an image"), None);
    }

    #[test]
    fn test_media_types() {
        assert_eq!(ImageFormat::Png.media_type(), "image/png");
        assert_eq!(ImageFormat::Jpeg.media_type(), "image/jpeg");
        assert_eq!(ImageFormat::WebP.media_type(), "image/webp");
    }

    #[test]
    fn test_load_png_with_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "L. annulata_reference.PNG", &PNG_HEADER);

        let sample = ImageSample::load(&path, &LimitsConfig::default()).unwrap();
        assert_eq!(sample.format, ImageFormat::Png);
        assert_eq!(sample.bytes.len(), PNG_HEADER.len());
        assert_eq!(sample.file_name(), "L. annulata_reference.PNG");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImageSample::load(Path::new("/nonexistent/snake.jpg"), &LimitsConfig::default())
            .unwrap_err();
        assert!(matches!(err, SampleError::FileNotFound(_)));
        assert!(err.to_string().contains("/nonexistent/snake.jpg"));
    }

    #[test]
    fn test_load_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSample::load(dir.path(), &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, SampleError::Read { .. }));
    }

    #[test]
    fn test_load_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.png", b"just some text, not pixels");
        let err = ImageSample::load(&path, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, SampleError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(1024 * 1024 + 1, 0);
        let path = write_file(&dir, "big.png", &bytes);

        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let err = ImageSample::load(&path, &limits).unwrap_err();
        assert!(matches!(err, SampleError::FileTooLarge { max_mb: 1, .. }));
    }

    #[test]
    fn test_reference_requires_image_or_description() {
        let err = ReferenceSample::from_parts("L. ornata", "Leptodeira ornata", None, None)
            .unwrap_err();
        assert!(matches!(err, SampleError::EmptyReference { .. }));

        let err = ReferenceSample::from_parts(
            "L. ornata",
            "Leptodeira ornata",
            Some("  ".to_string()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SampleError::EmptyReference { .. }));
    }

    #[test]
    fn test_reference_text_only() {
        let reference = ReferenceSample::from_parts(
            "L. ornata",
            "Leptodeira ornata",
            Some(" occipital region light brown ".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(
            reference.description.as_deref(),
            Some("occipital region light brown")
        );
        assert_eq!(reference.display_name(), "L. ornata");
    }

    #[test]
    fn test_reference_load_from_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ref.png", &PNG_HEADER);
        let profile = crate::config::default_species().remove(0);

        let reference =
            ReferenceSample::load(&profile, Some(&path), &LimitsConfig::default()).unwrap();
        assert_eq!(reference.scientific_name, "Leptodeira annulata");
        assert_eq!(reference.display_name(), "ref.png");
        assert!(reference.description.is_some());
    }

    #[test]
    fn test_reference_load_missing_image_fails() {
        let profile = crate::config::default_species().remove(0);
        let err = ReferenceSample::load(
            &profile,
            Some(Path::new("/nonexistent/ref.png")),
            &LimitsConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SampleError::FileNotFound(_)));
    }
}
