//! Animal picture acquisition
//!
//! Resolution is a request/response exchange: every puzzle entry issues a
//! new [`ImageTicket`] and only the response carrying the current ticket is
//! accepted. A failed lookup normally degrades to a placeholder picture; only
//! a misconfigured source is reported to the player.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Shown when a picture cannot be obtained at all
pub const RETRY_MESSAGE: &str = "Could not load the animal's picture. Please try again.";

const EXTENSIONS: [(&str, &str); 3] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

/// A resolved picture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    /// Base64 payload with its mime type
    Inline { mime: String, data: String },
}

impl ImageRef {
    /// Deterministic stand-in keyed by animal name
    pub fn placeholder(animal: &str) -> Self {
        ImageRef::Url(format!("https://picsum.photos/seed/{}/512/512", animal))
    }

    /// The reference as a URI a renderer can load
    pub fn as_uri(&self) -> String {
        match self {
            ImageRef::Url(url) => url.clone(),
            ImageRef::Inline { mime, data } => format!("data:{};base64,{}", mime, data),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("no picture produced")]
    NoImage,
    #[error("image source unavailable: {0}")]
    Unavailable(String),
    #[error("image read failed: {0}")]
    Io(#[from] io::Error),
}

impl ImageError {
    /// Whether the player should see this failure instead of a placeholder
    pub fn is_surfaced(&self) -> bool {
        matches!(self, ImageError::Unavailable(_))
    }
}

/// Something that can find a picture of an animal
pub trait ImageSource: Send + Sync {
    fn resolve(&self, animal: &str) -> Result<ImageRef, ImageError>;

    fn source_name(&self) -> &'static str;
}

/// Always answers with the placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSource;

impl ImageSource for PlaceholderSource {
    fn resolve(&self, animal: &str) -> Result<ImageRef, ImageError> {
        Ok(ImageRef::placeholder(animal))
    }

    fn source_name(&self) -> &'static str {
        "placeholder"
    }
}

/// Pictures from a local directory of `<animal>.png|jpg|jpeg` files
#[derive(Debug, Clone)]
pub struct GallerySource {
    dir: Option<PathBuf>,
}

impl GallerySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A gallery with no configured directory; every lookup is unavailable
    pub fn unconfigured() -> Self {
        Self { dir: None }
    }
}

impl ImageSource for GallerySource {
    fn resolve(&self, animal: &str) -> Result<ImageRef, ImageError> {
        let dir = self
            .dir
            .as_ref()
            .ok_or_else(|| ImageError::Unavailable("no gallery directory configured".into()))?;
        if !dir.is_dir() {
            return Err(ImageError::Unavailable(format!(
                "gallery directory {} does not exist",
                dir.display()
            )));
        }

        let stem = animal.to_lowercase();
        for (ext, mime) in EXTENSIONS {
            let path = dir.join(format!("{}.{}", stem, ext));
            match fs::read(&path) {
                Ok(bytes) if bytes.is_empty() => return Err(ImageError::NoImage),
                Ok(bytes) => {
                    debug!(path = %path.display(), "loaded gallery picture");
                    return Ok(ImageRef::Inline {
                        mime: mime.to_string(),
                        data: STANDARD.encode(bytes),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(ImageError::NoImage)
    }

    fn source_name(&self) -> &'static str {
        "gallery"
    }
}

/// Outcome of one image request after the fallback policy is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResolution {
    Ready { image: ImageRef, fallback: bool },
    Failed { message: String },
}

/// Resolve a picture, substituting the placeholder for quiet failures
pub fn resolve_with_fallback(source: &dyn ImageSource, animal: &str) -> ImageResolution {
    match source.resolve(animal) {
        Ok(image) => ImageResolution::Ready {
            image,
            fallback: false,
        },
        Err(e) if e.is_surfaced() => {
            warn!(source = source.source_name(), animal, error = %e, "image source failed");
            ImageResolution::Failed {
                message: RETRY_MESSAGE.to_string(),
            }
        }
        Err(e) => {
            debug!(source = source.source_name(), animal, error = %e, "using placeholder picture");
            ImageResolution::Ready {
                image: ImageRef::placeholder(animal),
                fallback: true,
            }
        }
    }
}

/// Identity of one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageTicket(pub u64);

/// A request the host has to answer with [`ImageResolution`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub ticket: ImageTicket,
    pub animal: String,
}

/// Image state of the current puzzle screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageState {
    #[default]
    Idle,
    Loading(ImageTicket),
    Ready(ImageRef),
    Failed(String),
}

impl ImageState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ImageState::Loading(_))
    }
}
