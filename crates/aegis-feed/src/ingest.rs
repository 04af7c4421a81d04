use serde::{Deserialize, Serialize};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "geotiff"];

/// What an uploaded file feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestKind {
    /// Imagery for the zone detector.
    Satellite,
    /// Message dumps for the classifier.
    Messages,
    /// Road network and map extracts for the router.
    Map,
    /// Anything else: past incident data for the predictor.
    Historical,
}

impl IngestKind {
    /// Classify by MIME type first, then by file name.
    ///
    /// `image/*` (or an image extension when no MIME type is known) is
    /// satellite imagery; names containing `message` or `text` are
    /// messages; `map` or `osm` are map data. Name checks ignore case.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Self {
        let name = file_name.to_ascii_lowercase();
        let is_image = match mime {
            Some(m) => m.starts_with("image/"),
            None => name
                .rsplit_once('.')
                .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext)),
        };

        if is_image {
            Self::Satellite
        } else if name.contains("message") || name.contains("text") {
            Self::Messages
        } else if name.contains("map") || name.contains("osm") {
            Self::Map
        } else {
            Self::Historical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Satellite => "satellite",
            Self::Messages => "messages",
            Self::Map => "map",
            Self::Historical => "historical",
        }
    }
}
