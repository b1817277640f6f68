use serde::{Deserialize, Serialize};

/// How input images are resized before they reach the backbone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageResizeMode {
    /// No resizing or padding, the image is used as is.
    None,
    /// Resize and pad with zeros to a `max_dim` x `max_dim` square.
    #[default] Square,
    /// Pad width and height with zeros to make them multiples of 64.
    Pad64,
    /// Pick random `min_dim` x `min_dim` crops from the image.
    Crop,
}

// Hardcoded mode names. Storing the display spelling and the lowercase version.
const NONE: [&str; 2] = ["None", "none"];
const SQUARE: [&str; 2] = ["Square", "square"];
const PAD_64: [&str; 2] = ["Pad64", "pad64"];
const CROP: [&str; 2] = ["Crop", "crop"];

impl ImageResizeMode {
    pub fn from_str(mode: &str) -> Option<Self> {
        match mode.to_lowercase().as_str() {
            "none" => Some(ImageResizeMode::None),
            "square" => Some(ImageResizeMode::Square),
            "pad64" => Some(ImageResizeMode::Pad64),
            "crop" => Some(ImageResizeMode::Crop),
            _ => None,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            ImageResizeMode::None => NONE[0],
            ImageResizeMode::Square => SQUARE[0],
            ImageResizeMode::Pad64 => PAD_64[0],
            ImageResizeMode::Crop => CROP[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            ImageResizeMode::None => NONE[1],
            ImageResizeMode::Square => SQUARE[1],
            ImageResizeMode::Pad64 => PAD_64[1],
            ImageResizeMode::Crop => CROP[1],
        }
    }

    pub fn all_resize_modes() -> Vec<String> {
        vec![
            ImageResizeMode::None.str_lowercase().to_string(),
            ImageResizeMode::Square.str_lowercase().to_string(),
            ImageResizeMode::Pad64.str_lowercase().to_string(),
            ImageResizeMode::Crop.str_lowercase().to_string(),
        ]
    }

    pub fn is_valid_resize_mode(mode: &str) -> bool {
        ImageResizeMode::from_str(mode).is_some()
    }
}
