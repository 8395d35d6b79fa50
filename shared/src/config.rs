use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EraseStyle {
    /// Cut strokes apart where the eraser passes.
    #[default]
    Split,
    /// Record the eraser path as a stroke painted with subtractive compositing.
    Marker,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for ImagePlacement {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            width: 106.0,
            height: 118.0,
        }
    }
}

/// Smallest edge an image may have; configs can raise it, never lower it.
pub const MIN_IMAGE_SIZE: f32 = 20.0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    pub handle_size: f32,
    pub lock_size: f32,
    pub lock_inset: f32,
    pub hover_delay_ms: u32,
    pub min_image_size: f32,
    pub image_placement: ImagePlacement,
    pub default_color: String,
    pub default_line_width: f32,
    pub default_eraser_size: f32,
    pub erase_style: EraseStyle,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            handle_size: 10.0,
            lock_size: 16.0,
            lock_inset: 5.0,
            hover_delay_ms: 1500,
            min_image_size: MIN_IMAGE_SIZE,
            image_placement: ImagePlacement::default(),
            default_color: "#FFFFFF".to_string(),
            default_line_width: 2.0,
            default_eraser_size: 10.0,
            erase_style: EraseStyle::Split,
        }
    }
}

impl BoardConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: BoardConfig = serde_json::from_str(text)?;
        config.min_image_size = config.min_image_size.max(MIN_IMAGE_SIZE);
        config.image_placement.width = config.image_placement.width.max(config.min_image_size);
        config.image_placement.height = config.image_placement.height.max(config.min_image_size);
        Ok(config)
    }
}
