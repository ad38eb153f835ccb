//! Center-anchored crop geometry.

use crate::models::AspectRatio;

/// A crop window in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
}

impl CropWindow {
    /// Render as an ffmpeg `crop` filter expression.
    pub fn to_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Compute the crop window for a target aspect ratio, anchored on the frame
/// center.
///
/// Returns `None` when no cropping applies: the ratio is `Original`, or the
/// target dimension exceeds the source (a crop cannot widen a frame).
///
/// For `9:16` the window is `floor(height * 9 / 16)` wide and centered
/// horizontally; `16:9` is the symmetric policy on height. The window always
/// has exactly the target dimension: for a 1920x1080 source at `9:16` the
/// window is 607 wide at x=656 (right edge 1263).
pub fn crop_for_aspect(width: u32, height: u32, aspect: AspectRatio) -> Option<CropWindow> {
    match aspect {
        AspectRatio::Portrait => {
            let target_width = height * 9 / 16;
            if target_width > width {
                return None;
            }
            let x = (width - target_width) / 2;
            Some(CropWindow {
                x,
                y: 0,
                width: (x + target_width).min(width) - x,
                height,
            })
        }
        AspectRatio::Landscape => {
            let target_height = width * 9 / 16;
            if target_height > height {
                return None;
            }
            let y = (height - target_height) / 2;
            Some(CropWindow {
                x: 0,
                y,
                width,
                height: (y + target_height).min(height) - y,
            })
        }
        AspectRatio::Original => None,
    }
}
