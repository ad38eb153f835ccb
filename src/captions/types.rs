//! Caption track and style types.

use crate::config::CaptionSettings;

/// One caption cue: a single word with its clip-relative timing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionCue {
    /// Cue start, milliseconds from clip start.
    pub start_ms: i64,
    /// Cue end, milliseconds from clip start.
    pub end_ms: i64,
    /// Cue text (one word).
    pub text: String,
}

/// Ordered sequence of clip-relative caption cues.
///
/// Word-level by design: one cue per spoken word, which is what
/// distinguishes clip captions from the coarser whole-video transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionTrack {
    /// The cues, in timeline order.
    pub cues: Vec<CaptionCue>,
}

impl CaptionTrack {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the track has no cues.
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Number of cues.
    pub fn len(&self) -> usize {
        self.cues.len()
    }
}

/// ASS color in `&HAABBGGRR` form (alpha 0 = opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssColor {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
    /// Alpha component (0 = opaque, 255 = transparent).
    pub a: u8,
}

impl AssColor {
    /// Create from RGB values (opaque).
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }

    /// Create from RGBA values.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Render as an ASS color string.
    pub fn to_ass_string(&self) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }
}

/// The fixed visual style applied uniformly to every burned caption.
///
/// Field order mirrors the `[V4+ Styles]` format line so the two render
/// methods cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    /// Style name referenced by dialogue events.
    pub name: String,
    /// Font family.
    pub font_name: String,
    /// Font size.
    pub font_size: u32,
    /// Fill color.
    pub primary_color: AssColor,
    /// Karaoke secondary color.
    pub secondary_color: AssColor,
    /// Outline color.
    pub outline_color: AssColor,
    /// Shadow/box color.
    pub back_color: AssColor,
    /// Bold flag.
    pub bold: bool,
    /// Outline width.
    pub outline: u32,
    /// Shadow depth.
    pub shadow: u32,
    /// Numpad alignment (2 = bottom center).
    pub alignment: u32,
    /// Left margin, pixels.
    pub margin_l: i32,
    /// Right margin, pixels.
    pub margin_r: i32,
    /// Vertical margin, pixels.
    pub margin_v: i32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            font_name: "Montserrat".to_string(),
            font_size: 16,
            primary_color: AssColor::from_rgb(255, 255, 255),
            secondary_color: AssColor::from_rgba(255, 0, 0, 0),
            outline_color: AssColor::from_rgb(0, 0, 0),
            back_color: AssColor::from_rgba(0, 0, 0, 0x64),
            bold: true,
            outline: 2,
            shadow: 2,
            alignment: 2,
            margin_l: 50,
            margin_r: 50,
            margin_v: 40,
        }
    }
}

impl CaptionStyle {
    /// Build the style from configured caption settings.
    pub fn from_settings(settings: &CaptionSettings) -> Self {
        Self {
            font_name: settings.font_name.clone(),
            font_size: settings.font_size,
            margin_l: settings.margin_horizontal,
            margin_r: settings.margin_horizontal,
            margin_v: settings.margin_vertical,
            ..Self::default()
        }
    }

    /// The `Format:` line naming all style fields.
    pub fn format_line() -> &'static str {
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
         OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, \
         ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
         Alignment, MarginL, MarginR, MarginV, Encoding"
    }

    /// The `Style:` line for this style.
    pub fn style_line(&self) -> String {
        format!(
            "Style: {},{},{},{},{},{},{},{},0,0,0,100,100,0,0,1,{},{},{},{},{},{},1",
            self.name,
            self.font_name,
            self.font_size,
            self.primary_color.to_ass_string(),
            self.secondary_color.to_ass_string(),
            self.outline_color.to_ass_string(),
            self.back_color.to_ass_string(),
            if self.bold { -1 } else { 0 },
            self.outline,
            self.shadow,
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
        )
    }
}
