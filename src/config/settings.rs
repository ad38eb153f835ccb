//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a serde default so a partial config file loads
//! cleanly.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Batch-scoped path layout.
    #[serde(default)]
    pub paths: PathSettings,

    /// Extraction and encoding behavior.
    #[serde(default)]
    pub render: RenderSettings,

    /// Caption and watermark presentation.
    #[serde(default)]
    pub captions: CaptionSettings,

    /// Batch logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path layout for one batch run.
///
/// All paths are fixed well-known names relative to the work root; a second
/// concurrent batch sharing the same work root is unsupported and rejected
/// by the status handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root directory for batch artifacts.
    #[serde(default = "default_work_root")]
    pub work_root: String,

    /// Folder for rendered (pre-composite) clips.
    #[serde(default = "default_clips_folder")]
    pub clips_folder: String,

    /// Folder for caption tracks (word-level VTT and styled ASS).
    #[serde(default = "default_subtitles_folder")]
    pub subtitles_folder: String,

    /// Folder for final composited clips and the batch summary.
    #[serde(default = "default_final_folder")]
    pub final_folder: String,

    /// Folder for batch log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Well-known name of the source video inside the work root.
    #[serde(default = "default_source_video")]
    pub source_video: String,
}

fn default_work_root() -> String {
    ".".to_string()
}

fn default_clips_folder() -> String {
    "output_clips".to_string()
}

fn default_subtitles_folder() -> String {
    "output_subtitles".to_string()
}

fn default_final_folder() -> String {
    "output_clips_final".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_source_video() -> String {
    "main_video.webm".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            work_root: default_work_root(),
            clips_folder: default_clips_folder(),
            subtitles_folder: default_subtitles_folder(),
            final_folder: default_final_folder(),
            logs_folder: default_logs_folder(),
            source_video: default_source_video(),
        }
    }
}

/// Extraction and encoding behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Buffer subtracted from the source duration when a descriptor's end
    /// time overruns it, in seconds.
    #[serde(default = "default_end_epsilon")]
    pub end_epsilon_secs: f64,

    /// Maximum fade duration at each clip boundary, in seconds.
    #[serde(default = "default_fade_max")]
    pub fade_max_secs: f64,

    /// Clips at or below this duration receive no fades, in seconds.
    #[serde(default = "default_fade_threshold")]
    pub fade_threshold_secs: f64,

    /// Wall-clock timeout for one encode invocation, in seconds.
    #[serde(default = "default_encode_timeout")]
    pub encode_timeout_secs: u64,

    /// Wall-clock timeout for one composite invocation, in seconds.
    #[serde(default = "default_compose_timeout")]
    pub compose_timeout_secs: u64,
}

fn default_end_epsilon() -> f64 {
    0.1
}

fn default_fade_max() -> f64 {
    0.5
}

fn default_fade_threshold() -> f64 {
    1.0
}

fn default_encode_timeout() -> u64 {
    600
}

fn default_compose_timeout() -> u64 {
    300
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            end_epsilon_secs: default_end_epsilon(),
            fade_max_secs: default_fade_max(),
            fade_threshold_secs: default_fade_threshold(),
            encode_timeout_secs: default_encode_timeout(),
            compose_timeout_secs: default_compose_timeout(),
        }
    }
}

/// Caption and watermark presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSettings {
    /// Font family for burned captions.
    #[serde(default = "default_caption_font")]
    pub font_name: String,

    /// Caption font size.
    #[serde(default = "default_caption_font_size")]
    pub font_size: u32,

    /// Left/right caption margin in pixels.
    #[serde(default = "default_caption_margin_h")]
    pub margin_horizontal: i32,

    /// Bottom caption margin in pixels.
    #[serde(default = "default_caption_margin_v")]
    pub margin_vertical: i32,

    /// Font file used for the drawtext watermark.
    #[serde(default = "default_watermark_font_file")]
    pub watermark_font_file: String,

    /// Watermark font size.
    #[serde(default = "default_watermark_font_size")]
    pub watermark_font_size: u32,

    /// Watermark opacity (0.0 transparent, 1.0 opaque).
    #[serde(default = "default_watermark_opacity")]
    pub watermark_opacity: f64,

    /// Watermark offset above the bottom edge, in pixels.
    #[serde(default = "default_watermark_bottom_offset")]
    pub watermark_bottom_offset: u32,
}

fn default_caption_font() -> String {
    "Montserrat".to_string()
}

fn default_caption_font_size() -> u32 {
    16
}

fn default_caption_margin_h() -> i32 {
    50
}

fn default_caption_margin_v() -> i32 {
    40
}

fn default_watermark_font_file() -> String {
    "styles/arial.ttf".to_string()
}

fn default_watermark_font_size() -> u32 {
    24
}

fn default_watermark_opacity() -> f64 {
    0.5
}

fn default_watermark_bottom_offset() -> u32 {
    60
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            font_name: default_caption_font(),
            font_size: default_caption_font_size(),
            margin_horizontal: default_caption_margin_h(),
            margin_vertical: default_caption_margin_v(),
            watermark_font_file: default_watermark_font_file(),
            watermark_font_size: default_watermark_font_size(),
            watermark_opacity: default_watermark_opacity(),
            watermark_bottom_offset: default_watermark_bottom_offset(),
        }
    }
}

/// Batch logging configuration (mirrors `logging::LogConfig`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log output.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of encoder output lines kept for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in batch logs.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    10
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

impl LoggingSettings {
    /// Convert to a runtime log configuration.
    pub fn to_log_config(&self) -> crate::logging::LogConfig {
        crate::logging::LogConfig {
            level: crate::logging::LogLevel::Info,
            compact: self.compact,
            progress_step: self.progress_step,
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_layout() {
        let s = Settings::default();
        assert_eq!(s.paths.clips_folder, "output_clips");
        assert_eq!(s.paths.subtitles_folder, "output_subtitles");
        assert_eq!(s.paths.final_folder, "output_clips_final");
        assert!((s.render.end_epsilon_secs - 0.1).abs() < 1e-9);
        assert!((s.render.fade_max_secs - 0.5).abs() < 1e-9);
        assert_eq!(s.captions.font_name, "Montserrat");
        assert_eq!(s.captions.font_size, 16);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
            [render]
            encode_timeout_secs = 120
        "#;
        let s: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(s.render.encode_timeout_secs, 120);
        assert!((s.render.fade_max_secs - 0.5).abs() < 1e-9);
        assert_eq!(s.paths.clips_folder, "output_clips");
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let s = Settings::default();
        let text = toml::to_string_pretty(&s).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.captions.watermark_font_size, s.captions.watermark_font_size);
    }
}
