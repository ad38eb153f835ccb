//! Filter graph fragments for compositing.

use std::path::Path;

use crate::config::CaptionSettings;

/// Escape a path for use inside a single-quoted filter argument.
pub fn escape_filter_path(path: &Path) -> String {
    let raw = path.display().to_string();
    raw.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// Escape free text for a `drawtext` `text=` argument.
///
/// Backslash first so later escapes are not doubled. `%` is escaped because
/// drawtext otherwise treats it as an expansion sequence.
pub fn escape_drawtext_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

/// Caption burn-in filter: `ass='<path>'`.
pub fn ass_filter(track: &Path) -> String {
    format!("ass='{}'", escape_filter_path(track))
}

/// Watermark overlay filter, horizontally centered near the bottom edge.
pub fn drawtext_filter(text: &str, settings: &CaptionSettings) -> String {
    format!(
        "drawtext=text='{}':fontfile={}:fontcolor=white@{}:fontsize={}:x=(w-text_w)/2:y=h-text_h-{}",
        escape_drawtext_text(text),
        settings.watermark_font_file,
        settings.watermark_opacity,
        settings.watermark_font_size,
        settings.watermark_bottom_offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn ass_filter_escapes_awkward_path_characters() {
        let path = PathBuf::from("/tmp/it's:here/1_Clip.ass");
        assert_eq!(ass_filter(&path), r"ass='/tmp/it\'s\:here/1_Clip.ass'");
    }

    #[test]
    fn drawtext_escapes_quotes_colons_and_percent() {
        assert_eq!(
            escape_drawtext_text("50% off: don't miss"),
            r"50\% off\: don\'t miss"
        );
    }

    #[test]
    fn drawtext_filter_uses_configured_presentation() {
        let filter = drawtext_filter("@clipforge", &CaptionSettings::default());
        assert_eq!(
            filter,
            "drawtext=text='@clipforge':fontfile=styles/arial.ttf:\
             fontcolor=white@0.5:fontsize=24:x=(w-text_w)/2:y=h-text_h-60"
        );
    }
}
