//! Word-level subtitle synthesis.
//!
//! For each rendered clip the synthesizer shifts absolute word timings into
//! clip-relative time, writes a WebVTT word track, converts it to ASS with
//! the external converter, and swaps in the fixed burn-in style. A clip
//! with no recoverable word timings yields an empty VTT and no ASS track;
//! compositing then proceeds caption-less rather than failing the clip.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

use crate::artifacts::OutputLayout;
use crate::config::CaptionSettings;
use crate::logging::BatchLogger;
use crate::media::{locate_tool, run_with_timeout, ToolError};
use crate::models::WordTiming;

use super::ass::AssDocument;
use super::types::{CaptionCue, CaptionStyle, CaptionTrack};
use super::vtt::write_vtt;

const CONVERT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from caption synthesis.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// The word timing source could not produce timings.
    #[error("word timing lookup failed: {0}")]
    Source(String),

    /// The external converter failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A caption file could not be read or written.
    #[error("caption file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Provider of absolute word timings for a source video.
pub trait WordTimingSource: Send + Sync {
    /// Words whose timing overlaps the absolute window `[start_ms, end_ms]`.
    fn words_for_window(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<WordTiming>, CaptionError>;
}

/// In-memory word timing source backed by a pre-loaded transcript.
#[derive(Debug, Clone, Default)]
pub struct StaticWordTimings {
    words: Vec<WordTiming>,
}

impl StaticWordTimings {
    /// Wrap a transcript's word list.
    pub fn new(words: Vec<WordTiming>) -> Self {
        Self { words }
    }
}

impl WordTimingSource for StaticWordTimings {
    fn words_for_window(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<WordTiming>, CaptionError> {
        // Overlap, not containment: a word straddling the clip boundary is
        // kept and rebased (its start clamps to zero) rather than dropped.
        Ok(self
            .words
            .iter()
            .filter(|w| w.end_ms > start_ms && w.start_ms < end_ms)
            .cloned()
            .collect())
    }
}

/// Rebase absolute word timings onto the clip's own timeline.
///
/// Starts that land before the clip boundary clamp to zero instead of going
/// negative, which keeps the first word visible from the first frame.
pub fn build_word_track(words: &[WordTiming], clip_start_ms: i64) -> CaptionTrack {
    let cues = words
        .iter()
        .map(|w| CaptionCue {
            start_ms: (w.start_ms - clip_start_ms).max(0),
            end_ms: (w.end_ms - clip_start_ms).max(0),
            text: w.text.clone(),
        })
        .collect();
    CaptionTrack { cues }
}

/// Converts word tracks to styled ASS subtitle files.
pub struct SubtitleSynthesizer {
    converter: PathBuf,
    style: CaptionStyle,
}

impl SubtitleSynthesizer {
    /// Locate the converter on PATH and build the style from settings.
    pub fn new(settings: &CaptionSettings) -> Result<Self, ToolError> {
        Ok(Self {
            converter: locate_tool("ffmpeg")?,
            style: CaptionStyle::from_settings(settings),
        })
    }

    /// Use an explicit converter binary. Intended for tests.
    pub fn with_converter(converter: PathBuf, style: CaptionStyle) -> Self {
        Self { converter, style }
    }

    /// Synthesize the styled caption track for one clip.
    ///
    /// Writes `{basename}_word.vtt` unconditionally, then converts and
    /// restyles it into `{basename}.ass`. Returns `None` when the track is
    /// empty; the caller composes that clip without captions.
    pub fn synthesize(
        &self,
        basename: &str,
        track: &CaptionTrack,
        layout: &OutputLayout,
        logger: &BatchLogger,
    ) -> Result<Option<PathBuf>, CaptionError> {
        let vtt_path = layout.word_track(basename);
        write_vtt(&vtt_path, track).map_err(|source| CaptionError::Io {
            path: vtt_path.clone(),
            source,
        })?;

        if track.is_empty() {
            logger.warn(&format!(
                "no word timings in window for {}; clip will have no captions",
                basename
            ));
            return Ok(None);
        }
        logger.info(&format!(
            "wrote {} word cues to {}",
            track.len(),
            vtt_path.display()
        ));

        let ass_path = layout.styled_track(basename);
        let mut cmd = Command::new(&self.converter);
        cmd.arg("-i").arg(&vtt_path).arg("-y").arg(&ass_path);
        logger.command(&format!(
            "ffmpeg -i {} -y {}",
            vtt_path.display(),
            ass_path.display()
        ));
        run_with_timeout(&mut cmd, "ffmpeg", CONVERT_TIMEOUT)?;

        self.restyle(&ass_path)?;
        logger.info(&format!("styled caption track: {}", ass_path.display()));
        Ok(Some(ass_path))
    }

    /// Re-read the converted file and replace its style block.
    fn restyle(&self, ass_path: &PathBuf) -> Result<(), CaptionError> {
        let content = fs::read_to_string(ass_path).map_err(|source| CaptionError::Io {
            path: ass_path.clone(),
            source,
        })?;
        let mut doc = AssDocument::parse(&content);
        doc.apply_style(&self.style);
        fs::write(ass_path, doc.render()).map_err(|source| CaptionError::Io {
            path: ass_path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathSettings;
    use crate::logging::LogConfig;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn word(text: &str, start_ms: i64, end_ms: i64) -> WordTiming {
        WordTiming {
            text: text.to_string(),
            start_ms,
            end_ms,
        }
    }

    #[test]
    fn rebasing_clamps_early_starts_to_zero() {
        let words = vec![word("hi", 9_900, 10_400), word("there", 10_400, 10_900)];
        let track = build_word_track(&words, 10_000);

        assert_eq!(track.cues[0].start_ms, 0);
        assert_eq!(track.cues[0].end_ms, 400);
        assert_eq!(track.cues[1].start_ms, 400);
    }

    #[test]
    fn static_source_keeps_boundary_straddling_words() {
        let source = StaticWordTimings::new(vec![
            word("before", 4_000, 4_500),
            word("leading", 9_900, 10_400),
            word("inside", 10_100, 10_600),
            word("trailing", 19_800, 20_300),
            word("after", 20_500, 21_000),
        ]);
        let words = source.words_for_window(10_000, 20_000).unwrap();
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["leading", "inside", "trailing"]);
    }

    #[test]
    fn straddling_first_word_survives_lookup_and_clamps_to_zero() {
        let source = StaticWordTimings::new(vec![word("hi", 9_900, 10_400)]);
        let words = source.words_for_window(10_000, 20_000).unwrap();
        let track = build_word_track(&words, 10_000);

        assert_eq!(track.len(), 1);
        assert_eq!(track.cues[0].start_ms, 0);
        assert_eq!(track.cues[0].end_ms, 400);
    }

    fn test_env(dir: &std::path::Path) -> (OutputLayout, BatchLogger) {
        let mut paths = PathSettings::default();
        paths.work_root = dir.display().to_string();
        let layout = OutputLayout::new(paths);
        layout.ensure_dirs().unwrap();
        let logger =
            BatchLogger::new("captions", layout.logs_dir(), LogConfig::default(), None).unwrap();
        (layout, logger)
    }

    #[test]
    fn empty_track_writes_header_only_vtt_and_no_ass() {
        let dir = tempdir().unwrap();
        let (layout, logger) = test_env(dir.path());
        let synth = SubtitleSynthesizer::with_converter(
            PathBuf::from("/bin/false"),
            CaptionStyle::default(),
        );

        let result = synth
            .synthesize("1_Quiet", &CaptionTrack::new(), &layout, &logger)
            .unwrap();

        assert!(result.is_none());
        let vtt = fs::read_to_string(layout.word_track("1_Quiet")).unwrap();
        assert_eq!(vtt, "WEBVTT\n\n");
        assert!(!layout.styled_track("1_Quiet").exists());
    }

    #[test]
    fn converted_track_gets_the_fixed_style() {
        let dir = tempdir().unwrap();
        let (layout, logger) = test_env(dir.path());

        // Stand-in converter: writes a minimal ASS file to its output
        // argument ($4 after "-i <in> -y <out>").
        let script = dir.path().join("fake_converter.sh");
        fs::write(
            &script,
            "#!/bin/sh\nprintf '[Script Info]\\nScriptType: v4.00+\\n\\n[V4+ Styles]\\nStyle: Default,Arial,20\\n\\n[Events]\\nDialogue: 0,0:00:00.00,0:00:00.40,Default,,0,0,0,,hello\\n' > \"$4\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let synth = SubtitleSynthesizer::with_converter(script, CaptionStyle::default());
        let track = CaptionTrack {
            cues: vec![CaptionCue {
                start_ms: 0,
                end_ms: 400,
                text: "hello".to_string(),
            }],
        };

        let ass_path = synth
            .synthesize("1_Loud", &track, &layout, &logger)
            .unwrap()
            .expect("track should convert");

        let styled = fs::read_to_string(&ass_path).unwrap();
        assert!(styled.contains("Montserrat,16"));
        assert!(!styled.contains("Arial"));
        assert!(styled.contains("hello"));
    }
}
