//! Artifact naming and batch-scoped output layout.
//!
//! Every per-clip artifact (rendered video, word-level VTT, styled ASS,
//! final composite) shares one deterministic basename derived from the clip
//! index and sanitized title, which is how the stages cross-reference each
//! other on disk.

mod summary;

pub use summary::{build_batch_summary, write_batch_summary, ClipReport};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PathSettings;

/// Sanitize a clip title into a filesystem-safe fragment.
///
/// Keeps alphanumerics, spaces, and underscores; everything else is dropped.
/// Trailing whitespace is trimmed. Deterministic for a given title.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    kept.trim_end().to_string()
}

/// Deterministic artifact stem for a clip: `{index+1}_{sanitized_title}`.
pub fn clip_basename(index: usize, title: &str) -> String {
    format!("{}_{}", index + 1, sanitize_title(title))
}

/// Batch-scoped directory layout with fixed well-known names.
///
/// All paths hang off one work root. A second concurrent batch sharing the
/// same work root is unsupported; the status handle rejects it.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    work_root: PathBuf,
    paths: PathSettings,
}

impl OutputLayout {
    /// Build a layout from the configured path settings.
    pub fn new(paths: PathSettings) -> Self {
        Self {
            work_root: PathBuf::from(&paths.work_root),
            paths,
        }
    }

    /// The batch work root.
    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Well-known source video path inside the work root.
    pub fn source_video(&self) -> PathBuf {
        self.work_root.join(&self.paths.source_video)
    }

    /// Directory for rendered (pre-composite) clips.
    pub fn clips_dir(&self) -> PathBuf {
        self.work_root.join(&self.paths.clips_folder)
    }

    /// Directory for caption tracks.
    pub fn subtitles_dir(&self) -> PathBuf {
        self.work_root.join(&self.paths.subtitles_folder)
    }

    /// Directory for final composited clips and the summary document.
    pub fn final_dir(&self) -> PathBuf {
        self.work_root.join(&self.paths.final_folder)
    }

    /// Directory for batch log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.work_root.join(&self.paths.logs_folder)
    }

    /// Create every output directory this batch will write into.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(self.clips_dir())?;
        fs::create_dir_all(self.subtitles_dir())?;
        fs::create_dir_all(self.final_dir())?;
        fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// Rendered clip path: `output_clips/{basename}.mp4`.
    pub fn clip_video(&self, basename: &str) -> PathBuf {
        self.clips_dir().join(format!("{}.mp4", basename))
    }

    /// Word-level caption path: `output_subtitles/{basename}_word.vtt`.
    pub fn word_track(&self, basename: &str) -> PathBuf {
        self.subtitles_dir().join(format!("{}_word.vtt", basename))
    }

    /// Styled caption path: `output_subtitles/{basename}.ass`.
    pub fn styled_track(&self, basename: &str) -> PathBuf {
        self.subtitles_dir().join(format!("{}.ass", basename))
    }

    /// Final composited clip path: `output_clips_final/{basename}_final.mp4`.
    pub fn final_clip(&self, basename: &str) -> PathBuf {
        self.final_dir().join(format!("{}_final.mp4", basename))
    }

    /// Batch summary document path.
    pub fn summary_file(&self) -> PathBuf {
        self.final_dir().join("clip_data_summary.txt")
    }
}
