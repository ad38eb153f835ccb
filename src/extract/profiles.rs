//! Ordered encode profiles for the per-clip render.
//!
//! The extractor tries each profile in sequence. The primary profile favors
//! speed; the fallback uses a more compatible preset and pins the audio
//! codec explicitly, which recovers sources whose audio stream the fast
//! path cannot passthrough.

/// One encoding attempt configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeProfile {
    /// Profile name for logging.
    pub name: &'static str,
    /// x264 preset.
    pub preset: &'static str,
    /// Explicit audio codec, or `None` to let the encoder choose.
    pub audio_codec: Option<&'static str>,
}

/// The profiles tried in order for every clip render.
pub fn encode_profiles() -> [EncodeProfile; 2] {
    [
        EncodeProfile {
            name: "primary",
            preset: "ultrafast",
            audio_codec: None,
        },
        EncodeProfile {
            name: "compat",
            preset: "fast",
            audio_codec: Some("aac"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_profile_pins_audio_codec() {
        let [primary, compat] = encode_profiles();
        assert_eq!(primary.preset, "ultrafast");
        assert!(primary.audio_codec.is_none());
        assert_eq!(compat.audio_codec, Some("aac"));
    }
}
