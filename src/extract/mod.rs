//! Clip extraction: validation, trimming, cropping, fades, and rendering.

mod extractor;
mod geometry;
mod profiles;

pub use extractor::{
    fade_duration, plan_clip, ClipExtractor, ClipPlan, ExtractError, SkipReason,
};
pub use geometry::{crop_for_aspect, CropWindow};
pub use profiles::{encode_profiles, EncodeProfile};
