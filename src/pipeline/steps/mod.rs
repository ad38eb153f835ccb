//! Concrete pipeline steps, in batch order.

mod captions;
mod compose;
mod extract;
mod summary;

pub use captions::CaptionStep;
pub use compose::ComposeStep;
pub use extract::ExtractStep;
pub use summary::SummaryStep;
