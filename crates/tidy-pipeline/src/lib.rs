//! The Tidy video processing pipeline.
//!
//! Flow: a clip enters the processing queue, a worker claims it, the
//! annotation client produces a normalized result, labels are filtered to
//! the cleaning/property vocabulary, room/action tags and a quality score
//! are derived, and the media record is updated. A curator then approves or
//! rejects the clip; approval promotes an anonymized projection into the
//! training corpus.

pub mod classify;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod score;

pub use classify::{classify_action_types, classify_room_type};
pub use corpus::TrainingCorpus;
pub use error::{PipelineError, PipelineResult};
pub use filter::filter_relevant_labels;
pub use pipeline::{derive_completion, BatchOutcome, ProcessOutcome, VideoPipeline};
pub use score::{estimate_duration, quality_score};
