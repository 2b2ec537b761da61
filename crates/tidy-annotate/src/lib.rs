//! Google Video Intelligence annotation client.
//!
//! This crate provides:
//! - Video reference resolution (`gs://` passthrough, HTTPS-to-GCS rewrite,
//!   inline-bytes fallback under a hard size ceiling)
//! - Submission of `videos:annotate` requests and polling of the resulting
//!   long-running operation
//! - Normalization of the vendor's nested optional response shapes into
//!   [`tidy_models::VideoAnnotations`]

pub mod client;
pub mod error;
pub mod gcs;
pub mod token_cache;

mod types;

pub use client::{AnnotateConfig, Feature, VideoAnnotator, VideoIntelClient, VideoSource};
pub use error::{AnnotateError, AnnotateResult};
pub use gcs::rewrite_to_gcs_uri;
