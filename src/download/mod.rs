//! Download module.
//!
//! This module provides:
//! - Bounded concurrency for batches of tasks
//! - Resumable byte-range transfers
//! - Media selection and item scraping
//! - The acquisition pipeline and its run statistics

pub mod items;
pub mod limiter;
pub mod media;
pub mod orchestrator;
pub mod state;
pub mod transfer;

pub use items::{ItemFetcher, PerItemLogin};
pub use limiter::ConcurrencyLimiter;
pub use media::{plan_item, select_media, select_subtitles, FileKind, PlannedFile};
pub use orchestrator::{AcquisitionOrchestrator, Collaborators};
pub use state::{CollectionReport, RunReport, SkippedCollection};
pub use transfer::{
    parse_content_range, ContentRange, NoProgress, ProgressFactory, ResumableTransfer,
    TransferOutcome, TransferProgress, CHUNK_SIZE, TAIL_CHECK_BYTES,
};
