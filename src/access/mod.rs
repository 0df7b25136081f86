//! Access tiers and their classification.

pub mod classifier;
pub mod tier;

pub use classifier::AccessTierClassifier;
pub use tier::{Classification, Tier};
