//! Media module for collection and item representation and parsing.

pub mod item;
pub mod parser;

pub use item::{Collection, CollectionMetadata, Entry, EntryInfo, Item};
pub use parser::{build_item, classify_link, SourceKind};
