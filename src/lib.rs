pub mod aggregate;
pub mod cli;
pub mod config;
pub mod domain_utils;
pub mod enrich;
pub mod export;
pub mod extractor;

pub use enrich::HostRecord;
pub use extractor::BookmarkRecord;
