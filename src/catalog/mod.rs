//! Repository metadata: domain types, GitHub API mapping, and the fetcher.

pub mod api_types;
pub mod client;
pub mod types;

pub use client::{Fetcher, GitHubClient};
pub use types::{PlaceholderReason, Record, RecordOrigin, TrackedItem};
