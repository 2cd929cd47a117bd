//! # Pervasive Indexer
//!
//! Multi-month occurrence index for crawl snapshots.
//!
//! ## Pipeline
//!
//! ```text
//! MonthSource (newest month first)
//!     │
//!     ├──> Record validation
//!     │      └─> url / hash / count checks, origin + path split
//!     │
//!     └──> OriginIndex
//!            ├─ origin -> path -> month -> hash -> {count, size}
//!            └─ DestinationIndex (first-seen fetch destination per URL)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use pervasive_indexer::{JsonSnapshotDir, OriginIndex};
//! use pervasive_protocol::MonthKey;
//!
//! fn main() -> pervasive_indexer::Result<()> {
//!     let current: MonthKey = "2025-06".parse().expect("month");
//!     let source = JsonSnapshotDir::new("data");
//!     let index = OriginIndex::build(&source, current.trailing(6))?;
//!
//!     println!("Indexed {} paths", index.path_count());
//!     Ok(())
//! }
//! ```

mod error;
mod origin_index;
mod snapshot;
mod stats;

pub use error::{IndexerError, Result};
pub use origin_index::{OriginIndex, PathHistory};
pub use snapshot::{JsonSnapshotDir, MonthSource};
pub use stats::IngestStats;
