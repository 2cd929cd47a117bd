//! # Pervasive Patterns
//!
//! Turns a multi-month [`pervasive_indexer::OriginIndex`] into URL patterns
//! that stay popular across every tracked month.
//!
//! ## Architecture
//!
//! ```text
//! OriginIndex (working set)
//!     │
//!     ├──> StableSetClassifier
//!     │      ├─ pervasive fixed URLs   -> exact patterns
//!     │      └─ too long / static / unversioned / blocked -> dropped
//!     │
//!     ├──> clustering passes (repeat while a pass accepts something)
//!     │      seed -> CandidateMatcher -> PatternSynthesizer -> validate
//!     │      matched paths leave the working set either way
//!     │
//!     └──> remove_duplicates -> PatternReport
//! ```

mod candidates;
mod classify;
mod config;
mod dedup;
mod engine;
mod error;
mod pattern;
mod report;
mod sequence;
mod synthesize;
mod validate;

pub use candidates::{CandidateMatcher, Seed};
pub use classify::StableSetClassifier;
pub use config::PatternConfig;
pub use dedup::remove_duplicates;
pub use engine::PatternEngine;
pub use error::{PatternError, Result};
pub use pattern::{PatternSet, UrlPattern};
pub use report::{
    collect_unmatched, ClassificationEvent, EventLog, ExclusionReason, PatternOutcome,
    PatternReport, RunStats, UnmatchedUrl,
};
pub use sequence::{MatchBlock, SequenceMatcher};
pub use synthesize::{filename_pattern, PatternSynthesizer};
pub use validate::{validate, Validation};
