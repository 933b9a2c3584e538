//! Ranks YouTube channels by endorsement potential with Simple Additive
//! Weighting: min-max normalization of benefit criteria followed by a
//! weighted sum.
//!
//! ```
//! use endorsement_ranker::{engine, ChannelRecord, ChannelTable, CriterionWeights};
//!
//! let table = ChannelTable::new(
//!     "name",
//!     vec!["views".into(), "likes".into()],
//!     vec![
//!         ChannelRecord::new("A").with_metric("views", 100.0).with_metric("likes", 10.0),
//!         ChannelRecord::new("B").with_metric("views", 200.0).with_metric("likes", 5.0),
//!     ],
//! )?;
//! let weights = CriterionWeights::new()
//!     .with_weight("views", 0.7)
//!     .with_weight("likes", 0.3);
//!
//! let ranked = engine::score(&table, &weights)?;
//! assert_eq!(ranked.records[0].name, "B");
//! # Ok::<(), endorsement_ranker::ScoreError>(())
//! ```

pub mod columns;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod filter;
pub mod models;
pub mod report;
pub mod state;
pub mod weights;

pub use columns::{ColumnMapping, Criterion, NamingConvention};
pub use error::ScoreError;
pub use filter::{FilterSet, Filtered, Notice, Predicate};
pub use models::{ChannelRecord, ChannelTable, NormalizedTable, RankedTable, ScoredRecord};
pub use state::{AppState, View};
pub use weights::CriterionWeights;
