//! On-disk score history: a thread-safe SQLite wrapper plus the score
//! repository. External collaborator to the scoring core; nothing in here
//! feeds back into score computation.

mod database;
mod error;
mod schema;
pub mod scores;

pub use database::Database;
pub use error::StoreError;
pub use scores::{ScoreRepo, ScoreRow, SignalCounts};
