pub mod journal;
pub mod narrator;
pub mod providers;
pub mod session;
pub mod summary;

pub use journal::{Journal, JournalCache};
pub use session::SessionRegistry;
pub use summary::{compute_stats, compute_summary, FALLBACK_SUMMARY};
