//! Extension traits connecting the changes view to its host.

mod diff_fetcher;
mod preference_store;

pub use diff_fetcher::{DiffFetcher, FetchError, NoOpDiffFetcher};
pub use preference_store::{MemoryPreferenceStore, PreferenceStore};
