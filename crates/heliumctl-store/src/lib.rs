pub mod bookmarks;
pub mod error;
pub mod history;
pub mod locate;
pub mod mutate;
mod temp;

pub use bookmarks::BookmarkItem;
pub use error::{Error, Result};
pub use history::HistoryEntry;
pub use locate::{PROFILE_DIRS, StoreHandle, StoreKind, candidates, locate};
pub use mutate::{MutationOutcome, Mutator};
pub use temp::TempCopy;
