use crate::locate::StoreKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{} not found - has Helium been launched yet?", .0.label())]
    NotFound(StoreKind),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store busy - close Helium and try again")]
    Busy,

    #[error("failed to parse bookmarks file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("history database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("no matching items found to delete")]
    NothingToDelete,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
