mod error;
mod finder;
mod process;
mod user_data;

pub use error::{Error, Result};
pub use finder::HeliumFinder;
pub use process::{LaunchMode, close, launch};
pub use user_data::user_data_roots;
