pub mod context;
pub mod error;

pub use context::{load_trigger_file, AppContext};
pub use error::{FeedwatchError, Result};
