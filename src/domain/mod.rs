pub mod feed;
pub mod item;

pub use feed::{Feed, FeedUpdate};
pub use item::Item;
