pub mod media;
pub mod watched_item;

pub use media::{MediaKind, Platform};
pub use watched_item::WatchedItem;
