mod feed_controller;
mod highlight;

pub use feed_controller::{FeedController, HIGHLIGHT_DWELL};
