mod fetcher;
pub mod html;
mod models;
mod parser;
pub mod window;

pub use fetcher::{FeedFetcher, FeedSource};
pub use html::strip_tags;
pub use models::{parse_pub_date, FeedItem};
pub use parser::{parse_items, FeedParser, DEFAULT_MAX_DESCRIPTION_LENGTH};
pub use window::{cutoff_before, filter_since, oldest, DEFAULT_WINDOW_DAYS};
