mod models;
mod render;

pub use models::{CategoryDigest, CategoryDigestEntry, Digest};
pub use render::{render_category, render_digest, MessageStyle};
