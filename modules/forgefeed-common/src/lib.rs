pub mod config;
pub mod timefmt;
pub mod types;

pub use config::Config;
pub use timefmt::format_feed_timestamp;
pub use types::*;
