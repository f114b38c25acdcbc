pub mod client;
pub mod error;
pub mod page;

pub use client::{NotionClient, PublishedPage, MAX_BLOCKS_PER_REQUEST};
pub use error::NotionError;
pub use page::{build_briefing_page, Block, NewPage};
