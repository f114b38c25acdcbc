pub mod client;
pub mod collect;
pub mod error;
pub mod extract;
pub mod html;
pub(crate) mod rate_limit;
pub mod urls;

pub use client::{Agent, FetchedBytes, FetchedPage, HttpFetcher};
pub use collect::collect_all;
pub use error::ScraperError;
pub use extract::{DebugSnapshots, Extraction, Extractor, PdfCache, MAX_BODY_CHARS};
pub use urls::PdfWhitelist;
