//! Shared configuration, report types, and title analysis for the daily
//! research briefing pipeline.

pub mod analysis;
pub mod app_config;
pub mod config;
pub mod dates;
pub mod error;
pub mod report;
pub mod sources;

pub use analysis::{analyze, Analysis, CategoryCount, KeywordCount};
pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use dates::{is_weekend, today_kst, TargetDates};
pub use error::ConfigError;
pub use report::{ContentSource, Report, ReportSummary, SourceKind};
pub use sources::{load_sources, ListingConfig, SourceConfig, SourcesFile};
