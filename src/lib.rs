//! `MuseAtlas` - walking-accessibility atlas builder for Paris museums
//!
//! This library fetches the official museum register from open data,
//! scrapes the encyclopedia catalog and article summaries, links the two
//! record sets, computes walking isochrones through a routing API, flags
//! nearby transit stations, and writes every derived layer and report as
//! flat files for a GIS host to style and print.

pub mod config;
pub mod error;
pub mod linker;
pub mod models;
pub mod opendata;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod routing;
pub mod transit;
pub mod wikipedia;

// Re-export core types for public API
pub use config::AtlasConfig;
pub use error::AtlasError;
pub use linker::{MatchStrategy, TokenOverlapMatcher, UrlFallbackMatcher};
pub use models::{Coordinates, Isochrone, IsochroneSet, Museum, ScrapedMuseum, Station};
pub use opendata::OpendataClient;
pub use pipeline::{PipelineContext, RunSummary};
pub use routing::OrsClient;
pub use wikipedia::Summarizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AtlasError>;
