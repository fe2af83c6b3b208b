//! Client library for the HalalLens ingredient classification API.
//!
//! # Overview
//! Three operations: catalog search, detail lookup for one ingredient, and
//! batch analysis of a list of ingredient names. Each call produces either
//! a decoded value or exactly one `ScannerError`:
//!
//! - `Api`: any non-2xx response except 429
//! - `RateLimited`: HTTP 429
//! - `Network`: timeout or transport failure, no status code
//!
//! # Design
//! - `HalalClient` is sans-IO: `build_*` produces `HttpRequest`, `parse_*`
//!   classifies `HttpResponse`. Hosts with their own HTTP stack can stop
//!   there.
//! - `HalalScanner` adds the round-trip: a `Transport` (reqwest by default)
//!   invoked under a per-call timeout.
//! - Nothing is retried, cached, or paginated automatically.
//!
//! ```no_run
//! use halal_core::{HalalScanner, ScannerConfig, SearchParams};
//!
//! # async fn demo() -> halal_core::Result<()> {
//! let scanner = HalalScanner::new(ScannerConfig::default());
//! let results = scanner.search(&SearchParams::new("gelatin")).await?;
//! for item in &results.items {
//!     println!("{}: {:?}", item.name, item.halal_status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
#[cfg(feature = "reqwest")]
pub mod transport;
pub mod types;

pub use client::{classify_response, HalalClient};
pub use config::{ResolvedConfig, ScannerConfig};
pub use error::{Result, ScannerError};
pub use executor::{HalalScanner, Transport, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use types::{
    AiOpinion, AiReviewSummary, AnalyzeRequest, AnalyzeResult, AnalyzeStatus, AnalyzedIngredient,
    FuzzySuggestion, HalalStatus, IngredientDetail, IngredientSource, IngredientSummary,
    IngredientTranslation, LanguageMatch, QueuedIngredient, SearchParams, SearchResult, SimilarItem,
};
