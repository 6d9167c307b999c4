//! oanet OpenAlex - paginated retrieval from the OpenAlex REST API
//!
//! Builds `filter=` expressions, walks offset or cursor pagination lazily,
//! and yields each result as a schema-less [`oanet_core::EntityRecord`].
//!
//! # Example
//!
//! ```no_run
//! use oanet_core::{ProgressContext, Verbosity, init_logging};
//! use oanet_openalex::{ApiClient, ApiConfig, Entity, FilterSpec, Query};
//!
//! init_logging(Verbosity::Normal, &ProgressContext::new());
//! let client = ApiClient::new(ApiConfig::load()?.with_email("you@example.org"))?;
//! let query = Query::new(Entity::Works)
//!     .filter(FilterSpec::new().with("authorships.author.id", "A5023888391"))
//!     .max_entities(500);
//!
//! for record in client.entities(&query) {
//!     let record = record?;
//!     println!("{}", record.id().unwrap_or("?"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod pager;
pub mod runner;
pub mod state;

// Re-exports for convenience
pub use api::{ApiClient, HttpTransport, Page, PageMeta, Transport};
pub use config::{ApiConfig, Query, RetrySettings};
pub use error::FetchError;
pub use filter::{FilterSpec, FilterValue};
pub use pager::EntityPager;
pub use runner::{RunSummary, fetch_to_jsonl};
pub use state::{Entity, PageCursor, PagingMode};
