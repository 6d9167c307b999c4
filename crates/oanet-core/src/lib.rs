//! oanet core - shared infrastructure for OpenAlex retrieval and networks
//!
//! Record type, JSONL persistence, dedup, a blocking HTTP bridge with
//! opt-in retry, and logging/progress plumbing.

pub mod dedup;
pub mod jsonl;
pub mod logging;
pub mod progress;
pub mod record;
pub mod retry;
pub mod stream;

// Re-exports for convenience
pub use dedup::{Dedup, aggregate_entities, filter_duplicates};
pub use jsonl::{JsonlReader, JsonlWriter, read_jsonl, save_jsonl, write_jsonl};
pub use logging::{IndicatifLogger, Verbosity, init_logging};
pub use progress::{ProgressContext, fmt_num, upgrade_to_bar};
pub use record::EntityRecord;
pub use retry::{RetryPolicy, Retryable, retry_with_backoff};
pub use stream::{HttpResponse, SHARED_RUNTIME, StreamError, build_client, http_get};
