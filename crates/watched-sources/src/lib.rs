pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod normalize;
pub mod serializd;
pub mod traits;

pub use error::SourceError;
pub use fallback::{builtin_records, load_fallback};
pub use fetcher::{extract_records, FetchOutcome, FetchSettings, Fetcher};
pub use normalize::{normalize, normalize_at};
pub use serializd::SerializdClient;
pub use traits::{ServiceApi, Session};
