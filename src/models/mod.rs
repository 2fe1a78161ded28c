mod catalog;
mod download;
mod error;
mod resolver;
mod service;

pub use catalog::{Catalog, ModelEntry, QuantizedEntry, VariantEntry};
pub use download::{build_client, fetch, fetch_with_progress, Fetch, HttpFetcher};
pub use error::{ResolveError, Result};
pub use resolver::{resolve, ModelScopeEndpoint, ResolvedDownload, DEFAULT_HOST, DEFAULT_USER};
pub use service::{ArtifactResolver, MODEL_FLAGS, MODEL_PREFIX};
