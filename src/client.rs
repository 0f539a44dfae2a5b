//! Client side of the benchmark: retrieving public keys from the key-issuing services.

#[cfg(feature = "http")]
pub mod http;
pub mod local;
pub mod provider;

#[cfg(feature = "http")]
pub use http::HttpKeySource;
pub use local::LocalKeySource;
pub use provider::{FetchedKey, KeySource, PublicKeyFetcher};
