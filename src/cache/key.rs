//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Deterministic cache key for an API read.
///
/// Hashes the endpoint name, the scope (an org or `owner/name`) and the
/// parameters sorted by name, so parameter order never changes the key.
pub fn cache_key(endpoint: &str, scope: Option<&str>, params: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(endpoint.as_bytes());
    hasher.update(b"|");

    if let Some(scope) = scope {
        hasher.update(scope.to_ascii_lowercase().as_bytes());
    }
    hasher.update(b"|");

    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by_key(|(k, _)| *k);

    for (k, v) in sorted_params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
