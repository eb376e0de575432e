//! Request signing (`api_sig`).

use crate::params::RequestParams;
use md5::{Digest, Md5};

/// Parameter excluded from the signed content.
pub const FORMAT_PARAM: &str = "format";

/// Compute the `api_sig` for a parameter set.
///
/// Keys are sorted ascending (stable), `format` is skipped, each pair is
/// concatenated as `key` followed by `value`, and the shared secret is
/// appended. The result is the lowercase hex MD5 digest of that string.
pub fn compute_signature(params: &RequestParams, shared_secret: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(key, _)| *key != FORMAT_PARAM)
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = Md5::new();
    for (key, value) in pairs {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.update(shared_secret.as_bytes());

    hex::encode(hasher.finalize())
}
