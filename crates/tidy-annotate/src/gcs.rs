//! HTTPS-to-GCS reference rewriting.
//!
//! Firebase Storage buckets are GCS buckets, so most blob URLs the upload
//! flow hands us can be rewritten to a `gs://` URI and annotated without any
//! size limit. "No pattern matched" is a normal outcome here — the caller
//! falls back to downloading the bytes.

use url::Url;

/// Rewrite a known HTTPS blob URL into the equivalent `gs://bucket/path` URI.
///
/// Supported shapes, tried in order:
/// 1. Signed download: `https://firebasestorage.googleapis.com/v0/b/BUCKET/o/PATH?token=...`
/// 2. Public bucket: `https://storage.googleapis.com/BUCKET/PATH`
/// 3. Bucket subdomain: `https://BUCKET.firebasestorage.app/o/PATH?...`
///
/// Object paths in shapes 1 and 3 arrive percent-encoded (slashes as `%2F`)
/// and are decoded; query strings are always dropped.
pub fn rewrite_to_gcs_uri(https_url: &str) -> Option<String> {
    let url = Url::parse(https_url).ok()?;
    if url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?;

    if host == "firebasestorage.googleapis.com" {
        let rest = url.path().strip_prefix("/v0/b/")?;
        let (bucket, object) = rest.split_once("/o/")?;
        if bucket.is_empty() || object.is_empty() {
            return None;
        }
        let object = urlencoding::decode(object).ok()?;
        return Some(format!("gs://{bucket}/{object}"));
    }

    if host == "storage.googleapis.com" {
        let mut segments = url.path().strip_prefix('/')?.splitn(2, '/');
        let bucket = segments.next().filter(|s| !s.is_empty())?;
        let object = segments.next().filter(|s| !s.is_empty())?;
        return Some(format!("gs://{bucket}/{object}"));
    }

    if host.ends_with(".firebasestorage.app") {
        let object = url.path().strip_prefix("/o/")?;
        if object.is_empty() {
            return None;
        }
        let object = urlencoding::decode(object).ok()?;
        return Some(format!("gs://{host}/{object}"));
    }

    None
}
