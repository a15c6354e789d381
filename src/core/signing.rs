//! Request signatures some vendors require on top of the session.
//!
//! Field order matters: vendors verify against the exact sequence their own
//! client concatenates, so callers pass fields in that order and nothing here
//! sorts them.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;

pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

pub fn canonical_query(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Uppercase `MD5(k1=v1&k2=v2...&key=secret)`.
pub fn sign_fields(fields: &[(&str, &str)], secret: &str) -> String {
    let payload = format!("{}&key={}", canonical_query(fields), secret);
    md5_hex(&payload).to_uppercase()
}

pub fn generate_nonce(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Serialize)]
struct NonceSignature<'a> {
    nonce: &'a str,
    timestamp: i64,
    sign: String,
}

/// Base64 JSON `{"nonce","timestamp","sign"}` where `sign = md5(nonce + timestamp)`.
pub fn nonce_signature(nonce: &str, timestamp: i64) -> String {
    let payload = NonceSignature {
        nonce,
        timestamp,
        sign: md5_hex(&format!("{}{}", nonce, timestamp)),
    };
    // 結構體只含字串與整數，序列化不會失敗
    let json = serde_json::to_string(&payload).unwrap_or_default();
    STANDARD.encode(json)
}

/// Fresh nonce and current time, ready for an `i-sign` style header.
pub fn nonce_signature_header() -> String {
    nonce_signature(&generate_nonce(16), timestamp_millis())
}
