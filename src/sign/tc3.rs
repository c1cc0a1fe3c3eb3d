use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::{CanonicalHeaders, Credentials};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "TC3-HMAC-SHA256";
const SERVICE: &str = "dnspod";

const CANONICAL_URI: &str = "/";
const SCOPE_SUFFIX: &str = "tc3_request";

/// Build the `Authorization` header value for one request.
///
/// The signature covers the method, the query string, the given headers, the
/// body hash and the UTC date of `timestamp`; the same timestamp must be sent
/// as `X-TC-Timestamp`.
pub fn sign(
    method: &str,
    canonical_query: &str,
    headers: &CanonicalHeaders,
    payload: &[u8],
    timestamp: DateTime<Utc>,
    credentials: &Credentials,
) -> String {
    let signed_headers = headers.signed_headers();

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        CANONICAL_URI,
        canonical_query,
        headers.canonical_headers(),
        signed_headers,
        hex::encode(Sha256::digest(payload)),
    );

    let date = timestamp.format("%Y-%m-%d").to_string();
    let credential_scope = format!("{date}/{SERVICE}/{SCOPE_SUFFIX}");
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        timestamp.timestamp(),
        credential_scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes())),
    );

    let secret_date = hmac_sha256(
        format!("TC3{}", credentials.secret_key).as_bytes(),
        date.as_bytes(),
    );
    let secret_service = hmac_sha256(&secret_date, SERVICE.as_bytes());
    let secret_signing = hmac_sha256(&secret_service, SCOPE_SUFFIX.as_bytes());
    let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.secret_id, credential_scope, signed_headers, signature
    )
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
