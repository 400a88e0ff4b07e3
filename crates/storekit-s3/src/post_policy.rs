//! Presigned POST forms signed with AWS Signature Version 4.
//!
//! A POST policy is a JSON document listing the conditions an upload form
//! must satisfy (target bucket and key, signing material, optional size
//! range). The policy is base64-encoded and signed with the SigV4 signing key
//! derived for the `s3` service:
//!
//! ```text
//! SigningKey = derive_signing_key(secret, yyyymmdd, region, "s3")
//! Signature  = hex(HMAC-SHA256(SigningKey, base64(policy)))
//! ```
//!
//! The main entry point is [`PostPolicy::sign`].

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::Hmac;
use hmac::Mac;
use hmac::digest::KeyInit;
use serde_json::{Value, json};
use sha2::Sha256;
use typed_builder::TypedBuilder;

/// The signing algorithm used for every policy.
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The service name in the credential scope.
const SERVICE: &str = "s3";

type HmacSha256 = Hmac<Sha256>;

/// The inputs of a POST policy for one object.
#[derive(Debug, Clone, TypedBuilder)]
pub struct PostPolicy<'a> {
    /// Target bucket.
    pub bucket_id: &'a str,
    /// Target object key.
    pub object_id: &'a str,
    /// Access key id of the signer.
    pub access_key_id: &'a str,
    /// Secret access key of the signer.
    pub secret_access_key: &'a str,
    /// Session token of temporary credentials, if any.
    #[builder(default)]
    pub session_token: Option<&'a str>,
    /// Region in the credential scope.
    pub region: &'a str,
    /// Signing time.
    #[builder(default = Utc::now())]
    pub now: DateTime<Utc>,
    /// Lifetime of the form in seconds.
    pub expires_after: u64,
    /// Upper bound on the uploaded body size in bytes, if any.
    #[builder(default)]
    pub max_upload_size: Option<u64>,
}

impl PostPolicy<'_> {
    /// The credential scope value (`AKID/yyyymmdd/region/s3/aws4_request`).
    #[must_use]
    pub fn credential(&self) -> String {
        format!(
            "{}/{}/{}/{SERVICE}/aws4_request",
            self.access_key_id,
            self.now.format("%Y%m%d"),
            self.region
        )
    }

    /// The policy document.
    #[must_use]
    pub fn document(&self) -> Value {
        let amz_date = self.now.format("%Y%m%dT%H%M%SZ").to_string();
        let lifetime = i64::try_from(self.expires_after)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let expiration = self
            .now
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut conditions = vec![
            json!({ "bucket": self.bucket_id }),
            json!({ "key": self.object_id }),
            json!({ "x-amz-algorithm": ALGORITHM }),
            json!({ "x-amz-credential": self.credential() }),
            json!({ "x-amz-date": amz_date }),
        ];
        if let Some(token) = self.session_token {
            conditions.push(json!({ "x-amz-security-token": token }));
        }
        if let Some(max) = self.max_upload_size {
            conditions.push(json!(["content-length-range", 0, max]));
        }

        json!({
            "expiration": expiration.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            "conditions": conditions,
        })
    }

    /// Sign the policy and return the form fields to submit with the upload.
    #[must_use]
    pub fn sign(&self) -> BTreeMap<String, String> {
        let policy = BASE64.encode(self.document().to_string());
        let signing_key = derive_signing_key(
            self.secret_access_key,
            &self.now.format("%Y%m%d").to_string(),
            self.region,
            SERVICE,
        );
        let signature = compute_signature(&signing_key, &policy);

        let mut fields = BTreeMap::new();
        fields.insert("key".to_owned(), self.object_id.to_owned());
        fields.insert("x-amz-algorithm".to_owned(), ALGORITHM.to_owned());
        fields.insert("x-amz-credential".to_owned(), self.credential());
        fields.insert(
            "x-amz-date".to_owned(),
            self.now.format("%Y%m%dT%H%M%SZ").to_string(),
        );
        if let Some(token) = self.session_token {
            fields.insert("x-amz-security-token".to_owned(), token.to_owned());
        }
        fields.insert("policy".to_owned(), policy);
        fields.insert("x-amz-signature".to_owned(), signature);
        fields
    }
}

/// The URL a POST form for `bucket_id` is submitted to.
///
/// Path style yields `endpoint/bucket`; virtual-hosted style prefixes the
/// endpoint host with the bucket. Endpoints that do not parse as URIs fall
/// back to path style.
#[must_use]
pub fn bucket_url(endpoint: &str, bucket_id: &str, force_path_style: bool) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if !force_path_style {
        if let Ok(uri) = endpoint.parse::<http::Uri>() {
            if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
                return format!("{scheme}://{bucket_id}.{authority}");
            }
        }
    }
    format!("{endpoint}/{bucket_id}")
}

/// Derive the SigV4 signing key using HMAC-SHA256 chain.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, b"aws4_request")
}

/// Compute the hex-encoded HMAC-SHA256 signature of `data`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        <HmacSha256 as KeyInit>::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
