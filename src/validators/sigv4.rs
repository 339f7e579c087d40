use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// AWS Signature Version 4 request signing.
///
/// Builds the canonical request, derives the signing key from the
/// candidate secret, and produces the `Authorization` header value. Only
/// the subset this crate needs: header-based auth with a fixed
/// content-type/host/x-amz-date header set, caller-supplied canonical
/// query string.
pub struct RequestSigner {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub service: String,
}

pub struct SignedRequest {
    pub authorization: String,
    pub amz_date: String,
    pub payload_hash: String,
}

impl RequestSigner {
    pub fn sign(
        &self,
        method: &str,
        host: &str,
        path: &str,
        query: &str,
        content_type: Option<&str>,
        payload: &[u8],
        when: DateTime<Utc>,
    ) -> SignedRequest {
        let amz_date = when.format("%Y%m%dT%H%M%SZ").to_string();
        let date = when.format("%Y%m%d").to_string();
        let payload_hash = sha256_hex(payload);

        // Canonical headers, lowercase, sorted: content-type, host,
        // x-amz-date.
        let mut canonical_headers = String::new();
        let mut signed_names = Vec::new();
        if let Some(content_type) = content_type {
            canonical_headers.push_str("content-type:");
            canonical_headers.push_str(content_type);
            canonical_headers.push('\n');
            signed_names.push("content-type");
        }
        canonical_headers.push_str("host:");
        canonical_headers.push_str(host);
        canonical_headers.push('\n');
        signed_names.push("host");
        canonical_headers.push_str("x-amz-date:");
        canonical_headers.push_str(&amz_date);
        canonical_headers.push('\n');
        signed_names.push("x-amz-date");
        let signed_headers = signed_names.join(";");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method, path, query, canonical_headers, signed_headers, payload_hash
        );

        let credential_scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = self.signing_key(&date);
        let signature = to_hex(&hmac(&signing_key, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key_id, credential_scope, signed_headers, signature
        );

        SignedRequest {
            authorization,
            amz_date,
            payload_hash,
        }
    }

    /// kSigning = HMAC(HMAC(HMAC(HMAC("AWS4"+secret, date), region),
    /// service), "aws4_request")
    fn signing_key(&self, date: &str) -> Vec<u8> {
        let k_secret = format!("AWS4{}", self.secret_access_key);
        let k_date = hmac(k_secret.as_bytes(), date.as_bytes());
        let k_region = hmac(&k_date, self.region.as_bytes());
        let k_service = hmac(&k_region, self.service.as_bytes());
        hmac(&k_service, b"aws4_request")
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // The published AWS signing example: GET iam ListUsers, us-east-1,
    // 2015-08-30T12:36:00Z, AKIDEXAMPLE.
    fn example_signer() -> RequestSigner {
        RequestSigner {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            region: "us-east-1".to_string(),
            service: "iam".to_string(),
        }
    }

    #[test]
    fn derived_signing_key_matches_published_vector() {
        let signer = example_signer();
        let key = signer.signing_key("20150830");
        assert_eq!(
            to_hex(&key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn signature_matches_published_vector() {
        let signer = example_signer();
        let when = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();

        let signed = signer.sign(
            "GET",
            "iam.amazonaws.com",
            "/",
            "Action=ListUsers&Version=2010-05-08",
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            b"",
            when,
        );

        assert!(signed.authorization.ends_with(
            "Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        ));
        assert_eq!(signed.amz_date, "20150830T123600Z");
        assert_eq!(
            signed.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }

    #[test]
    fn empty_payload_hash_is_the_sha256_of_nothing() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
