//! AWS Signature Version 4 request signing.
//!
//! Only what the S3 object API needs: header-based auth with a signed
//! payload hash.
//!
//! ```text
//! canonical request ─sha256─► string to sign ─hmac(signing key)─► signature
//! signing key = hmac(hmac(hmac(hmac("AWS4" + secret, date), region), service), "aws4_request")
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::utils::date::DateTimeUtc;
use crate::utils::hash::{hmac_sha256, hmac_sha256_hex, sha256_hex};

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Characters left as-is in a canonical object path: RFC 3986 unreserved plus `/`.
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode an object key for use in a request path.
pub fn encode_path(key: &str) -> String {
    utf8_percent_encode(key, PATH_SET).to_string()
}

/// Request parts covered by the signature.
#[derive(Debug, Clone)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    /// Already percent-encoded path.
    pub path: &'a str,
    /// Already canonical query string (sorted, encoded), usually empty.
    pub query: &'a str,
    /// Header name/value pairs. Names are lowercased and sorted on render.
    pub headers: Vec<(String, String)>,
    pub payload_hash: &'a str,
}

impl CanonicalRequest<'_> {
    fn sorted_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<_> = self
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        headers.sort();
        headers
    }

    /// `content-type;host;x-amz-date`
    pub fn signed_headers(&self) -> String {
        self.sorted_headers()
            .into_iter()
            .map(|(k, _)| k)
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn render(&self) -> String {
        let headers = self.sorted_headers();
        let mut out = String::new();
        out.push_str(self.method);
        out.push('\n');
        out.push_str(self.path);
        out.push('\n');
        out.push_str(self.query);
        out.push('\n');
        for (name, value) in &headers {
            out.push_str(name);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.signed_headers());
        out.push('\n');
        out.push_str(self.payload_hash);
        out
    }
}

/// Credentials plus the scope they sign for.
#[derive(Clone)]
pub struct Signer<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

impl Signer<'_> {
    /// `<date>/<region>/<service>/aws4_request`
    pub fn scope(&self, at: DateTimeUtc) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            at.to_amz_date(),
            self.region,
            self.service
        )
    }

    pub fn signing_key(&self, at: DateTimeUtc) -> Vec<u8> {
        let secret = format!("AWS4{}", self.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), at.to_amz_date().as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        hmac_sha256(&k_service, b"aws4_request")
    }

    pub fn string_to_sign(&self, request: &CanonicalRequest<'_>, at: DateTimeUtc) -> String {
        format!(
            "{ALGORITHM}\n{}\n{}\n{}",
            at.to_amz_datetime(),
            self.scope(at),
            sha256_hex(&request.render())
        )
    }

    pub fn signature(&self, request: &CanonicalRequest<'_>, at: DateTimeUtc) -> String {
        let key = self.signing_key(at);
        hmac_sha256_hex(&key, self.string_to_sign(request, at).as_bytes())
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self, request: &CanonicalRequest<'_>, at: DateTimeUtc) -> String {
        format!(
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key_id,
            self.scope(at),
            request.signed_headers(),
            self.signature(request, at)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Published AWS example (IAM ListUsers, 2015-08-30T12:36:00Z)
    const SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn signer() -> Signer<'static> {
        Signer {
            access_key_id: "AKIDEXAMPLE",
            secret_access_key: SECRET,
            region: "us-east-1",
            service: "iam",
        }
    }

    fn at() -> DateTimeUtc {
        DateTimeUtc::new(2015, 8, 30, 12, 36, 0)
    }

    fn list_users() -> CanonicalRequest<'static> {
        CanonicalRequest {
            method: "GET",
            path: "/",
            query: "Action=ListUsers&Version=2010-05-08",
            headers: vec![
                ("X-Amz-Date".into(), "20150830T123600Z".into()),
                ("Host".into(), "iam.amazonaws.com".into()),
                (
                    "Content-Type".into(),
                    "application/x-www-form-urlencoded; charset=utf-8".into(),
                ),
            ],
            payload_hash: EMPTY_SHA256,
        }
    }

    #[test]
    fn test_signing_key() {
        assert_eq!(
            hex::encode(signer().signing_key(at())),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn test_canonical_request() {
        let request = list_users();
        assert_eq!(request.signed_headers(), "content-type;host;x-amz-date");
        assert_eq!(
            request.render(),
            "GET\n/\nAction=ListUsers&Version=2010-05-08\n\
             content-type:application/x-www-form-urlencoded; charset=utf-8\n\
             host:iam.amazonaws.com\n\
             x-amz-date:20150830T123600Z\n\n\
             content-type;host;x-amz-date\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(&request.render()),
            "f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59"
        );
    }

    #[test]
    fn test_signature_and_authorization() {
        let request = list_users();
        assert_eq!(
            signer().string_to_sign(&request, at()),
            "AWS4-HMAC-SHA256\n20150830T123600Z\n20150830/us-east-1/iam/aws4_request\n\
             f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59"
        );
        assert_eq!(
            signer().authorization(&request, at()),
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("/bucket/blog/post/a-b_c.~png"), "/bucket/blog/post/a-b_c.~png");
        assert_eq!(encode_path("/b/图 1.png"), "/b/%E5%9B%BE%201.png");
        assert_eq!(encode_path("/b/a+b=c.png"), "/b/a%2Bb%3Dc.png");
    }
}
