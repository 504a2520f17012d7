//! Cloudflare R2 through its S3-compatible API.
//!
//! Objects are addressed path-style:
//! `https://<account_id>.r2.cloudflarestorage.com/<bucket>/<key>`.

use std::time::Duration;

use reqwest::{
    Method, StatusCode,
    blocking::{Client, RequestBuilder},
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use url::Url;

use super::sigv4::{CanonicalRequest, Signer, encode_path};
use super::{ObjectStore, StoreError};
use crate::config::section::{R2_REGION, StoreConfig};
use crate::utils::date::DateTimeUtc;
use crate::utils::hash::sha256_hex;

const SERVICE: &str = "s3";
const TIMEOUT: Duration = Duration::from_secs(60);

/// Payload hash sent for requests without a body.
const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub struct R2Store {
    client: Client,
    config: StoreConfig,
    /// Endpoint host, with port when non-default (signed `host` header).
    host: String,
    /// Endpoint origin without trailing slash.
    origin: String,
    /// Endpoint path prefix, usually empty.
    base_path: String,
}

impl R2Store {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let endpoint = config.endpoint_url();
        let url = Url::parse(&endpoint).map_err(|_| StoreError::Endpoint(endpoint.clone()))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(StoreError::Endpoint(endpoint)),
        };
        let origin = format!("{}://{host}", url.scheme());
        let base_path = url.path().trim_end_matches('/').to_string();

        // Credentials ride in the signature; never route them through env proxies
        let client = Client::builder()
            .timeout(TIMEOUT)
            .no_proxy()
            .build()
            .map_err(StoreError::Client)?;

        Ok(Self {
            client,
            config,
            host,
            origin,
            base_path,
        })
    }

    /// Canonical (encoded) request path for `key`.
    pub fn object_path(&self, key: &str) -> String {
        encode_path(&format!("{}/{}/{key}", self.base_path, self.config.bucket))
    }

    fn signer(&self) -> Signer<'_> {
        Signer {
            access_key_id: &self.config.access_key_id,
            secret_access_key: &self.config.secret_access_key,
            region: R2_REGION,
            service: SERVICE,
        }
    }

    /// Headers to send, `authorization` included.
    pub fn signed_headers(
        &self,
        method: &Method,
        key: &str,
        content_type: Option<&str>,
        payload_hash: &str,
        at: DateTimeUtc,
    ) -> Vec<(String, String)> {
        let path = self.object_path(key);
        let mut headers = vec![
            ("host".to_string(), self.host.clone()),
            ("x-amz-content-sha256".to_string(), payload_hash.to_string()),
            ("x-amz-date".to_string(), at.to_amz_datetime()),
        ];
        if let Some(content_type) = content_type {
            headers.push((CONTENT_TYPE.as_str().to_string(), content_type.to_string()));
        }

        let request = CanonicalRequest {
            method: method.as_str(),
            path: &path,
            query: "",
            headers,
            payload_hash,
        };
        let authorization = self.signer().authorization(&request, at);

        let mut headers = request.headers;
        headers.push((AUTHORIZATION.as_str().to_string(), authorization));
        headers
    }

    fn request(
        &self,
        method: Method,
        key: &str,
        content_type: Option<&str>,
        payload_hash: &str,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.origin, self.object_path(key));
        let headers =
            self.signed_headers(&method, key, content_type, payload_hash, DateTimeUtc::now());

        // `host` is derived from the url by the client
        headers
            .into_iter()
            .filter(|(name, _)| name != "host")
            .fold(self.client.request(method, url), |req, (name, value)| {
                req.header(name, value)
            })
    }
}

impl ObjectStore for R2Store {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let response = self
            .request(Method::HEAD, key, None, EMPTY_PAYLOAD_SHA256)
            .send()
            .map_err(|source| StoreError::Transport {
                key: key.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StoreError::Status {
                status: status.as_u16(),
                key: key.to_string(),
                body: String::new(),
            }),
        }
    }

    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let payload_hash = sha256_hex(bytes);
        let response = self
            .request(Method::PUT, key, Some(content_type), &payload_hash)
            .body(bytes.to_vec())
            .send()
            .map_err(|source| StoreError::Transport {
                key: key.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            key: key.to_string(),
            body: body.chars().take(200).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use tiny_http::{Response, Server};

    fn config(endpoint: Option<&str>) -> StoreConfig {
        StoreConfig {
            access_key_id: "AKID".into(),
            secret_access_key: "SECRET".into(),
            account_id: "acct".into(),
            bucket: "images".into(),
            endpoint: endpoint.map(str::to_string),
        }
    }

    /// What the fake endpoint saw for one request.
    #[derive(Debug)]
    struct Seen {
        method: String,
        url: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl Seen {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Answers `/images/blog/exists.png` with 200, everything else with 404
    /// for HEAD and 200 for PUT.
    fn serve() -> (String, mpsc::Receiver<Seen>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = Vec::new();
                request.as_reader().read_to_end(&mut body).ok();
                let seen = Seen {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.as_str().to_string(), h.value.as_str().to_string()))
                        .collect(),
                    body,
                };
                let status = match (seen.method.as_str(), seen.url.as_str()) {
                    ("HEAD", "/images/blog/exists.png") => 200,
                    ("HEAD", _) => 404,
                    ("PUT", _) => 200,
                    _ => 400,
                };
                tx.send(seen).ok();
                request.respond(Response::empty(status)).ok();
            }
        });

        (format!("http://127.0.0.1:{port}"), rx)
    }

    #[test]
    fn test_default_endpoint_addressing() {
        let store = R2Store::new(config(None)).unwrap();
        assert_eq!(store.origin, "https://acct.r2.cloudflarestorage.com");
        assert_eq!(store.host, "acct.r2.cloudflarestorage.com");
        assert_eq!(store.object_path("blog/p/a.png"), "/images/blog/p/a.png");
        assert_eq!(store.object_path("blog/p/图 1.png"), "/images/blog/p/%E5%9B%BE%201.png");
    }

    #[test]
    fn test_signed_headers_shape() {
        let store = R2Store::new(config(None)).unwrap();
        let at = DateTimeUtc::new(2024, 3, 1, 8, 0, 0);
        let hash = sha256_hex(b"png");
        let headers = store.signed_headers(&Method::PUT, "blog/p/a.png", Some("image/png"), &hash, at);
        let get = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("x-amz-date"), "20240301T080000Z");
        assert_eq!(get("x-amz-content-sha256"), hash);
        assert_eq!(get("content-type"), "image/png");
        let auth = get("authorization");
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKID/20240301/auto/s3/aws4_request, "));
        assert!(auth.contains("SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date, "));

        // Deterministic for a fixed clock
        let again = store.signed_headers(&Method::PUT, "blog/p/a.png", Some("image/png"), &hash, at);
        assert_eq!(headers, again);
    }

    #[test]
    fn test_exists_against_endpoint() {
        let (endpoint, rx) = serve();
        let store = R2Store::new(config(Some(&endpoint))).unwrap();

        assert!(store.exists("blog/exists.png").unwrap());
        let seen = rx.recv().unwrap();
        assert_eq!(seen.method, "HEAD");
        let auth = seen.header("authorization").unwrap();
        assert!(auth.contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date"));

        assert!(!store.exists("blog/missing.png").unwrap());
    }

    #[test]
    fn test_put_against_endpoint() {
        let (endpoint, rx) = serve();
        let store = R2Store::new(config(Some(&endpoint))).unwrap();

        store.put("blog/post/a.png", b"png bytes", "image/png").unwrap();
        let seen = rx.recv().unwrap();
        assert_eq!(seen.method, "PUT");
        assert_eq!(seen.url, "/images/blog/post/a.png");
        assert_eq!(seen.body, b"png bytes");
        assert_eq!(seen.header("content-type"), Some("image/png"));
        assert_eq!(
            seen.header("x-amz-content-sha256"),
            Some(sha256_hex(b"png bytes").as_str())
        );
        assert!(seen.header("x-amz-date").is_some());
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let store = R2Store::new(config(Some(&format!("http://127.0.0.1:{port}")))).unwrap();
        assert!(matches!(
            store.exists("blog/a.png"),
            Err(StoreError::Transport { .. })
        ));
    }
}
