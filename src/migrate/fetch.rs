//! Image bytes from the asset folder or over HTTP.
//!
//! Redirects are followed by hand so the hop limit and `Location`
//! resolution stay under our control:
//!
//! ```text
//! GET url ──► 200                 → bytes
//!         ├─► 301/302/307/308     → GET resolve(url, Location)   (≤ 5 hops)
//!         └─► anything else       → FetchError::Http
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::{StatusCode, blocking::Client, header::LOCATION, redirect::Policy};
use thiserror::Error;
use url::Url;

use crate::core::url::resolve_location;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

const TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("more than {MAX_REDIRECTS} redirects starting at {0}")]
    TooManyRedirects(String),

    #[error("redirect without Location header from {0}")]
    MissingLocation(String),

    #[error("unusable redirect target {location:?} from {url}")]
    BadLocation { url: String, location: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Read `<asset_dir>/<filename>`.
pub fn read_local(asset_dir: &Path, filename: &str) -> Result<Vec<u8>, FetchError> {
    let path = asset_dir.join(filename);
    if !path.is_file() {
        return Err(FetchError::NotFound(path));
    }
    fs::read(&path).map_err(|source| FetchError::Io { path, source })
}

/// Remote image source.
pub trait Download {
    fn download(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<D: Download + ?Sized> Download for &D {
    fn download(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        (**self).download(url)
    }
}

/// Blocking HTTP downloader with manual redirect handling.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client, routing every request through `proxy` when given.
    pub fn new(proxy: Option<&str>) -> Result<Self, reqwest::Error> {
        let builder = Client::builder()
            .redirect(Policy::none())
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT);

        let builder = match proxy {
            Some(proxy) => builder.proxy(reqwest::Proxy::all(proxy)?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Download for HttpFetcher {
    fn download(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let mut current = url.clone();

        for hop in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(current.as_str())
                .send()
                .map_err(|source| transport(&current, source))?;

            let status = response.status();
            if is_redirect(status) {
                if hop == MAX_REDIRECTS {
                    break;
                }
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| FetchError::MissingLocation(current.to_string()))?;
                let next = resolve_location(&current, location).map_err(|_| {
                    FetchError::BadLocation {
                        url: current.to_string(),
                        location: location.to_string(),
                    }
                })?;
                crate::debug!("fetch"; "{} -> {}", status.as_u16(), next);
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                return Err(FetchError::Http {
                    status: status.as_u16(),
                    url: current.to_string(),
                });
            }

            let bytes = response
                .bytes()
                .map_err(|source| transport(&current, source))?;
            return Ok(bytes.to_vec());
        }

        Err(FetchError::TooManyRedirects(url.to_string()))
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn transport(url: &Url, source: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        source,
    }
}
