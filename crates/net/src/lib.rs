use std::fs;
use std::io::Read;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

pub const USER_AGENT: &str = "lazybg/0.1";
const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(String),
    #[error("response larger than {limit} bytes")]
    TooLarge { limit: usize },
}

pub struct FetchResult {
    pub requested_url: String, // what we asked for
    pub url: String,           // final URL after redirects
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub duration_ms: u128,
    pub body: Result<Vec<u8>, FetchError>,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.body.is_ok()
    }
}

/// Fetch `url` on a worker thread and hand the result to `cb`.
///
/// Supports `http`, `https` and `file` URLs. Bodies over `limit` bytes fail with
/// [`FetchError::TooLarge`].
pub fn fetch_bytes(url: String, limit: usize, cb: Arc<dyn Fn(FetchResult) + Send + Sync>) {
    thread::spawn(move || {
        let result = fetch_bytes_blocking(&url, limit);
        cb(result);
    });
}

/// Same as [`fetch_bytes`] on the calling thread.
pub fn fetch_bytes_blocking(url: &str, limit: usize) -> FetchResult {
    let start = Instant::now();
    let mut result = FetchResult {
        requested_url: url.to_string(),
        url: url.to_string(),
        status: None,
        content_type: None,
        duration_ms: 0,
        body: Ok(Vec::new()),
    };

    result.body = match Url::parse(url) {
        Err(source) => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        }),
        Ok(parsed) => match parsed.scheme() {
            "file" => read_file(&parsed, limit),
            "http" | "https" => fetch_http(&parsed, limit, &mut result),
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        },
    };
    result.duration_ms = start.elapsed().as_millis();

    match &result.body {
        Ok(bytes) => log::debug!(
            target: "net",
            "{} -> {} bytes in {}ms",
            result.url,
            bytes.len(),
            result.duration_ms
        ),
        Err(e) => log::debug!(target: "net", "{} failed: {e}", result.requested_url),
    }
    result
}

fn read_file(url: &Url, limit: usize) -> Result<Vec<u8>, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|()| FetchError::UnsupportedScheme(format!("file url {url}")))?;
    let file = fs::File::open(path)?;
    read_limited(file, limit)
}

fn fetch_http(url: &Url, limit: usize, result: &mut FetchResult) -> Result<Vec<u8>, FetchError> {
    let agent = ureq::AgentBuilder::new()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build();

    let resp = match agent.request_url("GET", url).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, resp)) => {
            result.status = Some(code);
            result.url = resp.get_url().to_string();
            return Err(FetchError::Http(format!("status {code}")));
        }
        Err(ureq::Error::Transport(t)) => return Err(FetchError::Http(t.to_string())),
    };

    result.status = Some(resp.status());
    result.url = resp.get_url().to_string();
    result.content_type = resp.header("Content-Type").map(str::to_string);
    read_limited(resp.into_reader(), limit)
}

// Reads one byte past `limit` so an exactly-full body is still accepted.
fn read_limited(reader: impl Read, limit: usize) -> Result<Vec<u8>, FetchError> {
    let mut buf = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)?;
    if buf.len() > limit {
        return Err(FetchError::TooLarge { limit });
    }
    Ok(buf)
}
