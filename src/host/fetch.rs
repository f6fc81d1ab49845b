//! Stylesheet retrieval for preview tokens
//!
//! Fetching is best-effort: callers turn every failure into an empty token
//! map. `fetch_all` exists so each backend can run a batch concurrently with
//! whatever its platform offers (eager browser promises, a tokio `JoinSet`).

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;
#[cfg(feature = "runtime")]
use std::path::{Component, Path, PathBuf};

/// Response to a stylesheet request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Async stylesheet fetcher
///
/// Futures are not `Send`: everything runs on the page's single event loop.
#[async_trait(?Send)]
pub trait CssFetcher {
    /// Fetch one stylesheet
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// Fetch several stylesheets concurrently
    ///
    /// Returns a result for each url in the same order as the input.
    async fn fetch_all(&self, urls: &[String]) -> Vec<Result<FetchResponse, FetchError>>;
}

/// Fetcher serving canned responses, recording every request
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Result<FetchResponse, FetchError>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 for `url`
    pub fn with_css(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Ok(FetchResponse::ok(body)));
        self
    }

    pub fn with_response(mut self, url: &str, response: Result<FetchResponse, FetchError>) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn respond(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses.get(url).cloned().unwrap_or(Ok(FetchResponse {
            status: 404,
            body: String::new(),
        }))
    }
}

#[async_trait(?Send)]
impl CssFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.respond(url)
    }

    async fn fetch_all(&self, urls: &[String]) -> Vec<Result<FetchResponse, FetchError>> {
        urls.iter().map(|url| self.respond(url)).collect()
    }
}

/// Serves site-absolute stylesheet urls (`/src/styles/...`) from a build
/// or source directory, the way a static file server would
#[cfg(feature = "runtime")]
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

#[cfg(feature = "runtime")]
impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a url path onto the root directory. Query strings and fragments
    /// are dropped; paths escaping the root resolve to `None`.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

#[cfg(feature = "runtime")]
fn response_from_read(result: std::io::Result<String>) -> Result<FetchResponse, FetchError> {
    match result {
        Ok(body) => Ok(FetchResponse::ok(body)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
            status: 404,
            body: String::new(),
        }),
        Err(e) => Err(FetchError::Transport(e.to_string())),
    }
}

#[cfg(feature = "runtime")]
#[async_trait(?Send)]
impl CssFetcher for DirFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let Some(path) = self.resolve(url) else {
            return Ok(FetchResponse {
                status: 403,
                body: String::new(),
            });
        };
        response_from_read(tokio::fs::read_to_string(path).await)
    }

    async fn fetch_all(&self, urls: &[String]) -> Vec<Result<FetchResponse, FetchError>> {
        let mut results: Vec<Result<FetchResponse, FetchError>> = urls
            .iter()
            .map(|_| Err(FetchError::Transport("request did not complete".to_string())))
            .collect();

        let mut set = tokio::task::JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            match self.resolve(url) {
                Some(path) => {
                    set.spawn(async move { (index, tokio::fs::read_to_string(path).await) });
                }
                None => {
                    results[index] = Ok(FetchResponse {
                        status: 403,
                        body: String::new(),
                    });
                }
            }
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, read)) => results[index] = response_from_read(read),
                Err(e) => tracing::warn!("Stylesheet read task failed: {}", e),
            }
        }
        results
    }
}
