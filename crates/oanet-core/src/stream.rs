//! Blocking HTTP GET over async reqwest.
//!
//! Uses async reqwest internally on a shared tokio runtime, but presents a
//! sync interface so pagination stays pull-based on the caller's thread.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for transport operations
#[derive(Debug)]
pub enum StreamError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for StreamError {}

impl StreamError {
    /// Create HTTP error from reqwest error.
    ///
    /// The URL is stripped so query strings (mailto) do not end up in logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Io(_) => None,
        }
    }

    /// Rate limiting (429), server errors (5xx) and connection failures
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => is_retryable_status(*status),
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// `None` = no response at all (connection refused, reset, ...)
pub fn is_retryable_status(status: Option<u16>) -> bool {
    matches!(status, None | Some(429) | Some(500..=599))
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Build an HTTP client with the given `User-Agent`.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, StreamError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .map_err(StreamError::from_reqwest)
}

/// Status and body of a completed request.
///
/// Non-2xx responses are returned as-is; judging the status is left to
/// the caller, which knows which entity the request was for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP GET with query parameters, blocking until the body is read.
pub fn http_get(
    client: &reqwest::Client,
    url: &str,
    params: &[(String, String)],
) -> Result<HttpResponse, StreamError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(StreamError::from_reqwest)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(StreamError::from_reqwest)?;
        Ok(HttpResponse { status, body })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn http_err(status: u16) -> StreamError {
        StreamError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn http_429_retryable() {
        assert!(http_err(429).is_retryable());
    }

    #[test]
    fn http_503_retryable() {
        assert!(http_err(503).is_retryable());
    }

    #[test]
    fn http_404_not_retryable() {
        assert!(!http_err(404).is_retryable());
    }

    #[test]
    fn http_400_not_retryable() {
        assert!(!http_err(400).is_retryable());
    }

    #[test]
    fn http_none_status_retryable() {
        let err = StreamError::Http {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn io_storage_full_not_retryable() {
        let err = StreamError::Io(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn display_http_with_status() {
        assert_eq!(format!("{}", http_err(404)), "HTTP 404: test");
    }

    #[test]
    fn display_http_without_status() {
        let err = StreamError::Http {
            status: None,
            message: "timeout".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP error: timeout");
    }

    #[test]
    fn response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let limited = HttpResponse {
            status: 429,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!limited.is_success());
    }
}
