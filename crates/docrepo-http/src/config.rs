//! Connection settings for a remote record server
//!
//! Read from the `[backend.http]` table of a repository configuration. Every
//! field may be omitted; the record server is then reached with the defaults
//! below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How [`crate::HttpClient`] talks to the record server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Upper bound for one record request, body transfer included
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Upper bound for establishing the connection to the record server
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Extra attempts after a 5xx, 429 or connection failure.
    /// Conditional writes and deletes are always sent once.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Pause before the first extra attempt; doubles on each one after
    #[serde(default = "default_retry_delay")]
    pub retry_delay: Duration,

    /// Proxy every record request goes through
    #[serde(default)]
    pub proxy: Option<String>,

    /// `User-Agent` the record server sees
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retry_count: default_retry_count(),
            retry_delay: default_retry_delay(),
            proxy: None,
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request is sent exactly once with short deadlines.
    /// Suits a record server on the same host, and tests that count requests.
    pub fn single_attempt() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            retry_count: 0,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_user_agent() -> String {
    format!("docrepo/{}", env!("CARGO_PKG_VERSION"))
}
