use std::fmt;
use std::time::Duration;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("ProjectDownloader/", env!("CARGO_PKG_VERSION"));

/// Transport configuration shared by every request a client makes.
///
/// Empty strings for `proxy` or `auth_token` are treated as unset.
#[derive(Clone)]
pub struct ClientSettings {
    /// Proxy URL applied to both http and https traffic.
    pub proxy: Option<String>,

    /// Static bearer token, sent as `Authorization` only to `https://` URLs
    /// on the version-control host.
    pub auth_token: Option<String>,

    pub user_agent: String,

    /// Budget for HEAD/GET probes and webhook posts.
    ///
    /// Default: 10s
    pub probe_timeout: Duration,

    /// Maximum silence between body chunks during a transfer.
    ///
    /// Default: 30s
    pub read_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            proxy:         None,
            auth_token:    None,
            user_agent:    USER_AGENT.to_string(),
            probe_timeout: Duration::from_secs(10),
            read_timeout:  Duration::from_secs(30),
        }
    }
}

impl ClientSettings {
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = non_empty(proxy.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = non_empty(token.into());
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("proxy", &self.proxy)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("probe_timeout", &self.probe_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}
