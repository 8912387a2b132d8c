//! Reload endpoint resolution.
//!
//! The reload socket lives on the same host and port as the page being
//! watched. Secure pages (`https`) use `wss`, everything else uses `ws`.
//!
//! ```text
//! http://localhost:3000/docs   ->  ws://localhost:3000/ws/reload
//! https://preview.example.com  ->  wss://preview.example.com/ws/reload
//! ```

use std::fmt;

use url::Url;

/// Default path of the reload socket on the development server.
pub const DEFAULT_RELOAD_PATH: &str = "/ws/reload";

/// Error resolving the reload endpoint from a page URL.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Invalid page URL {url}: {source}")]
    Malformed {
        url: String,
        source: url::ParseError,
    },
    #[error("Page URL must start with http:// or https://: {0}")]
    UnsupportedScheme(String),
    #[error("Page URL has no host: {0}")]
    MissingHost(String),
    #[error("Reload path must start with '/': {0}")]
    InvalidPath(String),
}

/// Page scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// WebSocket scheme matching the page scheme.
    #[must_use]
    pub fn socket_scheme(self) -> &'static str {
        match self {
            Self::Http => "ws",
            Self::Https => "wss",
        }
    }
}

/// Location of the watched page: protocol, hostname and optional port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLocation {
    pub scheme: Scheme,
    /// Hostname, IPv6 literals keep their brackets.
    pub hostname: String,
    /// Explicit port, if the page URL carries one.
    pub port: Option<u16>,
}

impl PageLocation {
    /// Parse a page URL such as `http://localhost:3000/index.html`.
    ///
    /// Userinfo, path, query and fragment are ignored. Default ports
    /// (80 for `http`, 443 for `https`) are dropped, as a browser would.
    pub fn parse(page_url: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(page_url).map_err(|source| EndpointError::Malformed {
            url: page_url.to_owned(),
            source,
        })?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            _ => return Err(EndpointError::UnsupportedScheme(page_url.to_owned())),
        };
        let hostname = url
            .host_str()
            .filter(|host| !url.cannot_be_a_base() && !host.is_empty())
            .ok_or_else(|| EndpointError::MissingHost(page_url.to_owned()))?;

        Ok(Self {
            scheme,
            hostname: hostname.to_owned(),
            port: url.port(),
        })
    }

    /// `host` or `host:port`, as the page would report it.
    #[must_use]
    pub fn host_and_port(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.hostname),
            None => self.hostname.clone(),
        }
    }

    /// Reload socket URL at the default path.
    #[must_use]
    pub fn reload_url(&self) -> String {
        self.socket_url(DEFAULT_RELOAD_PATH)
    }

    /// Socket URL at an arbitrary absolute `path`.
    #[must_use]
    pub fn socket_url(&self, path: &str) -> String {
        format!(
            "{}://{}{path}",
            self.scheme.socket_scheme(),
            self.host_and_port()
        )
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self.scheme {
            Scheme::Http => "http",
            Scheme::Https => "https",
        };
        write!(f, "{scheme}://{}", self.host_and_port())
    }
}

/// Resolve the reload socket URL for `page_url` at `path`.
pub fn resolve_reload_url(page_url: &str, path: &str) -> Result<String, EndpointError> {
    if !path.starts_with('/') {
        return Err(EndpointError::InvalidPath(path.to_owned()));
    }
    Ok(PageLocation::parse(page_url)?.socket_url(path))
}
#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_http_page_uses_ws() {
        let location = PageLocation::parse("http://localhost:3000/").unwrap();
        assert_eq!(location.reload_url(), "ws://localhost:3000/ws/reload");
    }

    #[test]
    fn test_https_page_uses_wss() {
        let location = PageLocation::parse("https://preview.example.com/docs/index.html").unwrap();
        assert_eq!(location.scheme, Scheme::Https);
        assert_eq!(location.port, None);
        assert_eq!(location.reload_url(), "wss://preview.example.com/ws/reload");
    }

    #[test]
    fn test_port_only_included_when_explicit() {
        let with_port = PageLocation::parse("https://example.com:8443").unwrap();
        let without_port = PageLocation::parse("http://example.com").unwrap();

        assert_eq!(with_port.reload_url(), "wss://example.com:8443/ws/reload");
        assert_eq!(without_port.reload_url(), "ws://example.com/ws/reload");
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let location = PageLocation::parse("http://127.0.0.1:7979?page=1#top").unwrap();
        assert_eq!(location.hostname, "127.0.0.1");
        assert_eq!(location.port, Some(7979));
    }

    #[test]
    fn test_ipv6_host() {
        let location = PageLocation::parse("http://[::1]:3000/").unwrap();
        assert_eq!(location.hostname, "[::1]");
        assert_eq!(location.reload_url(), "ws://[::1]:3000/ws/reload");

        let location = PageLocation::parse("http://[::1]/").unwrap();
        assert_eq!(location.port, None);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let location = PageLocation::parse("HTTPS://example.com").unwrap();
        assert_eq!(location.scheme, Scheme::Https);
    }

    #[test]
    fn test_trailing_colon_means_default_port() {
        let location = PageLocation::parse("http://example.com:/").unwrap();
        assert_eq!(location.port, None);
    }

    #[test]
    fn test_default_port_is_dropped() {
        let location = PageLocation::parse("https://example.com:443/").unwrap();
        assert_eq!(location.port, None);
        assert_eq!(location.reload_url(), "wss://example.com/ws/reload");
    }

    #[test]
    fn test_userinfo_is_ignored() {
        let location = PageLocation::parse("http://user:pw@localhost:3000/").unwrap();
        assert_eq!(location.hostname, "localhost");
        assert_eq!(location.reload_url(), "ws://localhost:3000/ws/reload");
    }

    #[test]
    fn test_unsupported_scheme() {
        for url in ["ftp://example.com", "localhost:3000", "mailto:dev@example.com"] {
            let err = PageLocation::parse(url).unwrap_err();
            assert!(matches!(err, EndpointError::UnsupportedScheme(_)), "{url}: {err:?}");
        }
    }

    #[test]
    fn test_invalid_port() {
        for page_url in [
            "http://localhost:abc",
            "http://localhost:70000",
            "http://localhost:3000:4000/",
        ] {
            let err = PageLocation::parse(page_url).unwrap_err();
            assert_eq!(
                err,
                EndpointError::Malformed {
                    url: page_url.to_owned(),
                    source: url::ParseError::InvalidPort,
                }
            );
        }
    }

    #[test]
    fn test_malformed_authority() {
        for url in [
            "http://",
            "http://:3000",
            "http://::1/",
            "http://local host:3000/",
            "http://[::1]x",
            "not a url",
        ] {
            let err = PageLocation::parse(url).unwrap_err();
            assert!(matches!(err, EndpointError::Malformed { .. }), "{url}: {err:?}");
        }
    }

    #[test]
    fn test_resolve_reload_url_custom_path() {
        let url = resolve_reload_url("http://localhost:3000", "/_dev/reload").unwrap();
        assert_eq!(url, "ws://localhost:3000/_dev/reload");
    }

    #[test]
    fn test_resolve_reload_url_rejects_relative_path() {
        let err = resolve_reload_url("http://localhost:3000", "ws/reload").unwrap_err();
        assert_eq!(err, EndpointError::InvalidPath("ws/reload".to_owned()));
    }

    #[test]
    fn test_display() {
        let location = PageLocation::parse("https://example.com:8443/x").unwrap();
        assert_eq!(location.to_string(), "https://example.com:8443");
    }
}
