//! Origin (scheme + host + port) an interceptor is scoped to.

use http::Uri;
use std::fmt;

/// Supported origin schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            _ => None,
        }
    }
}

/// Normalized origin with an explicit port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

/// Hostname could not be turned into an origin
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    #[error("invalid hostname {hostname:?}: {reason}")]
    Invalid { hostname: String, reason: String },
    #[error("unsupported scheme {scheme:?} in hostname {hostname:?}")]
    UnsupportedScheme { hostname: String, scheme: String },
    #[error("hostname {hostname:?} must not contain a path or query")]
    HasPath { hostname: String },
}

impl Origin {
    pub fn new(scheme: Scheme, host: &str, port: Option<u16>) -> Self {
        Self {
            scheme,
            host: host.to_ascii_lowercase(),
            port: port.unwrap_or_else(|| scheme.default_port()),
        }
    }

    /// Parse `https://api.example.com`, `http://localhost:3000/` or a bare
    /// `api.example.com` (scheme defaults to http).
    pub fn parse(hostname: &str) -> Result<Self, OriginError> {
        let trimmed = hostname.trim();
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("http://{trimmed}")
        };

        let uri: Uri = with_scheme.parse().map_err(|e: http::uri::InvalidUri| {
            OriginError::Invalid {
                hostname: hostname.to_owned(),
                reason: e.to_string(),
            }
        })?;

        let scheme_str = uri.scheme_str().unwrap_or("http");
        let scheme = Scheme::parse(scheme_str).ok_or_else(|| OriginError::UnsupportedScheme {
            hostname: hostname.to_owned(),
            scheme: scheme_str.to_owned(),
        })?;

        let host = match uri.host() {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(OriginError::Invalid {
                    hostname: hostname.to_owned(),
                    reason: "missing host".into(),
                })
            }
        };

        if let Some(pq) = uri.path_and_query() {
            if pq.as_str() != "/" && !pq.as_str().is_empty() {
                return Err(OriginError::HasPath {
                    hostname: hostname.to_owned(),
                });
            }
        }

        Ok(Self::new(scheme, host, uri.port_u16()))
    }

    /// Origin of an absolute-form request URI (`http://host/path`).
    pub fn from_uri(uri: &Uri) -> Option<Self> {
        let scheme = Scheme::parse(uri.scheme_str()?)?;
        let host = uri.host()?;
        Some(Self::new(scheme, host, uri.port_u16()))
    }

    /// Origin of an origin-form request from its `Host` header value.
    pub fn from_host_header(scheme: Scheme, host_header: &str) -> Option<Self> {
        let authority: http::uri::Authority = host_header.trim().parse().ok()?;
        if authority.host().is_empty() {
            return None;
        }
        Some(Self::new(scheme, authority.host(), authority.port_u16()))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://api.example.com", Scheme::Https, "api.example.com", 443)]
    #[case("http://api.example.com", Scheme::Http, "api.example.com", 80)]
    #[case("http://localhost:3000", Scheme::Http, "localhost", 3000)]
    #[case("https://API.Example.com/", Scheme::Https, "api.example.com", 443)]
    #[case("api.test", Scheme::Http, "api.test", 80)]
    #[case("  https://api.test:8443 ", Scheme::Https, "api.test", 8443)]
    fn test_parse_origin(
        #[case] input: &str,
        #[case] scheme: Scheme,
        #[case] host: &str,
        #[case] port: u16,
    ) {
        let origin = Origin::parse(input).expect("Should parse origin");
        assert_eq!(origin.scheme, scheme);
        assert_eq!(origin.host, host);
        assert_eq!(origin.port, port);
    }

    #[rstest]
    fn test_explicit_default_port_is_equivalent() {
        assert_eq!(
            Origin::parse("https://api.test:443").unwrap(),
            Origin::parse("https://api.test").unwrap()
        );
    }

    #[rstest]
    #[case("ftp://api.test")]
    #[case("ws://api.test")]
    fn test_parse_unsupported_scheme(#[case] input: &str) {
        assert!(matches!(
            Origin::parse(input),
            Err(OriginError::UnsupportedScheme { .. })
        ));
    }

    #[rstest]
    #[case("https://api.test/users")]
    #[case("https://api.test/?page=1")]
    fn test_parse_rejects_path(#[case] input: &str) {
        assert!(matches!(
            Origin::parse(input),
            Err(OriginError::HasPath { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("https://")]
    #[case("http://exa mple.com")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(Origin::parse(input).is_err());
    }

    #[rstest]
    fn test_from_uri() {
        let uri: Uri = "https://api.test/users?x=1".parse().unwrap();
        assert_eq!(
            Origin::from_uri(&uri),
            Some(Origin::new(Scheme::Https, "api.test", None))
        );

        let origin_form: Uri = "/users".parse().unwrap();
        assert_eq!(Origin::from_uri(&origin_form), None);
    }

    #[rstest]
    #[case("api.test", 80)]
    #[case("api.test:8080", 8080)]
    fn test_from_host_header(#[case] header: &str, #[case] port: u16) {
        let origin = Origin::from_host_header(Scheme::Http, header).unwrap();
        assert_eq!(origin.host, "api.test");
        assert_eq!(origin.port, port);
    }

    #[rstest]
    fn test_display() {
        let origin = Origin::parse("https://api.test").unwrap();
        assert_eq!(origin.to_string(), "https://api.test:443");
    }
}
