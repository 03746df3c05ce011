use crate::types::{LiveFeedError, Result};
use url::Url;

/// Maps a realtime endpoint to the HTTP origin serving the REST API and the
/// polling transport: `ws → http`, `wss → https`, path reset to `/`, query dropped.
pub fn http_base(endpoint: &Url) -> Result<Url> {
    let mut url = endpoint.clone();
    let scheme = match endpoint.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => {
            return Err(LiveFeedError::Config(format!(
                "unsupported endpoint scheme '{}'",
                other
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| LiveFeedError::Config(format!("cannot use scheme '{}'", scheme)))?;
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Maps an endpoint to its WebSocket form (`http → ws`, `https → wss`); path and query are kept.
pub fn websocket_url(endpoint: &Url) -> Result<Url> {
    let mut url = endpoint.clone();
    let scheme = match endpoint.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => {
            return Err(LiveFeedError::Config(format!(
                "unsupported endpoint scheme '{}'",
                other
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| LiveFeedError::Config(format!("cannot use scheme '{}'", scheme)))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_base_from_secure_socket() {
        let endpoint = Url::parse("wss://feed.example.com/socket?token=abc").unwrap();
        assert_eq!(
            http_base(&endpoint).unwrap().as_str(),
            "https://feed.example.com/"
        );
    }

    #[test]
    fn test_http_base_keeps_port() {
        let endpoint = Url::parse("ws://localhost:5000/socket").unwrap();
        assert_eq!(http_base(&endpoint).unwrap().as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_websocket_url_from_http() {
        let endpoint = Url::parse("https://feed.example.com/socket?v=2").unwrap();
        assert_eq!(
            websocket_url(&endpoint).unwrap().as_str(),
            "wss://feed.example.com/socket?v=2"
        );
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let endpoint = Url::parse("ftp://feed.example.com/").unwrap();
        assert!(http_base(&endpoint).is_err());
        assert!(websocket_url(&endpoint).is_err());
    }
}
