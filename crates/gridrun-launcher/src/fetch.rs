//! Whitelist-checked document downloads.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::FetchError;
use crate::ports::DocumentFetcher;

/// Downloads documents whose URL starts with one of the configured prefixes.
#[derive(Debug, Clone)]
pub struct WhitelistedFetcher {
    inner: reqwest::Client,
    whitelist: Vec<String>,
}

impl WhitelistedFetcher {
    pub fn new(whitelist: Vec<String>) -> Self {
        Self {
            inner: reqwest::Client::new(),
            whitelist,
        }
    }

    /// Reject URLs outside the whitelist.
    pub fn check(&self, url: &str) -> Result<(), FetchError> {
        if self.whitelist.iter().any(|prefix| url.starts_with(prefix.as_str())) {
            Ok(())
        } else {
            Err(FetchError::InvalidUrl {
                url: url.to_string(),
                whitelist: self.whitelist.clone(),
            })
        }
    }
}

#[async_trait]
impl DocumentFetcher for WhitelistedFetcher {
    async fn open_stream(&self, url: &str) -> Result<Bytes, FetchError> {
        self.check(url)?;
        debug!(url = %url, "Downloading document");

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        self.inner
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(transport)?
            .bytes()
            .await
            .map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use axum::Router;

    async fn serve() -> String {
        let router = Router::new().route("/gridrun/raorequest.xml", get(|| async { "<RequestMessage/>" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_check_matches_prefixes() {
        let fetcher = WhitelistedFetcher::new(vec![
            "http://minio:9000/".to_string(),
            "https://storage.example/".to_string(),
        ]);

        assert!(fetcher.check("http://minio:9000/gridrun/cgm.zip").is_ok());
        assert!(fetcher.check("https://storage.example/x").is_ok());
        assert!(matches!(
            fetcher.check("http://other:9000/gridrun/cgm.zip"),
            Err(FetchError::InvalidUrl { whitelist, .. }) if whitelist.len() == 2
        ));
    }

    #[tokio::test]
    async fn test_open_stream_downloads_whitelisted_url() {
        let base = serve().await;
        let fetcher = WhitelistedFetcher::new(vec![base.clone()]);

        let bytes = fetcher
            .open_stream(&format!("{}/gridrun/raorequest.xml", base))
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<RequestMessage/>");

        let missing = fetcher.open_stream(&format!("{}/gridrun/absent.xml", base)).await;
        assert!(matches!(missing, Err(FetchError::Transport { .. })));
    }
}
