use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::FetchMiss;
use crate::settings::Settings;

/// Anything that can turn a URL into page markup.
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchMiss>;
}

/// Shared HTTP fetcher. One client for the run, a permit pool capping
/// in-flight requests, per-request timeout and bounded retry.
pub struct HtmlFetcher {
    client: reqwest::Client,
    permits: Semaphore,
    max_retries: u32,
    backoff: Duration,
}

impl HtmlFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: reqwest::Client, settings: &Settings) -> Self {
        Self {
            client,
            permits: Semaphore::new(settings.max_concurrency.max(1)),
            max_retries: settings.max_retries,
            backoff: settings.retry_backoff(),
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchMiss> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchMiss::Transport("fetch pool closed".into()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchMiss::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// `base * 2^attempt`, saturating instead of overflowing on large attempt counts.
fn backoff_for(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

impl PageSource for HtmlFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchMiss> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(miss) if miss.is_retryable() && attempt < self.max_retries => {
                    let backoff = backoff_for(self.backoff, attempt);
                    attempt += 1;
                    warn!(
                        "{} on {} (attempt {}/{}), backing off {:.1}s",
                        miss,
                        url,
                        attempt,
                        self.max_retries,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(miss) => {
                    debug!("Fetch miss for {}: {}", url, miss);
                    return Err(miss);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Loopback server answering every connection with the same status and body.
    async fn serve(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response(status, body).as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/page", addr), hits)
    }

    fn fetcher(max_retries: u32) -> HtmlFetcher {
        fetcher_with(Settings {
            max_retries,
            retry_backoff_ms: 1,
            timeout_secs: 5,
            ..Settings::default()
        })
    }

    fn fetcher_with(settings: Settings) -> HtmlFetcher {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .no_proxy()
            .build()
            .unwrap();
        HtmlFetcher::with_client(client, &settings)
    }

    #[tokio::test]
    async fn ok_returns_body() {
        let (url, _) = serve("200 OK", "<p>hi</p>").await;
        let body = fetcher(0).fetch(&url).await.unwrap();
        assert_eq!(body, "<p>hi</p>");
    }

    #[tokio::test]
    async fn not_found_is_a_miss_without_retry() {
        let (url, hits) = serve("404 Not Found", "nope").await;
        let miss = fetcher(3).fetch(&url).await.unwrap_err();
        assert_eq!(miss, FetchMiss::Status(404));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_error_is_retried_up_to_the_bound() {
        let (url, hits) = serve("503 Service Unavailable", "busy").await;
        let miss = fetcher(2).fetch(&url).await.unwrap_err();
        assert_eq!(miss, FetchMiss::Status(503));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let fetcher = fetcher_with(Settings {
            timeout_secs: 1,
            max_retries: 0,
            ..Settings::default()
        });
        let miss = fetcher.fetch(&format!("http://{}/slow", addr)).await.unwrap_err();
        assert_eq!(miss, FetchMiss::Timeout);
    }

    #[tokio::test]
    async fn in_flight_requests_respect_the_pool() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (cur, top) = (Arc::clone(&current), Arc::clone(&peak));

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let now = cur.fetch_add(1, Ordering::SeqCst) + 1;
                top.fetch_max(now, Ordering::SeqCst);
                let cur = Arc::clone(&cur);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    // Released before answering, so the client cannot start
                    // its next request while this one still counts.
                    cur.fetch_sub(1, Ordering::SeqCst);
                    let _ = socket.write_all(response("200 OK", "ok").as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        let fetcher = fetcher_with(Settings {
            max_concurrency: 2,
            max_retries: 0,
            timeout_secs: 5,
            ..Settings::default()
        });
        let url = format!("http://{}/page", addr);
        let results = futures::future::join_all((0..6).map(|_| fetcher.fetch(&url))).await;

        assert!(results.iter().all(|r| r.as_deref() == Ok("ok")));
        let peak = peak.load(Ordering::SeqCst);
        assert!((1..=2).contains(&peak), "peak in-flight was {}", peak);
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_for(base, 0), Duration::from_millis(500));
        assert_eq!(backoff_for(base, 2), Duration::from_millis(2000));
        assert_eq!(backoff_for(base, 40), base.saturating_mul(u32::MAX));
    }
}
