use crate::shortener::{ClickInfo, Shortener};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_CLICK_TIMEOUT: Duration = Duration::from_secs(5);

/// Records a click on a detached task bounded by `timeout`.
///
/// The caller does not wait for the result. Failures and timeouts are only
/// logged; the handle is returned for tests and is normally dropped.
pub fn spawn_track_click(
    shortener: Arc<dyn Shortener>,
    click: ClickInfo,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let code = click.short_code.clone();
        match tokio::time::timeout(timeout, shortener.track_click(click)).await {
            Ok(Ok(())) => debug!(code = %code, "click tracked"),
            Ok(Err(e)) => warn!(code = %code, error = %e, "failed to track click"),
            Err(_) => warn!(
                code = %code,
                timeout_ms = timeout.as_millis() as u64,
                "click tracking timed out"
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::shortener::{ShortenParams, ShortenedUrl};
    use crate::{ShortenerService, ShortenerSettings};
    use async_trait::async_trait;
    use linkhop_core::{ReadRepository, ShortCode, UrlRecord};
    use linkhop_generator::{RandomGenerator, RandomGeneratorSettings};
    use linkhop_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Never finishes tracking a click.
    struct StuckShortener {
        finished: AtomicBool,
    }

    #[async_trait]
    impl Shortener for StuckShortener {
        async fn shorten(&self, _: ShortenParams) -> Result<ShortenedUrl> {
            unimplemented!()
        }
        async fn resolve(&self, _: &str) -> Result<UrlRecord> {
            unimplemented!()
        }
        async fn track_click(&self, _: ClickInfo) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(())
        }
        async fn list_urls(&self, _: i64) -> Result<Vec<UrlRecord>> {
            unimplemented!()
        }
        async fn popular_urls(&self, _: i64) -> Result<Vec<UrlRecord>> {
            unimplemented!()
        }
    }

    fn click(code: &str) -> ClickInfo {
        ClickInfo {
            short_code: code.to_string(),
            user_agent: "curl/8.5".to_string(),
            ip: "127.0.0.1".to_string(),
            referer: String::new(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tracks_click_in_background() {
        let repo = Arc::new(InMemoryRepository::new());
        let generator =
            RandomGenerator::new(RandomGeneratorSettings::builder().build()).unwrap();
        let service = ShortenerService::new(
            Arc::clone(&repo),
            generator,
            ShortenerSettings::builder().base_url("http://localhost").build(),
        );
        service
            .shorten(ShortenParams {
                original_url: "https://example.com".to_string(),
                custom_alias: Some("bg".to_string()),
            })
            .await
            .unwrap();
        let shortener: Arc<dyn Shortener> = Arc::new(service);

        spawn_track_click(shortener, click("bg"), DEFAULT_CLICK_TIMEOUT);

        let code = ShortCode::new_unchecked("bg");
        awaitility::at_most(Duration::from_secs(2))
            .poll_interval(Duration::from_millis(10))
            .until_async(|| async {
                repo.get(&code).await.unwrap().is_some_and(|r| r.clicks == 1)
            })
            .await;
    }

    #[tokio::test]
    async fn failures_stay_inside_the_task() {
        let repo = Arc::new(InMemoryRepository::new());
        let generator =
            RandomGenerator::new(RandomGeneratorSettings::builder().build()).unwrap();
        let shortener: Arc<dyn Shortener> = Arc::new(ShortenerService::new(
            repo,
            generator,
            ShortenerSettings::builder().base_url("http://localhost").build(),
        ));

        let handle = spawn_track_click(shortener, click("missing"), DEFAULT_CLICK_TIMEOUT);
        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_timeout() {
        let stuck = Arc::new(StuckShortener {
            finished: AtomicBool::new(false),
        });

        let handle = spawn_track_click(stuck.clone(), click("slow"), Duration::from_secs(5));
        handle.await.unwrap();

        assert!(!stuck.finished.load(Ordering::SeqCst));
    }
}
