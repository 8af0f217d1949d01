//! chromiumoxide による BrowserDriver 実装

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::time::sleep;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::BrowserDriver;

use super::scraper::remove_temp_files;

/// 要素待機のポーリング間隔（ミリ秒）
const WAIT_POLL_INTERVAL_MS: u64 = 250;

pub struct ChromeDriver {
    browser: Option<Browser>,
    page: Option<Page>,
    user_data_dir: PathBuf,
}

impl ChromeDriver {
    /// ヘッドレスChromeを起動して空ページを開く
    pub async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError> {
        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("merchant-mcc-{}", unique_id));

        // Chrome パス（未指定なら chromiumoxide の自動検出に任せる）
        let executable = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .ok();

        Self::launch_with(config, user_data_dir, executable).await
    }

    /// 起動に失敗した場合はプロファイルディレクトリを削除してからエラーを返す
    pub(crate) async fn launch_with(
        config: &ScraperConfig,
        user_data_dir: PathBuf,
        executable: Option<String>,
    ) -> Result<Self, ScraperError> {
        info!("Setting up Chrome browser...");

        match Self::start(config, &user_data_dir, executable).await {
            Ok((browser, page)) => {
                info!("Chrome browser initialized successfully");
                Ok(Self {
                    browser: Some(browser),
                    page: Some(page),
                    user_data_dir,
                })
            }
            Err(e) => {
                remove_temp_files([user_data_dir]);
                Err(e)
            }
        }
    }

    async fn start(
        config: &ScraperConfig,
        user_data_dir: &Path,
        executable: Option<String>,
    ) -> Result<(Browser, Page), ScraperError> {
        let mut builder = BrowserConfig::builder().user_data_dir(user_data_dir);

        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }

        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-logging")
            .arg("--log-level=3");

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ハンドラータスクを起動
        tokio::spawn(
            async move {
                while let Some(event) = handler.next().await {
                    debug!("Browser event: {:?}", event);
                }
            }
            .with_current_subscriber(),
        );

        match browser.new_page("about:blank").await {
            Ok(page) => Ok((browser, page)),
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    debug!("Failed to close browser: {}", close_err);
                }
                if let Err(wait_err) = browser.wait().await {
                    debug!("Failed to wait for browser exit: {}", wait_err);
                }
                Err(ScraperError::BrowserInit(e.to_string()))
            }
        }
    }

    /// 終了時に削除するプロファイルディレクトリ
    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    fn get_page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        let page = self.get_page()?;
        page.goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), ScraperError> {
        let page = self.get_page()?;
        let start = Instant::now();

        loop {
            if page.find_element(selector).await.is_ok() {
                debug!("Element {} found after {:?}", selector, start.elapsed());
                return Ok(());
            }

            if start.elapsed() >= timeout {
                return Err(ScraperError::Timeout(format!(
                    "{} が{}秒以内に表示されませんでした",
                    selector,
                    timeout.as_secs_f64()
                )));
            }

            sleep(Duration::from_millis(WAIT_POLL_INTERVAL_MS)).await;
        }
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        self.get_page()?
            .content()
            .await
            .map_err(|e| ScraperError::Page(e.to_string()))
    }

    async fn screenshot(&mut self) -> Option<Vec<u8>> {
        let page = self.page.as_ref()?;
        page.screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .ok()
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            browser
                .close()
                .await
                .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ終了エラー: {}", e)))?;
            if let Err(e) = browser.wait().await {
                debug!("Failed to wait for browser exit: {}", e);
            }
        }

        info!("Browser closed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_launch_removes_profile_dir() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join("profile");
        std::fs::create_dir_all(profile.join("Default")).unwrap();
        std::fs::write(profile.join("Default").join("Preferences"), "{}").unwrap();

        let missing_chrome = dir.path().join("no-such-chrome");
        let result = ChromeDriver::launch_with(
            &ScraperConfig::default(),
            profile.clone(),
            Some(missing_chrome.to_string_lossy().into_owned()),
        )
        .await;

        match result {
            Err(e) => assert_eq!(e.exit_status().code(), 4),
            Ok(_) => panic!("launch should fail without a Chrome executable"),
        }
        assert!(!profile.exists());
    }

    #[tokio::test]
    #[ignore] // 実環境テスト用: cargo test test_chrome_driver_live -- --ignored --nocapture
    async fn test_chrome_driver_live() {
        let config = ScraperConfig::default();
        let mut driver = ChromeDriver::launch(&config)
            .await
            .expect("Failed to launch browser");

        driver
            .navigate(&config.merchant_url("Grab"))
            .await
            .expect("Navigation failed");
        driver
            .wait_for(crate::merchant::parser::MARKER_SELECTOR, config.wait_timeout)
            .await
            .expect("Marker not found");
        let html = driver.content().await.expect("No content");
        println!("{:?}", crate::merchant::extract_merchant_info(&html));

        driver.close().await.expect("Close failed");
    }
}
