//! 加盟店スクレイパー実装
//!
//! 入力リストを順番に処理し、最初の失敗で全体を中断する。

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use base64::Engine;
use chrono::Local;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::BrowserDriver;

use super::parser::{extract_merchant_info, MARKER_SELECTOR};
use super::store::RecordWriter;
use super::types::{title_case, MerchantRecord, ScrapeSummary};

/// 加盟店スクレイパー
pub struct MerchantScraper<D: BrowserDriver> {
    config: ScraperConfig,
    driver: Option<D>,
    temp_files: Vec<PathBuf>,
}

impl<D: BrowserDriver> MerchantScraper<D> {
    pub fn new(config: ScraperConfig, driver: D) -> Self {
        let temp_files = config.temp_files.clone();
        Self {
            config,
            driver: Some(driver),
            temp_files,
        }
    }

    /// 終了時に削除する一時ファイルを追加
    pub fn with_temp_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_files.push(path.into());
        self
    }

    /// 一括実行（CSV作成 → 全件処理 → 後片付け）
    ///
    /// 成否にかかわらずブラウザを閉じ、一時ファイルを削除する。
    pub async fn execute(
        &mut self,
        stores: &[String],
        csv_path: PathBuf,
    ) -> Result<ScrapeSummary, ScraperError> {
        let result = match RecordWriter::create(&csv_path) {
            Ok(mut writer) => self.run(stores, &mut writer).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!("Exiting due to error: {}", e);
        }
        self.cleanup().await;

        let processed = result?;
        Ok(ScrapeSummary {
            csv_path,
            processed,
        })
    }

    /// 全件を順番に処理する。戻り値は処理件数
    pub async fn run<W: Write>(
        &mut self,
        stores: &[String],
        writer: &mut RecordWriter<W>,
    ) -> Result<usize, ScraperError> {
        let total = stores.len();

        for (index, store) in stores.iter().enumerate() {
            let counter = index + 1;
            info!(
                "Processing {} of {} ({:.1}%)",
                counter,
                total,
                counter as f64 / total as f64 * 100.0
            );

            let record = match self.process(store).await {
                Ok(record) => record,
                Err(e) => {
                    match &e {
                        ScraperError::ElementNotFound(_) | ScraperError::Timeout(_) => {
                            error!("{}", e)
                        }
                        other => error!("Error processing {}: {:?}", title_case(store), other),
                    }
                    return Err(e);
                }
            };

            if let Err(e) = writer.append(&record) {
                error!("Error processing {}: {:?}", record.name, e);
                return Err(e);
            }

            info!("Successfully processed: {}", record.name);
            info!("MCC: {}", record.mcc);
            info!("Type: {}", record.merchant_type);
            info!("Processing time: {}s", record.processing_time);
        }

        Ok(total)
    }

    /// 1件処理（遷移 → マーカー待機 → 描画待ち → 抽出）
    async fn process(&mut self, store: &str) -> Result<MerchantRecord, ScraperError> {
        let start = Instant::now();
        let name = title_case(store);
        let url = self.config.merchant_url(&name);
        info!("Processing URL: {}", url);

        let wait_timeout = self.config.wait_timeout;
        let settle_delay = self.config.settle_delay;
        let debug_mode = self.config.debug;

        let driver = self
            .driver
            .as_mut()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))?;

        driver.navigate(&url).await?;

        driver
            .wait_for(MARKER_SELECTOR, wait_timeout)
            .await
            .map_err(|e| match e {
                ScraperError::Timeout(_) => {
                    ScraperError::Timeout(format!("Timeout waiting for element on {}", name))
                }
                other => other,
            })?;

        sleep(settle_delay).await;

        let html = driver.content().await?;
        let info = match extract_merchant_info(&html) {
            Some(info) => info,
            None => {
                if debug_mode {
                    if let Some(png) = driver.screenshot().await {
                        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
                        debug!("Page screenshot: data:image/png;base64,{}", encoded);
                    }
                }
                return Err(ScraperError::ElementNotFound(format!(
                    "No element found for: {}",
                    name
                )));
            }
        };

        let processing_time = (start.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        Ok(MerchantRecord {
            name,
            mcc: info.mcc,
            merchant_type: info.merchant_type,
            timestamp: Local::now().naive_local(),
            processing_time,
        })
    }

    /// ブラウザ終了と一時ファイル削除（失敗はログのみ）
    pub async fn cleanup(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            if let Err(e) = driver.close().await {
                error!("Error during cleanup: {}", e);
            }
        }

        remove_temp_files(self.temp_files.drain(..));
    }
}

/// 一時ファイル・ディレクトリを削除する（失敗はログのみ）
pub fn remove_temp_files(paths: impl IntoIterator<Item = PathBuf>) {
    for path in paths {
        if !path.exists() {
            continue;
        }
        let removed = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match removed {
            Ok(()) => info!("Removed temporary file: {}", path.display()),
            Err(e) => error!("Error during cleanup of {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::merchant::parser::TARGET_CLASS;
    use crate::merchant::types::ExitStatus;

    /// ページ応答を台本化した BrowserDriver
    #[derive(Clone)]
    enum Script {
        Label(&'static str),
        NoLabel,
        Timeout,
        NavigationError,
    }

    #[derive(Default)]
    struct Calls {
        visited: Vec<String>,
        closed: bool,
    }

    struct FakeDriver {
        pages: HashMap<String, Script>,
        current: Option<Script>,
        calls: Arc<Mutex<Calls>>,
    }

    impl FakeDriver {
        fn new(pages: &[(&str, Script)]) -> (Self, Arc<Mutex<Calls>>) {
            let calls = Arc::new(Mutex::new(Calls::default()));
            let driver = Self {
                pages: pages
                    .iter()
                    .map(|(url, s)| (format!("http://test/{}", url), s.clone()))
                    .collect(),
                current: None,
                calls: calls.clone(),
            };
            (driver, calls)
        }
    }

    #[async_trait]
    impl BrowserDriver for FakeDriver {
        async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
            self.calls.lock().unwrap().visited.push(url.to_string());
            let script = self.pages.get(url).cloned().unwrap_or(Script::NoLabel);
            if let Script::NavigationError = script {
                return Err(ScraperError::Navigation("net::ERR_FAILED".into()));
            }
            self.current = Some(script);
            Ok(())
        }

        async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<(), ScraperError> {
            match self.current {
                Some(Script::Timeout) => Err(ScraperError::Timeout(selector.to_string())),
                _ => Ok(()),
            }
        }

        async fn content(&mut self) -> Result<String, ScraperError> {
            Ok(match &self.current {
                Some(Script::Label(label)) => format!(
                    r#"<div class="font-inter"><span class="{}">{}</span></div>"#,
                    TARGET_CLASS, label
                ),
                _ => r#"<div class="font-inter">Not found</div>"#.to_string(),
            })
        }

        async fn close(&mut self) -> Result<(), ScraperError> {
            self.calls.lock().unwrap().closed = true;
            Ok(())
        }
    }

    fn test_config() -> ScraperConfig {
        ScraperConfig::default()
            .with_base_url("http://test/")
            .with_settle_delay(Duration::ZERO)
            .with_wait_timeout(Duration::from_millis(10))
    }

    fn stores(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn csv_lines(path: &std::path::Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out.csv");
        let (driver, calls) = FakeDriver::new(&[]);

        let mut scraper = MerchantScraper::new(test_config(), driver);
        let summary = scraper.execute(&[], csv_path.clone()).await.unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(
            csv_lines(&csv_path),
            vec!["Store,MCC,Type,Timestamp,Processing Time (s)"]
        );
        assert!(calls.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out.csv");
        let (driver, calls) = FakeDriver::new(&[
            ("Grab", Script::Label("4121 (Taxicabs/Limousines)")),
            ("Shopee Mall", Script::Label("5399 (Misc. General Merchandise)")),
        ]);

        let mut scraper = MerchantScraper::new(test_config(), driver);
        let summary = scraper
            .execute(&stores(&["grab", "shopee mall"]), csv_path.clone())
            .await
            .unwrap();

        assert_eq!(summary.processed, 2);
        let lines = csv_lines(&csv_path);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Grab,4121,Taxicabs/Limousines,"));
        assert!(lines[2].starts_with("Shopee Mall,5399,Misc. General Merchandise,"));
        assert_eq!(
            calls.lock().unwrap().visited,
            vec!["http://test/Grab", "http://test/Shopee Mall"]
        );
    }

    #[tokio::test]
    async fn test_missing_element_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out.csv");
        let (driver, calls) = FakeDriver::new(&[
            ("Grab", Script::Label("4121 (Taxicabs)")),
            ("Ghost", Script::NoLabel),
            ("Shopee", Script::Label("5399 (Merchandise)")),
        ]);

        let mut scraper = MerchantScraper::new(test_config(), driver);
        let err = scraper
            .execute(&stores(&["grab", "ghost", "shopee"]), csv_path.clone())
            .await
            .unwrap_err();

        assert_eq!(err.exit_status(), ExitStatus::NoElement);
        assert_eq!(err.exit_status().code(), 1);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.visited, vec!["http://test/Grab", "http://test/Ghost"]);
        assert!(calls.closed);
        // 失敗前に書いた行は残る
        assert_eq!(csv_lines(&csv_path).len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_aborts_with_code_2() {
        let dir = tempfile::tempdir().unwrap();
        let (driver, calls) = FakeDriver::new(&[("Slow", Script::Timeout)]);

        let mut scraper = MerchantScraper::new(test_config(), driver);
        let err = scraper
            .execute(&stores(&["slow", "next"]), dir.path().join("out.csv"))
            .await
            .unwrap_err();

        assert_eq!(err.exit_status().code(), 2);
        assert_eq!(calls.lock().unwrap().visited.len(), 1);
    }

    #[tokio::test]
    async fn test_navigation_error_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let (driver, _calls) = FakeDriver::new(&[("Broken", Script::NavigationError)]);

        let mut scraper = MerchantScraper::new(test_config(), driver);
        let err = scraper
            .execute(&stores(&["broken"]), dir.path().join("out.csv"))
            .await
            .unwrap_err();

        assert_eq!(err.exit_status(), ExitStatus::UnknownError);
    }

    #[tokio::test]
    async fn test_unwritable_csv_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("no_such_dir").join("out.csv");
        let (driver, calls) = FakeDriver::new(&[]);

        let mut scraper = MerchantScraper::new(test_config(), driver);
        let err = scraper.execute(&[], csv_path).await.unwrap_err();

        assert_eq!(err.exit_status(), ExitStatus::FileError);
        assert!(calls.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_cleanup_removes_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let temp_file = dir.path().join("scratch.tmp");
        let temp_dir = dir.path().join("profile");
        std::fs::write(&temp_file, "x").unwrap();
        std::fs::create_dir_all(temp_dir.join("Default")).unwrap();

        let (driver, _calls) = FakeDriver::new(&[("Ghost", Script::NoLabel)]);
        let config = test_config().with_temp_file(&temp_file);
        let mut scraper = MerchantScraper::new(config, driver)
            .with_temp_file(&temp_dir)
            .with_temp_file(dir.path().join("never_created"));

        let result = scraper
            .execute(&stores(&["ghost"]), dir.path().join("out.csv"))
            .await;

        assert!(result.is_err());
        assert!(!temp_file.exists());
        assert!(!temp_dir.exists());
    }
}
