use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::Local;
use tower::Service;
use tracing::instrument::WithSubscriber;
use tracing::{error, info, Dispatch};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::logging::RunLog;
use crate::merchant::{read_store_list, remove_temp_files, ChromeDriver, MerchantScraper};

/// スクレイピングリクエスト
#[derive(Clone)]
pub struct ScrapeRequest {
    pub config: ScraperConfig,
    pub log: Option<RunLog>,
}

impl ScrapeRequest {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config, log: None }
    }

    pub fn with_log(mut self, log: RunLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.wait_timeout = timeout;
        self
    }

    /// `merchant_data_%Y%m%d_%H%M%S.csv`
    pub fn csv_path(&self) -> PathBuf {
        self.config.output_dir.join(format!(
            "merchant_data_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    }
}

/// スクレイピング結果
#[derive(Debug)]
pub struct ScrapeResult {
    pub csv_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub processed: usize,
}

/// tower::Serviceを実装したスクレイパーサービス
#[derive(Debug, Clone, Default)]
pub struct ScraperService {}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

async fn scrape(req: ScrapeRequest) -> Result<ScrapeResult, ScraperError> {
    let config = req.config.clone();
    let csv_path = req.csv_path();
    let log_path = req.log.as_ref().map(|log| log.path().to_path_buf());

    let stores = match read_store_list(&config.input_path) {
        Ok(stores) => stores,
        Err(e) => {
            error!("Exiting due to error: Failed to read {}: {}", config.input_path.display(), e);
            remove_temp_files(config.temp_files.clone());
            return Err(e);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        error!(
            "Exiting due to error: Failed to create {}: {}",
            config.output_dir.display(),
            e
        );
        remove_temp_files(config.temp_files.clone());
        return Err(e.into());
    }

    let driver = match ChromeDriver::launch(&config).await {
        Ok(driver) => driver,
        Err(e) => {
            error!("Exiting due to error: Failed to initialize browser: {}", e);
            remove_temp_files(config.temp_files.clone());
            return Err(e);
        }
    };
    let profile_dir = driver.user_data_dir().to_path_buf();

    let mut scraper = MerchantScraper::new(config, driver).with_temp_file(profile_dir);
    let summary = scraper.execute(&stores, csv_path).await?;

    info!("Processing complete! {} stores processed", summary.processed);
    info!("Data has been saved to {}", summary.csv_path.display());
    if let Some(path) = &log_path {
        info!("Logs have been saved to {}", path.display());
    }

    Ok(ScrapeResult {
        csv_path: summary.csv_path,
        log_path,
        processed: summary.processed,
    })
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        let dispatch = req
            .log
            .as_ref()
            .map(RunLog::dispatch)
            .unwrap_or_else(|| tracing::dispatcher::get_default(Dispatch::clone));
        Box::pin(scrape(req).with_subscriber(dispatch))
    }
}
