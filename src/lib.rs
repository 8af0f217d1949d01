//! 加盟店MCCライブラリ
//!
//! - 加盟店ページをヘッドレスブラウザで開き、MCCと業種をCSVに保存
//! - 保存したCSVを集計してMCCリファレンスPDFを生成
//!
//! # スクレイパー使用例
//!
//! ```rust,ignore
//! use merchant_mcc::{RunLog, ScrapeRequest, ScraperConfig, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let log = RunLog::open(".".as_ref(), chrono::Local::now()).unwrap();
//!     let config = ScraperConfig::new("stores.json").with_output_dir("./out");
//!
//!     let mut service = ScraperService::new();
//!     match service.call(ScrapeRequest::new(config).with_log(log)).await {
//!         Ok(result) => println!("CSV saved: {:?}", result.csv_path),
//!         Err(e) => std::process::exit(e.exit_status().code()),
//!     }
//! }
//! ```
//!
//! # レポート使用例
//!
//! ```rust,ignore
//! use merchant_mcc::{report, ReportConfig};
//!
//! let config = ReportConfig::new(["merchant_data_20241031_152616.csv"]);
//! let pdf = report::generate(&config)?;
//! println!("PDF: {:?}", pdf);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod merchant;
pub mod report;
pub mod service;
pub mod traits;

// 主要な型をリエクスポート
pub use config::{ReportConfig, ScraperConfig};
pub use error::{ReportError, ScraperError};
pub use logging::RunLog;
pub use merchant::{ChromeDriver, ExitStatus, MerchantRecord, MerchantScraper};
pub use report::{Document, PdfRenderer};
pub use service::{ScrapeRequest, ScrapeResult, ScraperService};
pub use traits::{BrowserDriver, DocumentRenderer};
