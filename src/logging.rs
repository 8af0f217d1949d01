//! 実行単位のログコンテキスト
//!
//! コンソールとログファイルの両方へ出力する Dispatch を組み立てる。
//! グローバルには登録せず、`WithSubscriber` で処理ごとに付与する。

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ScraperError;

#[derive(Clone)]
pub struct RunLog {
    path: PathBuf,
    dispatch: Dispatch,
}

impl RunLog {
    /// `merchant_scraper_%Y%m%d_%H%M%S.log` を作成する
    pub fn open(dir: &Path, started: DateTime<Local>) -> Result<Self, ScraperError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "merchant_scraper_{}.log",
            started.format("%Y%m%d_%H%M%S")
        ));
        let file = File::create(&path)?;

        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            );

        Ok(Self {
            path,
            dispatch: Dispatch::new(subscriber),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }
}
