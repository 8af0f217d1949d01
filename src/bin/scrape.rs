//! 加盟店MCCスクレイパー
//!
//! 実行方法:
//! ```
//! cargo run --bin merchant-scrape -- --input stores.json --output-dir ./out
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use merchant_mcc::{ExitStatus, RunLog, ScrapeRequest, ScraperConfig, ScraperService};
use tower::Service;

#[derive(Parser, Debug)]
#[command(name = "merchant-scrape", about = "Scrape merchant MCC labels into a CSV file")]
struct Args {
    /// 加盟店IDのJSON配列
    #[arg(long, default_value = "stores.json")]
    input: PathBuf,

    /// CSV・ログの出力先
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value = merchant_mcc::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// マーカー要素の待機秒数
    #[arg(long, default_value_t = 10)]
    wait_timeout: u64,

    /// マーカー検出後の待機秒数
    #[arg(long, default_value_t = 3)]
    settle_delay: u64,

    /// ブラウザを表示して実行
    #[arg(long)]
    headed: bool,

    /// 抽出失敗時にスクリーンショットをログ出力
    #[arg(long)]
    debug: bool,

    /// 終了時に削除する一時ファイル
    #[arg(long = "temp-file")]
    temp_files: Vec<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let log = match RunLog::open(&args.output_dir, Local::now()) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("ログファイルを作成できません: {}", e);
            std::process::exit(ExitStatus::FileError.code());
        }
    };

    let mut config = ScraperConfig::new(args.input)
        .with_output_dir(args.output_dir)
        .with_base_url(args.base_url)
        .with_headless(!args.headed)
        .with_debug(args.debug)
        .with_wait_timeout(Duration::from_secs(args.wait_timeout))
        .with_settle_delay(Duration::from_secs(args.settle_delay));
    for path in args.temp_files {
        config = config.with_temp_file(path);
    }

    let mut service = ScraperService::new();
    let status = match service.call(ScrapeRequest::new(config).with_log(log)).await {
        Ok(_) => ExitStatus::Success,
        Err(e) => e.exit_status(),
    };

    std::process::exit(status.code());
}
