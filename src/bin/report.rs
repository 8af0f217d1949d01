//! 加盟店MCCリファレンスPDF生成
//!
//! 実行方法:
//! ```
//! cargo run --bin merchant-report -- --input merchant_data_20241031_152616.csv
//! ```

use std::path::PathBuf;

use clap::Parser;
use merchant_mcc::{report, ReportConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "merchant-report", about = "Render the merchant MCC reference PDF")]
struct Args {
    /// スクレイパーが出力したCSV（複数指定可）
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    #[arg(long, default_value = "merchant_mcc_reference_complete.pdf")]
    output: PathBuf,

    /// 優先して使うTTFフォント
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = ReportConfig::new(args.input).with_output(args.output);
    if let Some(font) = args.font {
        config = config.with_font(font);
    }

    match report::generate(&config) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            error!("No merchant data could be read; PDF not generated");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Error in main process: {}", e);
            Err(e.into())
        }
    }
}
