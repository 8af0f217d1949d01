//! 加盟店MCCスクレイパーモジュール
//!
//! 加盟店ページを順番に開き、MCCラベルを抽出してCSVに追記する

mod browser;
mod parser;
mod scraper;
mod store;
mod types;

pub use browser::ChromeDriver;
pub use parser::{extract_merchant_info, split_label, MARKER_SELECTOR, TARGET_CLASS};
pub use scraper::{remove_temp_files, MerchantScraper};
pub use store::{read_store_list, RecordWriter};
pub use types::{
    title_case, ExitStatus, MerchantInfo, MerchantRecord, ScrapeSummary, CSV_HEADER,
    TIMESTAMP_FORMAT,
};
