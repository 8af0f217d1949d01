//! 加盟店スクレイパー関連の型定義

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// CSVヘッダー
pub const CSV_HEADER: [&str; 5] = ["Store", "MCC", "Type", "Timestamp", "Processing Time (s)"];

/// CSVに書き出すタイムスタンプ形式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// プロセス終了コード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    NoElement,
    Timeout,
    FileError,
    BrowserError,
    UnknownError,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::NoElement => 1,
            ExitStatus::Timeout => 2,
            ExitStatus::FileError => 3,
            ExitStatus::BrowserError => 4,
            ExitStatus::UnknownError => 5,
        }
    }
}

/// ページから抽出したMCCと業種
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantInfo {
    pub mcc: String,
    pub merchant_type: String,
}

/// スクレイプ結果の1行
#[derive(Debug, Clone, Serialize)]
pub struct MerchantRecord {
    #[serde(rename = "Store")]
    pub name: String,
    #[serde(rename = "MCC")]
    pub mcc: String,
    #[serde(rename = "Type")]
    pub merchant_type: String,
    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Processing Time (s)")]
    pub processing_time: f64,
}

fn serialize_timestamp<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// スクレイプ実行結果
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub csv_path: PathBuf,
    pub processed: usize,
}

/// 大文字・小文字・タイトルケースの区別を持つ文字か
fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase() || titlecase_digraph(c).is_some()
}

/// ラテン文字の二重音字はタイトルケースが大文字と異なる
fn titlecase_digraph(c: char) -> Option<char> {
    match c {
        'Ǆ' | 'ǅ' | 'ǆ' => Some('ǅ'),
        'Ǉ' | 'ǈ' | 'ǉ' => Some('ǈ'),
        'Ǌ' | 'ǋ' | 'ǌ' => Some('ǋ'),
        'Ǳ' | 'ǲ' | 'ǳ' => Some('ǲ'),
        _ => None,
    }
}

/// 単語の先頭をタイトルケース、続く文字を小文字にする
///
/// 大文字・小文字を持たない文字（数字・記号・漢字など）で単語が区切られる。
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_cased = false;
    for c in input.chars() {
        if !is_cased(c) {
            out.push(c);
            prev_cased = false;
            continue;
        }
        if prev_cased {
            out.extend(c.to_lowercase());
        } else if let Some(title) = titlecase_digraph(c) {
            out.push(title);
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = true;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("grab"), "Grab");
        assert_eq!(title_case("shopee mall"), "Shopee Mall");
        assert_eq!(title_case("McDONALDS"), "Mcdonalds");
        assert_eq!(title_case("7eleven"), "7Eleven");
        assert_eq!(title_case("a-b_c"), "A-B_C");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_uncased_letters() {
        assert_eq!(title_case("美团abc"), "美团Abc");
        assert_eq!(title_case("ǆungla"), "ǅungla");
        assert_eq!(title_case("ǅUNGLA ǈ"), "ǅungla ǈ");
    }

    #[test]
    fn test_exit_codes() {
        let codes: Vec<i32> = [
            ExitStatus::Success,
            ExitStatus::NoElement,
            ExitStatus::Timeout,
            ExitStatus::FileError,
            ExitStatus::BrowserError,
            ExitStatus::UnknownError,
        ]
        .iter()
        .map(|s| s.code())
        .collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5]);
    }
}
