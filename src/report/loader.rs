//! スクレイパーCSVの読み込みと整形

use std::collections::HashSet;
use std::path::Path;

use encoding_rs::GB18030;
use tracing::{error, info, warn};

use crate::error::ReportError;

use super::types::{MerchantRow, MerchantTable};

const STORE_COLUMN: &str = "Store";
const MCC_COLUMN: &str = "MCC";
const TYPE_COLUMN: &str = "Type";

/// CSVファイル群を読み込んで1つのテーブルにまとめる
///
/// どれかのファイルが UTF-8 でも GB18030 でも読めなければ `Ok(None)`。
pub fn load_merchant_table<P: AsRef<Path>>(
    paths: &[P],
) -> Result<Option<MerchantTable>, ReportError> {
    let mut rows = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let text = match decode_csv(&bytes) {
            Ok(text) => text,
            Err(e) => {
                error!("Error processing {} with alternative encoding: {}", path.display(), e);
                return Ok(None);
            }
        };
        let mut parsed = parse_rows(&text)?;
        info!("Read {} rows from {}", parsed.len(), path.display());
        rows.append(&mut parsed);
    }

    Ok(Some(clean_rows(rows)))
}

/// UTF-8 → GB18030 の順に試す
pub fn decode_csv(bytes: &[u8]) -> Result<String, ReportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(utf8_err) => {
            warn!("UTF-8 decode failed ({}), retrying as GB18030", utf8_err);
            let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
            if had_errors {
                return Err(ReportError::Decode(
                    "neither UTF-8 nor GB18030".to_string(),
                ));
            }
            Ok(text.into_owned())
        }
    }
}

/// Store / MCC / Type の3列だけを取り出す（欠損は空文字）
pub fn parse_rows(text: &str) -> Result<Vec<MerchantRow>, ReportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
    };
    let store_idx = column(STORE_COLUMN)?;
    let mcc_idx = column(MCC_COLUMN)?;
    let type_idx = column(TYPE_COLUMN)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        rows.push(MerchantRow {
            store: field(store_idx),
            mcc: field(mcc_idx).trim().to_string(),
            merchant_type: field(type_idx),
        });
    }
    Ok(rows)
}

/// 重複除去（最初の出現を残す）→ 店名で安定ソート
pub fn clean_rows(rows: Vec<MerchantRow>) -> MerchantTable {
    let mut seen = HashSet::new();
    let mut unique: Vec<MerchantRow> = rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();
    unique.sort_by(|a, b| a.store.cmp(&b.store));
    MerchantTable::from_sorted(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Store,MCC,Type,Timestamp,Processing Time (s)\n";

    #[test]
    fn test_parse_and_clean() {
        let text = format!(
            "{}Zalora, 5651 ,Family Clothing,2024-10-31 15:00:00,3.1\n\
             Apple,5732,Electronics,2024-10-31 15:00:04,3.2\n\
             Grab,4121,,2024-10-31 15:00:08,3.3\n",
            HEADER
        );
        let table = clean_rows(parse_rows(&text).unwrap());
        let stores: Vec<&str> = table.rows().iter().map(|r| r.store.as_str()).collect();
        assert_eq!(stores, vec!["Apple", "Grab", "Zalora"]);
        assert_eq!(table.rows()[2].mcc, "5651");
        assert_eq!(table.rows()[1].merchant_type, "");
    }

    #[test]
    fn test_duplicates_across_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        std::fs::write(
            &first,
            format!("{}Grab,4121,Taxicabs,t1,1.0\nApple,5732,Electronics,t2,1.0\n", HEADER),
        )
        .unwrap();
        std::fs::write(
            &second,
            format!("{}Grab,4121,Taxicabs,t3,2.0\nGrab,4111,Transit,t4,2.0\n", HEADER),
        )
        .unwrap();

        let table = load_merchant_table(&[first, second]).unwrap().unwrap();
        assert_eq!(table.len(), 3);

        let unique: HashSet<&MerchantRow> = table.rows().iter().collect();
        assert_eq!(unique.len(), table.len());
    }

    #[test]
    fn test_missing_column() {
        let err = parse_rows("Store,Type\nGrab,Taxi\n").unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn(c) if c == "MCC"));
    }

    #[test]
    fn test_short_record_fills_empty() {
        let rows = parse_rows("Store,MCC,Type\nGrab,4121\n").unwrap();
        assert_eq!(rows, vec![MerchantRow::new("Grab", "4121", "")]);
    }

    #[test]
    fn test_gb18030_fallback() {
        let (encoded, _, _) = GB18030.encode("Store,MCC,Type\n美团,5812,餐厅\n");
        assert!(std::str::from_utf8(&encoded).is_err());
        let rows = parse_rows(&decode_csv(&encoded).unwrap()).unwrap();
        assert_eq!(rows, vec![MerchantRow::new("美团", "5812", "餐厅")]);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let text = decode_csv(b"\xEF\xBB\xBFStore,MCC,Type\nA,1234,B\n").unwrap();
        assert!(text.starts_with("Store"));
    }

    #[test]
    fn test_undecodable_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        // GB18030 の不完全な4バイト列
        std::fs::write(&path, b"Store,MCC,Type\n\x81\x30\x81\n").unwrap();
        assert!(load_merchant_table(&[path]).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_merchant_table(&["/nonexistent/merchant.csv"]).unwrap_err();
        assert!(matches!(err, ReportError::FileIO(_)));
    }
}
