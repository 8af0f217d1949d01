//! 入力リストの読み込みとCSV出力

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::ScraperError;

use super::types::{MerchantRecord, CSV_HEADER};

/// 加盟店IDリスト（JSON文字列配列）を読み込む
pub fn read_store_list(path: &Path) -> Result<Vec<String>, ScraperError> {
    info!("Reading {}...", path.display());
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| ScraperError::Input(format!("{}: {}", path.display(), e)))
}

/// 1件ずつフラッシュするCSVライター
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl RecordWriter<File> {
    /// ファイルを作成してヘッダー行を書く
    pub fn create(path: &Path) -> Result<Self, ScraperError> {
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Result<Self, ScraperError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, record: &MerchantRecord) -> Result<(), ScraperError> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, ScraperError> {
        self.writer
            .into_inner()
            .map_err(|e| ScraperError::FileIO(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_header_only() {
        let writer = RecordWriter::new(Vec::new()).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Store,MCC,Type,Timestamp,Processing Time (s)\n"
        );
    }

    #[test]
    fn test_append_record() {
        let mut writer = RecordWriter::new(Vec::new()).unwrap();
        let timestamp = NaiveDate::from_ymd_opt(2024, 10, 31)
            .unwrap()
            .and_hms_opt(15, 26, 16)
            .unwrap();
        writer
            .append(&MerchantRecord {
                name: "Grab".into(),
                mcc: "4121".into(),
                merchant_type: "Taxicabs, Limousines".into(),
                timestamp,
                processing_time: 3.42,
            })
            .unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Grab,4121,\"Taxicabs, Limousines\",2024-10-31 15:26:16,3.42"
        );
    }

    #[test]
    fn test_read_store_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        std::fs::write(&path, r#"["grab", "shopee mall"]"#).unwrap();
        assert_eq!(read_store_list(&path).unwrap(), vec!["grab", "shopee mall"]);
    }

    #[test]
    fn test_read_store_list_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_store_list(&missing),
            Err(ScraperError::FileIO(_))
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"stores": 1}"#).unwrap();
        assert!(matches!(read_store_list(&bad), Err(ScraperError::Input(_))));
    }
}
