//! レポート関連の型定義

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// CSVから読み戻した加盟店行
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MerchantRow {
    pub store: String,
    pub mcc: String,
    pub merchant_type: String,
}

impl MerchantRow {
    pub fn new(
        store: impl Into<String>,
        mcc: impl Into<String>,
        merchant_type: impl Into<String>,
    ) -> Self {
        Self {
            store: store.into(),
            mcc: mcc.into(),
            merchant_type: merchant_type.into(),
        }
    }
}

/// 重複除去・店名順ソート済みの加盟店テーブル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantTable {
    rows: Vec<MerchantRow>,
}

impl MerchantTable {
    pub(crate) fn from_sorted(rows: Vec<MerchantRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MerchantRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 値 → 件数（件数降順、同数は値の昇順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution(pub Vec<(String, usize)>);

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DataFields {
    pub merchant_name: &'static str,
    pub mcc: &'static str,
    pub business_type: &'static str,
}

impl Default for DataFields {
    fn default() -> Self {
        Self {
            merchant_name: "Business name as appears in transactions",
            mcc: "Merchant Category Code - standardized industry classification",
            business_type: "Description of merchant's primary business activity",
        }
    }
}

/// 文書メタデータ
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub document_type: &'static str,
    pub total_merchants: usize,
    pub unique_mccs: usize,
    pub mcc_categories: usize,
    pub generation_date: String,
    pub data_source: &'static str,
    pub version: &'static str,
    pub last_updated: String,
    pub category_distribution: Distribution,
    pub mcc_distribution: Distribution,
    pub data_fields: DataFields,
}

/// (MCC, 業種) ごとの集計行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MccSummaryRow {
    pub mcc: String,
    pub merchant_type: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameMetadata {
    pub has_unicode: bool,
    pub name_length: usize,
    pub contains_numbers: bool,
}

/// 検索用に展開した加盟店エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    pub merchant_name: String,
    pub merchant_name_lower: String,
    pub merchant_name_variations: Vec<String>,
    pub mcc_code: String,
    pub business_type: String,
    pub search_key: String,
    pub search_key_normalized: String,
    pub qa_pairs: Vec<QaPair>,
    pub metadata: NameMetadata,
}
