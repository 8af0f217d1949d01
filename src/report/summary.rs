//! 集計（メタデータ・MCCサマリー・検索エントリ）

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Local};

use super::types::{
    DataFields, Distribution, MccSummaryRow, MerchantTable, Metadata, NameMetadata, QaPair,
    SearchEntry,
};

pub const DOCUMENT_TYPE: &str = "Merchant Reference Guide";
pub const DATA_SOURCE: &str = "merchant_transactions";
pub const SCHEMA_VERSION: &str = "1.0";

pub fn create_metadata(table: &MerchantTable, generated_at: DateTime<Local>) -> Metadata {
    let rows = table.rows();
    let unique_mccs: HashSet<&str> = rows.iter().map(|r| r.mcc.as_str()).collect();
    let unique_types: HashSet<&str> = rows.iter().map(|r| r.merchant_type.as_str()).collect();

    Metadata {
        document_type: DOCUMENT_TYPE,
        total_merchants: rows.len(),
        unique_mccs: unique_mccs.len(),
        mcc_categories: unique_types.len(),
        generation_date: generated_at.format("%Y-%m-%d").to_string(),
        data_source: DATA_SOURCE,
        version: SCHEMA_VERSION,
        last_updated: generated_at.to_rfc3339(),
        category_distribution: value_counts(rows.iter().map(|r| r.merchant_type.as_str())),
        mcc_distribution: value_counts(rows.iter().map(|r| r.mcc.as_str())),
        data_fields: DataFields::default(),
    }
}

fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Distribution {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut pairs: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Distribution(pairs)
}

/// (MCC, 業種) ごとの件数と割合（小数2桁）。件数の降順
pub fn create_mcc_summary(table: &MerchantTable) -> Vec<MccSummaryRow> {
    let total = table.len();
    let mut groups: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for row in table.rows() {
        *groups
            .entry((row.mcc.as_str(), row.merchant_type.as_str()))
            .or_default() += 1;
    }

    let mut summary: Vec<MccSummaryRow> = groups
        .into_iter()
        .map(|((mcc, merchant_type), count)| MccSummaryRow {
            mcc: mcc.to_string(),
            merchant_type: merchant_type.to_string(),
            count,
            percentage: round2(count as f64 / total as f64 * 100.0),
        })
        .collect();
    // BTreeMap 順を保ったまま件数で安定ソート
    summary.sort_by(|a, b| b.count.cmp(&a.count));
    summary
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn create_search_entries(table: &MerchantTable) -> Vec<SearchEntry> {
    table
        .rows()
        .iter()
        .map(|row| search_entry(&row.store, &row.mcc, &row.merchant_type))
        .collect()
}

fn search_entry(name: &str, mcc: &str, business_type: &str) -> SearchEntry {
    let lower = name.to_lowercase();
    SearchEntry {
        merchant_name: name.to_string(),
        merchant_name_lower: lower.clone(),
        merchant_name_variations: vec![
            name.to_string(),
            lower.clone(),
            name.to_uppercase(),
            name.replace(' ', ""),
            name.replace(' ', "_"),
        ],
        mcc_code: mcc.to_string(),
        business_type: business_type.to_string(),
        search_key: format!("{} {} {}", name, mcc, business_type),
        search_key_normalized: format!("{} {} {}", lower, mcc, business_type.to_lowercase()),
        qa_pairs: vec![
            QaPair {
                question: format!("What is the MCC for {}?", name),
                answer: format!("The MCC for {} is {}", name, mcc),
            },
            QaPair {
                question: format!("What type of business is {}?", name),
                answer: format!("{} is a {} business with MCC {}", name, business_type, mcc),
            },
            QaPair {
                question: format!("What is the business category for {}?", name),
                answer: format!(
                    "{} operates in the {} category (MCC: {})",
                    name, business_type, mcc
                ),
            },
        ],
        metadata: NameMetadata {
            has_unicode: name.chars().any(|c| !c.is_ascii()),
            name_length: name.chars().count(),
            contains_numbers: name.chars().any(|c| c.is_numeric()),
        },
    }
}
