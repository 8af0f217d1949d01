//! PDFに依存しない文書モデルと組み立て

use chrono::{DateTime, Local};

use crate::error::ReportError;

use super::summary::{create_mcc_summary, create_metadata, create_search_entries};
use super::types::MerchantTable;

/// 1インチ（mm）
pub const INCH: f32 = 25.4;

/// 1ページに載せる加盟店エントリ数
pub const ENTRIES_PER_PAGE: usize = 3;

pub const TITLE: &str = "Merchant Category Code (MCC)";
pub const SUBTITLE: &str = "Complete Reference Guide";

pub const METADATA_SECTION: &str = "1. Document Metadata";
pub const SUMMARY_SECTION: &str = "2. MCC Code Summary";
pub const LISTING_SECTION: &str = "3. Complete Merchant Listing";
pub const SEARCH_SECTION: &str = "4. Search Reference Guide";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Section,
    Subsection,
    Body,
}

impl TextStyle {
    /// (フォントサイズpt, 段落後の余白mm)
    pub fn metrics(self) -> (f32, f32) {
        match self {
            TextStyle::Title => (24.0, 10.5),
            TextStyle::Section => (16.0, 7.0),
            TextStyle::Subsection => (14.0, 5.3),
            TextStyle::Body => (12.0, 4.2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub width: f32,
    /// 折り返し対象か（MCC列は折り返さない）
    pub wrap: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text { text: String, style: TextStyle },
    Preformatted(String),
    Table(Table),
    Spacer(f32),
    PageBreak,
}

impl Block {
    fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Block::Text {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// 表紙 → 目次 → メタデータ → MCCサマリー → 一覧 → 検索ガイド
pub fn build_document(
    table: &MerchantTable,
    generated_at: DateTime<Local>,
) -> Result<Document, ReportError> {
    let mut blocks = Vec::new();

    // 表紙
    blocks.push(Block::text(TITLE, TextStyle::Title));
    blocks.push(Block::text(SUBTITLE, TextStyle::Title));
    blocks.push(Block::Spacer(17.6));
    blocks.push(Block::text(
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        TextStyle::Body,
    ));
    blocks.push(Block::PageBreak);

    // 目次
    blocks.push(Block::text("Table of Contents", TextStyle::Title));
    for item in [
        METADATA_SECTION,
        SUMMARY_SECTION,
        LISTING_SECTION,
        SEARCH_SECTION,
    ] {
        blocks.push(Block::text(item, TextStyle::Body));
    }
    blocks.push(Block::PageBreak);

    // メタデータ
    blocks.push(Block::text(METADATA_SECTION, TextStyle::Title));
    let metadata = create_metadata(table, generated_at);
    blocks.push(Block::Preformatted(serde_json::to_string_pretty(&metadata)?));
    blocks.push(Block::PageBreak);

    // MCCサマリー
    blocks.push(Block::text(SUMMARY_SECTION, TextStyle::Title));
    let summary = create_mcc_summary(table);
    blocks.push(Block::Table(Table {
        columns: vec![
            Column { width: INCH, wrap: false },
            Column { width: 4.0 * INCH, wrap: true },
            Column { width: INCH, wrap: true },
            Column { width: INCH, wrap: true },
        ],
        header: vec![
            "MCC".into(),
            "Business Type".into(),
            "Count".into(),
            "Percentage".into(),
        ],
        rows: summary
            .iter()
            .map(|row| {
                vec![
                    row.mcc.clone(),
                    row.merchant_type.clone(),
                    row.count.to_string(),
                    format!("{:.2}%", row.percentage),
                ]
            })
            .collect(),
    }));
    blocks.push(Block::PageBreak);

    // 加盟店一覧
    blocks.push(Block::text(LISTING_SECTION, TextStyle::Title));
    blocks.push(Block::Table(Table {
        columns: vec![
            Column { width: 2.5 * INCH, wrap: true },
            Column { width: INCH, wrap: false },
            Column { width: 3.5 * INCH, wrap: true },
        ],
        header: vec!["Merchant Name".into(), "MCC".into(), "Business Type".into()],
        rows: table
            .rows()
            .iter()
            .map(|row| vec![row.store.clone(), row.mcc.clone(), row.merchant_type.clone()])
            .collect(),
    }));
    blocks.push(Block::PageBreak);

    // 検索ガイド
    blocks.push(Block::text(SEARCH_SECTION, TextStyle::Title));
    for (i, entry) in create_search_entries(table).iter().enumerate() {
        if i > 0 && i % ENTRIES_PER_PAGE == 0 {
            blocks.push(Block::PageBreak);
        }

        blocks.push(Block::text(
            format!("Merchant: {}", entry.merchant_name),
            TextStyle::Subsection,
        ));
        blocks.push(Block::text(format!("MCC: {}", entry.mcc_code), TextStyle::Body));
        blocks.push(Block::text(
            format!("Business Type: {}", entry.business_type),
            TextStyle::Body,
        ));

        blocks.push(Block::text("Search Variations:", TextStyle::Body));
        for variation in &entry.merchant_name_variations {
            blocks.push(Block::text(format!("- {}", variation), TextStyle::Body));
        }

        blocks.push(Block::text("Common Questions:", TextStyle::Body));
        for qa in &entry.qa_pairs {
            blocks.push(Block::text(format!("Q: {}", qa.question), TextStyle::Body));
            blocks.push(Block::text(format!("A: {}", qa.answer), TextStyle::Body));
        }

        blocks.push(Block::Spacer(7.0));
    }

    Ok(Document {
        title: format!("{} {}", TITLE, SUBTITLE),
        blocks,
    })
}
