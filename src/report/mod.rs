//! 加盟店MCCリファレンスPDF生成モジュール
//!
//! スクレイパーのCSVを読み込み、集計して複数セクションのPDFにまとめる

mod document;
mod font;
mod loader;
mod pdf;
mod summary;
mod types;

use std::path::PathBuf;

use chrono::Local;
use tracing::{error, info};

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::traits::DocumentRenderer;

pub use document::{build_document, Block, Column, Document, Table, TextStyle};
pub use font::{probe_unicode_font, FontSource};
pub use loader::{clean_rows, decode_csv, load_merchant_table, parse_rows};
pub use pdf::PdfRenderer;
pub use summary::{create_mcc_summary, create_metadata, create_search_entries};
pub use types::{
    Distribution, MccSummaryRow, MerchantRow, MerchantTable, Metadata, QaPair, SearchEntry,
};

/// CSV読み込みからPDF書き出しまで
///
/// CSVの文字コードが判定できなかった場合は `Ok(None)`。
pub fn generate(config: &ReportConfig) -> Result<Option<PathBuf>, ReportError> {
    let font = probe_unicode_font(&config.font_paths);

    info!("Processing merchant data...");
    let table = match load_merchant_table(&config.inputs) {
        Ok(Some(table)) => table,
        Ok(None) => return Ok(None),
        Err(e) => {
            error!("Error processing data: {}", e);
            return Err(e);
        }
    };
    info!("{} unique merchants after cleaning", table.len());

    info!("Creating comprehensive PDF document...");
    let document = build_document(&table, Local::now())?;
    let bytes = PdfRenderer::new(font).render(&document).map_err(|e| {
        error!("Error building PDF: {}", e);
        e
    })?;

    std::fs::write(&config.output, bytes)?;
    info!("PDF document created successfully: {}", config.output.display());
    Ok(Some(config.output.clone()))
}
