//! 加盟店ページHTMLの解析

use ::scraper::{Html, Selector};

use super::types::MerchantInfo;

/// ページ描画完了を示すマーカー要素
pub const MARKER_SELECTOR: &str = ".font-inter";

/// MCCラベル要素のclass属性（完全一致）
pub const TARGET_CLASS: &str = "px-2 py-1 font-inter text-[12px] font-medium text-[#5046C5]";

/// ラベル先頭のMCC桁数
const MCC_LEN: usize = 4;

/// HTMLからMCCと業種を抽出する。対象要素がなければ None
pub fn extract_merchant_info(html: &str) -> Option<MerchantInfo> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("[class]").ok()?;

    let element = document
        .select(&selector)
        .find(|el| el.value().attr("class") == Some(TARGET_CLASS))?;

    let text = element.text().collect::<String>();
    Some(split_label(text.trim()))
}

/// "5812 (Restaurants)" → ("5812", "Restaurants")
pub fn split_label(text: &str) -> MerchantInfo {
    let mcc: String = text.chars().take(MCC_LEN).collect();
    let rest: String = text.chars().skip(MCC_LEN).collect();
    MerchantInfo {
        mcc,
        merchant_type: clean_type_text(&rest),
    }
}

fn clean_type_text(text: &str) -> String {
    text.trim().replace(['(', ')'], "").trim().to_string()
}
