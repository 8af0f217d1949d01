use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ReportError, ScraperError};
use crate::report::Document;

/// ヘッドレスブラウザの操作インターフェース
#[async_trait]
pub trait BrowserDriver: Send {
    /// URLへ遷移
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// セレクタに一致する要素が現れるまで待機（超過時は `ScraperError::Timeout`）
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), ScraperError>;

    /// 描画済みHTMLを取得
    async fn content(&mut self) -> Result<String, ScraperError>;

    /// デバッグ用スクリーンショット（PNG）。未対応なら None
    async fn screenshot(&mut self) -> Option<Vec<u8>> {
        None
    }

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// 文書モデルをバイト列へ描画する
pub trait DocumentRenderer {
    fn render(&self, document: &Document) -> Result<Vec<u8>, ReportError>;
}
