use thiserror::Error;

use crate::merchant::ExitStatus;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("入力ファイル形式エラー: {0}")]
    Input(String),

    #[error("CSV書き込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("ページ取得エラー: {0}")]
    Page(String),
}

impl ScraperError {
    /// プロセス終了コードへの対応付け
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            ScraperError::ElementNotFound(_) => ExitStatus::NoElement,
            ScraperError::Timeout(_) => ExitStatus::Timeout,
            ScraperError::FileIO(_) | ScraperError::Input(_) => ExitStatus::FileError,
            ScraperError::BrowserInit(_) => ExitStatus::BrowserError,
            ScraperError::Navigation(_) | ScraperError::Csv(_) | ScraperError::Page(_) => {
                ExitStatus::UnknownError
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("CSV読み込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("必須カラムがありません: {0}")]
    MissingColumn(String),

    #[error("文字コード判定エラー: {0}")]
    Decode(String),

    #[error("JSON変換エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF生成エラー: {0}")]
    Pdf(String),
}
