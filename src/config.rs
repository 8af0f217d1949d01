use std::path::PathBuf;
use std::time::Duration;

/// 加盟店ページのベースURL
pub const DEFAULT_BASE_URL: &str = "https://heymax.ai/merchant/";
/// マーカー要素の待機タイムアウト
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
/// マーカー検出後の描画待ち
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Unicode対応フォントの探索パス（先頭から順に試す）
pub const DEFAULT_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:/Windows/Fonts/arial.ttf",
    "Arial-Unicode-Regular.ttf",
];

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub headless: bool,
    pub debug: bool,
    pub wait_timeout: Duration,
    pub settle_delay: Duration,
    /// 終了時に削除する一時ファイル
    pub temp_files: Vec<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            input_path: PathBuf::from("stores.json"),
            output_dir: PathBuf::from("."),
            headless: true,
            debug: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            temp_files: Vec::new(),
        }
    }
}

impl ScraperConfig {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_temp_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_files.push(path.into());
        self
    }

    /// 加盟店ページURLを組み立てる
    pub fn merchant_url(&self, store: &str) -> String {
        format!("{}{}", self.base_url, store)
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub font_paths: Vec<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: PathBuf::from("merchant_mcc_reference_complete.pdf"),
            font_paths: DEFAULT_FONT_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl ReportConfig {
    pub fn new<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// 指定フォントを探索リストの先頭に追加
    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_paths.insert(0, path.into());
        self
    }

    pub fn with_font_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.font_paths = paths;
        self
    }
}
