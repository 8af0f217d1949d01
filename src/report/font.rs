//! Unicode対応フォントの探索

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// 本文に使うフォント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// TTFファイル（パスと中身）
    External { path: PathBuf, bytes: Vec<u8> },
    /// PDF組み込みの Helvetica
    Builtin,
}

impl FontSource {
    pub fn is_builtin(&self) -> bool {
        matches!(self, FontSource::Builtin)
    }
}

/// 候補パスを先頭から調べ、最初に読めたフォントを返す。なければ組み込みフォント
pub fn probe_unicode_font<P: AsRef<Path>>(candidates: &[P]) -> FontSource {
    for path in candidates {
        let path = path.as_ref();
        if !path.is_file() {
            continue;
        }
        match std::fs::read(path) {
            Ok(bytes) => {
                info!("Successfully registered font: {}", path.display());
                return FontSource::External {
                    path: path.to_path_buf(),
                    bytes,
                };
            }
            Err(e) => warn!("Could not read font {}: {}", path.display(), e),
        }
    }

    warn!("No Unicode font found, falling back to built-in font - some characters may not display correctly");
    FontSource::Builtin
}
