//! エラーハンドリング
//!
//! seqedit 全体で使用されるエラー型を定義する。
//! 範囲外の挿入・削除や空スタックでの undo/redo はエラーではなく
//! no-op として扱い、ここに現れるのは内部整合性の破綻と設定値の誤りのみ。

use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeqEditError {
    /// バッファ操作エラー
    #[error("Buffer operation failed: {0}")]
    Buffer(#[from] BufferError),

    /// 履歴操作エラー
    #[error("History replay failed: {0}")]
    History(#[from] HistoryError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// バッファ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Invalid position: {position} (length {len})")]
    InvalidPosition { position: usize, len: usize },

    #[error("Invalid range: {start}..{end} (length {len})")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// 履歴の再生中に検出された整合性エラー
///
/// どちらもファサードが記録した内容とバッファの実内容が食い違ったことを示す。
/// 呼び出し側で握りつぶしてはならない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Text at {position} diverged from history: expected {expected:?}, found {found:?}")]
    Diverged {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Replay of {kind} at {position} failed: {source}")]
    Replay {
        kind: &'static str,
        position: usize,
        #[source]
        source: BufferError,
    },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl ToString) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// seqedit 用の Result 型
pub type Result<T> = std::result::Result<T, SeqEditError>;
