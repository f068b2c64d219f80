//! エディタ設定
//!
//! 履歴の記録単位・上限などファサードの振る舞いを決める値をまとめる。

use crate::error::ConfigError;

/// 初期バッファ容量（文字数）
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

pub const ENV_HISTORY_LIMIT: &str = "SEQEDIT_HISTORY_LIMIT";
pub const ENV_GRANULARITY: &str = "SEQEDIT_GRANULARITY";
pub const ENV_MERGE_TYPING: &str = "SEQEDIT_MERGE_TYPING";

/// 挿入・削除リクエストを履歴に記録する単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordGranularity {
    /// 1 リクエスト = 1 アクション
    #[default]
    PerRequest,
    /// 1 文字 = 1 アクション
    PerCharacter,
}

impl RecordGranularity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "request" | "per-request" => Some(RecordGranularity::PerRequest),
            "char" | "character" | "per-character" => Some(RecordGranularity::PerCharacter),
            _ => None,
        }
    }
}

/// エディタ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// undo スタックの上限（`None` で無制限）
    pub history_limit: Option<usize>,
    /// 記録単位
    pub granularity: RecordGranularity,
    /// 連続した単語入力を 1 エントリにまとめる
    pub merge_typing: bool,
    /// バッファの初期容量
    pub initial_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            granularity: RecordGranularity::default(),
            merge_typing: false,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_granularity(mut self, granularity: RecordGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_merge_typing(mut self, merge: bool) -> Self {
        self.merge_typing = merge;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// 設定値の妥当性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == Some(0) {
            return Err(ConfigError::invalid("history_limit", 0));
        }
        if self.initial_capacity == 0 {
            return Err(ConfigError::invalid("initial_capacity", 0));
        }
        if self.merge_typing && self.granularity == RecordGranularity::PerCharacter {
            return Err(ConfigError::invalid("merge_typing", "per-character granularity"));
        }
        Ok(())
    }

    /// 環境変数で既定値を上書きした設定を作成
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を構築（テストでは環境変数の代わりに使う）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_HISTORY_LIMIT) {
            let limit = match raw.trim() {
                "" | "none" | "unlimited" => None,
                value => Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| ConfigError::invalid(ENV_HISTORY_LIMIT, &raw))?,
                ),
            };
            config.history_limit = limit;
        }

        if let Some(raw) = lookup(ENV_GRANULARITY) {
            config.granularity = RecordGranularity::parse(&raw)
                .ok_or_else(|| ConfigError::invalid(ENV_GRANULARITY, &raw))?;
        }

        if let Some(raw) = lookup(ENV_MERGE_TYPING) {
            config.merge_typing = match raw.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(ConfigError::invalid(ENV_MERGE_TYPING, &raw)),
            };
        }

        config.validate()?;
        Ok(config)
    }
}
