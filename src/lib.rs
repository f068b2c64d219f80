//! seqedit - 編集可能な文字シーケンスと undo/redo 履歴
//!
//! シーケンスストア・編集履歴・編集ファサードの 3 層で構成される。
//! 表示やファイル入出力はシェル側の責務で、ここには含まれない。

// コアモジュール
pub mod error;
pub mod logging;
pub mod config;

// データ層
pub mod buffer;

// 履歴層
pub mod history;

// 編集層
pub mod editor;

// シェル層
pub mod shell;

// 公開API
pub use buffer::GapBuffer;
pub use config::{EditorConfig, RecordGranularity};
pub use editor::{ChangeEvent, ChangeListener, EditOrigin, TextEditor, TextMirror};
pub use error::{BufferError, ConfigError, HistoryError, Result, SeqEditError};
pub use history::{Action, EditHistory, EditTarget, ReplayGuard, ReplayState};
