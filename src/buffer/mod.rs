//! バッファ管理モジュール
//!
//! 文書内容を保持するシーケンスストアを提供

pub mod gap_buffer;

// 公開API
pub use gap_buffer::GapBuffer;
pub use crate::error::BufferError;
