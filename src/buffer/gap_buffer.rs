//! ギャップバッファ実装
//!
//! 文字単位の位置指定で挿入・削除を行うためのデータ構造。
//! 要素は `char` で保持するため、文字位置とスロット位置が 1:1 に対応する。

use crate::error::BufferError;
use std::fmt;

const DEFAULT_GAP_CAPACITY: usize = 1024;
const MIN_GAP_RESERVE: usize = 64;
const MAX_GAP_GROWTH: usize = 64 * 1024;
const GAP_GROWTH_FACTOR: usize = 2;
const GAP_FILL: char = '\0';

/// ギャップバッファ構造体
///
/// 直近の編集位置にギャップ（空き領域）を保持し、同じ付近への連続した
/// 挿入・削除をギャップ端の書き換えだけで済ませる。
/// `buffer[..gap_start]` と `buffer[gap_end..]` を連結したものが内容。
#[derive(Debug, Clone)]
pub struct GapBuffer {
    /// 内部バッファ
    buffer: Vec<char>,
    /// ギャップの開始位置
    gap_start: usize,
    /// ギャップの終了位置（排他的）
    gap_end: usize,
}

impl GapBuffer {
    /// 新しい空のギャップバッファを作成
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_GAP_CAPACITY)
    }

    /// 指定容量（文字数）で新しいギャップバッファを作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![GAP_FILL; capacity],
            gap_start: 0,
            gap_end: capacity,
        }
    }

    /// 文字列からギャップバッファを作成
    pub fn from_str(s: &str) -> Self {
        let mut gap = Self::with_capacity(0);
        gap.set_content(s);
        gap
    }

    fn prefix(&self) -> &[char] {
        &self.buffer[..self.gap_start]
    }

    fn suffix(&self) -> &[char] {
        &self.buffer[self.gap_end..]
    }

    /// 現在のギャップサイズ
    pub fn gap_size(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// 現在のギャップ位置（文字単位）
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// 格納されている文字数
    pub fn len_chars(&self) -> usize {
        self.buffer.len() - self.gap_size()
    }

    /// `len_chars` のエイリアス
    pub fn len(&self) -> usize {
        self.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// 内容を先頭から順に走査
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.prefix().iter().chain(self.suffix().iter()).copied()
    }

    /// 全テキストを文字列として取得
    pub fn get_text(&self) -> String {
        self.chars().collect()
    }

    /// 内容全体を置き換える（履歴を経由しない全体ロード用）
    pub fn set_content(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let gap_size = (chars.len().max(DEFAULT_GAP_CAPACITY) / 4).max(MIN_GAP_RESERVE);

        self.buffer.clear();
        self.buffer.reserve(chars.len() + gap_size);
        self.buffer.extend_from_slice(&chars);
        self.buffer.resize(chars.len() + gap_size, GAP_FILL);
        self.gap_start = chars.len();
        self.gap_end = self.buffer.len();
    }

    /// 内容を空にする
    pub fn clear(&mut self) {
        self.gap_start = 0;
        self.gap_end = self.buffer.len();
    }

    /// 指定位置の文字を取得
    pub fn char_at(&self, pos: usize) -> Option<char> {
        if pos < self.gap_start {
            Some(self.buffer[pos])
        } else if pos < self.len_chars() {
            Some(self.buffer[pos + self.gap_size()])
        } else {
            None
        }
    }

    /// 指定範囲 `[start, end)` のテキストを取得
    pub fn substring(&self, start: usize, end: usize) -> Result<String, BufferError> {
        self.check_range(start, end)?;
        Ok(self.chars().skip(start).take(end - start).collect())
    }

    /// 指定位置に 1 文字挿入する
    ///
    /// `pos == len` なら末尾に追加。`pos > len` は何もせず `false` を返す。
    pub fn insert_at(&mut self, pos: usize, ch: char) -> bool {
        match self.insert(pos, ch) {
            Ok(()) => true,
            Err(err) => {
                log::trace!("insert_at rejected: {}", err);
                false
            }
        }
    }

    /// 指定位置の文字を削除して返す
    ///
    /// 範囲外や空バッファでは何もせず `None` を返す。
    pub fn delete_at(&mut self, pos: usize) -> Option<char> {
        match self.delete(pos) {
            Ok(ch) => Some(ch),
            Err(err) => {
                log::trace!("delete_at rejected: {}", err);
                None
            }
        }
    }

    /// 指定位置に文字を挿入
    pub fn insert(&mut self, pos: usize, ch: char) -> Result<(), BufferError> {
        self.check_position(pos)?;
        self.move_gap_to(pos);
        self.reserve_gap(1);
        self.buffer[self.gap_start] = ch;
        self.gap_start += 1;
        Ok(())
    }

    /// 指定位置に文字列を挿入
    pub fn insert_str(&mut self, pos: usize, s: &str) -> Result<(), BufferError> {
        self.check_position(pos)?;
        let chars: Vec<char> = s.chars().collect();
        if chars.is_empty() {
            return Ok(());
        }

        self.move_gap_to(pos);
        self.reserve_gap(chars.len());
        let start = self.gap_start;
        self.buffer[start..start + chars.len()].copy_from_slice(&chars);
        self.gap_start += chars.len();
        Ok(())
    }

    /// 指定位置の文字を削除
    pub fn delete(&mut self, pos: usize) -> Result<char, BufferError> {
        let len = self.len_chars();
        if pos >= len {
            return Err(BufferError::InvalidPosition { position: pos, len });
        }

        self.move_gap_to(pos);
        let deleted = self.buffer[self.gap_end];
        self.gap_end += 1;
        Ok(deleted)
    }

    /// 指定範囲 `[start, end)` を削除し、削除した文字列を返す
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<String, BufferError> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(String::new());
        }

        self.move_gap_to(start);
        let count = end - start;
        let deleted: String = self.buffer[self.gap_end..self.gap_end + count].iter().collect();
        self.gap_end += count;
        Ok(deleted)
    }

    fn check_position(&self, pos: usize) -> Result<(), BufferError> {
        let len = self.len_chars();
        if pos > len {
            return Err(BufferError::InvalidPosition { position: pos, len });
        }
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), BufferError> {
        let len = self.len_chars();
        if start > end || end > len {
            return Err(BufferError::InvalidRange { start, end, len });
        }
        Ok(())
    }

    /// ギャップを指定位置に移動（`pos <= len` は呼び出し側で保証）
    fn move_gap_to(&mut self, pos: usize) {
        if pos < self.gap_start {
            // ギャップを左に移動
            let move_size = self.gap_start - pos;
            let new_gap_end = self.gap_end - move_size;
            self.buffer.copy_within(pos..self.gap_start, new_gap_end);
            self.gap_start = pos;
            self.gap_end = new_gap_end;
        } else if pos > self.gap_start {
            // ギャップを右に移動
            let move_size = pos - self.gap_start;
            self.buffer
                .copy_within(self.gap_end..self.gap_end + move_size, self.gap_start);
            self.gap_start += move_size;
            self.gap_end += move_size;
        }
    }

    /// ギャップに最低 `additional` 文字分の空きを確保
    fn reserve_gap(&mut self, additional: usize) {
        if self.gap_size() >= additional {
            return;
        }

        let current_gap = self.gap_size().max(MIN_GAP_RESERVE);
        let required = additional + MIN_GAP_RESERVE;
        let new_gap_size = current_gap
            .saturating_mul(GAP_GROWTH_FACTOR)
            .max(required)
            .min(MAX_GAP_GROWTH.max(required));

        let suffix_len = self.buffer.len() - self.gap_end;
        let mut new_buffer = Vec::with_capacity(self.gap_start + new_gap_size + suffix_len);
        new_buffer.extend_from_slice(&self.buffer[..self.gap_start]);
        new_buffer.resize(self.gap_start + new_gap_size, GAP_FILL);
        new_buffer.extend_from_slice(&self.buffer[self.gap_end..]);

        self.buffer = new_buffer;
        self.gap_end = self.gap_start + new_gap_size;
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;
        for ch in self.chars() {
            f.write_char(ch)?;
        }
        Ok(())
    }
}
