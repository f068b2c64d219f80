//! 編集履歴
//!
//! undo/redo スタックと、記録されたアクションを逆適用・再適用する処理。

pub mod replay;

pub use replay::{ReplayGuard, ReplayState};

use crate::buffer::GapBuffer;
use crate::error::{BufferError, HistoryError};

/// 履歴を適用する対象
///
/// アクションの逆適用・再適用はこの 2 操作だけで表現する。
pub trait EditTarget {
    /// `position` に `text` を挿入
    fn insert_text(&mut self, position: usize, text: &str) -> Result<(), BufferError>;

    /// `position` から `len` 文字を取り除き、取り除いた文字列を返す
    fn remove_text(&mut self, position: usize, len: usize) -> Result<String, BufferError>;
}

impl EditTarget for GapBuffer {
    fn insert_text(&mut self, position: usize, text: &str) -> Result<(), BufferError> {
        self.insert_str(position, text)
    }

    fn remove_text(&mut self, position: usize, len: usize) -> Result<String, BufferError> {
        self.delete_range(position, position.saturating_add(len))
    }
}

/// 記録済みの編集 1 件
///
/// 逆適用に必要な内容をすべて保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Insert {
        position: usize,
        text: String,
    },
    Delete {
        position: usize,
        text: String,
    },
    /// 削除してから挿入した複合編集。`removed` と `inserted` は同じ位置に対応する
    Replace {
        position: usize,
        removed: String,
        inserted: String,
    },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Insert { .. } => "insert",
            Action::Delete { .. } => "delete",
            Action::Replace { .. } => "replace",
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Action::Insert { position, .. }
            | Action::Delete { position, .. }
            | Action::Replace { position, .. } => *position,
        }
    }

    /// 編集前の状態に戻す
    pub fn revert<T: EditTarget + ?Sized>(&self, target: &mut T) -> Result<(), HistoryError> {
        let kind = self.kind();
        match self {
            Action::Insert { position, text } => remove_span(target, kind, *position, text),
            Action::Delete { position, text } => insert_span(target, kind, *position, text),
            Action::Replace {
                position,
                removed,
                inserted,
            } => {
                remove_span(target, kind, *position, inserted)?;
                insert_span(target, kind, *position, removed)
            }
        }
    }

    /// 編集を再度適用する
    pub fn reapply<T: EditTarget + ?Sized>(&self, target: &mut T) -> Result<(), HistoryError> {
        let kind = self.kind();
        match self {
            Action::Insert { position, text } => insert_span(target, kind, *position, text),
            Action::Delete { position, text } => remove_span(target, kind, *position, text),
            Action::Replace {
                position,
                removed,
                inserted,
            } => {
                remove_span(target, kind, *position, removed)?;
                insert_span(target, kind, *position, inserted)
            }
        }
    }

    fn can_merge_with(&self, next: &Action) -> bool {
        let (
            Action::Insert {
                position: prev_pos,
                text: prev_text,
            },
            Action::Insert {
                position: next_pos,
                text: next_text,
            },
        ) = (self, next)
        else {
            return false;
        };

        is_word_text(prev_text)
            && is_word_text(next_text)
            && *next_pos == prev_pos + prev_text.chars().count()
    }

    fn merge_with(&mut self, next: Action) {
        if let (Action::Insert { text: prev_text, .. }, Action::Insert { text: next_text, .. }) =
            (self, next)
        {
            prev_text.push_str(&next_text);
        }
    }
}

fn is_word_text(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn insert_span<T: EditTarget + ?Sized>(
    target: &mut T,
    kind: &'static str,
    position: usize,
    text: &str,
) -> Result<(), HistoryError> {
    target
        .insert_text(position, text)
        .map_err(|source| HistoryError::Replay {
            kind,
            position,
            source,
        })
}

/// `expected` が `position` に存在することを確かめながら取り除く
fn remove_span<T: EditTarget + ?Sized>(
    target: &mut T,
    kind: &'static str,
    position: usize,
    expected: &str,
) -> Result<(), HistoryError> {
    let len = expected.chars().count();
    let found = target
        .remove_text(position, len)
        .map_err(|source| HistoryError::Replay {
            kind,
            position,
            source,
        })?;

    if found != expected {
        // 取り除いた内容は戻しておく
        if let Err(err) = target.insert_text(position, &found) {
            log::error!("failed to restore text at {}: {}", position, err);
        }
        return Err(HistoryError::Diverged {
            position,
            expected: expected.to_string(),
            found,
        });
    }
    Ok(())
}

/// 編集履歴スタック
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo: Vec<Action>,
    redo: Vec<Action>,
    limit: Option<usize>,
    merge_typing: bool,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// undo スタックの上限を設定
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// 連続した単語入力の結合を有効化
    pub fn with_merge_typing(mut self, merge: bool) -> Self {
        self.merge_typing = merge;
        self
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// 次に undo されるアクション
    pub fn peek_undo(&self) -> Option<&Action> {
        self.undo.last()
    }

    /// 次に redo されるアクション
    pub fn peek_redo(&self) -> Option<&Action> {
        self.redo.last()
    }

    /// 両スタックを空にする
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// 新しい編集を記録する。redo スタックは破棄される
    pub fn push(&mut self, action: Action) {
        self.redo.clear();

        if self.merge_typing {
            if let Some(last) = self.undo.last_mut() {
                if last.can_merge_with(&action) {
                    last.merge_with(action);
                    return;
                }
            }
        }

        self.undo.push(action);
        self.enforce_limit();
    }

    /// 編集を適用し、成功した場合のみ記録する
    ///
    /// 新しい編集が履歴に入る唯一の経路。
    pub fn record_and_apply<F, E>(&mut self, action: Action, apply: F) -> Result<(), E>
    where
        F: FnOnce(&Action) -> Result<(), E>,
    {
        apply(&action)?;
        log::debug!("recorded {} at {}", action.kind(), action.position());
        self.push(action);
        Ok(())
    }

    /// 直近のアクションを取り消す。スタックが空なら `Ok(false)`
    ///
    /// 失敗したアクションは undo スタックに戻される。
    pub fn undo<T: EditTarget + ?Sized>(&mut self, target: &mut T) -> Result<bool, HistoryError> {
        let Some(action) = self.undo.pop() else {
            return Ok(false);
        };

        match action.revert(target) {
            Ok(()) => {
                log::debug!("undo {} at {}", action.kind(), action.position());
                self.redo.push(action);
                Ok(true)
            }
            Err(err) => {
                log::error!("undo of {} failed: {}", action.kind(), err);
                self.undo.push(action);
                Err(err)
            }
        }
    }

    /// 直近に取り消したアクションをやり直す。スタックが空なら `Ok(false)`
    pub fn redo<T: EditTarget + ?Sized>(&mut self, target: &mut T) -> Result<bool, HistoryError> {
        let Some(action) = self.redo.pop() else {
            return Ok(false);
        };

        match action.reapply(target) {
            Ok(()) => {
                log::debug!("redo {} at {}", action.kind(), action.position());
                self.undo.push(action);
                Ok(true)
            }
            Err(err) => {
                log::error!("redo of {} failed: {}", action.kind(), err);
                self.redo.push(action);
                Err(err)
            }
        }
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.undo.len() > limit {
                let excess = self.undo.len() - limit;
                self.undo.drain(..excess);
                log::trace!("dropped {} oldest history entries", excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(position: usize, text: &str) -> Action {
        Action::Insert {
            position,
            text: text.to_string(),
        }
    }

    fn apply_insert(buffer: &mut GapBuffer, position: usize, text: &str) -> Action {
        buffer.insert_str(position, text).unwrap();
        insert(position, text)
    }

    #[test]
    fn undo_and_redo_on_empty_stacks_are_noops() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::from_str("abc");

        assert_eq!(history.undo(&mut buffer), Ok(false));
        assert_eq!(history.redo(&mut buffer), Ok(false));
        assert_eq!(buffer.get_text(), "abc");
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn record_and_apply_pushes_only_on_success() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::new();

        let ok: Result<(), BufferError> =
            history.record_and_apply(insert(0, "hi"), |_| buffer.insert_str(0, "hi"));
        assert!(ok.is_ok());
        assert_eq!(history.undo_len(), 1);

        let failed = history.record_and_apply(insert(9, "x"), |_| buffer.insert_str(9, "x"));
        assert!(failed.is_err());
        assert_eq!(history.undo_len(), 1);
        assert_eq!(buffer.get_text(), "hi");
    }

    #[test]
    fn undo_moves_action_to_redo_and_back() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::new();
        let action = apply_insert(&mut buffer, 0, "abc");
        history.push(action.clone());

        assert_eq!(history.undo(&mut buffer), Ok(true));
        assert_eq!(buffer.get_text(), "");
        assert_eq!(history.peek_redo(), Some(&action));

        assert_eq!(history.redo(&mut buffer), Ok(true));
        assert_eq!(buffer.get_text(), "abc");
        assert_eq!(history.peek_undo(), Some(&action));
        assert!(!history.can_redo());
    }

    #[test]
    fn push_clears_redo() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::new();
        history.push(apply_insert(&mut buffer, 0, "a"));
        history.undo(&mut buffer).unwrap();
        assert!(history.can_redo());

        history.push(apply_insert(&mut buffer, 0, "b"));
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut buffer), Ok(false));
        assert_eq!(buffer.get_text(), "b");
    }

    #[test]
    fn replace_reverts_in_one_step() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::from_str("hello world");
        let removed = buffer.delete_range(6, 11).unwrap();
        buffer.insert_str(6, "rust!").unwrap();
        history.push(Action::Replace {
            position: 6,
            removed,
            inserted: "rust!".to_string(),
        });

        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer.get_text(), "hello world");
        history.redo(&mut buffer).unwrap();
        assert_eq!(buffer.get_text(), "hello rust!");
    }

    #[test]
    fn replace_with_different_lengths_reverts_exactly() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::from_str("abXYZcd");
        let removed = buffer.delete_range(2, 5).unwrap();
        buffer.insert_str(2, "-").unwrap();
        history.push(Action::Replace {
            position: 2,
            removed,
            inserted: "-".to_string(),
        });
        assert_eq!(buffer.get_text(), "ab-cd");

        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer.get_text(), "abXYZcd");
        history.redo(&mut buffer).unwrap();
        assert_eq!(buffer.get_text(), "ab-cd");
    }

    #[test]
    fn diverged_content_is_reported_and_action_kept() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::new();
        history.push(apply_insert(&mut buffer, 0, "abc"));

        // 履歴を経由せずに内容を書き換える
        buffer.set_content("xyz");

        let err = history.undo(&mut buffer).unwrap_err();
        assert_eq!(
            err,
            HistoryError::Diverged {
                position: 0,
                expected: "abc".to_string(),
                found: "xyz".to_string(),
            }
        );
        assert_eq!(buffer.get_text(), "xyz");
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn out_of_range_replay_is_reported() {
        let mut history = EditHistory::new();
        let mut buffer = GapBuffer::new();
        history.push(Action::Delete {
            position: 5,
            text: "q".to_string(),
        });

        let err = history.undo(&mut buffer).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::Replay { kind: "delete", position: 5, .. }
        ));
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn limit_drops_oldest_entries() {
        let mut history = EditHistory::new().with_limit(Some(2));
        let mut buffer = GapBuffer::new();
        history.push(apply_insert(&mut buffer, 0, "a"));
        history.push(apply_insert(&mut buffer, 1, "b"));
        history.push(apply_insert(&mut buffer, 2, "c"));

        assert_eq!(history.undo_len(), 2);
        history.undo(&mut buffer).unwrap();
        history.undo(&mut buffer).unwrap();
        assert_eq!(history.undo(&mut buffer), Ok(false));
        assert_eq!(buffer.get_text(), "a");
    }

    #[test]
    fn merge_typing_joins_adjacent_words() {
        let mut history = EditHistory::new().with_merge_typing(true);
        let mut buffer = GapBuffer::new();
        history.push(apply_insert(&mut buffer, 0, "he"));
        history.push(apply_insert(&mut buffer, 2, "llo"));
        history.push(apply_insert(&mut buffer, 5, " "));
        history.push(apply_insert(&mut buffer, 6, "w"));

        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.peek_undo(), Some(&insert(6, "w")));

        history.undo(&mut buffer).unwrap();
        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer.get_text(), "hello");
        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer.get_text(), "");
    }

    #[test]
    fn merge_typing_ignores_non_adjacent_inserts() {
        let mut history = EditHistory::new().with_merge_typing(true);
        let mut buffer = GapBuffer::new();
        history.push(apply_insert(&mut buffer, 0, "abc"));
        history.push(apply_insert(&mut buffer, 0, "x"));
        assert_eq!(history.undo_len(), 2);
    }
}
