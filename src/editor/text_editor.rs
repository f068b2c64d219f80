//! テキストエディタのメイン実装
//!
//! シェルからの挿入・削除・置換要求をシーケンスストアへの変更と
//! 履歴エントリに変換するファサード。

use super::{ChangeEvent, ChangeListener, ChangeNotifier, EditOrigin};
use crate::buffer::GapBuffer;
use crate::config::{EditorConfig, RecordGranularity};
use crate::error::{BufferError, Result};
use crate::history::{Action, EditHistory, EditTarget, ReplayState};

/// 編集ファサード
///
/// 新しい編集は必ず `EditHistory::record_and_apply` を通して記録される。
/// 再生モード中に届いた要求は、ストアが既にその変更を反映しているので
/// ストアにも履歴にも触れずに捨てる。
#[derive(Debug)]
pub struct TextEditor {
    /// シーケンスストア
    buffer: GapBuffer,
    /// 編集履歴
    history: EditHistory,
    /// 再生モードフラグ
    replay: ReplayState,
    /// 変更通知システム
    change_notifier: ChangeNotifier,
    config: EditorConfig,
}

impl TextEditor {
    /// 既定の設定で新しいエディタを作成
    pub fn new() -> Self {
        Self::build(EditorConfig::default())
    }

    /// 設定を検証してエディタを作成
    pub fn with_config(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EditorConfig) -> Self {
        Self {
            buffer: GapBuffer::with_capacity(config.initial_capacity),
            history: EditHistory::new()
                .with_limit(config.history_limit)
                .with_merge_typing(config.merge_typing),
            replay: ReplayState::new(),
            change_notifier: ChangeNotifier::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// 内容全体を取得
    pub fn get_text(&self) -> String {
        self.buffer.get_text()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &GapBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// 再生モードフラグの共有ハンドル
    pub fn replay_state(&self) -> ReplayState {
        self.replay.clone()
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.is_active()
    }

    /// 変更リスナーを追加
    pub fn add_change_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.change_notifier.add_listener(listener);
    }

    /// `position` に文字列を挿入
    ///
    /// 範囲外の位置や空文字列、再生モード中は何もせず `Ok(false)` を返す。
    pub fn insert_text(&mut self, position: usize, text: &str) -> Result<bool> {
        if self.ignore_during_replay("insert_text", position) {
            return Ok(false);
        }
        if text.is_empty() || position > self.buffer.len_chars() {
            log::trace!("insert_text ignored at {}", position);
            return Ok(false);
        }

        let actions = match self.config.granularity {
            RecordGranularity::PerRequest => vec![Action::Insert {
                position,
                text: text.to_string(),
            }],
            RecordGranularity::PerCharacter => text
                .chars()
                .enumerate()
                .map(|(offset, ch)| Action::Insert {
                    position: position + offset,
                    text: ch.to_string(),
                })
                .collect(),
        };

        self.commit(actions)?;
        Ok(true)
    }

    /// `position` から `len` 文字を削除
    ///
    /// `len` は残りの文字数に切り詰める。削除対象が無ければ `Ok(false)`。
    pub fn delete_range(&mut self, position: usize, len: usize) -> Result<bool> {
        if self.ignore_during_replay("delete_range", position) {
            return Ok(false);
        }
        let Some(removed) = self.removable_text(position, len)? else {
            log::trace!("delete_range ignored at {}", position);
            return Ok(false);
        };
        if removed.is_empty() {
            return Ok(false);
        }

        let actions = match self.config.granularity {
            RecordGranularity::PerRequest => vec![Action::Delete {
                position,
                text: removed,
            }],
            // 削除ごとに後続が詰まるので、常に同じ位置から削除する
            RecordGranularity::PerCharacter => removed
                .chars()
                .map(|ch| Action::Delete {
                    position,
                    text: ch.to_string(),
                })
                .collect(),
        };

        self.commit(actions)?;
        Ok(true)
    }

    /// `position` から `len` 文字を `text` で置き換える
    ///
    /// 記録単位の設定に関わらず、1 件の置換アクションとして記録される。
    pub fn replace_range(&mut self, position: usize, len: usize, text: &str) -> Result<bool> {
        if self.ignore_during_replay("replace_range", position) {
            return Ok(false);
        }
        let Some(removed) = self.removable_text(position, len)? else {
            log::trace!("replace_range ignored at {}", position);
            return Ok(false);
        };
        if removed.is_empty() && text.is_empty() {
            return Ok(false);
        }

        self.commit(vec![Action::Replace {
            position,
            removed,
            inserted: text.to_string(),
        }])?;
        Ok(true)
    }

    /// 内容全体を置き換える
    ///
    /// 履歴には残らず、undo/redo スタックは両方とも空になる。
    pub fn load_content(&mut self, text: &str) {
        let _guard = self.replay.enter();
        self.buffer.set_content(text);
        self.history.clear();
        log::debug!("loaded {} chars, history cleared", self.buffer.len_chars());
        self.change_notifier.notify(ChangeEvent::Reload {
            text: text.to_string(),
        });
    }

    /// 直近の編集を取り消す。取り消すものが無ければ `Ok(false)`
    pub fn undo(&mut self) -> Result<bool> {
        let _guard = self.replay.enter();
        let mut target = NotifyingTarget {
            buffer: &mut self.buffer,
            notifier: &mut self.change_notifier,
        };
        Ok(self.history.undo(&mut target)?)
    }

    /// 直近に取り消した編集をやり直す。やり直すものが無ければ `Ok(false)`
    pub fn redo(&mut self) -> Result<bool> {
        let _guard = self.replay.enter();
        let mut target = NotifyingTarget {
            buffer: &mut self.buffer,
            notifier: &mut self.change_notifier,
        };
        Ok(self.history.redo(&mut target)?)
    }

    /// 削除対象のテキスト。`position` が範囲外なら `None`
    fn removable_text(&self, position: usize, len: usize) -> Result<Option<String>> {
        let total = self.buffer.len_chars();
        if position > total {
            return Ok(None);
        }
        let end = position.saturating_add(len).min(total);
        Ok(Some(self.buffer.substring(position, end)?))
    }

    /// 再生中に届いた要求（ビューからの変更の折り返しなど）かどうか
    fn ignore_during_replay(&self, request: &str, position: usize) -> bool {
        if self.replay.is_active() {
            log::trace!("{} at {} ignored during replay", request, position);
            return true;
        }
        false
    }

    /// アクションを適用して履歴に記録する
    fn commit(&mut self, actions: Vec<Action>) -> Result<()> {
        for action in actions {
            let buffer = &mut self.buffer;
            let notifier = &mut self.change_notifier;
            self.history.record_and_apply(action, |action| {
                apply_primitives(buffer, notifier, EditOrigin::User, action)
            })?;
        }
        Ok(())
    }
}

impl Default for TextEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// アクションを 1 文字単位の挿入・削除に分解してストアへ適用し、通知する
fn apply_primitives(
    buffer: &mut GapBuffer,
    notifier: &mut ChangeNotifier,
    origin: EditOrigin,
    action: &Action,
) -> std::result::Result<(), BufferError> {
    match action {
        Action::Insert { position, text } => {
            insert_chars(buffer, *position, text)?;
            notifier.notify(ChangeEvent::Insert {
                position: *position,
                text: text.clone(),
                origin,
            });
        }
        Action::Delete { position, text } => {
            delete_chars(buffer, *position, text.chars().count())?;
            notifier.notify(ChangeEvent::Delete {
                position: *position,
                text: text.clone(),
                origin,
            });
        }
        Action::Replace {
            position,
            removed,
            inserted,
        } => {
            delete_chars(buffer, *position, removed.chars().count())?;
            if !removed.is_empty() {
                notifier.notify(ChangeEvent::Delete {
                    position: *position,
                    text: removed.clone(),
                    origin,
                });
            }
            insert_chars(buffer, *position, inserted)?;
            if !inserted.is_empty() {
                notifier.notify(ChangeEvent::Insert {
                    position: *position,
                    text: inserted.clone(),
                    origin,
                });
            }
        }
    }
    Ok(())
}

fn insert_chars(
    buffer: &mut GapBuffer,
    position: usize,
    text: &str,
) -> std::result::Result<(), BufferError> {
    for (offset, ch) in text.chars().enumerate() {
        if !buffer.insert_at(position + offset, ch) {
            return Err(BufferError::InvalidPosition {
                position: position + offset,
                len: buffer.len_chars(),
            });
        }
    }
    Ok(())
}

fn delete_chars(
    buffer: &mut GapBuffer,
    position: usize,
    count: usize,
) -> std::result::Result<(), BufferError> {
    for _ in 0..count {
        if buffer.delete_at(position).is_none() {
            return Err(BufferError::InvalidPosition {
                position,
                len: buffer.len_chars(),
            });
        }
    }
    Ok(())
}

/// 再生時の適用先。ストアを変更したうえでビューへ通知する
struct NotifyingTarget<'a> {
    buffer: &'a mut GapBuffer,
    notifier: &'a mut ChangeNotifier,
}

impl EditTarget for NotifyingTarget<'_> {
    fn insert_text(
        &mut self,
        position: usize,
        text: &str,
    ) -> std::result::Result<(), BufferError> {
        self.buffer.insert_text(position, text)?;
        if !text.is_empty() {
            self.notifier.notify(ChangeEvent::Insert {
                position,
                text: text.to_string(),
                origin: EditOrigin::Replay,
            });
        }
        Ok(())
    }

    fn remove_text(
        &mut self,
        position: usize,
        len: usize,
    ) -> std::result::Result<String, BufferError> {
        let removed = self.buffer.remove_text(position, len)?;
        if !removed.is_empty() {
            self.notifier.notify(ChangeEvent::Delete {
                position,
                text: removed.clone(),
                origin: EditOrigin::Replay,
            });
        }
        Ok(removed)
    }
}
