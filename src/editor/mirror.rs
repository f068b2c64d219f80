//! 変更イベントを受けて内容を複製するビュー
//!
//! シェル側の表示ウィジェットの代わりに使える最小のビュー実装。

use super::{ChangeEvent, ChangeListener};
use std::cell::RefCell;
use std::rc::Rc;

/// 変更イベントだけから内容を再構築するミラー
///
/// クローンは同じ内容を共有するので、一方をリスナーとして登録し
/// もう一方から内容を読み出せる。
#[derive(Debug, Clone, Default)]
pub struct TextMirror {
    chars: Rc<RefCell<Vec<char>>>,
}

impl TextMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の内容
    pub fn text(&self) -> String {
        self.chars.borrow().iter().collect()
    }

    pub fn len_chars(&self) -> usize {
        self.chars.borrow().len()
    }
}

impl ChangeListener for TextMirror {
    fn on_change(&mut self, event: &ChangeEvent) {
        let mut chars = self.chars.borrow_mut();
        match event {
            ChangeEvent::Insert { position, text, .. } => {
                if *position > chars.len() {
                    log::warn!(
                        "mirror out of step: insert at {} beyond length {}",
                        position,
                        chars.len()
                    );
                    debug_assert!(false, "insert position outside mirror");
                }
                let at = (*position).min(chars.len());
                chars.splice(at..at, text.chars());
            }
            ChangeEvent::Delete { position, text, .. } => {
                let count = text.chars().count();
                let in_step = position.saturating_add(count) <= chars.len()
                    && chars[*position..*position + count].iter().copied().eq(text.chars());
                if !in_step {
                    log::warn!(
                        "mirror out of step: delete of {:?} at {} (length {})",
                        text,
                        position,
                        chars.len()
                    );
                    debug_assert!(false, "delete span does not match mirror");
                }
                let start = (*position).min(chars.len());
                let end = (start + count).min(chars.len());
                chars.drain(start..end);
            }
            ChangeEvent::Reload { text } => {
                *chars = text.chars().collect();
            }
        }
    }
}
