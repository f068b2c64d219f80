//! エディタモジュール
//!
//! シェルからの編集要求を受け付けるファサードと、変更通知の仕組み

pub mod mirror;
pub mod text_editor;

// 公開API
pub use mirror::TextMirror;
pub use text_editor::TextEditor;

/// 変更の発生源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// シェルから届いた新しい編集
    User,
    /// undo/redo による再生
    Replay,
    /// 文書全体のロード
    Load,
}

/// 変更イベント
///
/// ストアへの変更が成功するたびに発行される。シェルは同じ位置・内容で
/// 自分のビューを更新すれば、ビューとストアが食い違うことはない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Insert {
        position: usize,
        text: String,
        origin: EditOrigin,
    },
    Delete {
        position: usize,
        text: String,
        origin: EditOrigin,
    },
    /// 内容全体の置き換え
    Reload { text: String },
}

impl ChangeEvent {
    pub fn origin(&self) -> EditOrigin {
        match self {
            ChangeEvent::Insert { origin, .. } | ChangeEvent::Delete { origin, .. } => *origin,
            ChangeEvent::Reload { .. } => EditOrigin::Load,
        }
    }
}

/// 変更通知リスナー
pub trait ChangeListener {
    fn on_change(&mut self, event: &ChangeEvent);
}

/// 変更通知システム
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// リスナーを追加
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// 変更を通知
    pub fn notify(&mut self, event: ChangeEvent) {
        for listener in &mut self.listeners {
            listener.on_change(&event);
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
