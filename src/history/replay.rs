//! 履歴再生モード
//!
//! undo/redo 中の変更を新しい編集として記録し直さないためのフラグ。
//! フラグはガードの生存期間だけ立ち、ガードの `Drop` で必ず元に戻る。

use std::cell::Cell;
use std::rc::Rc;

/// 再生モードの共有ハンドル
///
/// クローンは同じフラグを指す。シェル側のビューが自分の変更通知を
/// ファサードへ送り返すかどうかの判定に使える。
#[derive(Debug, Clone, Default)]
pub struct ReplayState {
    active: Rc<Cell<bool>>,
}

impl ReplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 再生中かどうか
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// 再生モードに入る。返されたガードが破棄されるまで有効
    #[must_use = "replay mode ends as soon as the guard is dropped"]
    pub fn enter(&self) -> ReplayGuard {
        let previous = self.active.replace(true);
        ReplayGuard {
            active: Rc::clone(&self.active),
            previous,
        }
    }
}

/// 再生モードのスコープガード
#[derive(Debug)]
pub struct ReplayGuard {
    active: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for ReplayGuard {
    fn drop(&mut self) {
        self.active.set(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_sets_and_clears_flag() {
        let state = ReplayState::new();
        assert!(!state.is_active());
        {
            let _guard = state.enter();
            assert!(state.is_active());
        }
        assert!(!state.is_active());
    }

    #[test]
    fn clones_share_the_flag() {
        let state = ReplayState::new();
        let view_handle = state.clone();
        let guard = state.enter();
        assert!(view_handle.is_active());
        drop(guard);
        assert!(!view_handle.is_active());
    }

    #[test]
    fn nested_guards_restore_outer_state() {
        let state = ReplayState::new();
        let outer = state.enter();
        {
            let _inner = state.enter();
            assert!(state.is_active());
        }
        assert!(state.is_active());
        drop(outer);
        assert!(!state.is_active());
    }

    #[test]
    fn flag_is_cleared_when_replay_panics() {
        let state = ReplayState::new();
        let handle = state.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = handle.enter();
            panic!("replay failed");
        }));
        assert!(result.is_err());
        assert!(!state.is_active());
    }
}
