use std::cell::Cell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

pub type HoverHandler = Rc<dyn Fn()>;

/// Pointer-hover flag shared between a component and its event binders.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
    hovered: Rc<Cell<bool>>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    pub fn set_hovered(&self, hovered: bool) {
        self.hovered.set(hovered);
    }

    pub fn event_binders(&self) -> HoverBinders {
        let enter = self.hovered.clone();
        let leave = self.hovered.clone();
        HoverBinders {
            on_mouse_enter: Rc::new(move || enter.set(true)),
            on_mouse_leave: Rc::new(move || leave.set(false)),
        }
    }
}

#[derive(Clone)]
pub struct HoverBinders {
    pub on_mouse_enter: HoverHandler,
    pub on_mouse_leave: HoverHandler,
}

impl Debug for HoverBinders {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverBinders").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binders_toggle_shared_flag() {
        let hover = HoverState::new();
        let binders = hover.event_binders();
        assert!(!hover.is_hovered());

        (binders.on_mouse_enter)();
        assert!(hover.is_hovered());

        (binders.on_mouse_leave)();
        assert!(!hover.is_hovered());
    }

    #[test]
    fn manual_setter_is_visible_to_clones() {
        let hover = HoverState::new();
        let clone = hover.clone();
        clone.set_hovered(true);
        assert!(hover.is_hovered());
    }
}
