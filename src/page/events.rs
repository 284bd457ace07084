use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::models::Action;

/// Notifications dispatched on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Consumers re-settle their scroll position.
    Scroll,
    TabShown(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
}

/// A pointer click on a tab link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabClick {
    /// Raw `data-action` of the clicked tab; not necessarily a known action.
    pub action: String,
    pub href: String,
    pub meta_key: bool,
    pub ctrl_key: bool,
    pub button: MouseButton,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl TabClick {
    pub fn new(action: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            href: href.into(),
            meta_key: false,
            ctrl_key: false,
            button: MouseButton::Left,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Platform gesture for "open in a background tab".
    pub fn opens_in_new_tab(&self) -> bool {
        self.meta_key || self.ctrl_key || self.button == MouseButton::Middle
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[cfg(test)]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

type Listener = Rc<RefCell<dyn FnMut(&mut TabClick)>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Click target shared by all tab links. Cloning yields another handle to the
/// same listener list.
#[derive(Clone, Default)]
pub struct TabBar {
    listeners: Rc<RefCell<Listeners>>,
}

impl TabBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a click listener. It stays registered until the returned
    /// binding is released or dropped.
    pub fn listen(&self, listener: impl FnMut(&mut TabClick) + 'static) -> ClickBinding {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners
            .entries
            .push((id, Rc::new(RefCell::new(listener)) as Listener));

        ClickBinding {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Run listeners in registration order until one stops propagation.
    /// Returns how many listeners ran.
    pub fn dispatch(&self, event: &mut TabClick) -> usize {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        let mut ran = 0;
        for listener in snapshot {
            let mut callback = listener.borrow_mut();
            (&mut *callback)(event);
            drop(callback);
            ran += 1;
            if event.propagation_stopped() {
                break;
            }
        }
        ran
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Registration guard for a tab bar listener.
pub struct ClickBinding {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl ClickBinding {
    pub fn release(self) {}
}

impl Drop for ClickBinding {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn tab_click_detects_new_tab_gestures() {
        assert!(!TabClick::new("commits", "/mr/1/commits").opens_in_new_tab());
        assert!(TabClick::new("commits", "/mr/1/commits")
            .with_meta()
            .opens_in_new_tab());
        assert!(TabClick::new("commits", "/mr/1/commits")
            .with_ctrl()
            .opens_in_new_tab());
        assert!(TabClick::new("commits", "/mr/1/commits")
            .with_button(MouseButton::Middle)
            .opens_in_new_tab());
    }

    #[test]
    fn tab_bar_binding_drop_unregisters_listener() {
        let bar = TabBar::new();
        let binding = bar.listen(|_| {});
        assert_eq!(bar.listener_count(), 1);

        drop(binding);
        assert_eq!(bar.listener_count(), 0);
    }

    #[test]
    fn tab_bar_release_unregisters_only_its_listener() {
        let bar = TabBar::new();
        let first = bar.listen(|_| {});
        let _second = bar.listen(|_| {});

        first.release();
        assert_eq!(bar.listener_count(), 1);
    }

    #[test]
    fn tab_bar_dispatch_stops_on_immediate_propagation_stop() {
        let bar = TabBar::new();
        let later_calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&later_calls);

        let _stopper = bar.listen(|event| event.stop_immediate_propagation());
        let _later = bar.listen(move |_| counter.set(counter.get() + 1));

        let mut event = TabClick::new("diffs", "/mr/1/diffs");
        assert_eq!(bar.dispatch(&mut event), 1);
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn tab_bar_dispatch_runs_all_listeners_in_order() {
        let bar = TabBar::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&order);
        let second = Rc::clone(&order);

        let _a = bar.listen(move |_| first.borrow_mut().push("a"));
        let _b = bar.listen(move |_| second.borrow_mut().push("b"));

        let mut event = TabClick::new("diffs", "/mr/1/diffs");
        assert_eq!(bar.dispatch(&mut event), 2);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn binding_outliving_tab_bar_drops_cleanly() {
        let bar = TabBar::new();
        let binding = bar.listen(|_| {});
        drop(bar);
        drop(binding);
    }
}
