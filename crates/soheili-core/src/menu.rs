//! Mobile navigation drawer

use serde::Serialize;
use tracing::debug;

use crate::scroll_lock::{LockHolder, ScrollLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Open/closed state of the mobile menu
///
/// Holds the [`LockHolder::Menu`] claim on the scroll lock while open.
#[derive(Debug, Default, Clone)]
pub struct MenuController {
    state: MenuState,
}

impl MenuController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hamburger click
    pub fn toggle(&mut self, lock: &mut ScrollLock) -> MenuState {
        match self.state {
            MenuState::Closed => self.open(lock),
            MenuState::Open => {
                self.close(lock);
            }
        }
        self.state
    }

    pub fn open(&mut self, lock: &mut ScrollLock) {
        self.state = MenuState::Open;
        lock.acquire(LockHolder::Menu);
        debug!("menu opened");
    }

    /// Close the menu. Returns false if it was already closed.
    pub fn close(&mut self, lock: &mut ScrollLock) -> bool {
        if self.state == MenuState::Closed {
            return false;
        }
        self.state = MenuState::Closed;
        lock.release(LockHolder::Menu);
        debug!("menu closed");
        true
    }

    /// Any nav link click closes the drawer
    pub fn on_nav_link_click(&mut self, lock: &mut ScrollLock) {
        self.close(lock);
    }

    /// Document click; clicks inside the menu or on the hamburger don't count
    pub fn on_document_click(&mut self, inside_menu: bool, lock: &mut ScrollLock) {
        if !inside_menu {
            self.close(lock);
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_state_and_lock() {
        let mut lock = ScrollLock::new();
        let mut menu = MenuController::new();

        assert_eq!(menu.toggle(&mut lock), MenuState::Open);
        assert!(lock.is_locked());

        assert_eq!(menu.toggle(&mut lock), MenuState::Closed);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut lock = ScrollLock::new();
        let mut menu = MenuController::new();
        assert!(!menu.close(&mut lock));

        menu.open(&mut lock);
        assert!(menu.close(&mut lock));
        assert!(!menu.close(&mut lock));
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_outside_click_closes_inside_click_does_not() {
        let mut lock = ScrollLock::new();
        let mut menu = MenuController::new();
        menu.open(&mut lock);

        menu.on_document_click(true, &mut lock);
        assert!(menu.is_open());

        menu.on_document_click(false, &mut lock);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_nav_link_click_closes() {
        let mut lock = ScrollLock::new();
        let mut menu = MenuController::new();
        menu.open(&mut lock);
        menu.on_nav_link_click(&mut lock);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_menu_close_keeps_lock_held_by_lightbox() {
        let mut lock = ScrollLock::new();
        let mut menu = MenuController::new();
        lock.acquire(LockHolder::Lightbox);
        menu.open(&mut lock);
        menu.close(&mut lock);
        assert!(lock.is_locked());
    }
}
