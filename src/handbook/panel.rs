// src/handbook/panel.rs

use super::key::ContentKey;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    NoTabSelected,
    TabSelected(ContentKey),
}

/// Tab selection for one handbook panel. Once a tab is selected the panel
/// only ever moves to another visible tab.
#[derive(Debug, Clone)]
pub struct HandbookPanel {
    visible: Vec<ContentKey>,
    state: PanelState,
}

impl HandbookPanel {
    pub fn new(visible: Vec<ContentKey>) -> Self {
        Self {
            visible,
            state: PanelState::NoTabSelected,
        }
    }

    pub fn visible(&self) -> &[ContentKey] {
        &self.visible
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn selected(&self) -> Option<&ContentKey> {
        match &self.state {
            PanelState::TabSelected(key) => Some(key),
            PanelState::NoTabSelected => None,
        }
    }

    /// Selects the first visible tab if nothing is selected yet.
    pub fn select_default(&mut self) -> Option<&ContentKey> {
        if matches!(self.state, PanelState::NoTabSelected) {
            if let Some(first) = self.visible.first() {
                self.state = PanelState::TabSelected(first.clone());
            }
        }
        self.selected()
    }

    /// Returns `false` and leaves the state alone when `key` is not visible.
    pub fn select(&mut self, key: &ContentKey) -> bool {
        if !self.visible.contains(key) {
            return false;
        }
        self.state = PanelState::TabSelected(key.clone());
        true
    }
}
