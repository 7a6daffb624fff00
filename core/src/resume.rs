use crate::storage::KeyValueStore;

pub const SOLVED_MARKER_VALUE: &str = "1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    Navigate,
    Reload,
    BackForward,
    Other,
}

impl NavigationKind {
    pub fn from_entry_type(entry_type: &str) -> Self {
        match entry_type.trim().to_ascii_lowercase().as_str() {
            "navigate" => NavigationKind::Navigate,
            "reload" => NavigationKind::Reload,
            "back_forward" => NavigationKind::BackForward,
            _ => NavigationKind::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeBinding {
    Load,
    PageShow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageShowSignal {
    pub binding: ResumeBinding,
    pub navigation: NavigationKind,
    pub persisted: bool,
}

impl PageShowSignal {
    pub fn load(navigation: NavigationKind) -> Self {
        Self {
            binding: ResumeBinding::Load,
            navigation,
            persisted: false,
        }
    }

    pub fn page_show(navigation: NavigationKind, persisted: bool) -> Self {
        Self {
            binding: ResumeBinding::PageShow,
            navigation,
            persisted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationClass {
    Fresh,
    BackForward,
}

pub fn classify(signal: PageShowSignal) -> NavigationClass {
    if signal.persisted {
        return NavigationClass::BackForward;
    }
    match signal.navigation {
        NavigationKind::BackForward => NavigationClass::BackForward,
        NavigationKind::Navigate | NavigationKind::Reload | NavigationKind::Other => {
            NavigationClass::Fresh
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeDecision {
    Fresh,
    RestoreSolved,
}

#[derive(Clone, Debug)]
pub struct SessionResumeController {
    marker_key: String,
}

impl SessionResumeController {
    pub fn new(marker_key: impl Into<String>) -> Self {
        Self {
            marker_key: marker_key.into(),
        }
    }

    pub fn marker_key(&self) -> &str {
        &self.marker_key
    }

    pub fn has_marker(&self, store: &dyn KeyValueStore) -> bool {
        store.get(&self.marker_key).is_some()
    }

    pub fn mark_solved(&self, store: &mut dyn KeyValueStore) {
        store.set(&self.marker_key, SOLVED_MARKER_VALUE);
    }

    pub fn decide(&self, signal: PageShowSignal, store: &mut dyn KeyValueStore) -> ResumeDecision {
        match classify(signal) {
            NavigationClass::BackForward if self.has_marker(store) => ResumeDecision::RestoreSolved,
            NavigationClass::BackForward | NavigationClass::Fresh => {
                store.remove(&self.marker_key);
                ResumeDecision::Fresh
            }
        }
    }
}
