//! Navigation-bar language dropdown.
//!
//! Follows the store through a subscription: any language change, wherever
//! it comes from, updates the label and closes the dropdown.

use crate::i18n::{LanguageCode, LanguageOption};
use crate::store::{LanguageStore, Subscription};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct SwitcherState {
    open: bool,
    current: LanguageCode,
}

pub struct LanguageSwitcher {
    store: Arc<LanguageStore>,
    state: Arc<Mutex<SwitcherState>>,
    _subscription: Subscription,
}

impl LanguageSwitcher {
    pub fn new(store: Arc<LanguageStore>) -> Self {
        let state = Arc::new(Mutex::new(SwitcherState {
            open: false,
            current: store.current(),
        }));
        let sink = Arc::clone(&state);
        let subscription = store.subscribe(move |code| {
            let mut state = sink.lock().unwrap_or_else(|e| e.into_inner());
            state.current = code;
            state.open = false;
        });
        Self {
            store,
            state,
            _subscription: subscription,
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn toggle(&self) {
        let mut state = self.lock();
        state.open = !state.open;
    }

    pub fn close(&self) {
        self.lock().open = false;
    }

    /// Pick a language from the dropdown.
    pub fn select(&self, code: LanguageCode) {
        self.store.select(code);
        // selecting the current language produces no change notification
        self.close();
    }

    pub fn current(&self) -> LanguageCode {
        self.lock().current
    }

    /// Native name of the current language, shown on the toggle button.
    pub fn label(&self) -> &'static str {
        let current = self.current();
        self.store
            .registry()
            .get(current)
            .map(|option| option.native_name)
            .unwrap_or_else(|| current.as_str())
    }

    /// Dropdown entries with a flag marking the current language.
    pub fn options(&self) -> Vec<(LanguageOption, bool)> {
        let current = self.current();
        self.store
            .available()
            .into_iter()
            .map(|option| {
                let selected = option.code == current;
                (option, selected)
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SwitcherState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
