//! Language state store: owns the current language and tells everyone
//! who subscribed when it changes.
//!
//! # Delivery
//!
//! Handlers run one at a time, in the order changes were applied. A
//! `set_language` issued while a notification cycle is running (from a
//! handler, or from another thread) is queued and applied once the cycle
//! completes. Requests for the language that is already current are
//! ignored, which keeps handlers that echo a change from looping.

use crate::document::{DomSynchronizer, SharedDocument};
use crate::i18n::{locale, Direction, LanguageCode, LanguageOption, LanguageRegistry};
use crate::persistence::PreferenceStore;
use crate::translation::TranslationFacade;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

type Handler = Arc<dyn Fn(LanguageCode) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

#[derive(Default)]
struct Dispatch {
    running: bool,
    queue: VecDeque<LanguageCode>,
}

/// Where the initial language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSource {
    Persisted,
    Detected,
    Default,
}

pub struct LanguageStore {
    registry: Arc<LanguageRegistry>,
    current: RwLock<LanguageCode>,
    initial_source: InitialSource,
    translator: Arc<TranslationFacade>,
    dom: DomSynchronizer,
    preferences: PreferenceStore,
    runtime: Option<Handle>,
    subscribers: Arc<Mutex<Subscribers>>,
    dispatch: Mutex<Dispatch>,
}

/// Builder for [`LanguageStore`].
pub struct LanguageStoreBuilder {
    registry: Arc<LanguageRegistry>,
    translator: Arc<TranslationFacade>,
    dom: DomSynchronizer,
    preferences: PreferenceStore,
    detected: Vec<String>,
    runtime: Option<Handle>,
}

impl LanguageStoreBuilder {
    /// Attach the page document whose root gets `lang`/`dir`.
    pub fn with_document(mut self, document: SharedDocument) -> Self {
        self.dom = DomSynchronizer::new(document);
        self
    }

    pub fn with_preferences(mut self, preferences: PreferenceStore) -> Self {
        self.preferences = preferences;
        self
    }

    /// Language tags reported by the environment, most preferred first
    /// (browser languages, `Accept-Language`, POSIX locale).
    pub fn with_detected_languages<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.detected = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Runtime used for translation loads. Defaults to the runtime the
    /// builder is created on, if any.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Arc<LanguageStore> {
        let persisted = self
            .preferences
            .load()
            .filter(|code| self.registry.is_enabled(*code));
        let detected = locale::detect_preferred(self.detected.as_slice(), &self.registry);

        let (initial, initial_source) = match (persisted, detected) {
            (Some(code), _) => (code, InitialSource::Persisted),
            (None, Some(code)) => (code, InitialSource::Detected),
            (None, None) => (self.registry.default_language(), InitialSource::Default),
        };
        info!("Initial language '{}' ({:?})", initial, initial_source);

        let store = Arc::new(LanguageStore {
            registry: self.registry,
            current: RwLock::new(initial),
            initial_source,
            translator: self.translator,
            dom: self.dom,
            preferences: self.preferences,
            runtime: self.runtime,
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            dispatch: Mutex::new(Dispatch::default()),
        });
        store.activate_translations(initial);
        store.dom.apply(initial);
        store.preferences.save(initial);
        store
    }
}

impl LanguageStore {
    pub fn builder(
        registry: Arc<LanguageRegistry>,
        translator: Arc<TranslationFacade>,
    ) -> LanguageStoreBuilder {
        LanguageStoreBuilder {
            registry,
            translator,
            dom: DomSynchronizer::detached(),
            preferences: PreferenceStore::unavailable(),
            detected: Vec::new(),
            runtime: Handle::try_current().ok(),
        }
    }

    /// The current language. Never fails.
    pub fn current(&self) -> LanguageCode {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn initial_source(&self) -> InitialSource {
        self.initial_source
    }

    pub fn current_option(&self) -> LanguageOption {
        self.registry
            .get(self.current())
            .cloned()
            .unwrap_or_else(|| self.registry.default_option().clone())
    }

    pub fn current_locale(&self) -> &'static str {
        locale::locale_tag(self.current())
    }

    pub fn direction(&self) -> Direction {
        locale::direction(self.current())
    }

    pub fn is_rtl(&self) -> bool {
        self.direction().is_rtl()
    }

    /// Languages offered to visitors, in registry order.
    pub fn available(&self) -> Vec<LanguageOption> {
        self.registry.list_enabled().into_iter().cloned().collect()
    }

    pub fn registry(&self) -> &Arc<LanguageRegistry> {
        &self.registry
    }

    pub fn translator(&self) -> &Arc<TranslationFacade> {
        &self.translator
    }

    /// Switch to the language named by `raw`.
    ///
    /// Unknown or disabled codes log a warning and select the default
    /// language instead. Returns the language that was requested after
    /// that substitution.
    pub fn set_language(&self, raw: &str) -> LanguageCode {
        let code = match self.registry.resolve(raw) {
            Ok(code) => code,
            Err(e) => {
                let fallback = self.registry.default_language();
                warn!("{}, falling back to '{}'", e, fallback);
                fallback
            }
        };
        self.enqueue(code);
        code
    }

    /// Typed variant of [`set_language`](Self::set_language).
    pub fn select(&self, code: LanguageCode) -> LanguageCode {
        let code = if self.registry.is_enabled(code) {
            code
        } else {
            let fallback = self.registry.default_language();
            warn!("Language '{}' is not enabled, falling back to '{}'", code, fallback);
            fallback
        };
        self.enqueue(code);
        code
    }

    /// Move to the next enabled language in registry order, wrapping around.
    pub fn switch_to_next(&self) -> LanguageCode {
        let next = self.registry.next_after(self.current());
        self.enqueue(next);
        next
    }

    /// Register `handler`. It is called right away with the current language
    /// and again after every change until the subscription is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(LanguageCode) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let id = {
            let mut subscribers = self.lock_subscribers();
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.handlers.push((id, Arc::clone(&handler)));
            id
        };
        handler(self.current());

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
            active: true,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().handlers.len()
    }

    fn enqueue(&self, code: LanguageCode) {
        {
            let mut dispatch = self.lock_dispatch();
            dispatch.queue.push_back(code);
            if dispatch.running {
                debug!("Language change to '{}' queued behind running notification", code);
                return;
            }
            dispatch.running = true;
        }

        let _guard = DispatchGuard { store: self };
        loop {
            let next = {
                let mut dispatch = self.lock_dispatch();
                match dispatch.queue.pop_front() {
                    Some(next) => next,
                    None => {
                        dispatch.running = false;
                        break;
                    }
                }
            };
            self.apply(next);
        }
    }

    fn apply(&self, code: LanguageCode) {
        let previous = self.current();
        if previous == code {
            debug!("Language '{}' already current, ignoring", code);
            return;
        }

        self.activate_translations(code);
        self.dom.apply(code);
        self.preferences.save(code);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = code;
        info!("Language changed: {} -> {}", previous, code);

        let handlers: Vec<Handler> = self
            .lock_subscribers()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(code);
        }
    }

    fn activate_translations(&self, code: LanguageCode) {
        let Some(runtime) = &self.runtime else {
            debug!("No async runtime, translations for '{}' not requested", code);
            return;
        };
        let activation = self.translator.begin_activation(code);
        runtime.spawn(async move {
            // failures are logged and reflected in the facade's readiness
            let _ = activation.await;
        });
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_dispatch(&self) -> std::sync::MutexGuard<'_, Dispatch> {
        self.dispatch.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for LanguageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageStore")
            .field("current", &self.current())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Resets the dispatch state if a handler panics mid-cycle.
struct DispatchGuard<'a> {
    store: &'a LanguageStore,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut dispatch = self.store.lock_dispatch();
            dispatch.running = false;
            dispatch.queue.clear();
        }
    }
}

/// Handle to a registered change handler. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
    active: bool,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Keep the handler registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(subscribers) = self.subscribers.upgrade() {
            let mut subscribers = subscribers.lock().unwrap_or_else(|e| e.into_inner());
            subscribers.handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
