//! Translation facade: the single entry point for translated text.
//!
//! The facade tracks an explicit readiness state instead of relying on the
//! order in which callers initialize it. The default language is fixed at
//! construction, so there is no window in which a language can be activated
//! before the default is known.

use crate::error::TranslationLoadError;
use crate::i18n::LanguageCode;
use crate::translation::dictionary::{interpolate, Dictionary, TranslationParams};
use crate::translation::loader::TranslationLoader;
use crate::translation::metrics::TranslationMetrics;
use crate::translation::validator::{TranslationValidator, ValidationReport};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Whether translated text can be rendered yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// No language has been activated.
    Uninitialized,
    /// A dictionary load for the most recent request is in flight.
    Loading,
    /// The requested language's dictionary is active.
    Ready,
    /// The most recent load failed; lookups fall back to keys.
    Degraded,
}

impl Readiness {
    /// Ready to render, possibly with raw keys.
    pub fn is_settled(&self) -> bool {
        matches!(self, Readiness::Ready | Readiness::Degraded)
    }
}

#[derive(Debug, Default)]
struct EngineState {
    active: Option<LanguageCode>,
    dictionaries: HashMap<LanguageCode, Arc<Dictionary>>,
    coverage: HashMap<LanguageCode, ValidationReport>,
    /// Bumped on every activation request; completions from older
    /// generations are stale.
    generation: u64,
}

pub struct TranslationFacade {
    loader: Arc<dyn TranslationLoader>,
    default: LanguageCode,
    state: RwLock<EngineState>,
    readiness: watch::Sender<Readiness>,
    metrics: TranslationMetrics,
}

impl TranslationFacade {
    pub fn new(loader: Arc<dyn TranslationLoader>, default: LanguageCode) -> Self {
        let (readiness, _) = watch::channel(Readiness::Uninitialized);
        Self {
            loader,
            default,
            state: RwLock::new(EngineState::default()),
            readiness,
            metrics: TranslationMetrics::new(),
        }
    }

    pub fn default_language(&self) -> LanguageCode {
        self.default
    }

    /// Language the engine is switched to, whether or not its dictionary loaded.
    pub fn active(&self) -> Option<LanguageCode> {
        self.read_state().active
    }

    pub fn readiness(&self) -> Readiness {
        *self.readiness.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.readiness().is_settled()
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    /// The loaded dictionary for `code`, if any.
    pub fn dictionary(&self, code: LanguageCode) -> Option<Arc<Dictionary>> {
        self.read_state().dictionaries.get(&code).cloned()
    }

    /// How `code`'s dictionary compares with the default language's, once
    /// both have loaded. `None` for the default language itself.
    pub fn coverage(&self, code: LanguageCode) -> Option<ValidationReport> {
        self.read_state().coverage.get(&code).cloned()
    }

    /// Load (if needed) and switch to `code`.
    pub async fn activate(
        self: &Arc<Self>,
        code: LanguageCode,
    ) -> Result<Arc<Dictionary>, TranslationLoadError> {
        self.begin_activation(code).await
    }

    /// Record `code` as the most recent request right away and return the
    /// future that finishes loading it.
    ///
    /// Callers that spawn the returned future still get request ordering
    /// from the call order of this method, not from task scheduling.
    pub fn begin_activation(
        self: &Arc<Self>,
        code: LanguageCode,
    ) -> impl Future<Output = Result<Arc<Dictionary>, TranslationLoadError>> + Send + 'static {
        let (generation, cached, needs_default) = {
            let mut state = self.write_state();
            state.generation += 1;
            let cached = state.dictionaries.get(&code).cloned();
            if cached.is_some() {
                state.active = Some(code);
            }
            let needs_default =
                code != self.default && !state.dictionaries.contains_key(&self.default);
            (state.generation, cached, needs_default)
        };

        if cached.is_some() {
            self.metrics.record_cache_hit();
            self.readiness.send_replace(Readiness::Ready);
            debug!("Activated cached translations for '{}'", code);
        } else {
            self.metrics.record_cache_miss();
            self.readiness.send_replace(Readiness::Loading);
        }

        let this = Arc::clone(self);
        async move {
            if let Some(dictionary) = cached {
                return Ok(dictionary);
            }

            let fallback = async {
                if needs_default {
                    this.metrics.record_load();
                    Some(this.loader.load(this.default).await)
                } else {
                    None
                }
            };
            this.metrics.record_load();
            let (result, fallback) = futures::join!(this.loader.load(code), fallback);

            if let Some(fallback) = fallback {
                this.store_fallback(fallback);
            }
            this.finish_activation(generation, code, result)
        }
    }

    fn store_fallback(&self, result: Result<Dictionary, TranslationLoadError>) {
        match result {
            Ok(dictionary) => {
                self.write_state()
                    .dictionaries
                    .entry(self.default)
                    .or_insert_with(|| Arc::new(dictionary));
            }
            Err(e) => {
                self.metrics.record_load_failure();
                warn!("Default-language translations unavailable: {}", e);
            }
        }
    }

    fn finish_activation(
        &self,
        generation: u64,
        code: LanguageCode,
        result: Result<Dictionary, TranslationLoadError>,
    ) -> Result<Arc<Dictionary>, TranslationLoadError> {
        let mut state = self.write_state();
        let current = state.generation == generation;

        match result {
            Ok(dictionary) => {
                let report = match state.dictionaries.get(&self.default) {
                    Some(reference) if code != self.default => {
                        Some(TranslationValidator::validate(reference, &dictionary))
                    }
                    _ => None,
                };
                if let Some(report) = report {
                    if report.has_errors() {
                        debug!("'{}' translations are missing {} keys", code, report.errors.len());
                    }
                    state.coverage.insert(code, report);
                }

                let dictionary = Arc::new(dictionary);
                state.dictionaries.insert(code, Arc::clone(&dictionary));
                if current {
                    state.active = Some(code);
                    drop(state);
                    self.readiness.send_replace(Readiness::Ready);
                    info!("Loaded {} translations for '{}'", dictionary.len(), code);
                } else {
                    debug!("Discarding stale translation load for '{}'", code);
                }
                Ok(dictionary)
            }
            Err(e) => {
                self.metrics.record_load_failure();
                if current {
                    state.active = Some(code);
                    drop(state);
                    self.readiness.send_replace(Readiness::Degraded);
                    warn!("{}; rendering with untranslated keys", e);
                } else {
                    debug!("Ignoring stale translation failure: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Translated text for `key`, or the key itself.
    ///
    /// Looks in the active language first, then the default language.
    pub fn lookup(&self, key: &str, params: Option<&TranslationParams>) -> String {
        let found = {
            let state = self.read_state();
            state
                .active
                .and_then(|code| state.dictionaries.get(&code))
                .and_then(|dict| dict.get(key))
                .or_else(|| {
                    state
                        .dictionaries
                        .get(&self.default)
                        .and_then(|dict| dict.get(key))
                })
                .map(str::to_string)
        };

        match found {
            Some(template) => match params {
                Some(params) => interpolate(&template, params),
                None => template,
            },
            None => {
                self.metrics.record_missing_key();
                key.to_string()
            }
        }
    }

    /// Like [`lookup`](Self::lookup), but waits for an in-flight load first.
    /// Resolves with the key when nothing has been activated.
    pub async fn lookup_async(&self, key: &str, params: Option<&TranslationParams>) -> String {
        self.settled().await;
        self.lookup(key, params)
    }

    /// Wait until no load for the most recent request is in flight.
    pub async fn settled(&self) {
        let mut rx = self.readiness.subscribe();
        // the sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|r| *r != Readiness::Loading).await;
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for TranslationFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationFacade")
            .field("default", &self.default)
            .field("active", &self.active())
            .field("readiness", &self.readiness())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadFailure;
    use crate::translation::loader::StaticLoader;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::time::Duration;

    fn english() -> Dictionary {
        [("nav.home", "Home"), ("nav.about", "About"), ("hello", "Hello {{name}}")]
            .into_iter()
            .collect()
    }

    fn arabic() -> Dictionary {
        [("nav.home", "الرئيسية"), ("hello", "مرحبا {{name}}")]
            .into_iter()
            .collect()
    }

    fn facade() -> Arc<TranslationFacade> {
        let loader = StaticLoader::new()
            .with(LanguageCode::En, english())
            .with(LanguageCode::Ar, arabic());
        Arc::new(TranslationFacade::new(Arc::new(loader), LanguageCode::En))
    }

    /// Loader that answers after a per-language delay.
    struct DelayedLoader {
        delays: HashMap<LanguageCode, Duration>,
    }

    impl TranslationLoader for DelayedLoader {
        fn load(&self, code: LanguageCode) -> BoxFuture<'_, Result<Dictionary, TranslationLoadError>> {
            let delay = self.delays.get(&code).copied().unwrap_or_default();
            async move {
                tokio::time::sleep(delay).await;
                let dictionary: Dictionary = [("lang", code.as_str())].into_iter().collect();
                Ok(dictionary)
            }
            .boxed()
        }

        fn location(&self, code: LanguageCode) -> String {
            format!("delayed:{}", code)
        }
    }

    // ==================== Uninitialized Tests ====================

    #[test]
    fn test_lookup_before_any_load_returns_key() {
        let facade = facade();
        assert_eq!(facade.readiness(), Readiness::Uninitialized);
        assert_eq!(facade.lookup("nav.home", None), "nav.home");
        assert_eq!(facade.metrics().missing_keys(), 1);
    }

    #[tokio::test]
    async fn test_lookup_async_uninitialized_returns_key() {
        let facade = facade();
        assert_eq!(facade.lookup_async("nav.home", None).await, "nav.home");
    }

    // ==================== Activation Tests ====================

    #[tokio::test]
    async fn test_activate_loads_and_switches() {
        let facade = facade();

        let dict = facade.activate(LanguageCode::Ar).await.unwrap();

        assert_eq!(dict.get("nav.home"), Some("الرئيسية"));
        assert_eq!(facade.active(), Some(LanguageCode::Ar));
        assert_eq!(facade.readiness(), Readiness::Ready);
        assert_eq!(facade.lookup("nav.home", None), "الرئيسية");
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_to_default_language() {
        let facade = facade();
        facade.activate(LanguageCode::Ar).await.unwrap();

        assert_eq!(facade.lookup("nav.about", None), "About");
        assert_eq!(facade.lookup("nav.careers", None), "nav.careers");
    }

    #[tokio::test]
    async fn test_coverage_reports_missing_keys() {
        let facade = facade();
        facade.activate(LanguageCode::Ar).await.unwrap();

        let report = facade.coverage(LanguageCode::Ar).unwrap();
        assert_eq!(report.errors, vec!["Missing key: nav.about".to_string()]);
        assert!(!report.has_warnings());
        assert!(facade.coverage(LanguageCode::En).is_none());
    }

    #[tokio::test]
    async fn test_lookup_interpolates_params() {
        let facade = facade();
        facade.activate(LanguageCode::En).await.unwrap();

        let params = TranslationParams::new().with("name", "Omar");
        assert_eq!(facade.lookup("hello", Some(&params)), "Hello Omar");
    }

    #[tokio::test]
    async fn test_cached_activation_is_hit() {
        let facade = facade();
        facade.activate(LanguageCode::Ar).await.unwrap();
        facade.activate(LanguageCode::En).await.unwrap();
        facade.activate(LanguageCode::Ar).await.unwrap();

        let report = facade.metrics().report();
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hits, 2);
    }

    #[tokio::test]
    async fn test_failed_load_degrades_but_is_ready() {
        let facade = facade();

        let err = facade.activate(LanguageCode::De).await.unwrap_err();

        assert_eq!(err.code, LanguageCode::De);
        assert_eq!(err.reason, LoadFailure::Missing);
        assert_eq!(facade.readiness(), Readiness::Degraded);
        assert!(facade.is_ready());
        assert_eq!(facade.active(), Some(LanguageCode::De));
        // default dictionary was loaded alongside and still serves lookups
        assert_eq!(facade.lookup("nav.home", None), "Home");
        assert_eq!(facade.lookup("nav.unknown", None), "nav.unknown");
    }

    // ==================== Ordering Tests ====================

    #[tokio::test]
    async fn test_slow_earlier_load_does_not_override_later_one() {
        let loader = DelayedLoader {
            delays: HashMap::from([
                (LanguageCode::En, Duration::from_millis(1)),
                (LanguageCode::De, Duration::from_millis(80)),
                (LanguageCode::Fr, Duration::from_millis(5)),
            ]),
        };
        let facade = Arc::new(TranslationFacade::new(Arc::new(loader), LanguageCode::En));

        let slow = tokio::spawn(facade.begin_activation(LanguageCode::De));
        let fast = tokio::spawn(facade.begin_activation(LanguageCode::Fr));

        fast.await.unwrap().unwrap();
        slow.await.unwrap().unwrap();

        assert_eq!(facade.active(), Some(LanguageCode::Fr));
        assert_eq!(facade.lookup("lang", None), "fr");
        // the stale result is still cached for later
        assert!(facade.dictionary(LanguageCode::De).is_some());
    }

    #[tokio::test]
    async fn test_lookup_async_waits_for_load() {
        let loader = DelayedLoader {
            delays: HashMap::from([(LanguageCode::En, Duration::from_millis(30))]),
        };
        let facade = Arc::new(TranslationFacade::new(Arc::new(loader), LanguageCode::En));

        let pending = tokio::spawn(facade.begin_activation(LanguageCode::En));
        assert_eq!(facade.readiness(), Readiness::Loading);

        assert_eq!(facade.lookup_async("lang", None).await, "en");
        pending.await.unwrap().unwrap();
    }
}
