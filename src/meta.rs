//! Page metadata: title, description, Open Graph, Twitter Card, canonical
//! and `hreflang` alternates, refreshed for the current language.

use crate::document::{LinkElement, MetaKey, SharedDocument};
use crate::i18n::{locale, LanguageCode};
use crate::store::{LanguageStore, Subscription};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::debug;

/// Site-wide values that do not come from translation files.
#[derive(Debug, Clone)]
pub struct SiteMeta {
    /// Appended to page titles as `"{title} | {site_name}"`
    pub site_name: Option<String>,
    pub keywords: Option<String>,
    pub og_type: String,
    pub twitter_card: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            site_name: None,
            keywords: None,
            og_type: "website".to_string(),
            twitter_card: "summary_large_image".to_string(),
        }
    }
}

/// Strip the query string and fragment from a page URL.
pub fn canonical_url(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

pub struct MetaTagUpdater {
    store: Arc<LanguageStore>,
    document: Option<SharedDocument>,
    site: SiteMeta,
}

impl MetaTagUpdater {
    pub fn new(store: Arc<LanguageStore>, document: Option<SharedDocument>, site: SiteMeta) -> Self {
        Self {
            store,
            document,
            site,
        }
    }

    /// Resolve `title_key` (and `description_key`, when given) and write the
    /// page metadata for the current language.
    ///
    /// Previously injected `hreflang` links and the canonical link are
    /// replaced, so repeated calls leave one set of each.
    pub async fn update(&self, title_key: &str, description_key: Option<&str>) {
        let translator = self.store.translator();
        let description = async {
            match description_key {
                Some(key) => Some(translator.lookup_async(key, None).await),
                None => None,
            }
        };
        let (title, description) =
            futures::join!(translator.lookup_async(title_key, None), description);

        let Some(document) = &self.document else {
            debug!("No document attached, skipping meta update");
            return;
        };
        let code = self.store.current();
        let mut doc = document.lock().unwrap_or_else(|e| e.into_inner());

        let full_title = match self.site.site_name.as_deref() {
            Some(site) if !site.is_empty() && title != site => format!("{} | {}", title, site),
            _ => title.clone(),
        };
        doc.set_title(&full_title);

        if let Some(description) = &description {
            doc.set_meta(MetaKey::name("description"), description);
            doc.set_meta(MetaKey::property("og:description"), description);
            doc.set_meta(MetaKey::name("twitter:description"), description);
        }
        if let Some(keywords) = &self.site.keywords {
            doc.set_meta(MetaKey::name("keywords"), keywords);
        }

        doc.set_meta(MetaKey::property("og:title"), &full_title);
        doc.set_meta(MetaKey::property("og:type"), &self.site.og_type);
        doc.set_meta(MetaKey::property("og:locale"), locale::og_locale(code));
        if let Some(site) = &self.site.site_name {
            doc.set_meta(MetaKey::property("og:site_name"), site);
        }
        doc.set_meta(MetaKey::name("twitter:card"), &self.site.twitter_card);
        doc.set_meta(MetaKey::name("twitter:title"), &full_title);

        doc.set_meta(MetaKey::name("language"), code.as_str());
        doc.set_meta(MetaKey::name("direction"), locale::direction(code).as_str());
        doc.set_meta(MetaKey::name("locale"), locale::locale_tag(code));

        let Some(url) = doc.url() else {
            debug!("Document has no URL, skipping canonical and hreflang links");
            return;
        };
        let canonical = canonical_url(&url).to_string();
        doc.set_meta(MetaKey::property("og:url"), &canonical);

        doc.remove_links(&|link| link.rel == "canonical");
        doc.append_link(LinkElement::canonical(&canonical));

        let removed = doc.remove_links(&|link| link.is_hreflang());
        debug!("Replacing {} hreflang links", removed);
        for option in self.store.registry().list_enabled() {
            doc.append_link(LinkElement::alternate(
                option.code.as_str(),
                alternate_href(&canonical, option.code),
            ));
        }
        doc.append_link(LinkElement::alternate("x-default", &canonical));
    }

    /// Re-run [`update`](Self::update) with the given keys on every language
    /// change, starting with the current language.
    pub fn attach(
        self: &Arc<Self>,
        title_key: impl Into<String>,
        description_key: Option<String>,
    ) -> Subscription {
        let updater: Weak<Self> = Arc::downgrade(self);
        let title_key = title_key.into();
        let runtime = Handle::try_current().ok();

        self.store.subscribe(move |code| {
            let Some(runtime) = &runtime else {
                debug!("No async runtime, meta tags not refreshed for '{}'", code);
                return;
            };
            let Some(updater) = updater.upgrade() else {
                return;
            };
            let title_key = title_key.clone();
            let description_key = description_key.clone();
            runtime.spawn(async move {
                updater.update(&title_key, description_key.as_deref()).await;
            });
        })
    }
}

fn alternate_href(canonical: &str, code: LanguageCode) -> String {
    format!("{}?lang={}", canonical, code)
}
