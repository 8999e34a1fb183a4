//! Preview binary - renders the localized `<head>` for a page
//!
//! Usage:
//!   cargo run --bin preview-head -- ar https://example.com/about?ref=x
//!
//! The first argument is the language (defaults to the persisted, detected
//! or default language), the second the page URL.
//!
//! Environment variables (all optional):
//! - DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES
//! - I18N_DIR (read translations from disk) or I18N_BASE_URL (resolved
//!   against the page URL, defaults to /assets/i18n)
//! - PREFERENCES_PATH, LANGUAGE_STORAGE_KEY
//! - SITE_NAME, SITE_KEYWORDS
//! - PAGE_TITLE_KEY (defaults to meta.title)
//! - PAGE_DESCRIPTION_KEY (defaults to meta.description)

use anyhow::Result;
use site_i18n::config::Config;
use site_i18n::document::HeadlessDocument;
use site_i18n::i18n::locale;
use site_i18n::meta::{MetaTagUpdater, SiteMeta};
use site_i18n::translation::TranslationFacade;
use site_i18n::{logging, LanguageStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    logging::try_init()?;

    let config = Config::from_env()?;
    let mut args = std::env::args().skip(1);
    let language = args.next();
    let url = args
        .next()
        .unwrap_or_else(|| "https://example.com/".to_string());

    let registry = Arc::new(config.registry()?);
    let translator = Arc::new(TranslationFacade::new(
        config.loader(reqwest::Client::new(), &url)?,
        registry.default_language(),
    ));
    let document = HeadlessDocument::with_url(url).shared();

    let store = LanguageStore::builder(registry, translator.clone())
        .with_document(document.clone())
        .with_preferences(config.preferences())
        .with_detected_languages(locale::system_languages())
        .build();

    if let Some(language) = language {
        store.set_language(&language);
    }
    info!("Rendering head for '{}'", store.current());

    let site = SiteMeta {
        site_name: config.site_name.clone(),
        keywords: config.site_keywords.clone(),
        ..SiteMeta::default()
    };
    let updater = MetaTagUpdater::new(store.clone(), Some(document.clone()), site);
    let title_key = std::env::var("PAGE_TITLE_KEY").unwrap_or_else(|_| "meta.title".to_string());
    let description_key =
        std::env::var("PAGE_DESCRIPTION_KEY").unwrap_or_else(|_| "meta.description".to_string());
    updater.update(&title_key, Some(&description_key)).await;

    let head = document
        .lock()
        .map_err(|_| anyhow::anyhow!("document lock poisoned"))?
        .render_head();
    println!("{}", head);

    info!(
        "Translation metrics: {}",
        serde_json::to_string(&translator.metrics().report())?
    );
    Ok(())
}
