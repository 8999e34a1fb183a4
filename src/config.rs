use crate::i18n::{LanguageCode, LanguageRegistry};
use crate::persistence::{FileStorage, PreferenceStore, DEFAULT_STORAGE_KEY};
use crate::retry::RetryConfig;
use crate::translation::{DirectoryLoader, HttpLoader, TranslationLoader, DEFAULT_BASE_PATH};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Config {
    // Languages
    pub default_language: LanguageCode,
    pub supported_languages: Vec<LanguageCode>,

    // Translation files
    pub i18n_base_url: String,
    pub i18n_dir: Option<PathBuf>,
    pub translation_max_attempts: u32,

    // Persistence
    pub storage_key: String,
    pub preferences_path: Option<PathBuf>,

    // Page metadata
    pub site_name: Option<String>,
    pub site_keywords: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(raw) => raw
                .parse::<LanguageCode>()
                .with_context(|| format!("DEFAULT_LANGUAGE '{}' is not a supported language", raw))?,
            Err(_) => LanguageCode::En,
        };

        let supported_languages = match std::env::var("SUPPORTED_LANGUAGES") {
            Ok(raw) => parse_language_list(&raw)?,
            Err(_) => LanguageCode::ALL.to_vec(),
        };

        Ok(Self {
            default_language,
            supported_languages,

            // Translation files
            i18n_base_url: std::env::var("I18N_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string()),
            i18n_dir: std::env::var("I18N_DIR").ok().map(PathBuf::from),
            translation_max_attempts: std::env::var("TRANSLATION_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),

            // Persistence
            storage_key: std::env::var("LANGUAGE_STORAGE_KEY")
                .unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string()),
            preferences_path: std::env::var("PREFERENCES_PATH").ok().map(PathBuf::from),

            // Page metadata
            site_name: std::env::var("SITE_NAME").ok().filter(|s| !s.is_empty()),
            site_keywords: std::env::var("SITE_KEYWORDS").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Registry offering the configured languages.
    pub fn registry(&self) -> Result<LanguageRegistry> {
        LanguageRegistry::with_enabled(&self.supported_languages, self.default_language)
            .context("Invalid language configuration")
    }

    /// Translation source: a local directory when `I18N_DIR` is set,
    /// otherwise HTTP against `I18N_BASE_URL` resolved relative to `page_url`.
    pub fn loader(
        &self,
        client: reqwest::Client,
        page_url: &str,
    ) -> Result<Arc<dyn TranslationLoader>> {
        if let Some(dir) = &self.i18n_dir {
            return Ok(Arc::new(DirectoryLoader::new(dir)));
        }

        let base_url = resolve_base_url(&self.i18n_base_url, page_url)?;
        Ok(Arc::new(
            HttpLoader::new(client, base_url)
                .with_retry(RetryConfig::translation_fetch(self.translation_max_attempts)),
        ))
    }

    /// File-backed preferences when `PREFERENCES_PATH` is set; otherwise the
    /// selection lasts for the session only.
    pub fn preferences(&self) -> PreferenceStore {
        match &self.preferences_path {
            Some(path) => PreferenceStore::new(Arc::new(FileStorage::new(path)), &self.storage_key),
            None => PreferenceStore::unavailable(),
        }
    }
}

/// `base` joined onto the page URL; an absolute `base` is returned as is.
fn resolve_base_url(base: &str, page_url: &str) -> Result<String> {
    let page = reqwest::Url::parse(page_url)
        .with_context(|| format!("Page URL '{}' is not an absolute URL", page_url))?;
    let resolved = page
        .join(base)
        .with_context(|| format!("I18N_BASE_URL '{}' cannot be resolved against {}", base, page_url))?;
    Ok(resolved.to_string())
}

fn parse_language_list(raw: &str) -> Result<Vec<LanguageCode>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<LanguageCode>()
                .with_context(|| format!("SUPPORTED_LANGUAGES contains unsupported '{}'", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const VARS: [&str; 9] = [
        "DEFAULT_LANGUAGE",
        "SUPPORTED_LANGUAGES",
        "I18N_BASE_URL",
        "I18N_DIR",
        "TRANSLATION_MAX_ATTEMPTS",
        "LANGUAGE_STORAGE_KEY",
        "PREFERENCES_PATH",
        "SITE_NAME",
        "SITE_KEYWORDS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.default_language, LanguageCode::En);
        assert_eq!(config.supported_languages, LanguageCode::ALL.to_vec());
        assert_eq!(config.i18n_base_url, "/assets/i18n");
        assert_eq!(config.storage_key, "selectedLanguage");
        assert_eq!(config.translation_max_attempts, 1);
        assert!(config.i18n_dir.is_none());
        assert!(!config.preferences().is_available());
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("DEFAULT_LANGUAGE", "ar");
        std::env::set_var("SUPPORTED_LANGUAGES", "en, ar");
        std::env::set_var("TRANSLATION_MAX_ATTEMPTS", "3");
        std::env::set_var("SITE_NAME", "Studio");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.default_language, LanguageCode::Ar);
        assert_eq!(config.supported_languages, vec![LanguageCode::En, LanguageCode::Ar]);
        assert_eq!(config.translation_max_attempts, 3);
        assert_eq!(config.site_name.as_deref(), Some("Studio"));

        let registry = config.registry().unwrap();
        assert!(!registry.is_enabled(LanguageCode::De));
        assert_eq!(registry.default_language(), LanguageCode::Ar);
    }

    #[test]
    #[serial]
    fn test_invalid_default_language() {
        clear_env();
        std::env::set_var("DEFAULT_LANGUAGE", "es");

        let err = Config::from_env().unwrap_err();
        clear_env();

        assert!(err.to_string().contains("DEFAULT_LANGUAGE"));
    }

    #[test]
    #[serial]
    fn test_default_outside_supported_set() {
        clear_env();
        std::env::set_var("DEFAULT_LANGUAGE", "de");
        std::env::set_var("SUPPORTED_LANGUAGES", "en,fr");

        let config = Config::from_env().unwrap();
        clear_env();

        assert!(config.registry().is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_default_loader_fetches_from_page_origin() {
        clear_env();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/i18n/en.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"nav": {"home": "Home"}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::from_env().unwrap();
        let page_url = format!("{}/about?ref=nav", server.uri());
        let loader = config.loader(reqwest::Client::new(), &page_url).unwrap();

        assert_eq!(
            loader.location(LanguageCode::En),
            format!("{}/assets/i18n/en.json", server.uri())
        );
        let dict = loader.load(LanguageCode::En).await.unwrap();
        assert_eq!(dict.get("nav.home"), Some("Home"));
    }

    #[test]
    fn test_resolve_base_url() {
        assert_eq!(
            resolve_base_url("/assets/i18n", "https://example.com/blog/post?x=1").unwrap(),
            "https://example.com/assets/i18n"
        );
        assert_eq!(
            resolve_base_url("https://cdn.example.com/i18n", "https://example.com/").unwrap(),
            "https://cdn.example.com/i18n"
        );
        assert!(resolve_base_url("/assets/i18n", "/relative/page").is_err());
    }

    #[test]
    fn test_parse_language_list_rejects_unknown() {
        assert!(parse_language_list("en,xx").is_err());
        assert_eq!(
            parse_language_list("fr,,de").unwrap(),
            vec![LanguageCode::Fr, LanguageCode::De]
        );
    }
}
