//! Language selection, translation lookup and page metadata for a
//! multilingual site.
//!
//! The [`store::LanguageStore`] owns the current language. Changing it
//! activates the matching translations, updates the root document's `lang`
//! and `dir`, persists the choice and notifies subscribers such as the
//! [`meta::MetaTagUpdater`] and the [`switcher::LanguageSwitcher`].

pub mod config;
pub mod document;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod meta;
pub mod persistence;
pub mod retry;
pub mod store;
pub mod switcher;
pub mod translation;

pub use error::{LanguageError, StorageError, TranslationLoadError};
pub use i18n::{Direction, LanguageCode, LanguageOption, LanguageRegistry};
pub use store::{LanguageStore, Subscription};
