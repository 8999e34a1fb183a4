//! Language metadata: the supported set, locale tags, text direction and
//! preference detection.
//!
//! # Architecture
//!
//! - `language`: `LanguageCode` and `Direction`
//! - `registry`: ordered list of offered languages and the default
//! - `locale`: locale/direction resolution and preference detection
//!
//! # Example
//!
//! ```rust,ignore
//! use site_i18n::i18n::{locale, LanguageCode, LanguageRegistry};
//!
//! let registry = LanguageRegistry::builtin();
//! let tags = locale::parse_accept_language("ar-EG,en;q=0.8");
//! let preferred = locale::detect_preferred(&tags, &registry);
//! assert_eq!(preferred, Some(LanguageCode::Ar));
//! ```

mod language;
pub mod locale;
mod registry;

pub use language::{Direction, LanguageCode};
pub use registry::{LanguageOption, LanguageRegistry};
