//! Translation lookup over per-language JSON dictionaries.
//!
//! - `dictionary`: flattened key/text maps and `{{ param }}` interpolation
//! - `loader`: where dictionaries come from (HTTP, disk, memory)
//! - `facade`: activation, readiness and lookups
//! - `metrics`: per-facade counters
//! - `validator`: coverage of a dictionary against the default language

mod dictionary;
mod facade;
mod loader;
mod metrics;
mod validator;

pub use dictionary::{interpolate, placeholders, Dictionary, TranslationParams};
pub use facade::{Readiness, TranslationFacade};
pub use loader::{DirectoryLoader, HttpLoader, StaticLoader, TranslationLoader, DEFAULT_BASE_PATH};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use validator::{TranslationValidator, ValidationReport};
