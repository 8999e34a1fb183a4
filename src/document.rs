//! Document abstraction and the root-attribute synchronizer.
//!
//! The `Document` trait covers the small part of the DOM this crate writes
//! to: root element attributes, the title, `<meta>` and `<link>` elements.
//! `HeadlessDocument` implements it in memory and can render the resulting
//! `<head>` for server-side rendering.

use crate::i18n::{locale, LanguageCode};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// How a `<meta>` element is keyed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetaKey {
    /// `<meta name="...">`
    Name(String),
    /// `<meta property="...">` (Open Graph)
    Property(String),
}

impl MetaKey {
    pub fn name(name: impl Into<String>) -> Self {
        MetaKey::Name(name.into())
    }

    pub fn property(property: impl Into<String>) -> Self {
        MetaKey::Property(property.into())
    }
}

/// A `<link>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkElement {
    pub rel: String,
    pub href: String,
    pub hreflang: Option<String>,
}

impl LinkElement {
    pub fn canonical(href: impl Into<String>) -> Self {
        Self {
            rel: "canonical".to_string(),
            href: href.into(),
            hreflang: None,
        }
    }

    pub fn alternate(hreflang: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: "alternate".to_string(),
            href: href.into(),
            hreflang: Some(hreflang.into()),
        }
    }

    pub fn is_hreflang(&self) -> bool {
        self.rel == "alternate" && self.hreflang.is_some()
    }
}

/// The writable surface of a page.
pub trait Document: Send {
    fn set_root_attribute(&mut self, name: &str, value: &str);
    fn root_attribute(&self, name: &str) -> Option<String>;

    fn set_title(&mut self, title: &str);
    fn title(&self) -> Option<String>;

    /// Create or replace the meta element identified by `key`.
    fn set_meta(&mut self, key: MetaKey, content: &str);
    fn meta(&self, key: &MetaKey) -> Option<String>;

    /// Remove every link matching `predicate`, returning how many went.
    fn remove_links(&mut self, predicate: &dyn Fn(&LinkElement) -> bool) -> usize;
    fn append_link(&mut self, link: LinkElement);
    fn links(&self) -> Vec<LinkElement>;

    /// Current page URL, if known.
    fn url(&self) -> Option<String>;
}

/// Shared handle to the page document.
pub type SharedDocument = Arc<Mutex<dyn Document>>;

/// In-memory document.
#[derive(Debug, Default, Clone)]
pub struct HeadlessDocument {
    url: Option<String>,
    root_attributes: Vec<(String, String)>,
    title: Option<String>,
    metas: Vec<(MetaKey, String)>,
    links: Vec<LinkElement>,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    /// Wrap into the shared handle the synchronizer and meta updater expect.
    pub fn shared(self) -> Arc<Mutex<HeadlessDocument>> {
        Arc::new(Mutex::new(self))
    }

    /// Render the opening `<html>` tag and the managed `<head>` contents.
    pub fn render_head(&self) -> String {
        let mut out = String::from("<html");
        for (name, value) in &self.root_attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
        }
        out.push_str(">\n<head>\n");

        if let Some(title) = &self.title {
            out.push_str(&format!("  <title>{}</title>\n", escape_text(title)));
        }
        for (key, content) in &self.metas {
            let (attr, value) = match key {
                MetaKey::Name(n) => ("name", n),
                MetaKey::Property(p) => ("property", p),
            };
            out.push_str(&format!(
                "  <meta {}=\"{}\" content=\"{}\">\n",
                attr,
                escape_attr(value),
                escape_attr(content)
            ));
        }
        for link in &self.links {
            out.push_str(&format!("  <link rel=\"{}\"", escape_attr(&link.rel)));
            if let Some(hreflang) = &link.hreflang {
                out.push_str(&format!(" hreflang=\"{}\"", escape_attr(hreflang)));
            }
            out.push_str(&format!(" href=\"{}\">\n", escape_attr(&link.href)));
        }
        out.push_str("</head>\n");
        out
    }
}

impl Document for HeadlessDocument {
    fn set_root_attribute(&mut self, name: &str, value: &str) {
        match self.root_attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .root_attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn root_attribute(&self, name: &str) -> Option<String> {
        self.root_attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn set_meta(&mut self, key: MetaKey, content: &str) {
        match self.metas.iter_mut().find(|(k, _)| *k == key) {
            Some((_, c)) => *c = content.to_string(),
            None => self.metas.push((key, content.to_string())),
        }
    }

    fn meta(&self, key: &MetaKey) -> Option<String> {
        self.metas
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| c.clone())
    }

    fn remove_links(&mut self, predicate: &dyn Fn(&LinkElement) -> bool) -> usize {
        let before = self.links.len();
        self.links.retain(|link| !predicate(link));
        before - self.links.len()
    }

    fn append_link(&mut self, link: LinkElement) {
        self.links.push(link);
    }

    fn links(&self) -> Vec<LinkElement> {
        self.links.clone()
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Keeps the root element's `lang` and `dir` attributes in step with the
/// current language.
#[derive(Clone, Default)]
pub struct DomSynchronizer {
    document: Option<SharedDocument>,
}

impl DomSynchronizer {
    pub fn new(document: SharedDocument) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// No DOM in this execution context; `apply` does nothing.
    pub fn detached() -> Self {
        Self { document: None }
    }

    pub fn document(&self) -> Option<&SharedDocument> {
        self.document.as_ref()
    }

    pub fn apply(&self, code: LanguageCode) {
        let Some(document) = &self.document else {
            debug!("No document attached, skipping lang/dir sync");
            return;
        };
        let mut doc = document.lock().unwrap_or_else(|e| e.into_inner());
        doc.set_root_attribute("lang", code.as_str());
        doc.set_root_attribute("dir", locale::direction(code).as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== HeadlessDocument Tests ====================

    #[test]
    fn test_set_meta_replaces_existing() {
        let mut doc = HeadlessDocument::new();
        doc.set_meta(MetaKey::name("description"), "first");
        doc.set_meta(MetaKey::name("description"), "second");

        assert_eq!(doc.meta(&MetaKey::name("description")).as_deref(), Some("second"));
        assert_eq!(doc.meta(&MetaKey::property("description")), None);
    }

    #[test]
    fn test_remove_links_by_predicate() {
        let mut doc = HeadlessDocument::new();
        doc.append_link(LinkElement::canonical("https://example.com/"));
        doc.append_link(LinkElement::alternate("en", "https://example.com/?lang=en"));
        doc.append_link(LinkElement::alternate("ar", "https://example.com/?lang=ar"));

        let removed = doc.remove_links(&|link| link.is_hreflang());

        assert_eq!(removed, 2);
        assert_eq!(doc.links(), vec![LinkElement::canonical("https://example.com/")]);
    }

    #[test]
    fn test_render_head_escapes_values() {
        let mut doc = HeadlessDocument::new();
        doc.set_root_attribute("lang", "en");
        doc.set_title("Tom & Jerry <Studio>");
        doc.set_meta(MetaKey::property("og:title"), "Say \"hi\"");

        let html = doc.render_head();

        assert!(html.starts_with("<html lang=\"en\">"));
        assert!(html.contains("<title>Tom &amp; Jerry &lt;Studio&gt;</title>"));
        assert!(html.contains("property=\"og:title\" content=\"Say &quot;hi&quot;\""));
    }

    // ==================== DomSynchronizer Tests ====================

    #[test]
    fn test_apply_sets_lang_and_dir() {
        let doc = HeadlessDocument::new().shared();
        let sync = DomSynchronizer::new(doc.clone());

        sync.apply(LanguageCode::Ar);
        {
            let d = doc.lock().unwrap();
            assert_eq!(d.root_attribute("lang").as_deref(), Some("ar"));
            assert_eq!(d.root_attribute("dir").as_deref(), Some("rtl"));
        }

        sync.apply(LanguageCode::De);
        let d = doc.lock().unwrap();
        assert_eq!(d.root_attribute("lang").as_deref(), Some("de"));
        assert_eq!(d.root_attribute("dir").as_deref(), Some("ltr"));
    }

    #[test]
    fn test_detached_apply_is_noop() {
        let sync = DomSynchronizer::detached();
        sync.apply(LanguageCode::Fr);
        assert!(sync.document().is_none());
    }
}
