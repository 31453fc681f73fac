//! Parsed, queryable product page

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

/// Base used to resolve locations given as bare paths ("/products/drill")
static FALLBACK_BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost/").expect("Invalid fallback base URL")
});

/// A parsed page plus the location it was loaded from
///
/// The location is needed to tell the subject product apart from related
/// products that link elsewhere.
pub struct PageDocument {
    html: Html,
    location: Option<Url>,
}

impl PageDocument {
    /// Parse markup. Never fails; an unusable location yields an empty path.
    pub fn parse(markup: &str, location: &str) -> Self {
        let location = Url::parse(location)
            .or_else(|_| FALLBACK_BASE.join(location))
            .ok()
            .filter(|_| !location.trim().is_empty());

        Self {
            html: Html::parse_document(markup),
            location,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    /// Location path without query string, or "" when unknown
    pub fn path(&self) -> &str {
        self.location.as_ref().map(|u| u.path()).unwrap_or("")
    }

    /// Path plus query string, e.g. "/p/drill?color=red"
    pub fn path_and_query(&self) -> String {
        match self.location.as_ref() {
            Some(url) => match url.query() {
                Some(q) => format!("{}?{}", url.path(), q),
                None => url.path().to_string(),
            },
            None => String::new(),
        }
    }

    /// Resolve an href against the document location
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let base = self.location.as_ref().unwrap_or(&FALLBACK_BASE);
        base.join(href).ok()
    }

    /// All elements matching a selector, in document order
    pub fn select<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// Content of `<meta name=key>` or `<meta property=key>`, first non-empty
    pub fn meta_content(&self, key: &str) -> Option<String> {
        let selector = Selector::parse(&format!(
            "meta[name=\"{key}\"], meta[property=\"{key}\"], meta[itemprop=\"{key}\"]"
        ))
        .ok()?;

        self.html
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty())
    }

    /// Text of the `<title>` element
    pub fn title(&self) -> Option<String> {
        static TITLE: Lazy<Selector> =
            Lazy::new(|| Selector::parse("title").expect("Invalid title selector"));
        self.select_first(&TITLE)
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
    }
}

/// Element text with whitespace collapsed and trimmed
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Compile a selector known at build time
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("Invalid selector {css:?}: {e:?}"))
}
