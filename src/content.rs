use chrono::NaiveDateTime;

/// Stable type tag for content owning a `content_meta` row.
/// Stored as a string so rows survive host-side type renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Post,
    Product,
    Page,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Product => "product",
            ContentType::Page => "page",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(ContentType::Post),
            "product" => Some(ContentType::Product),
            "page" => Some(ContentType::Page),
            _ => None,
        }
    }
}

/// Capability interface for anything that can carry SEO metadata.
/// Only the identity accessors are required; everything else defaults to
/// "not provided" and the generators fall back per field (explicit override
/// row, then these accessors, then site-wide settings).
pub trait SeoContent {
    fn content_type(&self) -> ContentType;
    fn content_id(&self) -> i64;

    /// Generic display title (a post title, a product name).
    fn title(&self) -> Option<String> {
        None
    }

    /// Raw body or excerpt text; used to derive a description when no
    /// explicit one is stored. HTML tags are stripped by the caller.
    fn body_text(&self) -> Option<String> {
        None
    }

    /// Representative image path or URL.
    fn image(&self) -> Option<String> {
        None
    }

    /// Public URL of the item (canonical + sitemap source).
    fn url(&self) -> Option<String> {
        None
    }

    fn author_name(&self) -> Option<String> {
        None
    }

    fn price(&self) -> Option<f64> {
        None
    }

    fn rating(&self) -> Option<f64> {
        None
    }

    fn review_count(&self) -> Option<i64> {
        None
    }

    fn published_at(&self) -> Option<NaiveDateTime> {
        None
    }

    fn updated_at(&self) -> Option<NaiveDateTime> {
        None
    }
}
