use chrono::{NaiveDateTime, SecondsFormat};
use serde_json::{json, Value};

use crate::cache::TtlCache;
use crate::content::{ContentType, SeoContent};
use crate::db::DbPool;
use crate::models::content_meta::ContentMeta;
use crate::models::settings::Setting;

use super::{absolute_url, excerpt};

/// One breadcrumb trail entry; a missing url is emitted as JSON null.
#[derive(Debug, Clone)]
pub struct Crumb {
    pub name: String,
    pub url: Option<String>,
}

/// Accumulates schema.org objects for one render pass, one JSON-LD
/// script block each.
pub struct StructuredData {
    schemas: Vec<Value>,
}

fn iso8601(dt: NaiveDateTime) -> String {
    dt.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl StructuredData {
    pub fn new() -> Self {
        StructuredData {
            schemas: Vec::new(),
        }
    }

    /// Add the schema for a content item. Detection order: explicit
    /// schema_type on the stored meta row, then the content type mapping.
    /// Unrecognized types add nothing.
    pub fn for_item(
        &mut self,
        pool: &DbPool,
        cache: &TtlCache,
        item: &dyn SeoContent,
        request_url: &str,
    ) -> &mut Self {
        let meta = ContentMeta::find(pool, item.content_type(), item.content_id());

        let schema_type = meta
            .as_ref()
            .and_then(|m| m.schema_type.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                match item.content_type() {
                    ContentType::Post => "Article",
                    ContentType::Product => "Product",
                    ContentType::Page => "WebPage",
                }
                .to_string()
            });

        let schema = match schema_type.as_str() {
            "Article" => Some(Self::article_schema(pool, cache, item, meta.as_ref())),
            "Product" => Some(Self::product_schema(pool, cache, item, meta.as_ref())),
            "WebPage" => Some(Self::webpage_schema(item, meta.as_ref(), request_url)),
            _ => None,
        };

        if let Some(schema) = schema {
            self.schemas.push(schema);
        }
        self
    }

    fn item_description(item: &dyn SeoContent, meta: Option<&ContentMeta>) -> Option<String> {
        meta.and_then(|m| m.description.clone())
            .filter(|d| !d.is_empty())
            .or_else(|| {
                item.body_text()
                    .map(|t| excerpt(&t, 160))
                    .filter(|d| !d.is_empty())
            })
    }

    fn item_image(item: &dyn SeoContent, meta: Option<&ContentMeta>) -> Option<String> {
        meta.and_then(|m| m.og_image.clone())
            .filter(|i| !i.is_empty())
            .or_else(|| item.image().filter(|i| !i.is_empty()))
    }

    fn article_schema(
        pool: &DbPool,
        cache: &TtlCache,
        item: &dyn SeoContent,
        meta: Option<&ContentMeta>,
    ) -> Value {
        let site_name = Setting::get_or(pool, cache, "site_name", "");
        let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");
        let logo = Setting::get_or(pool, cache, "default_og_image", "");

        let mut schema = json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": item.title().unwrap_or_default(),
        });

        if let Some(published) = item.published_at() {
            schema["datePublished"] = json!(iso8601(published));
        }
        if let Some(modified) = item.updated_at() {
            schema["dateModified"] = json!(iso8601(modified));
        }
        if let Some(description) = Self::item_description(item, meta) {
            schema["description"] = json!(description);
        }
        if let Some(image) = Self::item_image(item, meta) {
            schema["image"] = json!(absolute_url(&site_url, &image));
        }
        if let Some(author) = item.author_name() {
            let name = if author.is_empty() {
                "Unknown".to_string()
            } else {
                author
            };
            schema["author"] = json!({ "@type": "Person", "name": name });
        }
        schema["publisher"] = json!({
            "@type": "Organization",
            "name": site_name,
            "logo": {
                "@type": "ImageObject",
                "url": absolute_url(&site_url, &logo),
            },
        });

        schema
    }

    fn product_schema(
        pool: &DbPool,
        cache: &TtlCache,
        item: &dyn SeoContent,
        meta: Option<&ContentMeta>,
    ) -> Value {
        let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");

        let mut schema = json!({
            "@context": "https://schema.org",
            "@type": "Product",
            "name": item.title().unwrap_or_default(),
        });

        if let Some(description) = Self::item_description(item, meta) {
            schema["description"] = json!(description);
        }
        if let Some(image) = Self::item_image(item, meta) {
            schema["image"] = json!(absolute_url(&site_url, &image));
        }
        if let Some(price) = item.price() {
            schema["offers"] = json!({
                "@type": "Offer",
                "price": price,
                "priceCurrency": "USD",
                "availability": "https://schema.org/InStock",
            });
        }
        if let Some(rating) = item.rating() {
            schema["aggregateRating"] = json!({
                "@type": "AggregateRating",
                "ratingValue": rating,
                "reviewCount": item.review_count().unwrap_or(0),
            });
        }

        schema
    }

    fn webpage_schema(
        item: &dyn SeoContent,
        meta: Option<&ContentMeta>,
        request_url: &str,
    ) -> Value {
        let url = meta
            .and_then(|m| m.canonical_url.clone())
            .filter(|u| !u.is_empty())
            .or_else(|| item.url().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| request_url.to_string());

        json!({
            "@context": "https://schema.org",
            "@type": "WebPage",
            "name": item.title().unwrap_or_default(),
            "description": Self::item_description(item, meta).unwrap_or_default(),
            "url": url,
        })
    }

    /// Site-level Organization schema, not tied to a content item.
    pub fn organization(&mut self, pool: &DbPool, cache: &TtlCache) -> &mut Self {
        let site_name = Setting::get_or(pool, cache, "site_name", "");
        let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");
        let logo = Setting::get_or(pool, cache, "default_og_image", "");

        self.schemas.push(json!({
            "@context": "https://schema.org",
            "@type": "Organization",
            "name": site_name,
            "url": site_url.trim_end_matches('/'),
            "logo": absolute_url(&site_url, &logo),
        }));
        self
    }

    /// BreadcrumbList with 1-indexed positions.
    pub fn breadcrumb(&mut self, crumbs: &[Crumb]) -> &mut Self {
        let items: Vec<Value> = crumbs
            .iter()
            .enumerate()
            .map(|(i, crumb)| {
                json!({
                    "@type": "ListItem",
                    "position": i + 1,
                    "name": crumb.name,
                    "item": crumb.url,
                })
            })
            .collect();

        self.schemas.push(json!({
            "@context": "https://schema.org",
            "@type": "BreadcrumbList",
            "itemListElement": items,
        }));
        self
    }

    pub fn schemas(&self) -> &[Value] {
        &self.schemas
    }

    /// One pretty-printed JSON-LD script block per accumulated schema.
    pub fn render(&self) -> String {
        self.schemas
            .iter()
            .map(|schema| {
                format!(
                    "<script type=\"application/ld+json\">\n{}\n</script>",
                    serde_json::to_string_pretty(schema).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
