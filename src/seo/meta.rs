use serde::Serialize;

use crate::cache::TtlCache;
use crate::content::SeoContent;
use crate::db::DbPool;
use crate::models::content_meta::ContentMeta;
use crate::models::settings::Setting;

use super::{absolute_url, excerpt, html_escape};

/// Resolved head metadata for one content item (or the site default).
/// Open Graph and Twitter tags are kept as ordered pairs so rendering
/// preserves emission order; image keys are absent when no image resolved.
#[derive(Debug, Serialize)]
pub struct MetaBundle {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical: String,
    pub robots: String,
    pub open_graph: Vec<(String, String)>,
    pub twitter: Vec<(String, String)>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Build the meta bundle for a content item. Each field resolves
/// independently: stored override row, then the item's own accessors,
/// then the site-wide settings.
pub fn generate(
    pool: &DbPool,
    cache: &TtlCache,
    item: &dyn SeoContent,
    request_url: &str,
) -> MetaBundle {
    let meta = ContentMeta::find(pool, item.content_type(), item.content_id());
    let site_name = Setting::get_or(pool, cache, "site_name", "");
    let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");

    // Title: override -> item title -> empty, then through the template
    let raw_title = non_empty(meta.as_ref().and_then(|m| m.title.clone()))
        .or_else(|| non_empty(item.title()))
        .unwrap_or_default();
    let template = Setting::get_or(pool, cache, "title_template", "{title} | {site}");
    let title = template
        .replace("{title}", &raw_title)
        .replace("{site}", &site_name);

    let description = non_empty(meta.as_ref().and_then(|m| m.description.clone()))
        .or_else(|| non_empty(item.body_text().map(|t| excerpt(&t, 160))))
        .unwrap_or_else(|| Setting::get_or(pool, cache, "default_description", ""));

    let keywords = meta
        .as_ref()
        .map(|m| m.keywords_vec())
        .unwrap_or_default();

    let canonical = non_empty(meta.as_ref().and_then(|m| m.canonical_url.clone()))
        .or_else(|| non_empty(item.url()))
        .unwrap_or_else(|| request_url.to_string());

    let robots = meta
        .as_ref()
        .map(|m| m.robots.clone())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "index,follow".to_string());

    let image = non_empty(meta.as_ref().and_then(|m| m.og_image.clone()))
        .or_else(|| non_empty(item.image()))
        .or_else(|| non_empty(Setting::get(pool, cache, "default_og_image")))
        .map(|img| absolute_url(&site_url, &img));

    let mut open_graph = vec![
        ("og:title".to_string(), title.clone()),
        ("og:description".to_string(), description.clone()),
    ];
    if let Some(ref img) = image {
        open_graph.push(("og:image".to_string(), img.clone()));
    }
    open_graph.push(("og:url".to_string(), canonical.clone()));
    open_graph.push(("og:type".to_string(), "website".to_string()));
    open_graph.push(("og:site_name".to_string(), site_name));

    let card = if image.is_some() {
        "summary_large_image"
    } else {
        "summary"
    };
    let mut twitter = vec![
        ("twitter:card".to_string(), card.to_string()),
        ("twitter:title".to_string(), title.clone()),
        ("twitter:description".to_string(), description.clone()),
    ];
    if let Some(ref img) = image {
        twitter.push(("twitter:image".to_string(), img.clone()));
    }
    if let Some(handle) = non_empty(Setting::get(pool, cache, "twitter_handle")) {
        twitter.push((
            "twitter:site".to_string(),
            format!("@{}", handle.trim_start_matches('@')),
        ));
    }

    MetaBundle {
        title,
        description,
        keywords,
        canonical,
        robots,
        open_graph,
        twitter,
    }
}

/// Bundle built purely from settings, for pages with no content item.
pub fn default_bundle(pool: &DbPool, cache: &TtlCache, request_url: &str) -> MetaBundle {
    let site_name = Setting::get_or(pool, cache, "site_name", "");
    let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");
    let description = Setting::get_or(pool, cache, "default_description", "");
    let image = non_empty(Setting::get(pool, cache, "default_og_image"))
        .map(|img| absolute_url(&site_url, &img));

    let mut open_graph = vec![
        ("og:title".to_string(), site_name.clone()),
        ("og:description".to_string(), description.clone()),
    ];
    if let Some(ref img) = image {
        open_graph.push(("og:image".to_string(), img.clone()));
    }
    open_graph.push(("og:url".to_string(), request_url.to_string()));
    open_graph.push(("og:type".to_string(), "website".to_string()));
    open_graph.push(("og:site_name".to_string(), site_name.clone()));

    let twitter = vec![
        ("twitter:card".to_string(), "summary".to_string()),
        ("twitter:title".to_string(), site_name.clone()),
        ("twitter:description".to_string(), description.clone()),
    ];

    MetaBundle {
        title: site_name,
        description,
        keywords: Vec::new(),
        canonical: request_url.to_string(),
        robots: "index,follow".to_string(),
        open_graph,
        twitter,
    }
}

/// Serialize a bundle into head markup. Tags with empty content are
/// omitted; every interpolated value is entity-escaped. The Facebook app
/// id is read here rather than carried in the bundle.
pub fn render(pool: &DbPool, cache: &TtlCache, bundle: &MetaBundle) -> String {
    let mut tags: Vec<String> = Vec::new();

    tags.push(format!("<title>{}</title>", html_escape(&bundle.title)));

    if !bundle.description.is_empty() {
        tags.push(format!(
            r#"<meta name="description" content="{}">"#,
            html_escape(&bundle.description)
        ));
    }

    if !bundle.keywords.is_empty() {
        tags.push(format!(
            r#"<meta name="keywords" content="{}">"#,
            html_escape(&bundle.keywords.join(", "))
        ));
    }

    if !bundle.canonical.is_empty() {
        tags.push(format!(
            r#"<link rel="canonical" href="{}">"#,
            html_escape(&bundle.canonical)
        ));
    }

    tags.push(format!(
        r#"<meta name="robots" content="{}">"#,
        html_escape(&bundle.robots)
    ));

    for (property, content) in &bundle.open_graph {
        if !content.is_empty() {
            tags.push(format!(
                r#"<meta property="{}" content="{}">"#,
                html_escape(property),
                html_escape(content)
            ));
        }
    }

    for (name, content) in &bundle.twitter {
        if !content.is_empty() {
            tags.push(format!(
                r#"<meta name="{}" content="{}">"#,
                html_escape(name),
                html_escape(content)
            ));
        }
    }

    if let Some(app_id) = non_empty(Setting::get(pool, cache, "facebook_app_id")) {
        tags.push(format!(
            r#"<meta property="fb:app_id" content="{}">"#,
            html_escape(&app_id)
        ));
    }

    tags.join("\n    ")
}
