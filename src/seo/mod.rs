pub mod meta;
pub mod schema;
pub mod sitemap;

pub use meta::MetaBundle;
pub use schema::StructuredData;
pub use sitemap::SitemapBuilder;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Make a possibly-relative path absolute against the configured site URL.
fn absolute_url(site_url: &str, path: &str) -> String {
    if path.is_empty() {
        return site_url.trim_end_matches('/').to_string();
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        site_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Tag-stripped excerpt capped at `limit` characters, for descriptions
/// derived from body text.
fn excerpt(text: &str, limit: usize) -> String {
    let stripped = strip_tags(text);
    let trimmed = stripped.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(limit).collect();
    format!("{}...", cut.trim_end())
}
