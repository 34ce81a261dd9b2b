use chrono::{SecondsFormat, Utc};
use std::time::Duration;

use crate::cache::TtlCache;
use crate::content::SeoContent;
use crate::db::DbPool;
use crate::models::settings::Setting;

use super::html_escape;

const SITEMAP_CACHE_KEY: &str = "sitemap_xml";

const SEARCH_ENGINES: &[(&str, &str)] = &[
    ("google", "https://www.google.com/ping?sitemap="),
    ("bing", "https://www.bing.com/ping?sitemap="),
];

#[derive(Debug, Default)]
pub struct UrlOptions {
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug)]
struct SitemapUrl {
    loc: String,
    lastmod: String,
    changefreq: String,
    priority: String,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Collects URLs and renders the sitemap document. The rendered document is
/// memoized whole in the shared cache; entries are never persisted.
pub struct SitemapBuilder {
    urls: Vec<SitemapUrl>,
}

impl SitemapBuilder {
    pub fn new() -> Self {
        SitemapBuilder { urls: Vec::new() }
    }

    /// Append one URL. Unset options default to lastmod = now,
    /// changefreq = "weekly", priority = "0.5".
    pub fn add_url(&mut self, loc: &str, options: UrlOptions) -> &mut Self {
        self.urls.push(SitemapUrl {
            loc: loc.to_string(),
            lastmod: options.lastmod.unwrap_or_else(now_rfc3339),
            changefreq: options.changefreq.unwrap_or_else(|| "weekly".to_string()),
            priority: options.priority.unwrap_or_else(|| "0.5".to_string()),
        });
        self
    }

    /// Append one entry per collection item. The URL comes from the
    /// caller's extractor when given, else the item's own accessor; items
    /// yielding neither are skipped.
    pub fn add_collection(
        &mut self,
        items: &[&dyn SeoContent],
        url_for: Option<&dyn Fn(&dyn SeoContent) -> Option<String>>,
    ) -> &mut Self {
        for item in items {
            let url = match url_for {
                Some(f) => f(*item),
                None => item.url(),
            };

            let loc = match url {
                Some(u) if !u.is_empty() => u,
                _ => continue,
            };

            let lastmod = item
                .updated_at()
                .map(|dt| dt.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_else(now_rfc3339);

            self.add_url(
                &loc,
                UrlOptions {
                    lastmod: Some(lastmod),
                    changefreq: Some("weekly".to_string()),
                    priority: Some("0.7".to_string()),
                },
            );
        }
        self
    }

    /// Render the document without touching the cache.
    pub fn build(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );

        for url in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", html_escape(&url.loc)));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", url.lastmod));
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                url.changefreq
            ));
            xml.push_str(&format!("    <priority>{}</priority>\n", url.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>");
        xml
    }

    /// Memoized render: the whole document is cached for the cache's TTL
    /// and only an explicit `clear_cache` drops it early.
    pub fn generate(&self, cache: &TtlCache) -> String {
        if let Some(cached) = cache.get(SITEMAP_CACHE_KEY) {
            return cached;
        }
        let xml = self.build();
        cache.put(SITEMAP_CACHE_KEY, &xml);
        xml
    }

    pub fn clear_cache(cache: &TtlCache) {
        cache.forget(SITEMAP_CACHE_KEY);
    }

    /// Notify the fixed search-engine list of a fresh sitemap. Each ping is
    /// an independent 10-second-bounded GET; failures map to `false` and
    /// never propagate.
    pub fn ping_search_engines(sitemap_url: &str) -> Vec<(String, bool)> {
        let encoded: String = url::form_urlencoded::byte_serialize(sitemap_url.as_bytes()).collect();
        let endpoints: Vec<(String, String)> = SEARCH_ENGINES
            .iter()
            .map(|(engine, base)| (engine.to_string(), format!("{}{}", base, encoded)))
            .collect();
        Self::ping_endpoints(&endpoints)
    }

    pub(crate) fn ping_endpoints(endpoints: &[(String, String)]) -> Vec<(String, bool)> {
        let client = match reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to build ping HTTP client: {}", e);
                return endpoints
                    .iter()
                    .map(|(engine, _)| (engine.clone(), false))
                    .collect();
            }
        };

        endpoints
            .iter()
            .map(|(engine, ping_url)| {
                let ok = match client.get(ping_url).send() {
                    Ok(resp) => resp.status().is_success(),
                    Err(e) => {
                        log::warn!("Sitemap ping to {} failed: {}", engine, e);
                        false
                    }
                };
                (engine.clone(), ok)
            })
            .collect()
    }
}

/// robots.txt body: the stored directives plus a pointer at the sitemap.
pub fn robots_txt(pool: &DbPool, cache: &TtlCache) -> String {
    let mut content = Setting::get_or(pool, cache, "robots_content", "User-agent: *\nDisallow:");
    let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");
    content.push_str(&format!(
        "\n\nSitemap: {}/sitemap.xml",
        site_url.trim_end_matches('/')
    ));
    content
}
