use rocket::http::ContentType;
use rocket::State;

use crate::cache::TtlCache;
use crate::db::DbPool;
use crate::models::settings::Setting;
use crate::seo::sitemap::{robots_txt, SitemapBuilder, UrlOptions};

/// Site sitemap: the root URL today; host collections slot in here.
pub fn site_sitemap(pool: &DbPool, cache: &TtlCache) -> SitemapBuilder {
    let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");
    let mut builder = SitemapBuilder::new();
    builder.add_url(
        site_url.trim_end_matches('/'),
        UrlOptions {
            changefreq: Some("daily".to_string()),
            priority: Some("1.0".to_string()),
            ..Default::default()
        },
    );
    builder
}

// ── Sitemap ────────────────────────────────────────────

#[get("/sitemap.xml")]
pub fn sitemap(pool: &State<DbPool>, cache: &State<TtlCache>) -> (ContentType, String) {
    // Disabled or failed builds still answer 200 with a well-formed,
    // empty urlset
    let xml = if Setting::get_bool(pool, cache, "sitemap_enabled") {
        site_sitemap(pool, cache).generate(cache)
    } else {
        SitemapBuilder::new().build()
    };
    (ContentType::new("application", "xml"), xml)
}

// ── Robots.txt ─────────────────────────────────────────

#[get("/robots.txt")]
pub fn robots(pool: &State<DbPool>, cache: &State<TtlCache>) -> String {
    robots_txt(pool, cache)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![sitemap, robots]
}
