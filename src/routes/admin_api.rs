use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::cache::TtlCache;
use crate::content::ContentType;
use crate::db::DbPool;
use crate::models::content_meta::{ContentMeta, ContentMetaForm};
use crate::models::redirect::{Redirect, RedirectForm};
use crate::models::settings::Setting;
use crate::seo::sitemap::SitemapBuilder;

use super::public::site_sitemap;

// ── Settings ───────────────────────────────────────────

#[get("/settings")]
pub fn settings_list(pool: &State<DbPool>, cache: &State<TtlCache>) -> Json<Value> {
    Json(json!(Setting::all(pool, cache)))
}

fn validate_settings(data: &HashMap<String, String>) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    for key in ["site_name", "title_template", "robots_content"] {
        if let Some(value) = data.get(key) {
            if value.trim().is_empty() {
                errors.insert(key.to_string(), format!("{} is required", key));
            }
        }
    }

    for key in ["site_name", "site_url", "title_template", "twitter_handle", "facebook_app_id"] {
        if let Some(value) = data.get(key) {
            if value.len() > 255 {
                errors.insert(key.to_string(), format!("{} must be at most 255 characters", key));
            }
        }
    }

    for key in ["default_description", "default_og_image"] {
        if let Some(value) = data.get(key) {
            if value.len() > 500 {
                errors.insert(key.to_string(), format!("{} must be at most 500 characters", key));
            }
        }
    }

    errors
}

#[post("/settings", data = "<body>")]
pub fn settings_save(
    pool: &State<DbPool>,
    cache: &State<TtlCache>,
    body: Json<HashMap<String, String>>,
) -> Json<Value> {
    let data = body.into_inner();

    let errors = validate_settings(&data);
    if !errors.is_empty() {
        return Json(json!({ "ok": false, "errors": errors }));
    }

    match Setting::set_many(pool, cache, &data) {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => Json(json!({ "ok": false, "error": e })),
    }
}

// ── Redirects ──────────────────────────────────────────

fn validate_redirect(form: &RedirectForm) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    if form.old_url.trim().is_empty() {
        errors.insert("old_url".to_string(), "Old URL is required".to_string());
    } else if form.old_url.len() > 500 {
        errors.insert(
            "old_url".to_string(),
            "Old URL must be at most 500 characters".to_string(),
        );
    }

    if form.new_url.trim().is_empty() {
        errors.insert("new_url".to_string(), "New URL is required".to_string());
    } else if form.new_url.len() > 500 {
        errors.insert(
            "new_url".to_string(),
            "New URL must be at most 500 characters".to_string(),
        );
    }

    if form.status_code != 301 && form.status_code != 302 {
        errors.insert(
            "status_code".to_string(),
            "Status code must be 301 or 302".to_string(),
        );
    }

    errors
}

#[get("/redirects?<search>&<limit>&<offset>")]
pub fn redirects_list(
    pool: &State<DbPool>,
    search: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Json<Value> {
    let limit = limit.unwrap_or(20);
    let offset = offset.unwrap_or(0);
    let redirects = Redirect::list(pool, search.as_deref(), limit, offset);
    let total = Redirect::count(pool, search.as_deref());
    Json(json!({ "redirects": redirects, "total": total }))
}

#[post("/redirects", data = "<form>")]
pub fn redirects_create(pool: &State<DbPool>, form: Json<RedirectForm>) -> Json<Value> {
    let form = form.into_inner();

    let errors = validate_redirect(&form);
    if !errors.is_empty() {
        return Json(json!({ "ok": false, "errors": errors }));
    }

    match Redirect::create(pool, &form) {
        Ok(id) => Json(json!({ "ok": true, "id": id })),
        Err(e) => Json(json!({ "ok": false, "error": e })),
    }
}

#[put("/redirects/<id>", data = "<form>")]
pub fn redirects_update(pool: &State<DbPool>, id: i64, form: Json<RedirectForm>) -> Json<Value> {
    let form = form.into_inner();

    let errors = validate_redirect(&form);
    if !errors.is_empty() {
        return Json(json!({ "ok": false, "errors": errors }));
    }

    match Redirect::update(pool, id, &form) {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => Json(json!({ "ok": false, "error": e })),
    }
}

#[delete("/redirects/<id>")]
pub fn redirects_delete(pool: &State<DbPool>, id: i64) -> Json<Value> {
    match Redirect::delete(pool, id) {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => Json(json!({ "ok": false, "error": e })),
    }
}

#[post("/redirects/<id>/toggle")]
pub fn redirects_toggle(pool: &State<DbPool>, id: i64) -> Json<Value> {
    match Redirect::toggle_active(pool, id) {
        Ok(active) => Json(json!({ "ok": true, "is_active": active })),
        Err(e) => Json(json!({ "ok": false, "error": e })),
    }
}

// ── Content meta ───────────────────────────────────────

#[get("/meta/<content_type>/<content_id>")]
pub fn meta_get(pool: &State<DbPool>, content_type: &str, content_id: i64) -> Option<Json<Value>> {
    let ctype = ContentType::parse(content_type)?;
    let meta = ContentMeta::find(pool, ctype, content_id)?;
    let keywords = meta.keywords_vec();
    let mut value = serde_json::to_value(&meta).unwrap_or_default();
    value["keywords"] = json!(keywords);
    Some(Json(value))
}

#[post("/meta/<content_type>/<content_id>", data = "<form>")]
pub fn meta_save(
    pool: &State<DbPool>,
    content_type: &str,
    content_id: i64,
    form: Json<ContentMetaForm>,
) -> Json<Value> {
    let ctype = match ContentType::parse(content_type) {
        Some(t) => t,
        None => {
            return Json(json!({
                "ok": false,
                "errors": { "content_type": "Unknown content type" },
            }))
        }
    };

    match ContentMeta::upsert(pool, ctype, content_id, &form.into_inner()) {
        Ok(id) => Json(json!({ "ok": true, "id": id })),
        Err(e) => Json(json!({ "ok": false, "error": e })),
    }
}

#[delete("/meta/<content_type>/<content_id>")]
pub fn meta_delete(pool: &State<DbPool>, content_type: &str, content_id: i64) -> Json<Value> {
    let ctype = match ContentType::parse(content_type) {
        Some(t) => t,
        None => {
            return Json(json!({
                "ok": false,
                "errors": { "content_type": "Unknown content type" },
            }))
        }
    };

    match ContentMeta::delete(pool, ctype, content_id) {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => Json(json!({ "ok": false, "error": e })),
    }
}

// ── Sitemap actions ────────────────────────────────────

#[post("/sitemap/regenerate")]
pub fn sitemap_regenerate(pool: &State<DbPool>, cache: &State<TtlCache>) -> Json<Value> {
    SitemapBuilder::clear_cache(cache);
    let xml = site_sitemap(pool, cache).generate(cache);
    let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");
    Json(json!({
        "ok": !xml.is_empty(),
        "message": format!(
            "Sitemap regenerated. View it at: {}/sitemap.xml",
            site_url.trim_end_matches('/')
        ),
    }))
}

/// Pinging only makes sense once the site is reachable from outside;
/// loopback site URLs are refused here rather than in the builder.
pub fn is_loopback_host(site_url: &str) -> bool {
    match url::Url::parse(site_url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => {
                host == "localhost" || host == "::1" || host == "[::1]" || host.starts_with("127.")
            }
            None => true,
        },
        Err(_) => true,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
    }
}

#[post("/sitemap/ping")]
pub fn sitemap_ping(pool: &State<DbPool>, cache: &State<TtlCache>) -> Json<Value> {
    let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");

    if is_loopback_host(&site_url) {
        return Json(json!({
            "ok": false,
            "message": "Cannot ping search engines from localhost. Deploy the site to a public address first.",
        }));
    }

    let sitemap_url = format!("{}/sitemap.xml", site_url.trim_end_matches('/'));
    let results = SitemapBuilder::ping_search_engines(&sitemap_url);

    let summary = results
        .iter()
        .map(|(engine, ok)| {
            format!("{}: {}", capitalize(engine), if *ok { "ok" } else { "failed" })
        })
        .collect::<Vec<_>>()
        .join(", ");
    let any_ok = results.iter().any(|(_, ok)| *ok);

    let message = if any_ok {
        format!("Sitemap ping results: {}", summary)
    } else {
        format!("Failed to ping search engines. {}", summary)
    };

    let result_map: HashMap<String, bool> = results.into_iter().collect();
    Json(json!({ "ok": any_ok, "message": message, "results": result_map }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        settings_list,
        settings_save,
        redirects_list,
        redirects_create,
        redirects_update,
        redirects_delete,
        redirects_toggle,
        meta_get,
        meta_save,
        meta_delete,
        sitemap_regenerate,
        sitemap_ping,
    ]
}
