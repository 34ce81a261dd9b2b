use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{Data, Request, Response};
use std::io::Cursor;

use crate::cache::TtlCache;
use crate::db::DbPool;
use crate::models::redirect::Redirect;
use crate::models::settings::Setting;

/// Consults the redirect table before any content handling and rewrites
/// the response into the rule's 301/302 when a rule matches.
pub struct RedirectFairing;

/// Local cache marker carrying a resolved redirect across request/response.
#[derive(Clone)]
struct RedirectHit(Option<(String, u16)>);

#[rocket::async_trait]
impl Fairing for RedirectFairing {
    fn info(&self) -> Info {
        Info {
            name: "SEO Redirects",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut Data<'_>) {
        let path = request.uri().path().to_string();

        // The engine's own endpoints are never redirect candidates
        if path == "/sitemap.xml" || path == "/robots.txt" || path.starts_with("/api/seo") {
            return;
        }

        let pool = match request.rocket().state::<DbPool>() {
            Some(p) => p,
            None => return,
        };
        let cache = match request.rocket().state::<TtlCache>() {
            Some(c) => c,
            None => return,
        };

        let site_url = Setting::get_or(pool, cache, "site_url", "http://localhost:8000");
        if let Some(hit) = Redirect::resolve(pool, &path, &site_url) {
            request.local_cache(|| RedirectHit(Some(hit)));
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let hit = req.local_cache(|| RedirectHit(None));
        if let Some((target, code)) = &hit.0 {
            res.set_status(Status::from_code(*code).unwrap_or(Status::MovedPermanently));
            res.set_header(Header::new("Location", target.clone()));
            res.set_sized_body(None, Cursor::new(""));
        }
    }
}
