#[macro_use]
extern crate rocket;

use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};

mod cache;
mod content;
mod db;
mod models;
mod redirects;
mod routes;
mod seo;

use cache::TtlCache;
use db::DbPool;

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

pub fn build_rocket(pool: DbPool, cache: TtlCache) -> Rocket<Build> {
    rocket::build()
        .manage(pool)
        .manage(cache)
        .attach(redirects::RedirectFairing)
        .mount("/", routes::public::routes())
        .mount("/api/seo", routes::admin_api::routes())
        .register("/", catchers![not_found])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let pool = db::init_pool("sitelift.db").expect("Failed to initialize database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");
    db::seed_defaults(&pool).expect("Failed to seed default settings");

    build_rocket(pool, TtlCache::new())
}
