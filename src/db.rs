use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool(path: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    // busy_timeout is per-connection, so it goes through with_init
    let manager = SqliteConnectionManager::file(path)
        .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout=5000; PRAGMA foreign_keys=ON;"));
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        -- Redirect rules
        CREATE TABLE IF NOT EXISTS redirects (
            id INTEGER PRIMARY KEY,
            old_url TEXT NOT NULL,
            new_url TEXT NOT NULL,
            status_code INTEGER NOT NULL DEFAULT 301,
            is_active INTEGER NOT NULL DEFAULT 1,
            hits INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_redirects_old_url ON redirects(old_url);
        CREATE INDEX IF NOT EXISTS idx_redirects_active ON redirects(is_active);

        -- Per-item SEO overrides, one row per (content_type, content_id)
        CREATE TABLE IF NOT EXISTS content_meta (
            id INTEGER PRIMARY KEY,
            content_type TEXT NOT NULL,
            content_id INTEGER NOT NULL,
            title TEXT,
            description TEXT,
            keywords TEXT,
            og_image TEXT,
            canonical_url TEXT,
            robots TEXT NOT NULL DEFAULT 'index,follow',
            schema_type TEXT,
            schema_data TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(content_type, content_id)
        );
        ",
    )?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        ("site_name", "Sitelift"),
        ("site_url", "http://localhost:8000"),
        ("title_template", "{title} | {site}"),
        ("default_description", ""),
        ("default_og_image", ""),
        ("twitter_handle", ""),
        ("facebook_app_id", ""),
        ("sitemap_enabled", "1"),
        ("robots_content", "User-agent: *\nDisallow:"),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    Ok(())
}
