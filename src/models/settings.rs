use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cache::TtlCache;
use crate::db::DbPool;

const ALL_CACHE_KEY: &str = "settings_all";

#[derive(Debug, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl Setting {
    fn cache_key(key: &str) -> String {
        format!("setting_{}", key)
    }

    /// Cache-aside read. A storage miss returns None and caches nothing,
    /// so a later call with a different default stays honest.
    pub fn get(pool: &DbPool, cache: &TtlCache, key: &str) -> Option<String> {
        let ck = Self::cache_key(key);
        if let Some(cached) = cache.get(&ck) {
            return Some(cached);
        }

        let conn = pool.get().ok()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .ok();

        if let Some(ref v) = value {
            cache.put(&ck, v);
        }
        value
    }

    pub fn get_or(pool: &DbPool, cache: &TtlCache, key: &str, default: &str) -> String {
        Self::get(pool, cache, key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_bool(pool: &DbPool, cache: &TtlCache, key: &str) -> bool {
        Self::get(pool, cache, key)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }

    /// Upsert, then drop only this key's cache entry. The whole-map snapshot
    /// from `all()` is left alone until it expires.
    pub fn set(pool: &DbPool, cache: &TtlCache, key: &str, value: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| e.to_string())?;
        cache.forget(&Self::cache_key(key));
        Ok(())
    }

    pub fn set_many(
        pool: &DbPool,
        cache: &TtlCache,
        settings: &HashMap<String, String>,
    ) -> Result<(), String> {
        for (key, value) in settings {
            Self::set(pool, cache, key, value)?;
        }
        Ok(())
    }

    /// Full key→value map, cached whole as a JSON document.
    pub fn all(pool: &DbPool, cache: &TtlCache) -> HashMap<String, String> {
        if let Some(cached) = cache.get(ALL_CACHE_KEY) {
            if let Ok(map) = serde_json::from_str(&cached) {
                return map;
            }
        }

        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };

        let mut stmt = match conn.prepare("SELECT key, value FROM settings") {
            Ok(s) => s,
            Err(_) => return HashMap::new(),
        };

        let map: HashMap<String, String> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                ))
            })
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default();

        if let Ok(json) = serde_json::to_string(&map) {
            cache.put(ALL_CACHE_KEY, &json);
        }
        map
    }

    pub fn delete(pool: &DbPool, cache: &TtlCache, key: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])
            .map_err(|e| e.to_string())?;
        cache.forget(&Self::cache_key(key));
        Ok(())
    }
}
