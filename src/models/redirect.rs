use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Redirect {
    pub id: i64,
    pub old_url: String,
    pub new_url: String,
    pub status_code: u16,
    pub is_active: bool,
    pub hits: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct RedirectForm {
    pub old_url: String,
    pub new_url: String,
    pub status_code: u16,
    pub is_active: Option<bool>,
}

impl Redirect {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let active_raw: i64 = row.get("is_active")?;
        let status_raw: i64 = row.get("status_code")?;
        Ok(Redirect {
            id: row.get("id")?,
            old_url: row.get("old_url")?,
            new_url: row.get("new_url")?,
            status_code: status_raw as u16,
            is_active: active_raw != 0,
            hits: row.get("hits")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM redirects WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    /// Newest-first listing for the admin surface, with optional substring
    /// search over both URLs.
    pub fn list(pool: &DbPool, search: Option<&str>, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let (sql, pattern) = match search {
            Some(s) if !s.is_empty() => (
                "SELECT * FROM redirects WHERE old_url LIKE ?1 OR new_url LIKE ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
                Some(format!("%{}%", s)),
            ),
            _ => (
                "SELECT * FROM redirects ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                None,
            ),
        };

        let mut stmt = match conn.prepare(sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let rows = match pattern {
            Some(p) => stmt.query_map(params![p, limit, offset], Self::from_row),
            None => stmt.query_map(params![limit, offset], Self::from_row),
        };

        rows.map(|r| r.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool, search: Option<&str>) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };

        match search {
            Some(s) if !s.is_empty() => conn
                .query_row(
                    "SELECT COUNT(*) FROM redirects WHERE old_url LIKE ?1 OR new_url LIKE ?1",
                    params![format!("%{}%", s)],
                    |row| row.get(0),
                )
                .unwrap_or(0),
            _ => conn
                .query_row("SELECT COUNT(*) FROM redirects", [], |row| row.get(0))
                .unwrap_or(0),
        }
    }

    pub fn create(pool: &DbPool, form: &RedirectForm) -> Result<i64, String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO redirects (old_url, new_url, status_code, is_active)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                form.old_url,
                form.new_url,
                form.status_code,
                form.is_active.unwrap_or(true)
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(pool: &DbPool, id: i64, form: &RedirectForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        let changed = conn
            .execute(
                "UPDATE redirects
                 SET old_url = ?1, new_url = ?2, status_code = ?3, is_active = ?4,
                     updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?5",
                params![
                    form.old_url,
                    form.new_url,
                    form.status_code,
                    form.is_active.unwrap_or(true),
                    id
                ],
            )
            .map_err(|e| e.to_string())?;
        if changed == 0 {
            return Err("Redirect not found".into());
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM redirects WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn toggle_active(pool: &DbPool, id: i64) -> Result<bool, String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE redirects SET is_active = NOT is_active, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?1",
            params![id],
        )
        .map_err(|e| e.to_string())?;
        conn.query_row(
            "SELECT is_active FROM redirects WHERE id = ?1",
            params![id],
            |row| row.get::<_, i64>(0).map(|v| v != 0),
        )
        .map_err(|e| e.to_string())
    }

    /// Look up an active rule for a request path. Both the incoming path
    /// and the stored old_url may be bare, slash-prefixed, or fully
    /// qualified; the input is reduced to a path and the three stored
    /// forms are tried in one query. Ties resolve to the lowest id.
    pub fn resolve(pool: &DbPool, path: &str, site_url: &str) -> Option<(String, u16)> {
        let conn = pool.get().ok()?;

        let base = site_url.trim_end_matches('/');
        let path = path.strip_prefix(base).unwrap_or(path);
        let bare = path.trim_start_matches('/');
        let with_slash = format!("/{}", bare);
        let full = format!("{}/{}", base, bare);

        let (id, new_url, status_code) = conn
            .query_row(
                "SELECT id, new_url, status_code FROM redirects
                 WHERE is_active = 1 AND old_url IN (?1, ?2, ?3)
                 ORDER BY id LIMIT 1",
                params![bare, with_slash, full],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)? as u16,
                    ))
                },
            )
            .ok()?;

        // Best effort: a failed count must not block the redirect itself
        if let Err(e) = Self::record_hit(pool, id) {
            log::warn!("Failed to record redirect hit for rule {}: {}", id, e);
        }

        Some((new_url, status_code))
    }

    /// Atomic counter bump at the storage layer; no read-modify-write.
    pub fn record_hit(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE redirects SET hits = hits + 1 WHERE id = ?1",
            params![id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}
