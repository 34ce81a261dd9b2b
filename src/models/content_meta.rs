use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::content::ContentType;
use crate::db::DbPool;

/// Per-item SEO override row. Created lazily on first write; deleting it
/// when the owning item goes away is the owner's job.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentMeta {
    pub id: i64,
    pub content_type: String,
    pub content_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_image: Option<String>,
    pub canonical_url: Option<String>,
    pub robots: String,
    pub schema_type: Option<String>,
    pub schema_data: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentMetaForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub og_image: Option<String>,
    pub canonical_url: Option<String>,
    pub robots: Option<String>,
    pub schema_type: Option<String>,
    pub schema_data: Option<serde_json::Value>,
}

impl ContentMeta {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ContentMeta {
            id: row.get("id")?,
            content_type: row.get("content_type")?,
            content_id: row.get("content_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            keywords: row.get("keywords")?,
            og_image: row.get("og_image")?,
            canonical_url: row.get("canonical_url")?,
            robots: row.get("robots")?,
            schema_type: row.get("schema_type")?,
            schema_data: row.get("schema_data")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find(pool: &DbPool, content_type: ContentType, content_id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM content_meta WHERE content_type = ?1 AND content_id = ?2",
            params![content_type.as_str(), content_id],
            Self::from_row,
        )
        .ok()
    }

    pub fn upsert(
        pool: &DbPool,
        content_type: ContentType,
        content_id: i64,
        form: &ContentMetaForm,
    ) -> Result<i64, String> {
        let conn = pool.get().map_err(|e| e.to_string())?;

        let keywords = form.keywords.as_ref().map(|list| list.join(", "));
        let schema_data = form
            .schema_data
            .as_ref()
            .map(|v| v.to_string());

        conn.execute(
            "INSERT INTO content_meta
                 (content_type, content_id, title, description, keywords, og_image,
                  canonical_url, robots, schema_type, schema_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(content_type, content_id) DO UPDATE SET
                 title = ?3, description = ?4, keywords = ?5, og_image = ?6,
                 canonical_url = ?7, robots = ?8, schema_type = ?9, schema_data = ?10,
                 updated_at = CURRENT_TIMESTAMP",
            params![
                content_type.as_str(),
                content_id,
                form.title,
                form.description,
                keywords,
                form.og_image,
                form.canonical_url,
                form.robots.as_deref().unwrap_or("index,follow"),
                form.schema_type,
                schema_data,
            ],
        )
        .map_err(|e| e.to_string())?;

        conn.query_row(
            "SELECT id FROM content_meta WHERE content_type = ?1 AND content_id = ?2",
            params![content_type.as_str(), content_id],
            |row| row.get(0),
        )
        .map_err(|e| e.to_string())
    }

    pub fn delete(pool: &DbPool, content_type: ContentType, content_id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "DELETE FROM content_meta WHERE content_type = ?1 AND content_id = ?2",
            params![content_type.as_str(), content_id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Stored comma-joined, exposed as a list.
    pub fn keywords_vec(&self) -> Vec<String> {
        match &self.keywords {
            Some(raw) if !raw.is_empty() => raw
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}
