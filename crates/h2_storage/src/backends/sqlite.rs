use std::path::{Path, PathBuf};

use async_trait::async_trait;
use h2_core::{Error, Result, SeenStore, SubscriberStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS subscribers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER UNIQUE,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS seen_articles (
        id TEXT PRIMARY KEY,
        url TEXT,
        title TEXT,
        published_at TEXT
    )
    "#,
    // Add future migrations here
];

pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStore {
    pub async fn new() -> Result<Self> {
        Self::new_with_path(Path::new("bot_data.sqlite3")).await
    }

    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("failed to open database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl SubscriberStore for SqliteStore {
    async fn add_subscriber(&self, chat_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO subscribers(chat_id) VALUES(?)")
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to add subscriber: {}", e)))?;
        Ok(())
    }

    async fn remove_subscriber(&self, chat_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM subscribers WHERE chat_id=?")
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to remove subscriber: {}", e)))?;
        Ok(())
    }

    async fn list_subscribers(&self) -> Result<Vec<i64>> {
        let rows = sqlx::query("SELECT chat_id FROM subscribers ORDER BY chat_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to list subscribers: {}", e)))?;
        Ok(rows.iter().map(|r| r.get::<i64, _>("chat_id")).collect())
    }
}

#[async_trait]
impl SeenStore for SqliteStore {
    async fn mark_seen(
        &self,
        id: &str,
        url: &str,
        title: &str,
        published_at: Option<&str>,
    ) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO seen_articles(id,url,title,published_at) VALUES(?,?,?,?)")
            .bind(id)
            .bind(url)
            .bind(title)
            .bind(published_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to record article: {}", e)))?;
        Ok(())
    }

    async fn is_seen(&self, id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM seen_articles WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to query article: {}", e)))?;
        Ok(row.is_some())
    }
}
