// chat history storage
// supports sqlite, postgres, and mysql through the sqlx any driver

use crate::Error;
use crate::core::{Message, Role};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{AnyPool, any::AnyPoolOptions};
use std::sync::atomic::{AtomicI64, Ordering};

pub const DEFAULT_DB_URL: &str = "sqlite://lumacalm.db?mode=rwc";

const CREATE_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS chat_messages (
    id VARCHAR(36) PRIMARY KEY,
    user_id VARCHAR(255) NOT NULL,
    role VARCHAR(16) NOT NULL,
    content TEXT NOT NULL,
    created_at VARCHAR(40) NOT NULL
)"#;

pub struct ChatStore {
    pool: AnyPool,
    dialect: Dialect,
    last_micros: AtomicI64,
}

enum Dialect {
    Postgres,
    Sqlite,
    Mysql,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: String,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

impl StoredMessage {
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

impl ChatStore {
    pub async fn connect(url: &str) -> Result<Self, Error> {
        sqlx::any::install_default_drivers();

        let dialect = detect_dialect(url);

        // every in-memory sqlite connection is its own database
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        Ok(Self {
            pool,
            dialect,
            last_micros: AtomicI64::new(0),
        })
    }

    pub async fn insert(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
    ) -> Result<StoredMessage, Error> {
        let stored = StoredMessage {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            role,
            content: content.to_string(),
            created_at: self.next_timestamp(),
        };

        let sql = format!(
            "INSERT INTO chat_messages (id, user_id, role, content, created_at) VALUES ({}, {}, {}, {}, {})",
            self.param(1),
            self.param(2),
            self.param(3),
            self.param(4),
            self.param(5),
        );

        sqlx::query(&sql)
            .bind(&stored.id)
            .bind(&stored.user_id)
            .bind(stored.role.as_str())
            .bind(&stored.content)
            .bind(&stored.created_at)
            .execute(&self.pool)
            .await?;

        Ok(stored)
    }

    // oldest first
    pub async fn history(&self, user_id: &str) -> Result<Vec<StoredMessage>, Error> {
        let sql = format!(
            r#"SELECT id, user_id, role, content, created_at
               FROM chat_messages
               WHERE user_id = {}
               ORDER BY created_at ASC"#,
            self.param(1)
        );

        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(id, user_id, role, content, created_at)| -> Result<_, Error> {
                Ok(StoredMessage {
                    id,
                    user_id,
                    role: role.parse()?,
                    content,
                    created_at,
                })
            })
            .collect()
    }

    pub async fn clear(&self, user_id: &str) -> Result<u64, Error> {
        let sql = format!("DELETE FROM chat_messages WHERE user_id = {}", self.param(1));
        let result = sqlx::query(&sql)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // fixed-width utc so text ordering matches time ordering, strictly
    // increasing so rows written back to back keep their order
    fn next_timestamp(&self) -> String {
        let now = Utc::now().timestamp_micros();
        let prev = self
            .last_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        let micros = now.max(prev + 1);

        DateTime::from_timestamp_micros(micros)
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    // the any driver passes placeholders through untouched
    fn param(&self, n: usize) -> String {
        match self.dialect {
            Dialect::Postgres => format!("${n}"),
            Dialect::Sqlite | Dialect::Mysql => "?".to_string(),
        }
    }
}

fn detect_dialect(url: &str) -> Dialect {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Dialect::Postgres
    } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        Dialect::Mysql
    } else {
        Dialect::Sqlite
    }
}
