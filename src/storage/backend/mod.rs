//! SeaORM index backend
//!
//! Persists the Blob index (unique `hash`) and the Link table (unique
//! `short_code`) on SQLite, MySQL/MariaDB or PostgreSQL.

mod blobs;
mod connection;
mod converters;
mod links;
mod query;

use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{PastelinkerError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_blob, model_to_link};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(PastelinkerError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 唯一约束冲突映射为 Conflict，其余为数据库操作错误
pub(crate) fn map_db_err(context: &str, err: DbErr) -> PastelinkerError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            PastelinkerError::conflict(format!("{}: unique constraint violated ({})", context, detail))
        }
        _ => PastelinkerError::database_operation(format!("{}: {}", context, err)),
    }
}

/// SeaORM-based persisted index
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    pub async fn new(database_url: &str, backend_name: &str, pool_size: u32) -> Result<Self> {
        if database_url.is_empty() {
            return Err(PastelinkerError::database_config("database_url is empty"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, pool_size).await?
        };

        run_migrations(&db).await?;

        info!("{} index storage initialized.", backend_name.to_uppercase());
        Ok(Self {
            db,
            backend_name: backend_name.to_string(),
        })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let backend_name = infer_backend_from_url(&config.database_url)?;
        Self::new(&config.database_url, &backend_name, config.pool_size).await
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 关闭连接池
    pub async fn close(self) -> Result<()> {
        self.db
            .close()
            .await
            .map_err(|e| PastelinkerError::database_connection(format!("Failed to close database: {}", e)))?;
        info!("Database connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://test.db?mode=rwc").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("pastelinker.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mariadb://u@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("postgresql://u@h/db").unwrap(), "postgres");
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }

    #[test]
    fn test_map_db_err_generic_is_database_operation() {
        let err = map_db_err("insert", DbErr::Custom("boom".to_string()));
        assert!(matches!(err, PastelinkerError::DatabaseOperation(_)));
    }
}
