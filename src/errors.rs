use std::fmt;

#[derive(Debug, Clone)]
pub enum PastelinkerError {
    NotFound(String),
    Conflict(String),
    Storage(String),
    CacheConnection(String),
    CacheOperation(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    Serialization(String),
    Config(String),
}

impl PastelinkerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PastelinkerError::NotFound(_) => "E001",
            PastelinkerError::Conflict(_) => "E002",
            PastelinkerError::Storage(_) => "E003",
            PastelinkerError::CacheConnection(_) => "E004",
            PastelinkerError::CacheOperation(_) => "E005",
            PastelinkerError::DatabaseConfig(_) => "E006",
            PastelinkerError::DatabaseConnection(_) => "E007",
            PastelinkerError::DatabaseOperation(_) => "E008",
            PastelinkerError::Validation(_) => "E009",
            PastelinkerError::Serialization(_) => "E010",
            PastelinkerError::Config(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PastelinkerError::NotFound(_) => "Resource Not Found",
            PastelinkerError::Conflict(_) => "Conflict",
            PastelinkerError::Storage(_) => "Blob Storage Error",
            PastelinkerError::CacheConnection(_) => "Cache Connection Error",
            PastelinkerError::CacheOperation(_) => "Cache Operation Error",
            PastelinkerError::DatabaseConfig(_) => "Database Configuration Error",
            PastelinkerError::DatabaseConnection(_) => "Database Connection Error",
            PastelinkerError::DatabaseOperation(_) => "Database Operation Error",
            PastelinkerError::Validation(_) => "Validation Error",
            PastelinkerError::Serialization(_) => "Serialization Error",
            PastelinkerError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PastelinkerError::NotFound(msg)
            | PastelinkerError::Conflict(msg)
            | PastelinkerError::Storage(msg)
            | PastelinkerError::CacheConnection(msg)
            | PastelinkerError::CacheOperation(msg)
            | PastelinkerError::DatabaseConfig(msg)
            | PastelinkerError::DatabaseConnection(msg)
            | PastelinkerError::DatabaseOperation(msg)
            | PastelinkerError::Validation(msg)
            | PastelinkerError::Serialization(msg)
            | PastelinkerError::Config(msg) => msg,
        }
    }

    /// 调用方可以整体重试的错误（create 重新生成短码即可）
    pub fn is_retryable(&self) -> bool {
        matches!(self, PastelinkerError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PastelinkerError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PastelinkerError::Conflict(_))
    }

    /// 格式化为彩色输出（用于 CLI 的错误提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PastelinkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PastelinkerError {}

// 便捷的构造函数
impl PastelinkerError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::Conflict(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::Storage(msg.into())
    }

    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::CacheConnection(msg.into())
    }

    pub fn cache_operation<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::CacheOperation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        PastelinkerError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for PastelinkerError {
    fn from(err: sea_orm::DbErr) -> Self {
        PastelinkerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for PastelinkerError {
    fn from(err: std::io::Error) -> Self {
        PastelinkerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PastelinkerError {
    fn from(err: serde_json::Error) -> Self {
        PastelinkerError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for PastelinkerError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            PastelinkerError::CacheConnection(err.to_string())
        } else {
            PastelinkerError::CacheOperation(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, PastelinkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            PastelinkerError::not_found("x"),
            PastelinkerError::conflict("x"),
            PastelinkerError::storage("x"),
            PastelinkerError::cache_connection("x"),
            PastelinkerError::cache_operation("x"),
            PastelinkerError::database_config("x"),
            PastelinkerError::database_connection("x"),
            PastelinkerError::database_operation("x"),
            PastelinkerError::validation("x"),
            PastelinkerError::serialization("x"),
            PastelinkerError::config("x"),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(PastelinkerError::conflict("dup").is_retryable());
        assert!(!PastelinkerError::not_found("gone").is_retryable());
        assert!(!PastelinkerError::storage("io").is_retryable());
    }

    #[test]
    fn test_format_simple() {
        let err = PastelinkerError::not_found("Link not found");
        assert_eq!(err.format_simple(), "Resource Not Found: Link not found");
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PastelinkerError = io.into();
        assert!(matches!(err, PastelinkerError::Storage(_)));
    }
}
