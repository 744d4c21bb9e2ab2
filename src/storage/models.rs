use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PastelinkerError;

/// 一份已存储的内容（按摘要去重）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub id: i64,
    pub hash: String,
    pub location: String,
    pub size: u64,
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
}

/// 新 Blob 的索引记录
#[derive(Debug, Clone)]
pub struct NewBlob {
    pub hash: String,
    pub location: String,
    pub size: u64,
}

/// 指向某个 Blob 的命名引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub short_code: String,
    pub blob_location: String,
    pub owner_id: String,
    pub visibility: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 读取时计算出的链接状态，不落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    ActiveVisible,
    ActiveHidden,
    Expired,
}

impl Link {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// 过期优先于隐藏
    pub fn state_at(&self, now: DateTime<Utc>) -> LinkState {
        if self.is_expired_at(now) {
            LinkState::Expired
        } else if self.visibility {
            LinkState::ActiveVisible
        } else {
            LinkState::ActiveHidden
        }
    }

    pub fn is_readable_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == LinkState::ActiveVisible
    }
}

/// 新建链接
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub blob_location: String,
    pub owner_id: String,
    pub visibility: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// 链接的部分更新；`None` 表示保持不变
#[derive(Debug, Clone, Default)]
pub struct LinkChanges {
    pub blob_location: Option<String>,
    pub visibility: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// 分页排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    ExpiresAt,
    ShortCode,
}

impl FromStr for LinkSortField {
    type Err = PastelinkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "created_at" | "createdat" => Ok(Self::CreatedAt),
            "updated_at" | "updatedat" => Ok(Self::UpdatedAt),
            "expires_at" | "expiresat" => Ok(Self::ExpiresAt),
            "short_code" | "shortcode" => Ok(Self::ShortCode),
            _ => Err(PastelinkerError::validation(format!(
                "Invalid sort field: '{}'. Valid: created_at, updated_at, expires_at, short_code",
                s
            ))),
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = PastelinkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(PastelinkerError::validation(format!(
                "Invalid sort order: '{}'. Valid: asc, desc",
                s
            ))),
        }
    }
}

pub const MAX_PAGE_SIZE: u64 = 100;

/// 链接分页查询
#[derive(Debug, Clone)]
pub struct LinkQuery {
    /// 只列出该用户的链接，`None` 表示全部
    pub owner_id: Option<String>,
    /// 从 1 开始
    pub page: u64,
    pub page_size: u64,
    pub sort_by: LinkSortField,
    pub order: SortOrder,
}

impl Default for LinkQuery {
    fn default() -> Self {
        Self {
            owner_id: None,
            page: 1,
            page_size: 10,
            sort_by: LinkSortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl LinkQuery {
    pub fn validate(&self) -> Result<(), PastelinkerError> {
        if self.page == 0 {
            return Err(PastelinkerError::validation("page starts from 1"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(PastelinkerError::validation(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}
