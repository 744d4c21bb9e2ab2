//! Link management service
//!
//! Composes the short-code generator, the content store and the link index
//! into the user-facing link lifecycle. Every mutation is scoped to the
//! caller's owner id; absent, hidden, expired and foreign links all surface
//! as the same `NotFound`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cas::ContentStore;
use crate::errors::{PastelinkerError, Result};
use crate::shortcode::ShortCodeGenerator;
use crate::storage::{Link, LinkChanges, LinkPage, LinkQuery, NewLink, SeaOrmStorage};

const LINK_NOT_FOUND: &str = "Link not found";

fn link_not_found() -> PastelinkerError {
    PastelinkerError::not_found(LINK_NOT_FOUND)
}

// ============ Request/Response DTOs ============

/// Request to create a new link
#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    /// Text content, must not be empty
    pub content: String,
    /// Defaults to visible
    pub visibility: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateLinkRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            visibility: true,
            expires_at: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = false;
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    /// New content, stored as a new blob (the previous blob is kept)
    pub content: Option<String>,
    pub visibility: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.visibility.is_none() && self.expires_at.is_none()
    }
}

/// A link as returned to callers
///
/// The blob location stays internal. `content` is `None` in listings for
/// links that are not currently readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkView {
    pub id: String,
    pub short_code: String,
    pub owner_id: String,
    pub visibility: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub content: Option<String>,
}

impl LinkView {
    fn from_link(link: Link, content: Option<String>) -> Self {
        Self {
            id: link.id,
            short_code: link.short_code,
            owner_id: link.owner_id,
            visibility: link.visibility,
            expires_at: link.expires_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
            content,
        }
    }
}

// ============ LinkService Implementation ============

/// Service for link lifecycle operations
#[derive(Clone)]
pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    content: ContentStore,
    codes: ShortCodeGenerator,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, content: ContentStore, codes: ShortCodeGenerator) -> Self {
        Self {
            storage,
            content,
            codes,
        }
    }

    pub fn content_store(&self) -> &ContentStore {
        &self.content
    }

    // ============ CRUD Operations ============

    /// Create a new link
    ///
    /// The blob is written before the link row. A `Conflict` here means the
    /// generated short code was taken concurrently; retrying the whole call
    /// generates a fresh code.
    pub async fn create(&self, owner_id: &str, req: CreateLinkRequest) -> Result<LinkView> {
        if req.content.is_empty() {
            return Err(PastelinkerError::validation("content must not be empty"));
        }

        let short_code = self.codes.generate(owner_id, &req.content).await?;
        let blob_location = self.content.put(&req.content).await?;

        let link = self
            .storage
            .insert_link(NewLink {
                short_code,
                blob_location,
                owner_id: owner_id.to_string(),
                visibility: req.visibility,
                expires_at: req.expires_at,
            })
            .await?;

        info!(
            "LinkService: created link '{}' ({}) for owner '{}'",
            link.short_code, link.id, owner_id
        );
        Ok(LinkView::from_link(link, Some(req.content)))
    }

    /// Resolve a readable link by id
    pub async fn find_by_id(&self, id: &str) -> Result<LinkView> {
        let link = self.storage.find_link_by_id(id).await?;
        self.readable(link).await
    }

    /// Resolve a readable link by short code
    pub async fn find_by_short_code(&self, code: &str) -> Result<LinkView> {
        let link = self.storage.find_link_by_code(code).await?;
        self.readable(link).await
    }

    /// Update an owned link
    pub async fn update(&self, id: &str, owner_id: &str, patch: LinkPatch) -> Result<LinkView> {
        if matches!(patch.content.as_deref(), Some("")) {
            return Err(PastelinkerError::validation("content must not be empty"));
        }

        let existing = self.owned(id, owner_id).await?;

        let blob_location = match patch.content {
            Some(ref content) => Some(self.content.put(content).await?),
            None => None,
        };

        let changes = LinkChanges {
            blob_location,
            visibility: patch.visibility,
            expires_at: patch.expires_at,
        };

        let updated = self
            .storage
            .update_link_owned(&existing.id, owner_id, changes)
            .await?
            .ok_or_else(link_not_found)?;

        let content = match patch.content {
            Some(content) => content,
            None => self.content.get(&updated.blob_location).await?,
        };

        info!("LinkService: updated link '{}'", updated.short_code);
        Ok(LinkView::from_link(updated, Some(content)))
    }

    /// Show or hide an owned link
    pub async fn update_visibility(
        &self,
        id: &str,
        owner_id: &str,
        visible: bool,
    ) -> Result<LinkView> {
        self.update(
            id,
            owner_id,
            LinkPatch {
                visibility: Some(visible),
                ..Default::default()
            },
        )
        .await
    }

    /// Set the expiration time of an owned link
    pub async fn update_expiration(
        &self,
        id: &str,
        owner_id: &str,
        at: DateTime<Utc>,
    ) -> Result<LinkView> {
        self.update(
            id,
            owner_id,
            LinkPatch {
                expires_at: Some(at),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete an owned link; the referenced blob is kept
    pub async fn delete(&self, id: &str, owner_id: &str) -> Result<()> {
        if !self.storage.delete_link_owned(id, owner_id).await? {
            return Err(link_not_found());
        }
        info!("LinkService: deleted link '{}'", id);
        Ok(())
    }

    /// List links with pagination
    ///
    /// Content is attached only to links that are currently readable.
    pub async fn list(&self, query: &LinkQuery) -> Result<LinkPage<LinkView>> {
        let page = self.storage.list_links(query).await?;
        let now = Utc::now();

        let mut items = Vec::with_capacity(page.items.len());
        for link in page.items {
            let content = if link.is_readable_at(now) {
                Some(self.content.get(&link.blob_location).await?)
            } else {
                None
            };
            items.push(LinkView::from_link(link, content));
        }

        Ok(LinkPage {
            items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    // ============ Helpers ============

    async fn readable(&self, link: Option<Link>) -> Result<LinkView> {
        let link = link.ok_or_else(link_not_found)?;
        if !link.is_readable_at(Utc::now()) {
            debug!("Link {} is {:?}, reporting not found", link.id, link.state_at(Utc::now()));
            return Err(link_not_found());
        }

        let content = self.content.get(&link.blob_location).await?;
        Ok(LinkView::from_link(link, Some(content)))
    }

    async fn owned(&self, id: &str, owner_id: &str) -> Result<Link> {
        match self.storage.find_link_by_id(id).await? {
            Some(link) if link.owner_id == owner_id => Ok(link),
            _ => Err(link_not_found()),
        }
    }
}
