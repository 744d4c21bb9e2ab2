use crate::storage::{Blob, Link};
use migration::entities::{blob, link};

/// 将 Sea-ORM Model 转换为 Blob
pub fn model_to_blob(model: blob::Model) -> Blob {
    Blob {
        id: model.id,
        hash: model.hash,
        location: model.location,
        size: model.size.max(0) as u64,
        access_count: model.access_count.max(0) as u64,
        created_at: model.created_at,
        accessed_at: model.accessed_at,
    }
}

/// 将 Sea-ORM Model 转换为 Link
pub fn model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        short_code: model.short_code,
        blob_location: model.blob_location,
        owner_id: model.owner_id,
        visibility: model.visibility,
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
