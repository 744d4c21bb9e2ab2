pub mod blob;
pub mod link;

pub use blob::Entity as BlobEntity;
pub use link::Entity as LinkEntity;
