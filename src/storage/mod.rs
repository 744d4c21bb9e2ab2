pub mod backend;
pub mod models;

pub use backend::{SeaOrmStorage, infer_backend_from_url};
pub use models::{
    Blob, Link, LinkChanges, LinkPage, LinkQuery, LinkSortField, LinkState, NewBlob, NewLink,
    SortOrder,
};
