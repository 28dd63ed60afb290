pub mod directory;
pub mod error;
pub mod naming;
pub mod sniff;
pub mod store;

pub use directory::DirectoryStore;
pub use error::StoreError;
pub use store::{FileStore, StoredContent};
