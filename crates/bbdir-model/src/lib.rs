#![deny(unsafe_code)]

pub mod entity;
pub mod error;
pub mod store;
pub mod tokens;
pub mod value;

pub use entity::{Entity, EntityKind, ID_ATTRIBUTE};
pub use error::{ModelError, Result};
pub use store::{BIOBANK_COLLECTIONS, COLLECTION_BIOBANK, ChangeSet, DirectoryStore, Sheets, Table};
pub use tokens::{join_tokens, split_tokens, union_tokens};
pub use value::Value;
