#![deny(unsafe_code)]

pub mod error;
pub mod metadata;
pub mod store;
pub mod sync;

pub use error::{Result, SyncError};
pub use metadata::{AttributeMeta, EntityMeta, FieldType, RefEntity, flatten_attributes};
pub use store::{EntityStore, JsonEntityStore, QueryArgs, Record, SortOrder, StoreDocument, record_id};
pub use sync::{BATCH_SIZE, EntitySync, SYNC_ORDER, SyncReport, query_args, sync, translate_record};
