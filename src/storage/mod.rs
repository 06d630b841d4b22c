pub mod blob_client;

pub use blob_client::{unique_blob_name, BlobStore, HttpBlobClient, StorageError};
