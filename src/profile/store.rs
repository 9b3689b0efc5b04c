use async_trait::async_trait;

use super::errors::ProfileError;
use super::types::ProfileRecord;

/// Collection namespace the document store keys profile records under
pub const USERS_COLLECTION: &str = "users";

/// Interface to the managed document store, scoped to profile records.
///
/// Writes are full replacements; partial updates happen by read-modify-write
/// in the layers that own the fields.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read the record for `uid`, `None` if absent.
    async fn get(&self, uid: &str) -> Result<Option<ProfileRecord>, ProfileError>;

    /// Write (replace) the record for `uid`.
    async fn put(&self, uid: &str, record: &ProfileRecord) -> Result<(), ProfileError>;

    /// Whether a record exists for `uid`, without transferring it.
    async fn exists(&self, uid: &str) -> Result<bool, ProfileError>;
}
