//! Device code storage trait.
//!
//! # Security Considerations
//!
//! - Device codes are stored as SHA-256 hashes; user codes are short-lived
//!   and looked up verbatim
//! - The pending-to-terminal transition must be atomic so two approvals of
//!   the same user code cannot both succeed

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::types::{DeviceCodeRecord, DeviceCodeStatus};

/// Storage trait for device authorization records.
#[async_trait]
pub trait DeviceCodeStorage: Send + Sync {
    /// Stores a new device authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, record: &DeviceCodeRecord) -> AuthResult<()>;

    /// Finds a record by the device code hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_device_code_hash(
        &self,
        device_code_hash: &str,
    ) -> AuthResult<Option<DeviceCodeRecord>>;

    /// Finds a record by the user code.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_user_code(&self, user_code: &str) -> AuthResult<Option<DeviceCodeRecord>>;

    /// Atomically transitions a pending record to a terminal status,
    /// stamping the approving user when one is given.
    ///
    /// The check-and-transition must be a single atomic step: only a record
    /// still in `pending` may move, so two decisions for the same user code
    /// see exactly one winner. In SQL this is typically:
    ///
    /// ```sql
    /// UPDATE device_codes
    /// SET status = $2, user_id = $3
    /// WHERE user_code = $1 AND status = 'pending'
    /// RETURNING *;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the record is not found or is no longer
    /// pending.
    async fn transition(
        &self,
        user_code: &str,
        status: DeviceCodeStatus,
        user_id: Option<&str>,
    ) -> AuthResult<DeviceCodeRecord>;

    /// Records when the device last polled the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not found or the operation fails.
    async fn mark_polled(&self, device_code_hash: &str, at: OffsetDateTime) -> AuthResult<()>;

    /// Deletes expired device authorizations.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
