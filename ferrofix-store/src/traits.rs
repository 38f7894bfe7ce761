/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Message store trait definition.
//!
//! The store is the source of truth for a session's sequence numbers. It also
//! keeps sent messages so that resend requests can be answered.

use bytes::Bytes;
use ferrofix_core::error::StoreError;
use std::time::SystemTime;

/// Abstract interface for FIX message storage.
///
/// Implementations are internally synchronized; every method takes `&self`.
pub trait MessageStore: Send + Sync {
    /// Stores an outgoing message for potential resend.
    ///
    /// # Arguments
    /// * `seq_num` - The message sequence number
    /// * `message` - The raw message bytes
    ///
    /// # Returns
    /// `true` when the message was stored.
    ///
    /// # Errors
    /// Returns `StoreError` if the message cannot be stored.
    fn set(&self, seq_num: u64, message: &[u8]) -> Result<bool, StoreError>;

    /// Retrieves stored messages for a resend request.
    ///
    /// Sequence numbers without a stored message are skipped.
    ///
    /// # Arguments
    /// * `begin` - Begin sequence number (inclusive)
    /// * `end` - End sequence number (inclusive)
    ///
    /// # Errors
    /// Returns `StoreError` if messages cannot be retrieved.
    fn get(&self, begin: u64, end: u64) -> Result<Vec<Bytes>, StoreError>;

    /// Returns the next sender sequence number.
    fn next_sender_seq_num(&self) -> u64;

    /// Returns the next expected target sequence number.
    fn next_target_seq_num(&self) -> u64;

    /// Sets the next sender sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` if the value cannot be persisted.
    fn set_next_sender_seq_num(&self, seq: u64) -> Result<(), StoreError>;

    /// Sets the next expected target sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` if the value cannot be persisted.
    fn set_next_target_seq_num(&self, seq: u64) -> Result<(), StoreError>;

    /// Increments the next sender sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` if the value cannot be persisted.
    fn incr_next_sender_seq_num(&self) -> Result<(), StoreError> {
        self.set_next_sender_seq_num(self.next_sender_seq_num() + 1)
    }

    /// Increments the next expected target sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` if the value cannot be persisted.
    fn incr_next_target_seq_num(&self) -> Result<(), StoreError> {
        self.set_next_target_seq_num(self.next_target_seq_num() + 1)
    }

    /// Clears all messages and resets both sequence numbers to 1.
    ///
    /// # Errors
    /// Returns `StoreError` if the reset fails.
    fn reset(&self) -> Result<(), StoreError>;

    /// Returns the creation time of the store/session.
    fn creation_time(&self) -> SystemTime;

    /// Reloads the store from persistent storage.
    ///
    /// # Errors
    /// Returns `StoreError` if the refresh fails.
    fn refresh(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
