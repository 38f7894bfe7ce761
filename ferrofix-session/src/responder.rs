/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Transport handle the session writes through.

/// Outbound side of a connection, supplied by the transport layer.
pub trait Responder: Send {
    /// Writes one encoded message.
    ///
    /// # Returns
    /// `false` if the bytes could not be handed to the transport.
    fn send(&self, data: &[u8]) -> bool;

    /// Closes the connection.
    fn disconnect(&self);

    /// Returns the peer address, if known.
    fn remote_address(&self) -> Option<String> {
        None
    }
}
