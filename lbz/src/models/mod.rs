//! Typed records for the service's response shapes.
//!
//! Every record here decodes through the field-table driver in
//! [`crate::wire::object`], so each one carries an `extra` map holding any
//! properties the server sent that this client does not yet know about.

pub mod listen;
pub mod misc;
pub mod playlist;

pub use listen::{Listen, MbidMapping, TrackMetadata};
pub use misc::{ErrorBody, ListenCount, TokenValidation, UserListens};
pub use playlist::{Playlist, PlaylistTrack};
