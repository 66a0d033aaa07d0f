//! Protocol module containing message types and the text-frame codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_command, decode_response, encode_command, encode_response, ProtocolError};
pub use messages::*;
