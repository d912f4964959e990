//! Auth method negotiation
//!
//! This server is deliberately authentication-less: the only method it ever
//! selects is NO AUTHENTICATION REQUIRED (0x00). Clients that do not offer
//! it are turned away with the NO ACCEPTABLE METHODS byte.

use super::consts::{AUTH_METHOD_NONE, SOCKS5_VERSION};
use super::packet::Initiation;
use crate::error::Socks5Error;

/// Pick an auth method from the client's advertised set.
///
/// Returns the selected method byte on success so the caller can echo it in
/// the method-selection message. A client that never offered 0x00 gets
/// [`Socks5Error::NoAcceptableMethod`]; the caller answers with 0xFF and
/// closes.
pub fn negotiate(init: &Initiation<'_>) -> Result<u8, Socks5Error> {
    if init.methods.contains(&AUTH_METHOD_NONE) {
        Ok(AUTH_METHOD_NONE)
    } else {
        Err(Socks5Error::NoAcceptableMethod)
    }
}

/// Method-selection message for the chosen method.
pub fn selection_message(method: u8) -> [u8; 2] {
    [SOCKS5_VERSION, method]
}
