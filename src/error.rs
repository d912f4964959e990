//! Error types for sockgate
//!
//! The protocol engine reports everything through [`Socks5Error`]; the
//! connection orchestrator maps each variant to the wire-level reply it owes
//! the client before tearing the connection down.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while driving a SOCKS5 connection.
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Packet shorter than its layout requires, or internally inconsistent
    #[error("malformed {0} packet")]
    MalformedPacket(&'static str),

    /// Version byte was not 0x05
    #[error("unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Command byte outside the RFC 1928 set
    #[error("unknown command: {0:#04x}")]
    UnknownCommand(u8),

    /// Address-type byte outside the RFC 1928 set
    #[error("unknown address type: {0:#04x}")]
    UnknownAddrType(u8),

    /// Domain name was empty or not valid UTF-8
    #[error("invalid domain name in request")]
    InvalidDomain,

    /// Client did not offer the no-auth method
    #[error("no acceptable auth methods")]
    NoAcceptableMethod,

    /// Well-formed command this server refuses to serve (BIND, UDP ASSOCIATE)
    #[error("unsupported command: {0:#04x}")]
    CommandNotSupported(u8),

    /// Outbound dial failed
    #[error("dial failed: {0}")]
    Dial(#[source] io::Error),

    /// Outbound dial did not complete within the deadline
    #[error("dial timed out after {0:?}")]
    DialTimeout(Duration),

    /// Read or write failure on either stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Socks5Error {
    /// Reply code owed to the client when this error aborts the request
    /// phase. Only [`CommandNotSupported`](Socks5Error::CommandNotSupported)
    /// is distinguished on the wire; every other request-phase failure is a
    /// general failure per RFC 1928.
    pub fn reply_code(&self) -> ReplyCode {
        match self {
            Socks5Error::CommandNotSupported(_) => ReplyCode::CommandNotSupported,
            _ => ReplyCode::GeneralFailure,
        }
    }
}

/// Reply codes for the SOCKS5 reply packet (RFC 1928 §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Request succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddrTypeNotSupported = 0x08,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for ReplyCode {
    type Error = Socks5Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ReplyCode::Succeeded),
            0x01 => Ok(ReplyCode::GeneralFailure),
            0x02 => Ok(ReplyCode::ConnectionNotAllowed),
            0x03 => Ok(ReplyCode::NetworkUnreachable),
            0x04 => Ok(ReplyCode::HostUnreachable),
            0x05 => Ok(ReplyCode::ConnectionRefused),
            0x06 => Ok(ReplyCode::TtlExpired),
            0x07 => Ok(ReplyCode::CommandNotSupported),
            0x08 => Ok(ReplyCode::AddrTypeNotSupported),
            _ => Err(Socks5Error::MalformedPacket("reply")),
        }
    }
}
