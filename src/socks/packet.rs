//! SOCKS5 wire codec
//!
//! Slice-based decoders for the two packets a client sends and the
//! (de)serializer for the reply packet. The connection orchestrator reads
//! each packet with a single bounded read and hands the bytes here; anything
//! truncated or inconsistent is a decode error, never a panic.

use super::consts::*;
use super::types::{Command, TargetAddr};
use crate::error::{ReplyCode, Socks5Error};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Version/method-selection message sent by the client first.
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
///
/// Borrows the read buffer; it only lives long enough to negotiate.
#[derive(Debug)]
pub struct Initiation<'a> {
    /// Protocol version byte (0x05 once decoded)
    pub version: u8,
    /// Advertised auth methods
    pub methods: &'a [u8],
}

impl<'a> Initiation<'a> {
    /// Decode an initiation packet from one client read.
    ///
    /// The buffer must hold the two header bytes plus at least as many
    /// method bytes as NMETHODS announces; everything after the header is
    /// treated as the advertised method set.
    pub fn decode(buf: &'a [u8]) -> Result<Self, Socks5Error> {
        if buf.len() < 3 {
            return Err(Socks5Error::MalformedPacket("initiation"));
        }
        if buf[0] != SOCKS5_VERSION {
            return Err(Socks5Error::UnsupportedVersion(buf[0]));
        }
        let count = buf[1] as usize;
        if buf.len() < 2 + count {
            return Err(Socks5Error::MalformedPacket("initiation"));
        }
        Ok(Initiation {
            version: buf[0],
            methods: &buf[2..],
        })
    }
}

/// Connection request sent after method selection.
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Requested command
    pub command: Command,
    /// Destination the client wants reached
    pub target: TargetAddr,
}

impl Request {
    /// Decode a request packet from one client read.
    pub fn decode(buf: &[u8]) -> Result<Self, Socks5Error> {
        if buf.len() < 4 {
            return Err(Socks5Error::MalformedPacket("request"));
        }
        if buf[0] != SOCKS5_VERSION {
            return Err(Socks5Error::UnsupportedVersion(buf[0]));
        }
        let command =
            Command::from_byte(buf[1]).ok_or(Socks5Error::UnknownCommand(buf[1]))?;
        // buf[2] is the reserved byte; ignored on decode.
        let target = decode_addr(buf[3], &buf[4..], "request")?;
        Ok(Request { command, target })
    }
}

/// Reply packet sent to the client after the dial attempt.
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Outcome code
    pub code: ReplyCode,
    /// Address the outbound socket is bound to (`0.0.0.0:0` on failure)
    pub bind: TargetAddr,
}

impl Reply {
    /// Success reply carrying the bound address of the dialed connection
    pub fn success(bind: TargetAddr) -> Self {
        Reply {
            code: ReplyCode::Succeeded,
            bind,
        }
    }

    /// Failure reply; the bind address is the conventional `0.0.0.0:0`
    pub fn failure(code: ReplyCode) -> Self {
        Reply {
            code,
            bind: TargetAddr::default(),
        }
    }

    /// Serialize to wire bytes. Pure: cannot fail.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(22);
        buf.extend_from_slice(&[SOCKS5_VERSION, self.code.into(), RESERVED]);
        self.bind.encode_into(&mut buf);
        buf
    }

    /// Decode a reply packet; inverse of [`encode`](Reply::encode).
    pub fn decode(buf: &[u8]) -> Result<Self, Socks5Error> {
        if buf.len() < 4 {
            return Err(Socks5Error::MalformedPacket("reply"));
        }
        if buf[0] != SOCKS5_VERSION {
            return Err(Socks5Error::UnsupportedVersion(buf[0]));
        }
        let code = ReplyCode::try_from(buf[1])?;
        let bind = decode_addr(buf[3], &buf[4..], "reply")?;
        Ok(Reply { code, bind })
    }
}

/// Decode the ATYP-dependent ADDR/PORT tail shared by requests and replies.
fn decode_addr(atyp: u8, rest: &[u8], packet: &'static str) -> Result<TargetAddr, Socks5Error> {
    match atyp {
        ATYP_IPV4 => {
            if rest.len() < 6 {
                return Err(Socks5Error::MalformedPacket(packet));
            }
            let ip = Ipv4Addr::new(rest[0], rest[1], rest[2], rest[3]);
            let port = u16::from_be_bytes([rest[4], rest[5]]);
            Ok(TargetAddr::ipv4(ip, port))
        }
        ATYP_DOMAIN => {
            let len = *rest.first().ok_or(Socks5Error::MalformedPacket(packet))? as usize;
            if len == 0 {
                return Err(Socks5Error::InvalidDomain);
            }
            if rest.len() < 1 + len + 2 {
                return Err(Socks5Error::MalformedPacket(packet));
            }
            let domain = std::str::from_utf8(&rest[1..1 + len])
                .map_err(|_| Socks5Error::InvalidDomain)?
                .to_string();
            let port = u16::from_be_bytes([rest[1 + len], rest[2 + len]]);
            Ok(TargetAddr::domain(domain, port))
        }
        ATYP_IPV6 => {
            if rest.len() < 18 {
                return Err(Socks5Error::MalformedPacket(packet));
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&rest[..16]);
            let port = u16::from_be_bytes([rest[16], rest[17]]);
            Ok(TargetAddr::ipv6(Ipv6Addr::from(octets), port))
        }
        other => Err(Socks5Error::UnknownAddrType(other)),
    }
}
