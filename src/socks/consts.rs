//! SOCKS5 protocol constants (RFC 1928)

/// SOCKS5 protocol version byte
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const AUTH_METHOD_NONE: u8 = 0x00;
/// No acceptable methods
pub const AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Commands
/// TCP CONNECT command
pub const CMD_CONNECT: u8 = 0x01;
/// TCP BIND command (never served)
pub const CMD_BIND: u8 = 0x02;
/// UDP ASSOCIATE command (never served)
pub const CMD_UDP_ASSOCIATE: u8 = 0x03;

// Address types
/// IPv4 address, 4 octets
pub const ATYP_IPV4: u8 = 0x01;
/// Domain name, 1 length byte plus that many bytes
pub const ATYP_DOMAIN: u8 = 0x03;
/// IPv6 address, 16 octets
pub const ATYP_IPV6: u8 = 0x04;

/// Reserved byte value (always 0x00)
pub const RESERVED: u8 = 0x00;

// Packet size bounds
/// Largest possible initiation packet: version + method count + 255 methods
pub const MAX_INIT_PACKET_SIZE: usize = 257;
/// Largest possible request packet: 4-byte header + length-prefixed
/// 255-byte domain + 2-byte port
pub const MAX_REQUEST_PACKET_SIZE: usize = 262;
