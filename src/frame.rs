//! DDC/CI packet framing.
//!
//! Requests go out as `[0x51, 0x80 | len, payload.., checksum]` with the
//! checksum seeded by the destination address. Replies come back as
//! `[source, 0x80 | len, payload.., checksum]`.

use std::iter;
use crate::{ErrorCode, I2C_ADDRESS_DDC_CI, SUB_ADDRESS_DDC_CI};

/// Longest payload a single packet carries.
pub const MAX_PAYLOAD_LEN: usize = 36;

/// Longest framed packet, payload plus header and checksum.
pub const MAX_PACKET_LEN: usize = MAX_PAYLOAD_LEN + 3;

/// Address byte of the display when writing.
pub const DISPLAY_WRITE_ADDRESS: u8 = (I2C_ADDRESS_DDC_CI as u8) << 1;

/// XOR checksum.
pub fn checksum<II: IntoIterator<Item=u8>>(iter: II) -> u8 {
    iter.into_iter().fold(0u8, |sum, v| sum ^ v)
}

/// Frames a host-to-display payload into `packet`.
pub fn encode_request<'a>(data: &[u8], packet: &'a mut [u8]) -> Result<&'a [u8], ErrorCode> {
    if data.len() > MAX_PAYLOAD_LEN || packet.len() < data.len() + 3 {
        return Err(ErrorCode::InvalidLength)
    }

    packet[0] = SUB_ADDRESS_DDC_CI;
    packet[1] = 0x80 | data.len() as u8;
    packet[2..2 + data.len()].copy_from_slice(data);
    packet[2 + data.len()] = checksum(
        iter::once(DISPLAY_WRITE_ADDRESS)
        .chain(packet[..2 + data.len()].iter().cloned())
    );

    Ok(&packet[..3 + data.len()])
}

/// Validates a display-to-host packet as read off the bus.
///
/// Returns the payload length. The payload lives at `packet[2..2 + len]`.
pub fn decode_reply(packet: &[u8]) -> Result<usize, ErrorCode> {
    if !packet.is_empty() && packet.iter().all(|&b| b == 0) {
        return Err(ErrorCode::AllZero)
    }

    if packet.len() < 2 {
        return Err(ErrorCode::InvalidLength)
    }

    let len = (packet[1] & 0x7f) as usize;

    if packet[1] & 0x80 == 0 {
        return Err(ErrorCode::Invalid("Expected DDC/CI length bit".into()))
    }

    if packet.len() < len + 3 {
        return Err(ErrorCode::InvalidLength)
    }

    let checksum = checksum(
        iter::once(DISPLAY_WRITE_ADDRESS | 1)
        .chain(iter::once(SUB_ADDRESS_DDC_CI))
        .chain(packet[1..2 + len].iter().cloned())
    );

    if packet[2 + len] != checksum {
        return Err(ErrorCode::InvalidChecksum)
    }

    if len == 0 {
        return Err(ErrorCode::NullResponse)
    }

    Ok(len)
}

/// Display side of `encode_request`: validates a request packet and returns its payload.
///
/// Used by emulated displays and vendor adapters that hand back raw packets.
pub fn decode_request(packet: &[u8]) -> Result<&[u8], ErrorCode> {
    if packet.len() < 3 || packet[0] != SUB_ADDRESS_DDC_CI || packet[1] & 0x80 == 0 {
        return Err(ErrorCode::InvalidData)
    }

    let len = (packet[1] & 0x7f) as usize;
    if packet.len() < len + 3 {
        return Err(ErrorCode::InvalidLength)
    }

    let expected = checksum(
        iter::once(DISPLAY_WRITE_ADDRESS)
        .chain(packet[..2 + len].iter().cloned())
    );
    if packet[2 + len] != expected {
        return Err(ErrorCode::InvalidChecksum)
    }

    Ok(&packet[2..2 + len])
}

/// Display side of `decode_reply`: frames a reply payload into `packet`.
pub fn encode_reply<'a>(data: &[u8], packet: &'a mut [u8]) -> Result<&'a [u8], ErrorCode> {
    if data.len() > MAX_PAYLOAD_LEN || packet.len() < data.len() + 3 {
        return Err(ErrorCode::InvalidLength)
    }

    packet[0] = DISPLAY_WRITE_ADDRESS;
    packet[1] = 0x80 | data.len() as u8;
    packet[2..2 + data.len()].copy_from_slice(data);
    packet[2 + data.len()] = checksum(
        iter::once(DISPLAY_WRITE_ADDRESS | 1)
        .chain(iter::once(SUB_ADDRESS_DDC_CI))
        .chain(packet[1..2 + data.len()].iter().cloned())
    );

    Ok(&packet[..3 + data.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_vcp_request() {
        let mut packet = [0u8; MAX_PACKET_LEN];
        let packet = encode_request(&[0x01, 0x10], &mut packet).unwrap();
        assert_eq!(packet, &[0x51, 0x82, 0x01, 0x10, 0xac]);
        assert_eq!(decode_request(packet).unwrap(), &[0x01, 0x10]);
    }

    #[test]
    fn null_message() {
        // the canonical null message
        assert_eq!(decode_reply(&[0x6e, 0x80, 0xbe]), Err(ErrorCode::NullResponse));
    }

    #[test]
    fn reply() {
        let payload = [0x02, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x32];
        let mut packet = [0u8; MAX_PACKET_LEN];
        let len = encode_reply(&payload, &mut packet).unwrap().len();
        assert_eq!(decode_reply(&packet[..len]), Ok(payload.len()));
        assert_eq!(&packet[2..2 + payload.len()], &payload);

        packet[4] ^= 0x01;
        assert_eq!(decode_reply(&packet[..len]), Err(ErrorCode::InvalidChecksum));
    }

    #[test]
    fn malformed_replies() {
        assert_eq!(decode_reply(&[0; 11]), Err(ErrorCode::AllZero));
        assert_eq!(decode_reply(&[0x6e]), Err(ErrorCode::InvalidLength));
        assert_eq!(decode_reply(&[0x6e, 0x88, 0x02]), Err(ErrorCode::InvalidLength));
        match decode_reply(&[0x6e, 0x08, 0x02, 0x00]) {
            Err(ErrorCode::Invalid(..)) => (),
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn oversized_payload() {
        let mut packet = [0u8; 64];
        assert_eq!(encode_request(&[0u8; MAX_PAYLOAD_LEN + 1], &mut packet), Err(ErrorCode::InvalidLength));
    }
}
