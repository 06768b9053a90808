#![allow(missing_docs)]
use std::fmt;
use crate::ErrorCode;
use crate::value::NonTableValue;

pub type FeatureCode = u8;

pub trait Command {
    type Ok: CommandResult;
    const MIN_LEN: usize;
    const MAX_LEN: usize;
    const DELAY_RESPONSE_MS: u64;
    const DELAY_COMMAND_MS: u64;

    fn len(&self) -> usize;

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode>;
}

pub trait CommandResult: Sized {
    const MAX_LEN: usize;
    fn decode(data: &[u8]) -> Result<Self, ErrorCode>;
}

#[derive(Copy, Clone, Debug)]
pub struct GetVcpFeature {
    pub code: FeatureCode,
}

impl GetVcpFeature {
    pub fn new(code: FeatureCode) -> Self {
        GetVcpFeature {
            code: code,
        }
    }
}

impl Command for GetVcpFeature {
    type Ok = VcpReply;
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 2;
    const DELAY_RESPONSE_MS: u64 = 40;
    const DELAY_COMMAND_MS: u64 = 50;

    fn len(&self) -> usize { 2 }

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        assert!(data.len() >= 2);
        data[0] = 0x01;
        data[1] = self.code;

        Ok(2)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct SetVcpFeature {
    pub code: FeatureCode,
    pub value: u16,
}

impl SetVcpFeature {
    pub fn new(code: FeatureCode, value: u16) -> Self {
        SetVcpFeature {
            code: code,
            value: value,
        }
    }

    pub fn from_bytes(code: FeatureCode, hi: u8, lo: u8) -> Self {
        SetVcpFeature::new(code, ((hi as u16) << 8) | lo as u16)
    }
}

impl Command for SetVcpFeature {
    type Ok = ();
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 4;
    const DELAY_RESPONSE_MS: u64 = 0;
    const DELAY_COMMAND_MS: u64 = 50;

    fn len(&self) -> usize { 4 }

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        assert!(data.len() >= 4);

        data[0] = 0x03;
        data[1] = self.code;
        data[2] = (self.value >> 8) as _;
        data[3] = self.value as _;

        Ok(4)
    }
}

/// Reply to `GetVcpFeature`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VcpReply {
    pub code: FeatureCode,
    /// 0 for a set parameter, 1 for a momentary one.
    pub kind: u8,
    pub value: NonTableValue,
}

impl CommandResult for VcpReply {
    const MAX_LEN: usize = 8;

    fn decode(data: &[u8]) -> Result<Self, ErrorCode> {
        if data.len() != 8 {
            return Err(ErrorCode::InvalidLength)
        }

        if data[0] != 0x02 {
            return Err(ErrorCode::InvalidOpcode)
        }

        match data[1] {
            0x00 => (), // NoError
            0x01 => return Err(ErrorCode::Unsupported(data[2])),
            rc => return Err(ErrorCode::Invalid(format!("Unrecognized VCP error code 0x{:02x}", rc))),
        }

        Ok(VcpReply {
            code: data[2],
            kind: data[3],
            value: NonTableValue {
                mh: data[4],
                ml: data[5],
                sh: data[6],
                sl: data[7],
            },
        })
    }
}

#[derive(Copy, Clone, Debug)]
pub struct SaveCurrentSettings;

impl Command for SaveCurrentSettings {
    type Ok = ();
    const MIN_LEN: usize = 1;
    const MAX_LEN: usize = 1;
    const DELAY_RESPONSE_MS: u64 = 0;
    const DELAY_COMMAND_MS: u64 = 200;

    fn len(&self) -> usize { 1 }

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        assert!(data.len() >= 1);
        data[0] = 0x0c;

        Ok(1)
    }
}

/// Largest fragment a single table write or read carries.
pub const TABLE_FRAGMENT_LEN: usize = 32;

/// Largest value a fragmented read or table write may carry.
///
/// A display still sending fragments past this is treated as broken.
pub const MAX_MULTI_PART_LEN: usize = 0x2000;

#[derive(Copy, Clone, Debug)]
pub struct TableWrite<'a> {
    pub code: FeatureCode,
    pub offset: u16,
    pub data: &'a [u8],
}

impl<'a> TableWrite<'a> {
    pub fn new(code: FeatureCode, offset: u16, data: &'a [u8]) -> Self {
        TableWrite {
            code: code,
            offset: offset,
            data: data,
        }
    }
}

impl<'a> Command for TableWrite<'a> {
    type Ok = ();
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 4 + TABLE_FRAGMENT_LEN;
    const DELAY_RESPONSE_MS: u64 = 0;
    const DELAY_COMMAND_MS: u64 = 50;

    fn len(&self) -> usize { 4 + self.data.len() }

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        if self.data.len() > TABLE_FRAGMENT_LEN {
            return Err(ErrorCode::InvalidLength)
        }
        assert!(data.len() >= 4 + self.data.len());

        data[0] = 0xe7;
        data[1] = self.code;
        data[2] = (self.offset >> 8) as _;
        data[3] = self.offset as _;
        data[4..4 + self.data.len()].copy_from_slice(self.data);

        Ok(4 + self.data.len())
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TableRead {
    pub code: FeatureCode,
    pub offset: u16,
}

impl TableRead {
    pub fn new(code: FeatureCode, offset: u16) -> Self {
        TableRead {
            code: code,
            offset: offset,
        }
    }
}

impl Command for TableRead {
    type Ok = TableResponse;
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 4;
    const DELAY_RESPONSE_MS: u64 = 40;
    const DELAY_COMMAND_MS: u64 = 50;

    fn len(&self) -> usize { 4 }

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        assert!(data.len() >= 4);

        data[0] = 0xe2;
        data[1] = self.code;
        data[2] = (self.offset >> 8) as _;
        data[3] = self.offset as _;

        Ok(4)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct CapabilitiesRequest {
    pub offset: u16,
}

impl CapabilitiesRequest {
    pub fn new(offset: u16) -> Self {
        CapabilitiesRequest {
            offset: offset,
        }
    }
}

impl Command for CapabilitiesRequest {
    type Ok = CapabilitiesReply;
    const MIN_LEN: usize = 3;
    const MAX_LEN: usize = 3;
    const DELAY_RESPONSE_MS: u64 = 40;
    const DELAY_COMMAND_MS: u64 = 50;

    fn len(&self) -> usize { 3 }

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        assert!(data.len() >= 3);

        data[0] = 0xf3;
        data[1] = (self.offset >> 8) as _;
        data[2] = self.offset as _;

        Ok(3)
    }
}

/// One fragment of a multi-part read.
///
/// An empty fragment terminates the sequence.
pub trait Fragment {
    fn offset(&self) -> u16;
    fn bytes(&self) -> &[u8];
}

#[derive(Copy, Clone, Default)]
pub struct TableResponse {
    pub offset: u16,
    data: [u8; TABLE_FRAGMENT_LEN],
    len: u8,
}

impl TableResponse {
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

impl Fragment for TableResponse {
    fn offset(&self) -> u16 { self.offset }
    fn bytes(&self) -> &[u8] { TableResponse::bytes(self) }
}

impl fmt::Debug for TableResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TableResponse")
            .field("offset", &self.offset)
            .field("bytes", &self.bytes())
            .finish()
    }
}

impl CommandResult for TableResponse {
    const MAX_LEN: usize = 3 + TABLE_FRAGMENT_LEN;

    fn decode(data: &[u8]) -> Result<Self, ErrorCode> {
        if data.len() < 3 || data.len() > Self::MAX_LEN {
            return Err(ErrorCode::InvalidLength)
        }

        if data[0] != 0xe4 {
            return Err(ErrorCode::InvalidOpcode)
        }

        let mut table = TableResponse::default();
        table.offset = ((data[1] as u16) << 8) | data[2] as u16;
        let data = &data[3..];
        table.len = data.len() as u8;
        table.data[..data.len()].copy_from_slice(data);
        Ok(table)
    }
}

#[derive(Clone, Debug)]
pub struct CapabilitiesReply {
    pub offset: u16,
    pub data: Box<[u8]>,
}

impl Fragment for CapabilitiesReply {
    fn offset(&self) -> u16 { self.offset }
    fn bytes(&self) -> &[u8] { &self.data }
}

impl CommandResult for CapabilitiesReply {
    const MAX_LEN: usize = 35;

    fn decode(data: &[u8]) -> Result<Self, ErrorCode> {
        if data.len() < 3 || data.len() > 35  {
            return Err(ErrorCode::InvalidLength)
        }

        if data[0] != 0xe3 {
            return Err(ErrorCode::InvalidOpcode)
        }

        Ok(CapabilitiesReply {
            offset: ((data[1] as u16) << 8) | data[2] as u16,
            data: data[3..].to_owned().into_boxed_slice(),
        })
    }
}

impl CommandResult for () {
    const MAX_LEN: usize = 0;

    fn decode(_data: &[u8]) -> Result<Self, ErrorCode> {
        Ok(())
    }
}

impl<'a, C: Command> Command for &'a C {
    type Ok = C::Ok;
    const MIN_LEN: usize = C::MIN_LEN;
    const MAX_LEN: usize = C::MAX_LEN;
    const DELAY_RESPONSE_MS: u64 = C::DELAY_RESPONSE_MS;
    const DELAY_COMMAND_MS: u64 = C::DELAY_COMMAND_MS;

    fn len(&self) -> usize { (*self).len() }

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        (*self).encode(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcp_reply() {
        let reply = VcpReply::decode(&[0x02, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x32]).unwrap();
        assert_eq!(reply.code, 0x10);
        assert_eq!(reply.value.maximum(), 100);
        assert_eq!(reply.value.value(), 50);

        assert_eq!(VcpReply::decode(&[0x02, 0x01, 0x10, 0, 0, 0, 0, 0]), Err(ErrorCode::Unsupported(0x10)));
        assert_eq!(VcpReply::decode(&[0x03, 0x00, 0x10, 0, 0, 0, 0, 0]), Err(ErrorCode::InvalidOpcode));
        assert_eq!(VcpReply::decode(&[0x02, 0x00, 0x10]), Err(ErrorCode::InvalidLength));
    }

    #[test]
    fn empty_table_fragment_terminates() {
        let table = TableResponse::decode(&[0xe4, 0x00, 0x20]).unwrap();
        assert_eq!(table.offset, 0x20);
        assert!(table.bytes().is_empty());
    }

    #[test]
    fn table_write_fragment_limit() {
        let mut data = [0u8; 64];
        let big = [0u8; TABLE_FRAGMENT_LEN + 1];
        assert_eq!(TableWrite::new(0x73, 0, &big).encode(&mut data), Err(ErrorCode::InvalidLength));
        assert_eq!(TableWrite::new(0x73, 0x0102, &[9]).encode(&mut data), Ok(5));
        assert_eq!(&data[..5], &[0xe7, 0x73, 0x01, 0x02, 9]);
    }
}
