#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use ddc_control::transport::{Backend, IoMode, IoPath, Location, Transport};
use ddc_control::{frame, Config, Error, Registry, Session};

/// An emulated DDC/CI display.
#[derive(Default)]
pub struct Monitor {
    pub edid: Vec<u8>,
    /// Feature code to `(maximum, value)`.
    pub vcp: BTreeMap<u8, (u16, u16)>,
    pub tables: BTreeMap<u8, Vec<u8>>,
    pub caps: Vec<u8>,
    /// Corrupt the checksum of this many upcoming replies.
    pub corrupt: usize,
    /// Fail every exchange at the bus level.
    pub dead: bool,
    /// Accept writes without applying them.
    pub ignore_writes: bool,
    /// Every request payload received.
    pub requests: Vec<Vec<u8>>,
    pub saves: usize,
    /// Answer every capabilities fragment with more data, never ending.
    pub endless_caps: bool,
    /// Transports currently open.
    pub transports: usize,
    /// Most transports ever open at once.
    pub peak_transports: usize,
}

pub type SharedMonitor = Arc<Mutex<Monitor>>;

impl Monitor {
    pub fn new(edid: Vec<u8>) -> Self {
        let mut vcp = BTreeMap::new();
        vcp.insert(0x10, (100, 50));
        vcp.insert(0x12, (100, 75));
        vcp.insert(0x14, (0x0b, 0x05));
        vcp.insert(0x60, (0x12, 0x0f));
        vcp.insert(0xdf, (0, 0x0201));

        Monitor {
            edid,
            vcp,
            caps: b"(prot(monitor)type(LCD)model(FAKE1)cmds(01 02 03 0C E3 F3)vcp(02 10 12 14(05 08 0B) 60(0F 11 12) DF)mccs_ver(2.1))".to_vec(),
            ..Default::default()
        }
    }

    pub fn shared(self) -> SharedMonitor {
        Arc::new(Mutex::new(self))
    }

    fn reply(&mut self, request: &[u8]) -> Option<Vec<u8>> {
        match request {
            &[0x01, code] => Some(match self.vcp.get(&code) {
                Some(&(max, value)) => vec![0x02, 0x00, code, 0x00, (max >> 8) as u8, max as u8, (value >> 8) as u8, value as u8],
                None => vec![0x02, 0x01, code, 0x00, 0x00, 0x00, 0x00, 0x00],
            }),
            &[0x03, code, hi, lo] => {
                if !self.ignore_writes {
                    if let Some(entry) = self.vcp.get_mut(&code) {
                        entry.1 = ((hi as u16) << 8) | lo as u16;
                    }
                }
                None
            },
            &[0x0c] => {
                self.saves += 1;
                None
            },
            &[0xf3, hi, lo] => {
                let mut reply = vec![0xe3, hi, lo];
                if self.endless_caps {
                    reply.extend_from_slice(&[b' '; 32]);
                    return Some(reply)
                }
                let offset = ((hi as usize) << 8) | lo as usize;
                let start = offset.min(self.caps.len());
                let end = (start + 32).min(self.caps.len());
                reply.extend_from_slice(&self.caps[start..end]);
                Some(reply)
            },
            &[0xe2, code, hi, lo] => self.tables.get(&code).map(|table| {
                let offset = ((hi as usize) << 8) | lo as usize;
                let start = offset.min(table.len());
                let end = (start + 32).min(table.len());
                let mut reply = vec![0xe4, hi, lo];
                reply.extend_from_slice(&table[start..end]);
                reply
            }),
            _ if request.len() >= 4 && request[0] == 0xe7 => {
                let offset = ((request[2] as usize) << 8) | request[3] as usize;
                let table = self.tables.entry(request[1]).or_insert_with(Vec::new);
                if offset == 0 {
                    table.clear();
                }
                table.resize(offset, 0);
                table.extend_from_slice(&request[4..]);
                None
            },
            _ => None,
        }
    }
}

/// Talks to a `Monitor` through real DDC/CI framing.
pub struct FakeTransport {
    pub busno: u32,
    pub monitor: SharedMonitor,
}

impl Transport for FakeTransport {
    fn io_path(&self) -> IoPath {
        IoPath::I2c { busno: self.busno }
    }

    fn execute_raw<'a>(&mut self, data: &[u8], out: &'a mut [u8], _response_delay: Duration) -> Result<&'a mut [u8], Error> {
        let mut monitor = self.monitor.lock();
        if monitor.dead {
            return Err(Error::Io(io::Error::new(io::ErrorKind::Other, "no acknowledge")))
        }

        let mut packet = [0u8; frame::MAX_PACKET_LEN];
        let request = frame::decode_request(frame::encode_request(data, &mut packet)?)?.to_vec();
        monitor.requests.push(request.clone());
        let reply = monitor.reply(&request).unwrap_or_default();
        if out.is_empty() {
            return Ok(out)
        }

        let mut packet = [0u8; frame::MAX_PACKET_LEN];
        let framed = frame::encode_reply(&reply, &mut packet)?;
        let len = framed.len().min(out.len());
        out[..len].copy_from_slice(&framed[..len]);
        if monitor.corrupt > 0 {
            monitor.corrupt -= 1;
            out[len - 1] ^= 0xff;
        }

        let payload = frame::decode_reply(&out[..len])?;
        Ok(&mut out[2..2 + payload])
    }

    fn read_edid(&mut self) -> Result<Vec<u8>, Error> {
        Ok(self.monitor.lock().edid.clone())
    }
}

impl Drop for FakeTransport {
    fn drop(&mut self) {
        self.monitor.lock().transports -= 1;
    }
}

/// Serves a fixed set of emulated monitors on I2C bus numbers.
pub struct FakeBackend {
    pub monitors: Vec<(u32, SharedMonitor)>,
}

impl Backend for FakeBackend {
    fn io_mode(&self) -> IoMode {
        IoMode::I2c
    }

    fn scan(&self) -> Result<Vec<Location>, Error> {
        Ok(self.monitors.iter()
            .map(|&(busno, ref monitor)| {
                let edid = monitor.lock().edid.clone();
                Location::new(IoPath::I2c { busno }, Some(edid).filter(|e| !e.is_empty()))
            })
            .collect())
    }

    fn open(&self, path: &IoPath) -> Result<Box<dyn Transport>, Error> {
        match *path {
            IoPath::I2c { busno } => self.monitors.iter()
                .find(|&&(b, _)| b == busno)
                .map(|&(busno, ref monitor)| {
                    {
                        let mut m = monitor.lock();
                        m.transports += 1;
                        m.peak_transports = m.peak_transports.max(m.transports);
                    }
                    Box::new(FakeTransport { busno, monitor: monitor.clone() }) as Box<dyn Transport>
                })
                .ok_or_else(|| Error::Io(io::ErrorKind::NotFound.into())),
            _ => Err(Error::Io(io::ErrorKind::NotFound.into())),
        }
    }
}

/// Builds a valid EDID base block with name and serial descriptors.
pub fn make_edid(mfg_id: &str, model: &str, serial: &str, product_code: u16) -> Vec<u8> {
    let mut edid = vec![0u8; 128];
    edid[..8].copy_from_slice(&[0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00]);

    let letters: Vec<u16> = mfg_id.bytes().map(|c| (c - b'@') as u16).collect();
    let vendor = (letters[0] << 10) | (letters[1] << 5) | letters[2];
    edid[8] = (vendor >> 8) as u8;
    edid[9] = vendor as u8;
    edid[10] = product_code as u8;
    edid[11] = (product_code >> 8) as u8;
    edid[12..16].copy_from_slice(&0x0101_0101u32.to_le_bytes());
    edid[16] = 1;
    edid[17] = 30;
    edid[18] = 1;
    edid[19] = 4;

    let descriptor = |tag: u8, text: &str| {
        let mut d = [0u8; 18];
        d[3] = tag;
        let mut data = [0x20u8; 13];
        data[..text.len()].copy_from_slice(text.as_bytes());
        if text.len() < 13 {
            data[text.len()] = 0x0a;
        }
        d[5..].copy_from_slice(&data);
        d
    };
    edid[54..72].copy_from_slice(&descriptor(0xfc, model));
    edid[72..90].copy_from_slice(&descriptor(0xff, serial));
    edid[90..108].copy_from_slice(&descriptor(0x10, ""));
    edid[108..126].copy_from_slice(&descriptor(0x10, ""));

    let sum = edid[..127].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    edid[127] = 0u8.wrapping_sub(sum);
    edid
}

/// A session that never sleeps.
pub fn session() -> Session {
    let mut session = Session::new();
    session.set_sleep_multiplier(0.0).unwrap();
    session
}

/// A registry over the given monitors, with user feature definitions read from `udf_dir` only.
pub fn registry(monitors: Vec<(u32, SharedMonitor)>, udf_dir: Option<&std::path::Path>) -> Registry {
    let config = Config::default()
        .with_udf_search_paths(udf_dir.map(|d| d.to_owned()).into_iter().collect());
    Registry::with_backends(config, vec![Arc::new(FakeBackend { monitors })])
}
