//! Vendor display adapter access.
//!
//! Some graphics drivers expose DDC/CI through a call-based library rather
//! than an I2C bus. `AdapterApi` abstracts that library. Calls return the
//! raw adapter status: negative values are failures, positive ones are
//! successes with a warning.

use std::sync::Arc;
use std::time::Duration;
use std::fmt;
use crate::{frame, Error};
use super::{Backend, IoMode, IoPath, Location, Transport};

/// Adapter and display index pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Adlno {
    #[allow(missing_docs)]
    pub adapter: i32,
    #[allow(missing_docs)]
    pub display: i32,
}

impl fmt::Display for Adlno {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.adapter, self.display)
    }
}

/// Result of a successful block access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdapterReply {
    /// Zero or a positive qualified success.
    pub status: i32,
    /// Bytes written into the reply buffer.
    pub len: usize,
}

/// A vendor adapter library.
pub trait AdapterApi: Send + Sync {
    /// Lists the active displays.
    fn displays(&self) -> Result<Vec<Adlno>, i32>;

    /// Reads a display's EDID.
    fn edid(&self, display: Adlno) -> Result<Vec<u8>, i32>;

    /// Sends a framed DDC/CI request, prefixed with the destination
    /// address, and reads the framed reply into `reply` unless it is empty.
    fn ddc_block_access(&self, display: Adlno, send: &[u8], reply: &mut [u8]) -> Result<AdapterReply, i32>;
}

fn check(adlno: Adlno, status: i32) {
    if status > 0 {
        tracing::warn!(display = %adlno, status = %crate::status::Status::from_adapter(status), "adapter call succeeded with warning");
    }
}

/// DDC/CI through an `AdapterApi`.
pub struct AdapterTransport {
    api: Arc<dyn AdapterApi>,
    display: Adlno,
}

impl AdapterTransport {
    #[allow(missing_docs)]
    pub fn new(api: Arc<dyn AdapterApi>, display: Adlno) -> Self {
        AdapterTransport {
            api,
            display,
        }
    }
}

impl Transport for AdapterTransport {
    fn io_path(&self) -> IoPath {
        IoPath::Adapter(self.display)
    }

    fn execute_raw<'a>(&mut self, data: &[u8], out: &'a mut [u8], _response_delay: Duration) -> Result<&'a mut [u8], Error> {
        let mut packet = [0u8; frame::MAX_PACKET_LEN + 1];
        packet[0] = frame::DISPLAY_WRITE_ADDRESS;
        let len = frame::encode_request(data, &mut packet[1..])?.len();

        let reply = self.api.ddc_block_access(self.display, &packet[..1 + len], out).map_err(Error::Adapter)?;
        check(self.display, reply.status);

        if out.is_empty() {
            return Ok(out)
        }

        let full_len = reply.len.min(out.len());
        let len = frame::decode_reply(&out[..full_len])?;
        Ok(&mut out[2..2 + len])
    }

    fn read_edid(&mut self) -> Result<Vec<u8>, Error> {
        self.api.edid(self.display).map_err(Error::Adapter)
    }
}

/// Finds displays through an `AdapterApi`.
pub struct AdapterBackend {
    api: Arc<dyn AdapterApi>,
}

impl AdapterBackend {
    #[allow(missing_docs)]
    pub fn new(api: Arc<dyn AdapterApi>) -> Self {
        AdapterBackend {
            api,
        }
    }
}

impl Backend for AdapterBackend {
    fn io_mode(&self) -> IoMode {
        IoMode::Adapter
    }

    fn scan(&self) -> Result<Vec<Location>, Error> {
        let mut found = Vec::new();
        for adlno in self.api.displays().map_err(Error::Adapter)? {
            match self.api.edid(adlno) {
                Ok(edid) => found.push(Location::new(IoPath::Adapter(adlno), Some(edid))),
                Err(status) => tracing::debug!(display = %adlno, status, "adapter display without EDID"),
            }
        }

        Ok(found)
    }

    fn open(&self, path: &IoPath) -> Result<Box<dyn Transport>, Error> {
        match *path {
            IoPath::Adapter(display) => Ok(Box::new(AdapterTransport::new(self.api.clone(), display))),
            ref path => Err(Error::InvalidArgument(format!("{} is not an adapter path", path))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use crate::status::Status;

    struct Api {
        sent: Mutex<Vec<Vec<u8>>>,
        fail: Option<i32>,
    }

    impl AdapterApi for Api {
        fn displays(&self) -> Result<Vec<Adlno>, i32> {
            Ok(vec![Adlno { adapter: 0, display: 1 }])
        }

        fn edid(&self, _display: Adlno) -> Result<Vec<u8>, i32> {
            Err(-8)
        }

        fn ddc_block_access(&self, _display: Adlno, send: &[u8], reply: &mut [u8]) -> Result<AdapterReply, i32> {
            if let Some(code) = self.fail {
                return Err(code)
            }
            self.sent.lock().push(send.to_owned());
            let len = frame::encode_reply(&[0x02, 0x00, 0xdf, 0x00, 0xff, 0xff, 0x02, 0x01], reply).unwrap().len();
            Ok(AdapterReply { status: 1, len })
        }
    }

    #[test]
    fn frames_like_i2c() {
        let api = Arc::new(Api { sent: Mutex::new(Vec::new()), fail: None });
        let mut t = AdapterTransport::new(api.clone(), Adlno { adapter: 0, display: 1 });
        let mut out = [0u8; 11];
        let payload = t.execute_raw(&[0x01, 0xdf], &mut out, Duration::default()).unwrap();
        assert_eq!(payload[6..], [0x02, 0x01]);
        assert_eq!(api.sent.lock()[0][..3], [0x6e, 0x51, 0x82]);
    }

    #[test]
    fn failure_keeps_adapter_status() {
        let api = Arc::new(Api { sent: Mutex::new(Vec::new()), fail: Some(-1) });
        let mut t = AdapterTransport::new(api, Adlno { adapter: 0, display: 1 });
        let mut out = [0u8; 11];
        let e = t.execute_raw(&[0x01, 0xdf], &mut out, Duration::default()).unwrap_err();
        assert_eq!(e.status(), Status(-2001));
        assert!(e.is_retryable());
    }

    #[test]
    fn scan_skips_displays_without_edid() {
        let backend = AdapterBackend::new(Arc::new(Api { sent: Mutex::new(Vec::new()), fail: None }));
        assert!(backend.scan().unwrap().is_empty());
    }
}
