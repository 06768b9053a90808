//! Byte-level access to displays.
//!
//! A `Transport` moves one DDC/CI exchange over some bus. A `Backend` finds
//! displays reachable through one I/O mode and opens transports for them.

use std::time::Duration;
use std::fmt;
use crate::Error;

mod adapter;
pub use self::adapter::{Adlno, AdapterApi, AdapterBackend, AdapterReply, AdapterTransport};

mod i2c;
pub use self::i2c::I2cTransport;
#[cfg(all(feature = "i2c-linux", feature = "udev"))]
pub use self::i2c::I2cBackend;

mod usb;
pub use self::usb::{HidReports, UsbTransport};
#[cfg(feature = "usb")]
pub use self::usb::UsbBackend;

/// How a display is reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IoMode {
    /// Linux i2c-dev.
    I2c,
    /// A vendor display adapter API.
    Adapter,
    /// USB HID monitor control class.
    Usb,
}

impl IoMode {
    pub(crate) fn index(self) -> usize {
        match self {
            IoMode::I2c => 0,
            IoMode::Adapter => 1,
            IoMode::Usb => 2,
        }
    }
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            IoMode::I2c => "i2c",
            IoMode::Adapter => "adl",
            IoMode::Usb => "usb",
        })
    }
}

/// Where a display lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IoPath {
    /// `/dev/i2c-{busno}`
    I2c {
        #[allow(missing_docs)]
        busno: u32,
    },
    /// Adapter and display index pair.
    Adapter(Adlno),
    /// `/dev/usb/hiddev{hiddev_devno}`
    Usb {
        #[allow(missing_docs)]
        hiddev_devno: u32,
    },
}

impl IoPath {
    #[allow(missing_docs)]
    pub fn mode(&self) -> IoMode {
        match *self {
            IoPath::I2c { .. } => IoMode::I2c,
            IoPath::Adapter(..) => IoMode::Adapter,
            IoPath::Usb { .. } => IoMode::Usb,
        }
    }
}

impl fmt::Display for IoPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IoPath::I2c { busno } => write!(f, "/dev/i2c-{}", busno),
            IoPath::Adapter(ref adlno) => write!(f, "adl {}", adlno),
            IoPath::Usb { hiddev_devno } => write!(f, "/dev/usb/hiddev{}", hiddev_devno),
        }
    }
}

/// USB bus and device numbers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UsbIds {
    #[allow(missing_docs)]
    pub bus: u32,
    #[allow(missing_docs)]
    pub device: u32,
}

/// Identity strings for displays that can't provide an EDID.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    #[allow(missing_docs)]
    pub mfg_id: String,
    #[allow(missing_docs)]
    pub model: String,
    #[allow(missing_docs)]
    pub serial: String,
}

/// A display found by a backend scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Where it lives.
    pub path: IoPath,
    /// Raw EDID, if one could be read.
    pub edid: Option<Vec<u8>>,
    /// USB bus/device numbers for USB displays.
    pub usb: Option<UsbIds>,
    /// Identity for displays without an EDID.
    pub identity: Option<Identity>,
}

impl Location {
    /// A location with only an EDID.
    pub fn new(path: IoPath, edid: Option<Vec<u8>>) -> Self {
        Location {
            path,
            edid,
            usb: None,
            identity: None,
        }
    }
}

/// Carries a single DDC/CI exchange.
pub trait Transport: Send {
    /// Where this transport leads.
    fn io_path(&self) -> IoPath;

    /// Sends `data` as one request and, unless `out` is empty, waits
    /// `response_delay` and reads a reply into `out`.
    ///
    /// Returns the reply payload within `out`, without framing.
    fn execute_raw<'a>(&mut self, data: &[u8], out: &'a mut [u8], response_delay: Duration) -> Result<&'a mut [u8], Error>;

    /// Reads the display's base EDID block.
    fn read_edid(&mut self) -> Result<Vec<u8>, Error>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn io_path(&self) -> IoPath {
        (**self).io_path()
    }

    fn execute_raw<'a>(&mut self, data: &[u8], out: &'a mut [u8], response_delay: Duration) -> Result<&'a mut [u8], Error> {
        (**self).execute_raw(data, out, response_delay)
    }

    fn read_edid(&mut self) -> Result<Vec<u8>, Error> {
        (**self).read_edid()
    }
}

/// Finds and opens displays reachable through one I/O mode.
pub trait Backend: Send + Sync {
    /// The mode this backend serves.
    fn io_mode(&self) -> IoMode;

    /// Lists displays currently reachable.
    fn scan(&self) -> Result<Vec<Location>, Error>;

    /// Opens a transport to a previously scanned location.
    fn open(&self, path: &IoPath) -> Result<Box<dyn Transport>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(IoPath::I2c { busno: 4 }.to_string(), "/dev/i2c-4");
        assert_eq!(IoPath::Usb { hiddev_devno: 2 }.mode(), IoMode::Usb);
        assert_eq!(IoPath::Adapter(Adlno { adapter: 1, display: 0 }).to_string(), "adl 1.0");
    }
}
