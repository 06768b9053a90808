use std::time::Duration;
use std::{cmp, io};
use resize_slice::ResizeSlice;
use crate::delay::sleep_for;
use crate::{frame, Error, I2C_ADDRESS_DDC_CI, I2C_ADDRESS_EDID};
use super::{IoPath, Transport};

/// DDC/CI over an I2C bus.
#[derive(Clone, Debug)]
pub struct I2cTransport<I> {
    inner: I,
    busno: u32,
}

/// DDC/CI on Linux i2c-dev
#[cfg(feature = "i2c-linux")]
pub type I2cDeviceTransport = I2cTransport<i2c_linux::I2c<::std::fs::File>>;

#[cfg(feature = "i2c-linux")]
impl I2cTransport<i2c_linux::I2c<::std::fs::File>> {
    /// Opens `/dev/i2c-{busno}`.
    pub fn open(busno: u32) -> io::Result<Self> {
        Ok(I2cTransport::new(i2c_linux::I2c::from_path(format!("/dev/i2c-{}", busno))?, busno))
    }
}

impl<I> I2cTransport<I> {
    /// Wraps an already open bus.
    pub fn new(i2c: I, busno: u32) -> Self {
        I2cTransport {
            inner: i2c,
            busno: busno,
        }
    }

    /// Consume the transport to return the inner device.
    pub fn into_inner(self) -> I {
        self.inner
    }

    /// Borrow the inner device.
    pub fn inner_ref(&self) -> &I {
        &self.inner
    }

    /// Mutably borrow the inner device.
    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.inner
    }
}

impl<I: i2c::Address + i2c::BlockTransfer> I2cTransport<I> {
    /// Read up to 256 bytes of the monitor's EDID starting at `offset`.
    pub fn read_edid_at(&mut self, mut offset: u8, mut data: &mut [u8]) -> Result<usize, I::Error> {
        self.inner.set_slave_address(I2C_ADDRESS_EDID, false)?;

        let mut len = 0;
        while !data.is_empty() {
            let datalen = cmp::min(0x80, data.len());
            let read = self.inner.i2c_read_block_data(offset, &mut data[..datalen])?;
            if read == 0 {
                break
            }
            len += read;
            offset = if let Some(offset) = offset.checked_add(read as u8) {
                offset
            } else {
                break
            };
            data.resize_from(read);
        }

        Ok(len)
    }
}

fn io_error<E: Into<io::Error>>(e: E) -> Error {
    Error::Io(e.into())
}

impl<I> Transport for I2cTransport<I> where
    I: i2c::Address + i2c::ReadWrite + i2c::BlockTransfer + Send,
    I::Error: Into<io::Error>,
{
    fn io_path(&self) -> IoPath {
        IoPath::I2c { busno: self.busno }
    }

    fn execute_raw<'a>(&mut self, data: &[u8], out: &'a mut [u8], response_delay: Duration) -> Result<&'a mut [u8], Error> {
        let mut packet = [0u8; frame::MAX_PACKET_LEN];
        let packet = frame::encode_request(data, &mut packet)?;
        self.inner.set_slave_address(I2C_ADDRESS_DDC_CI, false).map_err(io_error)?;

        self.inner.i2c_write(packet).map_err(io_error)?;
        if out.is_empty() {
            return Ok(out)
        }

        sleep_for(response_delay);
        let full_len = self.inner.i2c_read(out).map_err(io_error)?;
        let len = frame::decode_reply(&out[..cmp::min(full_len, out.len())])?;

        Ok(&mut out[2..2 + len])
    }

    fn read_edid(&mut self) -> Result<Vec<u8>, Error> {
        let mut edid = vec![0u8; 0x80];
        let len = self.read_edid_at(0, &mut edid).map_err(io_error)?;
        edid.truncate(len);
        Ok(edid)
    }
}

#[cfg(all(feature = "i2c-linux", feature = "udev"))]
pub use self::scan::I2cBackend;

#[cfg(all(feature = "i2c-linux", feature = "udev"))]
mod scan {
    use std::os::unix::ffi::OsStrExt;
    use std::io;
    use crate::transport::{Backend, IoMode, IoPath, Location, Transport};
    use crate::Error;
    use super::I2cTransport;

    /// Finds displays on Linux i2c-dev buses through udev.
    ///
    /// A bus counts as a display when its EDID EEPROM answers. DDC/CI may
    /// still be unavailable if the display doesn't support it, or if the
    /// active input is controlled by another host device.
    #[derive(Clone, Debug)]
    pub struct I2cBackend {
        skip_prefixes: Vec<String>,
    }

    impl I2cBackend {
        /// Buses whose adapter name starts with one of `skip_prefixes` are never probed.
        pub fn new(skip_prefixes: Vec<String>) -> Self {
            I2cBackend {
                skip_prefixes,
            }
        }

        fn buses(&self) -> io::Result<Vec<u32>> {
            let mut en = udev::Enumerator::new()?;
            en.match_subsystem("i2c-dev")?;

            let mut buses = Vec::new();
            for dev in en.scan_devices()? {
                let name = match dev.attribute_value("name") {
                    Some(name) => name,
                    None => continue,
                };

                if self.skip_prefixes.iter().any(|p| name.as_bytes().starts_with(p.as_bytes())) {
                    continue
                }

                let busno = dev.sysname().to_str()
                    .and_then(|s| s.strip_prefix("i2c-"))
                    .and_then(|s| s.parse().ok());
                if let Some(busno) = busno {
                    buses.push(busno);
                }
            }
            buses.sort();

            Ok(buses)
        }
    }

    impl Backend for I2cBackend {
        fn io_mode(&self) -> IoMode {
            IoMode::I2c
        }

        fn scan(&self) -> Result<Vec<Location>, Error> {
            let mut found = Vec::new();
            for busno in self.buses()? {
                let edid = match I2cTransport::open(busno).map_err(Error::from).and_then(|mut t| t.read_edid()) {
                    Ok(ref edid) if edid.is_empty() => continue,
                    Ok(edid) => edid,
                    Err(e) => {
                        tracing::trace!(busno, error = %e, "no EDID on bus");
                        continue
                    },
                };

                found.push(Location::new(IoPath::I2c { busno }, Some(edid)));
            }

            Ok(found)
        }

        fn open(&self, path: &IoPath) -> Result<Box<dyn Transport>, Error> {
            match *path {
                IoPath::I2c { busno } => Ok(Box::new(I2cTransport::open(busno)?)),
                ref path => Err(Error::InvalidArgument(format!("{} is not an I2C path", path))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;
    use std::io;
    use super::*;

    /// An in-memory bus that records writes and plays back queued reads.
    #[derive(Default)]
    struct Bus {
        address: u16,
        written: Vec<(u16, Vec<u8>)>,
        reads: VecDeque<Vec<u8>>,
        edid: Vec<u8>,
    }

    impl i2c::Master for Bus {
        type Error = io::Error;
    }

    impl i2c::Address for Bus {
        fn set_slave_address(&mut self, addr: u16, _tenbit: bool) -> Result<(), io::Error> {
            self.address = addr;
            Ok(())
        }
    }

    impl i2c::ReadWrite for Bus {
        fn i2c_read(&mut self, value: &mut [u8]) -> Result<usize, io::Error> {
            let data = self.reads.pop_front().ok_or_else(|| io::Error::from_raw_os_error(libc::EIO))?;
            let len = data.len().min(value.len());
            value[..len].copy_from_slice(&data[..len]);
            Ok(len)
        }

        fn i2c_write(&mut self, value: &[u8]) -> Result<(), io::Error> {
            self.written.push((self.address, value.to_owned()));
            Ok(())
        }
    }

    impl i2c::BlockTransfer for Bus {
        fn i2c_read_block_data(&mut self, command: u8, value: &mut [u8]) -> Result<usize, io::Error> {
            let start = (command as usize).min(self.edid.len());
            let len = (self.edid.len() - start).min(value.len()).min(32);
            value[..len].copy_from_slice(&self.edid[start..start + len]);
            Ok(len)
        }

        fn i2c_write_block_data(&mut self, _command: u8, _value: &[u8]) -> Result<(), io::Error> {
            Ok(())
        }
    }

    #[test]
    fn exchange() {
        let mut bus = Bus::default();
        let mut reply = [0u8; frame::MAX_PACKET_LEN];
        let len = frame::encode_reply(&[0x02, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x32], &mut reply).unwrap().len();
        bus.reads.push_back(reply[..len].to_owned());

        let mut transport = I2cTransport::new(bus, 4);
        let mut out = [0u8; 11];
        let payload = transport.execute_raw(&[0x01, 0x10], &mut out, Duration::default()).unwrap();
        assert_eq!(payload, &[0x02, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x32]);

        let bus = transport.into_inner();
        assert_eq!(bus.written, vec![(I2C_ADDRESS_DDC_CI, vec![0x51, 0x82, 0x01, 0x10, 0xac])]);
    }

    #[test]
    fn bus_error_is_io() {
        let mut transport = I2cTransport::new(Bus::default(), 1);
        let mut out = [0u8; 11];
        match transport.execute_raw(&[0x01, 0x10], &mut out, Duration::default()) {
            Err(Error::Io(ref e)) => assert_eq!(e.raw_os_error(), Some(libc::EIO)),
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn edid() {
        let mut bus = Bus::default();
        bus.edid = (0..128u8).collect();
        let mut transport = I2cTransport::new(bus, 1);
        let edid = transport.read_edid().unwrap();
        assert_eq!(edid.len(), 128);
        assert_eq!(edid[100], 100);
        assert_eq!(transport.io_path(), IoPath::I2c { busno: 1 });
    }
}
