//! USB HID monitor control class.
//!
//! Each VCP feature maps onto the HID feature report whose id is the
//! feature code. The report payload carries the current value followed by
//! an optional maximum, both little endian. Replies are synthesized in
//! DDC/CI form so the layers above stay transport agnostic. Capabilities,
//! tables and settings storage have no USB equivalent.

use std::time::Duration;
use crate::commands::{CommandResult, VcpReply};
use crate::{Error, ErrorCode};
use super::{IoPath, Transport};

/// HID usage page of USB monitor control interfaces.
pub const USB_MONITOR_USAGE_PAGE: u16 = 0x80;

/// Raw feature report access.
pub trait HidReports: Send {
    /// Reads the feature report whose id is `buf[0]`, returning bytes read including the id.
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Sends a feature report whose id is `data[0]`.
    fn send_feature_report(&mut self, data: &[u8]) -> Result<(), Error>;
}

/// DDC/CI semantics over HID feature reports.
pub struct UsbTransport<D> {
    device: D,
    hiddev_devno: u32,
}

impl<D> UsbTransport<D> {
    #[allow(missing_docs)]
    pub fn new(device: D, hiddev_devno: u32) -> Self {
        UsbTransport {
            device,
            hiddev_devno,
        }
    }

    #[allow(missing_docs)]
    pub fn into_inner(self) -> D {
        self.device
    }
}

/// Decodes a feature report payload into `(current, maximum)`.
///
/// One byte is an 8-bit current value, two bytes are 8-bit current and
/// maximum, four or more are 16-bit current and maximum.
fn decode_report(payload: &[u8]) -> Result<(u16, u16), ErrorCode> {
    match payload.len() {
        1 => Ok((payload[0] as u16, 0xff)),
        2 => Ok((payload[0] as u16, payload[1] as u16)),
        n if n >= 4 => Ok((
            u16::from_le_bytes([payload[0], payload[1]]),
            u16::from_le_bytes([payload[2], payload[3]]),
        )),
        _ => Err(ErrorCode::InvalidLength),
    }
}

impl<D: HidReports> Transport for UsbTransport<D> {
    fn io_path(&self) -> IoPath {
        IoPath::Usb { hiddev_devno: self.hiddev_devno }
    }

    fn execute_raw<'a>(&mut self, data: &[u8], out: &'a mut [u8], _response_delay: Duration) -> Result<&'a mut [u8], Error> {
        match data {
            [0x01, code] => {
                let mut buf = [0u8; 9];
                buf[0] = *code;
                let len = self.device.get_feature_report(&mut buf)?;
                if len < 2 || len > buf.len() {
                    return Err(ErrorCode::InvalidLength.into())
                }
                let (value, maximum) = decode_report(&buf[1..len])?;

                if out.len() < VcpReply::MAX_LEN {
                    return Err(ErrorCode::InvalidLength.into())
                }
                let [mh, ml] = maximum.to_be_bytes();
                let [sh, sl] = value.to_be_bytes();
                out[..VcpReply::MAX_LEN].copy_from_slice(&[0x02, 0x00, *code, 0x00, mh, ml, sh, sl]);
                Ok(&mut out[..VcpReply::MAX_LEN])
            },
            [0x03, code, hi, lo] => {
                let [lo16, hi16] = (((*hi as u16) << 8) | *lo as u16).to_le_bytes();
                self.device.send_feature_report(&[*code, lo16, hi16])?;
                Ok(&mut out[..0])
            },
            [0x0c] => Err(Error::Unimplemented("saving settings over USB".into())),
            [0xf3, ..] => Err(Error::Unimplemented("capabilities over USB".into())),
            [0xe2, ..] | [0xe7, ..] => Err(Error::Unimplemented("table features over USB".into())),
            _ => Err(Error::InvalidArgument(format!("unsupported USB request {:02x?}", data))),
        }
    }

    fn read_edid(&mut self) -> Result<Vec<u8>, Error> {
        Err(Error::Unimplemented("EDID over USB".into()))
    }
}

#[cfg(feature = "usb")]
pub use self::hid::UsbBackend;

#[cfg(feature = "usb")]
mod hid {
    use hidapi::{HidApi, HidDevice};
    use parking_lot::Mutex;
    use crate::transport::{Backend, Identity, IoMode, IoPath, Location, Transport, UsbIds};
    use crate::Error;
    use super::{HidReports, UsbTransport, USB_MONITOR_USAGE_PAGE};

    fn hid_error(e: hidapi::HidError) -> Error {
        Error::Usb(e.to_string())
    }

    impl HidReports for HidDevice {
        fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
            HidDevice::get_feature_report(self, buf).map_err(hid_error)
        }

        fn send_feature_report(&mut self, data: &[u8]) -> Result<(), Error> {
            HidDevice::send_feature_report(self, data).map_err(hid_error)
        }
    }

    /// Trailing digits of a device node name.
    fn devno(name: &str) -> Option<u32> {
        let start = name.rfind(|c: char| !c.is_ascii_digit()).map(|i| i + 1).unwrap_or(0);
        name[start..].parse().ok()
    }

    /// Where a HID interface sits in the USB tree.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct Topology {
        hiddev_devno: u32,
        usb: Option<UsbIds>,
    }

    /// Resolves the hiddev node and USB bus/device numbers behind a hidraw node.
    ///
    /// `None` when the interface has no hiddev node bound.
    fn topology(hidraw_path: &str) -> Option<Topology> {
        let sysname = hidraw_path.rsplit('/').next()?;
        let hidraw = udev::Device::from_subsystem_sysname("hidraw".to_owned(), sysname.to_owned()).ok()?;
        let interface = hidraw.parent_with_subsystem_devtype("usb", "usb_interface").ok()??;

        let mut en = udev::Enumerator::new().ok()?;
        en.match_subsystem("usbmisc").ok()?;
        en.match_parent(&interface).ok()?;
        let hiddev_devno = en.scan_devices().ok()?
            .filter_map(|dev| dev.sysname().to_str().and_then(|s| s.strip_prefix("hiddev")).and_then(devno))
            .next()?;

        let attr = |dev: &udev::Device, name: &str| dev.attribute_value(name)
            .and_then(|v| v.to_str())
            .and_then(|v| v.trim().parse().ok());
        let usb = interface.parent_with_subsystem_devtype("usb", "usb_device").ok()
            .and_then(|dev| dev)
            .and_then(|dev| Some(UsbIds {
                bus: attr(&dev, "busnum")?,
                device: attr(&dev, "devnum")?,
            }));

        Some(Topology {
            hiddev_devno,
            usb,
        })
    }

    /// Finds USB monitor control interfaces through hidapi.
    pub struct UsbBackend {
        api: Mutex<Option<HidApi>>,
    }

    impl UsbBackend {
        #[allow(missing_docs)]
        pub fn new() -> Self {
            UsbBackend {
                api: Mutex::new(None),
            }
        }

        fn with_api<T, F: FnOnce(&mut HidApi) -> Result<T, Error>>(&self, f: F) -> Result<T, Error> {
            let mut api = self.api.lock();
            match *api {
                Some(ref mut api) => api.refresh_devices().map_err(hid_error)?,
                None => *api = Some(HidApi::new().map_err(hid_error)?),
            }
            match *api {
                Some(ref mut api) => f(api),
                None => Err(Error::Usb("hidapi unavailable".into())),
            }
        }
    }

    impl Backend for UsbBackend {
        fn io_mode(&self) -> IoMode {
            IoMode::Usb
        }

        fn scan(&self) -> Result<Vec<Location>, Error> {
            self.with_api(|api| {
                let mut found = Vec::new();
                for info in api.device_list().filter(|d| d.usage_page() == USB_MONITOR_USAGE_PAGE) {
                    let path = info.path().to_string_lossy();
                    let topology = match topology(&path) {
                        Some(t) => t,
                        None => {
                            tracing::debug!(%path, "USB monitor interface without hiddev node");
                            continue
                        },
                    };

                    tracing::debug!(vendor = info.vendor_id(), product = info.product_id(), %path, ?topology, "USB monitor interface");
                    found.push(Location {
                        path: IoPath::Usb { hiddev_devno: topology.hiddev_devno },
                        edid: None,
                        usb: topology.usb,
                        identity: Some(Identity {
                            mfg_id: info.manufacturer_string().unwrap_or_default().to_owned(),
                            model: info.product_string().unwrap_or_default().to_owned(),
                            serial: info.serial_number().unwrap_or_default().to_owned(),
                        }),
                    });
                }
                Ok(found)
            })
        }

        fn open(&self, path: &IoPath) -> Result<Box<dyn Transport>, Error> {
            let hiddev_devno = match *path {
                IoPath::Usb { hiddev_devno } => hiddev_devno,
                ref path => return Err(Error::InvalidArgument(format!("{} is not a USB path", path))),
            };

            self.with_api(|api| {
                let info = api.device_list()
                    .filter(|d| d.usage_page() == USB_MONITOR_USAGE_PAGE)
                    .find(|d| topology(&d.path().to_string_lossy()).map(|t| t.hiddev_devno) == Some(hiddev_devno))
                    .ok_or(Error::DisplayNotFound)?;
                let device = info.open_device(api).map_err(hid_error)?;
                Ok(Box::new(UsbTransport::new(device, hiddev_devno)) as Box<dyn Transport>)
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::{devno, topology};

        #[test]
        fn node_numbers() {
            assert_eq!(devno("hidraw3"), Some(3));
            assert_eq!(devno("12"), Some(12));
            assert_eq!(devno("hidraw"), None);
        }

        #[test]
        fn unknown_node_has_no_topology() {
            assert_eq!(topology("/dev/hidraw-none"), None);
            assert_eq!(topology(""), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Reports {
        current: Vec<u8>,
        sent: Vec<Vec<u8>>,
    }

    impl HidReports for Reports {
        fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
            buf[1..1 + self.current.len()].copy_from_slice(&self.current);
            Ok(1 + self.current.len())
        }

        fn send_feature_report(&mut self, data: &[u8]) -> Result<(), Error> {
            self.sent.push(data.to_owned());
            Ok(())
        }
    }

    #[test]
    fn get_synthesizes_vcp_reply() {
        let mut t = UsbTransport::new(Reports { current: vec![0x32, 0x00, 0x64, 0x00], ..Default::default() }, 0);
        let mut out = [0u8; 11];
        let payload = t.execute_raw(&[0x01, 0x10], &mut out, Duration::default()).unwrap().to_owned();
        let reply = VcpReply::decode(&payload).unwrap();
        assert_eq!(reply.code, 0x10);
        assert_eq!(reply.value.value(), 0x32);
        assert_eq!(reply.value.maximum(), 0x64);
    }

    #[test]
    fn set_sends_report() {
        let mut t = UsbTransport::new(Reports::default(), 0);
        let mut out = [0u8; 0];
        t.execute_raw(&[0x03, 0x10, 0x01, 0x02], &mut out, Duration::default()).unwrap();
        assert_eq!(t.into_inner().sent, vec![vec![0x10, 0x02, 0x01]]);
    }

    #[test]
    fn unsupported_requests() {
        let mut t = UsbTransport::new(Reports::default(), 0);
        let mut out = [0u8; 40];
        match t.execute_raw(&[0xf3, 0, 0], &mut out, Duration::default()) {
            Err(Error::Unimplemented(..)) => (),
            r => panic!("unexpected {:?}", r),
        }
        assert!(t.read_edid().is_err());
    }

    #[test]
    fn short_report() {
        assert_eq!(decode_report(&[5]), Ok((5, 0xff)));
        assert_eq!(decode_report(&[5, 9, 1]), Err(ErrorCode::InvalidLength));
    }
}
