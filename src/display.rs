//! Display identifiers, references and EDID fields.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use std::fmt;
use parking_lot::{Condvar, Mutex};
use crate::config::Config;
use crate::metadata::{self, udf, FeatureMetadata, UserFeatures};
use crate::transport::{Adlno, Backend, Identity, IoPath, Location, Transport, UsbIds};
use crate::version::MccsVersion;
use crate::Error;

/// Length of an EDID base block.
pub const EDID_LEN: usize = 128;

const EDID_HEADER: [u8; 8] = [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];

const MAX_MFG_ID_LEN: usize = 3;
const MAX_MODEL_LEN: usize = 13;
const MAX_SERIAL_LEN: usize = 13;

/// Selects a display.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DisplayIdentifier {
    /// Display number assigned during detection, starting at 1.
    Dispno(i32),
    /// I2C bus number.
    Busno(u32),
    /// Adapter and display index pair.
    Adlno(Adlno),
    /// USB bus and device numbers.
    Usb {
        #[allow(missing_docs)]
        bus: u32,
        #[allow(missing_docs)]
        device: u32,
    },
    /// USB HID device number, as in `/dev/usb/hiddevN`.
    UsbHiddev(u32),
    /// The 128 byte EDID base block.
    Edid(Vec<u8>),
    /// Any combination of manufacturer id, model name and serial number.
    MfgModelSn {
        #[allow(missing_docs)]
        mfg_id: Option<String>,
        #[allow(missing_docs)]
        model: Option<String>,
        #[allow(missing_docs)]
        serial: Option<String>,
    },
}

impl DisplayIdentifier {
    /// Display numbers start at 1.
    pub fn dispno(dispno: i32) -> Result<Self, Error> {
        if dispno < 1 {
            return Err(Error::InvalidArgument(format!("display number {} must be positive", dispno)))
        }
        Ok(DisplayIdentifier::Dispno(dispno))
    }

    #[allow(missing_docs)]
    pub fn busno(busno: u32) -> Self {
        DisplayIdentifier::Busno(busno)
    }

    #[allow(missing_docs)]
    pub fn adlno(adapter: i32, display: i32) -> Self {
        DisplayIdentifier::Adlno(Adlno { adapter, display })
    }

    #[allow(missing_docs)]
    pub fn usb(bus: u32, device: u32) -> Self {
        DisplayIdentifier::Usb { bus, device }
    }

    #[allow(missing_docs)]
    pub fn usb_hiddev(devno: u32) -> Self {
        DisplayIdentifier::UsbHiddev(devno)
    }

    /// Uses the first 128 bytes of `edid`.
    pub fn edid(edid: &[u8]) -> Result<Self, Error> {
        if edid.len() < EDID_LEN {
            return Err(Error::InvalidArgument(format!("EDID is {} bytes, need {}", edid.len(), EDID_LEN)))
        }
        Ok(DisplayIdentifier::Edid(edid[..EDID_LEN].to_owned()))
    }

    /// At least one field must be given. Empty strings count as absent.
    pub fn mfg_model_sn(mfg_id: Option<&str>, model: Option<&str>, serial: Option<&str>) -> Result<Self, Error> {
        let field = |value: Option<&str>, what: &str, max: usize| match value.filter(|s| !s.is_empty()) {
            Some(s) if s.len() > max => Err(Error::InvalidArgument(format!("{} {:?} longer than {} characters", what, s, max))),
            v => Ok(v.map(ToOwned::to_owned)),
        };

        let mfg_id = field(mfg_id, "manufacturer id", MAX_MFG_ID_LEN)?;
        let model = field(model, "model", MAX_MODEL_LEN)?;
        let serial = field(serial, "serial number", MAX_SERIAL_LEN)?;
        if mfg_id.is_none() && model.is_none() && serial.is_none() {
            return Err(Error::InvalidArgument("manufacturer id, model or serial number required".into()))
        }

        Ok(DisplayIdentifier::MfgModelSn { mfg_id, model, serial })
    }
}

impl fmt::Display for DisplayIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DisplayIdentifier::Dispno(n) => write!(f, "Display number: {}", n),
            DisplayIdentifier::Busno(n) => write!(f, "I2C bus number: {}", n),
            DisplayIdentifier::Adlno(ref a) => write!(f, "ADL adapter.display number: {}", a),
            DisplayIdentifier::Usb { bus, device } => write!(f, "USB bus:device: {}:{}", bus, device),
            DisplayIdentifier::UsbHiddev(n) => write!(f, "USB hiddev device number: {}", n),
            DisplayIdentifier::Edid(ref edid) => {
                f.write_str("EDID: ")?;
                for b in &edid[..8] {
                    write!(f, "{:02x}", b)?;
                }
                f.write_str("...")?;
                for b in &edid[EDID_LEN - 8..] {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            },
            DisplayIdentifier::MfgModelSn { ref mfg_id, ref model, ref serial } => write!(f, "Mfg: {}, model: {}, sn: {}",
                mfg_id.as_deref().unwrap_or("[unspecified]"),
                model.as_deref().unwrap_or("[unspecified]"),
                serial.as_deref().unwrap_or("[unspecified]"),
            ),
        }
    }
}

/// Identification fields of an EDID base block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdidInfo {
    /// Three letter PNP id.
    pub mfg_id: String,
    /// From the product name descriptor.
    pub model: String,
    /// From the serial number descriptor.
    pub serial: String,
    #[allow(missing_docs)]
    pub product_code: u16,
    /// Binary serial number from the header.
    pub serial_number: u32,
    /// The base block.
    pub bytes: Vec<u8>,
}

impl EdidInfo {
    /// Validates and decodes the first 128 bytes of `edid`.
    pub fn parse(edid: &[u8]) -> Result<Self, Error> {
        if edid.len() < EDID_LEN {
            return Err(Error::Edid(format!("{} bytes, need {}", edid.len(), EDID_LEN)))
        }
        let bytes = &edid[..EDID_LEN];
        if bytes[..EDID_HEADER.len()] != EDID_HEADER {
            return Err(Error::Edid("missing header".into()))
        }
        if bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b)) != 0 {
            return Err(Error::Edid("bad checksum".into()))
        }

        let parsed = edid::parse(bytes).to_result()
            .map_err(|e| Error::Edid(e.to_string()))?;

        let mut model = String::new();
        let mut serial = String::new();
        for descriptor in &parsed.descriptors {
            match *descriptor {
                edid::Descriptor::ProductName(ref s) => model = s.trim().to_owned(),
                edid::Descriptor::SerialNumber(ref s) => serial = s.trim().to_owned(),
                _ => (),
            }
        }

        Ok(EdidInfo {
            mfg_id: parsed.header.vendor.iter().collect(),
            model,
            serial,
            product_code: parsed.header.product,
            serial_number: parsed.header.serial,
            bytes: bytes.to_owned(),
        })
    }
}

/// How long `HandleLock::acquire` may wait.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Wait {
    No,
    Forever,
    Until(Instant),
}

/// Mutual exclusion between handles to one display.
#[derive(Debug, Default)]
pub(crate) struct HandleLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl HandleLock {
    fn acquire(&self, removed: &AtomicBool, wait: Wait) -> Result<(), Error> {
        let mut held = self.held.lock();
        loop {
            if removed.load(Ordering::SeqCst) {
                return Err(Error::DisplayRemoved)
            }
            if !*held {
                *held = true;
                return Ok(())
            }

            match wait {
                Wait::No => return Err(Error::Locked),
                Wait::Forever => self.released.wait(&mut held),
                Wait::Until(deadline) => if self.released.wait_until(&mut held, deadline).timed_out() && *held {
                    return Err(Error::Locked)
                },
            }
        }
    }

    fn release(&self) {
        *self.held.lock() = false;
        self.released.notify_all();
    }

    fn is_held(&self) -> bool {
        *self.held.lock()
    }

    fn wake(&self) {
        let _held = self.held.lock();
        self.released.notify_all();
    }
}

struct DisplayInner {
    dispno: i32,
    path: IoPath,
    usb: Option<UsbIds>,
    edid: Option<EdidInfo>,
    identity: Identity,
    product_code: u16,
    version: Mutex<MccsVersion>,
    capabilities: Mutex<Option<String>>,
    udf: Mutex<Option<Option<Arc<UserFeatures>>>>,
    backend: Arc<dyn Backend>,
    config: Arc<Config>,
    lock: HandleLock,
    removed: AtomicBool,
}

/// A detected display.
///
/// References are created by `Registry::detect` and stay valid, though
/// possibly marked removed, for as long as anything holds them. Clones refer
/// to the same display.
#[derive(Clone)]
pub struct DisplayRef(Arc<DisplayInner>);

impl DisplayRef {
    pub(crate) fn new(dispno: i32, location: Location, edid: Option<EdidInfo>, version: MccsVersion, backend: Arc<dyn Backend>, config: Arc<Config>) -> Self {
        let identity = match edid {
            Some(ref edid) => Identity {
                mfg_id: edid.mfg_id.clone(),
                model: edid.model.clone(),
                serial: edid.serial.clone(),
            },
            None => location.identity.unwrap_or_default(),
        };

        DisplayRef(Arc::new(DisplayInner {
            dispno,
            path: location.path,
            usb: location.usb,
            product_code: edid.as_ref().map(|e| e.product_code).unwrap_or_default(),
            edid,
            identity,
            version: Mutex::new(version),
            capabilities: Mutex::new(None),
            udf: Mutex::new(None),
            backend,
            config,
            lock: HandleLock::default(),
            removed: AtomicBool::new(false),
        }))
    }

    /// The assigned display number, or -1 if DDC/CI didn't work during detection.
    pub fn dispno(&self) -> i32 {
        self.0.dispno
    }

    /// Whether DDC/CI worked during detection.
    pub fn is_valid(&self) -> bool {
        self.0.dispno > 0
    }

    #[allow(missing_docs)]
    pub fn io_path(&self) -> IoPath {
        self.0.path
    }

    #[allow(missing_docs)]
    pub fn usb_ids(&self) -> Option<UsbIds> {
        self.0.usb
    }

    #[allow(missing_docs)]
    pub fn edid(&self) -> Option<&EdidInfo> {
        self.0.edid.as_ref()
    }

    #[allow(missing_docs)]
    pub fn mfg_id(&self) -> &str {
        &self.0.identity.mfg_id
    }

    #[allow(missing_docs)]
    pub fn model(&self) -> &str {
        &self.0.identity.model
    }

    #[allow(missing_docs)]
    pub fn serial(&self) -> &str {
        &self.0.identity.serial
    }

    #[allow(missing_docs)]
    pub fn product_code(&self) -> u16 {
        self.0.product_code
    }

    /// The MCCS version as last determined.
    pub fn mccs_version(&self) -> MccsVersion {
        *self.0.version.lock()
    }

    pub(crate) fn set_mccs_version(&self, version: MccsVersion) {
        *self.0.version.lock() = version;
    }

    /// Whether a later detection replaced this reference.
    pub fn is_removed(&self) -> bool {
        self.0.removed.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_removed(&self) {
        self.0.removed.store(true, Ordering::SeqCst);
        self.0.lock.wake();
    }

    /// Whether a handle is currently open.
    pub fn is_open(&self) -> bool {
        self.0.lock.is_held()
    }

    pub(crate) fn acquire(&self, wait: Wait) -> Result<(), Error> {
        self.0.lock.acquire(&self.0.removed, wait)
    }

    pub(crate) fn release(&self) {
        self.0.lock.release()
    }

    pub(crate) fn open_transport(&self) -> Result<Box<dyn Transport>, Error> {
        self.0.backend.open(&self.0.path)
    }

    pub(crate) fn cached_capabilities(&self) -> Option<String> {
        self.0.capabilities.lock().clone()
    }

    pub(crate) fn cache_capabilities(&self, caps: String) {
        *self.0.capabilities.lock() = Some(caps);
    }

    pub(crate) fn config(&self) -> &Config {
        &self.0.config
    }

    /// Whether `id` selects this display.
    pub fn matches(&self, id: &DisplayIdentifier) -> bool {
        let field = |want: &Option<String>, have: &str| want.as_ref().map(|w| w == have).unwrap_or(true);

        match *id {
            DisplayIdentifier::Dispno(n) => self.0.dispno == n,
            DisplayIdentifier::Busno(busno) => self.0.path == IoPath::I2c { busno },
            DisplayIdentifier::Adlno(adlno) => self.0.path == IoPath::Adapter(adlno),
            DisplayIdentifier::Usb { bus, device } => self.0.usb == Some(UsbIds { bus, device }),
            DisplayIdentifier::UsbHiddev(hiddev_devno) => self.0.path == IoPath::Usb { hiddev_devno },
            DisplayIdentifier::Edid(ref edid) => self.0.edid.as_ref().map(|e| &e.bytes == edid).unwrap_or(false),
            DisplayIdentifier::MfgModelSn { ref mfg_id, ref model, ref serial } =>
                field(mfg_id, self.mfg_id()) && field(model, self.model()) && field(serial, self.serial()),
        }
    }

    /// Loads user feature definitions for this display's model, once.
    ///
    /// Does nothing when user-defined features are disabled.
    pub fn dfr_check(&self) -> Result<(), Error> {
        self.user_features().map(drop)
    }

    /// User feature definitions for this display's model, loading them on first use.
    pub fn user_features(&self) -> Result<Option<Arc<UserFeatures>>, Error> {
        if !udf::is_udf_enabled() {
            return Ok(None)
        }

        let mut cache = self.0.udf.lock();
        if let Some(ref udf) = *cache {
            return Ok(udf.clone())
        }

        let found = udf::find(&self.0.config.udf_search_paths, self.mfg_id(), self.model(), self.0.product_code)?
            .map(Arc::new);
        *cache = Some(found.clone());
        Ok(found)
    }

    /// Metadata for `code` at this display's MCCS version.
    ///
    /// User definitions for the model take precedence over the built-in
    /// table. Unresolvable codes fail with `UnknownFeature` unless
    /// `create_default` asks for a synthetic record.
    pub fn feature_metadata(&self, code: u8, create_default: bool) -> Result<FeatureMetadata, Error> {
        let version = self.mccs_version();
        match self.user_features() {
            Ok(Some(udf)) => if let Some(feature) = udf.feature(code) {
                return Ok(feature.metadata(version))
            },
            Ok(None) => (),
            Err(e) => tracing::warn!(display = %self, error = %e, "ignoring user feature definitions"),
        }

        metadata::metadata_by_version(code, version, self.0.config.deprecated_policy, create_default)
    }

    /// A snapshot of this display's description.
    pub fn info(&self) -> DisplayInfo {
        DisplayInfo {
            dispno: self.0.dispno,
            path: self.0.path,
            usb: self.0.usb,
            mfg_id: self.mfg_id().to_owned(),
            model: self.model().to_owned(),
            serial: self.serial().to_owned(),
            product_code: self.0.product_code,
            edid: self.0.edid.as_ref().map(|e| e.bytes.clone()),
            mccs_version: self.mccs_version(),
            dref: self.clone(),
        }
    }
}

impl PartialEq for DisplayRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DisplayRef { }

impl fmt::Debug for DisplayRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DisplayRef")
            .field("dispno", &self.0.dispno)
            .field("path", &self.0.path)
            .field("mfg_id", &self.0.identity.mfg_id)
            .field("model", &self.0.identity.model)
            .field("removed", &self.is_removed())
            .finish()
    }
}

impl fmt::Display for DisplayRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Display {} ({})", self.0.dispno, self.0.path)
    }
}

/// Description of one detected display.
#[derive(Clone, Debug)]
pub struct DisplayInfo {
    /// -1 when DDC/CI didn't work during detection.
    pub dispno: i32,
    #[allow(missing_docs)]
    pub path: IoPath,
    #[allow(missing_docs)]
    pub usb: Option<UsbIds>,
    #[allow(missing_docs)]
    pub mfg_id: String,
    #[allow(missing_docs)]
    pub model: String,
    #[allow(missing_docs)]
    pub serial: String,
    #[allow(missing_docs)]
    pub product_code: u16,
    /// The EDID base block.
    pub edid: Option<Vec<u8>>,
    #[allow(missing_docs)]
    pub mccs_version: MccsVersion,
    /// The display itself.
    pub dref: DisplayRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_validation() {
        assert!(DisplayIdentifier::dispno(0).is_err());
        assert!(DisplayIdentifier::edid(&[0u8; 127]).is_err());
        assert_eq!(DisplayIdentifier::edid(&[0u8; 256]).unwrap(), DisplayIdentifier::Edid(vec![0u8; 128]));

        assert!(DisplayIdentifier::mfg_model_sn(None, Some(""), None).is_err());
        assert!(DisplayIdentifier::mfg_model_sn(Some("DELL"), None, None).is_err());
        assert!(DisplayIdentifier::mfg_model_sn(None, Some("A model name too long"), None).is_err());
        match DisplayIdentifier::mfg_model_sn(Some("DEL"), None, Some("")).unwrap() {
            DisplayIdentifier::MfgModelSn { mfg_id, model: None, serial: None } => assert_eq!(mfg_id.as_deref(), Some("DEL")),
            id => panic!("unexpected {:?}", id),
        }
    }

    #[test]
    fn identifier_repr() {
        assert_eq!(DisplayIdentifier::busno(4).to_string(), "I2C bus number: 4");
        assert_eq!(DisplayIdentifier::adlno(1, 0).to_string(), "ADL adapter.display number: 1.0");
        let id = DisplayIdentifier::mfg_model_sn(None, Some("U2715H"), None).unwrap();
        assert_eq!(id.to_string(), "Mfg: [unspecified], model: U2715H, sn: [unspecified]");
    }

    #[test]
    fn edid_rejects_garbage() {
        assert!(EdidInfo::parse(&[0u8; 64]).is_err());
        assert!(EdidInfo::parse(&[0u8; 128]).is_err());

        let mut bad_checksum = vec![0u8; 128];
        bad_checksum[..8].copy_from_slice(&EDID_HEADER);
        bad_checksum[127] = 1;
        assert!(EdidInfo::parse(&bad_checksum).is_err());
    }

    #[test]
    fn lock_modes() {
        let lock = HandleLock::default();
        let removed = AtomicBool::new(false);
        lock.acquire(&removed, Wait::No).unwrap();
        match lock.acquire(&removed, Wait::No) {
            Err(Error::Locked) => (),
            r => panic!("unexpected {:?}", r),
        }
        let deadline = Instant::now() + std::time::Duration::from_millis(10);
        match lock.acquire(&removed, Wait::Until(deadline)) {
            Err(Error::Locked) => (),
            r => panic!("unexpected {:?}", r),
        }
        lock.release();
        lock.acquire(&removed, Wait::Forever).unwrap();

        removed.store(true, Ordering::SeqCst);
        lock.release();
        match lock.acquire(&removed, Wait::Forever) {
            Err(Error::DisplayRemoved) => (),
            r => panic!("unexpected {:?}", r),
        }
    }
}
