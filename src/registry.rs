//! Display detection and lookup.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::config::Config;
use crate::display::{DisplayIdentifier, DisplayInfo, DisplayRef, EdidInfo, Wait};
use crate::handle::{Channel, DisplayHandle};
use crate::session::Session;
use crate::trace::TraceGroup;
use crate::transport::{Backend, IoMode, IoPath};
use crate::version::MccsVersion;
use crate::Error;

/// Owns the set of detected displays and arbitrates access to them.
pub struct Registry {
    config: Arc<Config>,
    backends: Vec<Arc<dyn Backend>>,
    displays: Option<Vec<DisplayRef>>,
}

impl Registry {
    /// A registry using the backends compiled into this build.
    #[allow(unused_mut)]
    pub fn new(config: Config) -> Self {
        let mut backends: Vec<Arc<dyn Backend>> = Vec::new();
        #[cfg(all(feature = "i2c-linux", feature = "udev"))]
        backends.push(Arc::new(crate::transport::I2cBackend::new(config.i2c_skip_prefixes.clone())));
        #[cfg(feature = "usb")]
        backends.push(Arc::new(crate::transport::UsbBackend::new()));

        Registry::with_backends(config, backends)
    }

    /// A registry scanning only the given backends.
    pub fn with_backends(config: Config, backends: Vec<Arc<dyn Backend>>) -> Self {
        Registry {
            config: Arc::new(config),
            backends,
            displays: None,
        }
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Toggles scanning for USB monitors, returning the previous setting.
    ///
    /// Only possible before the first detection.
    pub fn enable_usb_display_detection(&mut self, enable: bool) -> Result<bool, Error> {
        if self.displays.is_some() {
            return Err(Error::InvalidOperation("USB detection can't change after displays are detected".into()))
        }
        if enable && !self.backends.iter().any(|b| b.io_mode() == IoMode::Usb) {
            return Err(Error::Unimplemented("USB display support not available".into()))
        }

        let config = Arc::make_mut(&mut self.config);
        Ok(std::mem::replace(&mut config.usb_detection, enable))
    }

    #[allow(missing_docs)]
    pub fn is_usb_display_detection_enabled(&self) -> bool {
        self.config.usb_detection
    }

    /// Whether `detect` has run.
    pub fn is_detected(&self) -> bool {
        self.displays.is_some()
    }

    /// Scans every backend and replaces the set of known displays.
    ///
    /// References from a previous detection are marked removed. Fails with
    /// `InvalidOperation` while any display is open. Returns the number of
    /// valid displays.
    pub fn detect(&mut self, session: &Session) -> Result<usize, Error> {
        let res = self.redetect(session);
        session.record(res)
    }

    fn redetect(&mut self, session: &Session) -> Result<usize, Error> {
        if let Some(ref displays) = self.displays {
            if let Some(open) = displays.iter().find(|d| d.is_open()) {
                return Err(Error::InvalidOperation(format!("{} is open", open)))
            }
            for display in displays {
                display.mark_removed();
            }
        }

        let mut seen = HashSet::new();
        let mut displays = Vec::new();
        let mut dispno = 0;
        for backend in &self.backends {
            if backend.io_mode() == IoMode::Usb && !self.config.usb_detection {
                continue
            }

            let locations = match backend.scan() {
                Ok(locations) => locations,
                Err(e) => {
                    tracing::warn!(mode = %backend.io_mode(), error = %e, "display scan failed");
                    continue
                },
            };

            for location in locations {
                if !seen.insert(location.path) {
                    dbgtrc!(session, TraceGroup::TOP, "detect", path = %location.path, "already found through another backend");
                    continue
                }

                let edid = match location.edid {
                    Some(ref bytes) => match EdidInfo::parse(bytes) {
                        Ok(edid) => Some(edid),
                        Err(e) => {
                            dbgtrc!(session, TraceGroup::TOP, "detect", path = %location.path, error = %e, "skipping");
                            continue
                        },
                    },
                    None if location.identity.is_some() => None,
                    None => {
                        dbgtrc!(session, TraceGroup::TOP, "detect", path = %location.path, "no EDID, skipping");
                        continue
                    },
                };

                let (valid, version) = check_ddc(session, &**backend, &location.path);
                let number = if valid {
                    dispno += 1;
                    dispno
                } else if self.config.keep_invalid {
                    -1
                } else {
                    continue
                };

                let dref = DisplayRef::new(number, location, edid, version, backend.clone(), self.config.clone());
                dbgtrc!(session, TraceGroup::TOP, "detect", display = %dref, version = %version, "found");
                displays.push(dref);
            }
        }

        tracing::debug!(valid = dispno, total = displays.len(), "display detection complete");
        self.displays = Some(displays);
        Ok(dispno as usize)
    }

    /// Every detected display, valid or not.
    pub fn displays(&self) -> &[DisplayRef] {
        self.displays.as_deref().unwrap_or(&[])
    }

    /// Descriptions of detected displays.
    pub fn display_info_list(&self, include_invalid: bool) -> Result<Vec<DisplayInfo>, Error> {
        let displays = self.displays.as_ref().ok_or(Error::Uninitialized)?;
        Ok(displays.iter()
            .filter(|d| include_invalid || d.is_valid())
            .map(DisplayRef::info)
            .collect())
    }

    /// The single display matching `id`.
    pub fn get_display_ref(&self, id: &DisplayIdentifier) -> Result<DisplayRef, Error> {
        let displays = self.displays.as_ref().ok_or(Error::Uninitialized)?;
        let mut matches = displays.iter().filter(|d| d.matches(id));
        match (matches.next(), matches.count()) {
            (None, _) => Err(Error::DisplayNotFound),
            (Some(dref), 0) => Ok(dref.clone()),
            (Some(_), rest) => Err(Error::AmbiguousDisplay(rest + 1)),
        }
    }

    /// The first valid display matching `id`.
    pub(crate) fn find_display_ref(&self, id: &DisplayIdentifier) -> Result<DisplayRef, Error> {
        let displays = self.displays.as_ref().ok_or(Error::Uninitialized)?;
        displays.iter()
            .find(|d| d.is_valid() && d.matches(id))
            .cloned()
            .ok_or(Error::DisplayNotFound)
    }

    /// Opens a display.
    ///
    /// Fails with `Locked` if it's already open, unless `wait` asks to block
    /// until the other handle closes.
    pub fn open_display(&self, dref: &DisplayRef, wait: bool) -> Result<DisplayHandle, Error> {
        self.open(dref, if wait { Wait::Forever } else { Wait::No })
    }

    /// Opens a display, waiting at most `timeout` for another handle to close.
    pub fn open_display_timeout(&self, dref: &DisplayRef, timeout: Duration) -> Result<DisplayHandle, Error> {
        self.open(dref, Wait::Until(Instant::now() + timeout))
    }

    fn open(&self, dref: &DisplayRef, wait: Wait) -> Result<DisplayHandle, Error> {
        dref.acquire(wait)?;
        match dref.open_transport() {
            Ok(transport) => {
                tracing::debug!(display = %dref, "opened");
                Ok(DisplayHandle::new(dref.clone(), transport))
            },
            Err(e) => {
                dref.release();
                Err(e)
            },
        }
    }
}

/// Asks for the MCCS version to find out whether DDC/CI works at all.
fn check_ddc(session: &Session, backend: &dyn Backend, path: &IoPath) -> (bool, MccsVersion) {
    let mut channel = match backend.open(path) {
        Ok(transport) => Channel::new(transport),
        Err(e) => {
            dbgtrc!(session, TraceGroup::TOP, "check_ddc", path = %path, error = %e, "open failed");
            return (false, MccsVersion::Unqueried)
        },
    };

    let res = match channel.get_vcp_feature(session, 0xdf) {
        Ok(reply) => (true, MccsVersion::from_vcp_reply(&reply.value)),
        Err(ref e) if e.is_unsupported() => (true, MccsVersion::Unknown),
        Err(e) => {
            dbgtrc!(session, TraceGroup::TOP, "check_ddc", path = %path, error = %e, "DDC/CI communication failed");
            (false, MccsVersion::Unqueried)
        },
    };
    channel.sleep();
    res
}
