//! Open displays and the VCP operations on them.

use std::convert::TryFrom;
use std::fmt;
use std::time::Duration;
use crate::caps::{self, Capabilities};
use crate::commands::{self, Command, CommandResult, Fragment, FeatureCode, VcpReply};
use crate::delay::Delay;
use crate::display::DisplayRef;
use crate::error::{Error, ErrorCode};
use crate::feature_list::{FeatureList, FeatureSubset};
use crate::frame;
use crate::metadata::{self, FeatureMetadata, Origin};
use crate::retry::{Retry, RetryType};
use crate::session::Session;
use crate::stats;
use crate::trace::TraceGroup;
use crate::transport::{IoPath, Transport};
use crate::value::{NonTableValue, ValueType, VcpValue};
use crate::version::MccsVersion;
use crate::DELAY_COMMAND_FAILED_MS;

/// A transport together with the inter-command delay owed to the display.
pub(crate) struct Channel {
    path: IoPath,
    transport: Option<Box<dyn Transport>>,
    delay: Delay,
}

impl Channel {
    pub(crate) fn new(transport: Box<dyn Transport>) -> Self {
        Channel {
            path: transport.io_path(),
            transport: Some(transport),
            delay: Default::default(),
        }
    }

    pub(crate) fn io_path(&self) -> IoPath {
        self.path
    }

    /// Releases the underlying transport; later commands fail.
    pub(crate) fn shutdown(&mut self) {
        self.transport = None;
    }

    /// Waits for any previous command to complete.
    pub(crate) fn sleep(&mut self) {
        self.delay.sleep()
    }

    /// Executes one DDC/CI command, with no retries.
    pub(crate) fn execute<C: Command>(&mut self, session: &Session, command: C) -> Result<C::Ok, Error> {
        let mut data = [0u8; frame::MAX_PAYLOAD_LEN];
        let len = command.encode(&mut data)?;
        let request = &data[..len];

        let mut out = [0u8; frame::MAX_PACKET_LEN];
        let out = match C::Ok::MAX_LEN {
            0 => &mut out[..0],
            max => &mut out[..max + 3],
        };

        let path = self.path;
        let transport = self.transport.as_mut()
            .ok_or_else(|| Error::InvalidOperation(format!("{} is closed", path)))?;
        self.delay.sleep();
        stats::record_call(path.mode());
        dbgtrc!(session, TraceGroup::DDCIO, "execute", path = %path, request = ?request, "sending");

        let res = match transport.execute_raw(request, out, session.scale(Duration::from_millis(C::DELAY_RESPONSE_MS))) {
            Ok(reply) => {
                dbgtrc!(session, TraceGroup::DDCIO, "execute", path = %path, reply = ?reply, "received");
                C::Ok::decode(reply).map_err(Error::from)
            },
            Err(e) => Err(e),
        };

        let delay = match res {
            Ok(..) => C::DELAY_COMMAND_MS,
            Err(..) => DELAY_COMMAND_FAILED_MS,
        };
        self.delay = Delay::new(session.command_delay(Duration::from_millis(delay)));

        res
    }

    /// Reads a non-table feature, retrying transient faults.
    pub(crate) fn get_vcp_feature(&mut self, session: &Session, code: FeatureCode) -> Result<VcpReply, Error> {
        Retry::new(session, RetryType::WriteRead).run(|_| {
            let reply = self.execute(session, commands::GetVcpFeature::new(code))?;
            if reply.code != code {
                return Err(ErrorCode::Invalid(format!("reply for feature 0x{:02x}, expected 0x{:02x}", reply.code, code)).into())
            }
            Ok(reply)
        }).map(|r| r.into_inner())
    }

    /// Runs a fragmented read to completion, restarting it as a whole on failure.
    pub(crate) fn read_multi_part<C, F>(&mut self, session: &Session, command: F) -> Result<Vec<u8>, Error> where
        C: Command,
        C::Ok: Fragment,
        F: Fn(u16) -> C,
    {
        Retry::new(session, RetryType::MultiPart).run(|_| {
            let mut value = Vec::new();
            let mut offset = 0u16;
            loop {
                let fragment = Retry::new(session, RetryType::WriteRead)
                    .run(|_| self.execute(session, command(offset)))?
                    .into_inner();
                if fragment.offset() != offset {
                    return Err(ErrorCode::InvalidOffset.into())
                } else if fragment.bytes().is_empty() {
                    break
                }

                value.extend_from_slice(fragment.bytes());
                if value.len() > commands::MAX_MULTI_PART_LEN {
                    return Err(Error::BadData {
                        detail: format!("multi-part reply exceeds {} bytes", commands::MAX_MULTI_PART_LEN),
                        causes: Vec::new(),
                    })
                }
                offset = u16::try_from(value.len())
                    .map_err(|_| Error::Ddc(ErrorCode::InvalidOffset))?;
            }

            Ok(value)
        }).map(|r| r.into_inner())
    }

    /// Writes a table value in fragments, restarting it as a whole on failure.
    pub(crate) fn write_table(&mut self, session: &Session, code: FeatureCode, value: &[u8]) -> Result<(), Error> {
        if value.len() > commands::MAX_MULTI_PART_LEN {
            return Err(Error::InvalidArgument(format!("table value longer than {} bytes", commands::MAX_MULTI_PART_LEN)))
        }

        Retry::new(session, RetryType::MultiPart).run(|_| {
            for (i, chunk) in value.chunks(commands::TABLE_FRAGMENT_LEN).enumerate() {
                let offset = u16::try_from(i * commands::TABLE_FRAGMENT_LEN)
                    .map_err(|_| Error::InvalidArgument("table offset out of range".into()))?;
                Retry::new(session, RetryType::WriteOnly)
                    .run(|_| self.execute(session, commands::TableWrite::new(code, offset, chunk)))?;
            }

            Ok(())
        }).map(drop)
    }
}

/// An open display.
///
/// A display has at most one open handle at a time. The handle is released
/// when dropped.
///
/// # Example
///
/// ```rust,no_run
/// use ddc_control::{Config, DisplayIdentifier, Registry, Session};
///
/// let session = Session::new();
/// let mut registry = Registry::new(Config::default());
/// registry.detect(&session).unwrap();
///
/// let dref = registry.get_display_ref(&DisplayIdentifier::dispno(1).unwrap()).unwrap();
/// let mut handle = registry.open_display(&dref, false).unwrap();
/// let brightness = handle.get_non_table_vcp_value(&session, 0x10).unwrap();
/// println!("brightness {}/{}", brightness.value(), brightness.maximum());
/// ```
pub struct DisplayHandle {
    dref: DisplayRef,
    channel: Channel,
}

impl DisplayHandle {
    pub(crate) fn new(dref: DisplayRef, transport: Box<dyn Transport>) -> Self {
        DisplayHandle {
            dref,
            channel: Channel::new(transport),
        }
    }

    /// The display this handle is open on.
    pub fn display_ref(&self) -> &DisplayRef {
        &self.dref
    }

    #[allow(missing_docs)]
    pub fn io_path(&self) -> IoPath {
        self.channel.io_path()
    }

    /// The display's MCCS version, asking the display on first use.
    pub fn mccs_version(&mut self, session: &Session) -> Result<MccsVersion, Error> {
        let res = self.query_version(session);
        session.record(res)
    }

    pub(crate) fn query_version(&mut self, session: &Session) -> Result<MccsVersion, Error> {
        let version = self.dref.mccs_version();
        if version.is_queried() {
            return Ok(version)
        }

        let version = match self.channel.get_vcp_feature(session, 0xdf) {
            Ok(reply) => MccsVersion::from_vcp_reply(&reply.value),
            Err(ref e) if e.is_unsupported() => MccsVersion::Unknown,
            Err(e) => return Err(e),
        };
        self.dref.set_mccs_version(version);
        Ok(version)
    }

    /// Metadata lookups depend on the version, but a display that won't say is still usable.
    fn ensure_version(&mut self, session: &Session) {
        if let Err(e) = self.query_version(session) {
            dbgtrc!(session, TraceGroup::VCP, "ensure_version", display = %self.dref, error = %e, "MCCS version unavailable");
        }
    }

    /// Reads a non-table feature.
    pub fn get_non_table_vcp_value(&mut self, session: &Session, code: FeatureCode) -> Result<NonTableValue, Error> {
        let res = self.read_non_table(session, code);
        session.record(res)
    }

    pub(crate) fn read_non_table(&mut self, session: &Session, code: FeatureCode) -> Result<NonTableValue, Error> {
        let value = self.channel.get_vcp_feature(session, code)?.value;
        dbgtrc!(session, TraceGroup::VCP, "get_non_table_vcp_value", code, value = ?value, "read");
        Ok(value)
    }

    /// Reads a table feature.
    pub fn get_table_vcp_value(&mut self, session: &Session, code: FeatureCode) -> Result<Vec<u8>, Error> {
        let res = self.read_table(session, code);
        session.record(res)
    }

    fn read_table(&mut self, session: &Session, code: FeatureCode) -> Result<Vec<u8>, Error> {
        let value = self.channel.read_multi_part(session, |offset| commands::TableRead::new(code, offset))?;
        dbgtrc!(session, TraceGroup::VCP, "get_table_vcp_value", code, len = value.len(), "read");
        Ok(value)
    }

    /// Reads a feature using an explicit value type.
    pub fn get_vcp_value(&mut self, session: &Session, code: FeatureCode, value_type: ValueType) -> Result<VcpValue, Error> {
        let res = self.read_value(session, code, value_type);
        session.record(res)
    }

    fn read_value(&mut self, session: &Session, code: FeatureCode, value_type: ValueType) -> Result<VcpValue, Error> {
        match value_type {
            ValueType::NonTable => self.read_non_table(session, code).map(VcpValue::NonTable),
            ValueType::Table => self.read_table(session, code).map(VcpValue::Table),
        }
    }

    /// Reads a feature, taking its value type from the feature's metadata.
    ///
    /// Codes without metadata fail with `UnknownFeature`.
    pub fn get_vcp_value_implicit(&mut self, session: &Session, code: FeatureCode) -> Result<VcpValue, Error> {
        self.ensure_version(session);
        let res = self.dref.feature_metadata(code, false)
            .and_then(|metadata| self.read_value(session, code, metadata.value_type()));
        session.record(res)
    }

    /// Writes a non-table feature.
    ///
    /// With verification enabled on the session, readable features are read
    /// back and compared.
    pub fn set_non_table_vcp_value(&mut self, session: &Session, code: FeatureCode, hi: u8, lo: u8) -> Result<(), Error> {
        let res = self.write_non_table(session, code, hi, lo);
        session.record(res)
    }

    pub(crate) fn write_non_table(&mut self, session: &Session, code: FeatureCode, hi: u8, lo: u8) -> Result<(), Error> {
        let channel = &mut self.channel;
        Retry::new(session, RetryType::WriteOnly)
            .run(|_| channel.execute(session, commands::SetVcpFeature::from_bytes(code, hi, lo)))?;
        dbgtrc!(session, TraceGroup::VCP, "set_non_table_vcp_value", code, hi, lo, "written");

        if session.is_verify_enabled() && self.is_readable(session, code) {
            let read = self.read_non_table(session, code)?;
            if (read.sh, read.sl) != (hi, lo) {
                return Err(Error::Verify {
                    code,
                    written: vec![hi, lo],
                    read: vec![read.sh, read.sl],
                })
            }
        }

        Ok(())
    }

    /// Writes a table feature.
    pub fn set_table_vcp_value(&mut self, session: &Session, code: FeatureCode, value: &[u8]) -> Result<(), Error> {
        let res = self.write_table(session, code, value);
        session.record(res)
    }

    fn write_table(&mut self, session: &Session, code: FeatureCode, value: &[u8]) -> Result<(), Error> {
        if value.is_empty() {
            return Err(Error::InvalidArgument("empty table value".into()))
        }

        self.channel.write_table(session, code, value)?;
        dbgtrc!(session, TraceGroup::VCP, "set_table_vcp_value", code, len = value.len(), "written");

        if session.is_verify_enabled() && self.is_readable(session, code) {
            let read = self.read_table(session, code)?;
            if read != value {
                return Err(Error::Verify {
                    code,
                    written: value.to_owned(),
                    read,
                })
            }
        }

        Ok(())
    }

    /// Writes a tagged value.
    ///
    /// The value's type must match the feature's metadata, unless the
    /// metadata had to be synthesized.
    pub fn set_vcp_value(&mut self, session: &Session, code: FeatureCode, value: &VcpValue) -> Result<(), Error> {
        self.ensure_version(session);
        let res = self.dref.feature_metadata(code, true).and_then(|metadata| {
            if metadata.origin != Origin::Synthetic && metadata.value_type() != value.value_type() {
                return Err(Error::InvalidArgument(format!("feature 0x{:02x} takes a {:?} value", code, metadata.value_type())))
            }

            match *value {
                VcpValue::NonTable(ref v) => self.write_non_table(session, code, v.sh, v.sl),
                VcpValue::Table(ref v) => self.write_table(session, code, v),
            }
        });
        session.record(res)
    }

    fn is_readable(&mut self, session: &Session, code: FeatureCode) -> bool {
        self.ensure_version(session);
        self.dref.feature_metadata(code, true)
            .map(|metadata| metadata.access().is_readable())
            .unwrap_or(false)
    }

    /// Asks the display to store its current settings.
    pub fn save_current_settings(&mut self, session: &Session) -> Result<(), Error> {
        let channel = &mut self.channel;
        let res = Retry::new(session, RetryType::WriteOnly)
            .run(|_| channel.execute(session, commands::SaveCurrentSettings))
            .map(drop);
        session.record(res)
    }

    /// The display's capabilities string, read once and cached on the display.
    pub fn capabilities_string(&mut self, session: &Session) -> Result<String, Error> {
        let res = self.read_capabilities(session);
        session.record(res)
    }

    fn read_capabilities(&mut self, session: &Session) -> Result<String, Error> {
        if let Some(caps) = self.dref.cached_capabilities() {
            return Ok(caps)
        }

        let mut bytes = self.channel.read_multi_part(session, commands::CapabilitiesRequest::new)?;
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        let caps = String::from_utf8_lossy(&bytes).into_owned();
        dbgtrc!(session, TraceGroup::DDC, "capabilities_string", display = %self.dref, caps = %caps, "read");
        self.dref.cache_capabilities(caps.clone());
        Ok(caps)
    }

    /// The display's parsed capabilities.
    pub fn parsed_capabilities(&mut self, session: &Session) -> Result<Capabilities, Error> {
        let res = self.read_capabilities(session).map(|s| caps::parse_capabilities(&s));
        session.record(res)
    }

    /// Metadata for a feature at this display's MCCS version.
    pub fn feature_metadata(&mut self, session: &Session, code: FeatureCode, create_default: bool) -> Result<FeatureMetadata, Error> {
        self.ensure_version(session);
        let res = self.dref.feature_metadata(code, create_default);
        session.record(res)
    }

    /// The codes in a feature subset for this display.
    ///
    /// `Capabilities` lists what the display's capabilities string declares.
    pub fn feature_list(&mut self, session: &Session, subset: FeatureSubset, include_table: bool) -> Result<FeatureList, Error> {
        self.ensure_version(session);
        let res = match subset {
            FeatureSubset::Capabilities => self.read_capabilities(session)
                .map(|s| caps::parse_capabilities(&s).feature_list()),
            subset => metadata::feature_list(subset, self.dref.mccs_version(), self.dref.config().deprecated_policy, include_table),
        };
        session.record(res)
    }

    /// Loads user feature definitions for this display.
    pub fn dfr_check(&self, session: &Session) -> Result<(), Error> {
        session.record(self.dref.dfr_check())
    }

    /// Waits out the command delay and releases the display.
    pub fn close(mut self) -> Result<(), Error> {
        self.channel.sleep();
        Ok(())
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.channel.shutdown();
        self.dref.release()
    }
}

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DisplayHandle")
            .field("display", &self.dref)
            .field("path", &self.channel.io_path())
            .finish()
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Display handle for {}", self.dref)
    }
}
