#![deny(missing_docs)]

//! Control displays using the DDC/CI protocol.
//!
//! Displays are found by a `Registry`, which hands out `DisplayRef`s and
//! arbitrates exclusive `DisplayHandle`s to them. Every exchange is retried
//! under per-class bounds, feature codes resolve to MCCS metadata for the
//! display's version, and user feature definition files can describe
//! manufacturer specific features.
//!
//! # Example
//!
//! ```rust,no_run
//! use ddc_control::{Config, DisplayIdentifier, Registry, Session};
//!
//! let session = Session::new();
//! let mut registry = Registry::new(Config::default());
//! registry.detect(&session).unwrap();
//!
//! for info in registry.display_info_list(false).unwrap() {
//!     println!("{}: {} {} ({})", info.dispno, info.mfg_id, info.model, info.path);
//! }
//!
//! let dref = registry.get_display_ref(&DisplayIdentifier::busno(4)).unwrap();
//! let mut handle = registry.open_display(&dref, false).unwrap();
//! let mccs_version = handle.mccs_version(&session).unwrap();
//! println!("MCCS version: {}", mccs_version);
//! ```

#[macro_use]
mod trace;
pub use crate::trace::{TraceGroup, TraceOptions, TraceSettings};

/// EDID EEPROM I2C address
pub const I2C_ADDRESS_EDID: u16 = 0x50;

/// DDC/CI command and control I2C address
pub const I2C_ADDRESS_DDC_CI: u16 = 0x37;

/// DDC sub-address command prefix
pub const SUB_ADDRESS_DDC_CI: u8 = 0x51;

/// Delay owed to a display after a command fails.
pub(crate) const DELAY_COMMAND_FAILED_MS: u64 = 40;

/// Nominal wait between a request and reading its reply.
pub const DELAY_RESPONSE_MS: u64 = 40;

/// DDC/CI command request and response types.
pub mod commands;
pub use crate::commands::{Command, CommandResult};

pub mod frame;

pub mod transport;
pub use crate::transport::{Backend, IoMode, IoPath, Transport};

pub mod metadata;
pub use crate::metadata::{DeprecatedPolicy, FeatureMetadata, UserFeatures};

pub mod retry;
pub use crate::retry::RetryType;

pub mod stats;
pub use crate::stats::StatsSnapshot;

mod caps;
pub use crate::caps::{parse_capabilities, Capabilities, CapabilityFeature};

mod config;
pub use crate::config::Config;

mod delay;
pub use crate::delay::{Delay, MAX_SLEEP_MULTIPLIER};

mod display;
pub use crate::display::{DisplayIdentifier, DisplayInfo, DisplayRef, EdidInfo};

mod error;
pub use crate::error::{Error, ErrorCode, ErrorDetail};

mod feature_list;
pub use crate::feature_list::{FeatureList, FeatureSubset};

mod handle;
pub use crate::handle::DisplayHandle;

mod profile;
pub use crate::profile::ProfileValues;

mod registry;
pub use crate::registry::Registry;

mod session;
pub use crate::session::{
    CaptureOptions, OutputLevel, Session,
    default_sleep_multiplier, set_default_sleep_multiplier,
    thread_sleep_multiplier, set_thread_sleep_multiplier,
    thread_verify, set_thread_verify,
    thread_output_level, set_thread_output_level,
    is_report_ddc_errors_enabled, enable_report_ddc_errors,
};

mod status;
pub use crate::status::{Status, StatusRange};

mod value;
pub use crate::value::{NonTableValue, ValueType, VcpValue};

mod version;
pub use crate::version::MccsVersion;

/// Optional functionality compiled into this build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Linux i2c-dev displays are detected.
    pub i2c: bool,
    /// USB HID monitors are supported.
    pub usb: bool,
    /// Vendor display adapter transports are available.
    pub adapter: bool,
}

/// Functionality compiled into this build.
pub fn build_options() -> BuildOptions {
    BuildOptions {
        i2c: cfg!(all(feature = "i2c-linux", feature = "udev")),
        usb: cfg!(feature = "usb"),
        adapter: true,
    }
}

/// `(major, minor, micro)` of this library.
pub fn version() -> (u32, u32, u32) {
    let part = |s: &str| s.parse().unwrap_or(0);
    (
        part(env!("CARGO_PKG_VERSION_MAJOR")),
        part(env!("CARGO_PKG_VERSION_MINOR")),
        part(env!("CARGO_PKG_VERSION_PATCH")),
    )
}

/// This library's version as a string.
pub fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #[test]
    fn version() {
        let (major, minor, micro) = super::version();
        assert_eq!(super::version_string(), format!("{}.{}.{}", major, minor, micro));
        assert!(super::build_options().adapter);
    }
}
