use std::path::PathBuf;
use crate::metadata::DeprecatedPolicy;

/// I2C adapters that never lead to a display (from ddcutil's ignorable sysfs names).
pub const DEFAULT_I2C_SKIP_PREFIXES: &[&str] = &[
    "SMBus",
    "soc:i2cdsi",
    "smu",
    "mac-io",
    "u4",
];

/// Registry configuration.
///
/// # Example
///
/// ```rust
/// use ddc_control::{Config, DeprecatedPolicy};
///
/// let config = Config::default()
///     .with_usb_detection(false)
///     .with_udf_search_path("/etc/ddc-control")
///     .with_deprecated_policy(DeprecatedPolicy::Exclude);
/// assert!(!config.usb_detection);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Scan for USB HID monitors.
    pub usb_detection: bool,
    /// Directories searched, in order, for user feature definition files.
    pub udf_search_paths: Vec<PathBuf>,
    /// I2C adapter name prefixes skipped during the bus scan.
    pub i2c_skip_prefixes: Vec<String>,
    /// Whether deprecated features resolve.
    pub deprecated_policy: DeprecatedPolicy,
    /// Keep displays whose DDC/CI check failed, with display number -1.
    pub keep_invalid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            usb_detection: cfg!(feature = "usb"),
            udf_search_paths: dirs::config_dir().map(|dir| dir.join("ddcutil")).into_iter().collect(),
            i2c_skip_prefixes: DEFAULT_I2C_SKIP_PREFIXES.iter().map(|&p| p.to_owned()).collect(),
            deprecated_policy: DeprecatedPolicy::default(),
            keep_invalid: true,
        }
    }
}

impl Config {
    #[allow(missing_docs)]
    pub fn with_usb_detection(mut self, enable: bool) -> Self {
        self.usb_detection = enable;
        self
    }

    /// Appends a search directory for user feature definitions.
    pub fn with_udf_search_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.udf_search_paths.push(path.into());
        self
    }

    /// Replaces the search directories for user feature definitions.
    pub fn with_udf_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.udf_search_paths = paths;
        self
    }

    #[allow(missing_docs)]
    pub fn with_i2c_skip_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.i2c_skip_prefixes = prefixes;
        self
    }

    #[allow(missing_docs)]
    pub fn with_deprecated_policy(mut self, policy: DeprecatedPolicy) -> Self {
        self.deprecated_policy = policy;
        self
    }

    #[allow(missing_docs)]
    pub fn with_keep_invalid(mut self, keep: bool) -> Self {
        self.keep_invalid = keep;
        self
    }
}
