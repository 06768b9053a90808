use std::fmt;
use std::str::FromStr;
use mccs::Version;
use crate::value::NonTableValue;

/// The MCCS version a display implements.
///
/// A freshly detected display starts out `Unqueried`. Querying it yields
/// either a concrete version or `Unknown` when the display doesn't say.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MccsVersion {
    /// Never asked.
    Unqueried,
    /// Asked, but no usable answer.
    Unknown,
    /// A concrete version.
    Known(Version),
}

impl MccsVersion {
    /// MCCS 1.0
    ///
    /// Feature metadata for 1.0 displays comes from the 2.0 tables.
    pub const V10: MccsVersion = MccsVersion::Known(Version { major: 1, minor: 0 });
    /// MCCS 2.0
    pub const V20: MccsVersion = MccsVersion::Known(Version { major: 2, minor: 0 });
    /// MCCS 2.1
    pub const V21: MccsVersion = MccsVersion::Known(Version { major: 2, minor: 1 });
    /// MCCS 2.2
    pub const V22: MccsVersion = MccsVersion::Known(Version { major: 2, minor: 2 });
    /// MCCS 3.0
    pub const V30: MccsVersion = MccsVersion::Known(Version { major: 3, minor: 0 });

    /// Builds a version from its parts. `0.0` means the display didn't know.
    pub fn new(major: u8, minor: u8) -> Self {
        match (major, minor) {
            (0, 0) => MccsVersion::Unknown,
            (major, minor) => MccsVersion::Known(Version::new(major, minor)),
        }
    }

    /// Interprets the reply to a VCP version (0xdf) query.
    pub fn from_vcp_reply(value: &NonTableValue) -> Self {
        MccsVersion::new(value.sh, value.sl)
    }

    /// `(major, minor)` if known.
    pub fn major_minor(&self) -> Option<(u8, u8)> {
        match *self {
            MccsVersion::Known(ref v) => Some((v.major, v.minor)),
            _ => None,
        }
    }

    /// Whether a concrete version is known.
    pub fn is_known(&self) -> bool {
        self.major_minor().is_some()
    }

    /// Whether the version has been asked for.
    pub fn is_queried(&self) -> bool {
        *self != MccsVersion::Unqueried
    }
}

impl Default for MccsVersion {
    fn default() -> Self {
        MccsVersion::Unqueried
    }
}

impl From<Version> for MccsVersion {
    fn from(v: Version) -> Self {
        MccsVersion::new(v.major, v.minor)
    }
}

impl FromStr for MccsVersion {
    type Err = ();

    /// Parses `2.1` or `02.01` style versions.
    fn from_str(s: &str) -> Result<Self, ()> {
        let mut parts = s.trim().splitn(2, '.');
        let major = parts.next().ok_or(())?.parse::<u8>().map_err(|_| ())?;
        let minor = parts.next().ok_or(())?.parse::<u8>().map_err(|_| ())?;
        Ok(MccsVersion::new(major, minor))
    }
}

impl fmt::Display for MccsVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MccsVersion::Unqueried => f.write_str("Unqueried"),
            MccsVersion::Unknown => f.write_str("Unknown"),
            MccsVersion::Known(ref v) => write!(f, "{}.{}", v.major, v.minor),
        }
    }
}
