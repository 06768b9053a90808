//! Feature metadata.
//!
//! What a feature code means depends on the MCCS version the display
//! implements: a feature may change category, gain or lose its value names,
//! or be deprecated between versions. Lookups resolve against a display's
//! version, consulting user-defined definitions before the built-in table.

use std::borrow::Cow;
use std::fmt;
use crate::error::Error;
use crate::feature_list::{FeatureList, FeatureSubset};
use crate::value::ValueType;
use crate::version::MccsVersion;

mod table;
pub mod udf;

pub use self::udf::{enable_udf, is_udf_enabled, UserFeature, UserFeatures};

/// Who may read or write a feature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    #[allow(missing_docs)]
    ReadOnly,
    #[allow(missing_docs)]
    WriteOnly,
    #[allow(missing_docs)]
    ReadWrite,
}

impl Access {
    #[allow(missing_docs)]
    pub fn is_readable(self) -> bool {
        self != Access::WriteOnly
    }

    #[allow(missing_docs)]
    pub fn is_writable(self) -> bool {
        self != Access::ReadOnly
    }
}

/// How a feature's value is structured.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Current and maximum value.
    Continuous,
    /// Continuous, but the bytes need feature specific interpretation.
    ComplexContinuous,
    /// One of a fixed set of named values, in `sl`.
    SimpleNc,
    /// Non-continuous with feature specific interpretation.
    ComplexNc,
    /// Named special values plus a continuous range.
    NcContinuous,
    /// Non-continuous and write only.
    WriteOnlyNc,
    /// Byte sequence.
    Table,
    /// Write only byte sequence.
    WriteOnlyTable,
}

impl Category {
    #[allow(missing_docs)]
    pub fn is_continuous(self) -> bool {
        match self {
            Category::Continuous | Category::ComplexContinuous => true,
            _ => false,
        }
    }

    #[allow(missing_docs)]
    pub fn is_non_continuous(self) -> bool {
        match self {
            Category::SimpleNc | Category::ComplexNc | Category::NcContinuous | Category::WriteOnlyNc => true,
            _ => false,
        }
    }

    #[allow(missing_docs)]
    pub fn is_table(self) -> bool {
        match self {
            Category::Table | Category::WriteOnlyTable => true,
            _ => false,
        }
    }

    /// The value representation this category uses.
    pub fn value_type(self) -> ValueType {
        if self.is_table() {
            ValueType::Table
        } else {
            ValueType::NonTable
        }
    }

    #[allow(missing_docs)]
    pub fn name(self) -> &'static str {
        match self {
            Category::Continuous => "Continuous (normal)",
            Category::ComplexContinuous => "Continuous (complex)",
            Category::SimpleNc => "Non-Continuous (simple)",
            Category::ComplexNc => "Non-Continuous (complex)",
            Category::NcContinuous => "Non-Continuous with continuous subrange",
            Category::WriteOnlyNc => "Non-Continuous (write-only)",
            Category::Table => "Table (normal)",
            Category::WriteOnlyTable => "Table (write-only)",
        }
    }
}

/// Version specific feature properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionFlags {
    #[allow(missing_docs)]
    pub access: Access,
    #[allow(missing_docs)]
    pub category: Category,
    /// The feature is deprecated in this version.
    pub deprecated: bool,
}

impl VersionFlags {
    #[allow(missing_docs)]
    pub const fn new(access: Access, category: Category) -> Self {
        VersionFlags {
            access,
            category,
            deprecated: false,
        }
    }

    #[allow(missing_docs)]
    pub const fn deprecated(self) -> Self {
        VersionFlags {
            deprecated: true,
            ..self
        }
    }
}

/// Where a metadata record came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The built-in table.
    Builtin,
    /// A user feature definition file.
    UserDefined,
    /// Made up for a code nothing else knows.
    Synthetic,
}

/// A named value of a simple non-continuous feature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValueEntry {
    #[allow(missing_docs)]
    pub value: u8,
    #[allow(missing_docs)]
    pub name: Cow<'static, str>,
}

impl ValueEntry {
    #[allow(missing_docs)]
    pub const fn new(value: u8, name: &'static str) -> Self {
        ValueEntry {
            value,
            name: Cow::Borrowed(name),
        }
    }
}

/// Whether deprecated features resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeprecatedPolicy {
    /// Deprecated features resolve with their deprecated flag set.
    Include,
    /// Deprecated features resolve as unknown.
    Exclude,
}

impl Default for DeprecatedPolicy {
    fn default() -> Self {
        DeprecatedPolicy::Include
    }
}

/// Everything known about a feature code for one MCCS version.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMetadata {
    #[allow(missing_docs)]
    pub code: u8,
    /// The version this record was resolved for.
    pub version: MccsVersion,
    #[allow(missing_docs)]
    pub name: Cow<'static, str>,
    #[allow(missing_docs)]
    pub description: Cow<'static, str>,
    #[allow(missing_docs)]
    pub flags: VersionFlags,
    #[allow(missing_docs)]
    pub origin: Origin,
    /// Named values, for simple non-continuous features.
    pub values: Option<Cow<'static, [ValueEntry]>>,
}

impl FeatureMetadata {
    #[allow(missing_docs)]
    pub fn access(&self) -> Access {
        self.flags.access
    }

    #[allow(missing_docs)]
    pub fn category(&self) -> Category {
        self.flags.category
    }

    #[allow(missing_docs)]
    pub fn value_type(&self) -> ValueType {
        self.flags.category.value_type()
    }

    #[allow(missing_docs)]
    pub fn is_deprecated(&self) -> bool {
        self.flags.deprecated
    }

    /// Name of one of this feature's values.
    pub fn value_name(&self, value: u8) -> Result<&str, Error> {
        match self.values {
            Some(ref values) => simple_nc_value_name(values, value),
            None => Err(Error::InvalidOperation(format!("feature 0x{:02x} has no named values", self.code))),
        }
    }
}

impl fmt::Display for FeatureMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "VCP code 0x{:02x}: {} ({}, {:?})", self.code, self.name, self.flags.category.name(), self.flags.access)?;
        if self.flags.deprecated {
            f.write_str(" [deprecated]")?;
        }
        Ok(())
    }
}

/// Looks a value up in a value table.
pub fn simple_nc_value_name(values: &[ValueEntry], value: u8) -> Result<&str, Error> {
    values.iter()
        .find(|e| e.value == value)
        .map(|e| &e.name[..])
        .ok_or(Error::NotFound)
}

/// Manufacturer reserved codes are 0xe0 through 0xff.
pub fn is_manufacturer_code(code: u8) -> bool {
    code >= 0xe0
}

/// The built-in name of a feature, regardless of version.
pub fn feature_name(code: u8) -> Option<&'static str> {
    table::find(code).map(|e| e.name)
}

fn builtin(code: u8, version: MccsVersion, policy: DeprecatedPolicy) -> Option<FeatureMetadata> {
    let entry = table::find(code)?;
    let (flags, values) = entry.resolve(version)?;
    if flags.deprecated && policy == DeprecatedPolicy::Exclude {
        return None
    }

    Some(FeatureMetadata {
        code,
        version,
        name: entry.name.into(),
        description: entry.desc.into(),
        flags,
        origin: Origin::Builtin,
        values: values.map(Cow::Borrowed),
    })
}

/// A generic read-write non-continuous record for a code nothing describes.
pub fn synthesize(code: u8, version: MccsVersion) -> FeatureMetadata {
    let (name, description) = if is_manufacturer_code(code) {
        ("Manufacturer Specific", "Feature code reserved for manufacturer use")
    } else {
        ("Unknown feature", "Feature code not in the metadata table")
    };

    FeatureMetadata {
        code,
        version,
        name: name.into(),
        description: description.into(),
        flags: VersionFlags::new(Access::ReadWrite, Category::ComplexNc),
        origin: Origin::Synthetic,
        values: None,
    }
}

/// Resolves a feature code against the built-in table for `version`.
///
/// Codes the table doesn't know fail with `UnknownFeature` unless
/// `create_default` asks for a synthetic record.
pub fn metadata_by_version(code: u8, version: MccsVersion, policy: DeprecatedPolicy, create_default: bool) -> Result<FeatureMetadata, Error> {
    match builtin(code, version, policy) {
        Some(metadata) => Ok(metadata),
        None if create_default => Ok(synthesize(code, version)),
        None => Err(Error::UnknownFeature(code)),
    }
}

/// The codes in a named subset for `version`.
///
/// `Capabilities` and `Custom` depend on a display or the caller and can't be built here.
pub fn feature_list(subset: FeatureSubset, version: MccsVersion, policy: DeprecatedPolicy, include_table: bool) -> Result<FeatureList, Error> {
    let wanted = |entry: &table::FeatureEntry, flags: &VersionFlags| match subset {
        FeatureSubset::Known => true,
        FeatureSubset::Color => entry.subsets & table::COLOR != 0,
        FeatureSubset::Profile => entry.subsets & table::PROFILE != 0 && flags.access == Access::ReadWrite,
        _ => false,
    };

    match subset {
        FeatureSubset::Manufacturer => Ok((0xe0..=0xffu8).collect()),
        FeatureSubset::Scan => Ok((0x00..=0xffu8)
            .filter(|&code| match table::find(code).and_then(|entry| entry.resolve(version)) {
                Some((flags, _)) => flags.access.is_readable() && (include_table || !flags.category.is_table()),
                None => true,
            })
            .collect()),
        FeatureSubset::Capabilities | FeatureSubset::Custom =>
            Err(Error::InvalidArgument(format!("feature subset {} needs a display", subset))),
        _ => Ok(table::entries().iter()
            .filter_map(|entry| entry.resolve(version).map(|(flags, _)| (entry, flags)))
            .filter(|&(_, flags)| !(flags.deprecated && policy == DeprecatedPolicy::Exclude))
            .filter(|&(_, flags)| include_table || !flags.category.is_table())
            .filter(|&(entry, ref flags)| wanted(entry, flags))
            .map(|(entry, _)| entry.code)
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_specific_category() {
        let v21 = metadata_by_version(0x60, MccsVersion::V21, Default::default(), false).unwrap();
        assert_eq!(v21.category(), Category::SimpleNc);
        assert_eq!(v21.value_name(0x11).unwrap(), "HDMI-1");

        let v30 = metadata_by_version(0x60, MccsVersion::V30, Default::default(), false).unwrap();
        assert_eq!(v30.category(), Category::Table);
        assert_eq!(v30.value_type(), ValueType::Table);
        assert!(v30.values.is_none());
    }

    #[test]
    fn unknown_version_uses_21_then_20() {
        let m = metadata_by_version(0x14, MccsVersion::Unknown, Default::default(), false).unwrap();
        assert_eq!(m.category(), Category::SimpleNc);
        let m = metadata_by_version(0x14, MccsVersion::Unqueried, Default::default(), false).unwrap();
        assert_eq!(m.category(), Category::SimpleNc);
    }

    #[test]
    fn deprecation_policy() {
        let m = metadata_by_version(0x13, MccsVersion::V22, DeprecatedPolicy::Include, false).unwrap();
        assert!(m.is_deprecated());
        assert!(metadata_by_version(0x13, MccsVersion::V22, DeprecatedPolicy::Exclude, false).is_err());
        assert!(!metadata_by_version(0x13, MccsVersion::V20, DeprecatedPolicy::Exclude, false).unwrap().is_deprecated());
    }

    #[test]
    fn unknown_codes() {
        match metadata_by_version(0xe0, MccsVersion::V21, Default::default(), false) {
            Err(Error::UnknownFeature(0xe0)) => (),
            r => panic!("unexpected {:?}", r),
        }
        let m = metadata_by_version(0xe0, MccsVersion::V21, Default::default(), true).unwrap();
        assert_eq!(m.origin, Origin::Synthetic);
        assert_eq!(m.category(), Category::ComplexNc);
        assert_eq!(m.access(), Access::ReadWrite);
        assert_eq!(metadata_by_version(0x10, MccsVersion::V21, Default::default(), true).unwrap().origin, Origin::Builtin);
    }

    #[test]
    fn value_names() {
        let m = metadata_by_version(0xd6, MccsVersion::V21, Default::default(), false).unwrap();
        assert_eq!(m.value_name(0x01).unwrap(), "DPM: On,  DPMS: Off");
        match m.value_name(0x7f) {
            Err(Error::NotFound) => (),
            r => panic!("unexpected {:?}", r),
        }
        let brightness = metadata_by_version(0x10, MccsVersion::V21, Default::default(), false).unwrap();
        assert!(brightness.value_name(1).is_err());
    }

    #[test]
    fn subsets() {
        let color = feature_list(FeatureSubset::Color, MccsVersion::V21, Default::default(), false).unwrap();
        assert!(color.contains(0x16) && color.contains(0x14));
        assert!(!color.contains(0x60));

        let profile = feature_list(FeatureSubset::Profile, MccsVersion::V21, Default::default(), false).unwrap();
        assert!(profile.contains(0x10) && profile.contains(0x12));

        let mfg = feature_list(FeatureSubset::Manufacturer, MccsVersion::V21, Default::default(), false).unwrap();
        assert_eq!(mfg.count(), 32);

        let known = feature_list(FeatureSubset::Known, MccsVersion::V30, Default::default(), false).unwrap();
        assert!(!known.contains(0x60));
        let known = feature_list(FeatureSubset::Known, MccsVersion::V30, Default::default(), true).unwrap();
        assert!(known.contains(0x60));

        let scan = feature_list(FeatureSubset::Scan, MccsVersion::V21, Default::default(), false).unwrap();
        assert!(scan.contains(0x07) && scan.contains(0xe5));
        assert!(scan.contains(0x10) && scan.contains(0xdf));
        // write-only
        assert!(!scan.contains(0x01) && !scan.contains(0x04));
        assert!(!scan.contains(0xd2));
        let scan = feature_list(FeatureSubset::Scan, MccsVersion::V21, Default::default(), true).unwrap();
        assert!(scan.contains(0xd2));

        assert!(feature_list(FeatureSubset::Capabilities, MccsVersion::V21, Default::default(), false).is_err());
    }
}
