//! Trace group selection.
//!
//! Trace output goes through `tracing`. Call sites that belong to an enabled
//! group, or sit in an enabled function or file, log at `debug`; everything
//! else logs at `trace`.

use std::collections::BTreeSet;
use std::{fmt, ops};

/// A set of trace groups.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceGroup(u16);

const GROUP_NAMES: &[(TraceGroup, &str)] = &[
    (TraceGroup::BASE, "BASE"),
    (TraceGroup::I2C, "I2C"),
    (TraceGroup::ADL, "ADL"),
    (TraceGroup::DDC, "DDC"),
    (TraceGroup::USB, "USB"),
    (TraceGroup::TOP, "TOP"),
    (TraceGroup::ENV, "ENV"),
    (TraceGroup::API, "API"),
    (TraceGroup::UDF, "UDF"),
    (TraceGroup::VCP, "VCP"),
    (TraceGroup::DDCIO, "DDCIO"),
    (TraceGroup::SLEEP, "SLEEP"),
    (TraceGroup::RETRY, "RETRY"),
];

impl TraceGroup {
    #![allow(missing_docs)]
    pub const NONE: TraceGroup = TraceGroup(0);
    pub const API: TraceGroup = TraceGroup(0x0001);
    pub const ENV: TraceGroup = TraceGroup(0x0002);
    pub const TOP: TraceGroup = TraceGroup(0x0004);
    pub const USB: TraceGroup = TraceGroup(0x0008);
    pub const DDC: TraceGroup = TraceGroup(0x0010);
    pub const ADL: TraceGroup = TraceGroup(0x0020);
    pub const I2C: TraceGroup = TraceGroup(0x0040);
    pub const BASE: TraceGroup = TraceGroup(0x0080);
    pub const UDF: TraceGroup = TraceGroup(0x0100);
    pub const VCP: TraceGroup = TraceGroup(0x0200);
    pub const DDCIO: TraceGroup = TraceGroup(0x0400);
    pub const SLEEP: TraceGroup = TraceGroup(0x0800);
    pub const RETRY: TraceGroup = TraceGroup(0x1000);
    pub const ALL: TraceGroup = TraceGroup(0xffff);

    pub fn from_bits(bits: u16) -> Self {
        TraceGroup(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// Whether any group in `other` is enabled in `self`.
    pub fn intersects(self, other: TraceGroup) -> bool {
        self.0 & other.0 != 0
    }

    /// Looks up a single group by its case-insensitive name. `ALL` and `NONE` are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "ALL" => Some(TraceGroup::ALL),
            "NONE" => Some(TraceGroup::NONE),
            upper => GROUP_NAMES.iter()
                .find(|&&(_, n)| n == upper)
                .map(|&(g, _)| g),
        }
    }

    /// Name of a single group.
    pub fn name(self) -> Option<&'static str> {
        match self {
            TraceGroup::ALL => Some("ALL"),
            TraceGroup::NONE => Some("NONE"),
            group => GROUP_NAMES.iter()
                .find(|&&(g, _)| g == group)
                .map(|&(_, n)| n),
        }
    }
}

impl ops::BitOr for TraceGroup {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        TraceGroup(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for TraceGroup {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl fmt::Display for TraceGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name)
        }

        let mut first = true;
        for &(group, name) in GROUP_NAMES {
            if self.intersects(group) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Extra fields attached to traced messages.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceOptions {
    /// Attach the elapsed time since process start.
    pub timestamp: bool,
    /// Attach the calling thread's id.
    pub thread_id: bool,
}

/// Which call sites are traced for a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceSettings {
    groups: TraceGroup,
    functions: BTreeSet<String>,
    files: BTreeSet<String>,
    options: TraceOptions,
}

impl TraceSettings {
    #[allow(missing_docs)]
    pub fn groups(&self) -> TraceGroup {
        self.groups
    }

    /// Replaces the enabled group set.
    pub fn set_groups(&mut self, groups: TraceGroup) {
        self.groups = groups
    }

    /// Adds groups by name, e.g. `"DDC,RETRY"`. Returns false on an unknown name, leaving groups unchanged.
    pub fn add_group_names(&mut self, names: &str) -> bool {
        let mut groups = self.groups;
        for name in names.split(|c: char| c == ',' || c.is_whitespace()).filter(|n| !n.is_empty()) {
            match TraceGroup::from_name(name) {
                Some(g) => groups |= g,
                None => return false,
            }
        }
        self.groups = groups;
        true
    }

    /// Traces every call site in the named function.
    pub fn add_function<S: Into<String>>(&mut self, function: S) {
        self.functions.insert(function.into());
    }

    /// Traces every call site in the named source file, with or without `.rs`.
    pub fn add_file(&mut self, file: &str) {
        self.files.insert(file_stem(file).to_owned());
    }

    #[allow(missing_docs)]
    pub fn options(&self) -> TraceOptions {
        self.options
    }

    #[allow(missing_docs)]
    pub fn set_options(&mut self, options: TraceOptions) {
        self.options = options
    }

    /// Whether a call site should be elevated to `debug`.
    pub fn is_traced(&self, group: TraceGroup, file: &str, function: &str) -> bool {
        self.groups.intersects(group) ||
            self.functions.contains(function) ||
            self.files.contains(file_stem(file))
    }
}

fn file_stem(file: &str) -> &str {
    let base = file.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(file);
    base.strip_suffix(".rs").unwrap_or(base)
}

/// Logs at `debug` when the call site is traced for the session, `trace` otherwise.
macro_rules! dbgtrc {
    ($session:expr, $group:expr, $function:expr, $($arg:tt)+) => {{
        let settings = $session.trace();
        let group: $crate::trace::TraceGroup = $group;
        if settings.is_traced(group, file!(), $function) {
            let options = settings.options();
            let thread = ::std::thread::current().id();
            let elapsed = $crate::stats::process_elapsed();
            match (options.thread_id, options.timestamp) {
                (true, true) => tracing::debug!(group = %group, thread = ?thread, elapsed = ?elapsed, $($arg)+),
                (true, false) => tracing::debug!(group = %group, thread = ?thread, $($arg)+),
                (false, true) => tracing::debug!(group = %group, elapsed = ?elapsed, $($arg)+),
                (false, false) => tracing::debug!(group = %group, $($arg)+),
            }
        } else {
            tracing::trace!($($arg)+);
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(TraceGroup::from_name("retry"), Some(TraceGroup::RETRY));
        assert_eq!(TraceGroup::from_name("bogus"), None);
        assert_eq!((TraceGroup::DDC | TraceGroup::I2C).to_string(), "I2C|DDC");
        assert_eq!(TraceGroup::ALL.to_string(), "ALL");
    }

    #[test]
    fn settings() {
        let mut settings = TraceSettings::default();
        assert!(!settings.is_traced(TraceGroup::DDC, "src/handle.rs", "get_vcp"));

        assert!(settings.add_group_names("DDC, retry"));
        assert!(!settings.add_group_names("DDC,nope"));
        assert!(settings.is_traced(TraceGroup::DDC, "src/handle.rs", "x"));
        assert!(settings.is_traced(TraceGroup::RETRY, "src/retry.rs", "x"));
        assert!(!settings.is_traced(TraceGroup::UDF, "src/metadata/udf.rs", "x"));

        settings.add_file("udf.rs");
        assert!(settings.is_traced(TraceGroup::UDF, "src/metadata/udf.rs", "x"));

        settings.add_function("detect");
        assert!(settings.is_traced(TraceGroup::NONE, "src/registry.rs", "detect"));
    }
}
