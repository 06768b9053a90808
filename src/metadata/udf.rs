//! User-defined feature definitions.
//!
//! A definition file describes the features of one monitor model. It is
//! named `MFG-MODEL-PRODUCTCODE.mccs`, spaces in the model replaced by
//! underscores, and is looked up in each search directory in turn.
//!
//! ```text
//! # Comments start with a hash
//! MFG_ID        DEL
//! MODEL         Dell U2715H
//! PRODUCT_CODE  53350
//!
//! FEATURE_CODE  E0 Preset mode
//! ATTRS         RW SNC
//! DESC          Factory picture presets
//! VALUE         01 Standard
//! VALUE         02 Movie
//! ```
//!
//! `ATTRS` takes an access (`RW`, `RO`, `WO`) and a category (`C`, `CCONT`,
//! `SNC`, `CNC`, `NCC`, `T`). Feature codes and values are hex.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use crate::error::Error;
use crate::version::MccsVersion;
use super::{Access, Category, FeatureMetadata, Origin, ValueEntry, VersionFlags};

/// Definition file extension.
pub const FILE_EXTENSION: &str = "mccs";

static UDF_ENABLED: AtomicBool = AtomicBool::new(true);

/// Turns use of user-defined features on or off, returning the previous setting.
pub fn enable_udf(onoff: bool) -> bool {
    UDF_ENABLED.swap(onoff, Ordering::SeqCst)
}

#[allow(missing_docs)]
pub fn is_udf_enabled() -> bool {
    UDF_ENABLED.load(Ordering::SeqCst)
}

/// One feature from a definition file.
#[derive(Clone, Debug, PartialEq)]
pub struct UserFeature {
    #[allow(missing_docs)]
    pub code: u8,
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: String,
    /// Applies to every MCCS version.
    pub flags: VersionFlags,
    /// Named values, in file order.
    pub values: Vec<ValueEntry>,
}

impl UserFeature {
    /// The feature as a metadata record for `version`.
    pub fn metadata(&self, version: MccsVersion) -> FeatureMetadata {
        let values = if self.flags.category.is_non_continuous() && !self.values.is_empty() {
            Some(Cow::Owned(self.values.clone()))
        } else {
            None
        };

        FeatureMetadata {
            code: self.code,
            version,
            name: self.name.clone().into(),
            description: self.description.clone().into(),
            flags: self.flags,
            origin: Origin::UserDefined,
            values,
        }
    }
}

/// The parsed contents of one definition file.
#[derive(Clone, Debug, PartialEq)]
pub struct UserFeatures {
    #[allow(missing_docs)]
    pub mfg_id: String,
    #[allow(missing_docs)]
    pub model: String,
    #[allow(missing_docs)]
    pub product_code: u16,
    features: BTreeMap<u8, UserFeature>,
    source: Option<PathBuf>,
}

/// The file name definitions for a monitor model are stored under.
pub fn file_name(mfg_id: &str, model: &str, product_code: u16) -> String {
    format!("{}-{}-{}.{}", mfg_id, model.replace(' ', "_"), product_code, FILE_EXTENSION)
}

/// Loads the first definition file for a monitor found in `search_paths`.
pub fn find<P: AsRef<Path>>(search_paths: &[P], mfg_id: &str, model: &str, product_code: u16) -> Result<Option<UserFeatures>, Error> {
    let name = file_name(mfg_id, model, product_code);
    for dir in search_paths {
        let path = dir.as_ref().join(&name);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading feature definitions");
            let features = UserFeatures::load(&path)?;
            if !features.matches(mfg_id, model, product_code) {
                return Err(Error::BadData {
                    detail: format!("{} describes {} {} {}", path.display(), features.mfg_id, features.model, features.product_code),
                    causes: Vec::new(),
                })
            }
            return Ok(Some(features))
        }
    }

    Ok(None)
}

fn parse_hex(s: &str) -> Option<u8> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(s, 16).ok()
}

fn parse_product_code(s: &str) -> Option<u16> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

fn parse_attrs(s: &str) -> Result<VersionFlags, String> {
    let mut access = None;
    let mut category = None;
    for token in s.split_whitespace() {
        match &token.to_ascii_uppercase()[..] {
            "RW" => access = Some(Access::ReadWrite),
            "RO" => access = Some(Access::ReadOnly),
            "WO" => access = Some(Access::WriteOnly),
            "C" | "CONT" => category = Some(Category::Continuous),
            "CCONT" => category = Some(Category::ComplexContinuous),
            "NC" | "SNC" => category = Some(Category::SimpleNc),
            "CNC" => category = Some(Category::ComplexNc),
            "NCC" => category = Some(Category::NcContinuous),
            "T" | "TABLE" => category = Some(Category::Table),
            _ => return Err(format!("unrecognized attribute {:?}", token)),
        }
    }

    let access = access.ok_or("missing access attribute")?;
    let category = category.ok_or("missing category attribute")?;
    let category = match (access, category) {
        (Access::WriteOnly, Category::Table) => Category::WriteOnlyTable,
        (Access::WriteOnly, c) if c.is_non_continuous() => Category::WriteOnlyNc,
        (_, c) => c,
    };

    Ok(VersionFlags::new(access, category))
}

struct Pending {
    line: usize,
    code: u8,
    name: String,
    description: String,
    flags: Option<VersionFlags>,
    values: Vec<ValueEntry>,
}

impl UserFeatures {
    /// Parses a definition file's contents.
    ///
    /// Every problem is reported, one cause per offending line.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let mut mfg_id = None;
        let mut model = None;
        let mut product_code = None;
        let mut features = BTreeMap::new();
        let mut pending: Option<Pending> = None;
        let mut errors = Vec::new();

        fn finish(pending: Option<Pending>, features: &mut BTreeMap<u8, UserFeature>, errors: &mut Vec<Error>) {
            let pending = match pending {
                Some(p) => p,
                None => return,
            };
            let flags = match pending.flags {
                Some(flags) => flags,
                None => {
                    errors.push(Error::InvalidArgument(format!("line {}: feature {:02X} has no ATTRS", pending.line, pending.code)));
                    return
                },
            };
            if features.contains_key(&pending.code) {
                errors.push(Error::InvalidArgument(format!("line {}: feature {:02X} defined twice", pending.line, pending.code)));
                return
            }
            features.insert(pending.code, UserFeature {
                code: pending.code,
                name: pending.name,
                description: pending.description,
                flags,
                values: pending.values,
            });
        }

        for (i, line) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue
            }

            let mut parts = line.splitn(2, char::is_whitespace);
            let keyword = parts.next().unwrap_or_default().to_ascii_uppercase();
            let rest = parts.next().unwrap_or_default().trim();

            let result = match &keyword[..] {
                "MFG_ID" => match rest.len() {
                    1..=3 => {
                        mfg_id = Some(rest.to_owned());
                        Ok(())
                    },
                    _ => Err(format!("invalid MFG_ID {:?}", rest)),
                },
                "MODEL" if !rest.is_empty() => {
                    model = Some(rest.to_owned());
                    Ok(())
                },
                "PRODUCT_CODE" => parse_product_code(rest)
                    .map(|pc| product_code = Some(pc))
                    .ok_or_else(|| format!("invalid PRODUCT_CODE {:?}", rest)),
                "FEATURE_CODE" => {
                    let mut words = rest.splitn(2, char::is_whitespace);
                    match words.next().and_then(parse_hex) {
                        Some(code) => {
                            finish(pending.take(), &mut features, &mut errors);
                            pending = Some(Pending {
                                line: lineno,
                                code,
                                name: words.next().unwrap_or_default().trim().to_owned(),
                                description: String::new(),
                                flags: None,
                                values: Vec::new(),
                            });
                            Ok(())
                        },
                        None => Err(format!("invalid FEATURE_CODE {:?}", rest)),
                    }
                },
                "ATTRS" | "DESC" | "VALUE" => match pending {
                    None => Err(format!("{} before any FEATURE_CODE", keyword)),
                    Some(ref mut p) => match &keyword[..] {
                        "ATTRS" => parse_attrs(rest).map(|flags| p.flags = Some(flags)),
                        "DESC" => {
                            p.description = rest.to_owned();
                            Ok(())
                        },
                        _ => {
                            let mut words = rest.splitn(2, char::is_whitespace);
                            match (words.next().and_then(parse_hex), words.next()) {
                                (Some(value), Some(name)) => {
                                    p.values.push(ValueEntry {
                                        value,
                                        name: name.trim().to_owned().into(),
                                    });
                                    Ok(())
                                },
                                _ => Err(format!("invalid VALUE {:?}", rest)),
                            }
                        },
                    },
                },
                _ => Err(format!("unrecognized line {:?}", line)),
            };

            if let Err(what) = result {
                errors.push(Error::InvalidArgument(format!("line {}: {}", lineno, what)));
            }
        }
        finish(pending, &mut features, &mut errors);

        if mfg_id.is_none() {
            errors.push(Error::InvalidArgument("missing MFG_ID".into()));
        }
        if model.is_none() {
            errors.push(Error::InvalidArgument("missing MODEL".into()));
        }
        if product_code.is_none() {
            errors.push(Error::InvalidArgument("missing PRODUCT_CODE".into()));
        }

        match (mfg_id, model, product_code) {
            (Some(mfg_id), Some(model), Some(product_code)) if errors.is_empty() => Ok(UserFeatures {
                mfg_id,
                model,
                product_code,
                features,
                source: None,
            }),
            _ => Err(Error::BadData {
                detail: format!("{} error(s) in feature definitions", errors.len()),
                causes: errors,
            }),
        }
    }

    /// Reads and parses a definition file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match UserFeatures::parse(&contents) {
            Ok(mut features) => {
                features.source = Some(path.to_owned());
                Ok(features)
            },
            Err(Error::BadData { causes, .. }) => Err(Error::BadData {
                detail: format!("{}: {} error(s) in feature definitions", path.display(), causes.len()),
                causes,
            }),
            Err(e) => Err(e),
        }
    }

    /// The definition of `code`, if any.
    pub fn feature(&self, code: u8) -> Option<&UserFeature> {
        self.features.get(&code)
    }

    /// Every definition, by code.
    pub fn features(&self) -> impl Iterator<Item=&UserFeature> {
        self.features.values()
    }

    /// The file these definitions were loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Whether these definitions are for the given monitor model.
    pub fn matches(&self, mfg_id: &str, model: &str, product_code: u16) -> bool {
        self.mfg_id == mfg_id && self.model == model && self.product_code == product_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# test monitor
MFG_ID DEL
MODEL Dell U2715H
PRODUCT_CODE 53350

FEATURE_CODE E0 Preset mode
ATTRS RW SNC
DESC Factory picture presets
VALUE 01 Standard
VALUE 0x02 Movie

FEATURE_CODE 10 Backlight
ATTRS RW C
";

    #[test]
    fn parse_sample() {
        let udf = UserFeatures::parse(SAMPLE).unwrap();
        assert!(udf.matches("DEL", "Dell U2715H", 53350));
        assert_eq!(udf.features().count(), 2);

        let preset = udf.feature(0xe0).unwrap();
        assert_eq!(preset.name, "Preset mode");
        assert_eq!(preset.flags, VersionFlags::new(Access::ReadWrite, Category::SimpleNc));
        let m = preset.metadata(MccsVersion::V21);
        assert_eq!(m.origin, Origin::UserDefined);
        assert_eq!(m.value_name(0x02).unwrap(), "Movie");

        let backlight = udf.feature(0x10).unwrap().metadata(MccsVersion::V21);
        assert!(backlight.values.is_none());
        assert_eq!(backlight.category(), Category::Continuous);
    }

    #[test]
    fn write_only_categories() {
        assert_eq!(parse_attrs("WO NC").unwrap().category, Category::WriteOnlyNc);
        assert_eq!(parse_attrs("wo t").unwrap().category, Category::WriteOnlyTable);
        assert!(parse_attrs("RW").is_err());
        assert!(parse_attrs("RW SNC XX").is_err());
    }

    #[test]
    fn errors_are_collected() {
        let bad = "MFG_ID TOOLONG\nFEATURE_CODE zz nope\nVALUE 01 orphan\nFEATURE_CODE E1 no attrs\nBOGUS\n";
        match UserFeatures::parse(bad) {
            Err(Error::BadData { causes, .. }) => {
                // MFG_ID, FEATURE_CODE zz, VALUE, BOGUS, no attrs, missing MFG_ID/MODEL/PRODUCT_CODE
                assert_eq!(causes.len(), 8);
                assert!(causes[0].to_string().contains("line 1"));
            },
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn find_in_search_path() {
        let empty = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let name = file_name("DEL", "Dell U2715H", 53350);
        assert_eq!(name, "DEL-Dell_U2715H-53350.mccs");

        let mut f = fs::File::create(dir.path().join(&name)).unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        drop(f);

        let paths = [empty.path(), dir.path()];
        let udf = find(&paths, "DEL", "Dell U2715H", 53350).unwrap().unwrap();
        assert_eq!(udf.source(), Some(dir.path().join(&name).as_path()));
        assert!(find(&paths, "DEL", "Dell U2715H", 1).unwrap().is_none());
    }

    #[test]
    fn toggle() {
        let prev = enable_udf(false);
        assert!(!is_udf_enabled());
        enable_udf(prev);
    }
}
