//! Saving and restoring the profile related feature values of a display.
//!
//! Values are exchanged as a single line of `;` separated `KEY value` fields:
//!
//! ```text
//! MFG_ID DEL;MODEL DELL U2715H;SN GH85D66R0SNL;TIMESTAMP_MILLIS 1700000000000;VCP 10 50;VCP 12 75
//! ```
//!
//! `VCP` fields carry the feature code in hex and the value in decimal.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use crate::display::{DisplayIdentifier, DisplayRef};
use crate::feature_list::FeatureSubset;
use crate::handle::DisplayHandle;
use crate::metadata;
use crate::registry::Registry;
use crate::session::Session;
use crate::trace::TraceGroup;
use crate::version::MccsVersion;
use crate::Error;

/// Saved feature values and the display they belong to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileValues {
    #[allow(missing_docs)]
    pub mfg_id: Option<String>,
    #[allow(missing_docs)]
    pub model: Option<String>,
    #[allow(missing_docs)]
    pub serial: Option<String>,
    /// The EDID base block, when saved.
    pub edid: Option<Vec<u8>>,
    /// When the values were read.
    pub timestamp_millis: Option<u64>,
    /// Feature code and value pairs, in the order they apply.
    pub values: Vec<(u8, u16)>,
}

impl ProfileValues {
    /// Whether these values were saved from `dref`.
    ///
    /// A saved EDID must match exactly. Otherwise every saved identity field must.
    pub fn matches(&self, dref: &DisplayRef) -> bool {
        if let Some(ref edid) = self.edid {
            return dref.edid().map(|e| &e.bytes == edid).unwrap_or(false)
        }

        self.identifier().map(|id| dref.matches(&id)).unwrap_or(false)
    }

    fn identifier(&self) -> Result<DisplayIdentifier, Error> {
        match self.edid {
            Some(ref edid) => DisplayIdentifier::edid(edid),
            None => DisplayIdentifier::mfg_model_sn(self.mfg_id.as_deref(), self.model.as_deref(), self.serial.as_deref()),
        }
    }

    fn apply(&self, session: &Session, handle: &mut DisplayHandle) -> Result<(), Error> {
        let causes: Vec<_> = self.values.iter()
            .filter_map(|&(code, value)| handle.write_non_table(session, code, (value >> 8) as u8, value as u8).err())
            .collect();

        match causes.len() {
            0 => Ok(()),
            failed => Err(Error::MultiFeature {
                failed,
                total: self.values.len(),
                causes,
            }),
        }
    }
}

impl FromStr for ProfileValues {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut profile = ProfileValues::default();
        let mut causes = Vec::new();

        for field in s.split(|c: char| c == ';' || c == '\n').map(str::trim).filter(|f| !f.is_empty()) {
            let (key, value) = match field.find(char::is_whitespace) {
                Some(i) => (&field[..i], field[i..].trim()),
                None => (field, ""),
            };

            let res = match &key.to_ascii_uppercase()[..] {
                "MFG_ID" => {
                    profile.mfg_id = Some(value.to_owned());
                    Ok(())
                },
                "MODEL" => {
                    profile.model = Some(value.to_owned());
                    Ok(())
                },
                "SN" => {
                    profile.serial = Some(value.to_owned());
                    Ok(())
                },
                "EDID" => parse_hex(value).map(|edid| profile.edid = Some(edid)),
                "TIMESTAMP_MILLIS" => value.parse()
                    .map(|t| profile.timestamp_millis = Some(t))
                    .map_err(|_| format!("invalid timestamp {:?}", value)),
                "VCP" => parse_vcp(value).map(|v| profile.values.push(v)),
                _ => Err(format!("unrecognized field {:?}", key)),
            };

            if let Err(e) = res {
                causes.push(Error::InvalidArgument(e));
            }
        }

        if profile.edid.is_none() && profile.mfg_id.is_none() && profile.model.is_none() && profile.serial.is_none() {
            causes.push(Error::InvalidArgument("no display identification".into()));
        }

        match causes.len() {
            0 => Ok(profile),
            n => Err(Error::BadData {
                detail: format!("{} invalid profile field(s)", n),
                causes,
            }),
        }
    }
}

impl fmt::Display for ProfileValues {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(ref mfg_id) = self.mfg_id {
            fields.push(format!("MFG_ID {}", mfg_id));
        }
        if let Some(ref model) = self.model {
            fields.push(format!("MODEL {}", model));
        }
        if let Some(ref serial) = self.serial {
            fields.push(format!("SN {}", serial));
        }
        if let Some(ref edid) = self.edid {
            fields.push(format!("EDID {}", edid.iter().map(|b| format!("{:02X}", b)).collect::<String>()));
        }
        if let Some(t) = self.timestamp_millis {
            fields.push(format!("TIMESTAMP_MILLIS {}", t));
        }
        fields.extend(self.values.iter().map(|&(code, value)| format!("VCP {:02X} {}", code, value)));

        f.write_str(&fields.join(";"))
    }
}

fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return Err(format!("invalid hex {:?}", s))
    }

    (0..s.len()).step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| format!("invalid hex {:?}", s)))
        .collect()
}

fn parse_vcp(s: &str) -> Result<(u8, u16), String> {
    let mut parts = s.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(code), Some(value), None) => Ok((
            u8::from_str_radix(code.trim_start_matches("0x"), 16).map_err(|_| format!("invalid feature code {:?}", code))?,
            value.parse().map_err(|_| format!("invalid value {:?}", value))?,
        )),
        _ => Err(format!("expected VCP <code> <value>, got {:?}", s)),
    }
}

impl DisplayHandle {
    /// Reads every profile related feature the display supports.
    pub fn profile_related_values(&mut self, session: &Session) -> Result<ProfileValues, Error> {
        let res = self.read_profile(session);
        session.record(res)
    }

    fn read_profile(&mut self, session: &Session) -> Result<ProfileValues, Error> {
        let version = self.query_version(session).unwrap_or(MccsVersion::Unknown);
        let dref = self.display_ref().clone();
        let features = metadata::feature_list(FeatureSubset::Profile, version, dref.config().deprecated_policy, false)?;

        let mut values = Vec::new();
        for code in features.iter() {
            match self.read_non_table(session, code) {
                Ok(value) => values.push((code, value.value())),
                Err(ref e) if e.is_unsupported() => {
                    dbgtrc!(session, TraceGroup::VCP, "profile_related_values", code, "unsupported, skipping");
                },
                Err(e) => return Err(e),
            }
        }

        Ok(ProfileValues {
            mfg_id: Some(dref.mfg_id().to_owned()),
            model: Some(dref.model().to_owned()),
            serial: Some(dref.serial().to_owned()),
            edid: dref.edid().map(|e| e.bytes.clone()),
            timestamp_millis: SystemTime::now().duration_since(UNIX_EPOCH).ok().map(|d| d.as_millis() as u64),
            values,
        })
    }
}

impl Registry {
    /// Restores saved profile values.
    ///
    /// With a handle the values must have been saved from that display.
    /// Without one, the first valid display they were saved from is opened.
    pub fn set_profile_related_values(&self, session: &Session, handle: Option<&mut DisplayHandle>, profile: &str) -> Result<(), Error> {
        let res = profile.parse::<ProfileValues>().and_then(|profile| match handle {
            Some(handle) => {
                if !profile.matches(handle.display_ref()) {
                    return Err(Error::InvalidArgument(format!("profile values were not saved from {}", handle.display_ref())))
                }
                profile.apply(session, handle)
            },
            None => {
                let dref = self.find_display_ref(&profile.identifier()?)?;
                let mut handle = self.open_display(&dref, false)?;
                profile.apply(session, &mut handle)
            },
        });
        session.record(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let profile: ProfileValues = "MFG_ID DEL;MODEL DELL U2715H;SN ABC123;TIMESTAMP_MILLIS 1700000000000;VCP 10 50;VCP 0x12 75".parse().unwrap();
        assert_eq!(profile.mfg_id.as_deref(), Some("DEL"));
        assert_eq!(profile.model.as_deref(), Some("DELL U2715H"));
        assert_eq!(profile.timestamp_millis, Some(1_700_000_000_000));
        assert_eq!(profile.values, vec![(0x10, 50), (0x12, 75)]);
        assert_eq!(profile.to_string(), "MFG_ID DEL;MODEL DELL U2715H;SN ABC123;TIMESTAMP_MILLIS 1700000000000;VCP 10 50;VCP 12 75");
    }

    #[test]
    fn bad_fields_are_collected() {
        match "MFG_ID DEL;VCP zz 1;VCP 10;BOGUS 1;EDID 0g".parse::<ProfileValues>() {
            Err(Error::BadData { causes, .. }) => assert_eq!(causes.len(), 4, "{:?}", causes),
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn needs_identification() {
        match "VCP 10 50".parse::<ProfileValues>() {
            Err(Error::BadData { causes, .. }) => assert_eq!(causes.len(), 1),
            r => panic!("unexpected {:?}", r),
        }
    }
}
