//! Capabilities string parsing.
//!
//! A capabilities string is a parenthesized list of `key(value)` entries:
//!
//! ```text
//! (prot(monitor)type(lcd)model(U2715H)cmds(01 02 03 0C E3 F3)vcp(02 04 10 12 14(05 08 0B) 60(0F 11))mccs_ver(2.1))
//! ```
//!
//! Real monitors get this wrong in many small ways, so parsing never fails
//! outright. Anything that can't be understood is skipped and described in
//! `Capabilities::messages`.

use std::str::FromStr;
use crate::feature_list::FeatureList;
use crate::version::MccsVersion;

/// A feature listed in `vcp()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityFeature {
    #[allow(missing_docs)]
    pub code: u8,
    /// Declared legal values. `None` means the display didn't restrict them.
    pub values: Option<Vec<u8>>,
}

/// A parsed capabilities string.
#[derive(Clone, Debug, PartialEq)]
pub struct Capabilities {
    /// The string as received.
    pub unparsed: String,
    /// From `mccs_ver()`, `Unqueried` when absent or unreadable.
    pub version: MccsVersion,
    /// Supported DDC/CI commands, from `cmds()`.
    pub commands: Vec<u8>,
    /// Supported features, from `vcp()`, in listed order.
    pub features: Vec<CapabilityFeature>,
    #[allow(missing_docs)]
    pub model: Option<String>,
    /// From `type()`.
    pub display_type: Option<String>,
    /// Problems encountered while parsing.
    pub messages: Vec<String>,
}

impl Capabilities {
    /// The entry for `code`, if listed.
    pub fn feature(&self, code: u8) -> Option<&CapabilityFeature> {
        self.features.iter().find(|f| f.code == code)
    }

    /// Every listed feature code.
    pub fn feature_list(&self) -> FeatureList {
        self.features.iter().map(|f| f.code).collect()
    }
}

/// Parses a capabilities string.
pub fn parse_capabilities(s: &str) -> Capabilities {
    let mut caps = Capabilities {
        unparsed: s.to_owned(),
        version: MccsVersion::Unqueried,
        commands: Vec::new(),
        features: Vec::new(),
        model: None,
        display_type: None,
        messages: Vec::new(),
    };

    let mut seen_version = false;
    for (key, value) in entries(strip_outer(s), &mut caps.messages) {
        match &key.to_ascii_lowercase()[..] {
            "mccs_ver" => {
                seen_version = true;
                match MccsVersion::from_str(value.trim()) {
                    Ok(version) => caps.version = version,
                    Err(()) => caps.messages.push(format!("unrecognized mccs_ver({})", value)),
                }
            },
            "cmds" => caps.commands = codes(value, "cmds", &mut caps.messages).into_iter()
                .map(|(code, _)| code)
                .collect(),
            "vcp" => {
                for (code, values) in codes(value, "vcp", &mut caps.messages) {
                    if caps.features.iter().any(|f| f.code == code) {
                        caps.messages.push(format!("vcp: feature {:02X} listed twice", code));
                        continue
                    }
                    caps.features.push(CapabilityFeature { code, values });
                }
            },
            "model" => caps.model = Some(value.trim().to_owned()),
            "type" => caps.display_type = Some(value.trim().to_owned()),
            _ => (),
        }
    }

    if !seen_version {
        caps.messages.push("missing mccs_ver()".into());
    }

    caps
}

/// Index of the `)` closing the `(` at `open`.
fn matching(s: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in s.iter().enumerate().skip(open) {
        match c {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i)
                }
            },
            _ => (),
        }
    }
    None
}

fn strip_outer(s: &str) -> &str {
    let s = s.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if !s.starts_with('(') {
        return s
    }

    match matching(s.as_bytes(), 0) {
        Some(close) if close == s.len() - 1 => &s[1..close],
        Some(_) => s,
        None => &s[1..],
    }
}

/// Splits the top level into `key(value)` pairs.
fn entries<'a>(s: &'a str, messages: &mut Vec<String>) -> Vec<(&'a str, &'a str)> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && bytes[i] != b'(' && bytes[i] != b')' {
            i += 1;
        }
        let key = s[start..i].trim();

        if i == bytes.len() {
            if !key.is_empty() {
                messages.push(format!("trailing text {:?}", key));
            }
            break
        }
        if bytes[i] == b')' {
            messages.push(format!("unbalanced ')' at offset {}", i));
            i += 1;
            continue
        }

        match matching(bytes, i) {
            Some(close) => {
                out.push((key, &s[i + 1..close]));
                i = close + 1;
            },
            None => {
                messages.push(format!("unterminated {}(", key));
                out.push((key, &s[i + 1..]));
                i = bytes.len();
            },
        }
    }

    out
}

/// Hex bytes in a token, which may run several together (`0102` is 01 and 02).
fn hex_bytes(token: &str) -> Option<Vec<u8>> {
    if token.is_empty() || token.len() % 2 != 0 || !token.is_ascii() {
        return None
    }

    (0..token.len()).step_by(2)
        .map(|i| u8::from_str_radix(&token[i..i + 2], 16).ok())
        .collect()
}

/// Parses a list of hex codes, each optionally followed by a parenthesized value list.
fn codes(s: &str, key: &str, messages: &mut Vec<String>) -> Vec<(u8, Option<Vec<u8>>)> {
    let bytes = s.as_bytes();
    let mut out: Vec<(u8, Option<Vec<u8>>)> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            c if c.is_ascii_whitespace() => i += 1,
            b'(' => {
                let close = matching(bytes, i);
                let inner = &s[i + 1..close.unwrap_or(bytes.len())];
                if close.is_none() {
                    messages.push(format!("{}: unterminated value list", key));
                }

                match out.last_mut() {
                    Some(&mut (code, ref mut values @ None)) => {
                        let context = format!("{}: feature {:02X}", key, code);
                        let parsed = codes(inner, &context, messages);
                        if parsed.iter().any(|&(_, ref nested)| nested.is_some()) {
                            messages.push(format!("{}: nested value list ignored", context));
                        }
                        *values = Some(parsed.into_iter().map(|(v, _)| v).collect());
                    },
                    _ => messages.push(format!("{}: value list ({}) without a feature code", key, inner)),
                }
                i = close.map(|c| c + 1).unwrap_or(bytes.len());
            },
            b')' => {
                messages.push(format!("{}: unbalanced ')'", key));
                i += 1;
            },
            _ => {
                let start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'(' && bytes[i] != b')' {
                    i += 1;
                }
                let token = &s[start..i];
                match hex_bytes(token) {
                    Some(codes) => out.extend(codes.into_iter().map(|code| (code, None))),
                    None => messages.push(format!("{}: invalid code {:?}", key, token)),
                }
            },
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        let caps = parse_capabilities("(mccs_ver(2.1) vcp(02 03 10(00 14) 14(01 02 04)) cmds(01 02))");
        assert_eq!(caps.version, MccsVersion::V21);
        assert_eq!(caps.commands, vec![0x01, 0x02]);
        assert_eq!(caps.features, vec![
            CapabilityFeature { code: 0x02, values: None },
            CapabilityFeature { code: 0x03, values: None },
            CapabilityFeature { code: 0x10, values: Some(vec![0x00, 0x14]) },
            CapabilityFeature { code: 0x14, values: Some(vec![0x01, 0x02, 0x04]) },
        ]);
        assert!(caps.messages.is_empty(), "{:?}", caps.messages);

        let list = caps.feature_list();
        assert_eq!(list.count(), 4);
        assert!(caps.feature(0x10).is_some() && caps.feature(0x11).is_none());
    }

    #[test]
    fn real_monitor() {
        let caps = parse_capabilities("(prot(monitor)type(LCD)model(U2715H)cmds(01 02 03 07 0C E3 F3)vcp(02 04 05 08 10 12 14(05 08 0B 0C) 16 18 1A 52 60( 0F 11 12) AA(01 02) DF)mswhql(1)asset_eep(40)mccs_ver(2.1))\0");
        assert_eq!(caps.model.as_deref(), Some("U2715H"));
        assert_eq!(caps.display_type.as_deref(), Some("LCD"));
        assert_eq!(caps.feature(0x60).unwrap().values, Some(vec![0x0f, 0x11, 0x12]));
        assert_eq!(caps.commands.len(), 7);
        assert_eq!(caps.version, MccsVersion::V21);
        assert!(caps.messages.is_empty(), "{:?}", caps.messages);
    }

    #[test]
    fn run_together_codes() {
        let caps = parse_capabilities("(vcp(021012)cmds(0102)mccs_ver(02.02))");
        assert_eq!(caps.feature_list().iter().collect::<Vec<_>>(), vec![0x02, 0x10, 0x12]);
        assert_eq!(caps.commands, vec![0x01, 0x02]);
        assert_eq!(caps.version, MccsVersion::V22);
    }

    #[test]
    fn malformed_fragments_are_reported() {
        let caps = parse_capabilities("(vcp(10 XY 12(01 0) 14) mccs_ver(abc))");
        assert_eq!(caps.feature_list().iter().collect::<Vec<_>>(), vec![0x10, 0x12, 0x14]);
        assert_eq!(caps.feature(0x12).unwrap().values, Some(vec![0x01]));
        assert_eq!(caps.version, MccsVersion::Unqueried);
        assert_eq!(caps.messages.len(), 3, "{:?}", caps.messages);
    }

    #[test]
    fn missing_version_is_unqueried() {
        let caps = parse_capabilities("(vcp(10))");
        assert_eq!(caps.version, MccsVersion::Unqueried);
        assert_eq!(caps.messages, vec!["missing mccs_ver()".to_owned()]);
    }

    #[test]
    fn unterminated() {
        let caps = parse_capabilities("(vcp(10 12(01 02) cmds(01");
        assert!(caps.feature(0x10).is_some());
        assert!(!caps.messages.is_empty());
    }
}
