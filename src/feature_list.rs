use std::iter::FromIterator;
use std::{fmt, ops};

/// A set of VCP feature codes.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeatureList {
    bits: [u8; 32],
}

impl FeatureList {
    /// The empty set.
    pub fn new() -> Self {
        Default::default()
    }

    /// Removes every code.
    pub fn clear(&mut self) {
        self.bits = [0; 32];
    }

    /// Adds a code.
    pub fn add(&mut self, code: u8) {
        self.bits[(code >> 3) as usize] |= 1 << (code & 7);
    }

    /// Removes a code.
    pub fn remove(&mut self, code: u8) {
        self.bits[(code >> 3) as usize] &= !(1 << (code & 7));
    }

    #[allow(missing_docs)]
    pub fn contains(&self, code: u8) -> bool {
        self.bits[(code >> 3) as usize] & (1 << (code & 7)) != 0
    }

    /// Number of codes in the set.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item=u8> + '_ {
        (0..=0xffu8).filter(move |&code| self.contains(code))
    }

    /// Renders the codes as two-digit hex, each prefixed and separated as requested.
    pub fn to_string_with(&self, prefix: &str, separator: &str) -> String {
        let mut s = String::new();
        for (i, code) in self.iter().enumerate() {
            if i > 0 {
                s.push_str(separator);
            }
            s.push_str(prefix);
            s.push_str(&format!("{:02x}", code));
        }
        s
    }

    fn zip(self, rhs: FeatureList, f: impl Fn(u8, u8) -> u8) -> FeatureList {
        let mut out = FeatureList::new();
        for i in 0..32 {
            out.bits[i] = f(self.bits[i], rhs.bits[i]);
        }
        out
    }

    #[allow(missing_docs)]
    pub fn union(self, rhs: FeatureList) -> FeatureList {
        self.zip(rhs, |a, b| a | b)
    }

    #[allow(missing_docs)]
    pub fn intersection(self, rhs: FeatureList) -> FeatureList {
        self.zip(rhs, |a, b| a & b)
    }

    /// Codes in `self` but not in `rhs`.
    pub fn difference(self, rhs: FeatureList) -> FeatureList {
        self.zip(rhs, |a, b| a & !b)
    }
}

impl ops::BitOr for FeatureList {
    type Output = FeatureList;

    fn bitor(self, rhs: FeatureList) -> FeatureList {
        self.union(rhs)
    }
}

impl ops::BitAnd for FeatureList {
    type Output = FeatureList;

    fn bitand(self, rhs: FeatureList) -> FeatureList {
        self.intersection(rhs)
    }
}

impl ops::Sub for FeatureList {
    type Output = FeatureList;

    fn sub(self, rhs: FeatureList) -> FeatureList {
        self.difference(rhs)
    }
}

impl FromIterator<u8> for FeatureList {
    fn from_iter<I: IntoIterator<Item=u8>>(iter: I) -> Self {
        let mut list = FeatureList::new();
        list.extend(iter);
        list
    }
}

impl Extend<u8> for FeatureList {
    fn extend<I: IntoIterator<Item=u8>>(&mut self, iter: I) {
        for code in iter {
            self.add(code)
        }
    }
}

impl fmt::Debug for FeatureList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|c| format!("0x{:02x}", c))).finish()
    }
}

impl fmt::Display for FeatureList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_string_with("", " "))
    }
}

/// Named feature sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureSubset {
    /// Every feature in the metadata table.
    Known,
    /// Color related features.
    Color,
    /// Features saved and restored by profile values.
    Profile,
    /// Manufacturer reserved codes, 0xe0..=0xff.
    Manufacturer,
    /// Features the display lists in its capabilities.
    Capabilities,
    /// Every code except those known to be write-only, and known table
    /// features unless tables are requested.
    Scan,
    /// Codes supplied by the caller.
    Custom,
}

impl FeatureSubset {
    #[allow(missing_docs)]
    pub fn name(self) -> &'static str {
        match self {
            FeatureSubset::Known => "KNOWN",
            FeatureSubset::Color => "COLOR",
            FeatureSubset::Profile => "PROFILE",
            FeatureSubset::Manufacturer => "MFG",
            FeatureSubset::Capabilities => "CAPABILITIES",
            FeatureSubset::Scan => "SCAN",
            FeatureSubset::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for FeatureSubset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ops() {
        let a: FeatureList = vec![0x10, 0x12, 0xff].into_iter().collect();
        let b: FeatureList = vec![0x12, 0x00].into_iter().collect();
        assert_eq!(a.count(), 3);
        assert!(a.contains(0xff) && !a.contains(0xfe));
        assert_eq!((a | b).iter().collect::<Vec<_>>(), vec![0x00, 0x10, 0x12, 0xff]);
        assert_eq!((a & b).iter().collect::<Vec<_>>(), vec![0x12]);
        assert_eq!((a - b).iter().collect::<Vec<_>>(), vec![0x10, 0xff]);

        let mut c = a;
        c.remove(0x10);
        c.remove(0x11);
        assert_eq!(c.count(), 2);
        c.clear();
        assert!(c.is_empty());
    }

    /// xorshift, seeded
    fn lists(count: usize) -> Vec<FeatureList> {
        let mut state = 0x2545_f491_4f6c_dd1du64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        (0..count).map(|i| {
            let mut list = FeatureList::new();
            for byte in list.bits.iter_mut() {
                *byte = next() as u8;
                // sparse and dense sets too
                match i % 3 {
                    0 => *byte &= next() as u8,
                    1 => *byte |= next() as u8,
                    _ => (),
                }
            }
            list
        }).collect()
    }

    #[test]
    fn set_algebra() {
        let lists = lists(40);
        for &a in &lists {
            assert_eq!(a, a);
            assert!((a - a).is_empty());
            assert_eq!(a | FeatureList::new(), a);

            for &b in &lists {
                assert_eq!((a & b) | (a - b), a);
                assert!((a | b).count() >= a.count().max(b.count()));
                assert_eq!((a & b).count() + (a - b).count(), a.count());
                assert_eq!(a | b, b | a);
                assert!((a & b).iter().all(|code| a.contains(code) && b.contains(code)));
            }
        }
    }

    #[test]
    fn render() {
        let a: FeatureList = vec![0x02, 0x10].into_iter().collect();
        assert_eq!(a.to_string_with("x", ", "), "x02, x10");
        assert_eq!(a.to_string(), "02 10");
        assert_eq!(FeatureList::new().to_string_with("x", ","), "");
    }
}
