use std::fmt;

/// A continuous or non-continuous feature value as the display reports it.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTableValue {
    /// Maximum, high byte
    pub mh: u8,
    /// Maximum, low byte
    pub ml: u8,
    /// Current, high byte
    pub sh: u8,
    /// Current, low byte
    pub sl: u8,
}

impl NonTableValue {
    /// Assembles a value from its four bytes.
    pub fn new(mh: u8, ml: u8, sh: u8, sl: u8) -> Self {
        NonTableValue { mh, ml, sh, sl }
    }

    /// Assembles a value from 16-bit current and maximum values.
    pub fn from_parts(value: u16, maximum: u16) -> Self {
        NonTableValue {
            mh: (maximum >> 8) as _,
            ml: maximum as _,
            sh: (value >> 8) as _,
            sl: value as _,
        }
    }

    /// The current value.
    pub fn value(&self) -> u16 {
        ((self.sh as u16) << 8) | self.sl as u16
    }

    /// The maximum value.
    pub fn maximum(&self) -> u16 {
        ((self.mh as u16) << 8) | self.ml as u16
    }
}

impl fmt::Debug for NonTableValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NonTableValue")
            .field("maximum", &self.maximum())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for NonTableValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "mh=0x{:02x} ml=0x{:02x} sh=0x{:02x} sl=0x{:02x}", self.mh, self.ml, self.sh, self.sl)
    }
}

/// Which representation a feature value uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Four byte continuous or non-continuous value.
    NonTable,
    /// Variable length byte sequence.
    Table,
}

/// A tagged feature value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VcpValue {
    #[allow(missing_docs)]
    NonTable(NonTableValue),
    #[allow(missing_docs)]
    Table(Vec<u8>),
}

impl VcpValue {
    /// The representation tag.
    pub fn value_type(&self) -> ValueType {
        match *self {
            VcpValue::NonTable(..) => ValueType::NonTable,
            VcpValue::Table(..) => ValueType::Table,
        }
    }

    #[allow(missing_docs)]
    pub fn as_non_table(&self) -> Option<&NonTableValue> {
        match *self {
            VcpValue::NonTable(ref v) => Some(v),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_table(&self) -> Option<&[u8]> {
        match *self {
            VcpValue::Table(ref v) => Some(v),
            _ => None,
        }
    }
}

impl From<NonTableValue> for VcpValue {
    fn from(v: NonTableValue) -> Self {
        VcpValue::NonTable(v)
    }
}

impl From<Vec<u8>> for VcpValue {
    fn from(v: Vec<u8>) -> Self {
        VcpValue::Table(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts() {
        let v = NonTableValue::from_parts(0x0132, 0x0400);
        assert_eq!((v.mh, v.ml, v.sh, v.sl), (0x04, 0x00, 0x01, 0x32));
        assert_eq!(v.value(), 0x0132);
        assert_eq!(v.maximum(), 0x0400);
        assert_eq!(VcpValue::from(v).value_type(), ValueType::NonTable);
        assert_eq!(VcpValue::from(vec![1, 2]).as_table(), Some(&[1u8, 2][..]));
    }
}
