use std::cmp::Ordering;
use std::fmt;

use crate::bencode;
use crate::bytestring::ByteString;
use crate::dictionary::Dictionary;

/// A bencode integer.
///
/// The format puts no bound on integer width. Values are kept as `i64` and only
/// fall back to `u64` for magnitudes above `i64::MAX`. All `From` conversions
/// normalize to that rule, and comparisons are numeric, so `Unsigned(5)`
/// equals `Signed(5)`.
#[derive(Debug, Clone, Copy)]
pub enum Integer {
    Signed(i64),
    Unsigned(u64),
}

impl Integer {
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Integer::Signed(i) => Some(i),
            Integer::Unsigned(u) => i64::try_from(u).ok(),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Integer::Signed(i) => u64::try_from(i).ok(),
            Integer::Unsigned(u) => Some(u),
        }
    }

    fn widen(&self) -> i128 {
        match *self {
            Integer::Signed(i) => i as i128,
            Integer::Unsigned(u) => u as i128,
        }
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.widen() == other.widen()
    }
}

impl Eq for Integer {}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.widen().cmp(&other.widen())
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::Signed(i) => write!(f, "{}", i),
            Integer::Unsigned(u) => write!(f, "{}", u),
        }
    }
}

macro_rules! integer_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(i: $t) -> Self {
                Integer::Signed(i as i64)
            }
        }
    )*};
}

macro_rules! integer_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(u: $t) -> Self {
                let u = u as u64;
                match i64::try_from(u) {
                    Ok(i) => Integer::Signed(i),
                    Err(_) => Integer::Unsigned(u),
                }
            }
        }
    )*};
}

integer_from_signed!(i8, i16, i32, i64, isize);
integer_from_unsigned!(u8, u16, u32, u64, usize);

/// A bencode value: one of exactly four kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    ByteString(ByteString),
    Integer(Integer),
    List(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteString(bs) => Some(bs.as_bytes()),
            _ => None,
        }
    }

    /// Returns the byte string as UTF-8, if this is a byte string holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::ByteString(bs) => bs.as_str(),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer()?.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_integer()?.as_u64()
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn into_dict(self) -> Option<Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }

    /// Canonical bencode bytes for this value.
    pub fn encode(&self) -> Vec<u8> {
        bencode::encode(self)
    }
}

impl From<ByteString> for Value {
    fn from(bs: ByteString) -> Self {
        Value::ByteString(bs)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::ByteString(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::ByteString(s.into())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::ByteString(b.into())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::ByteString(b.into())
    }
}

impl From<Integer> for Value {
    fn from(i: Integer) -> Self {
        Value::Integer(i)
    }
}

macro_rules! value_from_integer {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Integer(Integer::from(i))
            }
        }
    )*};
}

value_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<Dictionary> for Value {
    fn from(dict: Dictionary) -> Self {
        Value::Dictionary(dict)
    }
}
