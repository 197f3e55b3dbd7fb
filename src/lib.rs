//! Bencode decoding and encoding.
//!
//! Bencode is the serialization format of BitTorrent metadata and tracker
//! responses. It has four kinds of values:
//!
//! | Kind        | Wire form        | Example          |
//! |-------------|------------------|------------------|
//! | Byte string | `<len>:<bytes>`  | `4:spam`         |
//! | Integer     | `i<decimal>e`    | `i-3e`           |
//! | List        | `l<values>e`     | `l4:spami3ee`    |
//! | Dictionary  | `d<pairs>e`      | `d3:fooi1ee`     |
//!
//! A document always has a dictionary at its root.
//!
//! ```
//! use bencodec::{decode_bytes, encode, Value};
//!
//! let dict = decode_bytes(b"d8:announce4:abcd3:fooi1ee").unwrap();
//! assert_eq!(dict.get(b"announce").and_then(Value::as_str), Some("abcd"));
//! assert_eq!(dict.get(b"foo").and_then(Value::as_i64), Some(1));
//!
//! let bytes = encode(&Value::Dictionary(dict));
//! assert_eq!(bytes, b"d8:announce4:abcd3:fooi1ee");
//! ```
//!
//! Decoded dictionaries remember the order their keys appeared in, but the
//! encoder always writes keys in canonical byte-wise order, so equal values
//! have exactly one encoding.

mod bdecode;
mod bencode;
mod bytestring;
mod dictionary;
mod error;
mod value;

pub use bdecode::{decode, decode_bytes, Decoder, DecoderConfig, DuplicateKeys, DEFAULT_MAX_DEPTH};
pub use bencode::{encode, encode_dictionary, encode_into};
pub use bytestring::{ByteString, ToByteString};
pub use dictionary::Dictionary;
pub use error::{DecodeError, Result};
pub use value::{Integer, Value};
