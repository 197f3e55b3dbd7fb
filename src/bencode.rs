use crate::bytestring::ByteString;
use crate::dictionary::Dictionary;
use crate::value::{Integer, Value};

/// Encodes a value into canonical bencode: dictionary keys in byte-wise order,
/// integers in minimal decimal form.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

/// Encodes a document root.
pub fn encode_dictionary(dict: &Dictionary) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_dict(dict, &mut buf);
    buf
}

/// Appends the encoding of `value` to `buf`.
pub fn encode_into(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Integer(int) => encode_int(*int, buf),
        Value::ByteString(bytes) => encode_bytestring(bytes, buf),
        Value::List(list) => encode_list(list, buf),
        Value::Dictionary(dict) => encode_dict(dict, buf),
    }
}

fn encode_dict(dict: &Dictionary, buf: &mut Vec<u8>) {
    buf.push(b'd');
    for (key, val) in dict.iter_sorted() {
        encode_bytestring(key, buf);
        encode_into(val, buf);
    }
    buf.push(b'e');
}

fn encode_list(list: &[Value], buf: &mut Vec<u8>) {
    buf.push(b'l');
    for item in list {
        encode_into(item, buf);
    }
    buf.push(b'e')
}

fn encode_bytestring(bs: &ByteString, buf: &mut Vec<u8>) {
    buf.extend_from_slice(bs.len().to_string().as_bytes());
    buf.push(b':');
    buf.extend_from_slice(bs);
}

fn encode_int(int: Integer, buf: &mut Vec<u8>) {
    buf.push(b'i');
    buf.extend_from_slice(int.to_string().as_bytes());
    buf.push(b'e');
}
