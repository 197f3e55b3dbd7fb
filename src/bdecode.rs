use std::io::{self, BufRead, BufReader, Read};

use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, opt};
use nom::sequence::pair;
use nom::IResult;

use crate::bytestring::ByteString;
use crate::dictionary::Dictionary;
use crate::error::{DecodeError, Result};
use crate::value::{Integer, Value};

pub const DEFAULT_MAX_DEPTH: usize = 64;

// "-" plus the 20 digits of u64::MAX plus the terminator. Anything longer can't be a valid number.
const MAX_TOKEN_LEN: u64 = 22;

// Cap on the up-front allocation for a string payload; larger strings grow as they are read.
const PREALLOC_LIMIT: u64 = 64 * 1024;

/// What to do when a dictionary repeats a key.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum DuplicateKeys {
    /// The later value replaces the earlier one and takes its place at the end of the key order.
    #[default]
    KeepLast,
    /// Fail with [`DecodeError::DuplicateKey`].
    Reject,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DecoderConfig {
    /// Maximum number of nested lists and dictionaries, the document root included.
    pub max_depth: usize,
    pub duplicate_keys: DuplicateKeys,
}

impl DecoderConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> DecoderConfig {
        self.max_depth = max_depth;
        self
    }

    pub fn with_duplicate_keys(mut self, duplicate_keys: DuplicateKeys) -> DecoderConfig {
        self.duplicate_keys = duplicate_keys;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            duplicate_keys: DuplicateKeys::default(),
        }
    }
}

/// Bencode decoder over a buffered byte source.
///
/// Uses a single byte of lookahead taken from the reader's buffer, so nothing past the
/// end of the decoded value is consumed.
pub struct Decoder<R> {
    reader: R,
    config: DecoderConfig,
    depth: usize,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Decoder<R> {
        Decoder::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Decoder<R> {
        Decoder { reader, config, depth: 0 }
    }

    /// Decodes a document. The root has to be a dictionary; an empty source yields an
    /// empty dictionary.
    pub fn decode(&mut self) -> Result<Dictionary> {
        self.depth = 0;
        let result = match self.peek()? {
            None => Ok(Dictionary::new()),
            Some(b'd') => self.parse_dict(),
            Some(other) => Err(DecodeError::MalformedTopLevel(other as char)),
        };
        match &result {
            Ok(dict) => log::trace!("decoded bencode dictionary with {} keys", dict.len()),
            Err(err) => log::debug!("bencode decoding failed: {}", err),
        }
        result
    }

    /// Decodes a single value of any kind.
    pub fn decode_value(&mut self) -> Result<Value> {
        self.depth = 0;
        self.parse_type()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn parse_type(&mut self) -> Result<Value> {
        match self.peek_required()? {
            b'i' => self.parse_int().map(Value::Integer),
            b'l' => self.parse_list().map(Value::List),
            b'd' => self.parse_dict().map(Value::Dictionary),
            b'0'..=b'9' | b'-' => self.parse_str().map(Value::ByteString),
            other => Err(DecodeError::UnexpectedByte(other as char)),
        }
    }

    fn parse_str(&mut self) -> Result<ByteString> {
        let len = self.read_length()?;
        let mut bytes = Vec::with_capacity(len.min(PREALLOC_LIMIT) as usize);
        let read = (&mut self.reader).take(len).read_to_end(&mut bytes)?;
        if (read as u64) < len {
            return Err(DecodeError::Truncated);
        }
        Ok(ByteString(bytes))
    }

    fn parse_int(&mut self) -> Result<Integer> {
        self.advance()?;
        let (token, terminated) = self.read_token(b'e')?;
        let malformed = || DecodeError::MalformedInteger(String::from_utf8_lossy(&token).into_owned());

        let number = parse_decimal(&token)
            .filter(|number| terminated && number.is_canonical())
            .ok_or_else(malformed)?;
        match (number.negative, number.magnitude()) {
            (false, Some(magnitude)) => Ok(Integer::from(magnitude)),
            (true, Some(magnitude)) => i64::try_from(-i128::from(magnitude))
                .map(Integer::Signed)
                .map_err(|_| malformed()),
            (_, None) => Err(malformed()),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<Value>> {
        self.advance()?;
        self.enter()?;
        let mut list = Vec::new();
        while self.peek_required()? != b'e' {
            list.push(self.parse_type()?);
        }
        self.advance()?;
        self.depth -= 1;
        Ok(list)
    }

    fn parse_dict(&mut self) -> Result<Dictionary> {
        self.advance()?;
        self.enter()?;
        let mut dict = Dictionary::new();
        loop {
            match self.peek_required()? {
                b'e' => break,
                b'0'..=b'9' | b'-' => {}
                other => return Err(DecodeError::NonStringKey(other as char)),
            }
            let key = self.parse_str()?;
            if self.peek_required()? == b'e' {
                return Err(DecodeError::KeyWithoutValue(key));
            }
            let value = self.parse_type()?;

            if dict.contains_key(&key) {
                match self.config.duplicate_keys {
                    DuplicateKeys::Reject => return Err(DecodeError::DuplicateKey(key)),
                    DuplicateKeys::KeepLast => {
                        log::warn!("duplicate dictionary key '{}', keeping the last value", key)
                    }
                }
            }
            dict.insert(key, value);
        }
        self.advance()?;
        self.depth -= 1;
        Ok(dict)
    }

    fn read_length(&mut self) -> Result<u64> {
        let (token, terminated) = self.read_token(b':')?;
        let number = parse_decimal(&token)
            .ok_or_else(|| DecodeError::InvalidLength(String::from_utf8_lossy(&token).into_owned()))?;

        match (number.negative, number.magnitude()) {
            (true, Some(0)) => Err(DecodeError::InvalidLength(String::from_utf8_lossy(&token).into_owned())),
            (true, _) => Err(DecodeError::NegativeLength),
            (false, Some(len)) if terminated && len <= i64::MAX as u64 => Ok(len),
            (false, _) => Err(DecodeError::LengthOverflow),
        }
    }

    // Reads up to `terminator`, consuming it. The flag is false when the token hit
    // MAX_TOKEN_LEN before a terminator showed up.
    fn read_token(&mut self, terminator: u8) -> Result<(Vec<u8>, bool)> {
        let mut token = Vec::new();
        (&mut self.reader).take(MAX_TOKEN_LEN).read_until(terminator, &mut token)?;
        if token.last() == Some(&terminator) {
            token.pop();
            return Ok((token, true));
        }
        if (token.len() as u64) < MAX_TOKEN_LEN {
            return Err(DecodeError::Truncated);
        }
        Ok((token, false))
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(DecodeError::NestingTooDeep(self.config.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().cloned()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn peek_required(&mut self) -> Result<u8> {
        self.peek()?.ok_or(DecodeError::Truncated)
    }

    fn advance(&mut self) -> Result<u8> {
        let byte = self.peek_required()?;
        self.reader.consume(1);
        Ok(byte)
    }
}

struct Decimal<'a> {
    negative: bool,
    digits: &'a [u8],
}

impl Decimal<'_> {
    // None on u64 overflow.
    fn magnitude(&self) -> Option<u64> {
        self.digits
            .iter()
            .try_fold(0u64, |acc, &d| acc.checked_mul(10)?.checked_add(u64::from(d - b'0')))
    }

    fn is_canonical(&self) -> bool {
        let leading_zero = self.digits.len() > 1 && self.digits[0] == b'0';
        let negative_zero = self.negative && self.digits == b"0";
        !leading_zero && !negative_zero
    }
}

fn decimal(inp: &[u8]) -> IResult<&[u8], (Option<char>, &[u8])> {
    all_consuming(pair(opt(char('-')), digit1))(inp)
}

fn parse_decimal(token: &[u8]) -> Option<Decimal<'_>> {
    decimal(token).ok().map(|(_, (sign, digits))| Decimal {
        negative: sign.is_some(),
        digits,
    })
}

/// Decodes a bencode document from any reader.
pub fn decode<R: Read>(reader: R) -> Result<Dictionary> {
    Decoder::new(BufReader::new(reader)).decode()
}

pub fn decode_bytes(inp: &[u8]) -> Result<Dictionary> {
    Decoder::new(inp).decode()
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_int(inp: &str) -> (Result<Integer>, &[u8]) {
        let mut decoder = Decoder::new(inp.as_bytes());
        let result = decoder.parse_int();
        (result, decoder.into_inner())
    }

    fn parse_string(inp: &str) -> (Result<ByteString>, &[u8]) {
        let mut decoder = Decoder::new(inp.as_bytes());
        let result = decoder.parse_str();
        (result, decoder.into_inner())
    }

    fn parse_list(inp: &str) -> Result<Vec<Value>> {
        Decoder::new(inp.as_bytes()).parse_list()
    }

    fn parse_dictionary(inp: &str) -> Result<Dictionary> {
        Decoder::new(inp.as_bytes()).parse_dict()
    }

    fn bs(s: &str) -> Value {
        Value::ByteString(ByteString::from(s))
    }

    #[test]
    pub fn peek_does_not_consume() {
        let mut decoder = Decoder::new(b"ab".as_slice());
        assert_eq!(Some(b'a'), decoder.peek().unwrap());
        assert_eq!(b'a', decoder.advance().unwrap());
        assert_eq!(b'b', decoder.advance().unwrap());
        assert_eq!(None, decoder.peek().unwrap());
        assert!(matches!(decoder.advance(), Err(DecodeError::Truncated)));
    }

    #[test]
    pub fn test_parse_integer() {
        let (result, rest) = parse_int("i123e");
        assert_eq!(Integer::Signed(123), result.unwrap());
        assert_eq!(b"", rest);

        let (result, rest) = parse_int("i-123ei4e");
        assert_eq!(Integer::Signed(-123), result.unwrap());
        assert_eq!(b"i4e", rest);

        assert_eq!(Integer::Signed(0), parse_int("i0e").0.unwrap());
        assert_eq!(Integer::Signed(i64::MIN), parse_int("i-9223372036854775808e").0.unwrap());
        assert_eq!(Integer::Signed(i64::MAX), parse_int("i9223372036854775807e").0.unwrap());
    }

    #[test]
    pub fn integers_above_i64_are_unsigned() {
        let value = parse_int("i9223372036854775808e").0.unwrap();
        assert!(matches!(value, Integer::Unsigned(9223372036854775808)));
        let value = parse_int("i18446744073709551615e").0.unwrap();
        assert!(matches!(value, Integer::Unsigned(u64::MAX)));
    }

    #[test]
    pub fn malformed_integers() {
        for inp in ["iabce", "i-abce", "i23fe", "ie", "i-e", "i-0e", "i03e", "i+3e", "i1.5e"] {
            assert!(
                matches!(parse_int(inp).0, Err(DecodeError::MalformedInteger(_))),
                "{} should be rejected",
                inp
            );
        }
        assert!(matches!(
            parse_int("i18446744073709551616e").0,
            Err(DecodeError::MalformedInteger(_))
        ));
        assert!(matches!(
            parse_int("i-9223372036854775809e").0,
            Err(DecodeError::MalformedInteger(_))
        ));
        assert!(matches!(
            parse_int("i1111111111111111111111111111111e").0,
            Err(DecodeError::MalformedInteger(_))
        ));
        assert!(matches!(parse_int("i23").0, Err(DecodeError::Truncated)));
    }

    #[test]
    pub fn test_parse_string() {
        let (result, rest) = parse_string("3:abc");
        assert_eq!(ByteString::from("abc"), result.unwrap());
        assert_eq!(b"", rest);

        let (result, rest) = parse_string("0:i1e");
        assert_eq!(ByteString::from(""), result.unwrap());
        assert_eq!(b"i1e", rest);

        let (result, _) = parse_string("4:a:be");
        assert_eq!(ByteString::from("a:be"), result.unwrap());

        assert!(matches!(parse_string("abc").0, Err(DecodeError::Truncated)));
        assert!(matches!(parse_string("3abc").0, Err(DecodeError::Truncated)));
        assert!(matches!(parse_string("3:ab").0, Err(DecodeError::Truncated)));
        assert!(matches!(parse_string("x:ab").0, Err(DecodeError::InvalidLength(_))));
        assert!(matches!(parse_string("-0:").0, Err(DecodeError::InvalidLength(_))));
    }

    #[test]
    pub fn string_payload_is_raw_bytes() {
        let mut decoder = Decoder::new(b"3:\xff\x00e".as_slice());
        assert_eq!(ByteString(vec![0xff, 0x00, b'e']), decoder.parse_str().unwrap());
    }

    #[test]
    pub fn string_length_limits() {
        assert!(matches!(parse_string("-1:").0, Err(DecodeError::NegativeLength)));
        assert!(matches!(
            parse_string("9223372036854775808:").0,
            Err(DecodeError::LengthOverflow)
        ));
        assert!(matches!(
            parse_string("99999999999999999999999999:").0,
            Err(DecodeError::LengthOverflow)
        ));
        // Largest accepted length, but nothing behind it.
        assert!(matches!(
            parse_string("9223372036854775807:abc").0,
            Err(DecodeError::Truncated)
        ));
    }

    #[test]
    pub fn test_parse_list() {
        assert_eq!(Vec::<Value>::new(), parse_list("le").unwrap());
        assert_eq!(vec![Value::from(123)], parse_list("li123ee").unwrap());
        assert_eq!(vec![bs("abc")], parse_list("l3:abce").unwrap());
        assert_eq!(vec![bs("abc"), bs("defg")], parse_list("l3:abc4:defge").unwrap());
        assert_eq!(vec![Value::List(vec![])], parse_list("llee").unwrap());
        assert_eq!(
            vec![
                Value::List(vec![Value::List(vec![])]),
                Value::List(vec![Value::List(vec![])]),
            ],
            parse_list("llleelleee").unwrap()
        );
        assert!(matches!(parse_list("l3:abc"), Err(DecodeError::Truncated)));
        assert!(matches!(parse_list("lxe"), Err(DecodeError::UnexpectedByte('x'))));
    }

    #[test]
    pub fn test_parse_dictionary() {
        assert_eq!(Dictionary::new(), parse_dictionary("de").unwrap());

        let mut dct = Dictionary::new();
        dct.insert("a", Value::from(123));
        assert_eq!(dct, parse_dictionary("d1:ai123ee").unwrap());

        let mut dct = Dictionary::new();
        dct.insert("a", Value::List(vec![bs("hey")]));
        dct.insert("b", Value::List(vec![]));
        assert_eq!(dct, parse_dictionary("d1:al3:heye1:blee").unwrap());

        let mut dct = Dictionary::new();
        let mut inner_dct = Dictionary::new();
        inner_dct.insert("a", Value::from(345));
        inner_dct.insert("b", bs("wow"));
        dct.insert("inner", Value::Dictionary(inner_dct));
        dct.insert("inner2", Value::Dictionary(Dictionary::new()));
        assert_eq!(dct, parse_dictionary("d5:innerd1:ai345e1:b3:wowe6:inner2dee").unwrap());

        assert!(matches!(
            parse_dictionary("d4:iteme"),
            Err(DecodeError::KeyWithoutValue(key)) if key == ByteString::from("item")
        ));
        assert!(matches!(parse_dictionary("d1:a2:bc"), Err(DecodeError::Truncated)));
        assert!(matches!(parse_dictionary("di1ei2ee"), Err(DecodeError::NonStringKey('i'))));
    }

    #[test]
    pub fn dictionary_keeps_source_key_order() {
        let dict = parse_dictionary("d1:bi1e1:ai2e1:ci3ee").unwrap();
        let keys: Vec<String> = dict.keys().map(|k| k.to_string()).collect();
        assert_eq!(vec!["b", "a", "c"], keys);
    }

    #[test]
    pub fn duplicate_keys() {
        let dict = parse_dictionary("d1:ai1e1:bi2e1:ai3ee").unwrap();
        assert_eq!(2, dict.len());
        assert_eq!(Some(&Value::from(3)), dict.get(b"a"));
        let keys: Vec<String> = dict.keys().map(|k| k.to_string()).collect();
        assert_eq!(vec!["b", "a"], keys);

        let config = DecoderConfig::default().with_duplicate_keys(DuplicateKeys::Reject);
        let result = Decoder::with_config(b"d1:ai1e1:ai3ee".as_slice(), config).decode();
        assert!(matches!(result, Err(DecodeError::DuplicateKey(key)) if key == ByteString::from("a")));
    }

    #[test]
    pub fn nesting_limit() {
        let config = DecoderConfig::default().with_max_depth(3);
        let ok = Decoder::with_config(b"d1:ald1:xi1eeee".as_slice(), config).decode();
        assert!(ok.is_ok());

        let too_deep = Decoder::with_config(b"d1:alllleeeee".as_slice(), config).decode();
        assert!(matches!(too_deep, Err(DecodeError::NestingTooDeep(3))));

        let deep = format!("d1:a{}{}e", "l".repeat(DEFAULT_MAX_DEPTH), "e".repeat(DEFAULT_MAX_DEPTH));
        assert!(matches!(decode_bytes(deep.as_bytes()), Err(DecodeError::NestingTooDeep(64))));
    }

    #[test]
    pub fn top_level() {
        assert_eq!(Dictionary::new(), decode_bytes(b"").unwrap());
        assert!(matches!(decode_bytes(b"li1ee"), Err(DecodeError::MalformedTopLevel('l'))));
        assert!(matches!(decode_bytes(b"3:abc"), Err(DecodeError::MalformedTopLevel('3'))));
        assert!(matches!(decode_bytes(b"d"), Err(DecodeError::Truncated)));
    }

    #[test]
    pub fn decoder_stops_after_the_document() {
        let mut decoder = Decoder::new(b"d1:ai1eetrailing".as_slice());
        let dict = decoder.decode().unwrap();
        assert_eq!(Some(&Value::from(1)), dict.get(b"a"));
        assert_eq!(b"trailing", decoder.into_inner());
    }

    #[test]
    pub fn decode_value_accepts_any_kind() {
        let mut decoder = Decoder::new(b"i-7el1:xe".as_slice());
        assert_eq!(Value::from(-7), decoder.decode_value().unwrap());
        assert_eq!(Value::List(vec![bs("x")]), decoder.decode_value().unwrap());
        assert!(matches!(decoder.decode_value(), Err(DecodeError::Truncated)));
    }
}
