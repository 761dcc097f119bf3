use std::fmt;
use std::str::FromStr;

use jiff::SignedDuration;
use jiff::fmt::friendly::{SpanParser, SpanPrinter};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::Error;

static PARSER: SpanParser = SpanParser::new();
static PRINTER: SpanPrinter = SpanPrinter::new();

/// Lifetime of a token as reported by the token endpoint.
///
/// The vendor reports `expires_in` as a number of seconds, but unit-suffixed
/// strings such as `"30m"` or `"1h30m"` are accepted too. A string with no
/// unit at all is read as seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenDuration(SignedDuration);

impl TokenDuration {
    pub const fn new(duration: SignedDuration) -> Self {
        Self(duration)
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(SignedDuration::from_secs(secs))
    }

    pub fn as_signed(&self) -> SignedDuration {
        self.0
    }

    /// Canonical wire form, e.g. `"30m"`.
    pub fn encode(&self) -> String {
        PRINTER.duration_to_string(&self.0)
    }

    /// Decodes any JSON value the token endpoint may send for `expires_in`.
    pub fn decode(value: &serde_json::Value) -> Result<Self, Error> {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::InvalidDuration(n.to_string()))
                .and_then(Self::from_secs_f64),
            serde_json::Value::String(s) => s.parse(),
            other => Err(Error::InvalidDuration(other.to_string())),
        }
    }

    fn from_secs_f64(secs: f64) -> Result<Self, Error> {
        SignedDuration::try_from_secs_f64(secs)
            .map(Self)
            .map_err(|e| Error::InvalidDuration(format!("{secs}: {e}")))
    }
}

impl From<SignedDuration> for TokenDuration {
    fn from(duration: SignedDuration) -> Self {
        Self(duration)
    }
}

impl From<TokenDuration> for SignedDuration {
    fn from(duration: TokenDuration) -> Self {
        duration.0
    }
}

impl FromStr for TokenDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
            PARSER.parse_duration(trimmed)
        } else {
            PARSER.parse_duration(format!("{trimmed}s"))
        };
        parsed
            .map(Self)
            .map_err(|e| Error::InvalidDuration(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for TokenDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for TokenDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

struct TokenDurationVisitor;

impl Visitor<'_> for TokenDurationVisitor {
    type Value = TokenDuration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number of seconds or a duration string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(TokenDuration::from_secs(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let secs = i64::try_from(v).map_err(|_| E::custom(format!("invalid duration: {v}")))?;
        Ok(TokenDuration::from_secs(secs))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        TokenDuration::from_secs_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TokenDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenDurationVisitor)
    }
}
