//! Forgiving decoders for snapshot fields.
//!
//! Warehouse exports serialise numeric columns as integers, floats or
//! strings depending on the exporter; header columns arrive either already
//! collapsed into an object or as the raw list of name/value pairs.

use crate::{normalize_headers, HeaderMap};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

pub(crate) fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientU64)
}

struct LenientU64;

impl<'de> Visitor<'de> for LenientU64 {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer, integral float or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative value {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            Ok(v as u64)
        } else {
            Err(E::custom(format!("expected an integral value, got {v}")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        let v = v.trim();
        if let Ok(parsed) = v.parse::<u64>() {
            return Ok(parsed);
        }
        let parsed = v
            .parse::<f64>()
            .map_err(|_| E::custom(format!("not a number: {v:?}")))?;
        self.visit_f64(parsed)
    }

    fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
        Ok(0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHeaders {
    Map(HeaderMap),
    List(Vec<RawHeader>),
}

#[derive(Deserialize)]
struct RawHeader {
    name: String,
    value: String,
}

pub(crate) fn de_headers<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawHeaders>::deserialize(deserializer)?;
    Ok(match raw {
        None => HeaderMap::new(),
        Some(RawHeaders::Map(map)) => {
            normalize_headers(map.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        }
        Some(RawHeaders::List(list)) => {
            normalize_headers(list.iter().map(|h| (h.name.as_str(), h.value.as_str())))
        }
    })
}
