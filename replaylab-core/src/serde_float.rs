//! Serde helpers for floats that may be NaN or infinite.
//!
//! JSON has no encoding for non-finite numbers and `serde_json` writes them as
//! `null`, which then fails to read back as `f64`. These helpers write finite
//! values as numbers and the rest as the strings `"NaN"`, `"inf"`, `"-inf"`.
//! `null` is read back as NaN.
//!
//! Use with `#[serde(with = "crate::serde_float")]` or
//! `#[serde(with = "crate::serde_float::vec")]`.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Num(f64),
    Tag(String),
    Null(()),
}

fn from_repr<E: de::Error>(repr: Repr) -> Result<f64, E> {
    match repr {
        Repr::Num(v) => Ok(v),
        Repr::Null(()) => Ok(f64::NAN),
        Repr::Tag(s) => match s.as_str() {
            "NaN" | "nan" => Ok(f64::NAN),
            "inf" | "+inf" | "Infinity" => Ok(f64::INFINITY),
            "-inf" | "-Infinity" => Ok(f64::NEG_INFINITY),
            other => Err(E::custom(format!("invalid float tag {other:?}"))),
        },
    }
}

fn tag(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(tag(*value))
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    from_repr(Repr::deserialize(deserializer)?)
}

/// Same encoding for `Vec<f64>`.
pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for v in values {
            if v.is_finite() {
                seq.serialize_element(v)?;
            } else {
                seq.serialize_element(tag(*v))?;
            }
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Repr>::deserialize(deserializer)?
            .into_iter()
            .map(from_repr)
            .collect()
    }
}
