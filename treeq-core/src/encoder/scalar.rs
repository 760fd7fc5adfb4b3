//! Typed interpretation of scalar nodes, shared by the typed encoders

use crate::node::{tags, CandidateNode};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scalar<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

/// Interpret a scalar node according to its tag.
/// Values that don't parse under their tag fall back to strings.
pub(crate) fn classify(node: &CandidateNode) -> Scalar<'_> {
    let value = node.value.as_str();
    match node.tag.as_str() {
        tags::NULL => Scalar::Null,
        tags::BOOL => match value {
            "true" | "True" | "TRUE" => Scalar::Bool(true),
            "false" | "False" | "FALSE" => Scalar::Bool(false),
            _ => Scalar::Str(value),
        },
        tags::INT => parse_int(value).map(Scalar::Int).unwrap_or(Scalar::Str(value)),
        tags::FLOAT => parse_float(value).map(Scalar::Float).unwrap_or(Scalar::Str(value)),
        _ => Scalar::Str(value),
    }
}

fn parse_int(value: &str) -> Option<i64> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let parsed = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = digits.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else {
        digits.replace('_', "").parse::<i64>().ok()?
    };
    Some(if negative { -parsed } else { parsed })
}

fn parse_float(value: &str) -> Option<f64> {
    match value {
        ".inf" | ".Inf" | ".INF" | "+.inf" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => value.parse::<f64>().ok(),
    }
}
