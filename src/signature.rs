//! Magic signature decoding and prefix matching.
//!
//! A descriptor lists zero or more alternative magics; a header matches the
//! descriptor when any of them is a byte-exact prefix. Short magics are weak
//! evidence (many unrelated streams start with `0x1D`), so the matched length
//! decides the confidence tier.

use crate::catalog::FormatDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Magics at least this long identify a format with high confidence.
pub const HIGH_CONFIDENCE_MIN_LEN: usize = 4;

/// How strongly a piece of evidence identifies a format.
///
/// Ordered so that `High > Medium > Low`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Tier for a magic of `len` bytes; extension evidence is always `Low`.
    pub fn for_magic_len(len: usize) -> Self {
        if len >= HIGH_CONFIDENCE_MIN_LEN {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a magic value is spelled in the catalog.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SignatureKind {
    /// Hex-encoded binary prefix, e.g. `0x89504E47`.
    #[serde(rename = "bytes")]
    RawBytes,
    /// Literal ASCII prefix compared byte-for-byte.
    #[serde(rename = "string")]
    AsciiText,
}

/// A decoded magic prefix.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Signature {
    kind: SignatureKind,
    bytes: Vec<u8>,
}

impl Signature {
    /// Decode a catalog magic value.
    ///
    /// The error is a bare reason; the loader attaches the entry location.
    pub fn decode(kind: SignatureKind, value: &str) -> Result<Self, String> {
        let bytes = match kind {
            SignatureKind::RawBytes => decode_hex(value)?,
            SignatureKind::AsciiText => {
                if value.is_empty() {
                    return Err("string magic must not be empty".to_string());
                }
                if !value.is_ascii() {
                    return Err(format!("string magic '{value}' is not ASCII"));
                }
                value.as_bytes().to_vec()
            }
        };
        Ok(Self { kind, bytes })
    }

    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: SignatureKind::RawBytes,
            bytes: bytes.into(),
        }
    }

    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Catalog spelling of the value: `0x` + uppercase hex, or the literal text.
    pub fn encode(&self) -> String {
        match self.kind {
            SignatureKind::RawBytes => {
                let mut out = String::with_capacity(2 + self.bytes.len() * 2);
                out.push_str("0x");
                for byte in &self.bytes {
                    out.push_str(&format!("{byte:02X}"));
                }
                out
            }
            SignatureKind::AsciiText => String::from_utf8_lossy(&self.bytes).into_owned(),
        }
    }

    /// True when the header starts with this magic. Short headers never match.
    pub fn is_prefix_of(&self, header: &[u8]) -> bool {
        !self.bytes.is_empty() && header.starts_with(&self.bytes)
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::for_magic_len(self.bytes.len())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SignatureKind::RawBytes => f.write_str(&self.encode()),
            SignatureKind::AsciiText => write!(f, "\"{}\"", self.encode()),
        }
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return Err(format!("bytes magic '{value}' has no hex digits"));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("bytes magic '{value}' has an odd number of hex digits"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("bytes magic '{value}' is not hexadecimal"));
    }
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).map_err(|err| err.to_string())?;
            u8::from_str_radix(pair, 16).map_err(|err| format!("bytes magic '{value}': {err}"))
        })
        .collect()
}

/// The magic that identified a descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureMatch<'d> {
    /// Position of the magic within the descriptor's list.
    pub index: usize,
    pub signature: &'d Signature,
    pub confidence: Confidence,
}

/// Match `header` against every magic of `descriptor`.
///
/// Alternatives are OR-ed. When several match, the longest wins and equal
/// lengths keep the first declared. Descriptors without magics never match.
pub fn match_descriptor<'d>(
    descriptor: &'d FormatDescriptor,
    header: &[u8],
) -> Option<SignatureMatch<'d>> {
    let mut best: Option<(usize, &'d Signature)> = None;
    for (index, signature) in descriptor.magics().iter().enumerate() {
        if !signature.is_prefix_of(header) {
            continue;
        }
        match best {
            Some((_, current)) if current.len() >= signature.len() => {}
            _ => best = Some((index, signature)),
        }
    }
    best.map(|(index, signature)| SignatureMatch {
        index,
        signature,
        confidence: signature.confidence(),
    })
}
