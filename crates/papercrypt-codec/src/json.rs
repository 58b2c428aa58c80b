//! Compact JSON form, used where the text form is too large (2D codes)
//!
//! Keys are deliberately short:
//! `{"v":"2.0.0","f":"PGP","sn":"K7PX2M","p":"…","cm":"…","ct":"…","d_c24":1,"d_c32":2,"d_s256":"…","d":"…"}`

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use papercrypt_core::{DataFormat, ParsePolicy};
use serde::{Deserialize, Serialize};

use crate::checksum::{crc24, crc32, sha256};
use crate::document::{format_timestamp, parse_timestamp, Document, Metadata};
use crate::error::ParseError;
use crate::parser::{decode_sha256, ParsedDocument, Verifier};
use crate::version::{FormatVersion, FORMAT_VERSION};

#[derive(Debug, Serialize, Deserialize)]
struct DocumentJson {
    #[serde(default)]
    v: Option<String>,
    f: DataFormat,
    sn: String,
    #[serde(default)]
    p: String,
    #[serde(default)]
    cm: String,
    ct: String,
    #[serde(default)]
    d_c24: Option<u32>,
    #[serde(default)]
    d_c32: Option<u32>,
    #[serde(default)]
    d_s256: Option<String>,
    d: String,
}

impl Document {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&DocumentJson {
            v: Some(self.format_version().to_string()),
            f: self.data_format(),
            sn: self.serial_number().to_string(),
            p: self.purpose().to_string(),
            cm: self.comment().to_string(),
            ct: format_timestamp(self.created_at()),
            d_c24: Some(self.payload_crc24()),
            d_c32: Some(self.payload_crc32()),
            d_s256: Some(BASE64.encode(self.payload_sha256())),
            d: BASE64.encode(self.payload()),
        })
    }
}

/// Parse the JSON form with the same version gating and checksum checks as
/// the text form.
pub fn parse_json(input: &[u8], policy: &ParsePolicy) -> Result<ParsedDocument, ParseError> {
    let json: DocumentJson = serde_json::from_slice(input)?;

    let mut verifier = Verifier::new(policy);
    let (generation, version) = verifier.classify(json.v.as_deref())?;
    // The JSON form postdates 1.x: the payload is already in the current
    // layout, only the version label is restamped
    let (version, upgraded_from) = match generation {
        FormatVersion::Major1 => (FORMAT_VERSION.to_string(), Some(version)),
        _ => (version, None),
    };

    let created_at = parse_timestamp(&json.ct).map_err(|reason| ParseError::InvalidField {
        field: "ct",
        value: json.ct.clone(),
        reason,
    })?;
    let payload = BASE64
        .decode(json.d.trim())
        .map_err(|e| ParseError::InvalidField {
            field: "d",
            value: json.d.clone(),
            reason: format!("invalid base64: {e}"),
        })?;

    let actual = crc24(&payload);
    match json.d_c24 {
        Some(recorded) => verifier.compare(
            "d_c24",
            format!("{recorded:06X}"),
            format!("{actual:06X}"),
            recorded == actual,
        )?,
        None => verifier.checksum_problem(ParseError::MissingField("d_c24"))?,
    }
    let actual = crc32(&payload);
    match json.d_c32 {
        Some(recorded) => verifier.compare(
            "d_c32",
            format!("{recorded:08X}"),
            format!("{actual:08X}"),
            recorded == actual,
        )?,
        None => verifier.checksum_problem(ParseError::MissingField("d_c32"))?,
    }
    let actual = sha256(&payload);
    match json.d_s256.as_deref().map(|value| (value, decode_sha256(value))) {
        Some((value, Ok(recorded))) => verifier.compare(
            "d_s256",
            value.to_string(),
            BASE64.encode(actual),
            recorded == actual,
        )?,
        Some((value, Err(reason))) => verifier.checksum_problem(ParseError::InvalidField {
            field: "d_s256",
            value: value.to_string(),
            reason,
        })?,
        None => verifier.checksum_problem(ParseError::MissingField("d_s256"))?,
    }

    let metadata = Metadata {
        serial_number: json.sn,
        purpose: json.p,
        comment: json.cm,
        created_at,
    };

    Ok(ParsedDocument {
        document: Document::new(version, json.f, metadata, payload)?,
        warnings: verifier.finish(),
        upgraded_from,
    })
}
