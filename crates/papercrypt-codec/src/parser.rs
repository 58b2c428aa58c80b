//! Whole-document text form
//!
//! ```text
//! <header lines>
//! Header CRC-32: <8 hex>
//!
//!
//! <body lines>
//! ```
//!
//! Parsing reads the header, classifies the version once, then hands off to
//! the reader for that generation. Every step returns a typed error; the
//! policy decides which integrity and version problems become warnings.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use papercrypt_core::{DataFormat, HeaderStyle, HexCase, ParsePolicy};
use papercrypt_crypto::gzip_compress;

use crate::checksum::{crc24, crc32, sha256};
use crate::document::{format_timestamp, parse_timestamp, Document, Metadata};
use crate::error::{ParseError, ParseWarning};
use crate::header::{render_header, Header};
use crate::lines::{decode_lines_capped, encode_lines, format_hex};
use crate::version::{v2, FormatVersion, Layout, FORMAT_VERSION, LAYOUT_V1, LAYOUT_V2, VERSION_FIELD};

/// Separates the header section from the body
pub const SEPARATOR: &str = "\n\n\n";

/// Presentation choices for [`Document::to_text`]. Parsing accepts either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub hex_case: HexCase,
    pub header_style: HeaderStyle,
}

/// Result of a successful parse.
#[derive(Debug)]
pub struct ParsedDocument {
    pub document: Document,
    /// Problems the policy downgraded, in the order they were found
    pub warnings: Vec<ParseWarning>,
    /// Original version string when a legacy document was upgraded on read
    pub upgraded_from: Option<String>,
}

impl Document {
    /// Header fields in their canonical order, excluding the checksum line.
    pub fn header_fields(&self, case: HexCase) -> Vec<(&'static str, String)> {
        vec![
            (v2::VERSION, self.format_version().to_string()),
            (v2::SERIAL, self.serial_number().to_string()),
            (v2::PURPOSE, self.purpose().to_string()),
            (v2::COMMENT, self.comment().to_string()),
            (v2::DATE, format_timestamp(self.created_at())),
            (v2::DATA_FORMAT, self.data_format().to_string()),
            (v2::CONTENT_LENGTH, self.payload().len().to_string()),
            (v2::CONTENT_CRC24, format_hex(self.payload_crc24(), 6, case)),
            (v2::CONTENT_CRC32, format_hex(self.payload_crc32(), 8, case)),
            (v2::CONTENT_SHA256, BASE64.encode(self.payload_sha256())),
        ]
    }

    /// Header section including its checksum line, without a trailing newline.
    pub fn header_text(&self, style: HeaderStyle, case: HexCase) -> String {
        render_header(&self.header_fields(case), v2::HEADER_CRC32, style, case)
    }

    /// Body lines, without a trailing newline.
    pub fn body_text(&self, case: HexCase) -> String {
        encode_lines(self.payload(), v2::BYTES_PER_LINE, case)
    }

    pub fn to_text(&self, options: &RenderOptions) -> String {
        format!(
            "{}{SEPARATOR}{}\n",
            self.header_text(options.header_style, options.hex_case),
            self.body_text(options.hex_case)
        )
    }
}

/// Collects downgraded problems while a document is read.
pub(crate) struct Verifier<'a> {
    policy: &'a ParsePolicy,
    warnings: Vec<ParseWarning>,
}

impl<'a> Verifier<'a> {
    pub(crate) fn new(policy: &'a ParsePolicy) -> Self {
        Self {
            policy,
            warnings: Vec::new(),
        }
    }

    /// Fail with `err` unless checksum problems are being ignored.
    pub(crate) fn checksum_problem(&mut self, err: ParseError) -> Result<(), ParseError> {
        if self.policy.ignore_checksum_mismatch {
            self.warnings.push(ParseWarning::Checksum(err));
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Fail with `err` unless version problems are being ignored.
    pub(crate) fn version_problem(&mut self, err: ParseError) -> Result<(), ParseError> {
        if self.policy.ignore_version_mismatch {
            self.warnings.push(ParseWarning::Version(err));
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Classify a recorded version string, gating missing and unknown ones.
    ///
    /// A missing version reads as the current format.
    pub(crate) fn classify(
        &mut self,
        recorded: Option<&str>,
    ) -> Result<(FormatVersion, String), ParseError> {
        let Some(version) = recorded.map(str::trim).filter(|v| !v.is_empty()) else {
            self.version_problem(ParseError::MissingVersion)?;
            return Ok((FormatVersion::Major2, FORMAT_VERSION.to_string()));
        };

        let generation = FormatVersion::classify(version);
        if !generation.is_supported() {
            self.version_problem(ParseError::UnsupportedVersion(version.to_string()))?;
        }
        Ok((generation, version.to_string()))
    }

    /// Compare a recorded value with the computed one.
    pub(crate) fn compare(
        &mut self,
        field: &'static str,
        recorded: String,
        computed: String,
        matches: bool,
    ) -> Result<(), ParseError> {
        if matches {
            return Ok(());
        }
        self.checksum_problem(ParseError::ChecksumMismatch {
            field,
            expected: recorded,
            actual: computed,
        })
    }

    /// Check a hex checksum field. A missing or unreadable value counts as a
    /// checksum problem rather than a structural one.
    fn hex_field(
        &mut self,
        header: &Header,
        field: &'static str,
        digits: usize,
        computed: u32,
    ) -> Result<(), ParseError> {
        let Some(value) = header.get(field) else {
            return self.checksum_problem(ParseError::MissingField(field));
        };
        match parse_hex(value, digits) {
            Ok(recorded) => self.compare(
                field,
                format!("{recorded:0digits$X}"),
                format!("{computed:0digits$X}"),
                recorded == computed,
            ),
            Err(reason) => self.checksum_problem(ParseError::InvalidField {
                field,
                value: value.to_string(),
                reason,
            }),
        }
    }

    fn sha256_field(
        &mut self,
        header: &Header,
        field: &'static str,
        computed: &[u8; 32],
    ) -> Result<(), ParseError> {
        let Some(value) = header.get(field) else {
            return self.checksum_problem(ParseError::MissingField(field));
        };
        match decode_sha256(value) {
            Ok(recorded) => self.compare(
                field,
                BASE64.encode(recorded),
                BASE64.encode(computed),
                &recorded == computed,
            ),
            Err(reason) => self.checksum_problem(ParseError::InvalidField {
                field,
                value: value.to_string(),
                reason,
            }),
        }
    }

    pub(crate) fn finish(self) -> Vec<ParseWarning> {
        self.warnings
    }
}

/// Exactly `digits` hex digits, either case.
fn parse_hex(value: &str, digits: usize) -> Result<u32, String> {
    let value = value.trim();
    if value.len() != digits || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("expected {digits} hex digits"));
    }
    u32::from_str_radix(value, 16).map_err(|e| e.to_string())
}

pub(crate) fn decode_sha256(value: &str) -> Result<[u8; 32], String> {
    let bytes = BASE64
        .decode(value.trim())
        .map_err(|e| format!("invalid base64: {e}"))?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| format!("expected 32 bytes, found {}", bytes.len()))
}

/// Parse the text form of a document.
///
/// `\r\n` line endings are accepted. Structural parsing never decrypts.
pub fn parse_document(text: &str, policy: &ParsePolicy) -> Result<ParsedDocument, ParseError> {
    let text = text.replace("\r\n", "\n");
    let (header_section, body_section) = text
        .split_once(SEPARATOR)
        .ok_or(ParseError::MissingSeparator)?;
    let header = Header::parse(header_section)?;

    let mut verifier = Verifier::new(policy);
    let (generation, version) = verifier.classify(header.get(VERSION_FIELD))?;

    match generation {
        FormatVersion::Major1 => read_legacy(&header, body_section, version, verifier),
        FormatVersion::Major2 | FormatVersion::Devel | FormatVersion::Unknown => {
            read_current(&header, body_section, version, verifier)
        }
    }
}

/// 2.x and later: `Data Format` selects the payload layout.
fn read_current(
    header: &Header,
    body_section: &str,
    version: String,
    mut verifier: Verifier<'_>,
) -> Result<ParsedDocument, ParseError> {
    let layout = &LAYOUT_V2;
    verifier.hex_field(header, layout.header_crc32, 8, header.checksum(layout.header_crc32))?;

    let data_format = match layout.data_format {
        Some(field) => {
            let value = header.require(field)?;
            value
                .parse::<DataFormat>()
                .map_err(|reason| ParseError::InvalidField {
                    field,
                    value: value.to_string(),
                    reason,
                })?
        }
        None => DataFormat::Pgp,
    };
    let metadata = read_metadata(header, layout)?;
    let payload = read_body(header, body_section, layout, &mut verifier)?;

    Ok(ParsedDocument {
        document: Document::new(version, data_format, metadata, payload)?,
        warnings: verifier.finish(),
        upgraded_from: None,
    })
}

/// 1.x: the body is a bare encrypted message. After validation it is
/// wrapped into the current payload layout and restamped.
fn read_legacy(
    header: &Header,
    body_section: &str,
    version: String,
    mut verifier: Verifier<'_>,
) -> Result<ParsedDocument, ParseError> {
    let layout = &LAYOUT_V1;
    verifier.hex_field(header, layout.header_crc32, 8, header.checksum(layout.header_crc32))?;

    let metadata = read_metadata(header, layout)?;
    let body = read_body(header, body_section, layout, &mut verifier)?;
    let payload = gzip_compress(&body).map_err(ParseError::Upgrade)?;

    Ok(ParsedDocument {
        document: Document::new(FORMAT_VERSION, DataFormat::Pgp, metadata, payload)?,
        warnings: verifier.finish(),
        upgraded_from: Some(version),
    })
}

/// Serial and date are required; purpose and comment default to empty.
/// Values are kept byte-for-byte so a rendered document parses back unchanged.
fn read_metadata(header: &Header, layout: &Layout) -> Result<Metadata, ParseError> {
    let date = header.require(layout.date)?;
    let created_at = parse_timestamp(date).map_err(|reason| ParseError::InvalidField {
        field: layout.date,
        value: date.to_string(),
        reason,
    })?;

    Ok(Metadata {
        serial_number: header.require(layout.serial)?.to_string(),
        purpose: header.get(layout.purpose).unwrap_or_default().to_string(),
        comment: header.get(layout.comment).unwrap_or_default().to_string(),
        created_at,
    })
}

/// Decode body lines and check them against the header's content fields.
fn read_body(
    header: &Header,
    body_section: &str,
    layout: &Layout,
    verifier: &mut Verifier<'_>,
) -> Result<Vec<u8>, ParseError> {
    let body = decode_lines_capped(body_section, Some(layout.bytes_per_line))?;

    let declared = header.require(layout.content_length)?;
    if declared.trim() != body.len().to_string() {
        return Err(ParseError::LengthMismatch {
            declared: declared.to_string(),
            actual: body.len(),
        });
    }

    verifier.hex_field(header, layout.content_crc24, 6, crc24(&body))?;
    verifier.hex_field(header, layout.content_crc32, 8, crc32(&body))?;
    verifier.sha256_field(header, layout.content_sha256, &sha256(&body))?;

    Ok(body)
}

/// Parse either form: JSON when the first non-blank byte is `{`, text otherwise.
pub fn parse_any(input: &[u8], policy: &ParsePolicy) -> Result<ParsedDocument, ParseError> {
    let first = input.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'{') {
        return crate::json::parse_json(input, policy);
    }
    parse_document(&String::from_utf8_lossy(input), policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorClass, LineError};
    use chrono::{FixedOffset, TimeZone};

    fn metadata() -> Metadata {
        Metadata {
            serial_number: "K7PX2M".into(),
            purpose: "recovery codes".into(),
            comment: "drawer 2".into(),
            created_at: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 1, 14, 5, 9)
                .unwrap(),
        }
    }

    fn document() -> Document {
        let payload: Vec<u8> = (0u8..=60).map(|b| b.wrapping_mul(7)).collect();
        Document::new("2.0.0", DataFormat::Raw, metadata(), payload).unwrap()
    }

    fn strict() -> ParsePolicy {
        ParsePolicy::strict()
    }

    /// Replace the value of `field` and recompute the header checksum.
    fn with_field(text: &str, field: &str, value: &str) -> String {
        let (header, body) = text.split_once(SEPARATOR).unwrap();
        let fields: Vec<(&str, String)> = header
            .lines()
            .filter(|l| !l.starts_with("Header CRC-32"))
            .filter_map(|l| l.split_once(": "))
            .map(|(k, v)| (k, if k == field { value.to_string() } else { v.to_string() }))
            .collect();
        let header = render_header(&fields, v2::HEADER_CRC32, HeaderStyle::Plain, HexCase::Upper);
        format!("{header}{SEPARATOR}{body}")
    }

    #[test]
    fn text_layout() {
        let text = document().to_text(&RenderOptions::default());
        let (header, body) = text.split_once(SEPARATOR).unwrap();

        let keys: Vec<&str> = header.lines().map(|l| l.split(": ").next().unwrap()).collect();
        assert_eq!(
            keys,
            [
                "PaperCrypt Version",
                "Content Serial",
                "Purpose",
                "Comment",
                "Date",
                "Data Format",
                "Content Length",
                "Content CRC-24",
                "Content CRC-32",
                "Content SHA-256",
                "Header CRC-32",
            ]
        );
        assert!(header.contains("Date: 2024-03-01 14:05:09.000000000 +0100\n"));
        assert!(header.contains("Content Length: 61\n"));
        assert!(body.ends_with('\n'));
        assert!(!body.ends_with("\n\n"));
        assert_eq!(body.lines().count(), 4);
    }

    #[test]
    fn parses_what_it_renders() {
        let doc = document();
        for hex_case in [HexCase::Upper, HexCase::Lower] {
            for header_style in [HeaderStyle::Plain, HeaderStyle::Commented] {
                let options = RenderOptions { hex_case, header_style };
                let parsed = parse_document(&doc.to_text(&options), &strict()).unwrap();
                assert_eq!(parsed.document, doc, "{options:?}");
                assert!(parsed.warnings.is_empty());
                assert_eq!(parsed.upgraded_from, None);
            }
        }
    }

    #[test]
    fn accepts_crlf() {
        let doc = document();
        let text = doc.to_text(&RenderOptions::default()).replace('\n', "\r\n");
        assert_eq!(parse_document(&text, &strict()).unwrap().document, doc);
    }

    #[test]
    fn missing_separator() {
        let text = document().to_text(&RenderOptions::default()).replacen(SEPARATOR, "\n", 1);
        assert!(matches!(
            parse_document(&text, &strict()),
            Err(ParseError::MissingSeparator)
        ));
    }

    #[test]
    fn edited_comment_only_breaks_header_checksum() {
        let text = document().to_text(&RenderOptions::default());
        let edited = text.replace("Comment: drawer 2", "Comment: drawer 3");

        let err = parse_document(&edited, &strict()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ChecksumMismatch { field: "Header CRC-32", .. }
        ));

        let parsed = parse_document(&edited, &ParsePolicy::lenient()).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.document.comment(), "drawer 3");
    }

    #[test]
    fn content_checksums_are_each_checked() {
        let text = document().to_text(&RenderOptions::default());
        for field in ["Content CRC-24", "Content CRC-32"] {
            let zeros = if field.ends_with("24") { "000000" } else { "00000000" };
            let edited = with_field(&text, field, zeros);
            match parse_document(&edited, &strict()) {
                Err(ParseError::ChecksumMismatch { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{field}: {other:?}"),
            }
        }

        let edited = with_field(&text, "Content SHA-256", &BASE64.encode([0u8; 32]));
        assert!(matches!(
            parse_document(&edited, &strict()),
            Err(ParseError::ChecksumMismatch { field: "Content SHA-256", .. })
        ));
    }

    #[test]
    fn ignoring_checksums_collects_every_warning() {
        let text = document().to_text(&RenderOptions::default());
        let edited = with_field(&text, "Content CRC-24", "000000");
        let edited = with_field(&edited, "Content SHA-256", "not base64!");
        let edited = edited.replace("Comment: drawer 2", "Comment: drawer 9");

        let policy = ParsePolicy {
            ignore_checksum_mismatch: true,
            ignore_version_mismatch: false,
        };
        let parsed = parse_document(&edited, &policy).unwrap();
        let fields: Vec<String> = parsed.warnings.iter().map(|w| w.to_string()).collect();
        assert_eq!(fields.len(), 3, "{fields:?}");
        assert!(fields[0].contains("Header CRC-32"));
        assert!(fields[1].contains("Content CRC-24"));
        assert!(fields[2].contains("Content SHA-256"));
        assert!(parsed
            .warnings
            .iter()
            .all(|w| matches!(w, ParseWarning::Checksum(_))));
    }

    #[test]
    fn length_mismatch_is_never_ignorable() {
        let text = document().to_text(&RenderOptions::default());
        let edited = with_field(&text, "Content Length", "60");
        for policy in [strict(), ParsePolicy::lenient()] {
            let err = parse_document(&edited, &policy).unwrap_err();
            assert!(matches!(err, ParseError::LengthMismatch { actual: 61, .. }));
            assert_eq!(err.class(), ErrorClass::Structural);
        }
    }

    #[test]
    fn length_is_compared_as_decimal_text() {
        let text = document().to_text(&RenderOptions::default());
        let edited = with_field(&text, "Content Length", "061");
        assert!(matches!(
            parse_document(&edited, &strict()),
            Err(ParseError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn body_damage_is_never_ignorable() {
        let text = document().to_text(&RenderOptions::default());
        let (header, body) = text.split_once(SEPARATOR).unwrap();
        let mut lines: Vec<String> = body.lines().map(str::to_string).collect();
        // flip the first data byte of line 2
        let mut parts: Vec<String> = lines[1].split(' ').map(str::to_string).collect();
        parts[1] = if parts[1] == "00" { "01".into() } else { "00".into() };
        lines[1] = parts.join(" ");
        let damaged = format!("{header}{SEPARATOR}{}\n", lines.join("\n"));

        let err = parse_document(&damaged, &ParsePolicy::lenient()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Body(LineError::LineChecksum { number: 2, .. })
        ));
    }

    #[test]
    fn unsupported_version_is_gated() {
        let text = document().to_text(&RenderOptions::default());
        let edited = with_field(&text, "PaperCrypt Version", "3.0.0");

        let err = parse_document(&edited, &strict()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "3.0.0"));
        assert_eq!(err.class(), ErrorClass::Version);

        let policy = ParsePolicy {
            ignore_checksum_mismatch: false,
            ignore_version_mismatch: true,
        };
        let parsed = parse_document(&edited, &policy).unwrap();
        assert_eq!(parsed.document.format_version(), "3.0.0");
        assert_eq!(parsed.warnings.len(), 1);
        assert!(matches!(parsed.warnings[0], ParseWarning::Version(_)));
    }

    #[test]
    fn missing_version_is_gated() {
        let text = document().to_text(&RenderOptions::default());
        let (header, body) = text.split_once(SEPARATOR).unwrap();
        let fields: Vec<(&str, String)> = header
            .lines()
            .filter_map(|l| l.split_once(": "))
            .filter(|(k, _)| *k != "PaperCrypt Version" && *k != "Header CRC-32")
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        let header = render_header(&fields, v2::HEADER_CRC32, HeaderStyle::Plain, HexCase::Upper);
        let edited = format!("{header}{SEPARATOR}{body}");

        assert!(matches!(
            parse_document(&edited, &strict()),
            Err(ParseError::MissingVersion)
        ));
        let parsed = parse_document(&edited, &ParsePolicy::lenient()).unwrap();
        assert_eq!(parsed.document.format_version(), FORMAT_VERSION);
    }

    #[test]
    fn devel_version_reads_as_current() {
        let text = document().to_text(&RenderOptions::default());
        let edited = with_field(&text, "PaperCrypt Version", "(devel)");
        let parsed = parse_document(&edited, &strict()).unwrap();
        assert_eq!(parsed.document.format_version(), "(devel)");
        assert_eq!(parsed.document.payload(), document().payload());
    }

    #[test]
    fn unknown_data_format() {
        let text = document().to_text(&RenderOptions::default());
        let edited = with_field(&text, "Data Format", "Zip");
        assert!(matches!(
            parse_document(&edited, &ParsePolicy::lenient()),
            Err(ParseError::InvalidField { field: "Data Format", .. })
        ));
    }

    #[test]
    fn unparseable_date() {
        let text = document().to_text(&RenderOptions::default());
        let edited = with_field(&text, "Date", "last tuesday");
        let err = parse_document(&edited, &ParsePolicy::lenient()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "Date", .. }));
    }

    #[test]
    fn padded_metadata_survives_roundtrip() {
        let mut meta = metadata();
        meta.serial_number = " AB ".into();
        meta.purpose = "  spaced out ".into();
        let doc = Document::new("2.0.0", DataFormat::Raw, meta, vec![1, 2, 3]).unwrap();

        let parsed = parse_document(&doc.to_text(&RenderOptions::default()), &strict()).unwrap();
        assert_eq!(parsed.document.serial_number(), " AB ");
        assert_eq!(parsed.document, doc);
    }

    #[test]
    fn rebuilt_body_only_breaks_content_checksums() {
        let doc = Document::new("2.0.0", DataFormat::Raw, metadata(), vec![1, 2, 3, 4]).unwrap();
        let text = doc.to_text(&RenderOptions::default());
        let (header, _) = text.split_once(SEPARATOR).unwrap();
        // valid line and block checksums, same length, different bytes
        let body = encode_lines(&[1, 2, 3, 5], v2::BYTES_PER_LINE, HexCase::Upper);
        let edited = format!("{header}{SEPARATOR}{body}\n");

        match parse_document(&edited, &strict()) {
            Err(ParseError::ChecksumMismatch { field, .. }) => {
                assert_ne!(field, "Header CRC-32");
                assert!(field.starts_with("Content "), "{field}");
            }
            other => panic!("expected a content checksum mismatch, got {other:?}"),
        }

        let parsed = parse_document(&edited, &ParsePolicy::lenient()).unwrap();
        let fields: Vec<&str> = parsed
            .warnings
            .iter()
            .map(|w| match w.error() {
                ParseError::ChecksumMismatch { field, .. } => *field,
                other => panic!("unexpected warning {other:?}"),
            })
            .collect();
        assert_eq!(fields, ["Content CRC-24", "Content CRC-32", "Content SHA-256"]);
        assert_eq!(parsed.document.payload(), &[1, 2, 3, 5]);
    }

    #[test]
    fn parse_hex_requires_exact_width() {
        assert_eq!(parse_hex("00abCD", 6), Ok(0xABCD));
        assert!(parse_hex("abcd", 6).is_err());
        assert!(parse_hex("0000000G", 8).is_err());
    }

    #[test]
    fn parse_any_dispatches_on_first_byte() {
        let doc = document();
        let text = doc.to_text(&RenderOptions::default());
        assert_eq!(parse_any(text.as_bytes(), &strict()).unwrap().document, doc);

        let json = doc.to_json().unwrap();
        let mut padded = b"  \n".to_vec();
        padded.extend_from_slice(&json);
        assert_eq!(parse_any(&padded, &strict()).unwrap().document, doc);
    }
}
