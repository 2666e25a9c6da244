//! Chapter payload decoder.
//!
//! Chapter pages carry their data inside an obfuscated inline script of the
//! shape `window["\x65\x76\x61\x6c"](<expr>)`. `<expr>` is built exclusively
//! from escaped string literals and `+` concatenation, so instead of running
//! a script engine we evaluate it with a restricted literal-unescaping
//! interpreter that rejects anything else. The resulting string is a
//! `SMH.reader({...}).preInit();` call whose argument is the JSON payload.

use super::images;
use super::SOURCE;
use crate::error::{ExtractError, ExtractResult};
use crate::identity::chapter_hash;
use crate::models::Chapter;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

const SCRIPT_WRAPPER_PATTERN: &str = r#"(?s)^window\["\\x65\\x76\\x61\\x6c"\](.+)$"#;
const READER_CALL_PATTERN: &str = r"(?s)^SMH\.reader\((.+)\)\.preInit\(\);";

/// Ids arrive as JSON numbers on live pages but as strings in older markup;
/// both are accepted and normalized to strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Num(u64),
    Str(String),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Num(n) => n.to_string(),
            IdValue::Str(s) => s,
        }
    }
}

/// Schema of the reader payload. Unknown fields are ignored; missing required
/// fields fail the whole operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReaderData {
    book_id: IdValue,
    chapter_id: IdValue,
    book_name: String,
    chapter_title: String,
    images: Vec<String>,
    #[serde(default)]
    next_id: Option<IdValue>,
    #[serde(default)]
    prev_id: Option<IdValue>,
    /// Opaque signing parameters appended to every image URL.
    #[serde(default)]
    sl: BTreeMap<String, serde_json::Value>,
}

pub(super) fn extract_chapter(text: &str) -> ExtractResult<Chapter> {
    let document = Html::parse_document(text);

    let script_sel = Selector::parse("script:not([src])").unwrap();
    let wrapper_re = Regex::new(SCRIPT_WRAPPER_PATTERN).unwrap();

    let expr = document
        .select(&script_sel)
        .filter_map(|script| {
            let content = script.text().collect::<String>();
            wrapper_re
                .captures(content.trim())
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .next()
        .ok_or_else(|| {
            ExtractError::StructuralMismatch(
                "no obfuscated reader script on chapter page".to_string(),
            )
        })?;

    let decoded = eval_string_expression(&expr)?;

    let reader_re = Regex::new(READER_CALL_PATTERN).unwrap();
    let raw_json = reader_re
        .captures(decoded.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            ExtractError::MalformedPayload(
                "decoded script does not contain a reader call".to_string(),
            )
        })?;

    let data: ReaderData = serde_json::from_str(raw_json)?;

    let manga_id = data.book_id.into_string();
    let chapter_id = data.chapter_id.into_string();
    log::debug!(
        "decoded chapter {chapter_id} of manga {manga_id}: {} pages",
        data.images.len()
    );

    Ok(Chapter {
        hash: chapter_hash(SOURCE, &manga_id, &chapter_id),
        manga_id,
        chapter_id,
        name: data.book_name,
        title: data.chapter_title,
        headers: images::image_headers(),
        images: images::build_image_urls(&data.images, &data.sl),
        next_id: data.next_id.map(IdValue::into_string),
        prev_id: data.prev_id.map(IdValue::into_string),
    })
}

/// Evaluate an expression made of string literals and `+` concatenation.
///
/// Accepted tokens: single/double-quoted literals (with `\xNN`, `\uNNNN` and
/// the usual single-character escapes), `+`, parentheses, whitespace and a
/// trailing semicolon. Any other token is a decode failure; this interpreter
/// must never grow into a code executor.
fn eval_string_expression(expr: &str) -> ExtractResult<String> {
    let mut chars = expr.char_indices().peekable();
    let mut units: Vec<u16> = Vec::new();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            '"' | '\'' => {
                chars.next();
                read_literal(&mut chars, ch, &mut units)?;
            }
            '+' | '(' | ')' | ';' => {
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            other => {
                return Err(ExtractError::DecodeFailure(format!(
                    "unsupported token '{other}' at offset {offset} in obfuscated script"
                )));
            }
        }
    }

    String::from_utf16(&units)
        .map_err(|_| ExtractError::DecodeFailure("unpaired surrogate in string literal".to_string()))
}

/// Read one quoted literal (opening quote already consumed) into UTF-16
/// units. Escapes decode to code units so surrogate pairs split across two
/// `\u` escapes reassemble correctly.
fn read_literal(
    chars: &mut Peekable<CharIndices<'_>>,
    quote: char,
    units: &mut Vec<u16>,
) -> ExtractResult<()> {
    let mut buf = [0u16; 2];
    loop {
        let (_, c) = chars
            .next()
            .ok_or_else(|| ExtractError::DecodeFailure("unterminated string literal".to_string()))?;
        if c == quote {
            return Ok(());
        }
        if c != '\\' {
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }

        let (_, esc) = chars
            .next()
            .ok_or_else(|| ExtractError::DecodeFailure("truncated escape sequence".to_string()))?;
        match esc {
            'x' => units.push(hex_escape(chars, 2)?),
            'u' => units.push(hex_escape(chars, 4)?),
            'n' => units.push(b'\n' as u16),
            'r' => units.push(b'\r' as u16),
            't' => units.push(b'\t' as u16),
            'b' => units.push(0x08),
            'f' => units.push(0x0C),
            'v' => units.push(0x0B),
            '0' => units.push(0),
            // Identity escapes (\\, \', \", \/ and anything else) decode to
            // the escaped character itself.
            other => units.extend_from_slice(other.encode_utf16(&mut buf)),
        }
    }
}

fn hex_escape(chars: &mut Peekable<CharIndices<'_>>, digits: u32) -> ExtractResult<u16> {
    let mut value: u16 = 0;
    for _ in 0..digits {
        let (_, c) = chars
            .next()
            .ok_or_else(|| ExtractError::DecodeFailure("truncated hex escape".to_string()))?;
        let digit = c.to_digit(16).ok_or_else(|| {
            ExtractError::DecodeFailure(format!("invalid hex digit '{c}' in escape"))
        })? as u16;
        value = value.wrapping_mul(16).wrapping_add(digit);
    }
    Ok(value)
}
