use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;

/// Decoded query parameters plus whether any segment was malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub params: BTreeMap<String, String>,
    pub malformed: bool,
}

/// Decodes a raw query string into parameter pairs.
///
/// - Splits on `&` (empty segments are skipped), then each pair on the first `=`
/// - Percent-decodes keys and values (`%XX` only; `+` stays literal)
/// - A pair without `=` maps to an empty value
/// - Duplicate keys: the last occurrence wins
///
/// Malformed input never fails the line. Broken `%` triplets are kept
/// literally, invalid UTF-8 is decoded lossily and empty keys are dropped;
/// each of these sets [`QueryParams::malformed`].
pub fn parse_query(query: &str) -> QueryParams {
    let mut out = QueryParams::default();

    for part in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_val) = part.split_once('=').unwrap_or((part, ""));

        let (key, key_ok) = decode_component(raw_key);
        let (val, val_ok) = decode_component(raw_val);
        out.malformed |= !(key_ok && val_ok);

        if key.is_empty() {
            out.malformed = true;
            continue;
        }

        out.params.insert(key, val);
    }

    out
}

fn decode_component(raw: &str) -> (String, bool) {
    let escapes_ok = has_valid_escapes(raw);

    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => (decoded.into_owned(), escapes_ok),
        Err(_) => (
            percent_decode_str(raw).decode_utf8_lossy().into_owned(),
            false,
        ),
    }
}

/// Every `%` must start a complete triplet with two hexadecimal digits.
fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let complete = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !complete {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    true
}
