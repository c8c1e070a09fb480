//! HTML entity and numeric character reference unescaping.

include!(concat!(env!("OUT_DIR"), "/entitydata.rs"));

// Entity names are alphanumeric; the longest in the table
// ("CounterClockwiseContourIntegral") is 31 bytes.
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 31;

/// Decode the reference whose body starts right after an `&`.  Returns the
/// replacement bytes and the number of input bytes consumed, through the
/// trailing `;`; `None` leaves the ampersand literal.
pub fn unescape(body: &[u8]) -> Option<(Vec<u8>, usize)> {
    if body.first() == Some(&b'#') {
        let (replacement, used) = decode_numeric(&body[1..])?;
        let mut buf = [0u8; 4];
        Some((
            replacement.encode_utf8(&mut buf).as_bytes().to_vec(),
            used + 1,
        ))
    } else {
        decode_named(body)
    }
}

/// A numeric reference body after the `#`: decimal digits, or `x`/`X` and
/// hex digits, then `;`.  One to eight digits; NUL, surrogates and
/// out-of-range values all decode to U+FFFD.
fn decode_numeric(body: &[u8]) -> Option<(char, usize)> {
    let (radix, prefix) = match body.first()? {
        b'x' | b'X' => (16, 1),
        _ => (10, 0),
    };

    let mut value: u32 = 0;
    let mut i = prefix;
    while i < body.len() {
        match (body[i] as char).to_digit(radix) {
            Some(digit) => {
                value = value
                    .saturating_mul(radix)
                    .saturating_add(digit)
                    .min(0x0011_0000);
                i += 1;
            }
            None => break,
        }
    }

    let digits = i - prefix;
    if digits == 0 || digits > 8 || body.get(i) != Some(&b';') {
        return None;
    }

    let replacement = match value {
        0 | 0xD800..=0xDFFF => '\u{FFFD}',
        v => char::from_u32(v).unwrap_or('\u{FFFD}'),
    };
    Some((replacement, i + 1))
}

fn decode_named(body: &[u8]) -> Option<(Vec<u8>, usize)> {
    let window = &body[..body.len().min(MAX_NAME_LENGTH + 1)];
    let end = window.iter().position(|&b| b == b';')?;
    if end < MIN_NAME_LENGTH || !window[..end].iter().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let name = std::str::from_utf8(&window[..end]).ok()?;
    let ix = entitydata::TRANSLATED_ENTITIES
        .binary_search_by(|(candidate, _)| candidate.cmp(&name))
        .ok()?;
    Some((
        entitydata::TRANSLATED_ENTITIES[ix].1.as_bytes().to_vec(),
        end + 1,
    ))
}

/// Unescape every reference in `src`.
pub fn unescape_html(src: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(src.len());
    let mut rest = src;

    loop {
        let amp = match rest.iter().position(|&b| b == b'&') {
            Some(amp) => amp,
            None => {
                out.extend_from_slice(rest);
                return out;
            }
        };

        out.extend_from_slice(&rest[..amp]);
        rest = &rest[amp + 1..];
        match unescape(rest) {
            Some((replacement, used)) => {
                out.extend_from_slice(&replacement);
                rest = &rest[used..];
            }
            None => out.push(b'&'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_numeric() {
        assert_eq!(unescape(b"amp;x"), Some((b"&".to_vec(), 4)));
        assert_eq!(unescape(b"#65;"), Some((b"A".to_vec(), 4)));
        assert_eq!(unescape(b"#x41;"), Some((b"A".to_vec(), 5)));
        assert_eq!(unescape(b"#0;"), Some(("\u{fffd}".as_bytes().to_vec(), 3)));
        assert_eq!(unescape(b"#xD800;"), Some(("\u{fffd}".as_bytes().to_vec(), 7)));
        assert_eq!(unescape(b"#999999999;"), None);
        assert_eq!(unescape(b"#;"), None);
        assert_eq!(unescape(b"nosuchentity;"), None);
        assert_eq!(unescape(b"amp"), None);
    }

    #[test]
    fn full_buffers() {
        assert_eq!(unescape_html(b"a &amp; b"), b"a & b".to_vec());
        assert_eq!(unescape_html(b"plain"), b"plain".to_vec());
        assert_eq!(unescape_html(b"&bogus"), b"&bogus".to_vec());
        assert_eq!(unescape_html(b"&amp;&amp;"), b"&&".to_vec());
    }
}
