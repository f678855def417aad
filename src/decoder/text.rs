use encoding_rs::{
    Encoding, ISO_8859_2, ISO_8859_3, ISO_8859_4, ISO_8859_5, ISO_8859_6, ISO_8859_7, ISO_8859_8,
    ISO_8859_13, ISO_8859_15, SHIFT_JIS, UTF_8, WINDOWS_874, WINDOWS_1254,
};
use tracing::debug;

/// ECI designator for Shift_JIS, also used for kanji-mode payloads
pub const ECI_SHIFT_JIS: u32 = 20;

enum Charset {
    Latin1,
    Other(&'static Encoding),
}

fn charset_for_eci(eci: u32) -> Option<Charset> {
    let encoding = match eci {
        1 | 3 => return Some(Charset::Latin1),
        4 => ISO_8859_2,
        5 => ISO_8859_3,
        6 => ISO_8859_4,
        7 => ISO_8859_5,
        8 => ISO_8859_6,
        9 => ISO_8859_7,
        10 => ISO_8859_8,
        // ISO-8859-9 is decoded as its windows-1254 superset
        11 => WINDOWS_1254,
        13 => WINDOWS_874,
        15 => ISO_8859_13,
        17 => ISO_8859_15,
        20 => SHIFT_JIS,
        26 => UTF_8,
        _ => return None,
    };
    Some(Charset::Other(encoding))
}

/// Turn a QR payload into text.
///
/// A declared ECI designator wins when it names a charset we know. Without
/// one the payload is read as UTF-8 if valid, then as Shift_JIS if the bytes
/// look Japanese, and otherwise as ISO-8859-1, the byte-mode default.
pub fn decode_payload(bytes: &[u8], eci: Option<u32>) -> String {
    if let Some(eci) = eci {
        match charset_for_eci(eci) {
            Some(charset) => return decode_as(bytes, charset),
            None => debug!(eci, "unsupported ECI designator, guessing the charset"),
        }
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_owned();
    }
    if looks_like_shift_jis(bytes) {
        return decode_as(bytes, Charset::Other(SHIFT_JIS));
    }
    decode_as(bytes, Charset::Latin1)
}

fn decode_as(bytes: &[u8], charset: Charset) -> String {
    match charset {
        Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        Charset::Other(encoding) => {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// Latin text decodes cleanly as Shift_JIS surprisingly often, since most
/// accented letters are valid lead or half-width katakana bytes. Only pick
/// Shift_JIS when ISO-8859-1 is implausible: C1 control bytes, or a high
/// share of the symbol block 0xA0..0xC0 that Latin text rarely uses.
fn looks_like_shift_jis(bytes: &[u8]) -> bool {
    let (_, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
    if had_errors {
        return false;
    }
    if bytes.iter().any(|b| (0x80..0xa0).contains(b)) {
        return true;
    }
    let symbols = bytes
        .iter()
        .filter(|&&b| (0xa0..0xc0).contains(&b) || b == 0xd7 || b == 0xf7)
        .count();
    symbols * 10 >= bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_payload("Bäcker Straße".as_bytes(), None), "Bäcker Straße");
        assert_eq!(
            decode_payload(b"http://en.m.wikipedia.org", None),
            "http://en.m.wikipedia.org"
        );
    }

    #[test]
    fn test_shift_jis() {
        for text in ["ドーナツが好き", "ようこそ、フリー百科事典へ！"] {
            let (bytes, _, _) = SHIFT_JIS.encode(text);
            assert!(std::str::from_utf8(&bytes).is_err());
            assert_eq!(decode_payload(&bytes, None), text);
        }
    }

    #[test]
    fn test_latin1() {
        assert_eq!(decode_payload(b"B\xe4cker Stra\xdfe", None), "Bäcker Straße");
        assert_eq!(decode_payload(b"Stra\xdfe", None), "Straße");
        assert_eq!(decode_payload(b"caf\xe9 cr\xe8me", None), "café crème");
    }

    #[test]
    fn test_half_width_katakana() {
        // "ｱｲｳ" in Shift_JIS
        assert_eq!(decode_payload(b"\xb1\xb2\xb3", None), "ｱｲｳ");
    }

    #[test]
    fn test_eci_overrides_guess() {
        let (sjis, _, _) = SHIFT_JIS.encode("好き");
        assert_eq!(decode_payload(&sjis, Some(ECI_SHIFT_JIS)), "好き");
        assert_eq!(decode_payload("Straße".as_bytes(), Some(26)), "Straße");
        // valid UTF-8 bytes, but declared ISO-8859-1
        assert_eq!(decode_payload("ß".as_bytes(), Some(3)), "Ã\u{9f}");
        assert_eq!(decode_payload(b"\xb1", Some(4)), "ą");
    }

    #[test]
    fn test_unknown_eci_falls_back_to_guess() {
        assert_eq!(decode_payload(b"B\xe4cker", Some(2)), "Bäcker");
    }

    #[test]
    fn test_empty() {
        assert_eq!(decode_payload(&[], None), "");
    }
}
