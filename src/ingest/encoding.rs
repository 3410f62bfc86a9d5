// src/ingest/encoding.rs
use encoding_rs::{EUC_KR, UTF_8};
use std::{borrow::Cow, fmt};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encodings the reader knows how to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8, with a leading byte-order mark stripped if present.
    Utf8Sig,
    /// UTF-8, a BOM (if any) is kept as data.
    Utf8,
    /// Windows code page 949 (Unified Hangul Code), a superset of EUC-KR.
    Cp949,
    /// Strict EUC-KR: only KS X 1001 double-byte sequences.
    EucKr,
}

/// Priority order used by the reader: most likely first.
pub const CANDIDATES: [TextEncoding; 4] = [
    TextEncoding::Utf8Sig,
    TextEncoding::Utf8,
    TextEncoding::Cp949,
    TextEncoding::EucKr,
];

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Cp949 => "cp949",
            TextEncoding::EucKr => "euc-kr",
        }
    }

    /// Decode `raw` without replacement characters. `None` means the bytes
    /// are not valid in this encoding.
    pub fn decode(self, raw: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            TextEncoding::Utf8Sig => {
                let body = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
                UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            TextEncoding::Utf8 => UTF_8.decode_without_bom_handling_and_without_replacement(raw),
            TextEncoding::Cp949 => EUC_KR.decode_without_bom_handling_and_without_replacement(raw),
            TextEncoding::EucKr => {
                if !is_ks_x_1001(raw) {
                    return None;
                }
                EUC_KR.decode_without_bom_handling_and_without_replacement(raw)
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// True when every non-ASCII byte pair has lead and trail in `0xA1..=0xFE`,
/// which rules out the CP949 extension area.
fn is_ks_x_1001(raw: &[u8]) -> bool {
    let wide = 0xA1..=0xFE;
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b < 0x80 {
            i += 1;
            continue;
        }
        match raw.get(i + 1) {
            Some(t) if wide.contains(&b) && wide.contains(t) => i += 2,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn euc_kr_bytes(s: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = EUC_KR.encode(s);
        assert!(!had_errors, "{s} is not representable in CP949");
        bytes.into_owned()
    }

    #[test]
    fn utf8_sig_strips_bom_and_utf8_keeps_it() {
        let raw = b"\xEF\xBB\xBFabc";
        assert_eq!(TextEncoding::Utf8Sig.decode(raw).as_deref(), Some("abc"));
        assert_eq!(TextEncoding::Utf8.decode(raw).as_deref(), Some("\u{feff}abc"));
    }

    #[test]
    fn utf8_sig_accepts_input_without_bom() {
        assert_eq!(
            TextEncoding::Utf8Sig.decode("연도".as_bytes()).as_deref(),
            Some("연도")
        );
    }

    #[test]
    fn legacy_korean_is_not_utf8() {
        let raw = euc_kr_bytes("연도,구분");
        assert!(TextEncoding::Utf8Sig.decode(&raw).is_none());
        assert!(TextEncoding::Utf8.decode(&raw).is_none());
        assert_eq!(TextEncoding::Cp949.decode(&raw).as_deref(), Some("연도,구분"));
        assert_eq!(TextEncoding::EucKr.decode(&raw).as_deref(), Some("연도,구분"));
    }

    #[test]
    fn strict_euc_kr_rejects_cp949_extension() {
        // 똠 lives in the CP949 extension area, outside KS X 1001.
        let raw = euc_kr_bytes("똠");
        assert!(raw[0] < 0xA1);
        assert_eq!(TextEncoding::Cp949.decode(&raw).as_deref(), Some("똠"));
        assert!(TextEncoding::EucKr.decode(&raw).is_none());
    }

    #[test]
    fn truncated_double_byte_fails_everywhere() {
        let mut raw = euc_kr_bytes("검거");
        raw.pop();
        for enc in CANDIDATES {
            assert!(enc.decode(&raw).is_none(), "{enc} accepted a truncated sequence");
        }
    }
}
