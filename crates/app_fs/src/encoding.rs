//! Character encoding detection and conversion
//!
//! Text previews are shown from whatever bytes the user dropped in, which are
//! not always UTF-8.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Hint for encoding detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingHint {
    /// Prefer Japanese encodings (Shift_JIS)
    Japanese,
    /// Prefer Chinese Simplified (GBK/GB18030)
    ChineseSimplified,
    /// Prefer Chinese Traditional (Big5)
    ChineseTraditional,
    /// Prefer Korean (EUC-KR)
    Korean,
    /// No preference
    None,
}

/// Result of decoding a byte buffer for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// Name of the encoding that was used (e.g. "UTF-8", "Shift_JIS")
    pub encoding: &'static str,
    /// True when malformed sequences were replaced
    pub had_errors: bool,
}

/// Detect the most likely encoding of a byte sequence
pub fn detect_encoding(bytes: &[u8], hint: EncodingHint) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if std::str::from_utf8(bytes).is_ok() {
        return encoding_rs::UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    let (tld, fallback): (Option<&[u8]>, &'static Encoding) = match hint {
        EncodingHint::Japanese => (Some(&b"jp"[..]), encoding_rs::SHIFT_JIS),
        EncodingHint::ChineseSimplified => (Some(&b"cn"[..]), encoding_rs::GBK),
        EncodingHint::ChineseTraditional => (Some(&b"tw"[..]), encoding_rs::BIG5),
        EncodingHint::Korean => (Some(&b"kr"[..]), encoding_rs::EUC_KR),
        EncodingHint::None => return detector.guess(None, true),
    };

    // chardetng falls back to windows-1252 when it has nothing to go on;
    // the locale hint is a better guess in that case.
    let detected = detector.guess(tld, true);
    if detected == encoding_rs::WINDOWS_1252 {
        fallback
    } else {
        detected
    }
}

/// Decode bytes to a UTF-8 string for display
///
/// A leading byte order mark selects the encoding and is stripped.
pub fn decode_text(bytes: &[u8], hint: EncodingHint) -> DecodedText {
    let encoding = detect_encoding(bytes, hint);
    let (text, used, had_errors) = encoding.decode(bytes);

    if had_errors {
        tracing::debug!("Decoding with {} replaced malformed sequences", used.name());
    }

    DecodedText {
        text: text.into_owned(),
        encoding: used.name(),
        had_errors,
    }
}

/// Get the system default encoding hint based on locale
pub fn system_encoding_hint() -> EncodingHint {
    std::env::var("LANG")
        .map(|lang| hint_from_locale(&lang))
        .unwrap_or(EncodingHint::None)
}

fn hint_from_locale(lang: &str) -> EncodingHint {
    let lang = lang.to_lowercase();
    if lang.starts_with("ja") {
        EncodingHint::Japanese
    } else if lang.starts_with("zh_cn") || lang.starts_with("zh-cn") {
        EncodingHint::ChineseSimplified
    } else if lang.starts_with("zh_tw") || lang.starts_with("zh-tw") {
        EncodingHint::ChineseTraditional
    } else if lang.starts_with("ko") {
        EncodingHint::Korean
    } else {
        EncodingHint::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_detection() {
        let bytes = "Hello, 世界!".as_bytes();
        let decoded = decode_text(bytes, EncodingHint::None);
        assert_eq!(decoded.text, "Hello, 世界!");
        assert_eq!(decoded.encoding, "UTF-8");
        assert!(!decoded.had_errors);
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"line one\nline two");
        let decoded = decode_text(&bytes, EncodingHint::None);
        assert_eq!(decoded.text, "line one\nline two");
    }

    #[test]
    fn test_utf16_bom() {
        // "hi" in UTF-16LE with BOM
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        let decoded = decode_text(&bytes, EncodingHint::None);
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.encoding, "UTF-16LE");
    }

    #[test]
    fn test_shift_jis_detection() {
        // "テスト" in Shift_JIS
        let bytes = [0x83, 0x65, 0x83, 0x58, 0x83, 0x67];
        let decoded = decode_text(&bytes, EncodingHint::Japanese);
        assert_eq!(decoded.text, "テスト");
    }

    #[test]
    fn test_locale_hint() {
        assert_eq!(hint_from_locale("ja_JP.UTF-8"), EncodingHint::Japanese);
        assert_eq!(hint_from_locale("ko_KR.UTF-8"), EncodingHint::Korean);
        assert_eq!(hint_from_locale("en_US.UTF-8"), EncodingHint::None);
    }
}
