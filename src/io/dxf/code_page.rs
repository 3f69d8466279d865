//! `$DWGCODEPAGE` names and the text encodings behind them
//!
//! Only files older than AC1021 store text in a code page; newer files are
//! UTF-8 and never consult this table.

use encoding_rs::Encoding;

/// Encoding for a `$DWGCODEPAGE` value, compared case-insensitively.
///
/// `None` means the text is already UTF-8 (or plain ASCII). Names that are
/// not recognized fall back to Windows-1252, the most common DXF code page.
pub fn encoding_from_code_page(code_page: &str) -> Option<&'static Encoding> {
    let encoding = match code_page.trim().to_ascii_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "unicode" => return None,

        "gb2312" | "ansi_936" => encoding_rs::GBK,
        "big5" | "ansi_950" => encoding_rs::BIG5,
        "korean" | "ansi_949" | "johab" => encoding_rs::EUC_KR,
        "ansi_932" => encoding_rs::SHIFT_JIS,

        // DOS pages map onto the nearest encoding_rs table
        "dos437" | "dos855" | "dos866" => encoding_rs::IBM866,
        "dos850" | "dos860" | "dos861" | "dos863" | "dos865" => encoding_rs::WINDOWS_1252,
        "dos852" => encoding_rs::WINDOWS_1250,
        "dos857" => encoding_rs::WINDOWS_1254,
        "dos869" => encoding_rs::WINDOWS_1253,

        "ansi_874" => encoding_rs::WINDOWS_874,
        "ansi_1250" => encoding_rs::WINDOWS_1250,
        "ansi_1251" => encoding_rs::WINDOWS_1251,
        "ansi_1252" => encoding_rs::WINDOWS_1252,
        "ansi_1253" => encoding_rs::WINDOWS_1253,
        "ansi_1254" => encoding_rs::WINDOWS_1254,
        "ansi_1255" => encoding_rs::WINDOWS_1255,
        "ansi_1256" => encoding_rs::WINDOWS_1256,
        "ansi_1257" => encoding_rs::WINDOWS_1257,
        "ansi_1258" => encoding_rs::WINDOWS_1258,

        "iso8859-1" | "iso_8859-1" => encoding_rs::WINDOWS_1252,
        "iso8859-2" | "iso_8859-2" => encoding_rs::ISO_8859_2,
        "iso8859-3" | "iso_8859-3" => encoding_rs::ISO_8859_3,
        "iso8859-4" | "iso_8859-4" => encoding_rs::ISO_8859_4,
        "iso8859-5" | "iso_8859-5" => encoding_rs::ISO_8859_5,
        "iso8859-6" | "iso_8859-6" => encoding_rs::ISO_8859_6,
        "iso8859-7" | "iso_8859-7" => encoding_rs::ISO_8859_7,
        "iso8859-8" | "iso_8859-8" => encoding_rs::ISO_8859_8,
        "iso8859-9" | "iso_8859-9" => encoding_rs::WINDOWS_1254,
        "iso8859-10" | "iso_8859-10" => encoding_rs::ISO_8859_10,
        "iso8859-13" | "iso_8859-13" => encoding_rs::ISO_8859_13,
        "iso8859-14" | "iso_8859-14" => encoding_rs::ISO_8859_14,
        "iso8859-15" | "iso_8859-15" => encoding_rs::ISO_8859_15,

        "koi8-r" => encoding_rs::KOI8_R,
        "koi8-u" => encoding_rs::KOI8_U,

        _ => encoding_rs::WINDOWS_1252,
    };
    Some(encoding)
}

/// `$DWGCODEPAGE` value to write for an encoding
pub fn code_page_name(encoding: &'static Encoding) -> &'static str {
    let names: [(&'static Encoding, &'static str); 14] = [
        (encoding_rs::WINDOWS_874, "ANSI_874"),
        (encoding_rs::WINDOWS_1250, "ANSI_1250"),
        (encoding_rs::WINDOWS_1251, "ANSI_1251"),
        (encoding_rs::WINDOWS_1252, "ANSI_1252"),
        (encoding_rs::WINDOWS_1253, "ANSI_1253"),
        (encoding_rs::WINDOWS_1254, "ANSI_1254"),
        (encoding_rs::WINDOWS_1255, "ANSI_1255"),
        (encoding_rs::WINDOWS_1256, "ANSI_1256"),
        (encoding_rs::WINDOWS_1257, "ANSI_1257"),
        (encoding_rs::WINDOWS_1258, "ANSI_1258"),
        (encoding_rs::SHIFT_JIS, "ANSI_932"),
        (encoding_rs::GBK, "ANSI_936"),
        (encoding_rs::EUC_KR, "ANSI_949"),
        (encoding_rs::BIG5, "ANSI_950"),
    ];
    names
        .iter()
        .find(|(e, _)| *e == encoding)
        .map_or("ANSI_1252", |(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_pages() {
        assert_eq!(encoding_from_code_page("ANSI_1252"), Some(encoding_rs::WINDOWS_1252));
        assert_eq!(encoding_from_code_page("ansi_1251"), Some(encoding_rs::WINDOWS_1251));
    }

    #[test]
    fn test_utf8_needs_no_transcoding() {
        assert_eq!(encoding_from_code_page("ASCII"), None);
        assert_eq!(encoding_from_code_page("UTF-8"), None);
    }

    #[test]
    fn test_unknown_name_falls_back_to_1252() {
        assert_eq!(encoding_from_code_page("SOMETHING_ELSE"), Some(encoding_rs::WINDOWS_1252));
    }

    #[test]
    fn test_asian_pages() {
        assert_eq!(encoding_from_code_page("GB2312"), Some(encoding_rs::GBK));
        assert_eq!(encoding_from_code_page("ANSI_932"), Some(encoding_rs::SHIFT_JIS));
    }

    #[test]
    fn test_name_round_trip() {
        for name in ["ANSI_1250", "ANSI_1252", "ANSI_932", "ANSI_950"] {
            let encoding = encoding_from_code_page(name).unwrap();
            assert_eq!(code_page_name(encoding), name);
        }
    }
}
