//! AutoCAD release tags ($ACADVER)

use std::fmt;

/// DXF dialect, identified by the `$ACADVER` header value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DxfVersion {
    /// Version could not be determined
    Unknown,
    /// R12 (flat records, no subclass markers)
    AC1009,
    /// R13
    AC1012,
    /// R14
    AC1014,
    /// 2000
    AC1015,
    /// 2004
    AC1018,
    /// 2007 (UTF-8 text)
    AC1021,
    /// 2010
    AC1024,
    /// 2013
    AC1027,
    /// 2018+
    AC1032,
}

impl DxfVersion {
    /// All versions the reader and writer support, oldest first
    pub const SUPPORTED: [DxfVersion; 9] = [
        DxfVersion::AC1009,
        DxfVersion::AC1012,
        DxfVersion::AC1014,
        DxfVersion::AC1015,
        DxfVersion::AC1018,
        DxfVersion::AC1021,
        DxfVersion::AC1024,
        DxfVersion::AC1027,
        DxfVersion::AC1032,
    ];

    pub fn from_version_string(s: &str) -> Self {
        match s.trim() {
            "AC1009" | "AC1006" | "AC1004" => DxfVersion::AC1009,
            "AC1012" => DxfVersion::AC1012,
            "AC1014" => DxfVersion::AC1014,
            "AC1015" => DxfVersion::AC1015,
            "AC1018" => DxfVersion::AC1018,
            "AC1021" => DxfVersion::AC1021,
            "AC1024" => DxfVersion::AC1024,
            "AC1027" => DxfVersion::AC1027,
            "AC1032" => DxfVersion::AC1032,
            _ => DxfVersion::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DxfVersion::Unknown => "UNKNOWN",
            DxfVersion::AC1009 => "AC1009",
            DxfVersion::AC1012 => "AC1012",
            DxfVersion::AC1014 => "AC1014",
            DxfVersion::AC1015 => "AC1015",
            DxfVersion::AC1018 => "AC1018",
            DxfVersion::AC1021 => "AC1021",
            DxfVersion::AC1024 => "AC1024",
            DxfVersion::AC1027 => "AC1027",
            DxfVersion::AC1032 => "AC1032",
        }
    }

    /// Marketing release name
    pub fn release_name(&self) -> &'static str {
        match self {
            DxfVersion::Unknown => "unknown",
            DxfVersion::AC1009 => "R12",
            DxfVersion::AC1012 => "R13",
            DxfVersion::AC1014 => "R14",
            DxfVersion::AC1015 => "2000",
            DxfVersion::AC1018 => "2004",
            DxfVersion::AC1021 => "2007",
            DxfVersion::AC1024 => "2010",
            DxfVersion::AC1027 => "2013",
            DxfVersion::AC1032 => "2018",
        }
    }

    /// Whether records carry `100` subclass markers
    pub fn has_subclass_markers(&self) -> bool {
        *self >= DxfVersion::AC1012
    }

    /// Whether text is stored as UTF-8 rather than in `$DWGCODEPAGE`
    pub fn is_unicode(&self) -> bool {
        *self >= DxfVersion::AC1021
    }

    /// Whether the binary dialect uses single-byte group codes
    pub fn has_single_byte_codes(&self) -> bool {
        *self <= DxfVersion::AC1009
    }
}

impl Default for DxfVersion {
    fn default() -> Self {
        DxfVersion::AC1032
    }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_strings() {
        for v in DxfVersion::SUPPORTED {
            assert_eq!(DxfVersion::from_version_string(v.as_str()), v);
        }
        assert_eq!(DxfVersion::from_version_string("AC9999"), DxfVersion::Unknown);
    }

    #[test]
    fn test_version_ordering() {
        assert!(DxfVersion::AC1009 < DxfVersion::AC1015);
        assert!(!DxfVersion::AC1009.has_subclass_markers());
        assert!(DxfVersion::AC1012.has_subclass_markers());
        assert!(DxfVersion::AC1021.is_unicode());
    }
}
