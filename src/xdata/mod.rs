//! Extended data (XData)
//!
//! Application-specific annotations attached to any object, stored in DXF
//! after the record's own fields with group codes 1000-1071. Each block of
//! values starts with a `1001` code naming a registered application (APPID).
//! Application names compare case-insensitively.

use indexmap::IndexMap;

use crate::types::{Handle, Vector3};

/// A single extended data value
#[derive(Debug, Clone, PartialEq)]
pub enum XDataValue {
    /// String (1000)
    String(String),
    /// Control string "{" or "}" (1002)
    ControlString(String),
    /// Layer name (1003)
    LayerName(String),
    /// Binary chunk (1004)
    BinaryData(Vec<u8>),
    /// Database handle (1005)
    Handle(Handle),
    /// 3D point (1010)
    Point3D(Vector3),
    /// World space position (1011)
    Position3D(Vector3),
    /// World space displacement (1012)
    Displacement3D(Vector3),
    /// World direction (1013)
    Direction3D(Vector3),
    /// Real (1040)
    Real(f64),
    /// Distance (1041)
    Distance(f64),
    /// Scale factor (1042)
    ScaleFactor(f64),
    /// 16-bit integer (1070)
    Integer16(i16),
    /// 32-bit integer (1071)
    Integer32(i32),
}

impl XDataValue {
    /// Group code this value is written with (X code for points)
    pub fn code(&self) -> i32 {
        match self {
            XDataValue::String(_) => 1000,
            XDataValue::ControlString(_) => 1002,
            XDataValue::LayerName(_) => 1003,
            XDataValue::BinaryData(_) => 1004,
            XDataValue::Handle(_) => 1005,
            XDataValue::Point3D(_) => 1010,
            XDataValue::Position3D(_) => 1011,
            XDataValue::Displacement3D(_) => 1012,
            XDataValue::Direction3D(_) => 1013,
            XDataValue::Real(_) => 1040,
            XDataValue::Distance(_) => 1041,
            XDataValue::ScaleFactor(_) => 1042,
            XDataValue::Integer16(_) => 1070,
            XDataValue::Integer32(_) => 1071,
        }
    }
}

/// The values one application attached to an object
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedDataRecord {
    /// Registered application name (1001)
    pub application_name: String,
    pub values: Vec<XDataValue>,
}

impl ExtendedDataRecord {
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_values(application_name: impl Into<String>, values: Vec<XDataValue>) -> Self {
        Self {
            application_name: application_name.into(),
            values,
        }
    }

    pub fn add_value(&mut self, value: XDataValue) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// XData of one object, keyed by application name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedData {
    records: IndexMap<String, ExtendedDataRecord>,
}

fn key(name: &str) -> String {
    name.to_uppercase()
}

impl ExtendedData {
    pub fn new() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }

    /// Insert a record, replacing any earlier record of the same application
    pub fn insert(&mut self, record: ExtendedDataRecord) -> Option<ExtendedDataRecord> {
        self.records.insert(key(&record.application_name), record)
    }

    /// Append values to the record of `application_name`, creating it if needed
    pub fn extend(&mut self, application_name: &str, values: Vec<XDataValue>) {
        self.records
            .entry(key(application_name))
            .or_insert_with(|| ExtendedDataRecord::new(application_name))
            .values
            .extend(values);
    }

    pub fn get(&self, application_name: &str) -> Option<&ExtendedDataRecord> {
        self.records.get(&key(application_name))
    }

    pub fn contains(&self, application_name: &str) -> bool {
        self.records.contains_key(&key(application_name))
    }

    pub fn remove(&mut self, application_name: &str) -> Option<ExtendedDataRecord> {
        self.records.shift_remove(&key(application_name))
    }

    /// Keep only the records for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&ExtendedDataRecord) -> bool) {
        self.records.retain(|_, r| keep(r));
    }

    pub fn records(&self) -> impl Iterator<Item = &ExtendedDataRecord> {
        self.records.values()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ExtendedDataRecord> {
        self.records.values_mut()
    }

    pub fn application_names(&self) -> impl Iterator<Item = &str> {
        self.records.values().map(|r| r.application_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut xdata = ExtendedData::new();
        xdata.insert(ExtendedDataRecord::with_values(
            "MyApp",
            vec![XDataValue::Real(3.5)],
        ));
        assert!(xdata.contains("MYAPP"));
        assert_eq!(xdata.get("myapp").unwrap().application_name, "MyApp");

        xdata.extend("MYAPP", vec![XDataValue::Integer16(2)]);
        assert_eq!(xdata.len(), 1);
        assert_eq!(xdata.get("MyApp").unwrap().len(), 2);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut xdata = ExtendedData::new();
        xdata.insert(ExtendedDataRecord::new("B"));
        xdata.insert(ExtendedDataRecord::new("A"));
        let names: Vec<_> = xdata.application_names().collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_value_codes() {
        assert_eq!(XDataValue::Position3D(Vector3::ZERO).code(), 1011);
        assert_eq!(XDataValue::Integer32(1).code(), 1071);
    }
}
