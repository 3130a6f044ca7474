use serde::{Deserialize, Serialize};

/// One row of student data as a flat `column → value` mapping.
///
/// Column order follows the data source. Values are rendered as display
/// strings so downstream prompt building never has to care about cell types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    fields: Vec<(String, String)>,
}

impl StudentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON row object, stringifying every cell.
    ///
    /// Null cells are dropped. Returns `None` when the row is not an object.
    pub fn from_json_row(row: &serde_json::Value) -> Option<Self> {
        let obj = row.as_object()?;
        let fields = obj
            .iter()
            .filter_map(|(k, v)| cell_to_string(v).map(|s| (k.clone(), s)))
            .collect();
        Some(Self { fields })
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == column) {
            slot.1 = value;
        } else {
            self.fields.push((column, value));
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `column: value` lines, the shape the prompts embed.
    pub fn to_lines(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn cell_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Normalize a student name for comparison: drop full-width (U+3000) and
/// ASCII spaces, then trim.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '\u{3000}' && *c != ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn record_from_row_keeps_order_and_stringifies() {
        let row = json!({ "姓名": "吳志強", "數學": 88, "備註": null });
        let rec = StudentRecord::from_json_row(&row).unwrap();
        assert_eq!(rec.get("姓名"), Some("吳志強"));
        assert_eq!(rec.get("數學"), Some("88"));
        assert_eq!(rec.get("備註"), None);
    }

    #[test]
    fn non_object_row_is_rejected() {
        assert!(StudentRecord::from_json_row(&json!([1, 2])).is_none());
    }

    #[test]
    fn insert_overwrites_existing_column() {
        let mut rec = StudentRecord::new();
        rec.insert("姓名", "王小明");
        rec.insert("姓名", "吳志強");
        assert_eq!(rec.iter().count(), 1);
        assert_eq!(rec.to_lines(), "姓名: 吳志強");
    }

    #[test]
    fn normalize_strips_both_space_widths() {
        assert_eq!(normalize_name(" 吳　志 強 "), "吳志強");
        assert_eq!(normalize_name("吳志強"), "吳志強");
    }
}
