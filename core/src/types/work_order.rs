use crate::constants::ISO_DATE_FORMAT;
use chrono::NaiveDate;
use std::fmt;

/// Attribute names of a work order. In the normalized table these are
/// columns; in the EAV table they are `FieldName` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Line,
    TransDate,
    WorkNo,
    CustomerName,
}

impl Field {
    /// Every field, in insert order. Each logical EAV record has exactly
    /// one attribute row per entry.
    pub const ALL: [Field; 4] = [
        Field::Line,
        Field::TransDate,
        Field::WorkNo,
        Field::CustomerName,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Line => "Line",
            Field::TransDate => "TransDate",
            Field::WorkNo => "WorkNo",
            Field::CustomerName => "CustomerName",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical work order as inserted by either path. Identity is assigned
/// by the database (normalized) or by position (EAV).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    pub line: String,
    pub trans_date: NaiveDate,
    pub work_no: String,
    pub customer_name: String,
}

impl WorkOrder {
    /// `TransDate` as stored in the EAV `Value` column.
    pub fn trans_date_iso(&self) -> String {
        self.trans_date.format(ISO_DATE_FORMAT).to_string()
    }

    pub fn value_of(&self, field: Field) -> String {
        match field {
            Field::Line => self.line.clone(),
            Field::TransDate => self.trans_date_iso(),
            Field::WorkNo => self.work_no.clone(),
            Field::CustomerName => self.customer_name.clone(),
        }
    }

    /// Explode into EAV rows sharing `id`, one per field.
    pub fn attributes(&self, id: i64) -> [Attribute; 4] {
        Field::ALL.map(|field| Attribute {
            id,
            field,
            value: self.value_of(field),
        })
    }
}

/// One physical row of `WorkOrders_EAV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: i64,
    pub field: Field,
    pub value: String,
}

/// A row read back from the normalized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderRow {
    pub id: i64,
    pub line: String,
    pub trans_date: NaiveDate,
    pub work_no: String,
    pub customer_name: String,
}

/// A logical row rebuilt from EAV attributes by the pivot query. A column
/// is `None` when the attribute row for that field is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotRow {
    pub id: i64,
    pub line: Option<String>,
    pub trans_date: Option<String>,
    pub work_no: Option<String>,
    pub customer_name: Option<String>,
}

impl PivotRow {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Line => self.line.as_deref(),
            Field::TransDate => self.trans_date.as_deref(),
            Field::WorkNo => self.work_no.as_deref(),
            Field::CustomerName => self.customer_name.as_deref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|&f| self.get(f).is_some())
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&f| self.get(f).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorkOrder {
        WorkOrder {
            line: "LineA".to_string(),
            trans_date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            work_no: "WO0042".to_string(),
            customer_name: "PT Maju Jaya".to_string(),
        }
    }

    #[test]
    fn test_field_names_match_columns() {
        let names: Vec<&str> = Field::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, ["Line", "TransDate", "WorkNo", "CustomerName"]);
        assert_eq!(Field::from_name("WorkNo"), Some(Field::WorkNo));
        assert_eq!(Field::from_name("workno"), None);
    }

    #[test]
    fn test_attributes_share_id_and_cover_every_field() {
        let attrs = sample().attributes(43);
        assert!(attrs.iter().all(|a| a.id == 43));
        let fields: Vec<Field> = attrs.iter().map(|a| a.field).collect();
        assert_eq!(fields, Field::ALL);
        assert_eq!(attrs[1].value, "2026-03-07");
        assert_eq!(attrs[2].value, "WO0042");
    }

    #[test]
    fn test_pivot_row_completeness() {
        let mut row = PivotRow {
            id: 1,
            line: Some("LineA".into()),
            trans_date: Some("2026-03-07".into()),
            work_no: Some("WO0000".into()),
            customer_name: Some("PT Maju Jaya".into()),
        };
        assert!(row.is_complete());
        assert!(row.missing_fields().is_empty());

        row.work_no = None;
        assert!(!row.is_complete());
        assert_eq!(row.missing_fields(), vec![Field::WorkNo]);
    }
}
