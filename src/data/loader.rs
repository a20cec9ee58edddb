use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::{self, Deserializer};
use serde::Deserialize;

use super::derive::attach_income_categories;
use super::error::SchemaError;
use super::model::{BonusRecord, BonusTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a bonus-allocation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the pandas export column names
/// * `.json`    – records-oriented array (`df.to_json(orient='records')`)
/// * `.parquet` – flat columns, one field per source column
///
/// The derived income category is attached before the table is built, so
/// every caller sees the finished table.
pub fn load_file(path: &Path) -> Result<BonusTable, SchemaError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut records = match ext.as_str() {
        "csv" => parse_csv(std::fs::File::open(path)?)?,
        "json" => parse_json(&std::fs::read_to_string(path)?)?,
        "parquet" | "pq" => parse_parquet(std::fs::File::open(path)?)?,
        other => return Err(SchemaError::UnsupportedExtension(other.to_string())),
    };

    attach_income_categories(&mut records);
    Ok(BonusTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Raw record: serde mapping for the pandas export schema
// ---------------------------------------------------------------------------

/// Column names exactly as written by the source export.
const REQUIRED_COLUMNS: [&str; 9] = [
    "country",
    "Age_Group",
    "income_level",
    "Amount_of_Bonuses_Received",
    "Revenue_from_Bonuses",
    "Customer_Lifetime_Value",
    "Bonus_ROI",
    "Increase_in_wagering_after_Bonus",
    "Should_Receive_Bonus",
];

#[derive(Debug, Deserialize)]
struct RawRecord {
    country: String,
    #[serde(rename = "Age_Group")]
    age_group: String,
    income_level: f64,
    #[serde(rename = "Amount_of_Bonuses_Received")]
    amount_of_bonuses_received: f64,
    #[serde(rename = "Revenue_from_Bonuses")]
    revenue_from_bonuses: f64,
    #[serde(rename = "Customer_Lifetime_Value")]
    customer_lifetime_value: f64,
    #[serde(rename = "Bonus_ROI")]
    bonus_roi: f64,
    #[serde(rename = "Increase_in_wagering_after_Bonus")]
    increase_in_wagering_after_bonus: f64,
    #[serde(rename = "Should_Receive_Bonus", deserialize_with = "flag_from_any")]
    should_receive_bonus: bool,
}

impl From<RawRecord> for BonusRecord {
    fn from(raw: RawRecord) -> Self {
        BonusRecord {
            country: raw.country,
            age_group: raw.age_group,
            income_level: raw.income_level,
            amount_of_bonuses_received: raw.amount_of_bonuses_received,
            revenue_from_bonuses: raw.revenue_from_bonuses,
            customer_lifetime_value: raw.customer_lifetime_value,
            bonus_roi: raw.bonus_roi,
            increase_in_wagering_after_bonus: raw.increase_in_wagering_after_bonus,
            should_receive_bonus: raw.should_receive_bonus,
            income_category: None,
        }
    }
}

/// The eligibility flag arrives as bool, 0/1, or yes/no text depending on
/// which tool exported the file.  Accept all of them.
fn flag_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct FlagVisitor;

    impl de::Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean, 0/1, or yes/no string")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::custom(format!("flag value {other} is not 0 or 1"))),
            }
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            self.visit_i64(v as i64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
            if v == 0.0 {
                Ok(false)
            } else if v == 1.0 {
                Ok(true)
            } else {
                Err(E::custom(format!("flag value {v} is not 0 or 1")))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                other => Err(E::custom(format!("'{other}' is not a recognised flag"))),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn parse_csv<R: Read>(input: R) -> Result<Vec<BonusRecord>, SchemaError> {
    let mut reader = csv::Reader::from_reader(input);

    // Check the header up front so a missing column is reported by name
    // instead of as a row-level serde error.
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(SchemaError::MissingColumn(col));
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        let raw = result.map_err(|e| SchemaError::BadValue {
            row: row_no,
            detail: e.to_string(),
        })?;
        records.push(raw.into());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn parse_json(text: &str) -> Result<Vec<BonusRecord>, SchemaError> {
    let raw: Vec<RawRecord> = serde_json::from_str(text)?;
    Ok(raw.into_iter().map(BonusRecord::from).collect())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn parse_parquet(file: std::fs::File) -> Result<Vec<BonusRecord>, SchemaError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let country = column(&batch, "country")?;
        let age_group = column(&batch, "Age_Group")?;
        let income_level = column(&batch, "income_level")?;
        let bonuses = column(&batch, "Amount_of_Bonuses_Received")?;
        let revenue = column(&batch, "Revenue_from_Bonuses")?;
        let clv = column(&batch, "Customer_Lifetime_Value")?;
        let roi = column(&batch, "Bonus_ROI")?;
        let wagering = column(&batch, "Increase_in_wagering_after_Bonus")?;
        let flag = column(&batch, "Should_Receive_Bonus")?;

        for row in 0..batch.num_rows() {
            records.push(BonusRecord {
                country: extract_string(country, "country", row)?,
                age_group: extract_string(age_group, "Age_Group", row)?,
                income_level: extract_f64(income_level, "income_level", row)?,
                amount_of_bonuses_received: extract_f64(
                    bonuses,
                    "Amount_of_Bonuses_Received",
                    row,
                )?,
                revenue_from_bonuses: extract_f64(revenue, "Revenue_from_Bonuses", row)?,
                customer_lifetime_value: extract_f64(clv, "Customer_Lifetime_Value", row)?,
                bonus_roi: extract_f64(roi, "Bonus_ROI", row)?,
                increase_in_wagering_after_bonus: extract_f64(
                    wagering,
                    "Increase_in_wagering_after_Bonus",
                    row,
                )?,
                should_receive_bonus: extract_flag(flag, "Should_Receive_Bonus", row)?,
                income_category: None,
            });
        }
    }

    Ok(records)
}

// -- Arrow helpers --

fn column<'a>(
    batch: &'a arrow::record_batch::RecordBatch,
    name: &'static str,
) -> Result<&'a Arc<dyn Array>, SchemaError> {
    let idx = batch
        .schema_ref()
        .index_of(name)
        .map_err(|_| SchemaError::MissingColumn(name))?;
    Ok(batch.column(idx))
}

fn extract_string(
    col: &Arc<dyn Array>,
    name: &'static str,
    row: usize,
) -> Result<String, SchemaError> {
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>().unwrap();
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col.as_any().downcast_ref::<LargeStringArray>().unwrap();
            Ok(arr.value(row).to_string())
        }
        other => Err(SchemaError::WrongType {
            column: name,
            detail: format!("expected string, got {other:?}"),
        }),
    }
}

fn extract_f64(col: &Arc<dyn Array>, name: &'static str, row: usize) -> Result<f64, SchemaError> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        other => Err(SchemaError::WrongType {
            column: name,
            detail: format!("expected numeric, got {other:?}"),
        }),
    }
}

fn extract_flag(col: &Arc<dyn Array>, name: &'static str, row: usize) -> Result<bool, SchemaError> {
    match col.data_type() {
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Int64 | DataType::Int32 | DataType::Float64 | DataType::Float32 => {
            Ok(extract_f64(col, name, row)? != 0.0)
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = extract_string(col, name, row)?;
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                other => Err(SchemaError::BadValue {
                    row,
                    detail: format!("'{other}' is not a recognised flag"),
                }),
            }
        }
        other => Err(SchemaError::WrongType {
            column: name,
            detail: format!("expected boolean-like, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::IncomeCategory;

    const CSV_HEADER: &str = "country,Age_Group,income_level,Amount_of_Bonuses_Received,\
Revenue_from_Bonuses,Customer_Lifetime_Value,Bonus_ROI,\
Increase_in_wagering_after_Bonus,Should_Receive_Bonus";

    #[test]
    fn parses_well_formed_csv() {
        let csv = format!(
            "{CSV_HEADER}\n\
             Austria,18-25,25000,120,300,5000,1.2,15,Yes\n\
             Germany,26-35,90000,200,400,8000,2.5,30,No\n"
        );
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country, "Austria");
        assert!(records[0].should_receive_bonus);
        assert!(!records[1].should_receive_bonus);
        // Derivation is the loader entry-point's job, not the parser's.
        assert_eq!(records[0].income_category, None);
    }

    #[test]
    fn missing_column_is_named_in_the_error() {
        let csv = "country,Age_Group\nAustria,18-25\n";
        match parse_csv(csv.as_bytes()) {
            Err(SchemaError::MissingColumn(col)) => assert_eq!(col, "income_level"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_income_is_a_bad_value() {
        let csv = format!(
            "{CSV_HEADER}\n\
             Austria,18-25,lots,120,300,5000,1.2,15,1\n"
        );
        match parse_csv(csv.as_bytes()) {
            Err(SchemaError::BadValue { row, .. }) => assert_eq!(row, 0),
            other => panic!("expected BadValue, got {other:?}"),
        }
    }

    #[test]
    fn parses_records_oriented_json() {
        let json = r#"[{
            "country": "Austria",
            "Age_Group": "18-25",
            "income_level": 25000.0,
            "Amount_of_Bonuses_Received": 120.0,
            "Revenue_from_Bonuses": 300.0,
            "Customer_Lifetime_Value": 5000.0,
            "Bonus_ROI": 1.2,
            "Increase_in_wagering_after_Bonus": 15.0,
            "Should_Receive_Bonus": true
        }]"#;
        let records = parse_json(json).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].should_receive_bonus);
    }

    #[test]
    fn json_integer_flag_is_accepted() {
        let json = r#"[{
            "country": "Austria",
            "Age_Group": "18-25",
            "income_level": 25000.0,
            "Amount_of_Bonuses_Received": 120.0,
            "Revenue_from_Bonuses": 300.0,
            "Customer_Lifetime_Value": 5000.0,
            "Bonus_ROI": 1.2,
            "Increase_in_wagering_after_Bonus": 15.0,
            "Should_Receive_Bonus": 0
        }]"#;
        let records = parse_json(json).unwrap();
        assert!(!records[0].should_receive_bonus);
    }

    #[test]
    fn load_file_attaches_income_categories() {
        let csv = format!(
            "{CSV_HEADER}\n\
             Austria,18-25,25000,120,300,5000,1.2,15,1\n\
             Germany,26-35,90000,200,400,8000,2.5,30,0\n\
             France,36-45,999999,50,100,2000,0.5,5,1\n"
        );
        let dir = std::env::temp_dir();
        let path = dir.join("bonus_lens_loader_test.csv");
        std::fs::write(&path, csv).unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0].income_category, Some(IncomeCategory::Low));
        assert_eq!(table.records[1].income_category, Some(IncomeCategory::High));
        assert_eq!(table.records[2].income_category, None);
        assert_eq!(table.countries, vec!["Austria", "France", "Germany"]);
    }
}
