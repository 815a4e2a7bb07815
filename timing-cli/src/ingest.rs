//! CSV ingestion and validation
//!
//! Turns uploaded CSV timing captures into typed `ToggleRecord`s. Everything
//! the engine assumes about its input (required fields present, numeric
//! timestamps, boolean toggles) is enforced here.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use timing_engine::ToggleRecord;

const COL_EVENT: &str = "Event";
const COL_TIME: &str = "Time";
const COL_TOGGLED: &str = "Toggled";
const COL_DEVICE: &str = "Device_ID";
const COL_POSITION: &str = "Position";
const COL_MESSAGE: &str = "Message_ID";

/// Column indices resolved from the header row
struct Columns {
    event: usize,
    time: usize,
    toggled: usize,
    device: Option<usize>,
    position: Option<usize>,
    message: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h == name);

        let missing: Vec<&str> = [COL_EVENT, COL_TIME, COL_TOGGLED]
            .into_iter()
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("Missing required columns: {}", missing.join(", "));
        }

        Ok(Self {
            event: find(COL_EVENT).unwrap_or_default(),
            time: find(COL_TIME).unwrap_or_default(),
            toggled: find(COL_TOGGLED).unwrap_or_default(),
            device: find(COL_DEVICE),
            position: find(COL_POSITION),
            message: find(COL_MESSAGE),
        })
    }
}

/// Load and validate a CSV file
pub fn load_csv(path: &Path) -> Result<Vec<ToggleRecord>> {
    log::info!("Loading timing data: {:?}", path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read timing data: {:?}", path))?;
    let records =
        parse_csv(&content).with_context(|| format!("Invalid timing data in {:?}", path))?;
    log::info!("Loaded {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Parse CSV text with a header row into records
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_csv(content: &str) -> Result<Vec<ToggleRecord>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let Some((_, header)) = lines.next() else {
        bail!("No header row found");
    };
    let header: Vec<String> = split_fields(header)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let columns = Columns::from_header(&header)?;

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let fields = split_fields(line);
        let record = parse_row(&fields, &columns)
            .with_context(|| format!("Line {}: {}", line_no, line))?;
        records.push(record);
    }

    Ok(records)
}

fn parse_row(fields: &[String], columns: &Columns) -> Result<ToggleRecord> {
    let cell = |idx: usize| fields.get(idx).map(|f| f.trim()).unwrap_or("");
    let optional = |idx: Option<usize>| idx.map(cell).filter(|v| !v.is_empty());

    let event = cell(columns.event);
    if event.is_empty() {
        bail!("{} is empty", COL_EVENT);
    }

    let time = cell(columns.time);
    let Some(timestamp) = parse_time(time) else {
        bail!("{} is not numeric: '{}'", COL_TIME, time);
    };

    let toggled = cell(columns.toggled);
    let Some(toggled) = parse_toggled(toggled) else {
        bail!("{} is not a boolean: '{}'", COL_TOGGLED, toggled);
    };

    let mut record = ToggleRecord::new(event, timestamp, toggled);
    if let Some(device) = optional(columns.device) {
        record = record.with_device(device);
    }
    if let Some(position) = optional(columns.position) {
        let Some(position) = parse_time(position) else {
            bail!("{} is not numeric: '{}'", COL_POSITION, position);
        };
        record = record.with_position(position);
    }
    if let Some(message) = optional(columns.message) {
        record = record.with_correlation_id(message);
    }

    Ok(record)
}

/// Parse an integer, or a float rounded to the nearest integer
fn parse_time(value: &str) -> Option<i64> {
    if let Ok(v) = value.parse::<i64>() {
        return Some(v);
    }
    let v = value.parse::<f64>().ok()?;
    v.is_finite().then(|| v.round() as i64)
}

/// Coerce the common spellings of a boolean; an empty cell is not one
fn parse_toggled(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "t" | "yes" | "1.0" => Some(true),
        "false" | "0" | "f" | "no" | "0.0" => Some(false),
        _ => None,
    }
}

/// Split a CSV line, honouring double-quoted fields with `""` escapes
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Escape a CSV field (commas, quotes)
///
/// The reader is line based, so line breaks become spaces and every record
/// stays on one line.
fn escape_field(field: &str) -> String {
    let field = field.replace(['\r', '\n'], " ");
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// Write records as CSV with every optional column present
pub fn write_csv<W: Write>(records: &[ToggleRecord], mut out: W) -> Result<()> {
    writeln!(
        out,
        "{},{},{},{},{},{}",
        COL_EVENT, COL_TIME, COL_TOGGLED, COL_DEVICE, COL_POSITION, COL_MESSAGE
    )?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            escape_field(&record.event_name),
            record.timestamp,
            if record.toggled { "True" } else { "False" },
            record.device_id.as_deref().map(escape_field).unwrap_or_default(),
            record.position.map(|p| p.to_string()).unwrap_or_default(),
            record.correlation_id.as_deref().map(escape_field).unwrap_or_default(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_columns() {
        let csv = "Event,Time,Toggled\nGPIO_Init,1000,True\nGPIO_Init,1500,False\n";
        let records = parse_csv(csv).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ToggleRecord::new("GPIO_Init", 1000, true));
        assert!(!records[1].toggled);
        assert_eq!(records[1].device_id, None);
    }

    #[test]
    fn test_full_columns_and_comments() {
        let csv = "\
# captured on bench 3
Event,Time,Toggled,Device_ID,Position,Message_ID

Message_Send,0,True,Device_1,1,MSG_0
Message_Receive,5000.4,1,Device_3,3,MSG_0
GPIO_Init,7000,yes,Device_1,1,
";
        let records = parse_csv(csv).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].timestamp, 5000);
        assert_eq!(records[1].position, Some(3));
        assert_eq!(records[1].correlation_id.as_deref(), Some("MSG_0"));
        assert!(records[2].toggled);
        assert_eq!(records[2].correlation_id, None);
    }

    #[test]
    fn test_column_order_is_free() {
        let csv = "Toggled,Device_ID,Event,Time\nfalse,Device_2,ADC_Read,42\n";
        let records = parse_csv(csv).unwrap();
        assert_eq!(records[0].event_name, "ADC_Read");
        assert_eq!(records[0].device_id.as_deref(), Some("Device_2"));
        assert_eq!(records[0].timestamp, 42);
    }

    #[test]
    fn test_missing_required_columns() {
        let err = parse_csv("Event,Device_ID\nGPIO_Init,Device_1\n").unwrap_err();
        assert!(err.to_string().contains("Time, Toggled"));
    }

    #[test]
    fn test_bad_time_reports_line() {
        let csv = "Event,Time,Toggled\nGPIO_Init,1000,True\nGPIO_Init,soon,False\n";
        let err = parse_csv(csv).unwrap_err();
        assert!(err.to_string().starts_with("Line 3"));
        assert!(format!("{:#}", err).contains("not numeric"));
    }

    #[test]
    fn test_bad_toggled() {
        let csv = "Event,Time,Toggled\nGPIO_Init,1000,maybe\n";
        assert!(parse_csv(csv).is_err());
    }

    #[test]
    fn test_empty_toggled_is_rejected() {
        let csv = "Event,Time,Toggled\nGPIO_Init,1000,True\nGPIO_Init,1500,\n";
        let err = parse_csv(csv).unwrap_err();
        assert!(err.to_string().starts_with("Line 3"));
        assert!(format!("{:#}", err).contains("not a boolean"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_csv("").is_err());
        assert!(parse_csv("Event,Time,Toggled\n").unwrap().is_empty());
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(
            split_fields(r#"a,"b,c","say ""hi""""#),
            vec!["a", "b,c", r#"say "hi""#]
        );
    }

    #[test]
    fn test_write_then_parse() {
        let records = vec![
            ToggleRecord::new("Message_Send", 10, true)
                .with_device("Device_1")
                .with_position(1)
                .with_correlation_id("MSG_0"),
            ToggleRecord::new("GPIO_Init", 20, false),
        ];
        let mut buf = Vec::new();
        write_csv(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(parse_csv(&text).unwrap(), records);
    }

    #[test]
    fn test_written_fields_stay_on_one_line() {
        let records = vec![ToggleRecord::new("GPIO_Init", 10, true)
            .with_device("Bench\nDevice, 1")
            .with_correlation_id("MSG\r\n0")];
        let mut buf = Vec::new();
        write_csv(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);

        let parsed = parse_csv(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].device_id.as_deref(), Some("Bench Device, 1"));
        assert_eq!(parsed[0].correlation_id.as_deref(), Some("MSG  0"));
    }
}
