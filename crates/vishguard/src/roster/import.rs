//! CSV roster upload parsing.
//!
//! Uploads are all-or-nothing: an empty file or a file missing the required
//! `name`/`phone` columns is rejected outright, while individual rows missing
//! either value are dropped silently.

use std::io::Read;

use crate::campaigns::domain::{Employee, EmployeeId};

/// Upload-level parse failures; no partial roster is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("CSV file is empty")]
    Empty,
    #[error("CSV must contain 'name' and 'phone' columns")]
    MissingColumns,
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse an uploaded roster CSV into employees.
///
/// Header matching is case-insensitive (`name`/`Name`/`NAME`); `email` and
/// `department` are optional, with missing departments defaulting to
/// `Unassigned`. Masked names are recomputed on ingest.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<Employee>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |wanted: &str| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(wanted))
    };

    let name_column = column("name");
    let phone_column = column("phone");
    let email_column = column("email");
    let department_column = column("department");

    let (Some(name_column), Some(phone_column)) = (name_column, phone_column) else {
        // A file with no header row at all reads as empty rather than
        // malformed.
        if headers.is_empty() {
            return Err(RosterImportError::Empty);
        }
        return Err(RosterImportError::MissingColumns);
    };

    let mut employees = Vec::new();
    let mut rows_seen = 0usize;

    for record in csv_reader.records() {
        let record = record?;
        rows_seen += 1;

        let name = record.get(name_column).unwrap_or("").trim();
        let phone = record.get(phone_column).unwrap_or("").trim();
        if name.is_empty() || phone.is_empty() {
            continue;
        }

        let email = email_column
            .and_then(|column| record.get(column))
            .unwrap_or("")
            .trim();
        let department = department_column
            .and_then(|column| record.get(column))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("Unassigned");

        employees.push(Employee::new(
            EmployeeId(format!("import-{}", employees.len() + 1)),
            name,
            phone,
            email,
            department,
        ));
    }

    if rows_seen == 0 {
        return Err(RosterImportError::Empty);
    }

    Ok(employees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_rows_with_case_insensitive_headers() {
        let csv = "NAME,Phone,Email,Department\nJohn Smith,+15550000001,john@x.com,Engineering\nSarah Johnson,+15550000002,,\n";
        let employees = parse_roster(Cursor::new(csv)).expect("parses");

        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].name, "John Smith");
        assert_eq!(employees[0].masked_name, "J*** S***");
        assert_eq!(employees[0].department, "Engineering");
        assert_eq!(employees[1].department, "Unassigned");
    }

    #[test]
    fn drops_rows_missing_name_or_phone() {
        let csv = "name,phone\nJohn Smith,+15550000001\n,+15550000002\nSarah Johnson,\n";
        let employees = parse_roster(Cursor::new(csv)).expect("parses");

        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "John Smith");
    }

    #[test]
    fn rejects_missing_required_columns() {
        let csv = "name,email\nJohn Smith,john@x.com\n";
        let error = parse_roster(Cursor::new(csv)).expect_err("must fail");
        assert!(matches!(error, RosterImportError::MissingColumns));
    }

    #[test]
    fn rejects_empty_file() {
        let error = parse_roster(Cursor::new("")).expect_err("must fail");
        assert!(matches!(error, RosterImportError::Empty));

        let headers_only = parse_roster(Cursor::new("name,phone\n")).expect_err("must fail");
        assert!(matches!(headers_only, RosterImportError::Empty));
    }
}
