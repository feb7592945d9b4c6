use crate::types::LeadRecord;

pub const CSV_HEADER: &str = "name,phone,reachability_status,address,source";

/// Quote a field when it contains a delimiter, quote, or line break,
/// doubling embedded quotes.
#[must_use]
pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render lead records as CSV with a header row. Every row is
/// newline-terminated.
#[must_use]
pub fn render_csv(rows: &[LeadRecord]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + rows.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        let phone = row.phone.to_string();
        let fields = [
            row.name.as_str(),
            phone.as_str(),
            row.reachability_status.as_str(),
            row.address.as_str(),
            row.source_url.as_str(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}
