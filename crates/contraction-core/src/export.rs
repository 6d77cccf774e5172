//! CSV export for sharing with a care provider.
//!
//! Columns are the canonical field set, rows follow the repository order
//! (newest first). Absent values are empty cells.

use std::io::Write;

use chrono::SecondsFormat;

use crate::contraction::Contraction;
use crate::error::Result;

pub const CSV_HEADER: &str = "id,start_time,end_time,duration_seconds";

/// Write `contractions` as CSV to `out`.
pub fn to_csv<W: Write>(contractions: &[Contraction], mut out: W) -> Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for c in contractions {
        let end = c
            .end_time()
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        let duration = c.duration().map(|d| d.to_string()).unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{}",
            escape(c.id()),
            c.start_time().to_rfc3339_opts(SecondsFormat::Secs, true),
            end,
            duration
        )?;
    }
    out.flush()?;
    Ok(())
}

/// CSV as an owned string.
pub fn to_csv_string(contractions: &[Contraction]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = to_csv(contractions, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn header_only_for_empty_list() {
        assert_eq!(to_csv_string(&[]), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn rows_keep_order_and_blank_missing_values() {
        let newer = Contraction::new(t0() + Duration::minutes(5), None);
        let older = Contraction::new(t0(), Some(t0() + Duration::seconds(62)));
        let csv = to_csv_string(&[newer.clone(), older.clone()]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], format!("{},2024-03-01T08:05:00Z,,", newer.id()));
        assert_eq!(
            lines[2],
            format!("{},2024-03-01T08:00:00Z,2024-03-01T08:01:02Z,62", older.id())
        );
    }

    #[test]
    fn escapes_awkward_ids() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("plain"), "plain");
    }
}
