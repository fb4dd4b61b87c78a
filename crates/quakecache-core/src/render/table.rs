use chrono::TimeZone;

use crate::models::{Earthquake, MISSING};

/// DOM id given to the summary table
pub const SUMMARY_TABLE_ID: &str = "summary-table";

/// Column headers of the record tables
pub const RECORD_HEADERS: [&str; 5] = ["ID", "Location", "Magnitude", "magType", "Time"];

/// Column headers of the summary table
pub const SUMMARY_HEADERS: [&str; 2] = ["magType", "Count"];

/// One row of the magType summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// None groups records whose feed entry had no magType
    pub mag_type: Option<String>,
    pub count: usize,
}

impl SummaryRow {
    pub fn label(&self) -> &str {
        self.mag_type.as_deref().unwrap_or(MISSING)
    }
}

/// Count records per magType, in the order each magType first appears
pub fn summarize(records: &[Earthquake]) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = Vec::new();
    for record in records {
        let mag_type = record.mag_type();
        match rows.iter_mut().find(|row| row.mag_type.as_deref() == mag_type) {
            Some(row) => row.count += 1,
            None => rows.push(SummaryRow {
                mag_type: mag_type.map(str::to_string),
                count: 1,
            }),
        }
    }
    rows
}

/// Keep the records whose magType matches exactly
pub fn filter_by_mag_type(records: &[Earthquake], mag_type: Option<&str>) -> Vec<Earthquake> {
    records
        .iter()
        .filter(|record| record.mag_type() == mag_type)
        .cloned()
        .collect()
}

/// Which action produced a record listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordsKind {
    /// Records returned by the latest fetch
    Fetched,
    /// Everything in the store
    Original,
    /// Stored records of a single magType
    Filtered(Option<String>),
}

/// Content of the data container. Every render replaces it whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContainerView {
    #[default]
    Empty,
    Message(String),
    Summary(Vec<SummaryRow>),
    Records {
        kind: RecordsKind,
        records: Vec<Earthquake>,
    },
}

impl ContainerView {
    pub fn title(&self) -> String {
        match self {
            ContainerView::Empty | ContainerView::Message(_) => "Data".to_string(),
            ContainerView::Summary(rows) => format!("Summary by magType ({})", rows.len()),
            ContainerView::Records { kind, records } => match kind {
                RecordsKind::Fetched => format!("Fetched ({})", records.len()),
                RecordsKind::Original => format!("Original data ({})", records.len()),
                RecordsKind::Filtered(mag_type) => format!(
                    "magType {} ({})",
                    mag_type.as_deref().unwrap_or(MISSING),
                    records.len()
                ),
            },
        }
    }

    /// Tabular form of the view, or None for the non-table views
    pub fn to_table<Tz: TimeZone>(&self, tz: &Tz) -> Option<DataTable>
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            ContainerView::Empty | ContainerView::Message(_) => None,
            ContainerView::Summary(rows) => Some(summary_table(rows)),
            ContainerView::Records { records, .. } => Some(records_table(records, tz)),
        }
    }
}

/// A rendered table: headers plus rows of display strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    pub id: Option<&'static str>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn summary_table(rows: &[SummaryRow]) -> DataTable {
    DataTable {
        id: Some(SUMMARY_TABLE_ID),
        headers: SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| vec![row.label().to_string(), row.count.to_string()])
            .collect(),
    }
}

pub fn records_table<Tz: TimeZone>(records: &[Earthquake], tz: &Tz) -> DataTable
where
    Tz::Offset: std::fmt::Display,
{
    DataTable {
        id: None,
        headers: RECORD_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: records
            .iter()
            .map(|q| {
                vec![
                    q.id.clone(),
                    q.place_display(),
                    q.mag_display(),
                    q.mag_type_display(),
                    q.time_display(tz),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::earthquake::tests::quake;
    use chrono::Utc;

    fn sample() -> Vec<Earthquake> {
        vec![
            quake("a1", Some("md"), Some(1.1)),
            quake("a2", Some("ml"), Some(2.5)),
            quake("a3", Some("md"), Some(0.7)),
        ]
    }

    #[test]
    fn test_summarize_counts_per_mag_type() {
        let rows = summarize(&sample());
        assert_eq!(
            rows,
            vec![
                SummaryRow { mag_type: Some("md".to_string()), count: 2 },
                SummaryRow { mag_type: Some("ml".to_string()), count: 1 },
            ]
        );
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_summarize_groups_missing_mag_type() {
        let records = vec![quake("x", None, None), quake("y", Some("mb"), None), quake("z", None, None)];
        let rows = summarize(&records);
        assert_eq!(rows[0], SummaryRow { mag_type: None, count: 2 });
        assert_eq!(rows[0].label(), "-");
        assert_eq!(rows[1].count, 1);
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn test_filter_exact_match() {
        let records = sample();
        let md = filter_by_mag_type(&records, Some("md"));
        assert_eq!(md.iter().map(|q| q.id.as_str()).collect::<Vec<_>>(), vec!["a1", "a3"]);

        // Case and prefix must match exactly
        assert!(filter_by_mag_type(&records, Some("MD")).is_empty());
        assert!(filter_by_mag_type(&records, Some("m")).is_empty());
        assert!(filter_by_mag_type(&records, Some("mww")).is_empty());
        assert!(filter_by_mag_type(&records, None).is_empty());
    }

    #[test]
    fn test_records_table_maps_properties() {
        let table = records_table(&sample(), &Utc);
        assert_eq!(table.headers, RECORD_HEADERS);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(
            table.rows[1],
            vec!["a2", "10 km N of a2", "2.5", "ml", "11/14/2023, 10:13:20 PM"]
        );
    }

    #[test]
    fn test_container_view_tables() {
        assert_eq!(ContainerView::Empty.to_table(&Utc), None);
        assert_eq!(ContainerView::Message("hi".into()).to_table(&Utc), None);

        let summary = ContainerView::Summary(summarize(&sample()));
        let table = summary.to_table(&Utc).expect("summary is a table");
        assert_eq!(table.id, Some(SUMMARY_TABLE_ID));
        assert_eq!(table.rows, vec![vec!["md", "2"], vec!["ml", "1"]]);

        let filtered = ContainerView::Records {
            kind: RecordsKind::Filtered(Some("md".into())),
            records: filter_by_mag_type(&sample(), Some("md")),
        };
        assert_eq!(filtered.title(), "magType md (2)");
        assert_eq!(filtered.to_table(&Utc).map(|t| t.rows.len()), Some(2));
    }
}
