//! Table building and HTML rendering for the data container.
//!
//! Everything here is a pure function of the record set passed in:
//!
//! - `table`: summary grouping, magType filtering, `ContainerView`, `DataTable`
//! - `html`: `<table>` markup and the standalone dashboard page

pub mod html;
pub mod table;

pub use html::{dashboard_page, CONTAINER_ID};
pub use table::{
    filter_by_mag_type, records_table, summarize, summary_table, ContainerView, DataTable,
    RecordsKind, SummaryRow, SUMMARY_TABLE_ID,
};
