use chrono::TimeZone;

use crate::dashboard::Button;
use crate::utils::escape_html;

use super::table::{ContainerView, DataTable};

/// Identifier of the output container
pub const CONTAINER_ID: &str = "data-container";

impl DataTable {
    /// Render as a bare `<table>` with a header row followed by one row per entry
    pub fn to_html(&self) -> String {
        let mut html = match self.id {
            Some(id) => format!("<table id=\"{}\">", escape_html(id)),
            None => "<table>".to_string(),
        };

        html.push_str("<tr>");
        for header in &self.headers {
            html.push_str(&format!("<th>{}</th>", escape_html(header)));
        }
        html.push_str("</tr>");

        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            html.push_str("</tr>");
        }

        html.push_str("</table>");
        html
    }
}

impl ContainerView {
    /// Inner HTML of the data container for this view
    pub fn to_html<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            ContainerView::Empty => String::new(),
            ContainerView::Message(msg) => format!("<div>{}</div>", escape_html(msg)),
            _ => self.to_table(tz).map(|t| t.to_html()).unwrap_or_default(),
        }
    }
}

/// A standalone dashboard page: the four buttons, then the container
/// holding `container_html`.
pub fn dashboard_page(container_html: &str) -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Earthquake Data</title>\n</head>\n<body>\n<div>\n",
    );
    for button in Button::ALL {
        page.push_str(&format!(
            "<button id=\"{}\">{}</button>\n",
            button.id(),
            button.label()
        ));
    }
    page.push_str(&format!(
        "<div id=\"{}\">{}</div>\n",
        CONTAINER_ID, container_html
    ));
    page.push_str("</div>\n</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::earthquake::tests::quake;
    use crate::render::table::{summarize, RecordsKind};
    use chrono::Utc;

    #[test]
    fn test_summary_html() {
        let records = vec![
            quake("a", Some("md"), Some(1.0)),
            quake("b", Some("md"), Some(1.2)),
            quake("c", Some("ml"), Some(2.0)),
        ];
        let html = ContainerView::Summary(summarize(&records)).to_html(&Utc);
        assert_eq!(
            html,
            "<table id=\"summary-table\"><tr><th>magType</th><th>Count</th></tr>\
             <tr><td>md</td><td>2</td></tr><tr><td>ml</td><td>1</td></tr></table>"
        );
    }

    #[test]
    fn test_records_html_row_count() {
        let records = vec![quake("a", Some("md"), Some(1.0)), quake("c", Some("ml"), Some(2.0))];
        let view = ContainerView::Records {
            kind: RecordsKind::Original,
            records,
        };
        let html = view.to_html(&Utc);
        assert!(html.starts_with("<table><tr><th>ID</th><th>Location</th><th>Magnitude</th><th>magType</th><th>Time</th></tr>"));
        // Header row plus one row per record
        assert_eq!(html.matches("<tr>").count(), 3);
        assert!(html.contains("<tr><td>c</td><td>10 km N of c</td><td>2</td><td>ml</td><td>11/14/2023, 10:13:20 PM</td></tr>"));
    }

    #[test]
    fn test_cells_are_escaped() {
        let mut q = quake("x", Some("md"), None);
        q.properties.place = Some("<script>alert(1)</script>".to_string());
        let html = ContainerView::Records { kind: RecordsKind::Fetched, records: vec![q] }.to_html(&Utc);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_empty_and_message_views() {
        assert_eq!(ContainerView::Empty.to_html(&Utc), "");
        assert_eq!(ContainerView::Message("No data".into()).to_html(&Utc), "<div>No data</div>");
    }

    #[test]
    fn test_dashboard_page_has_surface() {
        let page = dashboard_page("<table></table>");
        for button in Button::ALL {
            assert!(page.contains(&format!("<button id=\"{}\"", button.id())));
        }
        assert!(page.contains("<div id=\"data-container\"><table></table></div>"));
    }
}
