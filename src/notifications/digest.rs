use crate::models::{EnrichedRecord, CREATION_DATE, INCIDENT_ID, INCIDENT_STATUS, OBSERVATION};
use crate::report::{cell_value, DAYS_ELAPSED_COLUMN, MONTH_COLUMN, PRIORITY_COLUMN};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;

/// Subject line of the aging-incident alert
pub const ALERT_SUBJECT: &str = "OPEN Incidents (3+ days)";

/// Columns listed in the alert table
pub const ALERT_COLUMNS: [&str; 9] = [
    INCIDENT_ID,
    CREATION_DATE,
    MONTH_COLUMN,
    DAYS_ELAPSED_COLUMN,
    OBSERVATION,
    "Engine no",
    "Service Dealer Name",
    INCIDENT_STATUS,
    PRIORITY_COLUMN,
];

/// Human-readable summary of the records selected for alerting
#[derive(Debug, Clone, Serialize)]
pub struct AlertDigest {
    pub category: Option<String>,
    pub generated_at: DateTime<Local>,
    pub years: Vec<i32>,
    pub months: Vec<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl AlertDigest {
    /// Build a digest; `None` when there is nothing to report
    pub fn build(
        records: &[EnrichedRecord],
        category: Option<&str>,
        generated_at: DateTime<Local>,
    ) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let dates: Vec<NaiveDate> = records
            .iter()
            .filter_map(|r| r.normalized_creation_date)
            .collect();

        let mut years = Vec::new();
        for year in dates.iter().map(|d| d.year()) {
            if !years.contains(&year) {
                years.push(year);
            }
        }

        let mut months = Vec::new();
        for month in records.iter().filter_map(|r| r.month.as_ref()) {
            if !months.contains(month) {
                months.push(month.clone());
            }
        }

        let rows = records
            .iter()
            .map(|r| ALERT_COLUMNS.iter().map(|c| cell_value(r, c)).collect())
            .collect();

        Some(Self {
            category: category.map(str::to_string),
            generated_at,
            years,
            months,
            from_date: dates.iter().min().copied(),
            to_date: dates.iter().max().copied(),
            columns: ALERT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    pub fn subject(&self) -> String {
        format!("🚨 {}", ALERT_SUBJECT)
    }

    fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("Unspecified")
    }

    fn years_label(&self) -> String {
        self.years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn date_label(date: Option<NaiveDate>) -> String {
        date.map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }

    /// Plain-text rendering
    pub fn to_plain_text(&self) -> String {
        let mut text = format!(
            "Open & Pending Incidents Escalated >= 3 Days\n\
             Generated: {}\n\
             Emissions Category: {}\n\
             Year(s): {}\n\
             Month(s): {}\n\
             From Date: {}\n\
             To Date: {}\n\n",
            self.generated_at.format("%d %b %Y, %H:%M:%S"),
            self.category_label(),
            self.years_label(),
            self.months.join(", "),
            Self::date_label(self.from_date),
            Self::date_label(self.to_date),
        );

        text.push_str(&self.columns.join(" | "));
        text.push('\n');
        for row in &self.rows {
            text.push_str(&row.join(" | "));
            text.push('\n');
        }
        text.push_str("\nRegards,\nICSS Team\n");
        text
    }

    /// HTML rendering
    pub fn to_html(&self) -> String {
        let header: String = self
            .columns
            .iter()
            .map(|c| format!("<th>{}</th>", escape_html(c)))
            .collect();

        let body: String = self
            .rows
            .iter()
            .map(|row| {
                let cells: String = row
                    .iter()
                    .map(|c| format!("<td>{}</td>", escape_html(c)))
                    .collect();
                format!("<tr>{}</tr>", cells)
            })
            .collect();

        format!(
            r#"<html>
  <body style="font-family:Arial,sans-serif;">
    <h3>🚨 Open &amp; Pending Incidents Escalated &ge; 3 Days</h3>
    <p>Generated: {}</p>
    <b>Emissions Category:</b> {}<br>
    <b>Year(s):</b> {}<br>
    <b>Month(s):</b> {}<br>
    <b>From Date:</b> {}<br>
    <b>To Date:</b> {}<br><br>
    <table border="1" cellspacing="0" cellpadding="4">
      <thead><tr>{}</tr></thead>
      <tbody>{}</tbody>
    </table>
    <p>Regards,<br/>ICSS Team</p>
  </body>
</html>
"#,
            self.generated_at.format("%d %b %Y, %H:%M:%S"),
            escape_html(self.category_label()),
            self.years_label(),
            escape_html(&self.months.join(", ")),
            Self::date_label(self.from_date),
            Self::date_label(self.to_date),
            header,
            body,
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
