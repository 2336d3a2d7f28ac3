//! CSV output format for memory type summaries

use crate::stats::Summary;

/// CSV formatter for a session summary
#[derive(Debug)]
pub struct CsvOutput<'a> {
    summary: &'a Summary,
}

impl<'a> CsvOutput<'a> {
    pub fn new(summary: &'a Summary) -> Self {
        Self { summary }
    }

    fn header() -> &'static str {
        "event,memory_type,count,percentage"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(Self::header());
        output.push('\n');

        for event in &self.summary.events {
            let name = Self::escape_field(&event.event);
            for row in &event.rows {
                output.push_str(&format!(
                    "{},{},{},{:.1}\n",
                    name,
                    Self::escape_field(&row.memory_type),
                    row.count,
                    row.percentage
                ));
            }
        }

        output
    }
}
