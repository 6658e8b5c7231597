use super::domain::FeedbackRecord;
use super::pipeline::FilteredFeedback;
use serde::Serialize;
use std::io::Write;

pub const EXPORT_FILE_NAME: &str = "feedback_results.csv";

#[derive(Debug, Serialize)]
struct ExportRow<'r> {
    feedback_id: &'r str,
    original_text: &'r str,
    category: &'r str,
    priority_level: &'static str,
    priority_score: Option<f64>,
    sentiment: Option<&'r str>,
    urgency: Option<&'r str>,
    ai_summary: &'r str,
}

impl<'r> From<&'r FeedbackRecord> for ExportRow<'r> {
    fn from(record: &'r FeedbackRecord) -> Self {
        Self {
            feedback_id: &record.feedback_id,
            original_text: &record.original_text,
            category: &record.category,
            priority_level: record.priority_level.label(),
            priority_score: record.priority_score,
            sentiment: record.sentiment.as_deref(),
            urgency: record.urgency.as_deref(),
            ai_summary: &record.ai_summary,
        }
    }
}

impl FilteredFeedback<'_> {
    /// Writes the filtered collection as UTF-8 CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if self.is_empty() {
            // serde only emits headers alongside the first row
            csv_writer.write_record(EXPORT_COLUMNS)?;
        }
        for record in self.records() {
            csv_writer.serialize(ExportRow::from(*record))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }
}

const EXPORT_COLUMNS: [&str; 8] = [
    "feedback_id",
    "original_text",
    "category",
    "priority_level",
    "priority_score",
    "sentiment",
    "urgency",
    "ai_summary",
];
