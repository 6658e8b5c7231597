use super::domain::{FeedbackDataset, FeedbackRecord, PrioritySelection};
use super::report::views::{AnalyticsView, InsightsView, PriorityListEntry};
use super::report::{build_analytics, build_insights, build_priority_list};

/// Records matching a priority selection, in dataset order.
///
/// Every derived view, the CSV export, the summarizer prompt and bulk dispatch read from
/// the same `FilteredFeedback`, so they always reflect one subset of the data.
#[derive(Debug, Clone)]
pub struct FilteredFeedback<'a> {
    selection: PrioritySelection,
    records: Vec<&'a FeedbackRecord>,
}

pub fn filter_by_priority<'a>(
    records: &'a [FeedbackRecord],
    selection: &PrioritySelection,
) -> FilteredFeedback<'a> {
    let records = records
        .iter()
        .filter(|record| selection.contains(record.priority_level))
        .collect();

    FilteredFeedback {
        selection: selection.clone(),
        records,
    }
}

impl FeedbackDataset {
    pub fn filter(&self, selection: &PrioritySelection) -> FilteredFeedback<'_> {
        filter_by_priority(self.records(), selection)
    }
}

impl<'a> FilteredFeedback<'a> {
    pub fn selection(&self) -> &PrioritySelection {
        &self.selection
    }

    pub fn records(&self) -> &[&'a FeedbackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record carrying `feedback_id`; ids are not guaranteed unique.
    pub fn find(&self, feedback_id: &str) -> Option<&'a FeedbackRecord> {
        self.records
            .iter()
            .copied()
            .find(|record| record.feedback_id == feedback_id)
    }

    pub fn priority_list(&self, include_details: bool) -> Vec<PriorityListEntry> {
        build_priority_list(&self.records, include_details)
    }

    pub fn analytics(&self) -> AnalyticsView {
        build_analytics(&self.records)
    }

    pub fn insights(&self) -> InsightsView {
        build_insights(&self.records)
    }
}
