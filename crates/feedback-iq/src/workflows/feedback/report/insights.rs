use super::super::domain::{FeedbackRecord, PriorityLevel};
use super::analytics::category_counts;
use super::views::{FeedbackInsights, InsightsView, TopPriority};

pub const TOP_PRIORITY_COUNT: usize = 3;
pub const EXCERPT_CHAR_BUDGET: usize = 120;
const ELLIPSIS: &str = "...";

pub(crate) fn build_insights(records: &[&FeedbackRecord]) -> InsightsView {
    let Some(most_common_category) = most_common_category(records) else {
        return InsightsView::NoData;
    };

    let critical_count = records
        .iter()
        .filter(|record| record.priority_level == PriorityLevel::Critical)
        .count();

    let top_priorities = records
        .iter()
        .take(TOP_PRIORITY_COUNT)
        .enumerate()
        .map(|(index, record)| {
            let (excerpt, truncated) = excerpt(&record.original_text, EXCERPT_CHAR_BUDGET);
            TopPriority {
                rank: index + 1,
                feedback_id: record.feedback_id.clone(),
                excerpt,
                truncated,
            }
        })
        .collect();

    InsightsView::Ready(FeedbackInsights {
        total: records.len(),
        critical_count,
        most_common_category: most_common_category.to_string(),
        top_priorities,
    })
}

/// Mode of the category column. Ties go to the category seen first.
pub(crate) fn most_common_category<'r>(records: &[&'r FeedbackRecord]) -> Option<&'r str> {
    let mut best: Option<(&str, usize)> = None;
    for (category, count) in category_counts(records) {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((category, count)),
        }
    }
    best.map(|(category, _)| category)
}

fn excerpt(text: &str, budget: usize) -> (String, bool) {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => (format!("{}{ELLIPSIS}", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}
