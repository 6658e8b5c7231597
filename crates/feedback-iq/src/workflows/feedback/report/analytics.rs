use super::super::domain::{FeedbackRecord, PriorityLevel};
use super::views::{AnalyticsView, CategoryShare, FeedbackDetail, PriorityCount, PriorityListEntry};

pub(crate) fn build_priority_list(
    records: &[&FeedbackRecord],
    include_details: bool,
) -> Vec<PriorityListEntry> {
    records
        .iter()
        .map(|record| PriorityListEntry {
            feedback_id: record.feedback_id.clone(),
            original_text: record.original_text.clone(),
            category: record.category.clone(),
            priority_level: record.priority_level,
            priority_score: record.priority_score,
            detail: include_details.then(|| FeedbackDetail {
                ai_summary: record.ai_summary.clone(),
                sentiment: record.sentiment.clone(),
                urgency: record.urgency.clone(),
            }),
        })
        .collect()
}

pub(crate) fn build_analytics(records: &[&FeedbackRecord]) -> AnalyticsView {
    if records.is_empty() {
        return AnalyticsView::default();
    }

    let priority_distribution = PriorityLevel::ordered()
        .into_iter()
        .map(|level| PriorityCount {
            level,
            count: records
                .iter()
                .filter(|record| record.priority_level == level)
                .count(),
        })
        .collect();

    let total = records.len() as f64;
    let mut category_distribution: Vec<CategoryShare> = category_counts(records)
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category: category.to_string(),
            count,
            percentage: round_two(count as f64 / total * 100.0),
        })
        .collect();
    // stable: ties keep first-seen order
    category_distribution.sort_by(|a, b| b.count.cmp(&a.count));

    AnalyticsView {
        priority_distribution,
        category_distribution,
    }
}

/// Category counts in first-seen order.
pub(crate) fn category_counts<'r>(records: &[&'r FeedbackRecord]) -> Vec<(&'r str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for &record in records {
        match counts
            .iter_mut()
            .find(|(category, _)| *category == record.category)
        {
            Some((_, count)) => *count += 1,
            None => counts.push((record.category.as_str(), 1)),
        }
    }
    counts
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
