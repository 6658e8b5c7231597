use super::super::domain::PriorityLevel;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackDetail {
    pub ai_summary: String,
    pub sentiment: Option<String>,
    pub urgency: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityListEntry {
    pub feedback_id: String,
    pub original_text: String,
    pub category: String,
    pub priority_level: PriorityLevel,
    pub priority_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<FeedbackDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityCount {
    pub level: PriorityLevel,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    /// Share of the filtered collection, rounded to two decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsView {
    pub priority_distribution: Vec<PriorityCount>,
    pub category_distribution: Vec<CategoryShare>,
}

impl AnalyticsView {
    pub fn is_empty(&self) -> bool {
        self.priority_distribution.is_empty() && self.category_distribution.is_empty()
    }

    pub fn count_for(&self, level: PriorityLevel) -> usize {
        self.priority_distribution
            .iter()
            .find(|entry| entry.level == level)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPriority {
    pub rank: usize,
    pub feedback_id: String,
    pub excerpt: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackInsights {
    pub total: usize,
    pub critical_count: usize,
    pub most_common_category: String,
    pub top_priorities: Vec<TopPriority>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InsightsView {
    NoData,
    Ready(FeedbackInsights),
}

impl InsightsView {
    pub fn ready(&self) -> Option<&FeedbackInsights> {
        match self {
            Self::Ready(insights) => Some(insights),
            Self::NoData => None,
        }
    }
}
