pub mod domain;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod report;

pub use domain::{
    DatasetOverview, FeedbackDataset, FeedbackRecord, PriorityLevel, PrioritySelection,
    UnknownPriorityLevel, DEFAULT_AI_SUMMARY, DEFAULT_CATEGORY,
};
pub use export::EXPORT_FILE_NAME;
pub use loader::{DatasetError, FeedbackLoader};
pub use pipeline::{filter_by_priority, FilteredFeedback};
pub use report::views::{
    AnalyticsView, CategoryShare, FeedbackDetail, FeedbackInsights, InsightsView,
    PriorityCount, PriorityListEntry, TopPriority,
};
