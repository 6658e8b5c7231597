mod analytics;
mod insights;
pub mod views;

pub use insights::{EXCERPT_CHAR_BUDGET, TOP_PRIORITY_COUNT};

pub(crate) use analytics::{build_analytics, build_priority_list};
pub(crate) use insights::build_insights;
