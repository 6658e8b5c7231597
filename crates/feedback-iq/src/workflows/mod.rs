pub mod dispatch;
pub mod feedback;
pub mod summarizer;
pub mod warnings;

pub use warnings::DashboardWarning;
