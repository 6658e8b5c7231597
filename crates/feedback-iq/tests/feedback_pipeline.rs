mod common;

use common::SAMPLE_CSV;
use feedback_iq::workflows::feedback::{
    FeedbackDataset, FeedbackLoader, InsightsView, PriorityLevel, PrioritySelection,
};

fn dataset() -> FeedbackDataset {
    FeedbackLoader::from_reader(SAMPLE_CSV.as_bytes()).expect("sample dataset loads")
}

fn selections() -> Vec<PrioritySelection> {
    let levels = PriorityLevel::ordered();
    (0u8..16)
        .map(|mask| {
            levels
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1u8 << bit) != 0)
                .map(|(_, level)| *level)
                .collect::<PrioritySelection>()
        })
        .collect()
}

#[test]
fn critical_and_high_selection_matches_expected_views() {
    let dataset = dataset();
    let selection = PrioritySelection::parse_list("CRITICAL,HIGH").expect("valid selection");
    let filtered = dataset.filter(&selection);

    assert_eq!(filtered.len(), 3);

    let analytics = filtered.analytics();
    assert_eq!(analytics.count_for(PriorityLevel::Critical), 1);
    assert_eq!(analytics.count_for(PriorityLevel::High), 2);
    assert_eq!(analytics.count_for(PriorityLevel::Medium), 0);
    assert_eq!(analytics.count_for(PriorityLevel::Low), 0);

    let list = filtered.priority_list(false);
    let ids: Vec<&str> = list.iter().map(|entry| entry.feedback_id.as_str()).collect();
    assert_eq!(ids, vec!["FB-001", "FB-003", "FB-004"]);

    let insights = match filtered.insights() {
        InsightsView::Ready(insights) => insights,
        InsightsView::NoData => panic!("insights expected for non-empty selection"),
    };
    assert_eq!(insights.total, 3);
    assert_eq!(insights.critical_count, 1);
    assert_eq!(insights.most_common_category, "Billing");
    assert_eq!(insights.top_priorities.len(), 3);
    assert_eq!(insights.top_priorities[0].feedback_id, "FB-001");
}

#[test]
fn every_selection_filters_consistently() {
    let dataset = dataset();

    for selection in selections() {
        let filtered = dataset.filter(&selection);
        let expected: Vec<&str> = dataset
            .records()
            .iter()
            .filter(|record| selection.contains(record.priority_level))
            .map(|record| record.feedback_id.as_str())
            .collect();
        let actual: Vec<&str> = filtered
            .records()
            .iter()
            .map(|record| record.feedback_id.as_str())
            .collect();
        assert_eq!(actual, expected, "selection {selection}");

        let analytics = filtered.analytics();
        let priority_total: usize = analytics
            .priority_distribution
            .iter()
            .map(|entry| entry.count)
            .sum();
        assert_eq!(priority_total, filtered.len());

        if filtered.is_empty() {
            assert!(analytics.is_empty());
            assert!(matches!(filtered.insights(), InsightsView::NoData));
        } else {
            let share_total: f64 = analytics
                .category_distribution
                .iter()
                .map(|share| share.percentage)
                .sum();
            assert!((share_total - 100.0).abs() < 0.05, "shares {share_total}");
            let insights = filtered.insights();
            assert_eq!(insights.ready().expect("ready").total, filtered.len());
        }
    }
}

#[test]
fn loader_defaults_flow_through_to_views() {
    let dataset = dataset();
    let filtered = dataset.filter(&PrioritySelection::all());
    let list = filtered.priority_list(true);

    let export_button = list
        .iter()
        .find(|entry| entry.feedback_id == "FB-005")
        .expect("FB-005 listed");
    assert_eq!(export_button.category, "Unknown");
    let detail = export_button.detail.as_ref().expect("details requested");
    assert_eq!(detail.ai_summary, "AI summary pending");
    assert!(detail.urgency.is_none());
}

#[test]
fn ranking_is_a_caller_side_step() {
    let dataset = dataset();
    let selection = PrioritySelection::all();

    let unranked = dataset.filter(&selection);
    assert_eq!(unranked.records()[0].feedback_id, "FB-001");
    assert_eq!(unranked.records()[1].feedback_id, "FB-002");

    let ranked_dataset = dataset.ranked_by_score();
    let ranked = ranked_dataset.filter(&selection);
    let ids: Vec<&str> = ranked
        .records()
        .iter()
        .map(|record| record.feedback_id.as_str())
        .collect();
    assert_eq!(ids, vec!["FB-001", "FB-004", "FB-003", "FB-005", "FB-002"]);
}

#[test]
fn export_mirrors_the_filtered_collection() {
    let dataset = dataset();
    let filtered = dataset.filter(&PrioritySelection::default());

    let bytes = filtered.to_csv_bytes().expect("export succeeds");
    let reloaded = FeedbackLoader::from_reader(bytes.as_slice()).expect("export reloads");

    let ids: Vec<&str> = reloaded
        .records()
        .iter()
        .map(|record| record.feedback_id.as_str())
        .collect();
    assert_eq!(ids, vec!["FB-001", "FB-003", "FB-004", "FB-005"]);
    assert_eq!(dataset.overview().total, 5);
    assert_eq!(dataset.overview().critical, 1);
    assert_eq!(dataset.overview().high, 2);
}
