use chrono::{Duration, NaiveDate};
use skincare_tracker::workflows::analysis::{ScoreHistoryImporter, ScoreImportError};
use skincare_tracker::workflows::routine::{
    RoutineItemDraft, RoutineItemId, RoutineItemKind, UsageFrequency, UsageTime,
};
use skincare_tracker::workflows::tracking::{
    ImprovementStatus, NextAction, TrackedRoutine, TrackingState,
};

fn cycle_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid cycle start")
}

fn tracked_serum(today: NaiveDate) -> TrackedRoutine {
    let draft = RoutineItemDraft {
        name: "Azelaic Acid Serum".to_string(),
        kind: Some(RoutineItemKind::Product),
        usage: Some(UsageTime::Both),
        frequency: Some(UsageFrequency::Daily),
        concerns: vec![
            "redness".to_string(),
            "acne".to_string(),
            "texture".to_string(),
        ],
        start_date: Some(cycle_start()),
        ..RoutineItemDraft::default()
    };
    let item = draft
        .validate(RoutineItemId("item-import".to_string()), 28, today)
        .expect("draft is valid");
    TrackedRoutine::start(item, today)
}

#[test]
fn export_scores_drive_the_comparison() {
    let data = include_bytes!("../analysis_export.csv");
    let history = ScoreHistoryImporter::from_reader(&data[..]).expect("export imports");
    let today = cycle_start() + Duration::days(29);

    let mut tracked = tracked_serum(today);
    let updates = history.score_updates(&tracked, today);
    assert_eq!(updates.len(), 3);
    tracked.apply_scores(&updates, today).expect("all concerns tracked");

    let redness = tracked.concern("redness").expect("redness tracked");
    assert_eq!(redness.baseline_score(), Some(40.0));
    assert_eq!(redness.current_score(), Some(65.0));
    assert_eq!(redness.improvement_status(), ImprovementStatus::Improved);
    assert_eq!(redness.next_action(), NextAction::Rate);

    let acne = tracked.concern("acne").expect("acne tracked");
    assert_eq!(acne.score_difference(), Some(-4.0));
    assert_eq!(acne.improvement_status(), ImprovementStatus::Worsened);

    let texture = tracked.concern("texture").expect("texture tracked");
    assert_eq!(texture.improvement_status(), ImprovementStatus::NoChange);

    let report = tracked.report();
    assert_eq!(report.completed, 3);
    assert_eq!(report.improved, 1);
    assert_eq!(report.worsened, 1);
    assert_eq!(report.awaiting_rating, 3);
}

#[test]
fn paused_cycle_ignores_scores_after_the_stop_date() {
    let data = include_bytes!("../analysis_export.csv");
    let history = ScoreHistoryImporter::from_reader(&data[..]).expect("export imports");
    let stop = cycle_start() + Duration::days(15);
    let today = cycle_start() + Duration::days(40);

    let mut tracked = tracked_serum(stop);
    let updates = history.score_updates(&tracked, stop);
    tracked.apply_scores(&updates, stop).expect("all concerns tracked");
    tracked.pause(None, stop);

    let later = history.score_updates(&tracked, today);
    let redness_update = later
        .iter()
        .find(|update| update.concern_name == "redness")
        .expect("redness update");
    assert_eq!(redness_update.current_score, Some(51.0));

    assert_eq!(tracked.apply_scores(&later, today), Ok(0));
    let redness = tracked.concern("redness").expect("redness tracked");
    assert_eq!(redness.state(), TrackingState::Paused);
    assert_eq!(redness.current_score(), Some(51.0));
}

#[test]
fn rows_without_timestamps_are_skipped() {
    let data = include_bytes!("../analysis_export.csv");
    let history = ScoreHistoryImporter::from_reader(&data[..]).expect("export imports");

    assert!(history.measurements("dark_spots").is_empty());
    assert_eq!(history.measurements("Texture").len(), 3);
    assert_eq!(
        history.concerns().collect::<Vec<_>>(),
        vec!["acne", "redness", "texture"]
    );
}

#[test]
fn malformed_csv_surfaces_csv_error() {
    let csv = "Concern,Score,Analyzed At\nredness,40,2025-09-01,extra\n";
    match ScoreHistoryImporter::from_reader(csv.as_bytes()) {
        Err(ScoreImportError::Csv(_)) => {}
        other => panic!("expected csv error, got {other:?}"),
    }
}
