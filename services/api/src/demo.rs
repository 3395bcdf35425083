use crate::infra::{preview_tracking, InMemoryRoutineRepository};
use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Args;
use serde::de::DeserializeOwned;
use skincare_tracker::config::{AppConfig, TrackingConfig};
use skincare_tracker::error::AppError;
use skincare_tracker::workflows::analysis::ScoreHistoryImporter;
use skincare_tracker::workflows::concerns;
use skincare_tracker::workflows::routine::{
    RoutineItemDraft, RoutineItemKind, UsageFrequency, UsageTime,
};
use skincare_tracker::workflows::tracking::{
    RatingRequest, RoutineTrackingService, ScoreUpdate, TrackingAction, TrackingReport,
    UsageConsistency, UsageReview,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the demo (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Optional analysis export (Concern,Score,Analyzed At) to score the demo item.
    #[arg(long)]
    pub(crate) scores_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct TrackingReportArgs {
    /// Routine item name
    #[arg(long)]
    pub(crate) name: String,
    /// Item kind: product, activity, nutrition, treatment_facial, treatment_injection, treatment_other
    #[arg(long, default_value = "product", value_parser = parse_token::<RoutineItemKind>)]
    pub(crate) kind: RoutineItemKind,
    /// Concern to track; repeat for several
    #[arg(long = "concern", required = true)]
    pub(crate) concerns: Vec<String>,
    /// Start date, or treatment date for treatments (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) since: NaiveDate,
    /// Usage time for recurring items: am, pm, both, as_needed
    #[arg(long, default_value = "both", value_parser = parse_token::<UsageTime>)]
    pub(crate) usage: UsageTime,
    /// Usage frequency for recurring items: daily, weekly, as_needed
    #[arg(long, default_value = "daily", value_parser = parse_token::<UsageFrequency>)]
    pub(crate) frequency: UsageFrequency,
    /// Optional end date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Tracking window in days (defaults to TRACKING_REQUIRED_DAYS)
    #[arg(long)]
    pub(crate) required_days: Option<i64>,
    /// Evaluation date for the report (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Optional analysis export to hydrate baseline and current scores
    #[arg(long)]
    pub(crate) scores_csv: Option<PathBuf>,
}

impl TrackingReportArgs {
    fn draft(&self) -> RoutineItemDraft {
        let mut draft = RoutineItemDraft {
            name: self.name.clone(),
            kind: Some(self.kind),
            concerns: self.concerns.clone(),
            end_date: self.end_date,
            required_days: self.required_days,
            ..RoutineItemDraft::default()
        };
        if self.kind.is_treatment() {
            draft.treatment_date = Some(self.since);
        } else {
            draft.usage = Some(self.usage);
            draft.frequency = Some(self.frequency);
            draft.start_date = Some(self.since);
        }
        draft
    }
}

/// Parse a snake_case token into one of the serde-tagged domain enums.
fn parse_token<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let token = concerns::canonical_token(raw);
    serde_json::from_value(serde_json::Value::String(token))
        .map_err(|_| format!("unrecognised value '{raw}'"))
}

pub(crate) fn run_tracking_report(args: TrackingReportArgs) -> Result<(), AppError> {
    let tracking = AppConfig::load()?.tracking;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let scores = args.scores_csv.as_ref().map(File::open).transpose()?;
    let imported = scores.is_some();

    let tracked = preview_tracking(args.draft(), today, &tracking, scores)?;
    render_tracking_report(&tracked.report(), today, imported);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, scores_csv } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let started = today - Duration::days(35);

    println!("Skincare routine tracking demo");
    let repository = Arc::new(InMemoryRoutineRepository::default());
    let service = RoutineTrackingService::new(repository, TrackingConfig::default());

    let draft = RoutineItemDraft {
        name: "Azelaic Acid Serum".to_string(),
        kind: Some(RoutineItemKind::Product),
        usage: Some(UsageTime::Pm),
        frequency: Some(UsageFrequency::Daily),
        concerns: vec![
            "redness".to_string(),
            "acne".to_string(),
            "dry skin".to_string(),
        ],
        start_date: Some(started),
        ..RoutineItemDraft::default()
    };
    let created = service.create_item(draft, started)?;
    let id = created.id().clone();
    println!(
        "- Added {} ({}) on {} tracking {}",
        created.item().name,
        created.item().kind.label(),
        started,
        created.item().concern_labels().join(", ")
    );

    let early = started + Duration::days(10);
    let snapshot = service.concern_tracking(&id, early)?;
    println!("\nDay 10 check-in");
    for view in snapshot.concern_views() {
        println!(
            "- {}: week {}/{} ({}%) | {}",
            view.concern_label,
            view.weeks_completed,
            view.total_weeks,
            view.percent,
            view.next_action_label
        );
    }

    let early_rating = [RatingRequest {
        concern_name: "acne".to_string(),
        is_effective: true,
    }];
    if let Err(err) = service.rate_effectiveness(&id, &early_rating, early, Utc::now()) {
        println!("  Early rating rejected: {}", err);
    }

    let review = service.review_usage(
        &id,
        &UsageReview {
            response: Some(UsageConsistency::No),
            ..UsageReview::default()
        },
        early,
    )?;
    if review.show_stop_tracking {
        println!("  Usage review answered 'no': offering to stop tracking (not confirmed)");
    }

    let current = service.concern_tracking(&id, today)?;
    let updates = match scores_csv {
        Some(path) => ScoreHistoryImporter::from_path(path)?.score_updates(&current, today),
        None => sample_scores(),
    };
    let scored = service.record_scores(&id, &updates, today)?;
    println!("\nAfter {} days", (today - started).num_days());
    render_tracking_report(&scored.report(), today, true);

    let ratings: Vec<RatingRequest> = scored
        .concerns()
        .filter(|tracking| tracking.is_completed())
        .map(|tracking| RatingRequest {
            concern_name: tracking.concern_name().to_string(),
            is_effective: tracking.score_difference().is_some_and(|diff| diff > 0.0),
        })
        .collect();
    let outcomes = service.rate_effectiveness(&id, &ratings, today, Utc::now())?;
    println!("\nEffectiveness ratings");
    for outcome in &outcomes {
        println!(
            "- {}: {}",
            concerns::concern_label(&outcome.entry.concern_name),
            if outcome.entry.is_effective {
                "worked"
            } else {
                "did not work"
            }
        );
    }

    let paused = service.toggle_tracking(&id, TrackingAction::Pause, today)?;
    println!("\nPaused tracking for {} concerns", paused.len());
    let resumed = service.toggle_tracking(&id, TrackingAction::Resume, today)?;
    let restarted = service.concern_tracking(&id, today)?;
    println!(
        "Resumed {} concerns; new cycle {} starts {}",
        resumed.len(),
        restarted.concerns().map(|t| t.cycle()).max().unwrap_or(1),
        today
    );

    Ok(())
}

fn sample_scores() -> Vec<ScoreUpdate> {
    vec![
        ScoreUpdate {
            concern_name: "redness".to_string(),
            baseline_score: Some(40.0),
            current_score: Some(65.0),
        },
        ScoreUpdate {
            concern_name: "acne".to_string(),
            baseline_score: Some(62.0),
            current_score: Some(58.0),
        },
    ]
}

pub(crate) fn render_tracking_report(report: &TrackingReport, today: NaiveDate, scored: bool) {
    println!(
        "{} [{}] evaluated {}",
        report.item_name, report.kind_label, today
    );
    if !scored {
        println!("Scores: none provided (take a photo to compare)");
    }

    println!(
        "{} of {} concerns completed | {} awaiting rating | {} awaiting photo | {} paused | {}% average",
        report.completed,
        report.total,
        report.awaiting_rating,
        report.awaiting_photo,
        report.paused,
        report.average_percent
    );

    for view in &report.concerns {
        let scores = match (view.baseline_score, view.current_score) {
            (Some(baseline), Some(current)) => format!("{baseline:.0} -> {current:.0}"),
            (Some(baseline), None) => format!("{baseline:.0} -> ?"),
            _ => "no scores".to_string(),
        };
        println!(
            "- {}: {} | week {}/{} ({}%) | {} ({}) | {}",
            view.concern_label,
            view.state_label,
            view.weeks_completed,
            view.total_weeks,
            view.percent,
            scores,
            view.improvement_label,
            view.next_action_label
        );
    }
}
