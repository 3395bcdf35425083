use crate::workflows::concerns::canonical_token;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One usable row of an analysis export.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalysisRecord {
    pub(crate) concern: String,
    pub(crate) score: f64,
    pub(crate) measured_on: NaiveDate,
}

/// Parse an export, skipping rows without a concern, a numeric score, or a
/// readable timestamp.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<AnalysisRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<AnalysisRow>() {
        let row = record?;
        if let Some(parsed) = row.into_record() {
            records.push(parsed);
        }
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct AnalysisRow {
    #[serde(rename = "Concern")]
    concern: String,
    #[serde(rename = "Score", default, deserialize_with = "empty_string_as_none")]
    score: Option<String>,
    #[serde(
        rename = "Analyzed At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    analyzed_at: Option<String>,
}

impl AnalysisRow {
    fn into_record(self) -> Option<AnalysisRecord> {
        let concern = canonical_token(&self.concern);
        if concern.is_empty() {
            return None;
        }
        let score = self
            .score
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|score| score.is_finite())?;
        let measured_on = self
            .analyzed_at
            .as_deref()
            .and_then(parse_datetime)
            .map(|dt| dt.date())?;

        Some(AnalysisRecord {
            concern,
            score,
            measured_on,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
