use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::workflows::concerns;

/// Identifier wrapper for routine items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoutineItemId(pub String);

impl fmt::Display for RoutineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineItemKind {
    Product,
    Activity,
    Nutrition,
    TreatmentFacial,
    TreatmentInjection,
    TreatmentOther,
}

impl RoutineItemKind {
    pub const fn is_treatment(self) -> bool {
        matches!(
            self,
            Self::TreatmentFacial | Self::TreatmentInjection | Self::TreatmentOther
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Activity => "Activity",
            Self::Nutrition => "Nutrition",
            Self::TreatmentFacial => "Facial Treatment",
            Self::TreatmentInjection => "Injectable Treatment",
            Self::TreatmentOther => "Other Treatment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageTime {
    Am,
    Pm,
    Both,
    AsNeeded,
}

impl UsageTime {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Am => "Morning",
            Self::Pm => "Evening",
            Self::Both => "Morning & Evening",
            Self::AsNeeded => "As Needed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageFrequency {
    Daily,
    Weekly,
    AsNeeded,
}

impl UsageFrequency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::AsNeeded => "As Needed",
        }
    }
}

/// When an item is used. Recurring kinds carry a start date, treatments a single
/// treatment date; the variant always matches the item's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutineSchedule {
    Recurring {
        usage: UsageTime,
        frequency: UsageFrequency,
        start_date: NaiveDate,
    },
    Treatment {
        treatment_date: NaiveDate,
    },
}

impl RoutineSchedule {
    /// First day the item counts toward a tracking cycle.
    pub const fn anchor_date(&self) -> NaiveDate {
        match self {
            Self::Recurring { start_date, .. } => *start_date,
            Self::Treatment { treatment_date } => *treatment_date,
        }
    }
}

/// Cached catalog attributes for a scanned product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductLink {
    pub upc: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub good_for: Vec<String>,
    #[serde(default)]
    pub free_of: Vec<String>,
}

impl ProductLink {
    pub fn good_for_labels(&self) -> Vec<String> {
        self.good_for
            .iter()
            .map(|token| concerns::attribute_label(token))
            .collect()
    }

    pub fn free_of_labels(&self) -> Vec<String> {
        self.free_of
            .iter()
            .map(|token| concerns::attribute_label(token))
            .collect()
    }
}

/// A validated routine item, produced by [`RoutineItemDraft::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineItem {
    pub id: RoutineItemId,
    pub name: String,
    pub kind: RoutineItemKind,
    pub schedule: RoutineSchedule,
    pub concerns: BTreeSet<String>,
    pub end_date: Option<NaiveDate>,
    pub required_days: u32,
    pub product: Option<ProductLink>,
}

impl RoutineItem {
    pub fn anchor_date(&self) -> NaiveDate {
        self.schedule.anchor_date()
    }

    pub fn is_ended(&self) -> bool {
        self.end_date.is_some()
    }

    pub fn concern_labels(&self) -> Vec<String> {
        self.concerns
            .iter()
            .map(|token| concerns::concern_label(token))
            .collect()
    }
}

/// Unvalidated form input as the host collects it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutineItemDraft {
    pub name: String,
    pub kind: Option<RoutineItemKind>,
    #[serde(default)]
    pub usage: Option<UsageTime>,
    #[serde(default)]
    pub frequency: Option<UsageFrequency>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub treatment_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub required_days: Option<i64>,
    #[serde(default)]
    pub product: Option<ProductLink>,
}

impl RoutineItemDraft {
    /// Draft that reproduces an existing item, used as the base for edits.
    pub fn from_item(item: &RoutineItem) -> Self {
        let (usage, frequency, start_date, treatment_date) = match item.schedule {
            RoutineSchedule::Recurring {
                usage,
                frequency,
                start_date,
            } => (Some(usage), Some(frequency), Some(start_date), None),
            RoutineSchedule::Treatment { treatment_date } => {
                (None, None, None, Some(treatment_date))
            }
        };

        Self {
            name: item.name.clone(),
            kind: Some(item.kind),
            usage,
            frequency,
            concerns: item.concerns.iter().cloned().collect(),
            start_date,
            treatment_date,
            end_date: item.end_date,
            required_days: Some(i64::from(item.required_days)),
            product: item.product.clone(),
        }
    }
}

/// Partial update for `updateRoutineItem`. `None` leaves a field untouched;
/// `end_date: Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutineItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<RoutineItemKind>,
    #[serde(default)]
    pub usage: Option<UsageTime>,
    #[serde(default)]
    pub frequency: Option<UsageFrequency>,
    #[serde(default)]
    pub concerns: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub treatment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub required_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub product: Option<Option<ProductLink>>,
}

impl RoutineItemPatch {
    pub(crate) fn apply_to(self, draft: &mut RoutineItemDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(kind) = self.kind {
            let was_treatment = draft.kind.map(RoutineItemKind::is_treatment);
            draft.kind = Some(kind);
            // Switching between recurring and treatment kinds moves the anchor date.
            match (was_treatment, kind.is_treatment()) {
                (Some(false), true) => {
                    draft.treatment_date = draft.start_date.take();
                    draft.usage = None;
                    draft.frequency = None;
                }
                (Some(true), false) => {
                    draft.start_date = draft.treatment_date.take();
                }
                _ => {}
            }
        }
        if let Some(usage) = self.usage {
            draft.usage = Some(usage);
        }
        if let Some(frequency) = self.frequency {
            draft.frequency = Some(frequency);
        }
        if let Some(concerns) = self.concerns {
            draft.concerns = concerns;
        }
        if let Some(start_date) = self.start_date {
            draft.start_date = Some(start_date);
        }
        if let Some(treatment_date) = self.treatment_date {
            draft.treatment_date = Some(treatment_date);
        }
        if let Some(end_date) = self.end_date {
            draft.end_date = end_date;
        }
        if let Some(required_days) = self.required_days {
            draft.required_days = Some(required_days);
        }
        if let Some(product) = self.product {
            draft.product = product;
        }
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
