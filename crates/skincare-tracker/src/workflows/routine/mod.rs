pub mod domain;
mod validation;

pub use domain::{
    ProductLink, RoutineItem, RoutineItemDraft, RoutineItemId, RoutineItemKind,
    RoutineItemPatch, RoutineSchedule, UsageFrequency, UsageTime,
};
pub use validation::ValidationError;
