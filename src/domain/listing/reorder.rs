use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SortMode;
use crate::errors::AppError;

/// Moves the entry at `from` to `to`, shifting the ones in between.
/// Returns `false` and leaves the list alone for out-of-range or equal
/// indices.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortAssignment {
    pub id: Uuid,
    pub sort_order: i32,
}

/// Turns the on-screen order into `sortOrder = index` assignments.
pub fn plan_sort_orders(ids: &[Uuid]) -> Result<Vec<SortAssignment>, AppError> {
    if ids.is_empty() {
        return Err(AppError::InvalidInput("Reorder request contains no projects".into()));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(duplicate) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::InvalidInput(format!("Project {} appears more than once", duplicate)));
    }

    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            let sort_order = i32::try_from(index)
                .map_err(|_| AppError::InvalidInput("Too many projects in reorder request".into()))?;
            Ok(SortAssignment { id: *id, sort_order })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderOutcome {
    pub requested: usize,
    pub updated: usize,
    pub missing: Vec<Uuid>,
    pub warning: Option<String>,
    /// Ordering the admin list switches to after a save. The list now is a
    /// bespoke order, so any formula sort would hide it.
    #[serde(default)]
    pub sort_mode: SortMode,
}

impl ReorderOutcome {
    /// Compares what was asked for with what the store reported as written.
    pub fn from_updates(plan: &[SortAssignment], updated: &[Uuid]) -> Self {
        let written: HashSet<&Uuid> = updated.iter().collect();
        let missing: Vec<Uuid> = plan
            .iter()
            .map(|assignment| assignment.id)
            .filter(|id| !written.contains(id))
            .collect();

        let warning = (!missing.is_empty()).then(|| {
            format!(
                "{} of {} projects were not found and kept no order",
                missing.len(),
                plan.len()
            )
        });

        ReorderOutcome {
            requested: plan.len(),
            updated: plan.len() - missing.len(),
            missing,
            warning,
            sort_mode: SortMode::None,
        }
    }
}
