//! Validation of the workload configuration form before submission.
//!
//! Each quantity field must hold an integer within `[0, max]`; `max` is
//! optional per field. The first offending field blocks the whole form.

use std::fmt;

use crate::model::WorkloadCounter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadField {
    pub name: String,
    /// Raw text as entered.
    pub value: String,
    pub max: Option<i64>,
}

impl WorkloadField {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, max: Option<i64>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormViolationKind {
    NotANumber,
    ExceedsMax { max: i64 },
    Negative,
}

/// The first field that blocks submission. `field_index` is the field to
/// focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormViolation {
    pub field_index: usize,
    pub name: String,
    pub kind: FormViolationKind,
}

impl fmt::Display for FormViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        match &self.kind {
            FormViolationKind::NotANumber => {
                write!(f, "User count for \"{name}\" must be a whole number.")
            }
            FormViolationKind::ExceedsMax { max } => {
                write!(f, "User count for \"{name}\" cannot exceed {max}.")
            }
            FormViolationKind::Negative => {
                write!(f, "User count for \"{name}\" cannot be negative.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadQuantity {
    pub name: String,
    pub users: i64,
}

/// Checks fields in order and returns the parsed quantities when every
/// field passes. An empty field counts as zero.
pub fn validate_workload_form(
    fields: &[WorkloadField],
) -> Result<Vec<WorkloadQuantity>, FormViolation> {
    let mut out = Vec::with_capacity(fields.len());
    for (field_index, field) in fields.iter().enumerate() {
        let violation = |kind| FormViolation {
            field_index,
            name: field.name.clone(),
            kind,
        };
        let raw = field.value.trim();
        let users = if raw.is_empty() {
            0
        } else {
            raw.parse::<i64>()
                .map_err(|_| violation(FormViolationKind::NotANumber))?
        };
        if let Some(max) = field.max {
            if users > max {
                return Err(violation(FormViolationKind::ExceedsMax { max }));
            }
        }
        if users < 0 {
            return Err(violation(FormViolationKind::Negative));
        }
        out.push(WorkloadQuantity {
            name: field.name.clone(),
            users,
        });
    }
    Ok(out)
}

/// Sets every quantity back to zero.
pub fn reset_workload_form(fields: &mut [WorkloadField]) {
    for field in fields {
        field.value = "0".to_string();
    }
}

/// One field per workload template, pre-filled with the fleet-wide count
/// and bounded by the template's `maxWorkers`.
#[must_use]
pub fn fields_for_workloads(workloads: &[WorkloadCounter]) -> Vec<WorkloadField> {
    workloads
        .iter()
        .map(|w| {
            WorkloadField::new(
                w.name(),
                w.active_worker_limit.to_string(),
                w.workload.max_workers,
            )
        })
        .collect()
}
