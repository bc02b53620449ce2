//! Scoring Engine — additive salary estimate over the coefficient table.
//!
//! Algorithm:
//! 1. Start at `base_amount` → "Base Salary" line
//! 2. Seniority, location, industry → one line each (unknown value = 0)
//! 3. Sum every selected skill; emit one "Skills Bonus (n)" line only if the sum is non-zero
//! 4. total = Σ line amounts
//!
//! Pure and deterministic: recomputed from scratch after every selection change.

use serde::{Deserialize, Serialize};

use crate::estimate::coefficients::CoefficientTable;
use crate::estimate::selection::Selection;

pub const BASE_LABEL: &str = "Base Salary";

/// One labelled contribution to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub amount: i64,
}

/// Breakdown order is fixed: base, seniority, location, industry, skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub total: i64,
    pub breakdown: Vec<BreakdownLine>,
}

impl EstimateResult {
    /// Total expressed in the secondary display currency, rounded to a whole unit.
    pub fn secondary_total(&self, table: &CoefficientTable) -> i64 {
        (self.total as f64 * table.currency_factor).round() as i64
    }
}

pub fn compute(selection: &Selection, table: &CoefficientTable) -> EstimateResult {
    let mut breakdown = Vec::with_capacity(5);
    breakdown.push(BreakdownLine {
        label: BASE_LABEL.to_string(),
        amount: table.base_amount,
    });

    let categorical = [
        ("Seniority", &selection.seniority, &table.seniority),
        ("Location", &selection.location, &table.location),
        ("Industry", &selection.industry, &table.industry),
    ];
    for (dimension, value, map) in categorical {
        breakdown.push(BreakdownLine {
            label: format!("{dimension}: {value}"),
            amount: map.amount(value),
        });
    }

    let skills_total: i64 = selection
        .skills
        .iter()
        .map(|skill| table.skills.amount(skill))
        .sum();
    if skills_total != 0 {
        breakdown.push(BreakdownLine {
            label: format!("Skills Bonus ({})", selection.skills.len()),
            amount: skills_total,
        });
    }

    let total = breakdown.iter().map(|line| line.amount).sum();
    EstimateResult { total, breakdown }
}
