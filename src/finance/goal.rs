// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Financial goals live on the user profile and are saved wholesale.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{HUNDRED, percent};
use crate::error::FinmateError;
use crate::models::{FinancialGoal, GoalCategory, Priority, UserProfile};

#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub target_date: Option<NaiveDate>,
    pub category: Option<GoalCategory>,
    pub priority: Option<Priority>,
}

fn check(goal: &FinancialGoal) -> Result<(), FinmateError> {
    if goal.title.trim().is_empty() {
        return Err(FinmateError::validation("goal title is required"));
    }
    if goal.target_amount <= Decimal::ZERO {
        return Err(FinmateError::validation(
            "target amount must be greater than zero",
        ));
    }
    if goal.current_amount < Decimal::ZERO {
        return Err(FinmateError::validation("saved amount cannot be negative"));
    }
    Ok(())
}

fn find_mut<'a>(
    profile: &'a mut UserProfile,
    id: &str,
) -> Result<&'a mut FinancialGoal, FinmateError> {
    profile
        .financial_goals
        .iter_mut()
        .find(|g| g.id == id)
        .ok_or_else(|| FinmateError::NotFound {
            entity: "FinancialGoal",
            id: id.to_string(),
        })
}

/// Appends `goal`, assigning an id when it has none. Returns the id.
pub fn add(profile: &mut UserProfile, mut goal: FinancialGoal) -> Result<String, FinmateError> {
    check(&goal)?;
    if goal.id.is_empty() {
        goal.id = Uuid::new_v4().to_string();
    }
    let id = goal.id.clone();
    profile.financial_goals.push(goal);
    Ok(id)
}

pub fn edit(profile: &mut UserProfile, id: &str, patch: GoalPatch) -> Result<(), FinmateError> {
    let goal = find_mut(profile, id)?;
    let mut next = goal.clone();
    if let Some(v) = patch.title {
        next.title = v;
    }
    if let Some(v) = patch.target_amount {
        next.target_amount = v;
    }
    if let Some(v) = patch.current_amount {
        next.current_amount = v;
    }
    if let Some(v) = patch.target_date {
        next.target_date = v;
    }
    if let Some(v) = patch.category {
        next.category = v;
    }
    if let Some(v) = patch.priority {
        next.priority = v;
    }
    check(&next)?;
    *goal = next;
    Ok(())
}

pub fn remove(profile: &mut UserProfile, id: &str) -> Result<FinancialGoal, FinmateError> {
    let pos = profile
        .financial_goals
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| FinmateError::NotFound {
            entity: "FinancialGoal",
            id: id.to_string(),
        })?;
    Ok(profile.financial_goals.remove(pos))
}

pub fn contribute(
    profile: &mut UserProfile,
    id: &str,
    amount: Decimal,
) -> Result<Decimal, FinmateError> {
    if amount <= Decimal::ZERO {
        return Err(FinmateError::validation(
            "contribution must be greater than zero",
        ));
    }
    let goal = find_mut(profile, id)?;
    goal.current_amount += amount;
    Ok(goal.current_amount)
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub goal: FinancialGoal,
    pub percent: Decimal,
    pub remaining: Decimal,
    pub completed: bool,
    /// Needed per month from `today` to hit the target date; `None` once
    /// completed or past due.
    pub monthly_needed: Option<Decimal>,
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
        - i64::from(from.month());
    if to.day() < from.day() { months - 1 } else { months }
}

pub fn progress(goal: &FinancialGoal, today: NaiveDate) -> GoalProgress {
    let remaining = (goal.target_amount - goal.current_amount).max(Decimal::ZERO);
    let completed = goal.current_amount >= goal.target_amount;
    let monthly_needed = if completed || goal.target_date < today {
        None
    } else {
        let months = months_between(today, goal.target_date).max(1);
        Some((remaining / Decimal::from(months)).round_dp(2))
    };
    GoalProgress {
        goal: goal.clone(),
        percent: percent(goal.current_amount, goal.target_amount).min(HUNDRED),
        remaining,
        completed,
        monthly_needed,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalTotals {
    pub saved: Decimal,
    pub target: Decimal,
    pub completed: usize,
}

pub fn totals(goals: &[FinancialGoal]) -> GoalTotals {
    GoalTotals {
        saved: goals.iter().map(|g| g.current_amount).sum(),
        target: goals.iter().map(|g| g.target_amount).sum(),
        completed: goals
            .iter()
            .filter(|g| g.current_amount >= g.target_amount)
            .count(),
    }
}
