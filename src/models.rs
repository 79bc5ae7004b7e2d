// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinmateError;
use crate::store::Entity;

pub const PERSONAL_CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "entertainment",
    "shopping",
    "bills",
    "healthcare",
    "education",
    "travel",
    "investment",
    "other",
];

pub const BUSINESS_CATEGORIES: &[&str] = &[
    "revenue", "cogs", "salaries", "rent", "marketing", "software", "office", "taxes", "other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DashboardType {
    #[default]
    Personal,
    Business,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub r#type: TxType,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub dashboard_type: DashboardType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_party: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub is_tax_deductible: bool,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ai_categorized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        r#type: TxType,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Transaction {
            id: String::new(),
            description: description.into(),
            amount,
            r#type,
            category: category.into(),
            date,
            dashboard_type: DashboardType::Personal,
            related_party: None,
            invoice_number: None,
            is_tax_deductible: false,
            recurring: false,
            tags: Vec::new(),
            ai_categorized: false,
            receipt_url: None,
        }
    }

    pub fn is_income(&self) -> bool {
        self.r#type == TxType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.r#type == TxType::Expense
    }

    /// Required-field checks performed by the add/edit forms.
    pub fn validate(&self) -> Result<(), FinmateError> {
        if self.description.trim().is_empty() {
            return Err(FinmateError::validation("description is required"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(FinmateError::validation("amount must be greater than zero"));
        }
        if self.category.trim().is_empty() {
            return Err(FinmateError::validation("category is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default)]
    pub id: String,
    pub category: String,
    pub monthly_limit: Decimal,
    pub month: String, // YYYY-MM
}

impl Budget {
    pub fn validate(&self) -> Result<(), FinmateError> {
        if self.category.trim().is_empty() {
            return Err(FinmateError::validation("budget category is required"));
        }
        if self.monthly_limit <= Decimal::ZERO {
            return Err(FinmateError::validation(
                "monthly limit must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitStatus {
    #[default]
    Active,
    Settled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
    pub name: String,
    pub amount_owed: Decimal,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    pub settled: bool,
    #[serde(default)]
    pub is_creator: bool,
}

impl Participant {
    pub fn remaining(&self) -> Decimal {
        self.amount_owed - self.amount_paid
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitBill {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub total_amount: Decimal,
    pub category: String,
    pub bill_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub status: SplitStatus,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default)]
    pub id: String,
    pub key: String,
    pub badge_type: String,
    pub points: u32,
    pub unlocked_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    Realtime,
    #[default]
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Savings,
    House,
    Car,
    Education,
    Travel,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: String,
    pub title: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub priority: Priority,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default = "default_true")]
    pub push_notifications: bool,
    #[serde(default)]
    pub notification_frequency: NotificationFrequency,
    #[serde(default)]
    pub financial_goals: Vec<FinancialGoal>,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            full_name: String::new(),
            email: String::new(),
            currency: default_currency(),
            theme: Theme::default(),
            email_notifications: true,
            push_notifications: true,
            notification_frequency: NotificationFrequency::default(),
            financial_goals: Vec::new(),
        }
    }
}

impl UserProfile {
    /// Name used when signing messages to other people.
    pub fn signature(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

macro_rules! entity {
    ($ty:ty, $name:literal) => {
        impl Entity for $ty {
            const NAME: &'static str = $name;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

entity!(Transaction, "Transaction");
entity!(Budget, "Budget");
entity!(SplitBill, "SplitBill");
entity!(Achievement, "Achievement");

macro_rules! text_enum {
    ($ty:ty { $($variant:path => $text:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    $($variant => $text,)+
                };
                f.write_str(s)
            }
        }

        impl FromStr for $ty {
            type Err = FinmateError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(FinmateError::validation(format!(
                        "invalid value '{}', expected one of: {}",
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

text_enum!(TxType { TxType::Income => "income", TxType::Expense => "expense" });
text_enum!(DashboardType {
    DashboardType::Personal => "personal",
    DashboardType::Business => "business",
});
text_enum!(SplitStatus { SplitStatus::Active => "active", SplitStatus::Settled => "settled" });
text_enum!(Theme { Theme::Dark => "dark", Theme::Light => "light", Theme::System => "system" });
text_enum!(NotificationFrequency {
    NotificationFrequency::Realtime => "realtime",
    NotificationFrequency::Daily => "daily",
    NotificationFrequency::Weekly => "weekly",
});
text_enum!(GoalCategory {
    GoalCategory::Savings => "savings",
    GoalCategory::House => "house",
    GoalCategory::Car => "car",
    GoalCategory::Education => "education",
    GoalCategory::Travel => "travel",
    GoalCategory::Other => "other",
});
text_enum!(Priority { Priority::Low => "low", Priority::Medium => "medium", Priority::High => "high" });
