// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Prompt construction and fallbacks for the assistant features.
//!
//! None of these calls fail the command that triggered them: errors are
//! logged and a canned answer is returned instead.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::Path;
use tracing::{debug, warn};

use crate::finance::business::BusinessMetrics;
use crate::finance::report::PeriodReport;
use crate::llm::{LlmClient, invoke_json, invoke_text};
use crate::models::{Budget, Transaction, TxType};
use crate::utils::parse_date;

pub const INSIGHT_FALLBACK: &str =
    "Keep tracking your expenses consistently - you're building great financial habits!";
pub const REPORT_FALLBACK: &str =
    "Could not generate AI analysis at this time. Please try again later.";
pub const EMPTY_PERIOD: &str =
    "No transactions found for this period. Try a different date range to get an analysis.";
pub const BUSINESS_FALLBACK: &str = "Focus on optimizing your cash flow and identifying growth opportunities in your top-performing revenue streams.";
pub const CHAT_FALLBACK: &str = "I apologize, but I'm having trouble processing your request right now. Please try again in a moment.";

const MAX_SUGGESTIONS: usize = 2;
const CHAT_TRANSACTIONS: usize = 20;
const HISTORY_TURNS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSuggestion {
    pub category: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize)]
struct Suggestions {
    #[serde(default)]
    suggestions: Vec<BudgetSuggestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub total_transactions: usize,
    /// Last 30 days.
    pub monthly_expenses: Decimal,
    pub monthly_income: Decimal,
}

/// Data handed to the chat assistant alongside the question.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialContext {
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub summary: ContextSummary,
}

impl FinancialContext {
    /// `txs` newest first, as the list view returns them.
    pub fn build(txs: &[Transaction], budgets: &[Budget], today: NaiveDate) -> FinancialContext {
        let since = today - Duration::days(30);
        let recent = |kind: TxType| -> Decimal {
            txs.iter()
                .filter(|t| t.r#type == kind && t.date > since)
                .map(|t| t.amount)
                .sum()
        };
        FinancialContext {
            transactions: txs.iter().take(CHAT_TRANSACTIONS).cloned().collect(),
            budgets: budgets.to_vec(),
            summary: ContextSummary {
                total_transactions: txs.len(),
                monthly_expenses: recent(TxType::Expense),
                monthly_income: recent(TxType::Income),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

/// Fields read off a receipt image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReceiptDraft {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(skip)]
    pub receipt_url: String,
}

impl ReceiptDraft {
    /// Fills a transaction from the draft; fields the receipt lacked keep
    /// the values already on `base`.
    pub fn apply(&self, base: &mut Transaction) {
        if let Some(d) = self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            base.description = d.trim().to_string();
        }
        if let Some(a) = self.amount.filter(|a| *a > Decimal::ZERO) {
            base.amount = a;
        }
        if let Some(c) = self.category.as_deref().filter(|c| !c.is_empty()) {
            base.category = c.to_string();
        }
        if let Some(d) = self.date.as_deref().and_then(|d| parse_date(d).ok()) {
            base.date = d;
        }
        base.ai_categorized = true;
        base.receipt_url = Some(self.receipt_url.clone());
    }
}

pub struct Advisor<'a> {
    llm: &'a dyn LlmClient,
    currency: String,
}

fn to_json<T: Serialize + ?Sized>(v: &T) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

impl<'a> Advisor<'a> {
    pub fn new(llm: &'a dyn LlmClient, currency: &str) -> Advisor<'a> {
        let currency = if currency.trim().is_empty() { "USD" } else { currency.trim() };
        Advisor {
            llm,
            currency: currency.to_string(),
        }
    }

    fn text_or(&self, what: &str, prompt: &str, fallback: &str) -> String {
        match invoke_text(self.llm, prompt) {
            Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
            Ok(_) => {
                warn!(call = what, "empty LLM reply, using fallback");
                fallback.to_string()
            }
            Err(e) => {
                warn!(call = what, error = %e, "LLM call failed, using fallback");
                fallback.to_string()
            }
        }
    }

    pub fn insight_prompt(&self, month_txs: &[Transaction]) -> String {
        let sample: Vec<&Transaction> = month_txs.iter().take(10).collect();
        format!(
            "Analyze these financial transactions and provide a helpful, encouraging insight in 1-2 sentences. Use the currency code '{}' for all financial values mentioned.\n\nRecent transactions: {}\n\nFocus on spending patterns, potential savings opportunities, or positive financial habits.",
            self.currency,
            to_json(&sample)
        )
    }

    /// One or two sentences about this month's activity.
    pub fn dashboard_insight(&self, month_txs: &[Transaction]) -> String {
        self.text_or("insight", &self.insight_prompt(month_txs), INSIGHT_FALLBACK)
    }

    pub fn budget_suggestions(&self, unbudgeted: &[(String, Decimal)]) -> Vec<BudgetSuggestion> {
        if unbudgeted.is_empty() {
            return Vec::new();
        }
        let prompt = format!(
            "Based on the following spending data, suggest up to 2 budget categories to create. For each suggestion, provide a short, encouraging reason. Use the currency code '{}' in your 'reason' if you mention any amounts.\n\nUnbudgeted spending: {}\n\nRespond with an object whose \"suggestions\" array holds objects with a \"category\" and a \"reason\" key.",
            self.currency,
            to_json(unbudgeted)
        );
        let schema = json!({
            "type": "object",
            "properties": {
                "suggestions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "category": { "type": "string" },
                            "reason": { "type": "string" }
                        }
                    }
                }
            }
        });
        match invoke_json::<Suggestions>(self.llm, &prompt, &schema) {
            Ok(s) => s
                .suggestions
                .into_iter()
                .filter(|s| !s.category.trim().is_empty())
                .take(MAX_SUGGESTIONS)
                .collect(),
            Err(e) => {
                warn!(error = %e, "budget suggestions unavailable");
                Vec::new()
            }
        }
    }

    pub fn report_analysis(&self, period: &str, report: &PeriodReport) -> String {
        if report.transaction_count == 0 {
            return EMPTY_PERIOD.to_string();
        }
        let data = json!({
            "income": report.income,
            "expenses": report.expenses,
            "netSavings": report.net_savings,
            "spendingByCategory": report.spending_by_category,
        });
        let prompt = format!(
            "You are FinMate, an expert financial analyst. Based on the following financial report data, provide a concise, insightful analysis in 2-3 short paragraphs.\nIMPORTANT: Use the currency code '{}' for all financial figures.\n\nReport Period: {}\nData: {}\n\n1. Start with a clear summary of the user's financial performance (income vs. expenses, net savings).\n2. Identify the top 1-2 spending categories and comment on them.\n3. Provide one actionable, encouraging tip for improvement based on the data.\n\nMaintain a supportive and professional tone.",
            self.currency, period, data
        );
        self.text_or("report", &prompt, REPORT_FALLBACK)
    }

    pub fn business_insight(&self, txs: &[Transaction], metrics: &BusinessMetrics) -> String {
        let sample: Vec<&Transaction> = txs.iter().take(15).collect();
        let prompt = format!(
            "Analyze this business financial data and provide a strategic business insight in 2-3 sentences. Use the currency code '{}' for all financial values.\n\nMonthly metrics: {}\nRecent transactions: {}\n\nFocus on cash flow, business growth opportunities, cost optimization, or strategic recommendations.",
            self.currency,
            to_json(metrics),
            to_json(&sample)
        );
        self.text_or("business", &prompt, BUSINESS_FALLBACK)
    }

    pub fn chat_prompt(&self, question: &str, ctx: &FinancialContext, history: &[Turn]) -> String {
        let context = serde_json::to_string_pretty(ctx).unwrap_or_else(|_| "{}".to_string());
        let mut prompt = format!(
            "You are FinMate, an AI financial assistant. The user asked: \"{}\"\n\nHere's their financial data context:\n{}\n",
            question.trim(),
            context
        );
        let start = history.len().saturating_sub(HISTORY_TURNS);
        if start < history.len() {
            prompt.push_str("\nEarlier in this conversation:\n");
            for turn in &history[start..] {
                let who = match turn.speaker {
                    Speaker::User => "User",
                    Speaker::Assistant => "FinMate",
                };
                prompt.push_str(&format!("{}: {}\n", who, turn.text));
            }
        }
        prompt.push_str(&format!(
            "\nPlease provide a helpful, personalized, and encouraging response. Include specific numbers and actionable advice when relevant.\nIMPORTANT: Use the currency code '{}' for all monetary values in your response.\nKeep the response conversational and supportive. If the question is about spending analysis, budgeting, or financial planning, use their actual data to provide insights.\n\nRespond in a warm, friendly tone as their personal financial coach.",
            self.currency
        ));
        prompt
    }

    pub fn chat(&self, question: &str, ctx: &FinancialContext, history: &[Turn]) -> String {
        self.text_or("chat", &self.chat_prompt(question, ctx, history), CHAT_FALLBACK)
    }

    /// A category from `categories` for the description, if the model picks
    /// a valid one.
    pub fn suggest_category(&self, description: &str, categories: &[&str]) -> Option<String> {
        let prompt = format!(
            "Pick the single best category for this transaction: \"{}\". Answer with one of: {}.",
            description.trim(),
            categories.join(", ")
        );
        let schema = json!({
            "type": "object",
            "properties": { "category": { "type": "string", "enum": categories } },
            "required": ["category"]
        });
        match invoke_json::<Value>(self.llm, &prompt, &schema) {
            Ok(v) => {
                let picked = v.get("category").and_then(Value::as_str).map(str::to_lowercase);
                match picked {
                    Some(c) if categories.contains(&c.as_str()) => Some(c),
                    other => {
                        warn!(?other, "model picked an unknown category");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "category suggestion unavailable");
                None
            }
        }
    }

    /// Uploads the receipt and extracts a transaction draft from it.
    pub fn extract_receipt(&self, path: &Path, categories: &[&str]) -> Option<ReceiptDraft> {
        let file_url = match self.llm.upload(path) {
            Ok(u) => u,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "receipt upload failed");
                return None;
            }
        };
        debug!(%file_url, "receipt uploaded");
        let schema = json!({
            "type": "object",
            "properties": {
                "description": { "type": "string" },
                "amount": { "type": "number" },
                "category": { "type": "string", "enum": categories },
                "date": { "type": "string", "format": "date" }
            }
        });
        let output = match self.llm.extract(&file_url, &schema) {
            Ok(x) => x.into_output(),
            Err(e) => {
                warn!(error = %e, "receipt extraction failed");
                None
            }
        }?;
        match serde_json::from_value::<ReceiptDraft>(output) {
            Ok(mut draft) => {
                draft.receipt_url = file_url;
                if let Some(c) = &draft.category {
                    if !categories.contains(&c.as_str()) {
                        draft.category = None;
                    }
                }
                Some(draft)
            }
            Err(e) => {
                warn!(error = %e, "receipt extraction returned unexpected fields");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Extraction;
    use anyhow::{Result, bail};
    use std::cell::RefCell;

    /// Replies from a queue and records every prompt.
    struct Scripted {
        replies: RefCell<Vec<Result<Value>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Value>>) -> Scripted {
            Scripted {
                replies: RefCell::new(replies),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl LlmClient for Scripted {
        fn invoke(&self, prompt: &str, _schema: Option<&Value>) -> Result<Value> {
            self.prompts.borrow_mut().push(prompt.to_string());
            let mut r = self.replies.borrow_mut();
            if r.is_empty() {
                bail!("no scripted reply");
            }
            r.remove(0)
        }

        fn upload(&self, _path: &Path) -> Result<String> {
            Ok("https://files.test/r.png".into())
        }

        fn extract(&self, _file_url: &str, _schema: &Value) -> Result<Extraction> {
            Ok(serde_json::from_value(json!({
                "status": "success",
                "output": {"description": "Corner Cafe", "amount": 12.5, "category": "food", "date": "2025-08-09"}
            }))?)
        }
    }

    #[test]
    fn insight_falls_back_on_error() {
        let llm = Scripted::new(vec![Err(anyhow::anyhow!("boom"))]);
        assert_eq!(Advisor::new(&llm, "EUR").dashboard_insight(&[]), INSIGHT_FALLBACK);
        assert!(llm.prompts.borrow()[0].contains("'EUR'"));
    }

    #[test]
    fn suggestions_keep_at_most_two() {
        let reply = json!("```json\n{\"suggestions\":[{\"category\":\"food\",\"reason\":\"a\"},{\"category\":\"fun\",\"reason\":\"b\"},{\"category\":\"x\",\"reason\":\"c\"}]}\n```");
        let llm = Scripted::new(vec![Ok(reply)]);
        let got = Advisor::new(&llm, "USD")
            .budget_suggestions(&[("food".into(), Decimal::new(120, 0))]);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].category, "food");
    }

    #[test]
    fn suggestions_empty_on_garbage() {
        let llm = Scripted::new(vec![Ok(json!("not json at all"))]);
        let got = Advisor::new(&llm, "USD")
            .budget_suggestions(&[("food".into(), Decimal::new(120, 0))]);
        assert!(got.is_empty());
    }

    #[test]
    fn chat_prompt_carries_context_and_history() {
        let llm = Scripted::new(vec![Ok(json!("Spend less on coffee."))]);
        let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        let tx = Transaction::new(
            "Coffee",
            Decimal::new(450, 2),
            TxType::Expense,
            "food",
            NaiveDate::from_ymd_opt(2025, 8, 10).unwrap(),
        );
        let old = Transaction::new(
            "Rent",
            Decimal::new(1000, 0),
            TxType::Expense,
            "bills",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        let ctx = FinancialContext::build(&[tx, old], &[], today);
        assert_eq!(ctx.summary.total_transactions, 2);
        assert_eq!(ctx.summary.monthly_expenses, Decimal::new(450, 2));
        let history = vec![Turn {
            speaker: Speaker::User,
            text: "hello".into(),
        }];
        let a = Advisor::new(&llm, "GBP");
        assert_eq!(a.chat("How am I doing?", &ctx, &history), "Spend less on coffee.");
        let p = &llm.prompts.borrow()[0];
        assert!(p.contains("The user asked: \"How am I doing?\""));
        assert!(p.contains("User: hello"));
        assert!(p.contains("'GBP'"));
    }

    #[test]
    fn receipt_draft_prefills_transaction() {
        let llm = Scripted::new(vec![]);
        let draft = Advisor::new(&llm, "USD")
            .extract_receipt(Path::new("r.png"), &["food", "other"])
            .unwrap();
        let mut t = Transaction::new(
            "",
            Decimal::ZERO,
            TxType::Expense,
            "other",
            NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
        );
        draft.apply(&mut t);
        assert_eq!(t.description, "Corner Cafe");
        assert_eq!(t.amount, Decimal::new(125, 1));
        assert_eq!(t.category, "food");
        assert!(t.ai_categorized);
        assert_eq!(t.receipt_url.as_deref(), Some("https://files.test/r.png"));
    }

    #[test]
    fn category_must_be_known() {
        let llm = Scripted::new(vec![Ok(json!({"category": "Food"})), Ok(json!({"category": "yachts"}))]);
        let a = Advisor::new(&llm, "USD");
        assert_eq!(a.suggest_category("Lunch", &["food", "other"]).as_deref(), Some("food"));
        assert_eq!(a.suggest_category("Boat", &["food", "other"]), None);
    }
}
