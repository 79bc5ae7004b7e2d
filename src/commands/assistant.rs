// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `ask` and `chat`: the FinMate assistant.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use super::Session;
use crate::advisor::{FinancialContext, Speaker, Turn};
use crate::models::{Budget, Transaction};
use crate::store::{EntityStore, Sort};

pub fn context<S: EntityStore>(s: &Session<S>) -> Result<FinancialContext> {
    let txs: Vec<Transaction> = s.store.list(Some(&Sort::desc("date")), None)?;
    let budgets: Vec<Budget> = s.store.list(None, None)?;
    Ok(FinancialContext::build(&txs, &budgets, s.today))
}

pub fn ask<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    let question = m
        .get_many::<String>("question")
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    let ctx = context(s)?;
    println!("{}", s.advisor().chat(&question, &ctx, &[]));
    Ok(())
}

/// Runs one conversation over `input`, writing replies to `out`. The
/// transcript lives only as long as the session.
pub fn converse<S: EntityStore, R: BufRead, W: Write>(
    s: &Session<S>,
    input: R,
    mut out: W,
) -> Result<Vec<Turn>> {
    let ctx = context(s)?;
    let advisor = s.advisor();
    let mut history: Vec<Turn> = Vec::new();
    write!(out, "you> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let question = line.trim();
        if matches!(question, "exit" | "quit") {
            break;
        }
        if !question.is_empty() {
            let reply = advisor.chat(question, &ctx, &history);
            writeln!(out, "finmate> {}\n", reply)?;
            history.push(Turn {
                speaker: Speaker::User,
                text: question.to_string(),
            });
            history.push(Turn {
                speaker: Speaker::Assistant,
                text: reply,
            });
        }
        write!(out, "you> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(history)
}

pub fn chat<S: EntityStore>(s: &Session<S>) -> Result<()> {
    println!("Hi! I'm FinMate, your AI financial assistant. Ask me anything about your money (type 'exit' to leave).");
    let stdin = io::stdin();
    converse(s, stdin.lock(), io::stdout())?;
    Ok(())
}
