// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

/// `--period`, or an inclusive `--from`/`--to` pair in its place.
fn range_args(cmd: Command, default_period: &'static str) -> Command {
    cmd.arg(
        Arg::new("period")
            .long("period")
            .value_parser(["this-week", "this-month", "last-month", "year-to-date"])
            .help(format!("Default {}", default_period)),
    )
    .arg(
        Arg::new("from")
            .long("from")
            .requires("to")
            .conflicts_with("period")
            .help("YYYY-MM-DD, inclusive"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .requires("from")
            .conflicts_with("period")
            .help("YYYY-MM-DD, inclusive"),
    )
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("description").long("desc").required(required))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(
            Arg::new("type")
                .long("type")
                .value_parser(["income", "expense"]),
        )
        .arg(Arg::new("category").long("category"))
        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
        .arg(
            Arg::new("dashboard")
                .long("dashboard")
                .value_parser(["personal", "business"]),
        )
        .arg(Arg::new("party").long("party").help("Customer or vendor"))
        .arg(Arg::new("invoice").long("invoice"))
        .arg(
            Arg::new("tax_deductible")
                .long("tax-deductible")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recurring")
                .long("recurring")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tag")
                .long("tag")
                .action(ArgAction::Append)
                .help("Repeatable"),
        )
}

pub fn build_cli() -> Command {
    Command::new("finmate")
        .about("Personal and business finance tracker with an AI assistant")
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging to stderr"),
        )
        .subcommand(Command::new("init").about("Create the local store and show configuration"))
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    tx_fields(Command::new("add"), true).arg(
                        Arg::new("ai_categorize")
                            .long("ai-categorize")
                            .action(ArgAction::SetTrue)
                            .help("Ask the assistant for a category when none is given"),
                    ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("search").long("search"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("range")
                                .long("range")
                                .default_value("all")
                                .value_parser(["all", "today", "week", "month"]),
                        )
                        .arg(
                            Arg::new("dashboard")
                                .long("dashboard")
                                .default_value("personal")
                                .value_parser(["personal", "business"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .default_value("100")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    tx_fields(Command::new("edit").arg(Arg::new("id").required(true)), false)
                        .arg(
                            Arg::new("no_tax_deductible")
                                .long("no-tax-deductible")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("tax_deductible"),
                        )
                        .arg(
                            Arg::new("no_recurring")
                                .long("no-recurring")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("recurring"),
                        )
                        .arg(
                            Arg::new("clear_tags")
                                .long("clear-tags")
                                .action(ArgAction::SetTrue)
                                .help("Drop existing tags before adding any --tag"),
                        ),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true)))
                .subcommand(
                    Command::new("receipt")
                        .about("Create a transaction from a receipt image")
                        .arg(Arg::new("path").required(true))
                        .arg(
                            Arg::new("dashboard")
                                .long("dashboard")
                                .default_value("personal")
                                .value_parser(["personal", "business"]),
                        )
                        .arg(
                            Arg::new("dry_run")
                                .long("dry-run")
                                .action(ArgAction::SetTrue)
                                .help("Show the extracted draft without saving"),
                        ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly category budgets")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("limit").long("limit").required(true))
                        .arg(Arg::new("month").long("month").help("YYYY-MM, default current")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(Arg::new("month").long("month")),
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true)))
                .subcommand(Command::new("suggest").about("AI suggestions for unbudgeted spending")),
        )
        .subcommand(
            Command::new("split")
                .about("Split bills with friends")
                .subcommand(
                    Command::new("create")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").default_value("food"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("notes").long("notes"))
                        .arg(
                            Arg::new("with")
                                .long("with")
                                .required(true)
                                .action(ArgAction::Append)
                                .help("email or email:Name, repeatable"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("status")
                            .long("status")
                            .default_value("active")
                            .value_parser(["active", "settled", "all"]),
                    ),
                ))
                .subcommand(
                    Command::new("pay")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("email").long("email").help("Payer, default you"))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(json_flags(Command::new("stats")))
                .subcommand(Command::new("share").arg(Arg::new("id").required(true)))
                .subcommand(
                    Command::new("remind")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("email").long("email").help("Only this participant")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Period reports")
                .subcommand(json_flags(range_args(Command::new("summary"), "this-month")))
                .subcommand(json_flags(range_args(Command::new("daily"), "this-month")))
                .subcommand(range_args(Command::new("ai"), "this-month")),
        )
        .subcommand(
            Command::new("business")
                .about("Business dashboard and statements")
                .subcommand(json_flags(
                    Command::new("dashboard").arg(
                        Arg::new("no_ai")
                            .long("no-ai")
                            .action(ArgAction::SetTrue),
                    ),
                ))
                .subcommand(json_flags(range_args(Command::new("pnl"), "year-to-date")))
                .subcommand(json_flags(range_args(Command::new("cashflow"), "year-to-date")))
                .subcommand(json_flags(
                    Command::new("parties").arg(
                        Arg::new("limit")
                            .long("limit")
                            .default_value("5")
                            .value_parser(clap::value_parser!(usize)),
                    ),
                )),
        )
        .subcommand(json_flags(
            Command::new("dashboard")
                .about("This month at a glance")
                .arg(
                    Arg::new("no_ai")
                        .long("no-ai")
                        .action(ArgAction::SetTrue),
                ),
        ))
        .subcommand(
            Command::new("achievements")
                .about("Badges and points")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("check").about("Record newly unlocked achievements")),
        )
        .subcommand(
            Command::new("goal")
                .about("Financial goals")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(Arg::new("saved").long("saved"))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("priority").long("priority")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("title").long("title"))
                        .arg(Arg::new("target").long("target"))
                        .arg(Arg::new("saved").long("saved"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("priority").long("priority")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true)))
                .subcommand(
                    Command::new("contribute")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                ),
        )
        .subcommand(
            Command::new("ask")
                .about("Ask the assistant one question")
                .arg(Arg::new("question").required(true).num_args(1..)),
        )
        .subcommand(Command::new("chat").about("Interactive assistant session"))
        .subcommand(
            Command::new("profile")
                .about("Profile and preferences")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("currency").long("currency"))
                        .arg(
                            Arg::new("theme")
                                .long("theme")
                                .value_parser(["dark", "light", "system"]),
                        )
                        .arg(
                            Arg::new("email_notifications")
                                .long("email-notifications")
                                .value_parser(clap::value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("push_notifications")
                                .long("push-notifications")
                                .value_parser(clap::value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("frequency")
                                .long("frequency")
                                .value_parser(["realtime", "daily", "weekly"]),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .value_parser(["csv", "json"]),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
}
