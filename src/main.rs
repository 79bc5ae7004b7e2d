// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Local;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use finmate::commands::{self, Session};
use finmate::config::{Config, config_path};
use finmate::store::{Backend, EntityStore};
use finmate::{cli, llm};

fn init_logging(verbose: bool) {
    let default = if verbose { "finmate=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    init_logging(matches.get_flag("verbose"));

    let cfg = Config::load()?;
    let store = Backend::from_config(&cfg)?;
    let llm = llm::from_config(&cfg)?;
    let profile = store.me()?;
    debug!(backend = %store.describe(), currency = %profile.currency, "session ready");
    let s = Session::new(&store, profile, &cfg, llm.as_ref(), Local::now().date_naive());

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = config_path()?;
            if !path.exists() {
                cfg.save(&path)?;
            }
            println!("Using {}", store.describe());
            println!("Config file: {}", path.display());
            match &cfg.llm_url {
                Some(url) => println!("Assistant: {}", url),
                None => println!("Assistant: not configured (set FINMATE_LLM_URL)"),
            }
        }
        Some(("tx", sub)) => commands::transactions::handle(&s, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&s, sub)?,
        Some(("split", sub)) => commands::splits::handle(&s, sub)?,
        Some(("report", sub)) => commands::reports::handle(&s, sub)?,
        Some(("business", sub)) => commands::business::handle(&s, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&s, sub)?,
        Some(("achievements", sub)) => commands::achievements::handle(&s, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&s, sub)?,
        Some(("ask", sub)) => commands::assistant::ask(&s, sub)?,
        Some(("chat", _)) => commands::assistant::chat(&s)?,
        Some(("profile", sub)) => commands::profile::handle(&s, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&s, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
