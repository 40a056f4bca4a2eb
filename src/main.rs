mod cli;
mod db;
mod digest;
mod error;
mod fmt;
mod funnel;
mod models;
mod okr;
mod parser;
#[cfg(feature = "scorecard")]
mod scorecard;
mod settings;
mod spend;
mod verifier;

use clap::Parser;

#[cfg(feature = "scorecard")]
use cli::ScorecardCommands;
use cli::{
    AdsCommands, Cli, Commands, DigestCommands, FunnelCommands, OkrCommands, PaymentCommands,
    ReportCommands,
};
use verifier::PaymentDraft;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, company } => cli::init::run(data_dir, company),
        Commands::Report { command } => match command {
            ReportCommands::Parse { file, week, json, save } => {
                cli::report::parse(file, week, json, save)
            }
            ReportCommands::List { limit } => cli::report::list(limit),
            ReportCommands::Show { week, json } => cli::report::show(week, json),
        },
        Commands::Payments { command } => match command {
            PaymentCommands::Add {
                requested_by,
                amount,
                payment_type,
                bank_name,
                routing_number,
                account_number,
                account_holder,
                payment_link,
                invoice_email,
                description,
                due_date,
            } => cli::payments::add(PaymentDraft {
                requested_by,
                amount,
                payment_type,
                bank_name,
                routing_number,
                account_number,
                account_holder,
                payment_link,
                invoice_email,
                description,
                due_date,
            }),
            PaymentCommands::List { status } => cli::payments::list(status),
            PaymentCommands::Approve { id } => cli::payments::approve(id),
            PaymentCommands::Reject { id } => cli::payments::reject(id),
            PaymentCommands::Complete { id, reference, amount } => {
                cli::payments::complete(id, &reference, &amount)
            }
        },
        Commands::Ads { command } => match command {
            AdsCommands::Add { role, title, location, daily_spend, start, notes } => {
                cli::ads::add(&role, &title, &location, &daily_spend, start, notes.as_deref())
            }
            AdsCommands::List { active } => cli::ads::list(active),
            AdsCommands::Applicants { updates } => cli::ads::applicants(&updates),
            AdsCommands::Spend { id, amount } => cli::ads::set_spend(id, &amount),
            AdsCommands::End { id, end_date } => cli::ads::end(id, end_date.as_deref()),
            AdsCommands::Summary => cli::ads::summary(),
        },
        Commands::Funnel { command } => match command {
            FunnelCommands::Import { file } => cli::funnel::import(&file),
            FunnelCommands::Summary => cli::funnel::summary(),
        },
        Commands::Okr { command } => match command {
            OkrCommands::List => cli::okr::list(),
            OkrCommands::Record { slug, value, confidence, notes, source, date } => {
                cli::okr::record(&slug, value, confidence, notes.as_deref(), &source, date)
            }
            OkrCommands::Confidence { slug, confidence, notes } => {
                cli::okr::confidence(&slug, confidence, notes.as_deref())
            }
            OkrCommands::Status => cli::okr::status(),
        },
        Commands::Digest { command } => match command {
            DigestCommands::Set { pillar, state, rating, week } => {
                cli::digest::set(&pillar, &state, rating, week)
            }
            DigestCommands::Show { week } => cli::digest::show(week),
        },
        #[cfg(feature = "scorecard")]
        Commands::Scorecard { command } => match command {
            ScorecardCommands::Import { file } => cli::scorecard::import(&file),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Completions { shell } => {
            cli::print_completions(shell);
            Ok(())
        }
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
