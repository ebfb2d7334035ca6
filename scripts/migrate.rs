//! Run with: cargo run --bin migrate [-- --yes | verify]

use audiodeck::config;
use audiodeck::services::migration::{
    MigrationConfig, MigrationOutcome, Migrator, DEST_URI_VAR,
};
use audiodeck::store::mongo::MongoConnector;
use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    config::logging::init(false);

    let args: Vec<String> = env::args().skip(1).collect();
    let verify_only = args.iter().any(|a| a == "verify");
    let assume_yes = args.iter().any(|a| a == "--yes" || a == "-y");

    println!("MongoDB Migration Tool");
    println!("{}", "=".repeat(50));

    let mut migrator = Migrator::new(MongoConnector, MigrationConfig::from_env());

    if verify_only {
        return match migrator.verify().await {
            Ok(report) => {
                println!("Destination database contains {} records:", report.count());
                for record in &report.records {
                    println!("  - {}: {}", record.language, record.preview);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("Verification failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    println!("This will copy the source audio records into the destination database.");
    println!("Make sure you have set the {} environment variable.", DEST_URI_VAR);
    println!();

    let confirmed = assume_yes || confirm("Continue with migration? (y/N): ");

    match migrator.migrate(confirmed).await {
        Ok(MigrationOutcome::Cancelled) => {
            println!("Migration cancelled.");
            ExitCode::SUCCESS
        }
        Ok(MigrationOutcome::Completed(report)) => {
            if report.is_noop() {
                println!("No data found in source database, nothing to migrate");
                return ExitCode::SUCCESS;
            }
            for record in &report.records {
                println!("{} {} record", capitalize(record.outcome.as_str()), record.language);
            }
            println!("Migration completed successfully!");
            println!("Migrated {} records to destination database", report.migrated());
            if let Some(count) = report.destination_count {
                println!("Destination database now contains {} records", count);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Migration failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
