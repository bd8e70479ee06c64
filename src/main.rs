mod aggregate;
mod cli;
mod db;
mod error;
mod fmt;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod receipt;
mod reports;
mod settings;
mod store;
mod tui;

use std::sync::Once;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands, ExportCommands, ReceiptCommands};

static TRACING_INIT: Once = Once::new();

/// Log to stderr so command output stays clean; `RUST_LOG` overrides the
/// default of warnings only.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("penny=warn"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None | Some(Commands::Dashboard) => cli::dashboard::run(),
        Some(Commands::Init { data_dir, name }) => cli::init::run(data_dir, name),
        Some(Commands::Add {
            amount,
            category,
            date,
            description,
            payment,
            receipt,
        }) => cli::add::run(
            &amount,
            &category,
            date.as_deref(),
            description.as_deref(),
            &payment,
            receipt.as_deref(),
        ),
        Some(Commands::Delete { id, yes }) => cli::delete::run(id, yes),
        Some(Commands::History { filters, sort }) => cli::history::run(&filters, &sort),
        Some(Commands::Months) => cli::history::months(),
        Some(Commands::Summary) => cli::summary::run(),
        Some(Commands::Report { filters }) => cli::report::run(&filters),
        Some(Commands::Export { command }) => match command {
            #[cfg(feature = "pdf")]
            ExportCommands::Pdf { filters, output } => {
                cli::export::pdf(&filters, output).map(|_| ())
            }
            ExportCommands::Csv { filters, output } => {
                cli::export::csv(&filters, output).map(|_| ())
            }
        },
        Some(Commands::Receipt { command }) => match command {
            ReceiptCommands::Show { id } => cli::receipt::show(id),
            ReceiptCommands::Save { id, output } => cli::receipt::save(id, output),
        },
        Some(Commands::Backup { output }) => cli::backup::run(output),
        Some(Commands::Status) => cli::status::run(),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "penny", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
