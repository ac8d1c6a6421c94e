mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::{ArgGroup, Args, Parser, Subcommand};
use dashboard_engine::{generate_summary, write_summary_json};
use models::{AppState, Goal, Settings};
use workbook_export::{
    PersonalExport, build_personal_workbook, build_template_workbook, resolve_output_path,
    save_workbook,
};
use workbook_ingest::{IngestOutcome, Ingestor, normalize_str};

const TEMPLATE_FILE_NAME: &str = "plantilla_finanzas.xlsx";

/// Personal finance tracker working on a spreadsheet workbook.
#[derive(Debug, Parser)]
#[command(name = "finance", author, version, about = "Track income, expenses and savings goals from a workbook", long_about = None)]
struct Cli {
    /// Path to settings.json. Without it ./settings.json is used if present, else built-in defaults
    #[arg(short = 's', long = "settings", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a workbook and report what was loaded
    Ingest {
        file: PathBuf,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read a workbook and print totals, trends and goal progress
    Summary {
        file: PathBuf,
        #[arg(long)]
        json: bool,
        /// Also write the summary as JSON to this path
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },
    /// Write the starter template workbook
    Template { out: PathBuf },
    /// Write the personal workbook: every loaded row moves to Historico
    Export {
        file: PathBuf,
        out: PathBuf,
        /// Leave Transacciones without the sample row
        #[arg(long)]
        no_example: bool,
    },
    /// Manage savings goals
    #[command(subcommand)]
    Goals(GoalsCommand),
    /// Drop transactions and/or goals, then write the personal workbook
    Clear(ClearArgs),
}

#[derive(Debug, Subcommand)]
enum GoalsCommand {
    List {
        file: PathBuf,
    },
    Add {
        file: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        /// DD/MM/YYYY
        #[arg(long)]
        deadline: Option<String>,
        #[arg(short = 'o', long = "out")]
        out: PathBuf,
    },
    Remove {
        file: PathBuf,
        /// Position as shown by `goals list` (starting at 1)
        #[arg(long)]
        index: usize,
        #[arg(short = 'o', long = "out")]
        out: PathBuf,
    },
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("what").required(true).multiple(true).args(["transactions", "goals"])))]
struct ClearArgs {
    file: PathBuf,
    #[arg(long)]
    transactions: bool,
    #[arg(long)]
    goals: bool,
    #[arg(short = 'o', long = "out")]
    out: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finance=info,workbook_ingest=info".into()),
        )
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = settings_loader::load_settings_or_default(cli.settings.as_ref())?;

    match cli.command {
        Command::Ingest { file, json } => {
            let outcome = ingest(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                report::print_ingestion(&outcome, &settings);
            }
        }
        Command::Summary { file, json, out } => {
            let state = load_state(&file)?;
            let summary = generate_summary(&state, &settings, Local::now().date_naive());
            if let Some(out_path) = out {
                write_summary_json(&summary, &out_path).context("write summary json")?;
                tracing::info!(path = %out_path.display(), "summary written");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                report::print_summary(&summary);
            }
        }
        Command::Template { out } => {
            let path = if out.is_dir() {
                out.join(TEMPLATE_FILE_NAME)
            } else {
                out
            };
            let mut workbook = build_template_workbook()?;
            save_workbook(&mut workbook, &path)?;
            println!("Template written to {}", path.display());
        }
        Command::Export {
            file,
            out,
            no_example,
        } => {
            let state = load_state(&file)?;
            let mut options = PersonalExport::new(Local::now().naive_local());
            if no_example {
                options = options.without_example();
            }
            write_personal(&state, &out, &settings, options)?;
        }
        Command::Goals(cmd) => run_goals(cmd, &settings)?,
        Command::Clear(args) => run_clear(args, &settings)?,
    }

    Ok(())
}

fn run_clear(args: ClearArgs, settings: &Settings) -> Result<()> {
    let (mut state, historical) = load_session(&args.file)?;
    if args.transactions {
        state.clear_transactions();
    }
    if args.goals {
        state.clear_goals();
    }
    write_personal(&state, &args.out, settings, rewrite_export(historical))
}

fn run_goals(cmd: GoalsCommand, settings: &Settings) -> Result<()> {
    match cmd {
        GoalsCommand::List { file } => {
            let state = load_state(&file)?;
            let summary = generate_summary(&state, settings, Local::now().date_naive());
            report::print_goals(&summary);
        }
        GoalsCommand::Add {
            file,
            name,
            amount,
            deadline,
            out,
        } => {
            let (mut state, historical) = load_session(&file)?;
            let deadline = deadline
                .as_deref()
                .map(|raw| {
                    normalize_str(raw).ok_or_else(|| anyhow!("invalid deadline '{}', expected DD/MM/YYYY", raw))
                })
                .transpose()?;
            let goal = Goal::new(name, amount, deadline, Local::now().date_naive())?;
            println!("Added goal '{}'", goal.name);
            state.add_goal(goal);
            write_personal(&state, &out, settings, rewrite_export(historical))?;
        }
        GoalsCommand::Remove { file, index, out } => {
            let (mut state, historical) = load_session(&file)?;
            if index == 0 {
                bail!("goal positions start at 1");
            }
            let removed = state.remove_goal(index - 1)?;
            println!("Removed goal '{}'", removed.name);
            write_personal(&state, &out, settings, rewrite_export(historical))?;
        }
    }
    Ok(())
}

fn ingest(file: &Path) -> Result<IngestOutcome> {
    let outcome = Ingestor::default().ingest_path(file)?;
    if outcome.is_empty() {
        tracing::warn!(file = %file.display(), "no transactions or goals found");
    }
    Ok(outcome)
}

fn load_state(file: &Path) -> Result<AppState> {
    Ok(ingest(file)?.apply_to(AppState::new()))
}

/// State plus the number of ledger entries that came from history, so a
/// rewrite can put pending rows back where they were.
fn load_session(file: &Path) -> Result<(AppState, usize)> {
    let outcome = ingest(file)?;
    let historical = outcome.diagnostics.historical_count;
    Ok((outcome.apply_to(AppState::new()), historical))
}

/// Goal edits and clears rewrite the workbook without rolling it over.
fn rewrite_export(historical: usize) -> PersonalExport {
    PersonalExport::new(Local::now().naive_local()).keep_pending(historical)
}

fn write_personal(
    state: &AppState,
    out: &Path,
    settings: &Settings,
    options: PersonalExport,
) -> Result<()> {
    let path = resolve_output_path(out, &settings.export_file_prefix, options.generated_at);
    let mut workbook = build_personal_workbook(state, options)?;
    save_workbook(&mut workbook, &path)?;
    println!(
        "Personal workbook written to {} ({} transactions, {} goals)",
        path.display(),
        state.ledger.len(),
        state.goals.len()
    );
    Ok(())
}
