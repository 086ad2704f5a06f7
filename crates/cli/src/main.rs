mod render;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use casegrid_engine::{Column, EditorSession, TestCaseTable};
use casegrid_util::{UserPreferences, expand_tilde};
use clap::{Parser, Subcommand};
use tracing::warn;

/// Edit grouped API test-case workbooks (.xlsx or .csv) from the command line.
#[derive(Parser, Debug)]
#[command(name = "casegrid", version, about)]
struct Cli {
    /// Workbook to operate on
    workbook: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty workbook containing only the header row
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print every row
    Show {
        #[arg(long)]
        json: bool,
        /// Print credentials instead of masking them
        #[arg(long)]
        reveal: bool,
    },
    /// Append a blank row to the last test case
    AddStep,
    /// Insert a blank row above ROW
    AddAbove { row: usize },
    /// Insert a blank row below ROW
    AddBelow { row: usize },
    /// Swap ROW with the row above it
    MoveUp { row: usize },
    /// Swap ROW with the row below it
    MoveDown { row: usize },
    /// Delete a single row
    DeleteStep {
        row: usize,
        /// Confirm deleting the first row of a test case
        #[arg(long)]
        yes: bool,
    },
    /// Delete every row of the test case containing ROW
    DeleteCase { row: usize },
    /// Commit VALUE into one cell; COLUMN is a field name, header, or position
    Set { row: usize, column: Column, value: String },
    /// Print the test case containing ROW as JSON
    Group {
        row: usize,
        #[arg(long)]
        reveal: bool,
    },
    /// Suggest an unused test case id derived from INPUT
    SuggestId { input: String },
    /// Report invariant violations; exits non-zero when any are found
    Validate,
    /// Write the workbook to OUTPUT, choosing the format from its extension
    Convert { output: String },
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::AddStep
                | Command::AddAbove { .. }
                | Command::AddBelow { .. }
                | Command::MoveUp { .. }
                | Command::MoveDown { .. }
                | Command::DeleteStep { .. }
                | Command::DeleteCase { .. }
                | Command::Set { .. }
        )
    }
}

fn main() -> Result<()> {
    init_tracing();
    let Cli { workbook, command } = Cli::parse();
    let workbook = expand_tilde(&workbook);
    let preferences = Arc::new(load_preferences());
    let mut session = EditorSession::new().with_preferences(preferences);

    if let Command::Init { force } = command {
        return init_workbook(&mut session, &workbook, force);
    }

    session
        .open(&workbook)
        .with_context(|| format!("failed to open {}", workbook.display()))?;
    run_command(&mut session, &command)?;

    if command.mutates() && session.has_unsaved_changes() {
        session
            .save()
            .with_context(|| format!("failed to save {}", workbook.display()))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_preferences() -> UserPreferences {
    UserPreferences::new().unwrap_or_else(|error| {
        warn!(%error, "preferences unavailable; using defaults");
        UserPreferences::ephemeral()
    })
}

fn init_workbook(session: &mut EditorSession, workbook: &Path, force: bool) -> Result<()> {
    if workbook.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", workbook.display());
    }
    session
        .save_as(workbook)
        .with_context(|| format!("failed to create {}", workbook.display()))?;
    println!("created {}", workbook.display());
    Ok(())
}

fn run_command(session: &mut EditorSession, command: &Command) -> Result<()> {
    match command {
        Command::Init { .. } => anyhow::bail!("init cannot run against an opened workbook"),
        Command::Show { json, reveal } => {
            let table = session.table();
            if *json {
                println!("{}", serde_json::to_string_pretty(&render::rows_json(table, *reveal))?);
            } else {
                print!("{}", render::rows_text(table, *reveal));
            }
        }
        Command::AddStep => session.table_mut().add_step(),
        Command::AddAbove { row } => session.table_mut().add_above(*row)?,
        Command::AddBelow { row } => session.table_mut().add_below(*row)?,
        Command::MoveUp { row } => report_move(session.table_mut().move_up(*row)?, *row, "top"),
        Command::MoveDown { row } => report_move(session.table_mut().move_down(*row)?, *row, "bottom"),
        Command::DeleteStep { row, yes } => {
            let removed = session.table_mut().delete_step(*row, *yes)?;
            println!("deleted row {row}{}", render::id_suffix(&removed));
        }
        Command::DeleteCase { row } => {
            let removed = session.table_mut().delete_test_case(*row)?;
            println!("deleted test case '{}' ({} rows)", removed.id(), removed.len());
        }
        Command::Set { row, column, value } => session.commit_cell(*row, *column, value)?,
        Command::Group { row, reveal } => {
            let mut view = session.select(*row)?;
            if !reveal {
                render::mask_view(&mut view);
            }
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::SuggestId { input } => println!("{}", session.table().suggest_unique_id(input)),
        Command::Validate => validate(session.table())?,
        Command::Convert { output } => {
            let output = expand_tilde(output);
            convert(session, &output)?;
        }
    }
    Ok(())
}

fn report_move(moved: bool, row: usize, edge: &str) {
    if !moved {
        println!("row {row} is already at the {edge}");
    }
}

fn validate(table: &TestCaseTable) -> Result<()> {
    let issues = table.validate();
    if issues.is_empty() {
        println!("ok: {} rows in {} test cases", table.len(), table.cases().len());
        return Ok(());
    }
    for issue in &issues {
        println!("{issue}");
    }
    anyhow::bail!("{} issue(s) found", issues.len())
}

fn convert(session: &mut EditorSession, output: &Path) -> Result<()> {
    session
        .save_as(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("wrote {} rows to {}", session.table().len(), output.display());
    Ok(())
}
