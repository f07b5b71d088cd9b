use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::io::Write;

use crate::board::{next_stage, previous_stage, ConsoleNotifier, NotificationSink, PipelineBoard};
use crate::cli::error::{user_error, validate_candidate_id, validate_non_empty, validate_score};
use crate::cli::output::{
    format_board, format_candidate_list, format_candidate_summary, format_stage_list,
    format_status, is_tty,
};
use crate::db::DbConnection;
use crate::models::{default_stages, Candidate, APPLIED_KEY};
use crate::registry::{
    MoveDirection, SaveOutcome, SqliteConfigStore, StageEditError, StageEditor, StageRegistry,
};
use crate::repo::CandidateRepo;

#[derive(Parser)]
#[command(name = "ripl")]
#[command(about = "Recruiting Pipeline Ledger - track candidates through a configurable hiring pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new candidate (lands in the Applied stage)
    Add {
        /// Candidate name
        #[arg(required = true)]
        name: Vec<String>,
        /// Screening score (0-100)
        #[arg(long, default_value_t = 0)]
        score: i64,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
        /// Recruiter notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List candidates
    List {
        /// Only candidates in this stage (applies the stage's column ordering)
        #[arg(long)]
        stage: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show detailed candidate summary
    Show {
        /// Candidate ID
        id: String,
    },
    /// Show the kanban board grouped by pipeline stage
    Board,
    /// Advance a candidate to the next pipeline stage
    Advance {
        /// Candidate ID
        id: String,
    },
    /// Move a candidate back to the previous pipeline stage
    Back {
        /// Candidate ID
        id: String,
    },
    /// Move a candidate to a specific stage
    Move {
        /// Candidate ID
        id: String,
        /// Target stage key (see 'ripl stages list')
        stage: String,
    },
    /// Reject a candidate (sends an automatic rejection notice)
    Reject {
        /// Candidate ID
        id: String,
        /// Reject without confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Pipeline stage configuration commands
    Stages {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Show dashboard with candidate counts
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// List the configured pipeline stages in order
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Add a new stage (inserted before the Hired stage)
    Add {
        /// Stage label, e.g. "Team Fit"
        #[arg(required = true)]
        label: Vec<String>,
    },
    /// Remove a stage by key
    Remove {
        /// Stage key
        key: String,
        /// Remove without confirmation, even if candidates are in the stage
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Move a stage up or down within the editable range
    Move {
        /// Stage index (see 'ripl stages list')
        index: usize,
        /// Direction: up or down
        direction: String,
    },
    /// Restore the default stage configuration
    Reset {
        /// Reset without confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

pub fn run() -> Result<()> {
    let _ = env_logger::try_init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add { name, score, email, notes } => {
            handle_candidate_add(name, score, email, notes)
        }
        Commands::List { stage, json } => handle_candidate_list(stage, json),
        Commands::Show { id } => handle_candidate_show(id),
        Commands::Board => handle_board(),
        Commands::Advance { id } => handle_advance(id),
        Commands::Back { id } => handle_back(id),
        Commands::Move { id, stage } => handle_move(id, stage),
        Commands::Reject { id, yes } => handle_reject(id, yes),
        Commands::Stages { subcommand } => match subcommand {
            StageCommands::List { json } => handle_stages_list(json),
            StageCommands::Add { label } => handle_stages_add(label),
            StageCommands::Remove { key, yes } => handle_stages_remove(key, yes),
            StageCommands::Move { index, direction } => handle_stages_move(index, direction),
            StageCommands::Reset { yes } => handle_stages_reset(yes),
        },
        Commands::Status { json } => handle_status(json),
    }
}

/// Load the stage registry over the ledger's config table.
fn open_registry(conn: &Connection) -> StageRegistry<SqliteConfigStore<'_>> {
    let mut registry = StageRegistry::load(SqliteConfigStore::new(conn));
    registry.subscribe(|| log::debug!("stage configuration updated"));
    registry
}

/// Ask the user a yes/no question on stdin. Anything but y/yes is a no.
fn confirm(prompt: &str) -> bool {
    print!("{} (y/N): ", prompt);
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn parse_candidate_id(id_str: &str) -> i64 {
    match validate_candidate_id(id_str) {
        Ok(id) => id,
        Err(e) => user_error(&e),
    }
}

fn require_candidate(conn: &Connection, id: i64) -> Candidate {
    match CandidateRepo::get_by_id(conn, id) {
        Ok(Some(candidate)) => candidate,
        Ok(None) => user_error(&format!("Candidate {} not found", id)),
        Err(e) => user_error(&format!("Failed to load candidate {}: {}", id, e)),
    }
}

fn handle_candidate_add(
    name_parts: Vec<String>,
    score: i64,
    email: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let name = name_parts.join(" ");
    if let Err(e) = validate_non_empty(&name, "Candidate name") {
        user_error(&e);
    }
    let score = match validate_score(score) {
        Ok(s) => s,
        Err(e) => user_error(&e),
    };

    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let candidate =
        CandidateRepo::create(&conn, name.trim(), email.as_deref(), score, notes.as_deref())?;

    println!(
        "Created candidate {}: {} (stage: {})",
        candidate.id.unwrap_or(0),
        candidate.name,
        APPLIED_KEY
    );
    Ok(())
}

fn handle_candidate_list(stage: Option<String>, json: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);
    let candidates = CandidateRepo::list_all(&conn)?;

    let selected: Vec<&Candidate> = match &stage {
        Some(key) => crate::board::candidates_in_stage(key, &candidates),
        None => candidates.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
    } else if selected.is_empty() {
        println!("No candidates.");
    } else {
        print!("{}", format_candidate_list(&selected, registry.stages(), is_tty()));
    }
    Ok(())
}

fn handle_candidate_show(id: String) -> Result<()> {
    let id = parse_candidate_id(&id);
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);
    let candidate = require_candidate(&conn, id);
    print!("{}", format_candidate_summary(&candidate, registry.stages()));
    Ok(())
}

fn handle_board() -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);
    let candidates = CandidateRepo::list_all(&conn)?;
    print!("{}", format_board(registry.stages(), &candidates, is_tty()));
    Ok(())
}

fn handle_advance(id: String) -> Result<()> {
    let id = parse_candidate_id(&id);
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);
    let candidate = require_candidate(&conn, id);

    let target = match next_stage(&candidate.stage, registry.stages()) {
        Some(stage) => stage.key.clone(),
        None => {
            let label = registry.label_for(&candidate.stage).unwrap_or(&candidate.stage);
            user_error(&format!(
                "{} cannot be advanced from '{}'. Hired and Rejected are reached with 'ripl move {} hired' or 'ripl reject {}'.",
                candidate.name, label, id, id
            ))
        }
    };

    let mut sink = ConsoleNotifier;
    let mut board = PipelineBoard::new(&conn, &mut sink);
    board.move_candidate(registry.stages(), id, &target)?;
    Ok(())
}

fn handle_back(id: String) -> Result<()> {
    let id = parse_candidate_id(&id);
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);
    let candidate = require_candidate(&conn, id);

    let target = match previous_stage(&candidate.stage, registry.stages()) {
        Some(stage) => stage.key.clone(),
        None => user_error(&format!(
            "{} is already at the start of the pipeline.",
            candidate.name
        )),
    };

    let mut sink = ConsoleNotifier;
    let mut board = PipelineBoard::new(&conn, &mut sink);
    board.move_candidate(registry.stages(), id, &target)?;
    Ok(())
}

fn handle_move(id: String, stage: String) -> Result<()> {
    let id = parse_candidate_id(&id);
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);
    require_candidate(&conn, id);

    if !registry.stages().iter().any(|s| s.key == stage) {
        let known: Vec<&str> = registry.stages().iter().map(|s| s.key.as_str()).collect();
        user_error(&format!(
            "Unknown stage '{}'. Known stages: {}",
            stage,
            known.join(", ")
        ));
    }

    let mut sink = ConsoleNotifier;
    let mut board = PipelineBoard::new(&conn, &mut sink);
    board.move_candidate(registry.stages(), id, &stage)?;
    Ok(())
}

fn handle_reject(id: String, yes: bool) -> Result<()> {
    let id = parse_candidate_id(&id);
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);
    let candidate = require_candidate(&conn, id);

    if !yes
        && !confirm(&format!(
            "Reject {}? An automatic rejection email will be sent.",
            candidate.name
        ))
    {
        println!("Cancelled.");
        return Ok(());
    }

    let mut sink = ConsoleNotifier;
    let mut board = PipelineBoard::new(&conn, &mut sink);
    board.reject_candidate(registry.stages(), id)?;
    Ok(())
}

fn handle_stages_list(json: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let registry = open_registry(&conn);

    if json {
        println!("{}", serde_json::to_string_pretty(registry.stages())?);
    } else {
        print!("{}", format_stage_list(registry.stages(), is_tty()));
    }
    Ok(())
}

fn handle_stages_add(label_parts: Vec<String>) -> Result<()> {
    let label = label_parts.join(" ");
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let mut registry = open_registry(&conn);

    let mut editor = StageEditor::open(&registry);
    match editor.add_stage(&label) {
        Ok(()) => {}
        Err(StageEditError::DuplicateName(name)) => {
            // Surfaced as a notification, not an error: nothing was changed
            let mut sink = ConsoleNotifier;
            sink.notify(
                "Duplicate stage name",
                Some(&format!("A stage named '{}' already exists.", name)),
            );
            return Ok(());
        }
        Err(e) => user_error(&e.to_string()),
    }

    // Adding never removes a stage, so the save commits immediately
    let counts = CandidateRepo::counts_by_stage(&conn)?;
    editor.save(&mut registry, &counts);

    println!("Added stage '{}'.", label.trim());
    print!("{}", format_stage_list(registry.stages(), is_tty()));
    Ok(())
}

fn handle_stages_remove(key: String, yes: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let mut registry = open_registry(&conn);

    let mut editor = StageEditor::open(&registry);
    if let Err(e) = editor.remove_stage(&key) {
        user_error(&e.to_string());
    }

    let counts = CandidateRepo::counts_by_stage(&conn)?;
    let removed = match editor.save(&mut registry, &counts) {
        SaveOutcome::Committed { removed } => removed,
        SaveOutcome::NeedsConfirmation { removed, affected } => {
            let accepted = yes
                || confirm(&format!(
                    "Removing {} stage(s) affects {} candidate(s); they will be moved back to Applied. Continue?",
                    removed.len(),
                    affected
                ));
            if !accepted {
                editor.cancel_confirmation();
                println!("Cancelled.");
                return Ok(());
            }
            match editor.confirm_save(&mut registry) {
                Some(removed) => removed,
                None => return Ok(()),
            }
        }
    };

    let moved = CandidateRepo::reassign_stages(&conn, &removed, APPLIED_KEY)?;
    println!("Removed stage '{}'.", key);
    if moved > 0 {
        println!("Moved {} candidate(s) back to Applied.", moved);
    }
    Ok(())
}

fn handle_stages_move(index: usize, direction: String) -> Result<()> {
    let direction = match direction.to_lowercase().as_str() {
        "up" => MoveDirection::Up,
        "down" => MoveDirection::Down,
        other => user_error(&format!("Invalid direction '{}'. Use 'up' or 'down'.", other)),
    };

    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let mut registry = open_registry(&conn);

    let mut editor = StageEditor::open(&registry);
    if let Err(e) = editor.move_stage(index, direction) {
        user_error(&e.to_string());
    }

    // Reordering never removes a stage, so the save commits immediately
    let counts = CandidateRepo::counts_by_stage(&conn)?;
    editor.save(&mut registry, &counts);
    print!("{}", format_stage_list(registry.stages(), is_tty()));
    Ok(())
}

fn handle_stages_reset(yes: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let mut registry = open_registry(&conn);

    let mut editor = StageEditor::with_draft(default_stages());
    let counts = CandidateRepo::counts_by_stage(&conn)?;
    let removed = match editor.save(&mut registry, &counts) {
        SaveOutcome::Committed { removed } => removed,
        SaveOutcome::NeedsConfirmation { removed, affected } => {
            let accepted = yes
                || confirm(&format!(
                    "Resetting removes {} custom stage(s) holding {} candidate(s); they will be moved back to Applied. Continue?",
                    removed.len(),
                    affected
                ));
            if !accepted {
                editor.cancel_confirmation();
                println!("Cancelled.");
                return Ok(());
            }
            match editor.confirm_save(&mut registry) {
                Some(removed) => removed,
                None => return Ok(()),
            }
        }
    };

    let moved = CandidateRepo::reassign_stages(&conn, &removed, APPLIED_KEY)?;
    println!("Stage configuration reset to defaults.");
    if moved > 0 {
        println!("Moved {} candidate(s) back to Applied.", moved);
    }
    Ok(())
}

fn handle_status(json: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let counts = CandidateRepo::counts_by_stage(&conn)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        print!("{}", format_status(&counts, is_tty()));
    }
    Ok(())
}
