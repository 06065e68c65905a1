//! # CLI Layer
//!
//! This module is **one possible UI client** for shuffler; it is not the application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Uses `std::process::exit` (via `main.rs`)
//! - Handles argument parsing
//! - Decides where log output goes
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Sets up logging and builds `AppContext` around the API
//! - `handle_*()`: Per-command handlers that call the API and format output
//!
//! CLI tests (`tests/cli_test.rs`) drive the binary; business logic is tested in the
//! command layer.

use super::print::{print_categories, print_config, print_entity, print_messages, print_outline};
use super::setup::{print_grouped_help, print_subcommand_help, CategoryCommands, Cli, Commands};
use clap::Parser;
use shuffler::api::{CategoryAction, ConfigAction, EntityUpdate, ShufflerApi};
use shuffler::codec::MANIFEST_FILE;
use shuffler::error::{Result, ShufflerError};
use shuffler::init::initialize;
use shuffler::model::{EntityKind, Position, WorkflowLabel};
use shuffler::store::fs::FsStorage;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Reads stdin when passed as a content argument.
const STDIN_MARKER: &str = "-";

struct AppContext {
    api: ShufflerApi<FsStorage>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.help {
        match &cli.command {
            Some(command) => print_subcommand_help(command),
            None => print_grouped_help(),
        }
        return Ok(());
    }

    let ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Init { summary }) => handle_init(&ctx, summary),
        Some(command) => {
            ensure_project(&ctx)?;
            dispatch(&ctx, command)
        }
        None => {
            ensure_project(&ctx)?;
            handle_tree(&ctx)
        }
    }
}

fn dispatch(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Init { summary } => handle_init(ctx, summary),
        Commands::Tree => handle_tree(ctx),
        Commands::Show { id } => handle_show(ctx, &id),
        Commands::AddCard {
            parent,
            summary,
            content,
        } => handle_add(ctx, &parent, EntityKind::Card, summary, content),
        Commands::AddSection { parent, summary } => {
            handle_add(ctx, &parent, EntityKind::Section, summary, None)
        }
        Commands::Update {
            id,
            summary,
            notes,
            clear_notes,
            label,
            content,
            category,
            x,
            y,
        } => {
            let update = EntityUpdate {
                summary,
                notes: if clear_notes {
                    Some(None)
                } else {
                    notes.map(Some)
                },
                label: label
                    .map(|label| label.parse::<WorkflowLabel>())
                    .transpose()
                    .map_err(ShufflerError::Api)?,
                content: content.map(read_content).transpose()?,
                category: None,
                position: x.zip(y).map(|(x, y)| Position::new(x, y)),
            };
            handle_update(ctx, &id, update, category)
        }
        Commands::Detach { ids } => handle_detach(ctx, ids),
        Commands::Attach { id, parent } => handle_attach(ctx, &id, &parent),
        Commands::Delete { ids } => handle_delete(ctx, ids),
        Commands::Import { paths } => handle_import(ctx, paths),
        Commands::Export { id, output } => handle_export(ctx, id, output),
        Commands::Category(cmd) => handle_category(ctx, cmd),
        Commands::Doctor { fix } => handle_doctor(ctx, fix),
        Commands::Config { key, value } => handle_config(ctx, key, value),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let ctx = initialize(&cwd, cli.project.clone());
    debug!(project = %ctx.api.project_path().display(), "using project");

    Ok(AppContext { api: ctx.api })
}

/// Logs go to stderr. `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shuffler={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn ensure_project(ctx: &AppContext) -> Result<()> {
    let dir = ctx.api.project_path();
    if dir.join(MANIFEST_FILE).is_file() {
        Ok(())
    } else {
        Err(ShufflerError::Api(format!(
            "No project found at {} (run `shuffler init` to create one)",
            dir.display()
        )))
    }
}

fn read_content(arg: String) -> Result<String> {
    if arg != STDIN_MARKER {
        return Ok(arg);
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn join_words(words: Vec<String>) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn handle_init(ctx: &AppContext, summary: Vec<String>) -> Result<()> {
    let summary = join_words(summary);
    let result = ctx.api.init(summary.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_tree(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.tree()?;
    print_outline(&result.outline);
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.api.show(id)?;
    if let Some(view) = &result.entity {
        print_entity(view);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_add(
    ctx: &AppContext,
    parent: &str,
    kind: EntityKind,
    summary: Vec<String>,
    content: Option<String>,
) -> Result<()> {
    let content = content.map(read_content).transpose()?;
    let result = ctx.api.add(parent, kind, join_words(summary), content)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_update(
    ctx: &AppContext,
    id: &str,
    update: EntityUpdate,
    category: Option<String>,
) -> Result<()> {
    let result = ctx.api.update(id, update, category.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_detach(ctx: &AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.detach(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_attach(ctx: &AppContext, id: &str, parent: &str) -> Result<()> {
    let result = ctx.api.attach(id, parent)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.delete(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &AppContext, paths: Vec<PathBuf>) -> Result<()> {
    let result = ctx.api.import_paths(paths)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, id: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.export(id.as_deref())?;
    let text = result.export.unwrap_or_default();
    match output {
        Some(path) => {
            std::fs::write(&path, &text)?;
            print_messages(&result.messages);
            println!("Exported to {}", path.display());
        }
        None => {
            print!("{}", text);
            // Keep stdout clean for redirection.
            for message in &result.messages {
                eprintln!("{}", message.content);
            }
        }
    }
    Ok(())
}

fn handle_category(ctx: &AppContext, cmd: CategoryCommands) -> Result<()> {
    let action = match cmd {
        CategoryCommands::List => CategoryAction::List,
        CategoryCommands::Add { name, color } => CategoryAction::Add { name, color },
        CategoryCommands::Remove { category } => {
            CategoryAction::Remove(ctx.api.resolve_category(&category)?)
        }
        CategoryCommands::Rename { category, name } => {
            CategoryAction::Rename(ctx.api.resolve_category(&category)?, name)
        }
        CategoryCommands::Color { category, color } => {
            CategoryAction::Color(ctx.api.resolve_category(&category)?, color)
        }
    };
    let listing = matches!(action, CategoryAction::List);

    let result = ctx.api.category(action)?;
    if listing {
        print_categories(&result.categories);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_doctor(ctx: &AppContext, fix: bool) -> Result<()> {
    let result = ctx.api.doctor(fix)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}
