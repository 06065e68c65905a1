use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "shuffler",
    bin_name = "shuffler",
    version,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Outline and notecard organizer for long-form writing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project directory (defaults to the nearest enclosing project)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project in the project directory
    Init {
        /// Summary for the root section
        summary: Vec<String>,
    },

    /// Show the outline (default)
    Tree,

    /// Show one entity
    Show { id: String },

    /// Add a card under a section
    AddCard {
        /// Parent section (`root`, an id or an id prefix)
        parent: String,
        summary: Vec<String>,

        /// Card text; `-` reads stdin
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Add a section under a section
    AddSection {
        parent: String,
        summary: Vec<String>,
    },

    /// Change fields of an entity
    Update {
        id: String,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        #[arg(long)]
        clear_notes: bool,

        /// todo, in-progress, review or done
        #[arg(long)]
        label: Option<String>,

        /// Card text; `-` reads stdin
        #[arg(long)]
        content: Option<String>,

        /// Category id or name; an empty value clears it
        #[arg(long)]
        category: Option<String>,

        #[arg(long, requires = "y", allow_hyphen_values = true)]
        x: Option<f64>,

        #[arg(long, requires = "x", allow_hyphen_values = true)]
        y: Option<f64>,
    },

    /// Move entities out of the tree into the detached pool
    Detach {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Attach (or move) an entity as the last child of a section
    Attach { id: String, parent: String },

    /// Delete detached entities and everything under them
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Import tagged text files or directories
    Import {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },

    /// Export a section (default: root) as tagged text
    Export {
        id: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Check the project files for problems
    Doctor {
        /// Rewrite the project from what could be loaded
        #[arg(long)]
        fix: bool,
    },

    /// Get or set configuration
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories
    List,
    /// Add a category
    Add {
        name: String,
        #[arg(default_value = "White")]
        color: String,
    },
    /// Remove a category (cards using it fall back to no category)
    Remove { category: String },
    /// Rename a category
    Rename { category: String, name: String },
    /// Change a category's color
    Color { category: String, color: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Outline,
    Structure,
    Data,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Outline => "Outline Commands:",
            CommandGroup::Structure => "Structure Commands:",
            CommandGroup::Data => "Data Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "tree" | "show" | "add-card" | "add-section" | "update" => Some(CommandGroup::Outline),
            "detach" | "attach" | "delete" => Some(CommandGroup::Structure),
            "import" | "export" | "category" => Some(CommandGroup::Data),
            "init" | "doctor" | "config" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Outline,
            CommandGroup::Structure,
            CommandGroup::Data,
            CommandGroup::Misc,
        ]
    }
}

pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("shuffler {version}\n"));
    output.push_str("Outline and notecard organizer for long-form writing\n");
    output.push('\n');
    output.push_str("Usage: shuffler [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| CommandGroup::for_command(sc.get_name()) == Some(*group))
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", sc.get_name(), about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("  -p, --project <DIR>  Project directory\n");
    output.push_str("  -v, --verbose        Verbose output\n");
    output.push_str("  -h, --help           Print help\n");
    output.push_str("  -V, --version        Print version\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints clap's help for a subcommand given on the command line.
pub fn print_subcommand_help(command: &Commands) {
    let name = match command {
        Commands::Init { .. } => "init",
        Commands::Tree => "tree",
        Commands::Show { .. } => "show",
        Commands::AddCard { .. } => "add-card",
        Commands::AddSection { .. } => "add-section",
        Commands::Update { .. } => "update",
        Commands::Detach { .. } => "detach",
        Commands::Attach { .. } => "attach",
        Commands::Delete { .. } => "delete",
        Commands::Import { .. } => "import",
        Commands::Export { .. } => "export",
        Commands::Category(_) => "category",
        Commands::Doctor { .. } => "doctor",
        Commands::Config { .. } => "config",
    };

    let mut cmd = Cli::command();
    if let Some(subcmd) = cmd.find_subcommand_mut(name) {
        print!("{}", subcmd.render_help());
    } else {
        print_grouped_help();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_every_command_is_grouped() {
        let cmd = Cli::command();
        for sc in cmd.get_subcommands() {
            assert!(
                CommandGroup::for_command(sc.get_name()).is_some(),
                "{} has no help group",
                sc.get_name()
            );
        }
    }

    #[test]
    fn test_parse_update_flags() {
        let cli = Cli::parse_from([
            "shuffler", "update", "ab12", "--label", "done", "--x", "-3", "--y", "4",
        ]);
        match cli.command {
            Some(Commands::Update { id, label, x, y, .. }) => {
                assert_eq!(id, "ab12");
                assert_eq!(label.as_deref(), Some("done"));
                assert_eq!((x, y), (Some(-3.0), Some(4.0)));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_project_after_subcommand() {
        let cli = Cli::parse_from(["shuffler", "tree", "--project", "book"]);
        assert_eq!(cli.project, Some(PathBuf::from("book")));
        assert!(matches!(cli.command, Some(Commands::Tree)));
    }

    #[test]
    fn test_category_remove_help_describes_fallback() {
        let cmd = Cli::command();
        let remove = cmd
            .find_subcommand("category")
            .and_then(|c| c.find_subcommand("remove"))
            .unwrap();
        let about = remove.get_about().unwrap().to_string();
        assert!(about.contains("fall back to no category"), "{}", about);
    }

    #[test]
    fn test_grouped_help_lists_commands() {
        let help = get_grouped_help();
        assert!(help.contains("Structure Commands:"));
        assert!(help.contains("add-card"));
    }
}
