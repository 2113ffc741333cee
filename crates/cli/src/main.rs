//! # tagsplit-cli
//!
//! Interactive front end for tagsplit.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tagsplit_core::settings::{DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_SUFFIX};
use tagsplit_core::{
    ColumnRule, Command, Outcome, RuleDraft, Session, Settings, ValidationError, ALL_SENTINEL,
};
use tracing_subscriber::EnvFilter;

/// tagsplit - Split a free-form tag column into derived columns
#[derive(Parser)]
#[command(name = "tagsplit")]
#[command(author, version, about = "Split a tag column into derived columns", long_about = None)]
struct Cli {
    /// Workbook to open (.xlsx, .csv or .tsv)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Configuration file holding known tags and rules
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Suffix appended to the workbook's file stem when saving
    #[arg(long, value_name = "SUFFIX", default_value = DEFAULT_OUTPUT_SUFFIX)]
    suffix: String,

    /// Source column letter to select after opening FILE
    #[arg(long, value_name = "LETTER", requires = "file")]
    column: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Help,
    Quit,
    Open(PathBuf),
    Columns,
    Column(String),
    Tags,
    Rules,
    Show(String),
    Select(String),
    Assign(String),
    New(String),
    Edit(String),
    Untag { rule: String, tag: String },
    Delete(String),
    Save,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::default()
        .with_config_path(&cli.config)
        .with_output_suffix(cli.suffix);
    let mut session = Session::new(settings);

    if let Some(file) = cli.file {
        let outcome = session
            .apply(Command::OpenWorkbook(file.clone()))
            .with_context(|| format!("Failed to open workbook: {}", file.display()))?;
        print_outcome(&session, &outcome);
    }
    if let Some(letter) = cli.column {
        let outcome = session
            .apply(Command::SelectColumn(letter.clone()))
            .with_context(|| format!("Failed to select column {letter}"))?;
        print_outcome(&session, &outcome);
    }

    run_repl(&mut session)
}

/// Run the REPL.
fn run_repl(session: &mut Session) -> Result<()> {
    println!(
        "{} {} - Interactive Mode",
        "tagsplit".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "Type {} for help, {} to exit\n",
        ":help".yellow(),
        ":quit".yellow()
    );

    let mut rl = DefaultEditor::new()?;
    let history_path = dirs_history_path();

    // Load history if available
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = "tagsplit> ".green().bold().to_string();

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match parse_line(line) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(session, &mut rl, command) {
                            println!("{} {e:#}", "Error:".red().bold());
                        }
                    }
                    Err(message) => {
                        println!("{} {message}", "Error:".red().bold());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                println!("{} {e}", "Error:".red().bold());
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

/// Parse one REPL line.
fn parse_line(line: &str) -> Result<ReplCommand, String> {
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let arg = |usage: &str| -> Result<String, String> {
        let value = unquote(rest);
        if value.is_empty() {
            Err(format!("Usage: {usage}"))
        } else {
            Ok(value.to_string())
        }
    };

    let command = match word {
        ":help" | ":h" | ":?" => ReplCommand::Help,
        ":quit" | ":q" | ":exit" => ReplCommand::Quit,
        "open" => ReplCommand::Open(PathBuf::from(arg("open FILE")?)),
        "columns" => ReplCommand::Columns,
        "column" => ReplCommand::Column(arg("column LETTER")?),
        "tags" => ReplCommand::Tags,
        "rules" => ReplCommand::Rules,
        "show" => ReplCommand::Show(arg("show RULE")?),
        "select" => ReplCommand::Select(arg("select TAG")?),
        "assign" => ReplCommand::Assign(arg("assign RULE")?),
        "new" => ReplCommand::New(arg("new RULE")?),
        "edit" => ReplCommand::Edit(arg("edit RULE")?),
        "untag" => match split_args(rest).as_slice() {
            [rule, tag] => ReplCommand::Untag {
                rule: rule.clone(),
                tag: tag.clone(),
            },
            _ => return Err("Usage: untag RULE TAG (quote names with spaces)".to_string()),
        },
        "delete" => ReplCommand::Delete(arg("delete RULE")?),
        "save" => ReplCommand::Save,
        _ => return Err(format!("Unknown command: {word}")),
    };
    Ok(command)
}

/// Strip one pair of surrounding double quotes.
fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Split on whitespace, keeping double-quoted runs together.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in input.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(current);
    }
    args
}

fn execute(session: &mut Session, rl: &mut DefaultEditor, command: ReplCommand) -> Result<()> {
    let core_command = match command {
        ReplCommand::Help => {
            print_help();
            return Ok(());
        }
        ReplCommand::Quit => return Ok(()),
        ReplCommand::Columns => {
            print_columns(session);
            return Ok(());
        }
        ReplCommand::Tags => {
            print_tags(session);
            return Ok(());
        }
        ReplCommand::Rules => {
            print_rules(session);
            return Ok(());
        }
        ReplCommand::Show(name) => {
            print_rule(lookup(session, &name)?);
            return Ok(());
        }
        ReplCommand::Open(path) => Command::OpenWorkbook(path),
        ReplCommand::Column(letter) => Command::SelectColumn(letter),
        ReplCommand::Select(tag) => Command::SelectTag(tag),
        ReplCommand::Assign(rule) => Command::AssignTag { rule },
        ReplCommand::New(name) => {
            let Some(default_value) = ask(rl, "Value when no tag matches: ", "")? else {
                return Ok(());
            };
            let Some(multiple_value) = ask(
                rl,
                &format!("Value when several match ({ALL_SENTINEL} joins them): "),
                "",
            )?
            else {
                return Ok(());
            };
            Command::EditRule(RuleDraft::create(name, default_value, multiple_value))
        }
        ReplCommand::Edit(name) => {
            let mut draft = RuleDraft::edit(lookup(session, &name)?);
            let Some(new_name) = ask(rl, "Name: ", &draft.name)? else {
                return Ok(());
            };
            let Some(default_value) = ask(rl, "Value when no tag matches: ", &draft.default_value)?
            else {
                return Ok(());
            };
            let Some(multiple_value) = ask(
                rl,
                &format!("Value when several match ({ALL_SENTINEL} joins them): "),
                &draft.multiple_value,
            )?
            else {
                return Ok(());
            };
            draft.name = new_name;
            draft.default_value = default_value;
            draft.multiple_value = multiple_value;
            Command::EditRule(draft)
        }
        ReplCommand::Untag { rule, tag } => {
            let current = lookup(session, &rule)?;
            if !current.owned_tags.contains(&tag) {
                return Err(ValidationError::ForeignTag { rule, tag }.into());
            }
            if !confirm(rl, &format!("Remove '{tag}' from '{rule}'?"))? {
                println!("{}", "Cancelled".yellow());
                return Ok(());
            }
            Command::EditRule(RuleDraft::edit(current).without_tag(&tag))
        }
        ReplCommand::Delete(name) => {
            let owned = lookup(session, &name)?.owned_tags.len();
            if !confirm(rl, &format!("Delete rule '{name}' and release {owned} tag(s)?"))? {
                println!("{}", "Cancelled".yellow());
                return Ok(());
            }
            Command::DeleteRule(name)
        }
        ReplCommand::Save => Command::SaveSession,
    };

    let outcome = session.apply(core_command)?;
    print_outcome(session, &outcome);
    Ok(())
}

fn lookup<'a>(session: &'a Session, name: &str) -> Result<&'a ColumnRule> {
    session
        .rules()
        .get(name)
        .ok_or_else(|| ValidationError::UnknownRule(name.to_string()).into())
}

/// Prompt for a line with `initial` pre-filled. `None` when the user aborts.
fn ask(rl: &mut DefaultEditor, prompt: &str, initial: &str) -> Result<Option<String>> {
    match rl.readline_with_initial(prompt, (initial, "")) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn confirm(rl: &mut DefaultEditor, question: &str) -> Result<bool> {
    let prompt = format!("{question} [y/N] ");
    Ok(ask(rl, &prompt, "")?.is_some_and(|answer| is_yes(&answer)))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Get the history file path.
fn dirs_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|mut p| {
        p.push("tagsplit");
        let _ = std::fs::create_dir_all(&p);
        p.push("history.txt");
        p
    })
}

fn print_outcome(session: &Session, outcome: &Outcome) {
    match outcome {
        Outcome::WorkbookOpened {
            path,
            sheets,
            columns,
        } => {
            println!(
                "{} {} ({sheets} sheet(s), {columns} column(s))",
                "Opened".green().bold(),
                path.display()
            );
            print_columns(session);
        }
        Outcome::ColumnSelected {
            letter,
            new_tags,
            known_unused,
        } => {
            println!(
                "{} column {letter}: {new_tags} new, {known_unused} known unused",
                "Selected".green().bold()
            );
            print_tags(session);
        }
        Outcome::TagSelected(Some(tag)) => println!("Selected tag '{}'", tag.yellow()),
        Outcome::TagSelected(None) => println!("Selection cleared"),
        Outcome::TagAssigned { tag, rule } => {
            println!("'{}' -> {}", tag.yellow(), rule.cyan().bold());
        }
        Outcome::RuleSaved(name) => println!("{} rule {}", "Saved".green().bold(), name.cyan()),
        Outcome::RuleDeleted(rule) => println!(
            "{} rule {} ({} tag(s) released)",
            "Deleted".green().bold(),
            rule.name.cyan(),
            rule.owned_tags.len()
        ),
        Outcome::Saved { output, rows } => {
            println!(
                "{} {} ({rows} row(s) evaluated)",
                "Wrote".green().bold(),
                output.display()
            );
            println!(
                "{} {}",
                "Configuration saved to".green(),
                session.settings().config_path.display()
            );
        }
    }
}

fn print_columns(session: &Session) {
    let Some(path) = session.workbook_path() else {
        println!("{}", "No workbook loaded".yellow());
        return;
    };
    println!("{}", path.display().to_string().cyan());

    let selected = session.selected_column();
    let columns = session.columns();
    if columns.is_empty() {
        println!("  {}", "(no columns)".dimmed());
        return;
    }
    for (letter, header) in columns.iter().zip(session.headers()) {
        if selected.as_deref() == Some(letter.as_str()) {
            println!("  {} {header}", format!("{letter:>3}*").green().bold());
        } else {
            println!("  {letter:>3}  {header}");
        }
    }
}

fn print_tags(session: &Session) {
    let selected = session.selected_tag();
    let render = |tags: &[String]| -> String {
        if tags.is_empty() {
            return "(none)".dimmed().to_string();
        }
        tags.iter()
            .map(|tag| {
                if Some(tag.as_str()) == selected {
                    format!("[{tag}]").yellow().bold().to_string()
                } else {
                    tag.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("{} {}", "New:".cyan().bold(), render(session.pending_new()));
    println!("{} {}", "Known:".cyan().bold(), render(session.known_unused()));
}

fn print_rules(session: &Session) {
    if session.rules().is_empty() {
        println!("{}", "No rules yet".yellow());
        return;
    }
    for rule in session.rules().iter() {
        println!("  {} ({} tag(s))", rule.name.cyan().bold(), rule.owned_tags.len());
    }
}

fn print_rule(rule: &ColumnRule) {
    println!("{}", rule.name.cyan().bold());
    println!("  {}  {}", "default:".dimmed(), rule.default_value);
    println!("  {} {}", "multiple:".dimmed(), rule.multiple_value);
    let tags: Vec<&str> = rule.owned_tags.iter().map(String::as_str).collect();
    println!("  {}     {}", "tags:".dimmed(), tags.join(", "));
}

/// Print REPL help.
fn print_help() {
    println!("{}", "tagsplit REPL Commands:".cyan().bold());
    println!("  {}    Show this help", ":help, :h, :?".yellow());
    println!("  {}  Exit the REPL", ":quit, :q, :exit".yellow());
    println!("  {}          Open a workbook", "open FILE".yellow());
    println!("  {}            List columns of the first sheet", "columns".yellow());
    println!("  {}      Select the source column", "column LETTER".yellow());
    println!("  {}               Show new and known unused tags", "tags".yellow());
    println!("  {}              List rules", "rules".yellow());
    println!("  {}          Show one rule", "show RULE".yellow());
    println!("  {}         Pick a tag (again to clear)", "select TAG".yellow());
    println!("  {}        Give the picked tag to a rule", "assign RULE".yellow());
    println!("  {}           Create a rule", "new RULE".yellow());
    println!("  {}          Rename or change a rule", "edit RULE".yellow());
    println!("  {}     Take a tag away from a rule", "untag RULE TAG".yellow());
    println!("  {}        Delete a rule", "delete RULE".yellow());
    println!("  {}               Write the output workbook and config", "save".yellow());
    println!();
    println!("{}", "Examples:".cyan().bold());
    println!("  column B");
    println!("  new Color");
    println!("  select red");
    println!("  assign Color");
    println!("  untag \"Main material\" \"dark oak\"");
}
