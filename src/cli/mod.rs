//! # CLI Module
//!
//! Command-line interface for the bulk renamer.
//!
//! ## Usage
//! ```bash
//! # Rename to the first eight hex digits of the SHA-256 (the default rule)
//! brn photo.jpg notes.txt
//!
//! # Uppercase the second dash-separated field, dry run
//! brn -f '%(-=2)U%.%E' -n one-two.txt
//!
//! # Read paths from stdin and write a symlink script
//! find . -name '*.csv' | brn -e csv=txt --as-symlink links.sh -
//! ```
//!
//! Rules run in a fixed order: format, regex, extension map, case.

use bulk_rename::core::apply::{ApplyMode, ApplyResult, ScriptWriter};
use bulk_rename::core::facts::FsFacts;
use bulk_rename::core::pipeline::{RenameRules, Renamer};
use bulk_rename::core::resolver::{BatchPlan, ConflictResolver};
use bulk_rename::core::stages::{CaseMode, SubstitutionCount};
use bulk_rename::core::RenameOptions;
use bulk_rename::error::{ConflictError, RenameError, Result};
use bulk_rename::events::{Event, EventChannel, PlanEvent};
use clap::{ArgGroup, Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

/// Rename files according to the given rule(s)
#[derive(Parser, Debug)]
#[command(name = "brn")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("case_group").args(["upper", "lower"])))]
#[command(group(ArgGroup::new("behavior").args(["dry", "overwrite", "force"])))]
#[command(group(ArgGroup::new("script").args(["as_mv", "as_symlink", "as_hardlink"])))]
#[command(group(ArgGroup::new("diagnostics").args(["verbose", "trace"])))]
pub struct Cli {
    /// File(s) to process; `-` reads paths from stdin
    path: Vec<PathBuf>,

    /// File listing the files to process, one per line
    #[arg(short = 'i', long = "file", value_name = "PATH")]
    file: Option<PathBuf>,

    /// Replace extension OLD with NEW, at most once per file
    #[arg(short = 'e', long = "map-ext", value_name = "OLD=NEW")]
    map_ext: Vec<String>,

    /// Replace in the basename using a regular expression, in order given
    #[arg(short = 'p', long = "regex", value_name = "s/OLD/NEW/")]
    regex: Vec<String>,

    /// Replace only the first match of each --regex
    #[arg(long)]
    first_match: bool,

    /// Rename using a printf-style template (default %H%.%E)
    #[arg(short, long)]
    format: Option<String>,

    /// Make the basename uppercase (not including extension)
    #[arg(short = 'U', long)]
    upper: bool,

    /// Make the basename lowercase (not including extension)
    #[arg(short = 'L', long)]
    lower: bool,

    /// Dry run: print `mv` commands, don't rename files
    #[arg(short = 'n', long)]
    dry: bool,

    /// Overwrite existing destination files
    #[arg(short, long)]
    overwrite: bool,

    /// Continue on error; implies --overwrite
    #[arg(short = 'F', long)]
    force: bool,

    /// How files are renamed
    #[arg(long, value_enum, default_value = "move")]
    mode: Mode,

    /// Write `mv OLD NEW` commands to PATH (`-` for stdout); implies --dry
    #[arg(long, value_name = "PATH")]
    as_mv: Option<PathBuf>,

    /// Command used by --as-mv
    #[arg(long, value_name = "COMMAND", default_value = "mv")]
    mv_command: String,

    /// Additional arguments to pass to --mv-command
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    mv_arg: Vec<String>,

    /// Write `ln -s OLD NEW` commands to PATH (`-` for stdout); implies --dry
    #[arg(long, value_name = "PATH")]
    as_symlink: Option<PathBuf>,

    /// Command used by --as-symlink
    #[arg(long, value_name = "COMMAND", default_value = "ln")]
    symlink_command: String,

    /// Arguments to pass to --symlink-command (default: -s)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    symlink_arg: Vec<String>,

    /// Write `ln OLD NEW` commands to PATH (`-` for stdout); implies --dry
    #[arg(long, value_name = "PATH")]
    as_hardlink: Option<PathBuf>,

    /// Command used by --as-hardlink
    #[arg(long, value_name = "COMMAND", default_value = "ln")]
    hardlink_command: String,

    /// Arguments to pass to --hardlink-command (default: none)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    hardlink_arg: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    output: OutputFormat,

    /// Enable verbose diagnostic output
    #[arg(short, long)]
    verbose: bool,

    /// Enable trace-level diagnostic output
    #[arg(short, long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Rename in place
    Move,
    /// Keep the file and add a symlink with the new name
    Symlink,
    /// Keep the file and add a hard link with the new name
    Hardlink,
}

impl From<Mode> for ApplyMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Move => ApplyMode::Move,
            Mode::Symlink => ApplyMode::Symlink,
            Mode::Hardlink => ApplyMode::Hardlink,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (new paths only)
    Minimal,
}

impl Cli {
    fn log_level(&self) -> tracing::Level {
        if self.trace {
            tracing::Level::TRACE
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }

    /// The requested script, if any
    fn script(&self) -> Option<(&Path, ScriptWriter)> {
        if let Some(path) = &self.as_mv {
            let writer = ScriptWriter::new(ApplyMode::Move)
                .with_command(&self.mv_command)
                .with_args(self.mv_arg.clone());
            return Some((path, writer));
        }
        if let Some(path) = &self.as_symlink {
            let mut writer =
                ScriptWriter::new(ApplyMode::Symlink).with_command(&self.symlink_command);
            if !self.symlink_arg.is_empty() {
                writer = writer.with_args(self.symlink_arg.clone());
            }
            return Some((path, writer));
        }
        if let Some(path) = &self.as_hardlink {
            let writer = ScriptWriter::new(ApplyMode::Hardlink)
                .with_command(&self.hardlink_command)
                .with_args(self.hardlink_arg.clone());
            return Some((path, writer));
        }
        None
    }

    fn options(&self) -> RenameOptions {
        let mode = match self.script() {
            Some((_, writer)) => writer.mode(),
            None => self.mode.into(),
        };
        let options = RenameOptions {
            overwrite: self.overwrite,
            dry_run: self.dry || self.script().is_some(),
            mode,
            ..RenameOptions::default()
        };
        if self.force {
            options.force()
        } else {
            options
        }
    }

    fn rules(&self) -> Result<RenameRules> {
        let mut builder = RenameRules::builder();
        if let Some(format) = &self.format {
            builder = builder.format(format.as_str());
        }
        for spec in &self.regex {
            builder = builder.substitution(spec.as_str());
        }
        if self.first_match {
            builder = builder.substitution_count(SubstitutionCount::First);
        }
        for spec in &self.map_ext {
            builder = builder.map_extension(spec.as_str());
        }
        if self.upper {
            builder = builder.case(CaseMode::Upper);
        } else if self.lower {
            builder = builder.case(CaseMode::Lower);
        }
        builder.build()
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    bulk_rename::init_tracing(cli.log_level());
    debug!("Parsed arguments: {:?}", cli);

    let files = gather_files(&cli.path, cli.file.as_deref())?;
    if files.is_empty() {
        return Err(RenameError::Config("no files given".to_string()));
    }

    let rules = cli.rules()?;
    let options = cli.options();
    debug!("Options: {:?}", options);

    let plan = plan_and_resolve(&cli, rules, &options, &files)?;

    for skipped in plan.skipped() {
        eprintln!(
            "{} skipped {}: {}",
            style("!").yellow().bold(),
            skipped.path.display(),
            skipped.error
        );
    }

    if plan.is_empty() {
        return Err(RenameError::NothingToDo);
    }

    if let Some((path, writer)) = cli.script() {
        writer.write_to(&plan, path)?;
        info!("wrote {} command(s) to {:?}", plan.operations().len(), path);
        return Ok(());
    }

    if options.dry_run {
        print_plan(&plan, cli.output)?;
        return Ok(());
    }

    let result = options.executor().execute(&plan);
    print_result(&result, cli.output)?;

    if result.is_success() {
        Ok(())
    } else {
        Err(RenameError::ApplyFailed {
            failed: result.errors.len(),
            total: plan.operations().len(),
        })
    }
}

/// Collect paths from arguments, stdin and a list file.
///
/// Empty lines are skipped and duplicates collapsed, keeping first-seen order.
fn gather_files(paths: &[PathBuf], list_file: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.as_os_str() == "-" {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            files.extend(read_lines(&input));
        } else {
            files.push(path.clone());
        }
    }

    if let Some(list) = list_file {
        let contents = fs::read_to_string(list).map_err(|e| {
            RenameError::Config(format!("failed to read {}: {}", list.display(), e))
        })?;
        files.extend(read_lines(&contents));
    }

    let mut seen = HashSet::new();
    files.retain(|path| seen.insert(path.clone()));
    debug!("Processing {} file(s)", files.len());
    Ok(files)
}

fn read_lines(contents: &str) -> impl Iterator<Item = PathBuf> + '_ {
    contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
}

fn plan_and_resolve(
    cli: &Cli,
    rules: RenameRules,
    options: &RenameOptions,
    files: &[PathBuf],
) -> Result<BatchPlan> {
    let renamer = Renamer::new(rules, Arc::new(FsFacts::new()));
    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(cli.output, OutputFormat::Pretty) && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Plan(PlanEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Plan(PlanEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Plan(PlanEvent::Completed { .. }) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    let draft = renamer.plan_batch_with_events(files, &sender);
    let resolved = ConflictResolver::new(options.resolve_options(), renamer.provider())
        .resolve_with_events(draft, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    resolved.map_err(|conflicts| {
        print_conflicts(&conflicts);
        RenameError::Conflicts(conflicts)
    })
}

fn print_conflicts(conflicts: &[ConflictError]) {
    let term = Term::stderr();
    for conflict in conflicts {
        term.write_line(&format!("{} {}", style("✗").red().bold(), conflict))
            .ok();
    }
}

fn print_plan(plan: &BatchPlan, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Pretty => {
            let writer = ScriptWriter::new(ApplyMode::Move);
            for op in plan.operations() {
                println!("{}", writer.line(op));
            }
            let term = Term::stderr();
            for path in plan.unchanged() {
                term.write_line(&format!(
                    "  {} {} (unchanged)",
                    style("○").dim(),
                    style(path.display()).dim()
                ))
                .ok();
            }
            term.write_line(&format!(
                "{} {} file(s) would be renamed",
                style("✓").green().bold(),
                style(plan.operations().len()).cyan()
            ))
            .ok();
        }
        OutputFormat::Json => {
            println!("{}", to_json(&plan.report())?);
        }
        OutputFormat::Minimal => {
            for (_, destination) in plan.pairs() {
                println!("{}", destination.display());
            }
        }
    }
    Ok(())
}

fn print_result(result: &ApplyResult, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Pretty => {
            let term = Term::stderr();
            for error in &result.errors {
                term.write_line(&format!("{} {}", style("✗").red().bold(), error))
                    .ok();
            }
            term.write_line(&format!(
                "{} {} file(s) renamed in {:.1}s",
                style("✓").green().bold(),
                style(result.applied.len()).cyan(),
                result.duration_ms as f64 / 1000.0
            ))
            .ok();
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "applied": result.applied,
                "errors": result.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                "duration_ms": result.duration_ms,
            });
            println!("{}", to_json(&output)?);
        }
        OutputFormat::Minimal => {
            for op in &result.applied {
                println!("{}", op.destination.display());
            }
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RenameError::Config(format!("failed to serialize output: {}", e)))
}
