use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use snss_redact::plan;
use snss_redact::session_path::{self, SessionKind};
use snss_redact::snss::{self, RewriteMode};

#[derive(Parser)]
#[command(
    name = "snss-redact",
    version,
    about = "Redacts commands from Chrome/Chromium SNSS session-restore files.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a session file's commands in edit-plan notation
    List {
        /// Path to the SNSS file
        file: String,

        /// Stop after this many commands
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Write a redacted copy of a session file
    Redact {
        /// Path to the SNSS file
        file: String,

        /// Directory that receives the new session file
        #[arg(long)]
        out_dir: String,

        /// Edit plan (edited `list` output); omit to copy every command
        #[arg(long)]
        plan: Option<String>,

        /// Output naming scheme: session | tabs
        #[arg(long, default_value = "session")]
        kind: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List { file, limit } => cmd_list(&file, limit),
        Commands::Redact {
            file,
            out_dir,
            plan,
            kind,
        } => cmd_redact(&file, &out_dir, plan.as_deref(), &kind),
    }
}

fn cmd_list(file: &str, limit: Option<usize>) -> Result<()> {
    let input = std::fs::File::open(file).with_context(|| format!("open session file: {file}"))?;
    let (version, commands) =
        snss::list_commands(BufReader::new(input)).with_context(|| format!("read {file}"))?;

    let shown = limit.unwrap_or(commands.len()).min(commands.len());
    for info in &commands[..shown] {
        println!("{}", plan::format_command(info));
    }
    if shown < commands.len() {
        println!("# ... {} more command(s) not shown", commands.len() - shown);
    }

    if version == 3
        && !commands
            .iter()
            .any(|c| c.command_type == snss::INITIAL_STATE_MARKER)
    {
        eprintln!(
            "WARNING: no initial-state marker (C{}) found; this version-3 file \
             was incompletely written.",
            snss::INITIAL_STATE_MARKER
        );
    }

    Ok(())
}

fn cmd_redact(file: &str, out_dir: &str, plan_path: Option<&str>, kind_s: &str) -> Result<()> {
    let kind = SessionKind::parse(kind_s)?;

    let mode = match plan_path {
        None => RewriteMode::CopyAll,
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read edit plan: {path}"))?;
            let instructions =
                plan::parse_plan(&text).with_context(|| format!("parse edit plan: {path}"))?;
            RewriteMode::FilterByPlan(instructions)
        }
    };

    let input = std::fs::File::open(file).with_context(|| format!("open session file: {file}"))?;
    let (out_file, out_path) = session_path::allocate(Path::new(out_dir), kind)
        .with_context(|| format!("allocate output file in {out_dir}"))?;

    let summary = match snss::rewrite(BufReader::new(input), BufWriter::new(out_file), mode) {
        Ok(summary) => summary,
        Err(e) => {
            // Never leave a truncated session file behind for the browser
            // to pick up as its newest session.
            let _ = std::fs::remove_file(&out_path);
            return Err(e).with_context(|| format!("rewrite {file}"));
        }
    };

    println!(
        "OK: kept {} command(s), dropped {} (SNSS version {})",
        summary.commands_kept, summary.commands_dropped, summary.version
    );
    println!("Wrote: {}", out_path.display());
    Ok(())
}
