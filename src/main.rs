//! Lifemap CLI
//!
//! Stands in for the windowed UI: every subcommand opens the journal,
//! performs one interaction, prints the refreshed view, and exits.
//!
//! ## Usage
//!
//! ```bash
//! # First run: store the birth anchor
//! lifemap init --birthdate 2000-01-01
//!
//! # Open a node and list its children and record views
//! lifemap show AB
//!
//! # Attach a record, then propagate it downward
//! lifemap add AB "[Y2K] the millennium"
//! lifemap flag 1 --below true
//!
//! # Pin record 1 to another node, edit it, remove it
//! lifemap pin 1 ABCC
//! lifemap edit 1 "[Y2K] party like it's 1999"
//! lifemap rm 1
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lifemap::{Config, Journal, Record, RecordRepository, TimeAddress, ViewModel};

#[derive(Parser, Debug)]
#[command(name = "lifemap")]
#[command(about = "Personal life journal over a hierarchical time map")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, env = "LIFEMAP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the birthdate (first run only)
    Init {
        /// Birthdate, YYYY-MM-DD
        #[arg(long)]
        birthdate: NaiveDate,
    },
    /// Show a node: label, children, and the four record lists
    Show {
        /// Address to focus; omit for the lifetime root
        address: Option<String>,
    },
    /// Create a record at an address
    Add { address: String, text: String },
    /// Set a record's propagation flags
    Flag {
        id: i64,
        /// Show this record at ancestor nodes (LowTF of ancestors)
        #[arg(long)]
        above: Option<bool>,
        /// Show this record at descendant nodes (HighTF of descendants)
        #[arg(long)]
        below: Option<bool>,
    },
    /// Toggle a record's pin on an address
    Pin { id: i64, address: String },
    /// Replace a record's text
    Edit { id: i64, text: String },
    /// Delete a record
    Rm { id: i64 },
    /// Print database statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("lifemap=warn".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config {
        Config::load(config_path).context("Failed to load config")?
    } else {
        Config::default()
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {:?}", config.data_dir))?;

    let repo = RecordRepository::open(&config.db_path())?;

    if let Command::Init { birthdate } = &args.command {
        Journal::initialize(repo, *birthdate)?;
        println!("Journal initialized with birthdate {}", birthdate);
        return Ok(());
    }

    let mut journal = Journal::open(repo)
        .context("No journal found; run `lifemap init --birthdate YYYY-MM-DD` first")?;

    match args.command {
        Command::Init { .. } => unreachable!("handled above"),
        Command::Show { address } => {
            let target = parse_address(address.as_deref().unwrap_or(""))?;
            journal.select_address(&target)?;
            print_view(&journal.refresh()?);
        }
        Command::Add { address, text } => {
            let target = parse_address(&address)?;
            journal.select_address(&target)?;
            match journal.create_record(&text)? {
                Some(id) => println!("Created record {}", id),
                None => bail!("Nothing created: empty text or root address"),
            }
            print_view(&journal.refresh()?);
        }
        Command::Flag { id, above, below } => {
            if above.is_none() && below.is_none() {
                bail!("Nothing to do: pass --above and/or --below");
            }
            if let Some(value) = above {
                journal.repo().set_show_above(id, value)?;
            }
            if let Some(value) = below {
                journal.repo().set_show_below(id, value)?;
            }
            print_record(&require_record(&journal, id)?);
        }
        Command::Pin { id, address } => {
            let target = parse_address(&address)?;
            journal.repo().toggle_selection(id, &target)?;
            print_record(&require_record(&journal, id)?);
        }
        Command::Edit { id, text } => {
            // One process, one interaction: stage and commit together.
            journal.repo_mut().stage_edit(id, &text)?;
            journal.repo_mut().commit_edit(id)?;
            print_record(&require_record(&journal, id)?);
        }
        Command::Rm { id } => {
            journal.repo_mut().delete(id)?;
            println!("Deleted record {}", id);
        }
        Command::Stats => {
            let stats = journal.repo().db().stats()?;
            println!(
                "{} records ({} flagged above, {} flagged below)",
                stats.record_count, stats.flagged_above, stats.flagged_below
            );
        }
    }

    Ok(())
}

fn parse_address(s: &str) -> anyhow::Result<TimeAddress> {
    TimeAddress::parse(s).with_context(|| format!("Invalid address {:?}", s))
}

fn require_record(journal: &Journal, id: i64) -> anyhow::Result<Record> {
    journal
        .repo()
        .get(id)?
        .with_context(|| format!("Record {} not found", id))
}

fn print_record(record: &Record) {
    let mut flags = String::new();
    if record.show_above {
        flags.push_str(" +above");
    }
    if record.show_below {
        flags.push_str(" +below");
    }
    let pins = record.selection_set();
    let pins = if pins.is_empty() {
        String::new()
    } else {
        format!(" pins: {}", pins.into_iter().collect::<Vec<_>>().join(", "))
    };
    println!("#{} [{}]{}{} {}", record.id, record.origin, flags, pins, record.text);
}

fn print_view(vm: &ViewModel) {
    println!("== {} ==", vm.parent_label);
    for slot in &vm.children {
        let marker = if slot.selected {
            '>'
        } else if slot.enabled {
            '-'
        } else {
            'x'
        };
        let preview = slot
            .pinned_preview
            .as_deref()
            .map(|t| format!("  | {}", t))
            .unwrap_or_default();
        println!("  {} {:<9} {}{}", marker, slot.address.to_string(), slot.label, preview);
    }
    for (name, list) in [
        ("Selected", &vm.views.selected),
        ("Self", &vm.views.self_records),
        ("High TF", &vm.views.high_tf),
        ("Low TF", &vm.views.low_tf),
    ] {
        if list.is_empty() {
            continue;
        }
        println!("{}:", name);
        for record in list {
            print_record(record);
        }
    }
}
