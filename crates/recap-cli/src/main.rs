use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recap_core::{host_status, sort_hosts_by_severity, PlayId, ReportId, TaskOutcome};
use recap_ingest::{IngestOutcome, Ingestor};
use recap_store::Storage;

#[derive(Parser)]
#[command(name = "recap", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize recap in the current directory (creates .recap/, config, db)
    Init,

    /// Parse an Ansible log file and store its results
    Ingest {
        /// Playbook stdout or timestamped log file
        file: String,
    },

    /// Show the host board for a report, worst hosts first
    Board {
        /// Report id; defaults to the most recently ingested
        #[arg(long)]
        report: Option<String>,
    },

    /// List ingested reports
    Reports,

    /// List the tasks of one play in execution order
    Tasks {
        #[arg(long)]
        play: String,
        /// Filter by outcome (failed also matches fatal)
        #[arg(long)]
        status: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;

    match cli.cmd {
        Command::Init => {
            Ingestor::init_root(&root)?;
            println!("Initialized recap in {}", root.display());
        }
        Command::Ingest { file } => {
            let ing = Ingestor::open(root)?;
            match ing.ingest_file(std::path::Path::new(&file))? {
                IngestOutcome::Ingested { report_id, hosts } => {
                    println!("Ingested {} -> report {} ({} hosts)", file, report_id.as_str(), hosts);
                }
                IngestOutcome::AlreadyIngested { report_id } => {
                    println!("Already ingested as report {}", report_id.as_str());
                }
            }
        }
        Command::Board { report } => {
            let ing = Ingestor::open(root)?;
            let report_id = match report {
                Some(id) => ReportId::from_str(id),
                None => ing
                    .store
                    .latest_report()?
                    .ok_or_else(|| anyhow!("no reports ingested yet; run `recap ingest <file>`"))?,
            };
            let board = ing.store.load_board(&report_id)?;
            print_board(&ing, &board);
        }
        Command::Reports => {
            let ing = Ingestor::open(root)?;
            let reports = ing.store.list_reports()?;
            println!("Reports: {}", reports.len());
            for meta in reports {
                let finished = meta
                    .finished_at_unix
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {} [{}] ingested_at={} finished_at={}",
                    meta.id.as_str(),
                    meta.format.as_str(),
                    meta.ingested_at_unix,
                    finished
                );
            }
        }
        Command::Tasks { play, status } => {
            let filter = status.as_deref().map(parse_outcome).transpose()?;
            let ing = Ingestor::open(root)?;
            let tasks = ing.store.tasks_for_play(&PlayId::from_str(play), filter)?;
            println!("Tasks: {}", tasks.len());
            for t in tasks {
                let line = t.line_number.map(|n| format!(" line={}", n)).unwrap_or_default();
                println!("- #{} {} [{}]{}", t.order, t.name, t.outcome.as_str(), line);
                if let Some(msg) = t.failure_message {
                    println!("    {}", msg);
                }
            }
        }
    }

    Ok(())
}

fn parse_outcome(s: &str) -> anyhow::Result<TaskOutcome> {
    s.parse().with_context(|| {
        let valid: Vec<&str> = TaskOutcome::all().iter().map(|o| o.as_str()).collect();
        format!("invalid status {:?}; valid: {}", s, valid.join("|"))
    })
}

fn print_board(ing: &Ingestor<recap_store_sqlite::SqliteStorage>, board: &recap_core::Board) {
    if let Some(id) = &board.report_id {
        println!("Report {}", id.as_str());
    }
    if let Some(finished) = board.finished_at_unix {
        println!("Finished at (unix): {}", finished);
    }
    println!("Hosts: {}", board.hosts.len());

    for host in sort_hosts_by_severity(&board.hosts) {
        println!("- {} [{}]", host.hostname, host_status(&host.plays).as_str());
        for play in &host.plays {
            let mut line = format!("    {} [{}]", play.name, play.status.as_str());
            if ing.cfg.show_task_counts() {
                line.push_str(&format!(
                    " ok={} changed={} failed={}",
                    play.tasks.ok, play.tasks.changed, play.tasks.failed
                ));
            }
            if ing.cfg.show_play_times() {
                if let Some(t) = play.started_at_unix {
                    line.push_str(&format!(" at={}", t));
                }
            }
            println!("{}", line);
        }
    }
}
