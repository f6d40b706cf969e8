//! # BioLedger CLI
//!
//! Usage:
//!   bioledger example > lab.json
//!   bioledger seed lab.json
//!   bioledger equipment add cabinet.json
//!   bioledger report --format who --out reports/
//!   bioledger chat

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bioledger::chat::{self, Conversation, GroqClient};
use bioledger::config::Config;
use bioledger::mail::{AlertMailer, OutboxTransport};
use bioledger::model::{Alert, Assistant, Contacts, Equipment, Lab, Project};
use bioledger::service::LabService;
use bioledger::store::JsonFileStore;
use bioledger::{render_report, LabError, ReportFormat, ReportOptions};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Records and compliance reports for a biosafety lab
#[derive(Parser, Debug)]
#[command(name = "bioledger")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./bioledger.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty lab
    Init {
        /// Lab name
        name: String,
        /// Lab location
        location: String,
    },
    /// Create the lab from a full JSON document ("-" reads stdin)
    Seed { file: PathBuf },
    /// Print the lab document
    Show,
    /// Research projects
    Project {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Lab equipment
    Equipment {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Lab staff
    Assistant {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Hazard alerts
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },
    /// Emergency contacts
    Contacts {
        #[command(subcommand)]
        action: ContactsAction,
    },
    /// Generate a compliance report PDF
    Report {
        /// ieee or who (defaults to the configured format)
        #[arg(short, long)]
        format: Option<String>,
        /// Output directory (defaults to the configured directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Report date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Talk to the biosafety assistant
    Chat,
    /// Print an example lab document
    Example,
}

#[derive(Subcommand, Debug)]
enum RecordAction {
    /// Append a record from a JSON file ("-" reads stdin)
    Add { file: PathBuf },
    /// Print all records
    List,
}

#[derive(Subcommand, Debug)]
enum AlertAction {
    /// Record an alert and mail it to the configured recipients
    Add {
        file: PathBuf,
        /// Store the alert without sending mail
        #[arg(long)]
        no_mail: bool,
    },
    /// Print all alerts
    List,
    /// Replace the whole alert list with a JSON array
    Replace { file: PathBuf },
    /// Mail an existing alert (1-based; defaults to the latest)
    Send { number: Option<usize> },
}

#[derive(Subcommand, Debug)]
enum ContactsAction {
    /// Print the emergency contacts
    Show,
    /// Replace the emergency contacts from a JSON file
    Set { file: PathBuf },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Example = cli.command {
        print!("{}", example_lab_json());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let mut service = LabService::new(JsonFileStore::new(&config.store.path));

    match cli.command {
        Command::Example => unreachable!("handled before loading config"),
        Command::Init { name, location } => {
            let lab = service.initialize_empty(&name, &location)?;
            eprintln!("✓ Created lab '{}' at {}", lab.name, config.store.path.display());
        }
        Command::Seed { file } => {
            let lab: Lab = read_json(&file)?;
            let lab = service.initialize(lab)?;
            eprintln!(
                "✓ Seeded lab '{}' with {} projects, {} staff, {} equipment",
                lab.name,
                lab.projects.len(),
                lab.assistants.len(),
                lab.equipments.len()
            );
        }
        Command::Show => print_json(&service.lab()?)?,
        Command::Project { action } => match action {
            RecordAction::Add { file } => {
                let project: Project = read_json(&file)?;
                if !project.date_range_valid() {
                    warn!("project '{}' ends before it starts", project.title);
                }
                print_json(&service.add_project(project)?)?;
            }
            RecordAction::List => print_json(&service.projects()?)?,
        },
        Command::Equipment { action } => match action {
            RecordAction::Add { file } => {
                let equipment: Equipment = read_json(&file)?;
                print_json(&service.add_equipment(equipment)?)?;
            }
            RecordAction::List => print_json(&service.equipments()?)?,
        },
        Command::Assistant { action } => match action {
            RecordAction::Add { file } => {
                let assistant: Assistant = read_json(&file)?;
                print_json(&service.add_assistant(assistant)?)?;
            }
            RecordAction::List => print_json(&service.assistants()?)?,
        },
        Command::Alert { action } => run_alert(&config, &mut service, action)?,
        Command::Contacts { action } => match action {
            ContactsAction::Show => print_json(&service.contacts()?)?,
            ContactsAction::Set { file } => {
                let contacts: Contacts = read_json(&file)?;
                print_json(&service.replace_contacts(contacts)?)?;
            }
        },
        Command::Report { format, out, date } => {
            let format = match format {
                Some(f) => f.parse::<ReportFormat>()?,
                None => config.report.default_format,
            };
            let options = match date {
                Some(d) => ReportOptions::new(
                    NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                        .with_context(|| format!("invalid --date '{}', expected YYYY-MM-DD", d))?,
                ),
                None => ReportOptions::today(),
            };
            let lab = service.lab()?;
            let report = render_report(&lab, format, &options)?;

            let dir = out.unwrap_or_else(|| config.report.output_dir.clone());
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            let path = dir.join(&report.filename);
            fs::write(&path, &report.bytes).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "✓ Written {} pages ({} bytes) to {}",
                report.page_count,
                report.bytes.len(),
                path.display()
            );
        }
        Command::Chat => run_chat(&config)?,
    }
    Ok(())
}

fn run_alert(config: &Config, service: &mut LabService<JsonFileStore>, action: AlertAction) -> Result<()> {
    let mailer = AlertMailer::new(&config.mail, OutboxTransport::new(&config.mail.outbox_dir));
    match action {
        AlertAction::Add { file, no_mail } => {
            let alert: Alert = read_json(&file)?;
            let lab_name = service.lab()?.name;
            let alerts = service.add_alert(alert.clone())?;
            if !no_mail {
                // The alert is already stored; a mail failure is reported, not fatal.
                if let Err(e) = mailer.send_alert(&lab_name, &alert, Utc::now()) {
                    warn!("alert stored but not mailed: {}", e);
                }
            }
            print_json(&alerts)?;
        }
        AlertAction::List => print_json(&service.alerts()?)?,
        AlertAction::Replace { file } => {
            let alerts: Vec<Alert> = read_json(&file)?;
            print_json(&service.replace_alerts(alerts)?)?;
        }
        AlertAction::Send { number } => {
            let lab = service.lab()?;
            let alert = match number {
                Some(0) => bail!("alert numbers start at 1"),
                Some(n) => lab.alerts.get(n - 1),
                None => lab.alerts.last(),
            }
            .context("no such alert")?;
            let mail = mailer.send_alert(&lab.name, alert, Utc::now())?;
            eprintln!("✓ Queued '{}' for {}", mail.subject, mail.recipients.join(", "));
        }
    }
    Ok(())
}

fn run_chat(config: &Config) -> Result<()> {
    let client = GroqClient::from_config(&config.chat).context("configuring the chat client")?;
    let mut conversation = Conversation::from_config(&config.chat);
    println!("{}", conversation.greeting());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                conversation.reset();
                println!("{}", conversation.greeting());
            }
            "" => continue,
            message => match chat::ask(&mut conversation, &client, message) {
                Ok(reply) => println!("{}", reply),
                Err(e) => eprintln!("✗ {}", e),
            },
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    let value = serde_json::from_str(&text)
        .map_err(LabError::from)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn example_lab_json() -> &'static str {
    include_str!("../demos/example_lab.json")
}
