use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{eyre, Result};
use std::path::PathBuf;
use taskdeck::model::parse_timestamp;
use taskdeck::{
    new_task, overdue, run, Recurrence, RecurrenceKind, SortKey, Store, TagCatalog, Task,
    TaskQuery, TaskStatus,
};

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Taskdeck CLI - shift task lists, recurrence, and overdue tracking")]
#[command(version)]
struct Cli {
    /// Directory holding the task payload (default: platform data dir)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Start timestamp (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Due timestamp (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        creator: Option<String>,
        /// Tag id, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        billable: bool,
        /// Rate claimed on completion of a billable task
        #[arg(long)]
        rate: Option<f64>,
        /// Recurrence: daily, weekly, monthly, yearly, or custom
        #[arg(long)]
        recur: Option<String>,
        /// Recurrence interval
        #[arg(long, default_value_t = 1)]
        every: u32,
    },

    /// List open and done tasks with optional filters
    List {
        /// Free-text search over title, description, and tag labels
        #[arg(long)]
        query: Option<String>,
        /// Status filter (open/done), repeatable
        #[arg(long = "status")]
        statuses: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "assignee")]
        assignees: Vec<String>,
        #[arg(long = "creator")]
        creators: Vec<String>,
        /// Due range start (YYYY-MM-DD); requires --due-to
        #[arg(long)]
        due_from: Option<String>,
        /// Due range end (YYYY-MM-DD); requires --due-from
        #[arg(long)]
        due_to: Option<String>,
        /// due-earliest, due-latest, created-newest, or created-oldest
        #[arg(long, default_value = "due-earliest")]
        sort: String,
    },

    /// Mark a task done (recurring tasks spawn their next occurrence)
    Complete { id: String },

    /// Flip a done task back to open
    Reopen { id: String },

    /// Delete a task
    Remove { id: String },

    /// Show tasks past due for a user
    Overdue {
        #[arg(long)]
        user: String,
    },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskdeck"),
    };
    let mut store = Store::open(&data_dir)?;

    match cli.command {
        Commands::Add {
            title,
            description,
            start,
            due,
            assignee,
            creator,
            tags,
            location,
            billable,
            rate,
            recur,
            every,
        } => {
            let mut task = new_task(title, Utc::now());
            task.description = description;
            task.start_time = start.as_deref().map(parse_when).transpose()?;
            task.due_time = due.as_deref().map(parse_when).transpose()?;
            task.assignee_id = assignee;
            task.creator_id = creator;
            task.tags = tags;
            task.location = location;
            task.is_billable = billable;
            task.billable_rate = rate;
            if let Some(kind) = recur {
                let kind: RecurrenceKind = kind.parse().map_err(|e: String| eyre!(e))?;
                task.recurrence = Some(Recurrence::new(kind, every));
            }
            let id = store.insert(task)?;
            println!("Task added ({})", id);
        }

        Commands::List {
            query,
            statuses,
            tags,
            assignees,
            creators,
            due_from,
            due_to,
            sort,
        } => {
            let task_query = TaskQuery {
                text: query,
                statuses: statuses
                    .iter()
                    .map(|s| parse_status(s))
                    .collect::<Result<_>>()?,
                tags,
                assignees,
                creators,
                due_range: parse_due_range(due_from.as_deref(), due_to.as_deref())?,
            };
            let sort: SortKey = sort.parse().map_err(|e: String| eyre!(e))?;

            let view = run(store.tasks(), &task_query, sort, &TagCatalog::default());
            let now = Utc::now();

            println!("{} ({})", "Open tasks".blue().bold(), view.open.len());
            for task in &view.open {
                println!("  {}", render_line(task, now));
            }
            println!();
            println!("{} ({})", "Done tasks".dimmed().bold(), view.done.len());
            for task in &view.done {
                println!("  {}", render_line(task, now));
            }
        }

        Commands::Complete { id } => match store.complete(&id, Utc::now())? {
            Some(outcome) => {
                println!("Task {} marked as done.", outcome.updated.id);
                if outcome.updated.is_billable {
                    if let Some(rate) = outcome.updated.billable_rate {
                        println!("{}", format!("${:.2} claimed.", rate).green());
                    }
                }
                if let Some(spawned) = outcome.spawned {
                    let due = spawned
                        .due_time
                        .map(|d| format!(" due {}", d.format("%Y-%m-%d %H:%M")))
                        .unwrap_or_default();
                    println!("Recurring task spawned ({}){}", spawned.id, due);
                }
            }
            None => return Err(eyre!("Task {} not found", id)),
        },

        Commands::Reopen { id } => {
            if !store.reopen(&id)? {
                return Err(eyre!("Task {} not found", id));
            }
            println!("Task {} reopened.", id);
        }

        Commands::Remove { id } => {
            if !store.remove(&id)? {
                return Err(eyre!("Task {} not found", id));
            }
            println!("Task {} removed.", id);
        }

        Commands::Overdue { user } => {
            let now = Utc::now();
            let late = overdue(store.tasks(), &user, now);
            if late.is_empty() {
                println!("Nothing overdue.");
            } else {
                for task in late {
                    println!("{}", render_line(task, now).red());
                }
            }
        }
    }

    Ok(())
}

fn parse_when(raw: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).ok_or_else(|| eyre!("Unrecognized timestamp '{}'", raw))
}

fn parse_status(raw: &str) -> Result<TaskStatus> {
    match raw.to_lowercase().as_str() {
        "open" => Ok(TaskStatus::Open),
        "done" => Ok(TaskStatus::Done),
        other => Err(eyre!("Unknown status '{}' (expected open or done)", other)),
    }
}

fn parse_due_range(from: Option<&str>, to: Option<&str>) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| eyre!("Invalid date '{}': {}. Use YYYY-MM-DD.", raw, e))
    };
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some((parse(from)?, parse(to)?))),
        (None, None) => Ok(None),
        _ => Err(eyre!("--due-from and --due-to must be given together")),
    }
}

fn render_line(task: &Task, now: DateTime<Utc>) -> String {
    let marker = if task.is_done() {
        "✓".green().to_string()
    } else {
        "·".cyan().to_string()
    };
    let due = match task.due_time {
        Some(due) => {
            let text = format!("due {}", due.format("%b %e %H:%M"));
            if !task.is_done() && due < now {
                format!(" [{}]", text.red())
            } else {
                format!(" [{}]", text)
            }
        }
        None => String::new(),
    };
    let tags = if task.tags.is_empty() {
        String::new()
    } else {
        format!(" #{}", task.tags.join(" #"))
    };
    format!("{} {} ({}){}{}", marker, task.title, task.id, due, tags)
}
