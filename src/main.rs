use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Result, eyre};
use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tasklist::render::{self, PROGRESS_WIDTH};
use tasklist::{Config, FileStore, Filter, Priority, StoreEvent, TaskDetails, TaskId, TaskStore, Theme, ThemeStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - add, complete, filter and delete tasks from the terminal")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding saved tasks (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct DetailArgs {
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    due: Option<NaiveDate>,

    /// Priority: low, medium or high
    #[arg(short, long)]
    priority: Option<Priority>,

    /// Category label
    #[arg(long)]
    category: Option<String>,

    /// Free-form notes
    #[arg(short, long)]
    notes: Option<String>,
}

impl DetailArgs {
    fn is_empty(&self) -> bool {
        self.due.is_none() && self.priority.is_none() && self.category.is_none() && self.notes.is_none()
    }

    fn apply(self, mut details: TaskDetails) -> TaskDetails {
        if let Some(due) = self.due {
            details = details.with_due_date(Some(due));
        }
        if let Some(priority) = self.priority {
            details = details.with_priority(priority);
        }
        if let Some(category) = self.category {
            details = details.with_category(category);
        }
        if let Some(notes) = self.notes {
            details = details.with_notes(Some(notes));
        }
        details
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum ThemeAction {
    Show,
    Light,
    Dark,
    Toggle,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text
        text: Vec<String>,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// List tasks
    List {
        /// Which tasks to show: all, pending or completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Show one task in full
    Show { id: TaskId },

    /// Mark a task complete, or pending again
    Toggle { id: TaskId },

    /// Edit a task's details
    Edit {
        id: TaskId,

        /// New task text (keeps the current text if omitted)
        #[arg(short, long)]
        text: Option<String>,

        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// Delete a task
    Delete { id: TaskId },

    /// Delete all tasks
    Clear {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show totals and progress
    Stats,

    /// Show or change the theme
    Theme {
        #[arg(value_enum, default_value = "show")]
        action: ThemeAction,
    },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let color = config.color && !cli.no_color;

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config.data_dir()?,
    };

    match cli.command {
        Commands::Add { text, details } => {
            let mut store = open_store(&data_dir, &config)?;
            let input = text.join(" ");
            let id = if details.is_empty() {
                store.add(&input)?
            } else {
                let Some(draft) = TaskDetails::draft(&input) else {
                    return Err(eyre!("Please enter a task first!"));
                };
                store.add_with_details(details.apply(draft))?
            };
            match id {
                Some(id) => println!("Added task {}", id),
                None => println!("Nothing to add"),
            }
        }
        Commands::List { filter } => {
            let store = open_store(&data_dir, &config)?;
            for line in render::list(&store, filter, color) {
                println!("{}", line);
            }
            print_stats(&store);
        }
        Commands::Show { id } => {
            let store = open_store(&data_dir, &config)?;
            match store.get(id) {
                Some(task) => print!("{}", render::task_details(task)),
                None => println!("No task {}", id),
            }
        }
        Commands::Toggle { id } => {
            let mut store = open_store(&data_dir, &config)?;

            let celebrate = Rc::new(Cell::new(false));
            let flag = Rc::clone(&celebrate);
            store.subscribe(move |event| {
                if let StoreEvent::Toggled { toggle, .. } = event {
                    flag.set(toggle.first_completion);
                }
            });

            match store.toggle_complete(id)? {
                Some(toggle) => {
                    let state = if toggle.completed { "completed" } else { "pending" };
                    println!("Task {} is now {}", id, state);
                    if celebrate.get() {
                        println!("{}", render::celebration(color));
                    }
                    print_stats(&store);
                }
                None => println!("No task {}", id),
            }
        }
        Commands::Edit {
            id,
            text,
            clear_due,
            details,
        } => {
            let mut store = open_store(&data_dir, &config)?;
            let Some(task) = store.get(id) else {
                println!("No task {}", id);
                return Ok(());
            };
            let mut current = task.details();
            if let Some(text) = text {
                current.text = text;
            }
            if clear_due {
                current.due_date = None;
            }
            if store.edit(id, details.apply(current))? {
                println!("Updated task {}", id);
            } else {
                println!("Task text cannot be empty");
            }
        }
        Commands::Delete { id } => {
            let mut store = open_store(&data_dir, &config)?;
            if store.delete(id)? {
                println!("Deleted task {}", id);
            } else {
                println!("No task {}", id);
            }
        }
        Commands::Clear { yes } => {
            let mut store = open_store(&data_dir, &config)?;
            let cleared = if yes {
                store.clear_all(&mut true)?
            } else {
                store.clear_all(&mut prompt_yes_no)?
            };
            if cleared {
                println!("All tasks deleted");
            }
        }
        Commands::Stats => print_stats(&open_store(&data_dir, &config)?),
        Commands::Theme { action } => {
            let mut themes = ThemeStore::new(FileStore::open(&data_dir)?);
            let theme = match action {
                ThemeAction::Show => themes.resolve(config.prefers_dark)?,
                ThemeAction::Light => set_theme(&mut themes, Theme::Light)?,
                ThemeAction::Dark => set_theme(&mut themes, Theme::Dark)?,
                ThemeAction::Toggle => themes.toggle(config.prefers_dark)?,
            };
            println!("{}", theme);
        }
    }

    Ok(())
}

fn open_store(data_dir: &Path, config: &Config) -> Result<TaskStore<FileStore>> {
    TaskStore::open_with_defaults(FileStore::open(data_dir)?, config.defaults())
}

fn set_theme(themes: &mut ThemeStore<FileStore>, theme: Theme) -> Result<Theme> {
    themes.set(theme)?;
    Ok(theme)
}

fn print_stats(store: &TaskStore<FileStore>) {
    let stats = store.stats();
    println!("{}", render::stats_line(&stats));
    println!("{}", render::progress_bar(&stats, PROGRESS_WIDTH));
}

fn prompt_yes_no(message: &str) -> bool {
    print!("{} [y/N] ", message);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
