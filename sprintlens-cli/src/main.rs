// Sprintlens CLI - scrum board management and AI project analysis

mod console;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sprintlens_core::config::PLACEHOLDER_API_KEY;
use sprintlens_core::db_path::resolve_database_path;
use sprintlens_core::{
    create_provider, AnalysisProvider, Analyzer, BoardReader, BoardStore, Config, NewProject,
    NewTask, TaskStatus,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use console::{print_project, print_task, render_board, ConsoleSink};

#[derive(Parser)]
#[command(name = "sprintlens")]
#[command(about = "Scrum board with AI-assisted project analysis", long_about = None)]
#[command(version)]
struct Cli {
    /// Database file (defaults to ~/.sprintlens/data/sprintlens.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },

    /// Show a project's three-column board
    Board {
        /// Project id
        project: i64,
    },

    /// Analyze a project
    Analyze {
        /// Project id
        project: i64,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create a project
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List all projects
    List,
    /// Show a project and its task counts
    Show { id: i64 },
    /// Rename a project or change its description
    Rename {
        id: i64,
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a project and all of its tasks
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task to a project (starts in ToDo)
    Add {
        project: i64,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List a project's tasks
    List {
        project: i64,
        /// Only show tasks with this status (ToDo, InProgress, Done)
        #[arg(short, long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Change a task's title or description
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Move a task to another column
    Move {
        id: i64,
        /// ToDo, InProgress or Done
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },
    /// Delete a task
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::from_str(value).map_err(|e| e.to_string())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.get_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(&config);

    let db_path = resolve_database_path(cli.database.as_deref());
    if let Commands::Config { action } = &cli.command {
        return handle_config_command(action, &config, &db_path);
    }

    debug!("Using database at {}", db_path.display());
    let store = Arc::new(
        BoardStore::open(&db_path)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?,
    );

    let result = match cli.command {
        Commands::Project { action } => handle_project_command(action, &store).await,
        Commands::Task { action } => handle_task_command(action, &store).await,
        Commands::Board { project } => show_board(project, &store).await,
        Commands::Analyze { project } => {
            analyze_project(project, store.clone(), &config).await
        }
        Commands::Config { .. } => Ok(()),
    };

    store.close().await;
    match result {
        // the sink already printed the failure line
        Err(e) if e.is::<AnalysisFailed>() => std::process::exit(1),
        other => other,
    }
}

async fn handle_project_command(action: ProjectCommands, store: &BoardStore) -> Result<()> {
    match action {
        ProjectCommands::Add { name, description } => {
            let project = store.insert_project(NewProject::new(&name, &description)).await?;
            println!("✅ Created project #{} {}", project.id, project.name);
        }
        ProjectCommands::List => {
            let projects = store.list_projects().await?;
            if projects.is_empty() {
                println!("No projects yet. Create one with `sprintlens project add <name>`.");
            }
            for project in &projects {
                print_project(project);
            }
        }
        ProjectCommands::Show { id } => {
            let Some(project) = store.get_project_by_id(id).await? else {
                bail!("Project {} not found", id);
            };
            let tasks = store.get_tasks_by_project(id).await?;
            print_project(&project);
            for status in TaskStatus::ALL {
                let count = tasks.iter().filter(|task| task.status == status).count();
                println!("   {}: {}", status, count);
            }
        }
        ProjectCommands::Rename {
            id,
            name,
            description,
        } => {
            let Some(mut project) = store.get_project_by_id(id).await? else {
                bail!("Project {} not found", id);
            };
            project.name = name;
            if let Some(description) = description {
                project.description = description;
            }
            store.update_project(&project).await?;
            println!("✅ Updated project #{}", id);
        }
        ProjectCommands::Delete { id } => {
            if !store.delete_project(id).await? {
                bail!("Project {} not found", id);
            }
            println!("🗑️ Deleted project #{}", id);
        }
    }
    Ok(())
}

async fn handle_task_command(action: TaskCommands, store: &BoardStore) -> Result<()> {
    match action {
        TaskCommands::Add {
            project,
            title,
            description,
        } => {
            let task = store
                .insert_task(NewTask::new(project, &title, &description))
                .await?;
            println!("✅ Added task #{} to project #{}", task.id, project);
        }
        TaskCommands::List { project, status } => {
            let tasks = store.get_tasks_by_project(project).await?;
            let mut shown = 0;
            for task in tasks
                .iter()
                .filter(|task| status.map_or(true, |status| task.status == status))
            {
                print_task(task);
                shown += 1;
            }
            if shown == 0 {
                println!("No tasks.");
            }
        }
        TaskCommands::Edit {
            id,
            title,
            description,
        } => {
            let Some(mut task) = store.get_task(id).await? else {
                bail!("Task {} not found", id);
            };
            if title.is_none() && description.is_none() {
                warn!("Nothing to change for task {}", id);
                return Ok(());
            }
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = description {
                task.description = description;
            }
            store.update_task(&task).await?;
            println!("✅ Updated task #{}", id);
        }
        TaskCommands::Move { id, status } => {
            if !store.move_task(id, status).await? {
                bail!("Task {} not found", id);
            }
            println!("➡️ Moved task #{} to {}", id, status);
        }
        TaskCommands::Delete { id } => {
            if !store.delete_task(id).await? {
                bail!("Task {} not found", id);
            }
            println!("🗑️ Deleted task #{}", id);
        }
    }
    Ok(())
}

async fn show_board(project_id: i64, store: &BoardStore) -> Result<()> {
    let Some(project) = store.get_project_by_id(project_id).await? else {
        bail!("Project {} not found", project_id);
    };
    let tasks = store.get_tasks_by_project(project_id).await?;
    print!("{}", render_board(&project, &tasks));
    Ok(())
}

fn build_provider(config: &Config) -> Option<Arc<dyn AnalysisProvider>> {
    let api_key = config.get_api_key()?;
    let provider_name = config.get_provider_name();
    match create_provider(&provider_name, &api_key, &config.provider) {
        Ok(provider) => Some(provider),
        Err(e) => {
            error!("Could not create provider {}: {}", provider_name, e);
            None
        }
    }
}

async fn analyze_project(project_id: i64, store: Arc<BoardStore>, config: &Config) -> Result<()> {
    let provider = build_provider(config);
    if provider.is_none() {
        info!("No usable API key found, analysis will run offline");
    }

    let analyzer = Analyzer::new(
        store,
        Arc::new(ConsoleSink),
        provider,
        config.analyzer_settings(),
    );
    analyzer.select_project(Some(project_id));

    let outcome = analyzer.analyze_current_project().await;
    if let Some(e) = outcome.error() {
        debug!("Analysis of project {} failed: {}", project_id, e);
        return Err(AnalysisFailed.into());
    }
    Ok(())
}

/// Marks an analysis failure that was already reported through the console sink
#[derive(Debug)]
struct AnalysisFailed;

impl std::fmt::Display for AnalysisFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("analysis failed")
    }
}

impl std::error::Error for AnalysisFailed {}

fn handle_config_command(action: &ConfigCommands, config: &Config, db_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let mut shown = config.clone();
            if shown.provider.api_key.is_some() {
                shown.provider.api_key = Some("********".to_string());
            }
            print!(
                "{}",
                toml::to_string_pretty(&shown).context("Failed to render config")?
            );
            let key_source = if config.get_api_key().is_some() {
                "configured"
            } else {
                "missing (offline analysis only)"
            };
            println!("\n# API key: {}", key_source);
            println!("# Database: {}", db_path.display());
        }
        ConfigCommands::Init { force } => {
            let existing = Config::get_config_path();
            if let (Some(path), false) = (&existing, *force) {
                println!("Config already exists at {} (use --force to overwrite)", path.display());
                return Ok(());
            }
            let mut fresh = Config::default();
            fresh.provider.api_key = Some(PLACEHOLDER_API_KEY.to_string());
            let path = fresh.save()?;
            println!("✅ Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
