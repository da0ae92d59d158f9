use anyhow::{Context, Result};
use askdocs_client::{Backend, DocumentStore, HttpBackend, MockBackend, ProjectDirectory};
use askdocs_core::logging::{self, LogGuard, LoggingConfig};
use askdocs_core::{Config, DocumentId, ProjectId, ProjectPatch};
use askdocs_ui::{DocumentPanel, SignalHub};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG: &str = "askdocs.toml";
const DEMO_FIXTURE: &str = include_str!("demo.toml");

/// AskDocs - ask questions about your documents from the terminal
#[derive(Parser, Debug)]
#[command(name = "askdocs")]
#[command(about = "Terminal client for a document question-answering backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to askdocs.toml (default: ./askdocs.toml)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Backend API root, overrides the config file
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Use the built-in offline demo backend
    #[arg(long, global = true)]
    mock: bool,

    /// Mock backend fixture (implies --mock)
    #[arg(long, value_name = "PATH", global = true)]
    fixture: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive chat
    Chat {
        /// Project to open (default: the first one)
        #[arg(short, long, value_name = "ID")]
        project: Option<String>,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    /// Manage the documents of a project
    Docs {
        #[command(subcommand)]
        action: DocCommand,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Rename {
        id: String,
        name: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum DocCommand {
    List {
        #[arg(short, long, value_name = "ID")]
        project: String,
        #[arg(long)]
        json: bool,
    },
    Upload {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(short, long, value_name = "ID")]
        project: String,
    },
    Delete {
        id: String,
        #[arg(short, long, value_name = "ID")]
        project: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print an example askdocs.toml
    Example,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Config { action: ConfigCommand::Example } => {
            print!("{}", Config::example());
            return Ok(());
        }
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "askdocs", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = load_config(&config_path, cli.base_url.as_deref())?;
    let _guard = init_logging(&config, &cli)?;

    if cli.verbose {
        eprintln!("{} Using config: {}", "Info:".blue().bold(), config_path.display());
    }
    let backend = build_backend(&cli, &config)?;

    match cli.command {
        Commands::Chat { project } => cmd_chat(backend, &config, project).await?,
        Commands::Projects { action } => cmd_projects(backend.as_ref(), action).await?,
        Commands::Docs { action } => {
            let store: Arc<dyn DocumentStore> = backend;
            cmd_docs(&DocumentPanel::new(store, SignalHub::default()), action).await?
        }
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

fn load_config(path: &Path, base_url: Option<&str>) -> Result<Config> {
    let config = Config::load_or_default(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    match base_url {
        Some(url) => config.with_base_url(url).context("Invalid --base-url"),
        None => Ok(config),
    }
}

/// The chat owns the terminal, so its logs only go to the log file
fn init_logging(config: &Config, cli: &Cli) -> Result<LogGuard> {
    let mut logging = LoggingConfig::from(config.logging.clone());
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    if matches!(cli.command, Commands::Chat { .. }) {
        logging = logging.file_only();
    }
    logging::init_logging(Some(logging)).context("Failed to initialize logging")
}

fn build_backend(cli: &Cli, config: &Config) -> Result<Arc<dyn Backend>> {
    if let Some(path) = &cli.fixture {
        let mock = MockBackend::from_file(path)
            .with_context(|| format!("Failed to load fixture {}", path.display()))?;
        return Ok(Arc::new(mock));
    }
    if cli.mock {
        return Ok(Arc::new(MockBackend::from_toml_str(DEMO_FIXTURE).context("Invalid demo fixture")?));
    }
    let http = HttpBackend::new(&config.backend).context("Failed to create HTTP client")?;
    tracing::info!(base_url = http.base_url(), "using backend");
    Ok(Arc::new(http))
}

async fn cmd_chat(backend: Arc<dyn Backend>, config: &Config, project: Option<String>) -> Result<()> {
    let projects = backend.list_projects().await.context("Failed to list projects")?;
    let first = projects.first().map(|p| p.id.as_str().to_string());

    let mut app = askdocs_ui::App::new(backend, &config.chat, projects);
    match project.or(first) {
        Some(id) => {
            if !app.open_project(&id) {
                anyhow::bail!("Unknown project '{}'", id);
            }
        }
        None => eprintln!("{} No projects yet. Create one with `askdocs projects create`.", "Info:".yellow().bold()),
    }

    askdocs_ui::app::run(&mut app).await.context("Terminal error")
}

async fn cmd_projects(backend: &dyn Backend, action: ProjectCommand) -> Result<()> {
    match action {
        ProjectCommand::List { json } => {
            let projects = backend.list_projects().await.context("Failed to list projects")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else if projects.is_empty() {
                println!("{}", "No projects".dimmed());
            } else {
                for project in &projects {
                    println!("{}  {}  {}", project.id.cyan(), project.name.bold(), project.description.dimmed());
                }
            }
        }
        ProjectCommand::Create { name, description } => {
            let project = backend.create_project(&name, &description).await.context("Failed to create project")?;
            println!("{} Created project {} ({})", "Success:".green().bold(), project.name, project.id.cyan());
        }
        ProjectCommand::Rename { id, name } => {
            let project = backend
                .update_project(&ProjectId::new(id), &ProjectPatch::rename(name))
                .await
                .context("Failed to rename project")?;
            println!("{} Renamed project {} to {}", "Success:".green().bold(), project.id.cyan(), project.name);
        }
        ProjectCommand::Delete { id } => {
            backend
                .delete_project(&ProjectId::new(id.as_str()))
                .await
                .context("Failed to delete project")?;
            println!("{} Deleted project {}", "Success:".green().bold(), id.cyan());
        }
    }
    Ok(())
}

async fn cmd_docs(panel: &DocumentPanel, action: DocCommand) -> Result<()> {
    match action {
        DocCommand::List { project, json } => {
            let documents = panel
                .list(&ProjectId::new(project))
                .await
                .context("Failed to list documents")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else if documents.is_empty() {
                println!("{}", "No documents".dimmed());
            } else {
                for doc in &documents {
                    println!("{}  {}  {}", doc.id.cyan(), doc.filename, doc.status.dimmed());
                }
            }
        }
        DocCommand::Upload { path, project } => {
            let receipt = panel
                .upload(&path, &ProjectId::new(project))
                .await
                .with_context(|| format!("Failed to upload {}", path.display()))?;
            println!(
                "{} Uploaded {} as {} ({})",
                "Success:".green().bold(),
                path.display(),
                receipt.id.cyan(),
                if receipt.status.is_empty() { "accepted" } else { receipt.status.as_str() }
            );
        }
        DocCommand::Delete { id, project } => {
            panel
                .delete(&DocumentId::new(id.as_str()), &ProjectId::new(project))
                .await
                .context("Failed to delete document")?;
            println!("{} Deleted document {}", "Success:".green().bold(), id.cyan());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn demo() -> MockBackend {
        MockBackend::from_toml_str(DEMO_FIXTURE).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["askdocs", "chat"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.base_url.is_none());
        assert!(!cli.mock);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Chat { project: None }));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["askdocs", "chat", "--project", "p1", "--mock", "-v"]).unwrap();
        assert!(cli.mock);
        assert!(cli.verbose);
        if let Commands::Chat { project } = cli.command {
            assert_eq!(project.as_deref(), Some("p1"));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_docs_upload() {
        let cli = Cli::try_parse_from(["askdocs", "docs", "upload", "faq.md", "--project", "p1"]).unwrap();
        if let Commands::Docs { action: DocCommand::Upload { path, project } } = cli.command {
            assert_eq!(path, PathBuf::from("faq.md"));
            assert_eq!(project, "p1");
        } else {
            panic!("Expected docs upload");
        }
    }

    #[test]
    fn test_cli_docs_require_project() {
        assert!(Cli::try_parse_from(["askdocs", "docs", "list"]).is_err());
    }

    #[test]
    fn test_demo_fixture_parses() {
        assert!(MockBackend::from_toml_str(DEMO_FIXTURE).is_ok());
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("askdocs.toml"), None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_base_url_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("askdocs.toml");
        std::fs::write(&path, Config::example()).unwrap();

        let config = load_config(&path, Some("https://docs.example.com/api")).unwrap();
        assert_eq!(config.backend.base_url, "https://docs.example.com/api");
        assert!(load_config(&path, Some("ftp://nope")).is_err());
    }

    #[test]
    fn test_load_config_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("askdocs.toml");
        std::fs::write(&path, "invalid toml").unwrap();
        assert!(load_config(&path, None).is_err());
    }

    #[test]
    fn test_build_backend_prefers_fixture() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fixture.toml");
        std::fs::write(&path, "[[projects]]\nid = \"x\"\nname = \"X\"\n").unwrap();

        let cli = Cli::try_parse_from(["askdocs", "--fixture", path.to_str().unwrap(), "projects", "list"]).unwrap();
        assert!(build_backend(&cli, &Config::default()).is_ok());
    }

    #[tokio::test]
    async fn test_cmd_projects_roundtrip() {
        let backend = demo();
        cmd_projects(&backend, ProjectCommand::Create { name: "Legal".into(), description: String::new() })
            .await
            .unwrap();
        assert_eq!(backend.list_projects().await.unwrap().len(), 3);

        cmd_projects(&backend, ProjectCommand::Rename { id: "p2".into(), name: "Handbook".into() })
            .await
            .unwrap();
        cmd_projects(&backend, ProjectCommand::Delete { id: "p1".into() }).await.unwrap();
        let names: Vec<_> = backend.list_projects().await.unwrap().into_iter().map(|p| p.name).collect();
        assert!(names.contains(&"Handbook".to_string()));
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_cmd_projects_errors_propagate() {
        let backend = demo();
        let result = cmd_projects(&backend, ProjectCommand::Delete { id: "missing".into() }).await;
        assert!(result.unwrap_err().to_string().contains("Failed to delete project"));
        assert!(cmd_projects(&backend, ProjectCommand::List { json: true }).await.is_ok());
    }

    #[tokio::test]
    async fn test_cmd_docs_upload_and_delete() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("faq.md");
        std::fs::write(&path, "# FAQ").unwrap();

        let backend = Arc::new(demo());
        let hub = SignalHub::default();
        let mut changes = hub.subscribe();
        let panel = DocumentPanel::new(backend.clone(), hub);

        cmd_docs(&panel, DocCommand::Upload { path, project: "p2".into() }).await.unwrap();
        let documents = backend.list_documents(&ProjectId::new("p2")).await.unwrap();
        assert_eq!(documents.len(), 1);

        cmd_docs(&panel, DocCommand::Delete { id: documents[0].id.as_str().to_string(), project: "p2".into() })
            .await
            .unwrap();
        assert!(backend.list_documents(&ProjectId::new("p2")).await.unwrap().is_empty());
        assert!(cmd_docs(&panel, DocCommand::List { project: "p2".into(), json: false }).await.is_ok());

        let changed = askdocs_ui::Signal::DocumentsChanged { project_id: ProjectId::new("p2") };
        assert_eq!(changes.recv().await.unwrap(), changed);
        assert_eq!(changes.recv().await.unwrap(), changed);
    }
}
