//! Remedyflow - guided AI workflows for commercial paperwork.
//!
//! Walks you through multi-step generation of credit disputes, negotiable
//! instruments, and affidavits, with a local account and document store.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use remedyflow::ai::{GenerateProvider, GeminiProvider, GenerationClient, OllamaProvider};
use remedyflow::dispute::{self, ReportFile};
use remedyflow::templates;
use remedyflow::workflow::{find_definition, RefusalReason, StepOutcome, WorkflowEngine};
use remedyflow::{
    Config, DocumentKind, FileStore, MemoryStore, SessionError, SessionStore, APP_NAME, VERSION,
};

/// Guided AI workflows for commercial paperwork
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the data directory for accounts and documents
    #[arg(long, global = true, env = "REMEDYFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and run guided workflows
    Workflows {
        /// Workflows operation
        #[command(subcommand)]
        operation: WorkflowsOperation,
    },

    /// Manage the local account
    Account {
        /// Account operation
        #[command(subcommand)]
        operation: AccountOperation,
    },

    /// Manage saved documents
    Docs {
        /// Documents operation
        #[command(subcommand)]
        operation: DocsOperation,
    },

    /// Analyze a credit report and optionally draft a dispute affidavit
    Analyze {
        /// Path to the credit report (.txt or .pdf, up to 5 MB)
        file: PathBuf,

        /// Also draft an affidavit of truth from the analysis
        #[arg(short, long)]
        affidavit: bool,
    },

    /// Browse fill-in document templates
    Templates {
        /// Templates operation
        #[command(subcommand)]
        operation: TemplatesOperation,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Write the current configuration to the global config file
        #[arg(long)]
        init: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Workflows operations.
#[derive(Subcommand)]
enum WorkflowsOperation {
    /// List the workflow catalog
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show a workflow's steps
    Show {
        /// Workflow id
        id: String,
    },

    /// Run a workflow step by step
    Run {
        /// Workflow id
        id: String,

        /// Run only this step (0-based); earlier steps must be completed
        /// within the same invocation, so this is mainly useful for step 0
        #[arg(short, long)]
        step: Option<usize>,

        /// Don't ask before executing each step
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Account operations.
#[derive(Subcommand)]
enum AccountOperation {
    /// Register a new account and sign in
    Register {
        /// Display name
        name: String,

        /// Email address (unique)
        email: String,

        /// Password (prompted interactively when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign in
    Login {
        /// Email address
        email: String,

        /// Password (prompted interactively when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in account
    Whoami,
}

/// Documents operations.
#[derive(Subcommand)]
enum DocsOperation {
    /// List saved documents
    List {
        /// Filter by kind (analysis, affidavit, template, workflow)
        #[arg(short, long)]
        kind: Option<String>,

        /// Case-insensitive search over titles and content
        #[arg(short, long)]
        search: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print a document's content
    Show {
        /// Document id
        id: String,
    },

    /// Edit a document's title and/or content
    Edit {
        /// Document id
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New content
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Delete a document
    Delete {
        /// Document id
        id: String,

        /// Don't ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Write a document to a text file
    Export {
        /// Document id
        id: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

/// Templates operations.
#[derive(Subcommand)]
enum TemplatesOperation {
    /// List available templates
    List,

    /// Print a template's body
    Show {
        /// Template id
        id: String,
    },

    /// Save a copy of a template to your documents
    Save {
        /// Template id
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let config = Config::load()?;
    let data_dir = cli.data_dir.clone();

    match cli.command {
        // Default to the catalog listing
        None => cmd_workflows_list("text")?,
        Some(Commands::Workflows { operation }) => match operation {
            WorkflowsOperation::List { format } => cmd_workflows_list(&format)?,
            WorkflowsOperation::Show { id } => cmd_workflows_show(&id)?,
            WorkflowsOperation::Run { id, step, yes } => {
                cmd_workflows_run(&id, step, yes, data_dir.as_deref(), &config)?;
            }
        },
        Some(Commands::Account { operation }) => {
            cmd_account(operation, data_dir.as_deref(), &config)?;
        }
        Some(Commands::Docs { operation }) => {
            cmd_docs(operation, data_dir.as_deref(), &config)?;
        }
        Some(Commands::Analyze { file, affidavit }) => {
            cmd_analyze(&file, affidavit, data_dir.as_deref(), &config)?;
        }
        Some(Commands::Templates { operation }) => {
            cmd_templates(operation, data_dir.as_deref(), &config)?;
        }
        Some(Commands::Config { path, init }) => {
            cmd_config(path, init)?;
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Open the session store at the configured location.
fn open_session(data_dir: Option<&Path>, config: &Config) -> Result<SessionStore> {
    let store = match data_dir.or(config.general.data_dir.as_deref()) {
        Some(dir) => FileStore::with_root(dir.join("store")),
        None => FileStore::open_default()?,
    };
    Ok(SessionStore::new(Box::new(store)))
}

/// Build the generation gateway from the configured provider choice.
async fn build_gateway(config: &Config) -> Result<Box<dyn GenerateProvider>> {
    let ollama = || {
        OllamaProvider::new()
            .with_base_url(config.ai.ollama.base_url.clone())
            .with_model(config.ai.ollama.model.clone())
    };

    let gateway: Box<dyn GenerateProvider> = match config.ai.provider.as_str() {
        "gemini" => {
            let mut provider = GeminiProvider::new()?;
            if let Some(model) = &config.ai.gemini_model {
                provider = provider.with_model(model.clone());
            }
            Box::new(provider)
        }
        "ollama" => Box::new(ollama()),
        _ => {
            let mut providers: Vec<Box<dyn GenerateProvider>> = Vec::new();
            if let Ok(mut gemini) = GeminiProvider::new() {
                if let Some(model) = &config.ai.gemini_model {
                    gemini = gemini.with_model(model.clone());
                }
                providers.push(Box::new(gemini));
            }
            let ollama = ollama();
            if ollama.is_available().await {
                providers.push(Box::new(ollama));
            }
            Box::new(GenerationClient::with_providers(providers))
        }
    };

    if !gateway.is_available().await {
        anyhow::bail!(
            "No generation provider available.\n\
             Set GEMINI_API_KEY for Gemini, or run Ollama locally."
        );
    }

    Ok(gateway)
}

/// Ask a yes/no question on stdin.
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Take a password from the flag or prompt for it without echo.
fn resolve_password(flag: Option<String>) -> Result<String> {
    match flag {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}

/// List the workflow catalog.
fn cmd_workflows_list(format: &str) -> Result<()> {
    let workflows = remedyflow::workflow::catalog();

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(workflows)?;
            println!("{json}");
        }
        _ => {
            for workflow in workflows {
                println!(
                    "{} [{}] - {} ({} steps)",
                    workflow.id,
                    workflow.category,
                    workflow.name,
                    workflow.step_count()
                );
            }
            println!("\nTotal: {} workflows", workflows.len());
        }
    }

    Ok(())
}

/// Show a workflow's steps.
fn cmd_workflows_show(id: &str) -> Result<()> {
    let Some(workflow) = find_definition(id) else {
        anyhow::bail!("No workflow with id '{id}'. Try 'remedyflow workflows list'.");
    };

    println!("{} [{}]", workflow.name, workflow.category);
    println!("{}\n", workflow.description);
    for (i, step) in workflow.steps.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, step.title, step.id);
        println!("     {}", step.description);
    }

    Ok(())
}

/// Run a workflow step by step.
fn cmd_workflows_run(
    id: &str,
    only_step: Option<usize>,
    yes: bool,
    data_dir: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let gateway = build_gateway(config).await?;
        let mut engine = WorkflowEngine::new(gateway);
        let definition = engine.select(id)?.definition();
        let total = definition.step_count();

        // Auto-save goes through the real session; with auto-save off the
        // engine sees an ephemeral signed-out session instead.
        let mut session = if config.general.auto_save {
            open_session(data_dir, config)?
        } else {
            SessionStore::new(Box::new(MemoryStore::new()))
        };

        println!("{} ({total} steps)", definition.name);
        match session.active_account() {
            Some(account) => println!("Signed in as {} - results will be saved\n", account.email),
            None => println!("Not signed in - results will not be saved\n"),
        }

        let indices: Vec<usize> = match only_step {
            Some(i) => vec![i],
            None => (0..total).collect(),
        };

        for index in indices {
            let title = definition
                .steps
                .get(index)
                .map_or_else(|| format!("step {index}"), |s| s.title.clone());
            println!("[{}/{}] {}", index + 1, total, title);

            if !yes && !confirm("Execute this step?")? {
                println!("Stopped.");
                return Ok(());
            }

            match engine.execute_step(index, &mut session).await {
                StepOutcome::Completed { result } => {
                    println!("\n{result}\n");
                }
                StepOutcome::Failed => {
                    anyhow::bail!(
                        "Step '{title}' failed. Check the provider (-v for details) and re-run."
                    );
                }
                StepOutcome::Refused(reason) => {
                    anyhow::bail!("Step '{title}' was refused: {}", refusal_message(reason));
                }
            }
        }

        if engine.run().is_some_and(remedyflow::workflow::WorkflowRun::is_complete) {
            println!("Workflow complete.");
        }
        Ok(())
    })
}

const fn refusal_message(reason: RefusalReason) -> &'static str {
    match reason {
        RefusalReason::NoRun => "no workflow is selected",
        RefusalReason::OutOfRange => "the step index is out of range",
        RefusalReason::GatingViolated => "the previous step has not completed",
        RefusalReason::Busy => "another step is still executing",
    }
}

/// Handle account commands.
fn cmd_account(operation: AccountOperation, data_dir: Option<&Path>, config: &Config) -> Result<()> {
    let mut session = open_session(data_dir, config)?;

    match operation {
        AccountOperation::Register { name, email, password } => {
            let password = resolve_password(password)?;
            match session.register(&name, &email, &password) {
                Ok(account) => println!("Registered and signed in as {}", account.email),
                Err(SessionError::EmailTaken(email)) => {
                    anyhow::bail!("An account with email '{email}' already exists");
                }
                Err(e) => return Err(e.into()),
            }
        }

        AccountOperation::Login { email, password } => {
            let password = resolve_password(password)?;
            match session.login(&email, &password) {
                Ok(account) => {
                    println!(
                        "Signed in as {} ({} documents)",
                        account.email,
                        session.documents().len()
                    );
                }
                Err(SessionError::InvalidCredentials) => {
                    anyhow::bail!("Invalid email or password");
                }
                Err(e) => return Err(e.into()),
            }
        }

        AccountOperation::Logout => {
            if session.is_active() {
                session.logout()?;
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }

        AccountOperation::Whoami => match session.active_account() {
            Some(account) => {
                println!("{} <{}>", account.name, account.email);
                println!("Registered: {}", account.created_at.format("%Y-%m-%d"));
                println!("Documents:  {}", session.documents().len());
            }
            None => println!("Not signed in"),
        },
    }

    Ok(())
}

/// Handle document commands.
fn cmd_docs(operation: DocsOperation, data_dir: Option<&Path>, config: &Config) -> Result<()> {
    let mut session = open_session(data_dir, config)?;

    match operation {
        DocsOperation::List { kind, search, format } => {
            let kind = match kind {
                Some(label) => Some(DocumentKind::parse(&label).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown kind '{label}'. Use analysis, affidavit, template, or workflow."
                    )
                })?),
                None => None,
            };

            let documents: Vec<_> = match &search {
                Some(term) => session.search_documents(term),
                None => session.documents().iter().collect(),
            };
            let documents: Vec<_> = documents
                .into_iter()
                .filter(|doc| kind.is_none_or(|k| doc.kind == k))
                .collect();

            match format.as_str() {
                "json" => {
                    let json = serde_json::to_string_pretty(&documents)?;
                    println!("{json}");
                }
                _ => {
                    for doc in &documents {
                        println!(
                            "{}  [{}]  {}  (updated {})",
                            doc.id,
                            doc.kind,
                            doc.title,
                            doc.updated_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                    println!("\nTotal: {} documents", documents.len());
                }
            }
        }

        DocsOperation::Show { id } => {
            let Some(doc) = session.find_document(&id) else {
                anyhow::bail!("No document with id '{id}'");
            };
            println!("{}", doc.content);
        }

        DocsOperation::Edit { id, title, content } => {
            let Some(doc) = session.find_document(&id) else {
                anyhow::bail!("No document with id '{id}'");
            };
            if title.is_none() && content.is_none() {
                anyhow::bail!("Nothing to change; pass --title and/or --content");
            }

            let title = title.unwrap_or_else(|| doc.title.clone());
            let content = content.unwrap_or_else(|| doc.content.clone());
            if session.update_document(&id, &title, &content)? {
                println!("Updated '{title}'");
            } else {
                anyhow::bail!("No document with id '{id}'");
            }
        }

        DocsOperation::Delete { id, yes } => {
            let Some(doc) = session.find_document(&id) else {
                anyhow::bail!("No document with id '{id}'");
            };

            if !yes && !confirm(&format!("Delete '{}'?", doc.title))? {
                println!("Cancelled");
                return Ok(());
            }

            if session.delete_document(&id)? {
                println!("Deleted");
            } else {
                anyhow::bail!("No document with id '{id}'");
            }
        }

        DocsOperation::Export { id, out } => {
            match session.export_document(&id, &out)? {
                Some(path) => println!("Wrote {}", path.display()),
                None => anyhow::bail!("No document with id '{id}'"),
            }
        }
    }

    Ok(())
}

/// Analyze a credit report, optionally drafting an affidavit too.
fn cmd_analyze(file: &Path, affidavit: bool, data_dir: Option<&Path>, config: &Config) -> Result<()> {
    let report = ReportFile::load(file)?;
    let mut session = open_session(data_dir, config)?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let gateway = build_gateway(config).await?;

        println!("Analyzing {} ...\n", report.name());
        let analysis = dispute::analyze_report(gateway.as_ref(), &report).await?;
        println!("{analysis}");

        let save = config.general.auto_save && session.is_active();
        if save {
            session.save_document(&dispute::analysis_title(&report), DocumentKind::Analysis, &analysis)?;
        }

        if affidavit {
            println!("\nDrafting affidavit ...\n");
            let draft = dispute::draft_affidavit(gateway.as_ref(), &report, &analysis).await?;
            println!("{draft}");

            if save {
                session.save_document(
                    &dispute::affidavit_title(&report),
                    DocumentKind::Affidavit,
                    &draft,
                )?;
            }
        }

        if save {
            println!("\nSaved to your documents.");
        } else if !session.is_active() {
            println!("\nNot signed in - nothing was saved.");
        }
        Ok(())
    })
}

/// Handle template commands.
fn cmd_templates(
    operation: TemplatesOperation,
    data_dir: Option<&Path>,
    config: &Config,
) -> Result<()> {
    match operation {
        TemplatesOperation::List => {
            for template in templates::templates() {
                println!("{} [{}] - {}", template.id, template.category, template.description);
            }
        }

        TemplatesOperation::Show { id } => {
            let Some(template) = templates::find_template(&id) else {
                anyhow::bail!("No template with id '{id}'. Try 'remedyflow templates list'.");
            };
            println!("{}", template.content);
        }

        TemplatesOperation::Save { id } => {
            let Some(template) = templates::find_template(&id) else {
                anyhow::bail!("No template with id '{id}'. Try 'remedyflow templates list'.");
            };

            let mut session = open_session(data_dir, config)?;
            match session.save_document(&template.name, DocumentKind::Template, &template.content)? {
                Some(doc) => println!("Saved '{}' as document {}", doc.title, doc.id),
                None => anyhow::bail!("Sign in first: 'remedyflow account login <email>'"),
            }
        }
    }

    Ok(())
}

/// Show configuration.
fn cmd_config(show_path: bool, init: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    if init {
        config.save()?;
        if let Some(dir) = Config::config_dir() {
            println!("Wrote {}", dir.join("config.toml").display());
        }
        return Ok(());
    }

    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}
