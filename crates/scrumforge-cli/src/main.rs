use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "scrumforge")]
#[command(version = "0.1.0")]
#[command(about = "Agent-orchestrated SCRUM execution engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a project's SCRUMForge state directory
    Init {
        /// Project name (derived from the directory name if absent)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Manage backlog stories
    #[command(subcommand)]
    Story(StoryCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Manage bugs
    #[command(subcommand)]
    Bug(BugCommands),

    /// Manage epics
    #[command(subcommand)]
    Epic(EpicCommands),

    /// Manage sprints
    #[command(subcommand)]
    Sprint(SprintCommands),

    /// List registered agents
    Agents {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Manage git worktrees
    Worktree {
        /// Filter by task id
        #[arg(long)]
        task: Option<String>,
    },

    /// Drive the Active sprint to completion
    Run {
        /// Sprint id to run
        sprint: String,
    },

    /// Match and execute a single task outside of a sprint run
    Delegate {
        /// Task id to delegate
        task_id: String,
    },

    /// Show backlog and sprint status
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum StoryCommands {
    /// Create a new story
    Create {
        title: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        want: String,
        #[arg(long)]
        benefit: String,
        #[arg(long = "ac", value_delimiter = ',')]
        acceptance_criteria: Vec<String>,
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// List all stories
    List,
    /// Estimate a story's points (auto-estimates if no value given)
    Estimate {
        story_id: Option<String>,
        #[arg(long)]
        points: Option<u8>,
        /// Estimate every unestimated story in the backlog
        #[arg(long, conflicts_with = "story_id")]
        all: bool,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Create a new task against a story
    Create {
        story_id: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        technical_details: String,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long = "dep", value_delimiter = ',')]
        dependencies: Vec<String>,
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// List all tasks
    List,
    /// Assign an agent to a task
    Assign { task_id: String, agent_name: String },
}

#[derive(Subcommand)]
enum BugCommands {
    /// Report a new bug
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "step", value_delimiter = ',')]
        steps_to_reproduce: Vec<String>,
        #[arg(long, default_value = "")]
        expected: String,
        #[arg(long, default_value = "")]
        actual: String,
        #[arg(long, default_value = "medium")]
        severity: String,
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// List all bugs
    List,
}

#[derive(Subcommand)]
enum EpicCommands {
    /// Create a new epic
    Create {
        title: String,
        #[arg(long, default_value = "")]
        theme: String,
        #[arg(long, default_value = "")]
        business_value: String,
    },
    /// List all epics
    List,
    /// Add a story to an epic's aggregate
    AddStory { epic_id: String, story_id: String },
}

#[derive(Subcommand)]
enum SprintCommands {
    /// Plan a new sprint from the backlog
    Plan {
        name: String,
        goal: String,
        #[arg(long)]
        duration_days: Option<u32>,
    },
    /// Start a Planned sprint
    Start { sprint_id: String },
    /// Complete the Active sprint
    Complete {
        sprint_id: String,
        #[arg(long)]
        retrospective: Option<String>,
    },
    /// List all sprints
    List,
    /// Show a sprint's details
    Show { sprint_id: String },
    /// Report velocity over the last n completed sprints
    Velocity {
        #[arg(default_value_t = 3)]
        n: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    scrumforge_utils::init_logging(log_level);

    match cli.command {
        Commands::Init { name } => commands::init::run(name).await?,
        Commands::Story(cmd) => commands::story::run(cmd).await?,
        Commands::Task(cmd) => commands::task::run(cmd).await?,
        Commands::Bug(cmd) => commands::bug::run(cmd).await?,
        Commands::Epic(cmd) => commands::epic::run(cmd).await?,
        Commands::Sprint(cmd) => commands::sprint::run(cmd).await?,
        Commands::Agents { detailed } => commands::agents::run(detailed).await?,
        Commands::Worktree { task } => commands::worktree::run(task).await?,
        Commands::Run { sprint } => commands::run::run(sprint).await?,
        Commands::Delegate { task_id } => commands::delegate::run(task_id).await?,
        Commands::Status { json } => commands::status::run(json).await?,
    }

    Ok(())
}
