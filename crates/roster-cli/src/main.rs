//! Roster CLI - members, teams and dynamic member search

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_core::config::Config;
use roster_core::domain::member::{Member, MemberRepository, NewMember, Team, TeamRepository};
use roster_core::domain::search::{
    CountPolicy, MemberSearchCondition, MemberSearchService, MemberTeamDto, Page, PageRequest,
    SortKey, SortOrder,
};
use roster_core::error::Error;
use roster_core::storage::Database;
use serde_json::json;
use tracing::debug;

#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about = "Member and team roster with dynamic search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Database file (overrides database.path from the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage teams
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Manage members
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Search members joined with their team
    Search(SearchArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum TeamAction {
    /// Create a team
    Add { name: String },
    /// List all teams
    List,
    /// Show a team and its members
    Show { id: i64 },
    /// Delete a team (its members become teamless)
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum MemberAction {
    /// Create a member
    Add {
        username: String,
        #[arg(short, long, default_value_t = 0)]
        age: i32,
        /// Team id to join
        #[arg(short, long)]
        team: Option<i64>,
    },
    /// Show member details
    Show { id: i64 },
    /// List members
    List {
        /// Only members with exactly this username
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Move a member to another team, or out of any team when --team is omitted
    Move {
        id: i64,
        #[arg(short, long)]
        team: Option<i64>,
    },
    /// Delete a member
    Delete { id: i64 },
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Exact username
    #[arg(long)]
    username: Option<String>,
    /// Exact team name
    #[arg(long)]
    team: Option<String>,
    /// Minimum age (inclusive)
    #[arg(long)]
    age_goe: Option<i32>,
    /// Maximum age (inclusive)
    #[arg(long)]
    age_loe: Option<i32>,
    /// Rows to skip; enables paging
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i64>,
    /// Page size; enables paging (defaults to search.default_limit)
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,
    /// Sort key (username, age, team_name, member_id)
    #[arg(long)]
    sort: Option<String>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,
    /// Always run the count query for pages
    #[arg(long)]
    forced_count: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("roster=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let out = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Config { action } => cmd_config(action, out),
        command => run_with_database(command, cli.db, out).await,
    }
}

async fn run_with_database(
    command: Commands,
    db_path: Option<PathBuf>,
    out: Output,
) -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| Error::ConfigError(format!("{e:#}")))?;
    let db = open_database(&config, db_path).await?;

    let result = match command {
        Commands::Team { action } => cmd_team(&db, action, out).await,
        Commands::Member { action } => cmd_member(&db, action, out).await,
        Commands::Search(args) => cmd_search(&db, &config, args, out).await,
        Commands::Doctor => cmd_doctor(&db, out).await,
        Commands::Config { action } => cmd_config(action, out),
    };

    db.close().await;
    result
}

async fn open_database(config: &Config, path: Option<PathBuf>) -> anyhow::Result<Database> {
    let mut settings = config.database.clone();
    if let Some(path) = path {
        settings.path = path;
    }
    debug!(path = %settings.path.display(), "Opening roster database");
    Database::new(settings.to_database_config()).await
}

#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn json(&self, value: &serde_json::Value) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn note(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_team(db: &Database, action: TeamAction, out: Output) -> anyhow::Result<()> {
    let teams = TeamRepository::new(db.pool().clone());

    match action {
        TeamAction::Add { name } => {
            let team = teams.save(&name).await?;
            if out.is_json() {
                return out.json(&json!(team));
            }
            out.note(&format!("Team created: {} ({})", team.name, team.id));
        }
        TeamAction::List => {
            let all = teams.find_all().await?;
            if out.is_json() {
                return out.json(&json!(all));
            }
            if all.is_empty() {
                out.note("No teams found.");
                out.note("\nCreate one with: roster team add <name>");
            } else {
                out.note("Teams:");
                for team in &all {
                    println!("{}", team_line(team));
                }
            }
        }
        TeamAction::Show { id } => {
            let found = teams
                .find_with_members(id)
                .await?
                .ok_or(Error::TeamNotFound(id))?;
            if out.is_json() {
                return out.json(&json!(found));
            }
            println!("Team: {}", found.team.name);
            println!("  ID: {}", found.team.id);
            println!("  Members: {}", found.len());
            for member_id in &found.member_ids {
                println!("    - {}", member_id);
            }
            println!(
                "  Created: {}",
                found.team.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        TeamAction::Delete { id } => {
            if !teams.delete(id).await? {
                return Err(Error::TeamNotFound(id).into());
            }
            if out.is_json() {
                return out.json(&json!({ "deleted": id }));
            }
            out.note(&format!("Team {} deleted.", id));
        }
    }
    Ok(())
}

async fn cmd_member(db: &Database, action: MemberAction, out: Output) -> anyhow::Result<()> {
    let members = MemberRepository::new(db.pool().clone());

    match action {
        MemberAction::Add {
            username,
            age,
            team,
        } => {
            let mut new_member = NewMember::new(username).with_age(age);
            if let Some(team_id) = team {
                new_member = new_member.in_team(team_id);
            }
            let member = members.save(&new_member).await?;
            if out.is_json() {
                return out.json(&json!(member));
            }
            out.note(&format!(
                "Member created: {} ({})",
                member.username, member.id
            ));
        }
        MemberAction::Show { id } => {
            let member = members.get(id).await?;
            if out.is_json() {
                return out.json(&json!(member));
            }
            println!("Member: {}", member.username);
            println!("  ID: {}", member.id);
            println!("  Age: {}", member.age);
            match member.team_id {
                Some(team_id) => println!("  Team: {}", team_id),
                None => println!("  Team: -"),
            }
            println!(
                "  Created: {}",
                member.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        MemberAction::List { username } => {
            let found = match username {
                Some(name) => members.find_by_username(&name).await?,
                None => members.find_all().await?,
            };
            if out.is_json() {
                return out.json(&json!(found));
            }
            if found.is_empty() {
                out.note("No members found.");
            } else {
                out.note("Members:");
                for member in &found {
                    println!("{}", member_line(member));
                }
            }
        }
        MemberAction::Move { id, team } => {
            let member = members.change_team(id, team).await?;
            if out.is_json() {
                return out.json(&json!(member));
            }
            match member.team_id {
                Some(team_id) => out.note(&format!("Member {} moved to team {}.", id, team_id)),
                None => out.note(&format!("Member {} no longer belongs to a team.", id)),
            }
        }
        MemberAction::Delete { id } => {
            if !members.delete(id).await? {
                return Err(Error::MemberNotFound(id).into());
            }
            if out.is_json() {
                return out.json(&json!({ "deleted": id }));
            }
            out.note(&format!("Member {} deleted.", id));
        }
    }
    Ok(())
}

async fn cmd_search(
    db: &Database,
    config: &Config,
    args: SearchArgs,
    out: Output,
) -> anyhow::Result<()> {
    let service = MemberSearchService::new(db.pool().clone());
    let condition = search_condition(&args);
    let sort = sort_order(&args)?;

    if args.offset.is_none() && args.limit.is_none() {
        let rows = match sort {
            Some(sort) => service.search_sorted(&condition, sort).await?,
            None => service.search(&condition).await?,
        };
        if out.is_json() {
            return out.json(&json!(rows));
        }
        print_rows(&rows, out);
        return Ok(());
    }

    let mut request = PageRequest::new(
        args.offset.unwrap_or(0),
        args.limit.unwrap_or(config.search.default_limit),
    )?;
    if let Some(sort) = sort {
        request = request.with_sort(sort);
    }

    let policy = if args.forced_count {
        CountPolicy::Always
    } else {
        config.search.count_policy
    };
    let page = service.search_page_with(&condition, &request, policy).await?;

    if out.is_json() {
        return out.json(&json!(page));
    }
    print_page(&page, out);
    Ok(())
}

fn search_condition(args: &SearchArgs) -> MemberSearchCondition {
    let mut condition = MemberSearchCondition::new();
    if let Some(username) = &args.username {
        condition = condition.with_username(username.clone());
    }
    if let Some(team) = &args.team {
        condition = condition.with_team_name(team.clone());
    }
    if let Some(age) = args.age_goe {
        condition = condition.with_age_goe(age);
    }
    if let Some(age) = args.age_loe {
        condition = condition.with_age_loe(age);
    }
    condition
}

fn sort_order(args: &SearchArgs) -> anyhow::Result<Option<SortOrder>> {
    let Some(raw) = &args.sort else {
        return Ok(None);
    };
    let key = SortKey::parse(raw).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "unknown sort key '{}'. Valid options: username, age, team_name, member_id",
            raw
        ))
    })?;
    Ok(Some(if args.desc {
        SortOrder::desc(key)
    } else {
        SortOrder::asc(key)
    }))
}

fn print_rows(rows: &[MemberTeamDto], out: Output) {
    if rows.is_empty() {
        out.note("No matching members.");
        return;
    }
    for row in rows {
        println!("{}", row_line(row));
    }
}

fn print_page(page: &Page<MemberTeamDto>, out: Output) {
    print_rows(&page.items, out);
    out.note(&format!(
        "\nShowing {} of {} (offset {}, limit {}, page {}/{})",
        page.len(),
        page.total,
        page.offset,
        page.limit,
        page.page_number() + 1,
        page.total_pages().max(1)
    ));
}

fn team_line(team: &Team) -> String {
    format!("  {} - {}", team.id, team.name)
}

fn member_line(member: &Member) -> String {
    let team = member
        .team_id
        .map(|id| format!(" [team {}]", id))
        .unwrap_or_default();
    format!(
        "  {} - {} (age {}){}",
        member.id, member.username, member.age, team
    )
}

fn row_line(row: &MemberTeamDto) -> String {
    format!(
        "  {} - {} (age {}) {}",
        row.member_id,
        row.username,
        row.age,
        row.team_name.as_deref().unwrap_or("-")
    )
}

fn cmd_config(action: ConfigAction, out: Output) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            out.note(&format!("Set {} = {}", key, value));
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            if out.is_json() {
                let map: serde_json::Map<String, serde_json::Value> = items
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::String(value)))
                    .collect();
                return out.json(&serde_json::Value::Object(map));
            }
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            out.note("Configuration reset to defaults.");
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(db: &Database, out: Output) -> anyhow::Result<()> {
    db.health_check().await?;
    let status = db.migration_status().await?;
    let members = MemberRepository::new(db.pool().clone()).count().await?;

    if out.is_json() {
        return out.json(&json!({
            "database": db.path().display().to_string(),
            "schema_version": status.current_version,
            "target_version": status.target_version,
            "needs_migration": status.needs_migration,
            "members": members,
        }));
    }

    out.note("Roster Health Check");
    out.note("===================");
    println!("[OK] Database: {}", db.path().display());
    if status.needs_migration {
        println!(
            "[!!] Schema: v{} (latest is v{})",
            status.current_version, status.target_version
        );
    } else {
        println!("[OK] Schema: v{}", status.current_version);
    }
    println!("[OK] Members: {}", members);
    Ok(())
}
