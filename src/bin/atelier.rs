//! atelier CLI: operator interface to the production floor.

use atelier::attendance::AttendanceRecords;
use atelier::config::Config;
use atelier::engine::{DepartmentFilter, Engine};
use atelier::floor::{AssignOutcome, Floor, FloorConfig};
use atelier::model::*;
use atelier::snapshot::RecordRef;
use atelier::store::JsonFileStore;
use atelier::telemetry::{TelemetryConfig, init_telemetry};
use chrono::Utc;
use clap::{Parser, Subcommand};

type Shop = Floor<JsonFileStore, AttendanceRecords>;

#[derive(Parser)]
#[command(name = "atelier", about = "Production tracking for the workshop floor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Order operations
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Task operations
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Worker operations
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
    /// Station summary and per-worker rows
    Station {
        /// Department name, or "all"
        #[arg(long, default_value = "all")]
        department: String,
    },
    /// Orders grouped by stage
    Board,
    /// Show recorded events
    Events {
        /// Only events after this sequence number
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Accept a new order at the pending stage
    Add {
        title: String,
        /// Client reference
        #[arg(long)]
        client: String,
        /// low | medium | high
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Estimated hours of work
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
    },
    /// Move a pending order onto the design stage
    Start { id: String },
    /// Move an order to its next stage
    Advance { id: String },
    /// Show an order's progress
    Progress { id: String },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Open a task at the order's current stage
    Open { order: String },
}

#[derive(Subcommand)]
enum WorkerAction {
    /// Add a worker to the roster
    Add {
        name: String,
        #[arg(long)]
        department: String,
        /// Register as inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Assign a task (the best eligible one unless --task is given)
    Assign {
        worker: String,
        #[arg(long)]
        task: Option<String>,
    },
    /// Complete the worker's current task
    Complete { worker: String },
    /// Pause the worker's current task
    Pause { worker: String },
    /// Resume a paused task
    Resume { worker: String, task: String },
    /// Show performance figures
    Performance { worker: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig::from_config(&config, "atelier"))?;

    let engine = Engine::new(config.departments()?);
    let attendance = config.attendance()?.unwrap_or_default();
    let store = JsonFileStore::open(&config.store_path).event_limit(config.event_limit);
    let floor = Floor::with_attendance(store, engine, attendance)
        .config(FloorConfig {
            assign_retries: config.assign_retries,
        });

    match cli.command {
        Command::Order { action } => cmd_order(&floor, action).await,
        Command::Task { action } => cmd_task(&floor, action).await,
        Command::Worker { action } => cmd_worker(&floor, action).await,
        Command::Station { department } => cmd_station(&floor, department).await,
        Command::Board => cmd_board(&floor).await,
        Command::Events { since } => cmd_events(&floor, since).await,
    }
}

async fn cmd_order(floor: &Shop, action: OrderAction) -> anyhow::Result<()> {
    match action {
        OrderAction::Add {
            title,
            client,
            priority,
            hours,
        } => {
            let priority: Priority = priority.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let order = floor
                .add_order(Order::new(title, client, priority, Utc::now()).estimated_hours(hours))
                .await?;
            println!("Created: {} ({}, {})", order.id.0, order.title, order.priority);
        }
        OrderAction::Start { id } => {
            let order = floor.start_order(resolve_order(floor, &id).await?).await?;
            println!("Started: {} → {}", order.id, order.stage);
        }
        OrderAction::Advance { id } => {
            let order = floor.advance_order(resolve_order(floor, &id).await?).await?;
            println!("Advanced: {} → {}", order.id, order.stage);
            if let Some(done) = order.completed_at {
                println!("Completed at {}", done.format("%Y-%m-%d %H:%M"));
            }
        }
        OrderAction::Progress { id } => {
            let id = resolve_order(floor, &id).await?;
            let progress = floor.progress(id).await?;
            let order = floor.snapshot().await?.order(id)?.clone();
            println!("{}  {:<10}  {:>3}%", order.id, order.stage.as_str(), progress);
        }
    }
    Ok(())
}

async fn cmd_task(floor: &Shop, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::Open { order } => {
            let task = floor.open_task(resolve_order(floor, &order).await?).await?;
            println!("Opened: {} (order {}, stage {})", task.id.0, task.order_ref, task.stage);
        }
    }
    Ok(())
}

async fn cmd_worker(floor: &Shop, action: WorkerAction) -> anyhow::Result<()> {
    match action {
        WorkerAction::Add {
            name,
            department,
            inactive,
        } => {
            // Reject departments the engine cannot route before they reach the roster.
            floor.engine().departments().stage_for(&department)?;
            let mut worker = Worker::new(name, department);
            worker.is_active = !inactive;
            let worker = floor.upsert_worker(worker).await?;
            println!("Added: {} ({}, {})", worker.id.0, worker.name, worker.department);
        }
        WorkerAction::Assign { worker, task } => {
            let worker = resolve_worker(floor, &worker).await?;
            match task {
                Some(task) => {
                    let task = floor.assign(worker, resolve_task(floor, &task).await?).await?;
                    println!("Assigned: {} → {}", task.id, worker);
                }
                None => match floor.assign_next(worker).await? {
                    AssignOutcome::Assigned(task) => {
                        println!("Assigned: {} ({}) → {}", task.id, task.stage, worker)
                    }
                    AssignOutcome::Idle => println!("Nothing to do for {worker}."),
                },
            }
        }
        WorkerAction::Complete { worker } => {
            let report = floor.complete(resolve_worker(floor, &worker).await?).await?;
            println!("Completed: {}", report.task.id);
            if report.stage_clear {
                println!(
                    "Order {} has no open work at {}; it can be advanced.",
                    report.order, report.task.stage
                );
            }
        }
        WorkerAction::Pause { worker } => {
            let task = floor.pause(resolve_worker(floor, &worker).await?).await?;
            println!("Paused: {}", task.id);
        }
        WorkerAction::Resume { worker, task } => {
            let worker = resolve_worker(floor, &worker).await?;
            let task = floor.resume(worker, resolve_task(floor, &task).await?).await?;
            println!("Resumed: {}", task.id);
        }
        WorkerAction::Performance { worker } => {
            let perf = floor.performance(resolve_worker(floor, &worker).await?).await?;
            let unknown = || "unknown".to_string();
            println!("Worker:      {}", perf.worker);
            println!("Efficiency:  {}", perf.efficiency);
            println!("Completed:   {}/{}", perf.completed_tasks, perf.assigned_tasks);
            println!(
                "Avg hours:   {}",
                perf.avg_hours.map(|h| format!("{h:.1}")).unwrap_or_else(unknown)
            );
            println!(
                "Quality:     {}",
                perf.quality_score.map(|q| q.to_string()).unwrap_or_else(unknown)
            );
        }
    }
    Ok(())
}

async fn cmd_station(floor: &Shop, department: String) -> anyhow::Result<()> {
    let filter: DepartmentFilter = department.parse()?;
    let summary = floor.summary(&filter).await?;
    let rows = floor.station_rows(&filter).await?;

    println!("Station: {}", summary.filter);
    println!(
        "Workers: {} total, {} available, {} busy, {} offline",
        summary.total_workers,
        summary.available_workers,
        summary.busy_workers,
        summary.offline_workers
    );
    println!(
        "Tasks:   {} active, {} pending   Orders waiting: {}",
        summary.active_tasks, summary.pending_tasks, summary.pending_orders
    );

    if rows.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:<8}  {:<20}  {:<12}  {:<9}  {:<8}  ORDER",
        "ID", "NAME", "DEPARTMENT", "STATE", "TASK"
    );
    println!("{}", "-".repeat(80));
    for row in &rows {
        println!(
            "{:<8}  {:<20}  {:<12}  {:<9}  {:<8}  {}",
            row.worker.to_string(),
            row.name,
            row.department,
            row.state.to_string(),
            row.current_task.map(|t| t.to_string()).unwrap_or("-".to_string()),
            row.order_title.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn cmd_board(floor: &Shop) -> anyhow::Result<()> {
    let snapshot = floor.snapshot().await?;
    for column in floor.stage_board().await? {
        println!(
            "{:<10} {:>3}%  {} order(s), {} open task(s)",
            column.stage.as_str(),
            column.progress,
            column.orders.len(),
            column.open_tasks
        );
        for id in &column.orders {
            let order = snapshot.order(*id)?;
            println!("    {}  {:<6}  {}", order.id, order.priority.to_string(), order.title);
        }
    }
    Ok(())
}

async fn cmd_events(floor: &Shop, since: u64) -> anyhow::Result<()> {
    let events = floor.events_since(since).await?;
    if events.is_empty() {
        println!("No events.");
        return Ok(());
    }
    for event in &events {
        println!(
            "{:>6}  {}  {:<15}  {}",
            event.seq,
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.kind.name(),
            serde_json::to_string(&event.kind)?
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Id resolution: full UUID or unique prefix
// ---------------------------------------------------------------------------

async fn resolve(floor: &Shop, id: &str) -> anyhow::Result<RecordRef> {
    let snapshot = floor.snapshot().await?;
    Ok(snapshot.resolve_prefix(id)?)
}

async fn resolve_order(floor: &Shop, id: &str) -> anyhow::Result<OrderId> {
    match resolve(floor, id).await? {
        RecordRef::Order(id) => Ok(id),
        other => anyhow::bail!("'{id}' is not an order ({other:?})"),
    }
}

async fn resolve_task(floor: &Shop, id: &str) -> anyhow::Result<TaskId> {
    match resolve(floor, id).await? {
        RecordRef::Task(id) => Ok(id),
        other => anyhow::bail!("'{id}' is not a task ({other:?})"),
    }
}

async fn resolve_worker(floor: &Shop, id: &str) -> anyhow::Result<WorkerId> {
    match resolve(floor, id).await? {
        RecordRef::Worker(id) => Ok(id),
        other => anyhow::bail!("'{id}' is not a worker ({other:?})"),
    }
}
