//! Command-line host for the todo data layer
//!
//! Wires the task repository to a file-backed local store and either the
//! simulated or an HTTP network store, then runs one command.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_core::task::{
    BlockingDispatcher, DefaultTaskRepository, FileTaskDao, HttpNetworkSource, NetworkDataSource,
    SimulatedNetworkSource, Task, TaskRepository, TokioScope,
};
use todo_core::DataConfig;

#[derive(Parser)]
#[command(name = "todo", about = "Manage tasks kept in sync with a remote store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a task
    Add {
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Change the title and description of a task
    Edit {
        id: String,
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// List all tasks
    List {
        /// Refresh from the network first
        #[arg(long)]
        refresh: bool,
    },
    /// Show one task
    Show {
        id: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Mark a task as completed
    Complete { id: String },
    /// Mark a task as active
    Activate { id: String },
    /// Delete one task
    Delete { id: String },
    /// Delete every completed task
    ClearCompleted,
    /// Delete every task
    DeleteAll,
    /// Replace local tasks with the network's tasks
    Refresh,
    /// Print the task list every time it changes
    Watch,
}

fn print_task(task: &Task) {
    let mark = if task.is_completed { "[x]" } else { "[ ]" };
    println!("{} {} {}", mark, task.id, task.title_for_list());
}

async fn build_network(config: &DataConfig) -> Result<Arc<dyn NetworkDataSource>> {
    let network: Arc<dyn NetworkDataSource> = match &config.remote_url {
        Some(url) => {
            tracing::info!("Using remote task service at {}", url);
            Arc::new(HttpNetworkSource::new(url.clone()))
        }
        None => Arc::new(
            SimulatedNetworkSource::persistent(config.network_path(), config.network_latency)
                .await
                .context("Failed to open simulated network store")?,
        ),
    };
    Ok(network)
}

/// Print every emission of `stream` until it ends or `shutdown` resolves.
/// Returns the number of emissions printed.
async fn watch_tasks<S>(
    mut stream: BoxStream<'static, todo_core::Result<Vec<Task>>>,
    shutdown: S,
) -> Result<usize>
where
    S: Future,
{
    tokio::pin!(shutdown);
    let mut emissions = 0;
    loop {
        tokio::select! {
            next = stream.next() => {
                let Some(tasks) = next else { break };
                let tasks = tasks?;
                println!("--- {} tasks", tasks.len());
                for task in &tasks {
                    print_task(task);
                }
                emissions += 1;
            }
            _ = &mut shutdown => break,
        }
    }
    Ok(emissions)
}

async fn run(repository: &DefaultTaskRepository, command: Command) -> Result<()> {
    match command {
        Command::Add { title, description } => {
            let task = repository.create_task(&title, &description).await?;
            print_task(&task);
        }
        Command::Edit {
            id,
            title,
            description,
        } => repository.update_task(&id, &title, &description).await?,
        Command::List { refresh } => {
            for task in repository.get_tasks(refresh).await? {
                print_task(&task);
            }
        }
        Command::Show { id, refresh } => match repository.get_task(&id, refresh).await? {
            Some(task) => {
                print_task(&task);
                if !task.description.is_empty() {
                    println!("    {}", task.description);
                }
            }
            None => println!("No task with id {}", id),
        },
        Command::Complete { id } => repository.complete_task(&id).await?,
        Command::Activate { id } => repository.activate_task(&id).await?,
        Command::Delete { id } => repository.delete_task(&id).await?,
        Command::ClearCompleted => repository.clear_completed_tasks().await?,
        Command::DeleteAll => repository.delete_all_tasks().await?,
        Command::Refresh => repository.refresh().await?,
        Command::Watch => {
            watch_tasks(repository.get_tasks_stream(), tokio::signal::ctrl_c()).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_cli=info,todo_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DataConfig::from_env();
    tracing::debug!("Using data directory: {:?}", config.data_dir);

    let dao = if config.persist {
        FileTaskDao::open(config.tasks_path())
            .await
            .context("Failed to open local task store")?
    } else {
        FileTaskDao::in_memory()
    };
    let network = build_network(&config).await?;
    let scope = Arc::new(TokioScope::new());
    let repository =
        DefaultTaskRepository::new(network, Arc::new(dao), BlockingDispatcher, scope.clone());

    let result = run(&repository, cli.command).await;

    // Let pending network saves finish before the runtime shuts down
    scope.drain().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_watch_stops_on_shutdown_between_emissions() {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let tasks: BoxStream<'static, todo_core::Result<Vec<Task>>> =
            stream::iter(vec![Ok(vec![Task::new("a", "A")]), Ok(Vec::new())])
                .chain(stream::pending())
                .boxed();

        let watcher = tokio::spawn(watch_tasks(tasks, stop_rx));
        tokio::task::yield_now().await;
        stop_tx.send(()).unwrap();

        let emissions = watcher.await.unwrap().unwrap();
        assert_eq!(emissions, 2);
    }

    #[tokio::test]
    async fn test_watch_ends_with_stream() {
        let tasks: BoxStream<'static, todo_core::Result<Vec<Task>>> =
            stream::iter(vec![Ok(Vec::new())]).boxed();
        let emissions = watch_tasks(tasks, std::future::pending::<()>()).await.unwrap();
        assert_eq!(emissions, 1);
    }

    #[tokio::test]
    async fn test_watch_surfaces_stream_errors() {
        let tasks: BoxStream<'static, todo_core::Result<Vec<Task>>> =
            stream::iter(vec![Err(todo_core::Error::Storage("gone".into()))]).boxed();
        let result = watch_tasks(tasks, std::future::pending::<()>()).await;
        assert!(result.is_err());
    }
}
