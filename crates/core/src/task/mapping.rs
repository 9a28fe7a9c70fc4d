//! Conversions between the external task and its local and network records
//!
//! All conversions are pure. Field naming differences between the three
//! forms are resolved here and nowhere else.

use super::local::LocalTask;
use super::model::Task;
use super::network::{NetworkTask, NetworkTaskStatus};

impl From<LocalTask> for Task {
    fn from(local: LocalTask) -> Self {
        Self {
            id: local.id,
            title: local.title,
            description: local.description,
            is_completed: local.is_completed,
        }
    }
}

impl From<Task> for LocalTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            is_completed: task.is_completed,
        }
    }
}

impl From<NetworkTask> for LocalTask {
    fn from(network: NetworkTask) -> Self {
        Self {
            id: network.id,
            title: network.title,
            description: network.short_description,
            is_completed: network.status == NetworkTaskStatus::Complete,
        }
    }
}

impl From<LocalTask> for NetworkTask {
    fn from(local: LocalTask) -> Self {
        Self {
            id: local.id,
            title: local.title,
            short_description: local.description,
            priority: 0,
            status: NetworkTaskStatus::from_completed(local.is_completed),
        }
    }
}

impl From<NetworkTask> for Task {
    fn from(network: NetworkTask) -> Self {
        LocalTask::from(network).into()
    }
}

impl From<Task> for NetworkTask {
    fn from(task: Task) -> Self {
        LocalTask::from(task).into()
    }
}

/// Map local rows to external tasks
pub fn to_external(tasks: Vec<LocalTask>) -> Vec<Task> {
    tasks.into_iter().map(Task::from).collect()
}

/// Map network records to local rows
pub fn to_local(tasks: Vec<NetworkTask>) -> Vec<LocalTask> {
    tasks.into_iter().map(LocalTask::from).collect()
}

/// Map local rows to network records
pub fn to_network(tasks: Vec<LocalTask>) -> Vec<NetworkTask> {
    tasks.into_iter().map(NetworkTask::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_to_network_renames_fields() {
        let local = LocalTask {
            id: "a".to_string(),
            title: "Title".to_string(),
            description: "Desc".to_string(),
            is_completed: true,
        };

        let network = NetworkTask::from(local);
        assert_eq!(network.short_description, "Desc");
        assert_eq!(network.status, NetworkTaskStatus::Complete);
        assert_eq!(network.priority, 0);
    }

    #[test]
    fn test_network_to_local_reads_status() {
        let network = NetworkTask {
            id: "a".to_string(),
            title: "Title".to_string(),
            short_description: "Desc".to_string(),
            priority: 3,
            status: NetworkTaskStatus::Active,
        };

        let local = LocalTask::from(network);
        assert_eq!(local.description, "Desc");
        assert!(!local.is_completed);
    }

    #[test]
    fn test_task_survives_trip_through_network_form() {
        let task = Task::new("a", "Title")
            .with_description("Desc")
            .with_completed(true);
        let back = Task::from(NetworkTask::from(task.clone()));
        assert_eq!(back, task);
    }

    #[test]
    fn test_bulk_helpers_preserve_order() {
        let rows = vec![
            LocalTask::from(Task::new("a", "A")),
            LocalTask::from(Task::new("b", "B")),
        ];
        let ids: Vec<String> = to_external(rows.clone()).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let back = to_local(to_network(rows.clone()));
        assert_eq!(back, rows);
    }
}
