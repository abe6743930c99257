use crate::transport::ProcessDescriptor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Malformed object name {name:?}: {reason}")]
    MalformedObjectName { name: String, reason: &'static str },

    #[error("{}", target_not_found_message(.pid))]
    TargetNotFound {
        pid: Option<u32>,
        candidates: Vec<ProcessDescriptor>,
    },

    #[error("Found {} processes matching {marker:?}, pass --pid to choose one", .matches.len())]
    AmbiguousTarget {
        marker: String,
        matches: Vec<ProcessDescriptor>,
    },

    #[error("Process {pid} is not manageable")]
    NotManageable { pid: u32 },

    #[error("Cannot attach to process {pid}: {message}")]
    Attach { pid: u32, message: String },

    #[error("Management agent unavailable for process {pid}: {message}")]
    AgentUnavailable { pid: u32, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Reading {object_name}/{attribute} failed: {error_type}: {message}")]
    Fetch {
        object_name: String,
        attribute: String,
        error_type: String,
        message: String,
    },

    #[error("Cannot extract {key:?} from a {found} value")]
    Extraction { key: String, found: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

fn target_not_found_message(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!("pid {} not found", pid),
        None => "No target process found".to_string(),
    }
}

impl MonitorError {
    /// Candidate processes worth showing to the operator alongside this error.
    pub fn candidates(&self) -> &[ProcessDescriptor] {
        match self {
            MonitorError::TargetNotFound { candidates, .. } => candidates,
            MonitorError::AmbiguousTarget { matches, .. } => matches,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
