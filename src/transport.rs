use crate::error::Result;
use crate::object_name::ObjectName;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// A local process that can be attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescriptor {
    pub pid: u32,
    pub display_name: String,
}

impl ProcessDescriptor {
    pub fn new(pid: u32, display_name: impl Into<String>) -> Self {
        Self {
            pid,
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t- {}", self.pid, self.display_name)
    }
}

/// Live link to one process's management interface.
#[async_trait]
pub trait MBeanConnection: Send + Sync {
    /// Read one attribute of one resource, as reported by the agent.
    async fn read_attribute(&self, name: &ObjectName, attribute: &str) -> Result<Value>;
}

#[async_trait]
impl<C: MBeanConnection + ?Sized> MBeanConnection for Box<C> {
    async fn read_attribute(&self, name: &ObjectName, attribute: &str) -> Result<Value> {
        (**self).read_attribute(name, attribute).await
    }
}

/// Process-management transport: find processes, activate their management
/// agent and open connections to it.
///
/// Implementations handle the platform details (attach mechanism, agent, wire
/// protocol) while [`crate::ConnectionBroker`] handles target selection.
pub trait Transport {
    type Connection: MBeanConnection;

    /// Enumerate attachable local processes.
    fn list_processes(&self) -> impl Future<Output = Result<Vec<ProcessDescriptor>>> + Send;

    /// Ask the process to start its management agent. Succeeds without doing
    /// anything when the agent is already running.
    fn start_management_agent(&self, pid: u32) -> impl Future<Output = Result<()>> + Send;

    fn is_manageable(&self, pid: u32) -> impl Future<Output = Result<bool>> + Send;

    /// Address the management agent serves on.
    fn service_address(&self, pid: u32) -> impl Future<Output = Result<String>> + Send;

    fn connect(&self, address: &str) -> impl Future<Output = Result<Self::Connection>> + Send;
}
