use crate::error::{MonitorError, Result};
use crate::transport::{ProcessDescriptor, Transport};

/// Substring of the display name of a Tomcat server JVM.
pub const TOMCAT_BOOTSTRAP_MARKER: &str = "org.apache.catalina.startup.Bootstrap";

/// Picks the target process and hands back a validated connection to it.
pub struct ConnectionBroker<T> {
    transport: T,
    marker: String,
}

impl<T: Transport> ConnectionBroker<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            marker: TOMCAT_BOOTSTRAP_MARKER.to_string(),
        }
    }

    /// Use a different display name substring to pick a target when no pid is
    /// given.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the target process, start its management agent and connect.
    ///
    /// Every failure here is final: there is no retry, and the returned error
    /// carries the candidate processes so the caller can list them.
    pub async fn resolve_target(&self, explicit_pid: Option<u32>) -> Result<T::Connection> {
        let candidates = self.transport.list_processes().await?;
        tracing::debug!("Found {} attachable processes", candidates.len());

        let pid = match explicit_pid {
            Some(pid) => Some(pid),
            None => self.match_marker(&candidates)?,
        };

        let descriptor = pid
            .and_then(|pid| candidates.iter().find(|c| c.pid == pid))
            .cloned();
        let Some(descriptor) = descriptor else {
            return Err(MonitorError::TargetNotFound { pid, candidates });
        };

        let pid = descriptor.pid;
        tracing::info!("Attaching to {}: {}", pid, descriptor.display_name);
        self.transport.start_management_agent(pid).await?;
        if !self.transport.is_manageable(pid).await? {
            return Err(MonitorError::NotManageable { pid });
        }

        let address = self.transport.service_address(pid).await?;
        tracing::info!("Connecting to management agent at {}", address);
        let connection = self.transport.connect(&address).await?;
        tracing::info!("Connected to {}: {}", pid, descriptor.display_name);
        Ok(connection)
    }

    /// Pick the single candidate whose display name contains the marker.
    ///
    /// `Ok(None)` means nothing matched; several matches is an error rather
    /// than an arbitrary pick.
    fn match_marker(&self, candidates: &[ProcessDescriptor]) -> Result<Option<u32>> {
        tracing::info!("Looking for a process matching {:?}...", self.marker);
        let matches: Vec<ProcessDescriptor> = candidates
            .iter()
            .filter(|c| c.display_name.contains(&self.marker))
            .cloned()
            .collect();

        match matches.as_slice() {
            [] => {
                tracing::warn!("Didn't find any process matching {:?}", self.marker);
                Ok(None)
            }
            [only] => {
                tracing::info!("Found matching process with pid {}", only.pid);
                Ok(Some(only.pid))
            }
            _ => Err(MonitorError::AmbiguousTarget {
                marker: self.marker.clone(),
                matches,
            }),
        }
    }
}
