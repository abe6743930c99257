//! Transport for local HotSpot JVMs: `jps`-style discovery, the dynamic attach
//! protocol, and a Jolokia agent as the management interface.

use crate::attach::{AttachClient, list_java_processes, parse_properties};
use crate::error::{MonitorError, Result};
use crate::jolokia::{DEFAULT_REQUEST_TIMEOUT, JolokiaConnection};
use crate::transport::{ProcessDescriptor, Transport};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// System property the Jolokia agent sets to its own URL once started.
pub const AGENT_URL_PROPERTY: &str = "jolokia.agent";

/// Bind the agent on loopback, on any free port.
pub const DEFAULT_AGENT_OPTIONS: &str = "host=127.0.0.1,port=0";

pub const DEFAULT_TMP_DIR: &str = "/tmp";

#[derive(Debug, Clone)]
pub struct HotspotConfig {
    /// Temp directory of the JVMs, holding `hsperfdata_*` and attach sockets.
    pub tmp_dir: PathBuf,
    /// Jolokia JVM agent jar loaded into targets that don't run it yet.
    pub agent_jar: Option<PathBuf>,
    pub agent_options: String,
    pub attach_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            agent_jar: None,
            agent_options: DEFAULT_AGENT_OPTIONS.to_string(),
            attach_timeout: crate::attach::socket::DEFAULT_ATTACH_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub struct HotspotTransport {
    config: HotspotConfig,
    attach: AttachClient,
}

impl HotspotTransport {
    pub fn new(config: HotspotConfig) -> Self {
        let attach = AttachClient::new(&config.tmp_dir, config.attach_timeout);
        Self { config, attach }
    }

    async fn system_properties(&self, pid: u32) -> Result<HashMap<String, String>> {
        let output = self.attach.execute(pid, "properties", &[]).await?;
        Ok(parse_properties(&output))
    }

    async fn agent_url(&self, pid: u32) -> Result<Option<String>> {
        Ok(self.system_properties(pid).await?.remove(AGENT_URL_PROPERTY))
    }
}

impl Transport for HotspotTransport {
    type Connection = JolokiaConnection;

    async fn list_processes(&self) -> Result<Vec<ProcessDescriptor>> {
        Ok(list_java_processes(&self.config.tmp_dir)?)
    }

    async fn start_management_agent(&self, pid: u32) -> Result<()> {
        if let Some(url) = self.agent_url(pid).await? {
            tracing::debug!("Agent of {} already running at {}", pid, url);
            return Ok(());
        }

        let Some(jar) = &self.config.agent_jar else {
            return Err(MonitorError::AgentUnavailable {
                pid,
                message: "no Jolokia agent running and no agent jar given (--agent-jar)"
                    .to_string(),
            });
        };

        tracing::info!("Loading agent {} into {}", jar.display(), pid);
        let agent = format!("{}={}", jar.display(), self.config.agent_options);
        let output = self
            .attach
            .execute(pid, "load", &["instrument", "false", agent.as_str()])
            .await?;

        // The agent's return code, bare on older JVMs.
        let code = output.trim();
        let code = code.strip_prefix("return code:").unwrap_or(code).trim();
        match code.parse::<i32>() {
            Ok(0) | Err(_) => Ok(()),
            Ok(code) => Err(MonitorError::AgentUnavailable {
                pid,
                message: format!("agent failed to start, return code {}", code),
            }),
        }
    }

    async fn is_manageable(&self, pid: u32) -> Result<bool> {
        Ok(self.agent_url(pid).await?.is_some())
    }

    async fn service_address(&self, pid: u32) -> Result<String> {
        self.agent_url(pid)
            .await?
            .ok_or(MonitorError::NotManageable { pid })
    }

    async fn connect(&self, address: &str) -> Result<JolokiaConnection> {
        JolokiaConnection::connect(address, self.config.request_timeout).await
    }
}
