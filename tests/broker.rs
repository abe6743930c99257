use async_trait::async_trait;
use jmx_monitor::{
    ConnectionBroker, MBeanConnection, MonitorError, ObjectName, ProcessDescriptor, Result,
    TOMCAT_BOOTSTRAP_MARKER, Transport,
};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct FakeConnection {
    address: String,
}

#[async_trait]
impl MBeanConnection for FakeConnection {
    async fn read_attribute(&self, _name: &ObjectName, _attribute: &str) -> Result<Value> {
        Ok(Value::Null)
    }
}

#[derive(Default)]
struct FakeTransport {
    processes: Vec<ProcessDescriptor>,
    unmanageable: bool,
    fail_connect: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn with_processes(processes: &[(u32, &str)]) -> Self {
        Self {
            processes: processes
                .iter()
                .map(|(pid, name)| ProcessDescriptor::new(*pid, *name))
                .collect(),
            ..Default::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    type Connection = FakeConnection;

    async fn list_processes(&self) -> Result<Vec<ProcessDescriptor>> {
        self.record("list".to_string());
        Ok(self.processes.clone())
    }

    async fn start_management_agent(&self, pid: u32) -> Result<()> {
        self.record(format!("start {pid}"));
        Ok(())
    }

    async fn is_manageable(&self, pid: u32) -> Result<bool> {
        self.record(format!("manageable {pid}"));
        Ok(!self.unmanageable)
    }

    async fn service_address(&self, pid: u32) -> Result<String> {
        Ok(format!("http://127.0.0.1:8778/jolokia/{pid}"))
    }

    async fn connect(&self, address: &str) -> Result<FakeConnection> {
        if self.fail_connect {
            return Err(MonitorError::Transport("connection refused".to_string()));
        }
        Ok(FakeConnection {
            address: address.to_string(),
        })
    }
}

const TOMCAT: &str = "org.apache.catalina.startup.Bootstrap start";

async fn resolve(
    transport: FakeTransport,
    pid: Option<u32>,
) -> (Result<FakeConnection>, Vec<String>) {
    let broker = ConnectionBroker::new(transport);
    let result = tokio::time::timeout(Duration::from_secs(5), broker.resolve_target(pid))
        .await
        .expect("broker must not hang");
    (result, broker.transport().calls())
}

#[tokio::test]
async fn single_heuristic_match_is_selected() {
    let transport = FakeTransport::with_processes(&[(10, "sun.tools.jps.Jps"), (20, TOMCAT)]);
    let (result, calls) = resolve(transport, None).await;

    assert_eq!(result.unwrap().address, "http://127.0.0.1:8778/jolokia/20");
    assert_eq!(calls, vec!["list", "start 20", "manageable 20"]);
}

#[tokio::test]
async fn no_heuristic_match_is_not_found() {
    let transport = FakeTransport::with_processes(&[(10, "com.example.Main"), (11, "app.jar")]);
    let (result, calls) = resolve(transport, None).await;

    match result.unwrap_err() {
        MonitorError::TargetNotFound { pid, candidates } => {
            assert_eq!(pid, None);
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(calls, vec!["list"]);
}

#[tokio::test]
async fn several_heuristic_matches_fail_without_guessing() {
    let transport =
        FakeTransport::with_processes(&[(10, TOMCAT), (11, "com.example.Main"), (12, TOMCAT)]);
    let (result, calls) = resolve(transport, None).await;

    let err = result.unwrap_err();
    let pids: Vec<u32> = err.candidates().iter().map(|c| c.pid).collect();
    assert_eq!(pids, vec![10, 12]);
    assert!(matches!(
        err,
        MonitorError::AmbiguousTarget { ref marker, .. } if marker == TOMCAT_BOOTSTRAP_MARKER
    ));
    assert_eq!(calls, vec!["list"]);
}

#[tokio::test]
async fn explicit_pid_skips_heuristic() {
    let transport =
        FakeTransport::with_processes(&[(10, TOMCAT), (11, "com.example.Main"), (12, TOMCAT)]);
    let (result, calls) = resolve(transport, Some(11)).await;

    assert_eq!(result.unwrap().address, "http://127.0.0.1:8778/jolokia/11");
    assert_eq!(calls, vec!["list", "start 11", "manageable 11"]);
}

#[tokio::test]
async fn unknown_explicit_pid_lists_all_candidates() {
    let transport = FakeTransport::with_processes(&[(10, TOMCAT), (11, "com.example.Main")]);
    let (result, _) = resolve(transport, Some(99)).await;

    match result.unwrap_err() {
        MonitorError::TargetNotFound { pid, candidates } => {
            assert_eq!(pid, Some(99));
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn custom_marker() {
    let transport = FakeTransport::with_processes(&[(10, TOMCAT), (11, "com.example.Main")]);
    let broker = ConnectionBroker::new(transport).with_marker("com.example");
    let connection = broker.resolve_target(None).await.unwrap();
    assert_eq!(connection.address, "http://127.0.0.1:8778/jolokia/11");
}

#[tokio::test]
async fn unmanageable_target_fails() {
    let mut transport = FakeTransport::with_processes(&[(20, TOMCAT)]);
    transport.unmanageable = true;
    let (result, _) = resolve(transport, None).await;

    assert!(matches!(result.unwrap_err(), MonitorError::NotManageable { pid: 20 }));
}

#[tokio::test]
async fn connect_failure_is_returned() {
    let mut transport = FakeTransport::with_processes(&[(20, TOMCAT)]);
    transport.fail_connect = true;
    let (result, _) = resolve(transport, Some(20)).await;

    assert!(matches!(result.unwrap_err(), MonitorError::Transport(_)));
}
