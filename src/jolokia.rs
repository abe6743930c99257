//! Jolokia HTTP/JSON client used as the JMX connection.
//!
//! Every read is a single POST of a Jolokia request object to the agent URL;
//! the agent answers with an envelope carrying either `value` or
//! `error_type`/`error`, plus an HTTP-like `status`.

use crate::error::{MonitorError, Result};
use crate::object_name::ObjectName;
use crate::transport::MBeanConnection;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Request<'a> {
    Read { mbean: &'a str, attribute: &'a str },
    Version,
}

#[derive(Debug, Deserialize)]
struct Response {
    status: u16,
    #[serde(default)]
    value: Value,
    error_type: Option<String>,
    error: Option<String>,
}

pub struct JolokiaConnection {
    client: Client,
    url: String,
}

impl std::fmt::Debug for JolokiaConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JolokiaConnection")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl JolokiaConnection {
    /// Connect to the agent at `url` and check that it answers.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let connection = Self {
            client,
            url: url.to_string(),
        };

        let version = connection.send(&Request::Version).await?;
        if version.status != 200 {
            return Err(MonitorError::Transport(format!(
                "agent at {} answered version request with status {}: {}",
                url,
                version.status,
                version.error.unwrap_or_default()
            )));
        }
        if let Some(agent) = version.value.get("agent") {
            tracing::debug!("Jolokia agent version {}", agent);
        }

        Ok(connection)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, request: &Request<'_>) -> Result<Response> {
        tracing::trace!("POST {} {:?}", self.url, request);
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MBeanConnection for JolokiaConnection {
    async fn read_attribute(&self, name: &ObjectName, attribute: &str) -> Result<Value> {
        let response = self
            .send(&Request::Read {
                mbean: name.as_str(),
                attribute,
            })
            .await?;

        if response.status == 200 {
            Ok(response.value)
        } else {
            Err(MonitorError::Fetch {
                object_name: name.to_string(),
                attribute: attribute.to_string(),
                error_type: response
                    .error_type
                    .unwrap_or_else(|| format!("status {}", response.status)),
                message: response.error.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn name(s: &str) -> ObjectName {
        ObjectName::parse(s).unwrap()
    }

    async fn mock_version(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/jolokia/")
            .match_body(Matcher::Json(json!({"type": "version"})))
            .with_status(200)
            .with_body(r#"{"status":200,"value":{"agent":"2.1.0","protocol":"8.0"}}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn reads_attribute_value() {
        let mut server = Server::new_async().await;
        let _version = mock_version(&mut server).await;
        let read = server
            .mock("POST", "/jolokia/")
            .match_body(Matcher::Json(json!({
                "type": "read",
                "mbean": "java.lang:type=Memory",
                "attribute": "HeapMemoryUsage",
            })))
            .with_status(200)
            .with_body(
                r#"{"request":{"type":"read"},"value":{"init":1,"used":42,"committed":64,"max":128},"timestamp":1,"status":200}"#,
            )
            .create_async()
            .await;

        let url = format!("{}/jolokia/", server.url());
        let connection = JolokiaConnection::connect(&url, DEFAULT_REQUEST_TIMEOUT)
            .await
            .unwrap();
        let value = connection
            .read_attribute(&name("java.lang:type=Memory"), "HeapMemoryUsage")
            .await
            .unwrap();

        assert_eq!(value["used"], json!(42));
        read.assert_async().await;
    }

    #[tokio::test]
    async fn error_envelope_is_a_fetch_error() {
        let mut server = Server::new_async().await;
        let _version = mock_version(&mut server).await;
        let _read = server
            .mock("POST", "/jolokia/")
            .match_body(Matcher::PartialJson(json!({"type": "read"})))
            .with_status(200)
            .with_body(
                r#"{"error_type":"javax.management.InstanceNotFoundException","error":"java.lang:type=Nope","status":404}"#,
            )
            .create_async()
            .await;

        let url = format!("{}/jolokia/", server.url());
        let connection = JolokiaConnection::connect(&url, DEFAULT_REQUEST_TIMEOUT)
            .await
            .unwrap();
        let err = connection
            .read_attribute(&name("java.lang:type=Nope"), "Anything")
            .await
            .unwrap_err();

        match err {
            MonitorError::Fetch {
                error_type,
                attribute,
                ..
            } => {
                assert_eq!(error_type, "javax.management.InstanceNotFoundException");
                assert_eq!(attribute, "Anything");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_fails_when_agent_does_not_answer() {
        let mut server = Server::new_async().await;
        let _down = server
            .mock("POST", "/jolokia/")
            .with_status(503)
            .create_async()
            .await;

        let url = format!("{}/jolokia/", server.url());
        let err = JolokiaConnection::connect(&url, DEFAULT_REQUEST_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Http(_)));
    }
}
