use crate::error::{MonitorError, Result};
use crate::metric::{CompositeKey, MetricSpec};
use crate::transport::MBeanConnection;
use serde_json::Value;

/// Fetch and render every spec, in order.
///
/// The result always has one entry per spec: a failed fetch is logged and
/// rendered as an empty string.
pub async fn sample_all<C>(connection: &C, specs: &[MetricSpec]) -> Vec<String>
where
    C: MBeanConnection + ?Sized,
{
    let mut values = Vec::with_capacity(specs.len());
    for spec in specs {
        match sample_one(connection, spec).await {
            Ok(value) => values.push(value),
            Err(e) => {
                tracing::warn!("{}: {}", spec.alias(), e);
                values.push(String::new());
            }
        }
    }
    values
}

async fn sample_one<C>(connection: &C, spec: &MetricSpec) -> Result<String>
where
    C: MBeanConnection + ?Sized,
{
    let raw = connection
        .read_attribute(spec.object_name(), spec.attribute())
        .await?;
    tracing::trace!("{} = {}", spec.alias(), raw);

    let value = match spec.extract() {
        Some(key) => extract(raw, key)?,
        None => raw,
    };
    Ok(render_value(&value))
}

fn extract(raw: Value, key: &CompositeKey) -> Result<Value> {
    let found = match raw {
        Value::Object(mut fields) => {
            return fields
                .remove(key.as_str())
                .ok_or_else(|| MonitorError::Extraction {
                    key: key.as_str().to_string(),
                    found: "composite without that field",
                });
        }
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
    };
    Err(MonitorError::Extraction {
        key: key.as_str().to_string(),
        found,
    })
}

/// Display form of an attribute value: strings unquoted, null as empty,
/// composites as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
