use crate::error::Result;
use crate::metric::{CompositeKey, MetricSpec};
use crate::object_name::ObjectName;
use std::path::PathBuf;

pub const MEMORY_BEAN: &str = "java.lang:type=Memory";
pub const HEAP_ATTRIBUTE: &str = "HeapMemoryUsage";

/// Collector reported by the memory preset. Only the parallel collector's old
/// generation is covered; other collectors need an explicit bean.
pub const GC_BEAN: &str = "java.lang:type=GarbageCollector,name=PS MarkSweep";

/// Where metric specs come from. Every source is optional.
#[derive(Debug, Clone, Default)]
pub struct SpecSources {
    pub memory: bool,
    pub bean: Option<String>,
    pub attributes: Vec<String>,
    pub config: Option<PathBuf>,
}

pub struct SpecResolver;

impl SpecResolver {
    /// Merge all enabled sources in a fixed order: memory preset, explicit
    /// bean attributes, then the config file.
    ///
    /// Only a malformed explicit bean is an error; config file problems are
    /// logged and skipped.
    pub fn resolve(sources: &SpecSources) -> Result<Vec<MetricSpec>> {
        let mut specs = Vec::new();

        if sources.memory {
            specs.extend(Self::memory_preset());
        }

        if let Some(bean) = &sources.bean {
            specs.extend(Self::bean_attributes(bean, &sources.attributes)?);
        }

        if let Some(path) = &sources.config {
            specs.extend(Self::load_config(path));
        }

        if specs.is_empty() {
            tracing::warn!("No metrics configured, only timestamps will be recorded");
        }
        for spec in &specs {
            tracing::info!(
                "Metric {}: {} {}",
                spec.alias(),
                spec.object_name(),
                spec.attribute()
            );
        }

        Ok(specs)
    }

    /// Used heap plus collection count and time of the old generation collector.
    pub fn memory_preset() -> Vec<MetricSpec> {
        let memory = fixed_name(MEMORY_BEAN);
        let gc = fixed_name(GC_BEAN);
        vec![
            MetricSpec::from_parts(memory, HEAP_ATTRIBUTE, Some("UsedHeap"))
                .with_extract(CompositeKey::used()),
            MetricSpec::from_parts(gc.clone(), "CollectionCount", Some("GCCollectionCount")),
            MetricSpec::from_parts(gc, "CollectionTime", Some("GCCollectionTime")),
        ]
    }

    pub fn bean_attributes(bean: &str, attributes: &[String]) -> Result<Vec<MetricSpec>> {
        let object_name = ObjectName::parse(bean)?;
        Ok(attributes
            .iter()
            .map(|attribute| MetricSpec::from_parts(object_name.clone(), attribute, None))
            .collect())
    }

    pub fn load_config(path: &std::path::Path) -> Vec<MetricSpec> {
        match std::fs::read_to_string(path) {
            Ok(content) => parse_config(&content),
            Err(e) => {
                tracing::error!("Cannot read config file {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

fn fixed_name(name: &str) -> ObjectName {
    match ObjectName::parse(name) {
        Ok(name) => name,
        Err(e) => unreachable!("built-in object name is valid: {e}"),
    }
}

/// Parse the config file grammar: `objectName attribute [alias]` per line,
/// whitespace separated, `#` comments and blank lines ignored.
pub fn parse_config(content: &str) -> Vec<MetricSpec> {
    let mut specs = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            tracing::trace!("Config line {}: skipped {:?}", line_no, line);
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [bean, attribute, rest @ ..] = tokens.as_slice() else {
            tracing::warn!(
                "Config line {}: expected '<bean> <attribute> [alias]', got {:?}",
                line_no,
                line
            );
            continue;
        };

        match MetricSpec::new(bean, attribute, rest.first().copied()) {
            Ok(spec) => specs.push(spec),
            Err(e) => tracing::warn!("Config line {}: {}, skipping", line_no, e),
        }
    }

    specs
}
