use crate::error::Result;
use crate::object_name::ObjectName;

/// Name of the field projected out of composite memory-usage values.
pub const USED_KEY: &str = "used";

/// Field of a composite attribute value to report instead of the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey(String);

impl CompositeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn used() -> Self {
        Self::new(USED_KEY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One metric to sample: an attribute of a resource, under a display alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    object_name: ObjectName,
    attribute: String,
    alias: String,
    extract: Option<CompositeKey>,
}

impl MetricSpec {
    /// Build a spec, validating `bean` as an object name.
    ///
    /// An absent or empty alias falls back to the attribute name.
    pub fn new(bean: &str, attribute: &str, alias: Option<&str>) -> Result<Self> {
        let object_name = ObjectName::parse(bean)?;
        Ok(Self::from_parts(object_name, attribute, alias))
    }

    pub fn from_parts(object_name: ObjectName, attribute: &str, alias: Option<&str>) -> Self {
        let alias = match alias {
            Some(alias) if !alias.is_empty() => alias.to_string(),
            _ => attribute.to_string(),
        };
        Self {
            object_name,
            attribute: attribute.to_string(),
            alias,
            extract: None,
        }
    }

    #[must_use]
    pub fn with_extract(mut self, key: CompositeKey) -> Self {
        self.extract = Some(key);
        self
    }

    pub fn object_name(&self) -> &ObjectName {
        &self.object_name
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn extract(&self) -> Option<&CompositeKey> {
        self.extract.as_ref()
    }
}
