//! Validated JMX object names (`domain:key=value[,key=value...]`).

use crate::error::{MonitorError, Result};
use std::fmt;
use std::str::FromStr;

/// A syntactically valid, non-pattern JMX object name.
///
/// The original text is kept verbatim: it is what gets sent to the management
/// agent and what shows up in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName {
    text: String,
    domain_len: usize,
    properties: Vec<(String, String)>,
}

impl ObjectName {
    pub fn parse(name: &str) -> Result<Self> {
        let malformed = |reason| MonitorError::MalformedObjectName {
            name: name.to_string(),
            reason,
        };

        let (domain, props) = name.split_once(':').ok_or(malformed("missing ':'"))?;
        if domain.is_empty() {
            return Err(malformed("empty domain"));
        }
        if domain.contains(['*', '?']) {
            return Err(malformed("patterns are not supported"));
        }
        if domain.contains('\n') {
            return Err(malformed("newline in domain"));
        }
        if props.is_empty() {
            return Err(malformed("empty key property list"));
        }

        let properties = parse_properties(props).map_err(malformed)?;

        Ok(Self {
            text: name.to_string(),
            domain_len: domain.len(),
            properties,
        })
    }

    pub fn domain(&self) -> &str {
        &self.text[..self.domain_len]
    }

    /// Key properties in declaration order, with quoted values unescaped.
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for ObjectName {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_properties(input: &str) -> std::result::Result<Vec<(String, String)>, &'static str> {
    let mut properties: Vec<(String, String)> = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        let mut key = String::new();
        loop {
            match chars.next() {
                Some('=') => break,
                Some(',') | None => return Err("key property without '='"),
                Some(':') | Some('*') | Some('?') | Some('\n') => {
                    return Err(if key.is_empty() && input == "*" {
                        "patterns are not supported"
                    } else {
                        "invalid character in key"
                    });
                }
                Some(c) => key.push(c),
            }
        }
        if key.is_empty() {
            return Err("empty key");
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('n') => value.push('\n'),
                        Some(c @ ('"' | '\\' | '*' | '?')) => value.push(c),
                        _ => return Err("invalid escape in quoted value"),
                    },
                    Some('\n') => return Err("newline in quoted value"),
                    Some(c) => value.push(c),
                    None => return Err("unterminated quoted value"),
                }
            }
            match chars.peek() {
                Some(',') | None => {}
                Some(_) => return Err("characters after closing quote"),
            }
        } else {
            while let Some(&c) = chars.peek() {
                match c {
                    ',' => break,
                    '=' | ':' | '"' | '\n' => return Err("invalid character in value"),
                    '*' | '?' => return Err("patterns are not supported"),
                    _ => {
                        value.push(c);
                        chars.next();
                    }
                }
            }
            if value.is_empty() {
                return Err("empty value");
            }
        }

        if properties.iter().any(|(k, _)| *k == key) {
            return Err("duplicate key");
        }
        properties.push((key, value));

        match chars.next() {
            None => return Ok(properties),
            Some(',') => {
                if chars.peek() == Some(&'*') {
                    return Err("patterns are not supported");
                }
                if chars.peek().is_none() {
                    return Err("trailing ','");
                }
            }
            Some(_) => unreachable!("value scanning stops only at ',' or end of input"),
        }
    }
}
