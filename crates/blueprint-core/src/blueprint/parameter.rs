//! Declared blueprint inputs and the option values supplied for them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Values supplied for a blueprint's parameters, keyed by parameter name
pub type Options = BTreeMap<String, OptionValue>;

/// A single option value from a CLI flag or a wizard answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            OptionValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

/// Parameter type tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Boolean,
    Enum {
        #[serde(default)]
        choices: Vec<String>,
    },
    /// Path to an existing file
    File,
    /// Path to an existing directory
    Dir,
}

impl ParameterKind {
    /// Whether the CLI flag for this kind takes a value
    pub fn takes_value(&self) -> bool {
        !matches!(self, ParameterKind::Boolean)
    }
}

/// A declared blueprint input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(flatten)]
    pub kind: ParameterKind,

    #[serde(default)]
    pub description: String,

    /// The blueprint cannot run without this option
    #[serde(default)]
    pub require: bool,

    /// The wizard may ask for this option when it is missing
    #[serde(default)]
    pub ask: bool,

    #[serde(default)]
    pub default: Option<OptionValue>,
}

impl Parameter {
    fn new(name: &str, kind: ParameterKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            require: false,
            ask: false,
            default: None,
        }
    }

    pub fn string(name: &str, description: &str) -> Self {
        Self::new(name, ParameterKind::String, description)
    }

    pub fn boolean(name: &str, description: &str) -> Self {
        Self::new(name, ParameterKind::Boolean, description)
    }

    pub fn choice(name: &str, description: &str, choices: &[&str]) -> Self {
        let choices = choices.iter().map(|c| c.to_string()).collect();
        Self::new(name, ParameterKind::Enum { choices }, description)
    }

    pub fn file(name: &str, description: &str) -> Self {
        Self::new(name, ParameterKind::File, description)
    }

    pub fn dir(name: &str, description: &str) -> Self {
        Self::new(name, ParameterKind::Dir, description)
    }

    pub fn required(mut self) -> Self {
        self.require = true;
        self
    }

    pub fn askable(mut self) -> Self {
        self.ask = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Required, and only obtainable from a flag
    pub fn flag_only_required(&self) -> bool {
        self.require && !self.ask
    }

    /// Check a supplied value against this parameter's type
    pub fn check(&self, value: &OptionValue) -> Result<(), String> {
        match (&self.kind, value) {
            (ParameterKind::Boolean, OptionValue::Bool(_)) => Ok(()),
            (ParameterKind::Boolean, OptionValue::Str(s)) => {
                Err(format!("--{} expects a boolean, got '{}'", self.name, s))
            }
            (_, OptionValue::Bool(b)) => {
                Err(format!("--{} expects a value, got '{}'", self.name, b))
            }
            (ParameterKind::Enum { choices }, OptionValue::Str(s)) => {
                if choices.iter().any(|c| c == s) {
                    Ok(())
                } else {
                    Err(format!(
                        "--{} must be one of: {} (got '{}')",
                        self.name,
                        choices.join(", "),
                        s
                    ))
                }
            }
            (_, OptionValue::Str(_)) => Ok(()),
        }
    }
}

/// A promptable question for one parameter, with the value to pre-fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub parameter: Parameter,
    pub default: Option<OptionValue>,
}

impl Question {
    pub fn new(parameter: &Parameter, options: &Options) -> Self {
        let default = options
            .get(&parameter.name)
            .cloned()
            .or_else(|| parameter.default.clone());
        Self {
            parameter: parameter.clone(),
            default,
        }
    }
}

/// Required parameters that have no value in `options`
pub fn missing_required<'a>(parameters: &'a [Parameter], options: &Options) -> Vec<&'a Parameter> {
    parameters
        .iter()
        .filter(|p| p.require && !options.contains_key(&p.name))
        .collect()
}
