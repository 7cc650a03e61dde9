//! Identifiers for the fixed set of models served by the completion endpoint.

use std::fmt;
use std::str::FromStr;

use crate::domain::AppError;

/// Models accepted by the hosted completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelId {
    /// Default generation model.
    #[default]
    Llama3_70b,
    /// Smaller sibling, also the fixed cleaner model.
    Llama3_8b,
    Mixtral8x7b,
    Gemma7b,
}

impl ModelId {
    pub const ALL: [ModelId; 4] =
        [ModelId::Llama3_70b, ModelId::Llama3_8b, ModelId::Mixtral8x7b, ModelId::Gemma7b];

    /// API string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Llama3_70b => "llama3-70b-8192",
            ModelId::Llama3_8b => "llama3-8b-8192",
            ModelId::Mixtral8x7b => "mixtral-8x7b-32768",
            ModelId::Gemma7b => "gemma-7b-it",
        }
    }

    /// Comma-separated list of every supported model name.
    pub fn available() -> String {
        ModelId::ALL.iter().map(ModelId::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ModelId::ALL.iter().copied().find(|model| model.as_str() == value).ok_or_else(|| {
            AppError::UnknownModel { name: value.to_string(), available: ModelId::available() }
        })
    }
}
