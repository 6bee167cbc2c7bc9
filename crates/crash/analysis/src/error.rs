/// Errors from the analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
}

impl AnalysisError {
    pub fn invalid(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}
