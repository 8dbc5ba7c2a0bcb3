#[derive(thiserror::Error, Debug)]
pub enum EnergyError {
    #[error("store error: {0}")]
    Store(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("export error: {0}")]
    Export(String),
}

impl EnergyError {
    pub fn upstream(e: impl std::fmt::Display) -> Self {
        Self::Upstream(e.to_string())
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Store(_) => "store",
            Self::Upstream(_) => "upstream",
            Self::Validation(_) => "validation",
            Self::InsufficientData(_) => "insufficient_data",
            Self::Export(_) => "export",
        }
    }
}
