use edutech_core::config::ConfigError;
use edutech_domain::role::Role;

/// Provisioning error variants.
///
/// Every variant is fatal for the running command. Expected absences (an
/// identity or row not found) are modelled as `Option`s and outcome enums,
/// never as errors.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{role} identity {email} not found; run `provision seed-users` first")]
    MissingPrerequisite { role: Role, email: String },
    #[error("invalid seed plan: {0}")]
    InvalidPlan(String),
    #[error("cannot access profiles table: {0}")]
    SchemaUnreachable(String),
    #[error("row level security rejected self-access: {0}")]
    PolicyViolation(String),
    #[error("{0:#}")]
    Backend(#[from] anyhow::Error),
}

impl ProvisionError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::MissingPrerequisite { .. } => "MISSING_PREREQUISITE",
            Self::InvalidPlan(_) => "INVALID_PLAN",
            Self::SchemaUnreachable(_) => "SCHEMA_UNREACHABLE",
            Self::PolicyViolation(_) => "POLICY_VIOLATION",
            Self::Backend(_) => "BACKEND",
        }
    }

    /// Prefix a backend failure with what was being attempted.
    /// Other variants already carry their own description and pass through.
    pub fn context(self, what: impl std::fmt::Display + Send + Sync + 'static) -> Self {
        match self {
            Self::Backend(e) => Self::Backend(e.context(what)),
            other => other,
        }
    }
}
