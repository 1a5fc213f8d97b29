//! Identifiers for coordination entities.
//!
//! Every identifier is an opaque, non-empty string wrapped in its own type so
//! a tenant can never be passed where a run id is expected.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Error raised when an identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The identifier was empty or whitespace only
    #[error("{kind} must not be empty")]
    Empty {
        /// Identifier kind that failed
        kind: &'static str,
    },
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(IdError::Empty { kind: $kind });
                }
                if trimmed.len() == value.len() {
                    Ok(Self(value))
                } else {
                    Ok(Self(trimmed.to_string()))
                }
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a coordination step
    StepId,
    "step id"
);

string_id!(
    /// Identifier of a coordination constraint
    ConstraintId,
    "constraint id"
);

string_id!(
    /// Identifier of a coordination program
    ProgramId,
    "program id"
);

string_id!(
    /// Identifier of a plan candidate
    CandidateId,
    "candidate id"
);

string_id!(
    /// Identifier of a coordination run
    RunId,
    "run id"
);

string_id!(
    /// Identifier of a tenant
    TenantId,
    "tenant"
);

string_id!(
    /// Identifier of the incident a program remediates
    IncidentId,
    "incident id"
);

string_id!(
    /// Correlation identifier threaded through a single invocation
    CorrelationId,
    "correlation id"
);

impl CorrelationId {
    /// Generate a fresh correlation id.
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }
}

impl RunId {
    /// Run id used when the caller's run id could not be validated.
    pub fn unassigned() -> Self {
        Self("unassigned".to_string())
    }

    /// Run id for a program run started at `millis` since the epoch.
    pub fn scoped(tenant: &TenantId, program: &ProgramId, millis: i64) -> Self {
        Self(format!("{}:{}:{millis}", tenant.0, program.0))
    }

    /// Candidate id scoped to this run, `{run}:{suffix}`.
    pub fn candidate(&self, suffix: impl std::fmt::Display) -> CandidateId {
        CandidateId(format!("{}:{}", self.0, suffix))
    }
}

impl TenantId {
    /// Tenant used when the caller's tenant could not be validated.
    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }
}

impl ProgramId {
    /// Program id carried by candidates that are not bound to a program.
    pub fn policy_baseline() -> Self {
        Self("policy-baseline".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_ids() {
        assert_eq!(TenantId::new(""), Err(IdError::Empty { kind: "tenant" }));
        assert!(RunId::new("   ").is_err());
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let id = StepId::new("  drain-node ").unwrap();
        assert_eq!(id.as_str(), "drain-node");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: StepId = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(ok.to_string(), "a");

        let err = serde_json::from_str::<StepId>("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_run_scoped_candidate_ids() {
        let run = RunId::new("run-4").unwrap();
        assert_eq!(run.candidate("seed-2").as_str(), "run-4:seed-2");

        let scoped = RunId::scoped(
            &TenantId::new("acme").unwrap(),
            &ProgramId::new("db-failover").unwrap(),
            1_700_000_000_000,
        );
        assert_eq!(scoped.as_str(), "acme:db-failover:1700000000000");
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        assert_ne!(CorrelationId::generate(), CorrelationId::generate());
    }
}
