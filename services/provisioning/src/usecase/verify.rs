use tracing::{info, warn};

use edutech_domain::role::Role;

use crate::domain::repository::{ProfileRepository, SessionPort};
use crate::domain::types::{Credentials, Profile, Session};
use crate::error::ProvisionError;

/// Rows read from `profiles` for the reachability and presence checks.
pub const PROFILE_SAMPLE_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceCheck {
    pub email: String,
    pub present: bool,
    /// Role of the matching profile. `None` when absent from the sample or
    /// when the row has no known role.
    pub role: Option<Role>,
}

impl PresenceCheck {
    pub fn is_present(&self) -> bool {
        self.present
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyCheck {
    /// The probe account read its own profile row.
    Passed { name: String, role: Option<Role> },
    /// The probe account could not sign in, so the policy was not exercised.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub sampled_profiles: usize,
    pub presence: Vec<PresenceCheck>,
    pub policy: PolicyCheck,
}

pub struct VerifySetupInput {
    pub expected_emails: Vec<String>,
    pub probe: Credentials,
}

/// Read-only health check of a provisioned backend.
///
/// 1. profiles table reachable (fatal otherwise),
/// 2. expected emails present in the sample (informational),
/// 3. a signed-in user can read its own profile (fatal otherwise).
pub struct VerifySetupUseCase<P, S>
where
    P: ProfileRepository,
    S: SessionPort,
{
    pub profiles: P,
    pub sessions: S,
}

impl<P, S> VerifySetupUseCase<P, S>
where
    P: ProfileRepository,
    S: SessionPort,
{
    pub async fn execute(
        &self,
        input: &VerifySetupInput,
    ) -> Result<VerificationReport, ProvisionError> {
        let sample = self.sample_profiles().await?;
        let presence = check_presence(&sample, &input.expected_emails);
        let policy = self.check_self_access(&input.probe).await?;

        Ok(VerificationReport {
            sampled_profiles: sample.len(),
            presence,
            policy,
        })
    }

    /// Read the profile sample. Any failure here means the table is not
    /// reachable with the service key.
    pub async fn sample_profiles(&self) -> Result<Vec<Profile>, ProvisionError> {
        let sample = self
            .profiles
            .sample(PROFILE_SAMPLE_LIMIT)
            .await
            .map_err(|e| ProvisionError::SchemaUnreachable(e.to_string()))?;
        info!(rows = sample.len(), "profiles table reachable");
        Ok(sample)
    }

    /// Sign in as the probe account and read its own profile.
    ///
    /// Once signed in, the session is signed out before returning on every
    /// path. A sign-out failure is only raised when the read succeeded.
    pub async fn check_self_access(&self, probe: &Credentials) -> Result<PolicyCheck, ProvisionError> {
        let session = match self.sessions.sign_in(probe).await {
            Ok(session) => session,
            Err(e) => {
                warn!(email = %probe.email, error = %e, "could not authenticate probe account");
                return Ok(PolicyCheck::Skipped {
                    reason: e.to_string(),
                });
            }
        };

        let read = self.read_own_profile(&session).await;
        let released = self.sessions.sign_out(session).await;

        match (read, released) {
            (Ok(profile), Ok(())) => {
                info!(name = %profile.name, role = ?profile.role, "row level security allows self-access");
                Ok(PolicyCheck::Passed {
                    name: profile.name,
                    role: profile.role,
                })
            }
            (Ok(_), Err(e)) => Err(e.context("sign out probe session")),
            (Err(e), released) => {
                if let Err(sign_out) = released {
                    warn!(error = %sign_out, "sign-out after failed policy check also failed");
                }
                Err(e)
            }
        }
    }

    async fn read_own_profile(&self, session: &Session) -> Result<Profile, ProvisionError> {
        let profile = self
            .sessions
            .fetch_own_profile(session)
            .await
            .map_err(|e| ProvisionError::PolicyViolation(e.to_string()))?;
        if profile.id != session.identity.id {
            return Err(ProvisionError::PolicyViolation(format!(
                "read returned profile {} for identity {}",
                profile.id, session.identity.id
            )));
        }
        Ok(profile)
    }
}

/// Match each expected email against the sample, case-sensitively.
pub fn check_presence(sample: &[Profile], expected: &[String]) -> Vec<PresenceCheck> {
    expected
        .iter()
        .map(|email| {
            let found = sample.iter().find(|p| &p.email == email);
            match found {
                Some(profile) => {
                    info!(email = %email, role = ?profile.role, "profile present")
                }
                None => warn!(email = %email, "profile missing"),
            }
            PresenceCheck {
                email: email.clone(),
                present: found.is_some(),
                role: found.and_then(|p| p.role),
            }
        })
        .collect()
}
