use tracing::{info, warn};

use edutech_domain::role::Role;

use crate::domain::repository::{IdentityDirectory, IdentityResolver, ProfileRepository};
use crate::domain::types::{
    Credentials, Identity, NewIdentity, ProfileUpsert, display_name_from_email,
};
use crate::error::ProvisionError;

// ── EnsureIdentity ───────────────────────────────────────────────────────────

pub struct EnsureIdentityInput {
    pub credentials: Credentials,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone)]
pub struct EnsureOutcome {
    pub identity: Identity,
    pub role: Role,
    pub status: IdentityStatus,
}

/// Create an identity if absent, then (re)write its profile.
///
/// An existing identity is left untouched, including its password and
/// confirmation state. The profile is overwritten on every run.
pub struct EnsureIdentityUseCase<R, D, P>
where
    R: IdentityResolver,
    D: IdentityDirectory,
    P: ProfileRepository,
{
    pub resolver: R,
    pub directory: D,
    pub profiles: P,
}

impl<R, D, P> EnsureIdentityUseCase<R, D, P>
where
    R: IdentityResolver,
    D: IdentityDirectory,
    P: ProfileRepository,
{
    pub async fn execute(
        &self,
        input: &EnsureIdentityInput,
    ) -> Result<EnsureOutcome, ProvisionError> {
        let email = input.credentials.email.as_str();

        let (identity, status) = match self.resolver.resolve(email).await? {
            Some(existing) => {
                info!(email, id = %existing.id, "identity already exists");
                (existing, IdentityStatus::AlreadyExists)
            }
            None => {
                let created = self
                    .directory
                    .create(&NewIdentity {
                        email: email.to_owned(),
                        password: input.credentials.password.clone(),
                        confirmed: true,
                    })
                    .await?;
                info!(email, id = %created.id, "created identity");
                (created, IdentityStatus::Created)
            }
        };

        self.profiles
            .upsert(&ProfileUpsert {
                id: identity.id,
                name: display_name_from_email(email).to_owned(),
                email: email.to_owned(),
                role: input.role,
                is_active: None,
            })
            .await?;
        info!(email, role = %input.role, "profile upserted");

        Ok(EnsureOutcome {
            identity,
            role: input.role,
            status,
        })
    }

    /// Ensure each account in order. The first failure aborts the run.
    pub async fn execute_all(
        &self,
        inputs: &[EnsureIdentityInput],
    ) -> Result<Vec<EnsureOutcome>, ProvisionError> {
        let mut outcomes = Vec::with_capacity(inputs.len());
        for input in inputs {
            outcomes.push(self.execute(input).await?);
        }
        Ok(outcomes)
    }
}

// ── ConfirmIdentity ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed(Identity),
    NotFound,
}

/// Mark an identity's email as confirmed.
///
/// Absence is reported, not raised: the caller moves on to the next email.
/// The flag is written even when the identity is already confirmed.
pub struct ConfirmIdentityUseCase<R, D>
where
    R: IdentityResolver,
    D: IdentityDirectory,
{
    pub resolver: R,
    pub directory: D,
}

impl<R, D> ConfirmIdentityUseCase<R, D>
where
    R: IdentityResolver,
    D: IdentityDirectory,
{
    pub async fn execute(&self, email: &str) -> Result<ConfirmOutcome, ProvisionError> {
        let Some(identity) = self.resolver.resolve(email).await? else {
            warn!(email, "identity not found");
            return Ok(ConfirmOutcome::NotFound);
        };
        self.directory.confirm(identity.id).await?;
        info!(email, id = %identity.id, "confirmed email");
        Ok(ConfirmOutcome::Confirmed(Identity {
            confirmed: true,
            ..identity
        }))
    }

    pub async fn execute_all(
        &self,
        emails: &[&str],
    ) -> Result<Vec<(String, ConfirmOutcome)>, ProvisionError> {
        let mut outcomes = Vec::with_capacity(emails.len());
        for email in emails {
            let outcome = self.execute(email).await?;
            outcomes.push(((*email).to_owned(), outcome));
        }
        Ok(outcomes)
    }
}
