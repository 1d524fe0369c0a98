//! Command configuration loaded from environment variables.
//!
//! Every section checks presence of its keys up front, so a missing setting
//! stops the command before the first remote call.

use edutech_core::config::{Config, ConfigError, Env};
use edutech_domain::role::Role;

use crate::domain::types::Credentials;

/// Domain used for demo accounts whose email is not configured.
const DEFAULT_EMAIL_DOMAIN: &str = "edutech.test";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`. Env var: `SUPABASE_URL`.
    pub url: String,
    /// Privileged key that bypasses row-level security.
    /// Env var: `SUPABASE_SERVICE_ROLE_KEY`.
    pub service_role_key: String,
    /// Public key sent as `apikey` on end-user sign-in. Falls back to the
    /// service key. Env var: `SUPABASE_ANON_KEY`.
    pub anon_key: Option<String>,
}

impl BackendConfig {
    /// Key used for end-user (row-level-security) requests.
    pub fn public_key(&self) -> &str {
        self.anon_key.as_deref().unwrap_or(&self.service_role_key)
    }
}

impl Config for BackendConfig {
    fn from_lookup(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            url: env.required("SUPABASE_URL")?,
            service_role_key: env.required("SUPABASE_SERVICE_ROLE_KEY")?,
            anon_key: env.optional("SUPABASE_ANON_KEY"),
        })
    }
}

/// Demo account emails, defaulting to `<role>@edutech.test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoEmails {
    pub admin: String,
    pub teacher: String,
    pub student: String,
}

impl DemoEmails {
    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin,
            Role::Teacher => &self.teacher,
            Role::Student => &self.student,
        }
    }

    /// Emails in provisioning order (admin, teacher, student).
    pub fn all(&self) -> Vec<&str> {
        Role::ALL.iter().map(|r| self.for_role(*r)).collect()
    }
}

impl Config for DemoEmails {
    fn from_lookup(env: &dyn Env) -> Result<Self, ConfigError> {
        let email = |role: Role| {
            env.or_default(
                &format!("{}_EMAIL", role.env_prefix()),
                &format!("{}@{DEFAULT_EMAIL_DOMAIN}", role.as_str()),
            )
        };
        Ok(Self {
            admin: email(Role::Admin),
            teacher: email(Role::Teacher),
            student: email(Role::Student),
        })
    }
}

/// Email and password for every demo role. All six keys are required.
#[derive(Debug, Clone)]
pub struct DemoCredentials {
    pub admin: Credentials,
    pub teacher: Credentials,
    pub student: Credentials,
}

impl DemoCredentials {
    /// Accounts in provisioning order (admin, teacher, student).
    pub fn accounts(&self) -> [(Role, &Credentials); 3] {
        [
            (Role::Admin, &self.admin),
            (Role::Teacher, &self.teacher),
            (Role::Student, &self.student),
        ]
    }
}

impl Config for DemoCredentials {
    fn from_lookup(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            admin: Credentials {
                email: env.required("ADMIN_EMAIL")?,
                password: env.required("ADMIN_PASSWORD")?,
            },
            teacher: Credentials {
                email: env.required("TEACHER_EMAIL")?,
                password: env.required("TEACHER_PASSWORD")?,
            },
            student: Credentials {
                email: env.required("STUDENT_EMAIL")?,
                password: env.required("STUDENT_PASSWORD")?,
            },
        })
    }
}

/// Settings for the setup verifier.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Emails expected to have profiles.
    pub expected: DemoEmails,
    /// Low-privilege account used for the row-level-security round-trip.
    pub probe: Credentials,
}

impl Config for VerifyConfig {
    fn from_lookup(env: &dyn Env) -> Result<Self, ConfigError> {
        let expected = DemoEmails::from_lookup(env)?;
        let probe = Credentials {
            email: expected.student.clone(),
            password: env.required("STUDENT_PASSWORD")?,
        };
        Ok(Self { expected, probe })
    }
}
