//! Adapters for the authentication service (`/auth/v1`).

use anyhow::Context as _;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use edutech_domain::id::IdentityId;
use edutech_domain::pagination::PageRequest;

use crate::domain::repository::{IdentityDirectory, SessionPort};
use crate::domain::types::{Credentials, Identity, NewIdentity, Profile, Session};
use crate::error::ProvisionError;
use crate::infra::http::{BackendClient, send, send_json};
use crate::infra::postgrest;

/// User object as returned by the auth service.
#[derive(Debug, Deserialize)]
struct UserRecord {
    id: IdentityId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Serialize)]
struct CreateUserBody<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
}

#[derive(Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserRecord,
}

fn identity_from_record(record: UserRecord) -> Identity {
    Identity {
        id: record.id,
        email: record.email.unwrap_or_default(),
        confirmed: record.email_confirmed_at.is_some(),
    }
}

// ── Admin API ────────────────────────────────────────────────────────────────

/// Identity administration through the service key.
#[derive(Clone)]
pub struct GoTrueAdminClient {
    pub client: BackendClient,
}

impl IdentityDirectory for GoTrueAdminClient {
    async fn list_page(&self, page: PageRequest) -> Result<Vec<Identity>, ProvisionError> {
        let page_no = page.page.to_string();
        let per_page = page.per_page.to_string();
        let url = self.client.url(
            "/auth/v1/admin/users",
            &[("page", page_no.as_str()), ("per_page", per_page.as_str())],
        )?;
        let list: UserList = send_json(self.client.service(Method::GET, url))
            .await
            .with_context(|| format!("list identities (page {page_no})"))?;
        Ok(list.users.into_iter().map(identity_from_record).collect())
    }

    async fn create(&self, identity: &NewIdentity) -> Result<Identity, ProvisionError> {
        let url = self.client.url("/auth/v1/admin/users", &[])?;
        let record: UserRecord = send_json(self.client.service(Method::POST, url).json(
            &CreateUserBody {
                email: &identity.email,
                password: &identity.password,
                email_confirm: identity.confirmed,
            },
        ))
        .await
        .with_context(|| format!("create identity {}", identity.email))?;
        Ok(identity_from_record(record))
    }

    async fn confirm(&self, id: IdentityId) -> Result<(), ProvisionError> {
        let url = self.client.url(&format!("/auth/v1/admin/users/{id}"), &[])?;
        send(
            self.client
                .service(Method::PUT, url)
                .json(&json!({ "email_confirm": true })),
        )
        .await
        .with_context(|| format!("confirm identity {id}"))?;
        Ok(())
    }
}

// ── End-user sessions ────────────────────────────────────────────────────────

/// Password sign-in and session-scoped reads.
#[derive(Clone)]
pub struct GoTrueSessionClient {
    pub client: BackendClient,
}

impl SessionPort for GoTrueSessionClient {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, ProvisionError> {
        let url = self
            .client
            .url("/auth/v1/token", &[("grant_type", "password")])?;
        let token: TokenResponse = send_json(self.client.public(Method::POST, url).json(
            &PasswordGrantBody {
                email: &credentials.email,
                password: &credentials.password,
            },
        ))
        .await
        .with_context(|| format!("sign in as {}", credentials.email))?;
        Ok(Session {
            access_token: token.access_token,
            identity: identity_from_record(token.user),
        })
    }

    async fn fetch_own_profile(&self, session: &Session) -> Result<Profile, ProvisionError> {
        Ok(postgrest::fetch_profile_as(&self.client, session).await?)
    }

    async fn sign_out(&self, session: Session) -> Result<(), ProvisionError> {
        let url = self.client.url("/auth/v1/logout", &[])?;
        send(self.client.as_user(Method::POST, url, &session.access_token))
            .await
            .context("sign out")?;
        Ok(())
    }
}
