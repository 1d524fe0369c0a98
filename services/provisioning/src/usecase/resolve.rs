use tracing::debug;

use edutech_domain::pagination::{IDENTITY_PAGE_SIZE, PageRequest};

use crate::domain::repository::{IdentityDirectory, IdentityResolver};
use crate::domain::types::Identity;
use crate::error::ProvisionError;

/// Resolves an identity by email by scanning the paged identity listing.
///
/// Cost is linear in the number of identities and repeats on every call, so
/// callers resolve a handful of known emails, never every identity in a loop.
#[derive(Clone)]
pub struct PagedIdentityResolver<D: IdentityDirectory> {
    pub directory: D,
    pub per_page: u32,
}

impl<D: IdentityDirectory> PagedIdentityResolver<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            per_page: IDENTITY_PAGE_SIZE,
        }
    }
}

impl<D: IdentityDirectory> IdentityResolver for PagedIdentityResolver<D> {
    async fn resolve(&self, email: &str) -> Result<Option<Identity>, ProvisionError> {
        let mut page = PageRequest::first(self.per_page);
        loop {
            let identities = self.directory.list_page(page).await?;
            if let Some(found) = identities.iter().find(|i| i.email == email) {
                return Ok(Some(found.clone()));
            }
            if page.is_last(identities.len()) {
                debug!(email, pages = page.page, "identity not found");
                return Ok(None);
            }
            page = page.next();
        }
    }
}
