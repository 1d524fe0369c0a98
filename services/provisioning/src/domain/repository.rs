#![allow(async_fn_in_trait)]

use edutech_domain::id::{BatchId, IdentityId};
use edutech_domain::pagination::PageRequest;

use crate::domain::types::{
    Batch, BatchKey, Course, Credentials, Enrollment, Identity, NewBatch, NewCourse,
    NewEnrollment, NewIdentity, Profile, ProfileUpsert, Session,
};
use crate::error::ProvisionError;

/// Admin surface of the authentication subsystem.
///
/// The backend offers no lookup by email, only a paged listing.
pub trait IdentityDirectory: Send + Sync {
    /// One page of identities, in backend order.
    async fn list_page(&self, page: PageRequest) -> Result<Vec<Identity>, ProvisionError>;

    async fn create(&self, identity: &NewIdentity) -> Result<Identity, ProvisionError>;

    /// Set the confirmation flag on an existing identity.
    async fn confirm(&self, id: IdentityId) -> Result<(), ProvisionError>;
}

/// Lookup of an identity by its natural key (email).
///
/// Callers depend on this contract only; how the lookup is performed (paged
/// scan, indexed query) is the implementor's business.
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, email: &str) -> Result<Option<Identity>, ProvisionError>;
}

/// Repository for the `profiles` table (service-role access).
pub trait ProfileRepository: Send + Sync {
    /// Create or replace the row keyed by `profile.id`.
    async fn upsert(&self, profile: &ProfileUpsert) -> Result<(), ProvisionError>;

    /// Up to `limit` rows, in store order.
    async fn sample(&self, limit: u32) -> Result<Vec<Profile>, ProvisionError>;
}

/// Repository for the `courses` table.
pub trait CourseRepository: Send + Sync {
    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, ProvisionError>;

    /// Insert and return the stored row, including its generated id.
    async fn insert(&self, course: &NewCourse) -> Result<Course, ProvisionError>;
}

/// Repository for the `batches` table.
pub trait BatchRepository: Send + Sync {
    async fn find_by_key(&self, key: &BatchKey) -> Result<Option<Batch>, ProvisionError>;

    async fn insert(&self, batch: &NewBatch) -> Result<Batch, ProvisionError>;
}

/// Repository for the `enrollments` table.
pub trait EnrollmentRepository: Send + Sync {
    async fn find(
        &self,
        student_id: IdentityId,
        batch_id: BatchId,
    ) -> Result<Option<Enrollment>, ProvisionError>;

    async fn insert(&self, enrollment: &NewEnrollment) -> Result<Enrollment, ProvisionError>;
}

/// End-user password sessions, subject to row-level security.
pub trait SessionPort: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, ProvisionError>;

    /// Read the signed-in identity's own profile row as that user.
    /// Anything other than exactly one row is an error.
    async fn fetch_own_profile(&self, session: &Session) -> Result<Profile, ProvisionError>;

    async fn sign_out(&self, session: Session) -> Result<(), ProvisionError>;
}
