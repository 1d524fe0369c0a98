use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use edutech_domain::id::{BatchId, CourseId, EnrollmentId, IdentityId};
use edutech_domain::role::Role;

/// An identity owned by the authentication subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    /// Natural key. Matched exactly, case-sensitive.
    pub email: String,
    pub confirmed: bool,
}

/// Request to create an identity through the admin API.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    /// Mark the email as confirmed at creation time.
    pub confirmed: bool,
}

/// Profile row as read back from the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: IdentityId,
    pub name: String,
    pub email: String,
    /// `None` when the stored role is null or not a known role.
    pub role: Option<Role>,
    pub is_active: bool,
}

/// Full-row write for the `profiles` table, keyed by `id`.
///
/// `is_active: None` leaves the stored (or default) flag untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpsert {
    pub id: IdentityId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub is_published: bool,
    /// Rows created outside the seeder may have no creator.
    pub created_by: Option<IdentityId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub is_published: bool,
    pub created_by: IdentityId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub id: BatchId,
    pub course_id: CourseId,
    pub teacher_id: IdentityId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub seat_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBatch {
    pub course_id: CourseId,
    pub teacher_id: IdentityId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub seat_limit: u32,
}

impl NewBatch {
    pub fn key(&self) -> BatchKey {
        BatchKey {
            course_id: self.course_id,
            start_date: self.start_date,
            teacher_id: self.teacher_id,
        }
    }
}

/// Dedup key for batches: a batch is reused only when all three match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub course_id: CourseId,
    pub start_date: NaiveDate,
    pub teacher_id: IdentityId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: IdentityId,
    pub batch_id: BatchId,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    pub student_id: IdentityId,
    pub batch_id: BatchId,
    pub enrolled_at: DateTime<Utc>,
}

/// Email + password pair for a demo account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated end-user session obtained by password sign-in.
#[derive(Clone)]
pub struct Session {
    pub access_token: String,
    pub identity: Identity,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Whether a check-then-act step found an existing row or wrote a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Created,
    Reused,
}

/// A record together with how the seeding step obtained it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeded<T> {
    pub record: T,
    pub provenance: Provenance,
}

impl<T> Seeded<T> {
    pub fn created(record: T) -> Self {
        Self {
            record,
            provenance: Provenance::Created,
        }
    }

    pub fn reused(record: T) -> Self {
        Self {
            record,
            provenance: Provenance::Reused,
        }
    }

    pub fn was_created(&self) -> bool {
        self.provenance == Provenance::Created
    }
}

/// Display name derived from an email: the text before the first `@`.
pub fn display_name_from_email(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
