//! Adapters for the auto-generated table API (`/rest/v1`).

use anyhow::{Context as _, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use edutech_domain::id::{BatchId, CourseId, EnrollmentId, IdentityId};
use edutech_domain::role::Role;

use crate::domain::repository::{
    BatchRepository, CourseRepository, EnrollmentRepository, ProfileRepository,
};
use crate::domain::types::{
    Batch, BatchKey, Course, Enrollment, NewBatch, NewCourse, NewEnrollment, Profile,
    ProfileUpsert, Session,
};
use crate::error::ProvisionError;
use crate::infra::http::{BackendClient, send, send_json};

pub const PROFILES: &str = "profiles";
pub const COURSES: &str = "courses";
pub const BATCHES: &str = "batches";
pub const ENROLLMENTS: &str = "enrollments";

/// Media type asking the table API for exactly one row as a bare object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

// ── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: IdentityId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "known_role")]
    role: Option<Role>,
    #[serde(default = "active_by_default")]
    is_active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Null, missing and unrecognized roles all read as `None`; a row is never
/// rejected for its role.
fn known_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.parse().ok()))
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            role: row.role,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProfileUpsertRow<'a> {
    id: IdentityId,
    name: &'a str,
    email: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

impl<'a> From<&'a ProfileUpsert> for ProfileUpsertRow<'a> {
    fn from(p: &'a ProfileUpsert) -> Self {
        Self {
            id: p.id,
            name: &p.name,
            email: &p.email,
            role: p.role,
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CourseRow {
    id: CourseId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    is_published: bool,
    #[serde(default)]
    created_by: Option<IdentityId>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            is_published: row.is_published,
            created_by: row.created_by,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewCourseRow<'a> {
    title: &'a str,
    description: &'a str,
    is_published: bool,
    created_by: IdentityId,
}

#[derive(Debug, Serialize, Deserialize)]
struct BatchRow {
    id: BatchId,
    course_id: CourseId,
    teacher_id: IdentityId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    seat_limit: u32,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            teacher_id: row.teacher_id,
            start_date: row.start_date,
            end_date: row.end_date,
            seat_limit: row.seat_limit,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewBatchRow {
    course_id: CourseId,
    teacher_id: IdentityId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    seat_limit: u32,
}

#[derive(Debug, Deserialize)]
struct EnrollmentRow {
    id: EnrollmentId,
    student_id: IdentityId,
    batch_id: BatchId,
    #[serde(deserialize_with = "edutech_core::serde::from_timestamp")]
    enrolled_at: DateTime<Utc>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            batch_id: row.batch_id,
            enrolled_at: row.enrolled_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewEnrollmentRow {
    student_id: IdentityId,
    batch_id: BatchId,
    #[serde(serialize_with = "edutech_core::serde::to_rfc3339_ms")]
    enrolled_at: DateTime<Utc>,
}

// ── Request helpers ──────────────────────────────────────────────────────────

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// First row matching the `column=eq.value` filters, or `None`.
async fn select_first<T: DeserializeOwned>(
    client: &BackendClient,
    table: &str,
    filters: &[(&str, String)],
) -> anyhow::Result<Option<T>> {
    let mut query: Vec<(&str, &str)> = vec![("select", "*")];
    query.extend(filters.iter().map(|(k, v)| (*k, v.as_str())));
    query.push(("limit", "1"));
    let url = client.url(&format!("/rest/v1/{table}"), &query)?;
    let mut rows: Vec<T> = send_json(client.service(Method::GET, url)).await?;
    Ok(if rows.is_empty() {
        None
    } else {
        Some(rows.swap_remove(0))
    })
}

/// Insert one row and return it as stored.
async fn insert_returning<B: Serialize, T: DeserializeOwned>(
    client: &BackendClient,
    table: &str,
    body: &B,
) -> anyhow::Result<T> {
    let url = client.url(&format!("/rest/v1/{table}"), &[])?;
    let rows: Vec<T> = send_json(
        client
            .service(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&[body]),
    )
    .await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| anyhow!("insert into {table} returned no row"))
}

/// Insert or merge one row on its primary key.
async fn upsert_by_id<B: Serialize>(
    client: &BackendClient,
    table: &str,
    body: &B,
) -> anyhow::Result<()> {
    let url = client.url(&format!("/rest/v1/{table}"), &[("on_conflict", "id")])?;
    send(
        client
            .service(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[body]),
    )
    .await?;
    Ok(())
}

/// The session's own profile row, read with the user's token so row-level
/// security applies. Zero or several visible rows is an error.
pub(crate) async fn fetch_profile_as(
    client: &BackendClient,
    session: &Session,
) -> anyhow::Result<Profile> {
    let id = eq(session.identity.id);
    let url = client.url(
        &format!("/rest/v1/{PROFILES}"),
        &[("select", "*"), ("id", id.as_str())],
    )?;
    let row: ProfileRow = send_json(
        client
            .as_user(Method::GET, url, &session.access_token)
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT)),
    )
    .await
    .context("read own profile")?;
    Ok(row.into())
}

// ── Repositories ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RestProfileRepository {
    pub client: BackendClient,
}

impl ProfileRepository for RestProfileRepository {
    async fn upsert(&self, profile: &ProfileUpsert) -> Result<(), ProvisionError> {
        upsert_by_id(&self.client, PROFILES, &ProfileUpsertRow::from(profile))
            .await
            .with_context(|| format!("upsert profile for {}", profile.email))?;
        Ok(())
    }

    async fn sample(&self, limit: u32) -> Result<Vec<Profile>, ProvisionError> {
        let limit = limit.to_string();
        let url = self.client.url(
            &format!("/rest/v1/{PROFILES}"),
            &[("select", "*"), ("limit", limit.as_str())],
        )?;
        let rows: Vec<ProfileRow> = send_json(self.client.service(Method::GET, url))
            .await
            .context("read profiles")?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }
}

#[derive(Clone)]
pub struct RestCourseRepository {
    pub client: BackendClient,
}

impl CourseRepository for RestCourseRepository {
    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, ProvisionError> {
        let row: Option<CourseRow> =
            select_first(&self.client, COURSES, &[("title", eq(title))]).await?;
        Ok(row.map(Course::from))
    }

    async fn insert(&self, course: &NewCourse) -> Result<Course, ProvisionError> {
        let row: CourseRow = insert_returning(
            &self.client,
            COURSES,
            &NewCourseRow {
                title: &course.title,
                description: &course.description,
                is_published: course.is_published,
                created_by: course.created_by,
            },
        )
        .await?;
        Ok(row.into())
    }
}

#[derive(Clone)]
pub struct RestBatchRepository {
    pub client: BackendClient,
}

impl BatchRepository for RestBatchRepository {
    async fn find_by_key(&self, key: &BatchKey) -> Result<Option<Batch>, ProvisionError> {
        let row: Option<BatchRow> = select_first(
            &self.client,
            BATCHES,
            &[
                ("course_id", eq(key.course_id)),
                ("start_date", eq(key.start_date)),
                ("teacher_id", eq(key.teacher_id)),
            ],
        )
        .await?;
        Ok(row.map(Batch::from))
    }

    async fn insert(&self, batch: &NewBatch) -> Result<Batch, ProvisionError> {
        let row: BatchRow = insert_returning(
            &self.client,
            BATCHES,
            &NewBatchRow {
                course_id: batch.course_id,
                teacher_id: batch.teacher_id,
                start_date: batch.start_date,
                end_date: batch.end_date,
                seat_limit: batch.seat_limit,
            },
        )
        .await?;
        Ok(row.into())
    }
}

#[derive(Clone)]
pub struct RestEnrollmentRepository {
    pub client: BackendClient,
}

impl EnrollmentRepository for RestEnrollmentRepository {
    async fn find(
        &self,
        student_id: IdentityId,
        batch_id: BatchId,
    ) -> Result<Option<Enrollment>, ProvisionError> {
        let row: Option<EnrollmentRow> = select_first(
            &self.client,
            ENROLLMENTS,
            &[("student_id", eq(student_id)), ("batch_id", eq(batch_id))],
        )
        .await?;
        Ok(row.map(Enrollment::from))
    }

    async fn insert(&self, enrollment: &NewEnrollment) -> Result<Enrollment, ProvisionError> {
        let row: EnrollmentRow = insert_returning(
            &self.client,
            ENROLLMENTS,
            &NewEnrollmentRow {
                student_id: enrollment.student_id,
                batch_id: enrollment.batch_id,
                enrolled_at: enrollment.enrolled_at,
            },
        )
        .await?;
        Ok(row.into())
    }
}
