//! Demo data seeding: profiles, then courses → batches → enrollments.
//!
//! Each level runs check-then-act against the store: look the row up by its
//! dedup key, reuse it when present, insert it otherwise. Ids produced by one
//! level feed the next, so levels run strictly in order, one definition at a
//! time, and the first failure aborts the rest.

use chrono::{DateTime, Utc};
use tracing::info;

use edutech_domain::role::Role;

use crate::config::DemoEmails;
use crate::domain::plan::SeedPlan;
use crate::domain::repository::{
    BatchRepository, CourseRepository, EnrollmentRepository, IdentityResolver, ProfileRepository,
};
use crate::domain::types::{
    Batch, Course, Enrollment, Identity, NewBatch, NewCourse, NewEnrollment, ProfileUpsert, Seeded,
};
use crate::error::ProvisionError;

/// Identities the seeder wires into the entity graph.
#[derive(Debug, Clone)]
pub struct SeedIdentities {
    /// Course creator when present.
    pub admin: Option<Identity>,
    /// Teaches every batch; also the course creator when there is no admin.
    pub teacher: Identity,
    /// Enrolled in the leading batches.
    pub student: Identity,
}

impl SeedIdentities {
    pub fn for_role(&self, role: Role) -> Option<&Identity> {
        match role {
            Role::Admin => self.admin.as_ref(),
            Role::Teacher => Some(&self.teacher),
            Role::Student => Some(&self.student),
        }
    }

    pub fn course_creator(&self) -> &Identity {
        self.admin.as_ref().unwrap_or(&self.teacher)
    }
}

/// What a seed run produced, in plan order.
#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub profiles: Vec<Role>,
    pub courses: Vec<Seeded<Course>>,
    pub batches: Vec<Seeded<Batch>>,
    pub enrollments: Vec<Seeded<Enrollment>>,
}

impl SeedSummary {
    /// Number of rows inserted by this run (profiles excluded).
    pub fn created(&self) -> usize {
        self.courses.iter().filter(|c| c.was_created()).count()
            + self.batches.iter().filter(|b| b.was_created()).count()
            + self.enrollments.iter().filter(|e| e.was_created()).count()
    }
}

pub struct SeedDemoDataInput {
    pub emails: DemoEmails,
    pub plan: SeedPlan,
    /// Timestamp stamped on new enrollments.
    pub now: DateTime<Utc>,
}

pub struct SeedDemoDataUseCase<R, P, C, B, E>
where
    R: IdentityResolver,
    P: ProfileRepository,
    C: CourseRepository,
    B: BatchRepository,
    E: EnrollmentRepository,
{
    pub resolver: R,
    pub profiles: P,
    pub courses: C,
    pub batches: B,
    pub enrollments: E,
}

impl<R, P, C, B, E> SeedDemoDataUseCase<R, P, C, B, E>
where
    R: IdentityResolver,
    P: ProfileRepository,
    C: CourseRepository,
    B: BatchRepository,
    E: EnrollmentRepository,
{
    /// Resolve the demo identities, then seed the plan.
    pub async fn execute(&self, input: &SeedDemoDataInput) -> Result<SeedSummary, ProvisionError> {
        let identities = self.resolve_identities(&input.emails).await?;
        self.seed(&identities, &input.plan, input.now).await
    }

    /// Teacher and student are mandatory; a missing admin is tolerated.
    pub async fn resolve_identities(
        &self,
        emails: &DemoEmails,
    ) -> Result<SeedIdentities, ProvisionError> {
        let teacher = self.require(Role::Teacher, &emails.teacher).await?;
        let student = self.require(Role::Student, &emails.student).await?;
        let admin = self.resolver.resolve(&emails.admin).await?;

        info!(id = %teacher.id, "teacher identity");
        info!(id = %student.id, "student identity");
        if let Some(admin) = &admin {
            info!(id = %admin.id, "admin identity");
        }
        Ok(SeedIdentities {
            admin,
            teacher,
            student,
        })
    }

    async fn require(&self, role: Role, email: &str) -> Result<Identity, ProvisionError> {
        self.resolver
            .resolve(email)
            .await?
            .ok_or_else(|| ProvisionError::MissingPrerequisite {
                role,
                email: email.to_owned(),
            })
    }

    /// Seed the plan for already-resolved identities.
    pub async fn seed(
        &self,
        identities: &SeedIdentities,
        plan: &SeedPlan,
        now: DateTime<Utc>,
    ) -> Result<SeedSummary, ProvisionError> {
        validate_plan(plan)?;

        let profiles = self.seed_profiles(identities, plan).await?;
        let courses = self.seed_courses(identities, plan).await?;
        let batches = self.seed_batches(identities, plan, &courses).await?;
        let enrollments = self
            .seed_enrollments(identities, &batches[..plan.enrollment_prefix.min(batches.len())], now)
            .await?;

        Ok(SeedSummary {
            profiles,
            courses,
            batches,
            enrollments,
        })
    }

    async fn seed_profiles(
        &self,
        identities: &SeedIdentities,
        plan: &SeedPlan,
    ) -> Result<Vec<Role>, ProvisionError> {
        let mut written = Vec::new();
        for def in &plan.profiles {
            let Some(identity) = identities.for_role(def.role) else {
                continue;
            };
            self.profiles
                .upsert(&ProfileUpsert {
                    id: identity.id,
                    name: def.name.clone(),
                    email: identity.email.clone(),
                    role: def.role,
                    is_active: def.is_active,
                })
                .await
                .map_err(|e| e.context(format!("upsert {} profile", def.role)))?;
            info!(role = %def.role, name = %def.name, "profile ready");
            written.push(def.role);
        }
        Ok(written)
    }

    async fn seed_courses(
        &self,
        identities: &SeedIdentities,
        plan: &SeedPlan,
    ) -> Result<Vec<Seeded<Course>>, ProvisionError> {
        let creator = identities.course_creator().id;
        let mut seeded = Vec::with_capacity(plan.courses.len());
        for def in &plan.courses {
            let existing = self
                .courses
                .find_by_title(&def.title)
                .await
                .map_err(|e| e.context(format!("look up course \"{}\"", def.title)))?;
            if let Some(course) = existing {
                info!(title = %def.title, id = %course.id, "course already exists");
                seeded.push(Seeded::reused(course));
                continue;
            }
            let course = self
                .courses
                .insert(&NewCourse {
                    title: def.title.clone(),
                    description: def.description.clone(),
                    is_published: def.is_published,
                    created_by: creator,
                })
                .await
                .map_err(|e| e.context(format!("failed to insert course \"{}\"", def.title)))?;
            info!(title = %def.title, id = %course.id, "created course");
            seeded.push(Seeded::created(course));
        }
        Ok(seeded)
    }

    async fn seed_batches(
        &self,
        identities: &SeedIdentities,
        plan: &SeedPlan,
        courses: &[Seeded<Course>],
    ) -> Result<Vec<Seeded<Batch>>, ProvisionError> {
        let mut seeded = Vec::with_capacity(plan.batches.len());
        for def in &plan.batches {
            let course = &courses[def.course_index].record;
            let batch = NewBatch {
                course_id: course.id,
                teacher_id: identities.teacher.id,
                start_date: def.start_date,
                end_date: def.end_date,
                seat_limit: def.seat_limit,
            };
            let existing = self.batches.find_by_key(&batch.key()).await.map_err(|e| {
                e.context(format!(
                    "look up batch for \"{}\" starting {}",
                    course.title, def.start_date
                ))
            })?;
            if let Some(found) = existing {
                info!(course = %course.title, start = %def.start_date, id = %found.id, "batch already exists");
                seeded.push(Seeded::reused(found));
                continue;
            }
            let created = self
                .batches
                .insert(&batch)
                .await
                .map_err(|e| e.context(format!("failed to insert batch for \"{}\"", course.title)))?;
            info!(course = %course.title, start = %def.start_date, id = %created.id, "created batch");
            seeded.push(Seeded::created(created));
        }
        Ok(seeded)
    }

    async fn seed_enrollments(
        &self,
        identities: &SeedIdentities,
        batches: &[Seeded<Batch>],
        now: DateTime<Utc>,
    ) -> Result<Vec<Seeded<Enrollment>>, ProvisionError> {
        let student = identities.student.id;
        let mut seeded = Vec::with_capacity(batches.len());
        for batch in batches {
            let batch_id = batch.record.id;
            let existing = self
                .enrollments
                .find(student, batch_id)
                .await
                .map_err(|e| e.context(format!("look up enrollment in batch {batch_id}")))?;
            if let Some(found) = existing {
                info!(batch = %batch_id, "student already enrolled");
                seeded.push(Seeded::reused(found));
                continue;
            }
            let created = self
                .enrollments
                .insert(&NewEnrollment {
                    student_id: student,
                    batch_id,
                    enrolled_at: now,
                })
                .await
                .map_err(|e| {
                    e.context(format!("failed to enroll student in batch {batch_id}"))
                })?;
            info!(batch = %batch_id, "enrolled student");
            seeded.push(Seeded::created(created));
        }
        Ok(seeded)
    }
}

/// Every batch must point at a course the plan defines.
fn validate_plan(plan: &SeedPlan) -> Result<(), ProvisionError> {
    for (i, batch) in plan.batches.iter().enumerate() {
        if batch.course_index >= plan.courses.len() {
            return Err(ProvisionError::InvalidPlan(format!(
                "batch {i} references course {} but only {} are defined",
                batch.course_index,
                plan.courses.len()
            )));
        }
    }
    Ok(())
}
