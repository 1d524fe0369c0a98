//! Seed data policy: which courses, batches and enrollments the demo contains.
//!
//! Batch dates are computed from the run date so the demo always has one batch
//! in progress and one starting this month. Given the same `today` the plan is
//! identical, which is what makes re-running the seeder a no-op.

use chrono::{Datelike, Days, Months, NaiveDate};

use edutech_domain::role::Role;

/// Number of leading batches the demo student is enrolled in.
pub const DEMO_ENROLLMENT_PREFIX: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDef {
    pub title: String,
    pub description: String,
    pub is_published: bool,
}

/// A batch bound to a course by its index in [`SeedPlan::courses`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDef {
    pub course_index: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub seat_limit: u32,
}

/// Display name (and optional active flag) written to a demo profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDef {
    pub role: Role,
    pub name: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub profiles: Vec<ProfileDef>,
    pub courses: Vec<CourseDef>,
    pub batches: Vec<BatchDef>,
    /// The student is enrolled in the first `enrollment_prefix` batches.
    pub enrollment_prefix: usize,
}

impl SeedPlan {
    /// The demo data set, with batch dates relative to `today`.
    pub fn demo(today: NaiveDate) -> Self {
        let profiles = vec![
            ProfileDef {
                role: Role::Teacher,
                name: "Rajesh Kumar".to_owned(),
                is_active: Some(true),
            },
            ProfileDef {
                role: Role::Student,
                name: "Priya Sharma".to_owned(),
                is_active: None,
            },
            ProfileDef {
                role: Role::Admin,
                name: "Admin User".to_owned(),
                is_active: None,
            },
        ];

        let courses = vec![
            course(
                "Class 10 Mathematics – Board Prep",
                "Complete NCERT-aligned preparation for Class 10 Maths including Algebra, Geometry, Trigonometry, and Statistics.",
                true,
            ),
            course(
                "Class 12 Physics – JEE Foundation",
                "In-depth Physics for Class 12 with focus on Mechanics, Electrostatics, and Optics for JEE preparation.",
                true,
            ),
            course(
                "Class 9 Science – CBSE",
                "Foundational Science covering Physics, Chemistry, and Biology for Class 9 CBSE students.",
                false,
            ),
        ];

        let batches = vec![
            BatchDef {
                course_index: 0,
                start_date: month_day(today, -1, 1),
                end_date: month_day(today, 3, 30),
                seat_limit: 30,
            },
            BatchDef {
                course_index: 0,
                start_date: month_day(today, 0, 15),
                end_date: month_day(today, 4, 30),
                seat_limit: 25,
            },
            BatchDef {
                course_index: 1,
                start_date: month_day(today, -2, 1),
                end_date: month_day(today, 2, 28),
                seat_limit: 20,
            },
        ];

        Self {
            profiles,
            courses,
            batches,
            enrollment_prefix: DEMO_ENROLLMENT_PREFIX,
        }
    }
}

fn course(title: &str, description: &str, is_published: bool) -> CourseDef {
    CourseDef {
        title: title.to_owned(),
        description: description.to_owned(),
        is_published,
    }
}

/// Day `day` (1-based) of the month `month_offset` months away from `today`'s.
///
/// A day past the end of the target month rolls over into the next month,
/// e.g. day 30 of February lands on 1 or 2 March.
pub fn month_day(today: NaiveDate, month_offset: i32, day: u32) -> NaiveDate {
    let first = today.with_day(1).unwrap_or(today);
    let shifted = if month_offset >= 0 {
        first.checked_add_months(Months::new(month_offset.unsigned_abs()))
    } else {
        first.checked_sub_months(Months::new(month_offset.unsigned_abs()))
    }
    .unwrap_or(first);
    shifted
        .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
        .unwrap_or(shifted)
}
