//! Command result reporter: formats PASS/FAIL lines and a summary.
//!
//! Lines are collected first and printed by [`Reporter::print`], so tests can
//! assert on the exact output.

use edutech_domain::role::Role;

use crate::domain::types::{Provenance, Seeded};
use crate::usecase::provision::{ConfirmOutcome, EnsureOutcome, IdentityStatus};
use crate::usecase::seed::SeedSummary;
use crate::usecase::verify::{PolicyCheck, PresenceCheck, VerificationReport};

#[derive(Debug, Default)]
pub struct Reporter {
    lines: Vec<String>,
    passed: usize,
    failed: usize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn pass(&mut self, label: impl AsRef<str>) {
        self.passed += 1;
        self.lines.push(format!("PASS  {}", label.as_ref()));
    }

    fn fail(&mut self, label: impl AsRef<str>) {
        self.failed += 1;
        self.lines.push(format!("FAIL  {}", label.as_ref()));
    }

    fn skip(&mut self, label: impl AsRef<str>) {
        self.lines.push(format!("SKIP  {}", label.as_ref()));
    }

    fn detail(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("        {}", text.as_ref()));
    }

    pub fn identities(&mut self, outcomes: &[EnsureOutcome]) {
        for outcome in outcomes {
            let state = match outcome.status {
                IdentityStatus::Created => "created",
                IdentityStatus::AlreadyExists => "already exists",
            };
            self.pass(format!(
                "[{}] {} {state} ({})",
                outcome.role, outcome.identity.email, outcome.identity.id
            ));
        }
    }

    pub fn confirmations(&mut self, outcomes: &[(String, ConfirmOutcome)]) {
        for (email, outcome) in outcomes {
            match outcome {
                ConfirmOutcome::Confirmed(identity) => {
                    self.pass(format!("{email} confirmed ({})", identity.id))
                }
                ConfirmOutcome::NotFound => self.skip(format!("{email} not found")),
            }
        }
    }

    pub fn seed_summary(&mut self, summary: &SeedSummary) {
        for role in &summary.profiles {
            self.pass(format!("[profile] {role}"));
        }
        for course in &summary.courses {
            self.pass(format!(
                "[course] \"{}\" {}",
                course.record.title,
                provenance(course)
            ));
        }
        for batch in &summary.batches {
            self.pass(format!(
                "[batch] {} → {} ({} seats) {}",
                batch.record.start_date,
                batch.record.end_date,
                batch.record.seat_limit,
                provenance(batch)
            ));
        }
        for enrollment in &summary.enrollments {
            self.pass(format!(
                "[enrollment] batch {} {}",
                enrollment.record.batch_id,
                provenance(enrollment)
            ));
        }
        self.detail(format!("{} new row(s)", summary.created()));
    }

    pub fn verification(&mut self, report: &VerificationReport) {
        self.schema(report.sampled_profiles);
        self.presence(&report.presence);
        self.policy(&report.policy);
    }

    pub fn schema(&mut self, sampled: usize) {
        self.pass(format!("profiles table reachable ({sampled} row(s) sampled)"));
    }

    pub fn presence(&mut self, checks: &[PresenceCheck]) {
        for check in checks {
            if check.is_present() {
                self.pass(format!("profile {} ({})", check.email, role_label(check.role)));
            } else {
                self.fail(format!("profile {} missing", check.email));
            }
        }
    }

    pub fn policy(&mut self, policy: &PolicyCheck) {
        match policy {
            PolicyCheck::Passed { name, role } => self.pass(format!(
                "row level security: self-access as {name} ({})",
                role_label(*role)
            )),
            PolicyCheck::Skipped { reason } => {
                self.skip("row level security: probe account could not sign in");
                self.detail(format!("error: {reason}"));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push_str("\n\n────────────────────────────────────────────────────\n");
        out.push_str(&format!(
            "Results: {} passed, {} failed",
            self.passed, self.failed
        ));
        out
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}

fn role_label(role: Option<Role>) -> String {
    role.map_or_else(|| "no role".to_owned(), |r| r.to_string())
}

fn provenance<T>(seeded: &Seeded<T>) -> &'static str {
    match seeded.provenance {
        Provenance::Created => "created",
        Provenance::Reused => "exists",
    }
}
