//! `provision`: idempotent setup of the demo accounts and data.
//!
//! # Usage
//!
//! ```bash
//! provision seed-users      # create admin/teacher/student identities + profiles
//! provision confirm-users   # mark their emails as confirmed
//! provision seed-demo       # courses, batches and enrollments
//! provision verify          # read-only health check
//! ```
//!
//! Settings come from the environment, after a `.env` file in the working
//! directory has been merged in. Exits 1 on the first fatal error.

use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::error;

use edutech_core::config::Config;
use edutech_core::tracing::init_tracing;
use edutech_provisioning::config::{BackendConfig, DemoCredentials, DemoEmails, VerifyConfig};
use edutech_provisioning::domain::plan::SeedPlan;
use edutech_provisioning::error::ProvisionError;
use edutech_provisioning::infra::Backend;
use edutech_provisioning::reporter::Reporter;
use edutech_provisioning::usecase::provision::{
    ConfirmIdentityUseCase, EnsureIdentityInput, EnsureIdentityUseCase,
};
use edutech_provisioning::usecase::seed::{SeedDemoDataInput, SeedDemoDataUseCase};
use edutech_provisioning::usecase::verify::{VerifySetupUseCase, check_presence};

#[derive(Parser)]
#[command(name = "provision", about = "Provision demo accounts and data on the backend")]
struct Args {
    /// Emit logs as JSON lines instead of compact text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Command {
    /// Create the admin, teacher and student identities and their profiles
    SeedUsers,
    /// Mark the demo identities' emails as confirmed
    ConfirmUsers,
    /// Seed demo profiles, courses, batches and enrollments
    SeedDemo,
    /// Check that the schema is reachable and row level security allows self-access
    Verify,
}

impl Command {
    fn name(self) -> &'static str {
        match self {
            Self::SeedUsers => "seed-users",
            Self::ConfirmUsers => "confirm-users",
            Self::SeedDemo => "seed-demo",
            Self::Verify => "verify",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut reporter = Reporter::new();
    match run(args.command, &mut reporter).await {
        Ok(()) => {
            reporter.print();
            ExitCode::SUCCESS
        }
        Err(err) => {
            if !reporter.is_empty() {
                reporter.print();
            }
            error!(command = args.command.name(), kind = err.kind(), "command failed");
            eprintln!("{} failed: {err}", args.command.name());
            ExitCode::FAILURE
        }
    }
}

/// Load every setting the command needs, then run it.
async fn run(command: Command, reporter: &mut Reporter) -> Result<(), ProvisionError> {
    let backend = Backend::new(&BackendConfig::from_env()?);

    match command {
        Command::SeedUsers => {
            let credentials = DemoCredentials::from_env()?;
            let inputs: Vec<EnsureIdentityInput> = credentials
                .accounts()
                .into_iter()
                .map(|(role, credentials)| EnsureIdentityInput {
                    credentials: credentials.clone(),
                    role,
                })
                .collect();

            let usecase = EnsureIdentityUseCase {
                resolver: backend.resolver(),
                directory: backend.directory(),
                profiles: backend.profiles(),
            };
            reporter.identities(&usecase.execute_all(&inputs).await?);
        }
        Command::ConfirmUsers => {
            let emails = DemoEmails::from_env()?;

            let usecase = ConfirmIdentityUseCase {
                resolver: backend.resolver(),
                directory: backend.directory(),
            };
            reporter.confirmations(&usecase.execute_all(&emails.all()).await?);
        }
        Command::SeedDemo => {
            let emails = DemoEmails::from_env()?;
            let now = Utc::now();
            let input = SeedDemoDataInput {
                emails,
                plan: SeedPlan::demo(now.date_naive()),
                now,
            };

            let usecase = SeedDemoDataUseCase {
                resolver: backend.resolver(),
                profiles: backend.profiles(),
                courses: backend.courses(),
                batches: backend.batches(),
                enrollments: backend.enrollments(),
            };
            reporter.seed_summary(&usecase.execute(&input).await?);
        }
        Command::Verify => {
            let config = VerifyConfig::from_env()?;
            let expected: Vec<String> = config
                .expected
                .all()
                .into_iter()
                .map(str::to_owned)
                .collect();

            let usecase = VerifySetupUseCase {
                profiles: backend.profiles(),
                sessions: backend.sessions(),
            };
            // Report step by step so a failed policy check still prints the
            // schema and presence lines.
            let sample = usecase.sample_profiles().await?;
            reporter.schema(sample.len());
            reporter.presence(&check_presence(&sample, &expected));
            reporter.policy(&usecase.check_self_access(&config.probe).await?);
        }
    }
    Ok(())
}
