use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod models;
mod progress;
mod report;
mod roadmap;
mod scoring;

use models::{
    AssessmentType, Certification, Education, Experience, GoalCategory, GoalStatus,
    PipelineStage, Project, SkillCategory, StudentProgressRecord,
};
use progress::{ProfileEntry, ProfilePatch};

#[derive(Parser)]
#[command(name = "career-progress")]
#[command(about = "Student career progress and readiness tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Register a student (or rename an existing one)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Print a student's progress record
    Show {
        #[arg(long)]
        email: String,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit profile fields; pass an empty value to clear one
    Profile {
        #[arg(long)]
        email: String,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        linkedin: Option<String>,
        #[arg(long)]
        github: Option<String>,
        #[arg(long)]
        portfolio: Option<String>,
        #[arg(long)]
        photo: Option<String>,
        #[arg(long)]
        resume: Option<String>,
    },
    /// Add an education, experience, project or certification entry
    Add {
        #[arg(long)]
        email: String,
        #[command(subcommand)]
        entry: EntryCommand,
    },
    /// Set a roadmap step's progress (0-100)
    Step {
        #[arg(long)]
        email: String,
        #[arg(long)]
        step: u32,
        #[arg(long)]
        progress: u32,
    },
    /// Mark a roadmap task done or not done
    Task {
        #[arg(long)]
        email: String,
        #[arg(long)]
        step: u32,
        #[arg(long)]
        task: String,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        completed: bool,
    },
    /// Add or update a skill by name
    Skill {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        level: u32,
        #[arg(long, value_enum)]
        category: Option<SkillCategory>,
        #[arg(long)]
        verified: bool,
    },
    /// Add a goal
    Goal {
        #[arg(long)]
        email: String,
        #[arg(long)]
        title: String,
        #[arg(long, value_enum, default_value_t = GoalCategory::Technical)]
        category: GoalCategory,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<NaiveDate>,
    },
    /// Change a goal's status by its position in `show` output (1-based)
    GoalStatus {
        #[arg(long)]
        email: String,
        #[arg(long)]
        goal: usize,
        #[arg(long, value_enum)]
        status: GoalStatus,
    },
    /// Record a completed assessment (score 0-100)
    Assessment {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum)]
        kind: AssessmentType,
        #[arg(long)]
        score: u32,
    },
    /// Record a mock interview and its score (0-100)
    MockInterview {
        #[arg(long)]
        email: String,
        #[arg(long)]
        score: u32,
    },
    /// Count a job application, scheduled interview or offer
    Pipeline {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum)]
        stage: PipelineStage,
    },
    /// Import skills from a CSV file
    ImportSkills {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown readiness report
    Report {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum EntryCommand {
    Education {
        #[arg(long)]
        institution: String,
        #[arg(long)]
        degree: Option<String>,
        #[arg(long)]
        field: Option<String>,
        #[arg(long)]
        start_year: Option<i32>,
        #[arg(long)]
        end_year: Option<i32>,
        #[arg(long)]
        grade: Option<String>,
    },
    Experience {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        current: bool,
        #[arg(long)]
        description: Option<String>,
    },
    Project {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_delimiter = ',')]
        technologies: Vec<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        github: Option<String>,
    },
    Certification {
        #[arg(long)]
        name: String,
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        issue_date: Option<NaiveDate>,
        #[arg(long)]
        expiry_date: Option<NaiveDate>,
        #[arg(long)]
        credential_id: Option<String>,
        #[arg(long)]
        credential_url: Option<String>,
    },
}

impl From<EntryCommand> for ProfileEntry {
    fn from(command: EntryCommand) -> Self {
        match command {
            EntryCommand::Education {
                institution,
                degree,
                field,
                start_year,
                end_year,
                grade,
            } => ProfileEntry::Education(Education {
                institution: Some(institution),
                degree,
                field,
                start_year,
                end_year,
                grade,
            }),
            EntryCommand::Experience {
                company,
                position,
                start_date,
                end_date,
                current,
                description,
            } => ProfileEntry::Experience(Experience {
                company: Some(company),
                position,
                start_date,
                end_date,
                current,
                description,
            }),
            EntryCommand::Project {
                title,
                description,
                technologies,
                link,
                github,
            } => ProfileEntry::Project(Project {
                title: Some(title),
                description,
                technologies,
                link,
                github,
            }),
            EntryCommand::Certification {
                name,
                issuer,
                issue_date,
                expiry_date,
                credential_id,
                credential_url,
            } => ProfileEntry::Certification(Certification {
                name: Some(name),
                issuer,
                issue_date,
                expiry_date,
                credential_id,
                credential_url,
            }),
        }
    }
}

fn print_summary(record: &StudentProgressRecord) {
    println!(
        "Profile score {} | career readiness {} | streak {} (best {})",
        record.profile_score,
        record.career_readiness,
        record.current_streak,
        record.longest_streak
    );
    println!(
        "Roadmap: on step {}, {} active steps",
        record.current_step,
        roadmap::active_steps(&record.roadmap)
    );
    for step in &record.roadmap {
        let done = step.tasks.iter().filter(|task| task.completed).count();
        println!(
            "  {}. {} {}% ({}/{} tasks){}",
            step.step_id,
            step.title,
            step.progress,
            done,
            step.tasks.len(),
            if step.completed { " done" } else { "" }
        );
    }
    if !record.skills.is_empty() {
        println!("Skills:");
        for skill in &record.skills {
            println!(
                "  - {} {}{}",
                skill.name,
                skill.level,
                if skill.verified { " (verified)" } else { "" }
            );
        }
    }
    if !record.goals.is_empty() {
        println!("Goals:");
        for (position, goal) in record.goals.iter().enumerate() {
            println!(
                "  {}. {} ({:?}) [{:?}]",
                position + 1,
                goal.title,
                goal.category,
                goal.status
            );
        }
    }
    if !record.assessments_completed.is_empty() {
        println!("Assessments:");
        for assessment in &record.assessments_completed {
            println!(
                "  - {:?} {} on {}",
                assessment.kind,
                assessment.score,
                assessment.completed_at.date_naive()
            );
        }
    }
    println!(
        "Mock interviews {} (avg score {}) | applications {} | interviews {} | offers {}",
        record.mock_interviews_completed,
        record.interview_score,
        record.applications_submitted,
        record.interviews_scheduled,
        record.offers_received
    );
    if let Some(last_active) = record.last_active {
        println!("Last active {}", last_active.format("%Y-%m-%d %H:%M UTC"));
    }
}

async fn commit(pool: &sqlx::PgPool, record: &mut StudentProgressRecord) -> anyhow::Result<()> {
    progress::touch(record, Utc::now());
    db::save(pool, record).await?;
    print_summary(record);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "career_progress=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Register { name, email } => {
            let student_id = db::register_student(&pool, &name, &email).await?;
            db::load_or_create(&pool, student_id).await?;
            println!("Registered {name} ({email}) as {student_id}.");
        }
        Commands::Show { email, json } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let record = db::load_or_create(&pool, student_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_summary(&record);
            }
        }
        Commands::Profile {
            email,
            bio,
            phone,
            address,
            linkedin,
            github,
            portfolio,
            photo,
            resume,
        } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::update_profile(
                &mut record,
                ProfilePatch {
                    bio,
                    phone,
                    address,
                    linkedin,
                    github,
                    portfolio,
                    photo,
                    resume,
                },
            );
            commit(&pool, &mut record).await?;
        }
        Commands::Add { email, entry } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::add_profile_entry(&mut record, entry.into());
            commit(&pool, &mut record).await?;
        }
        Commands::Step {
            email,
            step,
            progress: value,
        } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::set_step_progress(&mut record, step, value, Utc::now())?;
            commit(&pool, &mut record).await?;
        }
        Commands::Task {
            email,
            step,
            task,
            completed,
        } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::set_task_completed(&mut record, step, &task, completed, Utc::now())?;
            commit(&pool, &mut record).await?;
        }
        Commands::Skill {
            email,
            name,
            level,
            category,
            verified,
        } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::upsert_skill(&mut record, &name, level, category)?;
            if verified {
                progress::mark_skill_verified(&mut record, &name, Utc::now())?;
            }
            commit(&pool, &mut record).await?;
        }
        Commands::Goal {
            email,
            title,
            category,
            description,
            deadline,
        } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::add_goal(&mut record, &title, category, description, deadline);
            commit(&pool, &mut record).await?;
        }
        Commands::GoalStatus {
            email,
            goal,
            status,
        } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            let index = goal.checked_sub(1).context("goal positions start at 1")?;
            progress::set_goal_status(&mut record, index, status, Utc::now())?;
            commit(&pool, &mut record).await?;
        }
        Commands::Assessment { email, kind, score } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::record_assessment(&mut record, kind, score, Utc::now());
            commit(&pool, &mut record).await?;
        }
        Commands::MockInterview { email, score } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::record_mock_interview(&mut record, score);
            commit(&pool, &mut record).await?;
        }
        Commands::Pipeline { email, stage } => {
            let student_id = db::find_student_id(&pool, &email).await?;
            let mut record = db::load_or_create(&pool, student_id).await?;
            progress::record_pipeline_event(&mut record, stage);
            commit(&pool, &mut record).await?;
        }
        Commands::ImportSkills { csv } => {
            let applied = db::import_skills_csv(&pool, &csv).await?;
            println!("Applied {applied} skills from {}.", csv.display());
        }
        Commands::Report { limit, out } => {
            let students = db::fetch_all(&pool).await?;
            let report = report::build_report(&students, limit);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
