use std::collections::BTreeMap;
use std::io::Read;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    Assessment, AssessmentType, Education, Experience, Goal, GoalCategory, GoalStatus,
    PipelineStage, ProfileData, Project, RoadmapStep, Skill, SkillCategory, StudentProgressRecord,
    StudentProgressView,
};
use crate::progress::{self, ProfileEntry, ProfilePatch};
use crate::roadmap;

const PROGRESS_COLUMNS: &str = "p.student_id, p.profile_data, p.profile_score, \
     p.career_readiness, p.roadmap, p.current_step, p.skills, p.goals, \
     p.current_streak, p.longest_streak, p.last_active, p.assessments_completed, \
     p.mock_interviews_completed, p.interview_score, p.applications_submitted, \
     p.interviews_scheduled, p.offers_received";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn register_student(pool: &PgPool, full_name: &str, email: &str) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO career_progress.students (id, full_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(full_name)
    .bind(email)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

pub async fn find_student_id(pool: &PgPool, email: &str) -> anyhow::Result<Uuid> {
    let row = sqlx::query("SELECT id FROM career_progress.students WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no student registered with email {email}"))?;

    Ok(row.get("id"))
}

fn counter(row: &PgRow, column: &str) -> anyhow::Result<u32> {
    u32::try_from(row.try_get::<i32, _>(column)?)
        .with_context(|| format!("{column} out of range"))
}

fn record_from_row(row: &PgRow) -> anyhow::Result<StudentProgressRecord> {
    let profile_data: Option<Json<ProfileData>> = row.try_get("profile_data")?;
    let roadmap: Json<Vec<RoadmapStep>> = row.try_get("roadmap")?;
    let skills: Json<Vec<Skill>> = row.try_get("skills")?;
    let goals: Json<Vec<Goal>> = row.try_get("goals")?;
    let assessments: Json<Vec<Assessment>> = row.try_get("assessments_completed")?;

    Ok(StudentProgressRecord {
        student_id: row.try_get("student_id")?,
        profile_data: profile_data.map(|data| data.0),
        profile_score: u8::try_from(row.try_get::<i16, _>("profile_score")?)
            .context("profile_score out of range")?,
        career_readiness: u8::try_from(row.try_get::<i16, _>("career_readiness")?)
            .context("career_readiness out of range")?,
        roadmap: roadmap.0,
        current_step: counter(row, "current_step")?,
        skills: skills.0,
        goals: goals.0,
        current_streak: counter(row, "current_streak")?,
        longest_streak: counter(row, "longest_streak")?,
        last_active: row.try_get("last_active")?,
        assessments_completed: assessments.0,
        mock_interviews_completed: counter(row, "mock_interviews_completed")?,
        interview_score: counter(row, "interview_score")?,
        applications_submitted: counter(row, "applications_submitted")?,
        interviews_scheduled: counter(row, "interviews_scheduled")?,
        offers_received: counter(row, "offers_received")?,
    })
}

/// Loads the student's record, creating it with the default roadmap on first access.
pub async fn load_or_create(pool: &PgPool, student_id: Uuid) -> anyhow::Result<StudentProgressRecord> {
    let query = format!(
        "SELECT {PROGRESS_COLUMNS} FROM career_progress.student_progress p WHERE p.student_id = $1"
    );
    if let Some(row) = sqlx::query(&query).bind(student_id).fetch_optional(pool).await? {
        return record_from_row(&row);
    }

    let record = StudentProgressRecord::new(student_id, roadmap::default_roadmap());
    let result = sqlx::query(
        r#"
        INSERT INTO career_progress.student_progress
        (student_id, profile_data, profile_score, career_readiness, roadmap, current_step,
         skills, goals, current_streak, longest_streak)
        VALUES ($1, NULL, 0, 0, $2, $3, '[]'::jsonb, '[]'::jsonb, 0, 0)
        ON CONFLICT (student_id) DO NOTHING
        "#,
    )
    .bind(student_id)
    .bind(Json(&record.roadmap))
    .bind(record.current_step as i32)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Another writer created it between our read and insert.
        let row = sqlx::query(&query).bind(student_id).fetch_one(pool).await?;
        return record_from_row(&row);
    }

    tracing::info!(%student_id, "created progress record with default roadmap");
    Ok(record)
}

/// Whole-record write; the last save wins.
pub async fn save(pool: &PgPool, record: &StudentProgressRecord) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE career_progress.student_progress
        SET profile_data = $2, profile_score = $3, career_readiness = $4, roadmap = $5,
            current_step = $6, skills = $7, goals = $8, current_streak = $9,
            longest_streak = $10, last_active = $11, assessments_completed = $12,
            mock_interviews_completed = $13, interview_score = $14,
            applications_submitted = $15, interviews_scheduled = $16,
            offers_received = $17, updated_at = now()
        WHERE student_id = $1
        "#,
    )
    .bind(record.student_id)
    .bind(record.profile_data.as_ref().map(Json))
    .bind(i16::from(record.profile_score))
    .bind(i16::from(record.career_readiness))
    .bind(Json(&record.roadmap))
    .bind(record.current_step as i32)
    .bind(Json(&record.skills))
    .bind(Json(&record.goals))
    .bind(record.current_streak as i32)
    .bind(record.longest_streak as i32)
    .bind(record.last_active)
    .bind(Json(&record.assessments_completed))
    .bind(record.mock_interviews_completed as i32)
    .bind(record.interview_score as i32)
    .bind(record.applications_submitted as i32)
    .bind(record.interviews_scheduled as i32)
    .bind(record.offers_received as i32)
    .execute(pool)
    .await?;

    tracing::info!(
        student_id = %record.student_id,
        profile_score = record.profile_score,
        career_readiness = record.career_readiness,
        "saved progress record"
    );
    Ok(())
}

pub async fn fetch_all(pool: &PgPool) -> anyhow::Result<Vec<StudentProgressView>> {
    let query = format!(
        "SELECT s.full_name, s.email, {PROGRESS_COLUMNS} \
         FROM career_progress.student_progress p \
         JOIN career_progress.students s ON s.id = p.student_id \
         ORDER BY p.career_readiness DESC, s.full_name"
    );
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    let mut views = Vec::new();

    for row in rows {
        views.push(StudentProgressView {
            full_name: row.get("full_name"),
            email: row.get("email"),
            record: record_from_row(&row)?,
        });
    }

    Ok(views)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let students = vec![
        ("Avery Lee", "avery.lee@college.edu"),
        ("Jules Moreno", "jules.moreno@college.edu"),
        ("Kiara Patel", "kiara.patel@college.edu"),
    ];

    for (index, (name, email)) in students.into_iter().enumerate() {
        let student_id = register_student(pool, name, email).await?;
        let mut record = load_or_create(pool, student_id).await?;
        if record.profile_data.is_some() || !record.goals.is_empty() {
            tracing::info!(%email, "seed student already has progress, skipping");
            continue;
        }

        progress::update_profile(
            &mut record,
            ProfilePatch {
                bio: Some(format!(
                    "{name} is a final-year computer science student interested in backend systems."
                )),
                phone: Some("555-0100".to_string()),
                github: Some(format!("github.com/{}", name.to_lowercase().replace(' ', ""))),
                photo: (index != 1).then(|| "avatar.png".to_string()),
                ..ProfilePatch::default()
            },
        );
        progress::add_profile_entry(
            &mut record,
            ProfileEntry::Education(Education {
                institution: Some("State College".to_string()),
                degree: Some("B.Tech".to_string()),
                field: Some("Computer Science".to_string()),
                start_year: Some(2022),
                end_year: Some(2026),
                grade: None,
            }),
        );
        if index == 0 {
            progress::add_profile_entry(
                &mut record,
                ProfileEntry::Experience(Experience {
                    company: Some("Campus IT".to_string()),
                    position: Some("Student Developer".to_string()),
                    start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
                    current: true,
                    ..Experience::default()
                }),
            );
            progress::add_profile_entry(
                &mut record,
                ProfileEntry::Project(Project {
                    title: Some("Hostel booking portal".to_string()),
                    technologies: vec!["Rust".to_string(), "Postgres".to_string()],
                    ..Project::default()
                }),
            );
        }

        let skills = [
            ("Rust", 60, SkillCategory::Technical),
            ("SQL", 70, SkillCategory::Technical),
            ("Git", 80, SkillCategory::Tools),
            ("Communication", 65, SkillCategory::SoftSkills),
            ("Docker", 40, SkillCategory::Tools),
        ];
        for (skill, level, category) in skills.into_iter().take(3 + index) {
            progress::upsert_skill(&mut record, skill, level, Some(category))?;
        }

        progress::set_task_completed(&mut record, 1, "1-1", true, now)?;
        progress::set_task_completed(&mut record, 1, "1-2", true, now)?;
        progress::set_step_progress(&mut record, 1, 50 + 25 * index as u32, now)?;

        progress::add_goal(
            &mut record,
            "Finish capstone project",
            GoalCategory::Projects,
            None,
            None,
        );
        progress::add_goal(
            &mut record,
            "Clear technical assessment",
            GoalCategory::Technical,
            None,
            NaiveDate::from_ymd_opt(2026, 4, 30),
        );
        if index == 2 {
            progress::set_goal_status(&mut record, 0, GoalStatus::Completed, now)?;
            progress::record_assessment(&mut record, AssessmentType::Technical, 78, now);
            progress::record_mock_interview(&mut record, 72);
            progress::record_pipeline_event(&mut record, PipelineStage::Application);
        }
        progress::touch(&mut record, now);

        save(pool, &record).await?;
    }

    Ok(())
}

#[derive(Debug, serde::Deserialize)]
pub struct SkillRow {
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    pub name: String,
    pub level: u32,
    #[serde(default)]
    pub category: Option<SkillCategory>,
    #[serde(default)]
    pub verified: Option<bool>,
}

pub fn parse_skill_rows<R: Read>(input: R) -> anyhow::Result<Vec<SkillRow>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut rows = Vec::new();

    for (line, result) in reader.deserialize::<SkillRow>().enumerate() {
        rows.push(result.with_context(|| format!("invalid skill row {}", line + 1))?);
    }

    Ok(rows)
}

pub async fn import_skills_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let rows = parse_skill_rows(file)?;

    let mut by_student: BTreeMap<String, Vec<SkillRow>> = BTreeMap::new();
    for row in rows {
        by_student.entry(row.email.clone()).or_default().push(row);
    }

    let now = Utc::now();
    let mut applied = 0usize;

    for (email, rows) in by_student {
        // A name registers or renames the student; without one the student must exist.
        let student_id = match rows.iter().find_map(|row| row.full_name.as_deref()) {
            Some(full_name) => register_student(pool, full_name, &email).await?,
            None => find_student_id(pool, &email).await?,
        };
        let mut record = load_or_create(pool, student_id).await?;

        for row in &rows {
            progress::upsert_skill(&mut record, &row.name, row.level, row.category)?;
            if row.verified == Some(true) {
                progress::mark_skill_verified(&mut record, &row.name, now)?;
            }
            applied += 1;
        }

        progress::touch(&mut record, now);
        save(pool, &record).await?;
        tracing::debug!(%email, skills = rows.len(), "imported skills");
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_skill_rows_with_optional_columns() {
        let input = "full_name,email,name,level,category,verified\n\
                     Avery Lee,avery@example.com,Rust,70,Technical,true\n\
                     Avery Lee,avery@example.com,Teamwork,55,Soft Skills,\n\
                     Jules Moreno,jules@example.com,Git,40,,\n";
        let rows = parse_skill_rows(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].verified, Some(true));
        assert_eq!(rows[1].category, Some(SkillCategory::SoftSkills));
        assert_eq!(rows[1].verified, None);
        assert_eq!(rows[2].category, None);
        assert_eq!(rows[2].level, 40);
        assert_eq!(rows[0].full_name.as_deref(), Some("Avery Lee"));
    }

    #[test]
    fn full_name_column_is_optional() {
        let input = "email,name,level,category
                     avery@example.com,Rust,70,Technical
";
        let rows = parse_skill_rows(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, None);
        assert_eq!(rows[0].email, "avery@example.com");
        assert_eq!(rows[0].category, Some(SkillCategory::Technical));
    }

    #[test]
    fn rejects_non_numeric_levels() {
        let input = "full_name,email,name,level\nAvery Lee,avery@example.com,Rust,high\n";
        assert!(parse_skill_rows(input.as_bytes()).is_err());
    }
}
