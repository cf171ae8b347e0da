use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileData {
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub photo: Option<String>,
    pub resume: Option<String>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub link: Option<String>,
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStep {
    pub step_id: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SkillCategory {
    #[default]
    Technical,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
    Tools,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub endorsements: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum GoalStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum GoalCategory {
    #[default]
    Technical,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
    Projects,
    Certifications,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub title: String,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum AssessmentType {
    Technical,
    Aptitude,
    Communication,
    Personality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub score: u32,
    pub completed_at: DateTime<Utc>,
}

/// Placement funnel counters on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PipelineStage {
    Application,
    Interview,
    Offer,
}

/// One per student. `profile_score` and `career_readiness` are derived and
/// only ever assigned from the scoring functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressRecord {
    pub student_id: Uuid,
    pub profile_data: Option<ProfileData>,
    pub profile_score: u8,
    pub career_readiness: u8,
    pub roadmap: Vec<RoadmapStep>,
    pub current_step: u32,
    pub skills: Vec<Skill>,
    pub goals: Vec<Goal>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active: Option<DateTime<Utc>>,
    pub assessments_completed: Vec<Assessment>,
    pub mock_interviews_completed: u32,
    pub interview_score: u32,
    pub applications_submitted: u32,
    pub interviews_scheduled: u32,
    pub offers_received: u32,
}

impl StudentProgressRecord {
    pub fn new(student_id: Uuid, roadmap: Vec<RoadmapStep>) -> Self {
        let current_step = roadmap.first().map(|step| step.step_id).unwrap_or(1);
        Self {
            student_id,
            profile_data: None,
            profile_score: 0,
            career_readiness: 0,
            roadmap,
            current_step,
            skills: Vec::new(),
            goals: Vec::new(),
            current_streak: 0,
            longest_streak: 0,
            last_active: None,
            assessments_completed: Vec::new(),
            mock_interviews_completed: 0,
            interview_score: 0,
            applications_submitted: 0,
            interviews_scheduled: 0,
            offers_received: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudentProgressView {
    pub full_name: String,
    pub email: String,
    pub record: StudentProgressRecord,
}

#[derive(Debug, Clone)]
pub struct StepSummary {
    pub step_id: u32,
    pub title: String,
    pub avg_progress: f64,
    pub completed_count: usize,
    pub student_count: usize,
}

#[derive(Debug, Clone)]
pub struct RoadmapDrift {
    pub step_id: u32,
    pub title: String,
    pub stored_progress: u32,
    pub task_progress: u32,
}
