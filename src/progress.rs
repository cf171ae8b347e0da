//! Write paths over a [`StudentProgressRecord`]. Each one applies its change
//! and then re-runs whichever scorers read the data it touched.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ProgressError;
use crate::models::{
    Assessment, AssessmentType, Certification, Education, Experience, Goal, GoalCategory,
    GoalStatus, PipelineStage, Project, RoadmapStep, Skill, SkillCategory, StudentProgressRecord,
};
use crate::roadmap;
use crate::scoring;

/// Fields left as `None` are untouched. `Some("")` clears a field.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub photo: Option<String>,
    pub resume: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ProfileEntry {
    Education(Education),
    Experience(Experience),
    Project(Project),
    Certification(Certification),
}

fn merge_field(slot: &mut Option<String>, value: Option<String>) {
    match value {
        Some(value) if value.is_empty() => *slot = None,
        Some(value) => *slot = Some(value),
        None => {}
    }
}

pub fn update_profile(record: &mut StudentProgressRecord, patch: ProfilePatch) {
    let profile = record.profile_data.get_or_insert_with(Default::default);
    merge_field(&mut profile.bio, patch.bio);
    merge_field(&mut profile.phone, patch.phone);
    merge_field(&mut profile.address, patch.address);
    merge_field(&mut profile.linkedin, patch.linkedin);
    merge_field(&mut profile.github, patch.github);
    merge_field(&mut profile.portfolio, patch.portfolio);
    merge_field(&mut profile.photo, patch.photo);
    merge_field(&mut profile.resume, patch.resume);

    scoring::rescore(record);
}

pub fn add_profile_entry(record: &mut StudentProgressRecord, entry: ProfileEntry) {
    let profile = record.profile_data.get_or_insert_with(Default::default);
    match entry {
        ProfileEntry::Education(value) => profile.education.push(value),
        ProfileEntry::Experience(value) => profile.experience.push(value),
        ProfileEntry::Project(value) => profile.projects.push(value),
        ProfileEntry::Certification(value) => profile.certifications.push(value),
    }

    scoring::rescore(record);
}

fn find_step(
    roadmap: &mut [RoadmapStep],
    step_id: u32,
) -> Result<&mut RoadmapStep, ProgressError> {
    roadmap
        .iter_mut()
        .find(|step| step.step_id == step_id)
        .ok_or(ProgressError::UnknownStep(step_id))
}

pub fn set_step_progress(
    record: &mut StudentProgressRecord,
    step_id: u32,
    progress: u32,
    now: DateTime<Utc>,
) -> Result<(), ProgressError> {
    let step = find_step(&mut record.roadmap, step_id)?;
    step.progress = progress.min(100);
    let completed = step.progress >= 100;
    if completed && !step.completed {
        step.completed_at = Some(now);
    } else if !completed {
        step.completed_at = None;
    }
    step.completed = completed;

    record.current_step = roadmap::current_step(&record.roadmap);
    scoring::rescore_readiness(record);
    Ok(())
}

/// Toggles a checklist task. The step's own `progress` is left as stored.
pub fn set_task_completed(
    record: &mut StudentProgressRecord,
    step_id: u32,
    task_id: &str,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<(), ProgressError> {
    let step = find_step(&mut record.roadmap, step_id)?;
    let task = step
        .tasks
        .iter_mut()
        .find(|task| task.id == task_id)
        .ok_or_else(|| ProgressError::UnknownTask {
            step_id,
            task_id: task_id.to_string(),
        })?;

    if completed && !task.completed {
        task.completed_at = Some(now);
    } else if !completed {
        task.completed_at = None;
    }
    task.completed = completed;

    scoring::rescore_readiness(record);
    Ok(())
}

/// Inserts or updates a skill by exact, untrimmed name. Levels are clamped to
/// 0-100 here since the scorers do not check ranges.
pub fn upsert_skill(
    record: &mut StudentProgressRecord,
    name: &str,
    level: u32,
    category: Option<SkillCategory>,
) -> Result<(), ProgressError> {
    if name.trim().is_empty() {
        return Err(ProgressError::BlankSkillName);
    }
    let level = level.min(100);

    match record.skills.iter_mut().find(|skill| skill.name == name) {
        Some(skill) => {
            skill.level = level;
            if let Some(category) = category {
                skill.category = category;
            }
        }
        None => record.skills.push(Skill {
            name: name.to_string(),
            category: category.unwrap_or_default(),
            level,
            verified: false,
            verified_at: None,
            endorsements: 0,
        }),
    }

    scoring::rescore(record);
    Ok(())
}

/// Verification does not feed either score, so nothing is rescored.
pub fn mark_skill_verified(
    record: &mut StudentProgressRecord,
    name: &str,
    now: DateTime<Utc>,
) -> Result<(), ProgressError> {
    let skill = record
        .skills
        .iter_mut()
        .find(|skill| skill.name == name)
        .ok_or_else(|| ProgressError::UnknownSkill(name.to_string()))?;
    if !skill.verified {
        skill.verified = true;
        skill.verified_at = Some(now);
    }
    Ok(())
}

pub fn add_goal(
    record: &mut StudentProgressRecord,
    title: &str,
    category: GoalCategory,
    description: Option<String>,
    deadline: Option<NaiveDate>,
) {
    record.goals.push(Goal {
        title: title.to_string(),
        category,
        description,
        deadline,
        status: GoalStatus::NotStarted,
        progress: 0,
        completed_at: None,
    });

    scoring::rescore_readiness(record);
}

pub fn set_goal_status(
    record: &mut StudentProgressRecord,
    index: usize,
    status: GoalStatus,
    now: DateTime<Utc>,
) -> Result<(), ProgressError> {
    let goal = record
        .goals
        .get_mut(index)
        .ok_or(ProgressError::UnknownGoal(index))?;

    match status {
        GoalStatus::Completed => {
            if goal.status != GoalStatus::Completed {
                goal.completed_at = Some(now);
            }
            goal.progress = 100;
        }
        _ => {
            if goal.status == GoalStatus::Completed {
                goal.progress = 0;
            }
            goal.completed_at = None;
        }
    }
    goal.status = status;

    scoring::rescore_readiness(record);
    Ok(())
}

/// Stamps the record as active. Called once per saved command.
pub fn touch(record: &mut StudentProgressRecord, now: DateTime<Utc>) {
    record.last_active = Some(now);
}

/// Appends an assessment result. Scores are clamped to 0-100; neither
/// progress score reads assessments.
pub fn record_assessment(
    record: &mut StudentProgressRecord,
    kind: AssessmentType,
    score: u32,
    now: DateTime<Utc>,
) {
    record.assessments_completed.push(Assessment {
        kind,
        score: score.min(100),
        completed_at: now,
    });
}

/// Counts a mock interview. `interview_score` is the rounded mean over all
/// mock interviews recorded so far.
pub fn record_mock_interview(record: &mut StudentProgressRecord, score: u32) {
    let score = f64::from(score.min(100));
    let done = f64::from(record.mock_interviews_completed);
    let mean = (f64::from(record.interview_score) * done + score) / (done + 1.0);
    record.mock_interviews_completed += 1;
    record.interview_score = mean.round() as u32;
}

pub fn record_pipeline_event(record: &mut StudentProgressRecord, stage: PipelineStage) {
    let counter = match stage {
        PipelineStage::Application => &mut record.applications_submitted,
        PipelineStage::Interview => &mut record.interviews_scheduled,
        PipelineStage::Offer => &mut record.offers_received,
    };
    *counter += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn fresh_record() -> StudentProgressRecord {
        StudentProgressRecord::new(Uuid::new_v4(), roadmap::default_roadmap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn profile_update_rescores_both() {
        let mut record = fresh_record();
        update_profile(
            &mut record,
            ProfilePatch {
                photo: Some("avatar.png".to_string()),
                github: Some("github.com/kiara".to_string()),
                ..ProfilePatch::default()
            },
        );
        assert_eq!(record.profile_score, 25);
        // 25 * 0.3 = 7.5
        assert_eq!(record.career_readiness, 8);
    }

    #[test]
    fn empty_patch_value_clears_field() {
        let mut record = fresh_record();
        update_profile(
            &mut record,
            ProfilePatch {
                phone: Some("555-0100".to_string()),
                ..ProfilePatch::default()
            },
        );
        assert_eq!(record.profile_score, 5);

        update_profile(
            &mut record,
            ProfilePatch {
                phone: Some(String::new()),
                ..ProfilePatch::default()
            },
        );
        let profile = record.profile_data.as_ref().unwrap();
        assert_eq!(profile.phone, None);
        assert_eq!(record.profile_score, 0);
    }

    #[test]
    fn profile_entries_count_once_per_section() {
        let mut record = fresh_record();
        add_profile_entry(&mut record, ProfileEntry::Education(Education::default()));
        add_profile_entry(&mut record, ProfileEntry::Education(Education::default()));
        add_profile_entry(&mut record, ProfileEntry::Certification(Certification::default()));
        assert_eq!(record.profile_score, 15);
    }

    #[test]
    fn step_progress_marks_completion_and_moves_current_step() {
        let mut record = fresh_record();
        set_step_progress(&mut record, 1, 150, now()).unwrap();

        let step = &record.roadmap[0];
        assert_eq!(step.progress, 100);
        assert!(step.completed);
        assert_eq!(step.completed_at, Some(now()));
        assert_eq!(record.current_step, 2);
        // 100 / 500 * 40
        assert_eq!(record.career_readiness, 8);

        set_step_progress(&mut record, 1, 60, now()).unwrap();
        assert!(!record.roadmap[0].completed);
        assert_eq!(record.roadmap[0].completed_at, None);
        assert_eq!(record.current_step, 1);
    }

    #[test]
    fn unknown_step_is_rejected() {
        let mut record = fresh_record();
        assert_matches!(
            set_step_progress(&mut record, 9, 10, now()),
            Err(ProgressError::UnknownStep(9))
        );
    }

    #[test]
    fn task_toggle_keeps_step_progress() {
        let mut record = fresh_record();
        set_task_completed(&mut record, 2, "2-1", true, now()).unwrap();

        let step = &record.roadmap[1];
        assert!(step.tasks[0].completed);
        assert_eq!(step.tasks[0].completed_at, Some(now()));
        assert_eq!(step.progress, 0);

        set_task_completed(&mut record, 2, "2-1", false, now()).unwrap();
        assert_eq!(record.roadmap[1].tasks[0].completed_at, None);
    }

    #[test]
    fn unknown_task_is_rejected() {
        let mut record = fresh_record();
        assert_matches!(
            set_task_completed(&mut record, 1, "9-9", true, now()),
            Err(ProgressError::UnknownTask { step_id: 1, .. })
        );
    }

    #[test]
    fn skills_upsert_by_exact_name_and_clamp() {
        let mut record = fresh_record();
        upsert_skill(&mut record, "Rust", 40, None).unwrap();
        upsert_skill(&mut record, "rust", 30, Some(SkillCategory::Tools)).unwrap();
        upsert_skill(&mut record, "Rust", 180, None).unwrap();

        assert_eq!(record.skills.len(), 2);
        assert_eq!(record.skills[0].level, 100);
        assert_eq!(record.skills[0].category, SkillCategory::Technical);
        assert_eq!(record.skills[1].category, SkillCategory::Tools);
    }

    #[test]
    fn fifth_skill_lifts_profile_score() {
        let mut record = fresh_record();
        for name in ["Rust", "SQL", "Git", "Docker"] {
            upsert_skill(&mut record, name, 50, None).unwrap();
        }
        assert_eq!(record.profile_score, 0);

        upsert_skill(&mut record, "Communication", 50, Some(SkillCategory::SoftSkills)).unwrap();
        assert_eq!(record.profile_score, 10);
        // 10 * 0.3 + 50 / 100 * 20 = 13
        assert_eq!(record.career_readiness, 13);
    }

    #[test]
    fn blank_skill_name_is_rejected() {
        let mut record = fresh_record();
        assert_matches!(
            upsert_skill(&mut record, "   ", 10, None),
            Err(ProgressError::BlankSkillName)
        );
        assert!(record.skills.is_empty());
    }

    #[test]
    fn verifying_a_skill_stamps_once() {
        let mut record = fresh_record();
        upsert_skill(&mut record, "SQL", 70, None).unwrap();
        let before = record.career_readiness;

        mark_skill_verified(&mut record, "SQL", now()).unwrap();
        let later = now() + chrono::Duration::days(3);
        mark_skill_verified(&mut record, "SQL", later).unwrap();

        assert!(record.skills[0].verified);
        assert_eq!(record.skills[0].verified_at, Some(now()));
        assert_eq!(record.career_readiness, before);
        assert_matches!(
            mark_skill_verified(&mut record, "sql", now()),
            Err(ProgressError::UnknownSkill(_))
        );
    }

    #[test]
    fn goal_status_changes_feed_readiness() {
        let mut record = fresh_record();
        add_goal(&mut record, "Finish capstone", GoalCategory::Projects, None, None);
        add_goal(
            &mut record,
            "Earn AWS cert",
            GoalCategory::Certifications,
            None,
            NaiveDate::from_ymd_opt(2026, 6, 1),
        );
        assert_eq!(record.goals[1].category, GoalCategory::Certifications);
        assert_eq!(record.career_readiness, 0);

        set_goal_status(&mut record, 0, GoalStatus::Completed, now()).unwrap();
        assert_eq!(record.goals[0].progress, 100);
        assert_eq!(record.goals[0].completed_at, Some(now()));
        assert_eq!(record.career_readiness, 5);

        set_goal_status(&mut record, 0, GoalStatus::Cancelled, now()).unwrap();
        assert_eq!(record.goals[0].completed_at, None);
        assert_eq!(record.career_readiness, 0);
    }

    #[test]
    fn unknown_goal_is_rejected() {
        let mut record = fresh_record();
        assert_matches!(
            set_goal_status(&mut record, 0, GoalStatus::InProgress, now()),
            Err(ProgressError::UnknownGoal(0))
        );
    }

    #[test]
    fn skill_names_match_untrimmed() {
        let mut record = fresh_record();
        upsert_skill(&mut record, "Rust", 40, None).unwrap();
        upsert_skill(&mut record, " Rust", 60, None).unwrap();

        assert_eq!(record.skills.len(), 2);
        assert_eq!(record.skills[1].name, " Rust");
        assert_eq!(record.skills[0].level, 40);
    }

    #[test]
    fn reopening_a_completed_goal_resets_progress() {
        let mut record = fresh_record();
        add_goal(&mut record, "Finish capstone", GoalCategory::Projects, None, None);
        set_goal_status(&mut record, 0, GoalStatus::Completed, now()).unwrap();
        set_goal_status(&mut record, 0, GoalStatus::InProgress, now()).unwrap();

        assert_eq!(record.goals[0].progress, 0);
        assert_eq!(record.goals[0].completed_at, None);
    }

    #[test]
    fn untouched_goal_progress_survives_status_change() {
        let mut record = fresh_record();
        add_goal(&mut record, "Read SICP", GoalCategory::Other, None, None);
        record.goals[0].progress = 40;
        set_goal_status(&mut record, 0, GoalStatus::InProgress, now()).unwrap();
        assert_eq!(record.goals[0].progress, 40);
    }

    #[test]
    fn assessments_append_with_clamped_score() {
        let mut record = fresh_record();
        record_assessment(&mut record, AssessmentType::Aptitude, 82, now());
        record_assessment(&mut record, AssessmentType::Technical, 140, now());

        assert_eq!(record.assessments_completed.len(), 2);
        assert_eq!(record.assessments_completed[0].kind, AssessmentType::Aptitude);
        assert_eq!(record.assessments_completed[1].score, 100);
        assert_eq!(record.career_readiness, 0);
    }

    #[test]
    fn interview_score_is_running_mean() {
        let mut record = fresh_record();
        record_mock_interview(&mut record, 60);
        record_mock_interview(&mut record, 80);
        record_mock_interview(&mut record, 91);

        assert_eq!(record.mock_interviews_completed, 3);
        // (60 + 80 + 91) / 3 = 77
        assert_eq!(record.interview_score, 77);
    }

    #[test]
    fn pipeline_events_bump_their_counter() {
        let mut record = fresh_record();
        record_pipeline_event(&mut record, PipelineStage::Application);
        record_pipeline_event(&mut record, PipelineStage::Application);
        record_pipeline_event(&mut record, PipelineStage::Interview);
        record_pipeline_event(&mut record, PipelineStage::Offer);

        assert_eq!(record.applications_submitted, 2);
        assert_eq!(record.interviews_scheduled, 1);
        assert_eq!(record.offers_received, 1);
    }

    #[test]
    fn touch_sets_last_active() {
        let mut record = fresh_record();
        assert_eq!(record.last_active, None);
        touch(&mut record, now());
        assert_eq!(record.last_active, Some(now()));
    }
}
