use crate::models::{Goal, GoalStatus, ProfileData, RoadmapStep, Skill, StudentProgressRecord};

// Bio length is measured in UTF-16 code units, as stored profiles were.
const BIO_MIN_UNITS: usize = 50;
const SKILLS_FOR_CREDIT: usize = 5;

const PROFILE_WEIGHT: f64 = 30.0;
const ROADMAP_WEIGHT: f64 = 40.0;
const SKILLS_WEIGHT: f64 = 20.0;
const GOALS_WEIGHT: f64 = 10.0;

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Profile completeness on a 0-100 scale. An absent profile scores as empty.
pub fn compute_profile_score(profile: Option<&ProfileData>, skill_count: usize) -> u8 {
    let empty = ProfileData::default();
    let profile = profile.unwrap_or(&empty);
    let mut score: u32 = 0;

    if filled(&profile.photo) {
        score += 15;
    }
    if profile
        .bio
        .as_deref()
        .is_some_and(|bio| bio.encode_utf16().count() > BIO_MIN_UNITS)
    {
        score += 10;
    }
    if filled(&profile.phone) {
        score += 5;
    }
    if filled(&profile.linkedin) {
        score += 10;
    }
    if filled(&profile.github) {
        score += 10;
    }
    if !profile.education.is_empty() {
        score += 15;
    }
    if !profile.experience.is_empty() {
        score += 15;
    }
    if !profile.projects.is_empty() {
        score += 10;
    }
    if skill_count >= SKILLS_FOR_CREDIT {
        score += 10;
    }

    score.min(100) as u8
}

/// Weighted blend of profile (30), roadmap (40), skills (20) and goals (10).
pub fn compute_career_readiness(
    profile_score: u8,
    roadmap: &[RoadmapStep],
    skills: &[Skill],
    goals: &[Goal],
) -> u8 {
    let mut score = (f64::from(profile_score) / 100.0) * PROFILE_WEIGHT;

    if !roadmap.is_empty() {
        let total: f64 = roadmap.iter().map(|step| f64::from(step.progress)).sum();
        score += total / (roadmap.len() as f64 * 100.0) * ROADMAP_WEIGHT;
    }

    let avg_skill_level = if skills.is_empty() {
        0.0
    } else {
        skills.iter().map(|skill| f64::from(skill.level)).sum::<f64>() / skills.len() as f64
    };
    score += (avg_skill_level / 100.0) * SKILLS_WEIGHT;

    let completed_goals = goals
        .iter()
        .filter(|goal| goal.status == GoalStatus::Completed)
        .count();
    score += (completed_goals as f64 / goals.len().max(1) as f64) * GOALS_WEIGHT;

    score.round().clamp(0.0, 100.0) as u8
}

pub fn rescore_profile(record: &mut StudentProgressRecord) {
    record.profile_score = compute_profile_score(record.profile_data.as_ref(), record.skills.len());
}

pub fn rescore_readiness(record: &mut StudentProgressRecord) {
    record.career_readiness = compute_career_readiness(
        record.profile_score,
        &record.roadmap,
        &record.skills,
        &record.goals,
    );
    tracing::debug!(
        student_id = %record.student_id,
        profile_score = record.profile_score,
        career_readiness = record.career_readiness,
        "rescored progress record"
    );
}

/// Profile score first, since readiness reads it.
pub fn rescore(record: &mut StudentProgressRecord) {
    rescore_profile(record);
    rescore_readiness(record);
}
