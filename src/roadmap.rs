use crate::models::{RoadmapDrift, RoadmapStep, Task};

const DEFAULT_STEPS: [(&str, &str, &[&str]); 5] = [
    (
        "Complete Your Profile",
        "Add your education, skills, and experience to create a professional profile",
        &[
            "Add profile photo",
            "Complete education details",
            "Add your skills",
            "Write a professional bio",
        ],
    ),
    (
        "Skill Assessment",
        "Take assessments to validate and showcase your technical and soft skills",
        &[
            "Complete technical assessment",
            "Complete aptitude test",
            "Complete communication skills test",
        ],
    ),
    (
        "Build Your Resume",
        "Create an ATS-friendly resume that highlights your strengths",
        &[
            "Choose a resume template",
            "Add work experience",
            "Add projects",
            "Get resume feedback",
        ],
    ),
    (
        "Interview Preparation",
        "Practice for technical and HR interviews to boost your confidence",
        &[
            "Complete 3 mock interviews",
            "Practice technical questions",
            "Practice HR questions",
            "Participate in group discussions",
        ],
    ),
    (
        "Apply for Jobs",
        "Start applying to companies and track your applications",
        &[
            "Shortlist target companies",
            "Tailor resume for each application",
            "Apply to at least 10 companies",
            "Follow up on applications",
        ],
    ),
];

/// The five-step roadmap every new record starts with. Task ids are
/// `"<step>-<n>"`, both 1-based.
pub fn default_roadmap() -> Vec<RoadmapStep> {
    DEFAULT_STEPS
        .iter()
        .zip(1u32..)
        .map(|((title, description, tasks), step_id)| RoadmapStep {
            step_id,
            title: title.to_string(),
            description: Some(description.to_string()),
            progress: 0,
            completed: false,
            completed_at: None,
            tasks: tasks
                .iter()
                .zip(1u32..)
                .map(|(task, n)| Task {
                    id: format!("{step_id}-{n}"),
                    title: task.to_string(),
                    completed: false,
                    completed_at: None,
                })
                .collect(),
        })
        .collect()
}

/// First incomplete step, or the last step once everything is done.
pub fn current_step(roadmap: &[RoadmapStep]) -> u32 {
    roadmap
        .iter()
        .find(|step| !step.completed)
        .or_else(|| roadmap.last())
        .map(|step| step.step_id)
        .unwrap_or(1)
}

/// Steps that have been started but not finished.
pub fn active_steps(roadmap: &[RoadmapStep]) -> usize {
    roadmap
        .iter()
        .filter(|step| step.progress > 0 && !step.completed)
        .count()
}

/// Share of completed tasks as a 0-100 percentage. `None` for a step with no tasks.
pub fn task_progress(step: &RoadmapStep) -> Option<u32> {
    if step.tasks.is_empty() {
        return None;
    }
    let done = step.tasks.iter().filter(|task| task.completed).count();
    Some(((done as f64 / step.tasks.len() as f64) * 100.0).round() as u32)
}

/// Steps whose stored progress disagrees with their task checklist.
pub fn detect_drift(roadmap: &[RoadmapStep]) -> Vec<RoadmapDrift> {
    roadmap
        .iter()
        .filter_map(|step| {
            let task_progress = task_progress(step)?;
            (task_progress != step.progress).then(|| RoadmapDrift {
                step_id: step.step_id,
                title: step.title.clone(),
                stored_progress: step.progress,
                task_progress,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roadmap_has_five_sequential_steps() {
        let roadmap = default_roadmap();
        let ids: Vec<u32> = roadmap.iter().map(|step| step.step_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(roadmap[0].title, "Complete Your Profile");
        assert_eq!(roadmap[4].title, "Apply for Jobs");
        assert!(roadmap.iter().all(|step| step.progress == 0 && !step.completed));
    }

    #[test]
    fn default_tasks_are_numbered_per_step() {
        let roadmap = default_roadmap();
        assert_eq!(roadmap[1].tasks.len(), 3);
        assert_eq!(roadmap[1].tasks[2].id, "2-3");
        assert_eq!(roadmap[3].tasks[0].title, "Complete 3 mock interviews");
        assert!(roadmap
            .iter()
            .flat_map(|step| step.tasks.iter())
            .all(|task| !task.completed));
    }

    #[test]
    fn current_step_tracks_first_incomplete() {
        let mut roadmap = default_roadmap();
        assert_eq!(current_step(&roadmap), 1);

        roadmap[0].completed = true;
        roadmap[1].completed = true;
        assert_eq!(current_step(&roadmap), 3);

        roadmap.iter_mut().for_each(|step| step.completed = true);
        assert_eq!(current_step(&roadmap), 5);
        assert_eq!(current_step(&[]), 1);
    }

    #[test]
    fn active_steps_skip_untouched_and_done() {
        let mut roadmap = default_roadmap();
        roadmap[0].progress = 100;
        roadmap[0].completed = true;
        roadmap[1].progress = 40;
        roadmap[2].progress = 10;
        assert_eq!(active_steps(&roadmap), 2);
    }

    #[test]
    fn drift_reports_mismatched_steps_only() {
        let mut roadmap = default_roadmap();
        roadmap[0].tasks[0].completed = true;
        roadmap[0].progress = 25;
        roadmap[1].progress = 100;
        roadmap[2].tasks.clear();
        roadmap[2].progress = 70;

        let drift = detect_drift(&roadmap);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].step_id, 2);
        assert_eq!(drift[0].stored_progress, 100);
        assert_eq!(drift[0].task_progress, 0);
    }
}
