use std::fmt::Write;

use crate::models::{StepSummary, StudentProgressView};
use crate::roadmap;

/// Per-step averages across students, keyed and ordered by step id.
pub fn summarize_steps(students: &[StudentProgressView]) -> Vec<StepSummary> {
    let mut map: std::collections::BTreeMap<u32, StepSummary> = std::collections::BTreeMap::new();

    for student in students {
        for step in &student.record.roadmap {
            let entry = map.entry(step.step_id).or_insert_with(|| StepSummary {
                step_id: step.step_id,
                title: step.title.clone(),
                avg_progress: 0.0,
                completed_count: 0,
                student_count: 0,
            });
            entry.avg_progress += f64::from(step.progress);
            entry.student_count += 1;
            if step.completed {
                entry.completed_count += 1;
            }
        }
    }

    map.into_values()
        .map(|mut summary| {
            summary.avg_progress /= summary.student_count.max(1) as f64;
            summary
        })
        .collect()
}

pub fn build_report(students: &[StudentProgressView], limit: usize) -> String {
    let mut ranked: Vec<&StudentProgressView> = students.iter().collect();
    ranked.sort_by(|a, b| {
        b.record
            .career_readiness
            .cmp(&a.record.career_readiness)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
    let steps = summarize_steps(students);

    let mut output = String::new();

    let _ = writeln!(output, "# Career Readiness Report");
    let _ = writeln!(output, "Generated for {} students", students.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Career-Ready Students");

    if ranked.is_empty() {
        let _ = writeln!(output, "No progress records yet.");
    } else {
        for student in ranked.iter().take(limit) {
            let record = &student.record;
            let _ = writeln!(
                output,
                "- {} ({}) readiness {} / profile {} on step {} with {} active steps",
                student.full_name,
                student.email,
                record.career_readiness,
                record.profile_score,
                record.current_step,
                roadmap::active_steps(&record.roadmap)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Roadmap Progress");

    if steps.is_empty() {
        let _ = writeln!(output, "No roadmap steps recorded.");
    } else {
        for step in &steps {
            let _ = writeln!(
                output,
                "- Step {} {}: avg progress {:.1}%, completed by {} of {}",
                step.step_id, step.title, step.avg_progress, step.completed_count, step.student_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Roadmap Drift");

    let mut drift_lines = 0usize;
    for student in &ranked {
        for drift in roadmap::detect_drift(&student.record.roadmap) {
            drift_lines += 1;
            let _ = writeln!(
                output,
                "- {} step {} {}: stored {}% vs tasks {}%",
                student.full_name,
                drift.step_id,
                drift.title,
                drift.stored_progress,
                drift.task_progress
            );
        }
    }
    if drift_lines == 0 {
        let _ = writeln!(output, "Stored step progress matches task checklists.");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Placement Activity");

    let applications: u32 = students.iter().map(|s| s.record.applications_submitted).sum();
    let interviews: u32 = students.iter().map(|s| s.record.interviews_scheduled).sum();
    let offers: u32 = students.iter().map(|s| s.record.offers_received).sum();
    let assessments: usize = students
        .iter()
        .map(|s| s.record.assessments_completed.len())
        .sum();
    let _ = writeln!(
        output,
        "Totals: {applications} applications, {interviews} interviews, {offers} offers, \
         {assessments} assessments"
    );
    for student in &ranked {
        let record = &student.record;
        if record.mock_interviews_completed == 0 && record.applications_submitted == 0 {
            continue;
        }
        let _ = writeln!(
            output,
            "- {}: {} mock interviews (avg {}), {} applications, {} offers",
            student.full_name,
            record.mock_interviews_completed,
            record.interview_score,
            record.applications_submitted,
            record.offers_received
        );
    }

    output
}
