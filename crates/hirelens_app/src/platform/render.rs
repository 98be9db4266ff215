use hirelens_core::{CategorySelector, SourceLine, StatusPhase, TrackerViewModel};
use hirelens_engine::JobRecord;

const SOURCE_NAME_WIDTH: usize = 10;

/// Terminal-style progress block for one tracking update.
pub fn render_status(view: &TrackerViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let header = match (&view.job_id, view.phase) {
        (Some(job_id), _) => format!("Job {job_id}"),
        (None, StatusPhase::Terminated) => "Job finished".to_string(),
        (None, _) if view.start_pending => "Starting job...".to_string(),
        (None, _) => "No job running".to_string(),
    };
    lines.push(header);

    let status = &view.status;
    if status.downloading {
        lines.push("Downloading job offers".to_string());
        lines.extend(view.sources.iter().map(render_source_line));
        lines.push(format!("Downloaded total: {}", status.downloaded_total));
    }

    if status.processing_by_ai {
        let bar = view.ai_progress;
        lines.push(format!("AI analysis: [ {}% ] {}", bar.percent, bar.bar()));
        if view.saving_visible {
            lines.push("Saving data".to_string());
        }
    }

    if view.has_fatal_error() {
        lines.push(format!("Job failed: {}", view.fatal_errors.join(", ")));
    }
    if let Some(failure) = &view.last_failure {
        lines.push(format!("Error: {failure}"));
    }
    lines
}

fn render_source_line(line: &SourceLine) -> String {
    let name = format!("{:<width$}", line.source.display_name(), width = SOURCE_NAME_WIDTH);
    if line.unavailable {
        return format!("[⚠] {name} - source unavailable");
    }
    let noun = if line.count == 1 { "offer" } else { "offers" };
    format!("[✔] {name} - {} {noun}", line.count)
}

/// Aggregated results: weights for the current selector, then locations.
pub fn render_results(view: &TrackerViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(match &view.selector {
        CategorySelector::All => "Skills by category:".to_string(),
        CategorySelector::Category(name) => format!("Skills in {name}:"),
    });
    let mut weights: Vec<_> = view.weights.iter().collect();
    weights.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.name.cmp(&b.name)));
    if weights.is_empty() {
        lines.push("  (no data)".to_string());
    }
    for entry in weights {
        lines.push(format!("  {:<24} {}", entry.name, entry.weight));
    }

    let buckets = view
        .location_buckets
        .entries()
        .iter()
        .map(|(bucket, count)| format!("{bucket} {count}"))
        .collect::<Vec<_>>()
        .join(" | ");
    lines.push(format!("Locations: {buckets}"));

    if !view.named_locations.is_empty() {
        let named = view
            .named_locations
            .iter()
            .map(|entry| format!("{} ({})", entry.location, entry.count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Onsite: {named}"));
    }
    lines
}

pub fn render_jobs(jobs: &[JobRecord]) -> Vec<String> {
    if jobs.is_empty() {
        return vec!["No stored job offers".to_string()];
    }
    jobs.iter()
        .map(|job| {
            let location = if job.candidate_required_location.is_empty() {
                "-"
            } else {
                job.candidate_required_location.as_str()
            };
            format!("#{:<6} {} @ {} [{}]", job.id, job.title, job.company_name, location)
        })
        .collect()
}
