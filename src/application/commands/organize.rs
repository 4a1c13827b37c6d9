// src/application/commands/organize.rs
//
// Organize Command
//
// scan → resolve → plan → (unless dry run) skeleton + conversion + listings → audit
//
// CRITICAL RULES:
// - Resolution is complete before anything is written
// - A bad submission root fails before any output path is chosen
// - Listings only describe files that were actually produced
// - The audit is written before the listings

use crate::application::dto::{OrganizeRequest, OutputEntry};
use crate::application::report::AuditReport;
use crate::application::state::AppState;
use crate::domain::ResolvedSubmission;
use crate::error::AppResult;
use crate::infrastructure::OutputTree;
use crate::services::{write_listings, LayoutPlanner};

pub async fn organize(state: &AppState, request: OrganizeRequest) -> AppResult<AuditReport> {
    let OrganizeRequest {
        input_root,
        output_root,
        dry_run,
    } = request;

    let scan = state.scan_service.scan(&input_root)?;
    let batch = state.resolution_service.resolve(scan)?;

    let tree = OutputTree::for_input(&input_root, output_root)?;
    let planner = LayoutPlanner::new(
        tree.root().to_path_buf(),
        state.config.stamping.base_url.clone(),
    );
    let mut planned = planner.plan_all(batch.resolved())?;
    planned.sort_by(|a, b| a.destination.cmp(&b.destination));

    let mut report = AuditReport::new(input_root, tree.root().to_path_buf(), dry_run);
    report.removed = batch.discarded().cloned().collect();
    report.needs_review = batch.ambiguous().cloned().collect();
    report.unparseable = batch.unparseable;

    if dry_run {
        log::info!("Dry run: {} outputs planned, nothing written", planned.len());
        report.outputs = planned.iter().map(output_entry).collect();
        return Ok(report);
    }

    tree.create_skeleton()?;

    let summary = state.conversion_driver().convert_all(planned.clone()).await;
    let produced: Vec<ResolvedSubmission> = planned
        .into_iter()
        .filter(|submission| {
            summary
                .produced
                .iter()
                .any(|file| file.destination == submission.destination)
        })
        .collect();

    report.outputs = produced.iter().map(output_entry).collect();
    report.conversion_failures = summary.failures;
    report.write_json(tree.root())?;

    write_listings(tree.root(), &produced)?;

    if report.needs_attention() {
        log::warn!(
            "{} groups need review, {} files unparseable, {} conversions failed",
            report.needs_review.len(),
            report.unparseable.len(),
            report.conversion_failures.len()
        );
    }

    Ok(report)
}

fn output_entry(submission: &ResolvedSubmission) -> OutputEntry {
    OutputEntry {
        source: submission.identity.path.clone(),
        destination: submission.destination.clone(),
        qr_link: submission.qr_link.clone(),
    }
}
