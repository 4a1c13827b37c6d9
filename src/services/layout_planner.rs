// src/services/layout_planner.rs
//
// Output Layout Planner
//
// Maps a resolved group to its place in the run root:
//
//   Papers/<area>/Last_First_School_Advisor_Index.pdf
//   Posters/<Core|Non-core|Associated>/<area>/Last_First_School_Advisor_Index.pdf
//
// CRITICAL RULES:
// - The revision never appears in an output name
// - Only posters get a QR link: <base-url>/<output file name>
// - Pure path arithmetic, nothing is created here

use std::path::PathBuf;

use crate::domain::{
    CategoryLabel, DocumentKind, DomainError, DomainResult, ResolvedGroup, ResolvedSubmission,
    SubmissionIdentity,
};

pub struct LayoutPlanner {
    run_root: PathBuf,
    base_url: String,
}

impl LayoutPlanner {
    pub fn new(run_root: PathBuf, base_url: impl Into<String>) -> Self {
        Self {
            run_root,
            base_url: base_url.into(),
        }
    }

    /// Output file name of an identity
    pub fn file_name(identity: &SubmissionIdentity) -> String {
        format!("{}.pdf", identity.canonical_stem())
    }

    /// Destination of an identity inside the run root
    pub fn destination_for(&self, identity: &SubmissionIdentity) -> DomainResult<PathBuf> {
        let mut destination = self.run_root.join(identity.kind.dir_name());

        match (identity.kind, &identity.category) {
            (DocumentKind::Paper, _) => {}
            (DocumentKind::Poster, Some(CategoryLabel::Known(category))) => {
                destination.push(category.dir_name());
            }
            (DocumentKind::Poster, label) => {
                return Err(DomainError::InvariantViolation(format!(
                    "Cannot place poster {:?} with category {:?}",
                    identity.path, label
                )));
            }
        }

        destination.push(&identity.area);
        destination.push(Self::file_name(identity));
        Ok(destination)
    }

    /// QR link for a poster, `None` for a paper
    pub fn qr_link(&self, identity: &SubmissionIdentity) -> Option<String> {
        match identity.kind {
            DocumentKind::Paper => None,
            DocumentKind::Poster => Some(format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                Self::file_name(identity)
            )),
        }
    }

    /// Plan the kept file of a resolved group
    pub fn plan(&self, group: &ResolvedGroup) -> DomainResult<ResolvedSubmission> {
        Ok(ResolvedSubmission {
            destination: self.destination_for(&group.kept)?,
            qr_link: self.qr_link(&group.kept),
            identity: group.kept.clone(),
        })
    }

    /// Plan every group, stopping at the first invariant violation
    pub fn plan_all<'a>(
        &self,
        groups: impl IntoIterator<Item = &'a ResolvedGroup>,
    ) -> DomainResult<Vec<ResolvedSubmission>> {
        groups.into_iter().map(|group| self.plan(group)).collect()
    }
}
