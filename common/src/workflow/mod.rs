use serde::Serialize;

/// Where the active batch sits in the triage workflow.
///
/// Polled by the processing surface via `GET /api/analysis/status` the same
/// way long-running job status is polled elsewhere. `Reviewed` and
/// `Exported` are refinements of `Categorized`, not terminal states: the
/// buckets stay editable and the report stays re-exportable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    BatchSelected,
    Classifying,
    Categorized,
    Reviewed,
    Exported,
}

/// Per-bucket file counts, present once classification has run.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct BucketCounts {
    pub rsn: usize,
    pub noise: usize,
    pub soz: usize,
}

/// Status payload for workflow polling.
#[derive(Clone, Debug, Serialize)]
pub struct WorkflowStatus {
    pub phase: WorkflowPhase,
    pub file_count: usize,
    pub bucket_counts: Option<BucketCounts>,
}
