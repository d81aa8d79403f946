//! Tracks the active batch through the triage workflow.
//!
//! The workflow is a small state machine: a freshly ingested batch advances
//! automatically through a short display delay into classification, after
//! which the buckets become available for review and export. There is no
//! error state; classification is total and cannot fail.
//!
//! The main components are:
//! - `WorkflowState`: a clonable, thread-safe handle to the current
//!   workflow, injected into the Actix application state in `main.rs`.
//! - `WorkflowUpdate`: a message struct carrying one staged transition from
//!   the timer task back to the central updater.
//! - `start_workflow_updater`: a long-running task that applies updates in
//!   order. It is the single writer for the timed transitions, which keeps
//!   classification to exactly one run per batch.

use common::model::file::{Approval, Batch, Buckets, Category, ClassifiedFile};
use common::workflow::{BucketCounts, WorkflowPhase, WorkflowStatus};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::classifier::{self, LabelStrategy};

/// The workflow state machine. The variant is the state; there is no
/// separate "processed" flag to fall out of sync with the data.
#[derive(Debug)]
pub enum Workflow {
    Idle,
    Selected(Batch),
    Classifying(Batch),
    Classified(ClassifiedBatch),
}

/// A batch after classification has run. `reviewed` and `exported` refine
/// the reported phase without being terminal: annotations stay editable
/// and the report can be generated again.
#[derive(Debug)]
pub struct ClassifiedBatch {
    pub batch_id: Uuid,
    pub spool_dir: PathBuf,
    pub buckets: Buckets,
    pub reviewed: bool,
    pub exported: bool,
}

impl Workflow {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            Workflow::Idle => WorkflowPhase::Idle,
            Workflow::Selected(_) => WorkflowPhase::BatchSelected,
            Workflow::Classifying(_) => WorkflowPhase::Classifying,
            Workflow::Classified(c) if c.exported => WorkflowPhase::Exported,
            Workflow::Classified(c) if c.reviewed => WorkflowPhase::Reviewed,
            Workflow::Classified(_) => WorkflowPhase::Categorized,
        }
    }

    fn spool_dir(&self) -> Option<&Path> {
        match self {
            Workflow::Idle => None,
            Workflow::Selected(batch) | Workflow::Classifying(batch) => Some(&batch.spool_dir),
            Workflow::Classified(c) => Some(&c.spool_dir),
        }
    }
}

/// One staged transition. Updates carry the batch id they were scheduled
/// for; the updater drops any that no longer match the active batch (a
/// clear or replacement raced the pending delay).
#[derive(Debug)]
pub enum WorkflowUpdate {
    StartClassifying { batch_id: Uuid },
    FinishClassifying { batch_id: Uuid },
}

/// A clonable, thread-safe handle to the workflow, shared across the Actix
/// application as `web::Data`.
#[derive(Clone)]
pub struct WorkflowState {
    pub workflow: Arc<RwLock<Workflow>>,
    pub tx: mpsc::Sender<WorkflowUpdate>,
    /// The staged-advance task for the current batch. Aborted on clear or
    /// replacement so no timer outlives its batch.
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl WorkflowState {
    pub fn new(tx: mpsc::Sender<WorkflowUpdate>) -> WorkflowState {
        WorkflowState {
            workflow: Arc::new(RwLock::new(Workflow::Idle)),
            tx,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Installs a freshly ingested batch, replacing any previous one, and
    /// schedules the automatic advance through classification.
    pub async fn begin_batch(&self, batch: Batch, stage_delay_ms: u64, classify_delay_ms: u64) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let batch_id = batch.id;
        {
            let mut wf = self.workflow.write().await;
            let old = std::mem::replace(&mut *wf, Workflow::Selected(batch));
            release_spool(&old);
        }

        let tx = self.tx.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(stage_delay_ms)).await;
            let _ = tx.send(WorkflowUpdate::StartClassifying { batch_id }).await;
            tokio::time::sleep(Duration::from_millis(classify_delay_ms)).await;
            let _ = tx.send(WorkflowUpdate::FinishClassifying { batch_id }).await;
        }));
    }

    /// Discards the active batch and its spooled files and returns the
    /// workflow to idle. Safe to call at any time, including mid-delay.
    pub async fn clear(&self) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        let mut wf = self.workflow.write().await;
        let old = std::mem::replace(&mut *wf, Workflow::Idle);
        release_spool(&old);
    }

    pub async fn status(&self) -> WorkflowStatus {
        let wf = self.workflow.read().await;
        let (file_count, bucket_counts) = match &*wf {
            Workflow::Idle => (0, None),
            Workflow::Selected(batch) | Workflow::Classifying(batch) => (batch.files.len(), None),
            Workflow::Classified(c) => (
                c.buckets.len(),
                Some(BucketCounts {
                    rsn: c.buckets.rsn.len(),
                    noise: c.buckets.noise.len(),
                    soz: c.buckets.soz.len(),
                }),
            ),
        };
        WorkflowStatus {
            phase: wf.phase(),
            file_count,
            bucket_counts,
        }
    }

    /// The batch as it looks before classification, for the upload surface.
    pub async fn active_batch(&self) -> Option<Batch> {
        match &*self.workflow.read().await {
            Workflow::Selected(batch) | Workflow::Classifying(batch) => Some(batch.clone()),
            _ => None,
        }
    }

    pub async fn buckets_snapshot(&self) -> Option<Buckets> {
        match &*self.workflow.read().await {
            Workflow::Classified(c) => Some(c.buckets.clone()),
            _ => None,
        }
    }

    /// Attaches a clinical note to one file of the not-yet-classified
    /// batch. Unknown file ids are ignored.
    pub async fn set_clinical_note(&self, file_id: Uuid, note: String) -> bool {
        let mut wf = self.workflow.write().await;
        let files = match &mut *wf {
            Workflow::Selected(batch) | Workflow::Classifying(batch) => &mut batch.files,
            _ => return false,
        };
        match files.iter_mut().find(|f| f.id == file_id) {
            Some(file) => {
                file.clinical_note = Some(note);
                true
            }
            None => false,
        }
    }

    /// Records a clinician verdict. A bucket/file pair that does not exist
    /// (a stale reference after re-classification) leaves state untouched.
    pub async fn set_approval(&self, bucket: Category, file_id: Uuid, approval: Approval) -> bool {
        self.annotate(bucket, file_id, |f| f.approval = approval).await
    }

    /// Overrides the AI explanation with the clinician's text. Same no-op
    /// contract as `set_approval`.
    pub async fn set_explanation(&self, bucket: Category, file_id: Uuid, explanation: String) -> bool {
        self.annotate(bucket, file_id, move |f| {
            f.clinician_explanation = Some(explanation)
        })
        .await
    }

    async fn annotate<F>(&self, bucket: Category, file_id: Uuid, edit: F) -> bool
    where
        F: FnOnce(&mut ClassifiedFile),
    {
        let mut wf = self.workflow.write().await;
        let Workflow::Classified(classified) = &mut *wf else {
            return false;
        };
        match classified
            .buckets
            .bucket_mut(bucket)
            .iter_mut()
            .find(|f| f.file.id == file_id)
        {
            Some(file) => {
                edit(file);
                classified.reviewed = true;
                true
            }
            None => false,
        }
    }

    pub async fn mark_exported(&self) {
        if let Workflow::Classified(c) = &mut *self.workflow.write().await {
            c.exported = true;
        }
    }
}

/// Deletes the spool directory owned by a discarded workflow state. A
/// directory that was never created (an empty batch) is not an error.
fn release_spool(old: &Workflow) {
    if let Some(dir) = old.spool_dir() {
        match std::fs::remove_dir_all(dir) {
            Ok(()) => debug!("released spool dir {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("could not remove spool dir {}: {}", dir.display(), e),
        }
    }
}

/// Applies staged workflow updates. Spawned once from `main` and runs for
/// the life of the process.
pub async fn start_workflow_updater(
    state: WorkflowState,
    mut rx: mpsc::Receiver<WorkflowUpdate>,
    strategy: Box<dyn LabelStrategy>,
) {
    while let Some(update) = rx.recv().await {
        let mut wf = state.workflow.write().await;
        let current = std::mem::replace(&mut *wf, Workflow::Idle);
        *wf = apply_update(current, update, strategy.as_ref());
    }
}

fn apply_update(current: Workflow, update: WorkflowUpdate, strategy: &dyn LabelStrategy) -> Workflow {
    match (current, update) {
        (Workflow::Selected(batch), WorkflowUpdate::StartClassifying { batch_id })
            if batch.id == batch_id =>
        {
            Workflow::Classifying(batch)
        }
        (Workflow::Classifying(batch), WorkflowUpdate::FinishClassifying { batch_id })
            if batch.id == batch_id =>
        {
            let Batch {
                id, spool_dir, files, ..
            } = batch;
            let buckets = classifier::classify(files, strategy);
            info!(
                "classified batch {}: {} rsn, {} noise, {} soz",
                id,
                buckets.rsn.len(),
                buckets.noise.len(),
                buckets.soz.len()
            );
            Workflow::Classified(ClassifiedBatch {
                batch_id: id,
                spool_dir,
                buckets,
                reviewed: false,
                exported: false,
            })
        }
        (other, update) => {
            debug!("dropping stale workflow update: {:?}", update);
            other
        }
    }
}
