use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Imaging modality chosen on the landing surface. Every file of a batch
/// carries the modality the batch was uploaded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Mri,
    Eeg,
    Pet,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Mri => "MRI",
            Modality::Eeg => "EEG",
            Modality::Pet => "PET",
        }
    }
}

/// One of the three mutually exclusive classification outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Resting-state network, no abnormality.
    Rsn,
    /// Motion artifact or other noise component.
    Noise,
    /// Seizure-onset-zone candidate, flagged for clinician review.
    Soz,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Rsn => "RSN",
            Category::Noise => "Noise",
            Category::Soz => "SOZ",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Rsn => "No abnormality detected",
            Category::Noise => "Motion artifact or noise detected",
            Category::Soz => "Potential SOZ detected - requires review",
        }
    }
}

/// Clinician verdict on a single classified component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approval {
    #[default]
    Pending,
    Approved,
    Disapproved,
}

impl Approval {
    pub fn label(&self) -> &'static str {
        match self {
            Approval::Pending => "Pending",
            Approval::Approved => "Approved",
            Approval::Disapproved => "Disapproved",
        }
    }
}

/// Which labeling strategy produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Random,
    Lookup,
}

/// One uploaded file of the active batch, spooled to disk during intake.
///
/// The spool path is owned by the intake side until the batch is classified
/// and is released (the file deleted) when the batch is cleared or replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    /// Last-modified timestamp as the client reports it, epoch milliseconds.
    pub last_modified: Option<i64>,
    pub modality: Modality,
    pub clinical_note: Option<String>,
    #[serde(skip)]
    pub spool_path: PathBuf,
}

/// An ingested file after the engine has labeled it, plus the clinician
/// review overlay. The AI fields are written exactly once; only `approval`
/// and `clinician_explanation` change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedFile {
    #[serde(flatten)]
    pub file: IngestedFile,
    pub category: Category,
    pub ai_explanation: String,
    /// Reference to the heatmap artifact, resolved under the assets route.
    pub ai_heatmap: String,
    pub source: ClassificationSource,
    /// The integer token parsed from the filename, when lookup used one.
    pub source_index: Option<u64>,
    pub approval: Approval,
    pub clinician_explanation: Option<String>,
}

impl ClassifiedFile {
    /// The explanation shown and exported: the clinician override when one
    /// has been written, otherwise the AI text.
    pub fn effective_explanation(&self) -> &str {
        self.clinician_explanation
            .as_deref()
            .unwrap_or(&self.ai_explanation)
    }
}

/// The active upload batch. At most one exists at a time; selecting a new
/// batch replaces it wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    pub id: Uuid,
    pub modality: Modality,
    #[serde(skip)]
    pub spool_dir: PathBuf,
    pub files: Vec<IngestedFile>,
}

/// The three category buckets produced by classification. Together they
/// hold every file of the batch exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buckets {
    pub rsn: Vec<ClassifiedFile>,
    pub noise: Vec<ClassifiedFile>,
    pub soz: Vec<ClassifiedFile>,
}

impl Buckets {
    pub fn bucket(&self, category: Category) -> &Vec<ClassifiedFile> {
        match category {
            Category::Rsn => &self.rsn,
            Category::Noise => &self.noise,
            Category::Soz => &self.soz,
        }
    }

    pub fn bucket_mut(&mut self, category: Category) -> &mut Vec<ClassifiedFile> {
        match category {
            Category::Rsn => &mut self.rsn,
            Category::Noise => &mut self.noise,
            Category::Soz => &mut self.soz,
        }
    }

    pub fn len(&self) -> usize {
        self.rsn.len() + self.noise.len() + self.soz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter_all(&self) -> impl Iterator<Item = &ClassifiedFile> {
        self.rsn.iter().chain(self.noise.iter()).chain(self.soz.iter())
    }
}
