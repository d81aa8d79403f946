//! The simulated classification engine.
//!
//! Every ingested file is assigned to exactly one of the three category
//! buckets, either by a uniform random draw (arbitrary inputs) or by a
//! deterministic lookup against the reference label table for the canned
//! demo dataset. Both strategies sit behind the single `LabelStrategy`
//! capability and are selected by configuration.
//!
//! Classification is a total function: it cannot fail, and an empty batch
//! simply produces three empty buckets.

use common::model::file::{
    Approval, Buckets, Category, ClassificationSource, ClassifiedFile, IngestedFile,
};
use rand::Rng;
use regex::Regex;

use crate::config::StrategyKind;

/// The heatmap artifact every labeled component points at, resolved under
/// the static assets route.
pub const HEATMAP_REF: &str = "/assets/ai_heatmap.png";

const CATEGORIES: [Category; 3] = [Category::Rsn, Category::Noise, Category::Soz];

/// Filename pattern the lookup strategy recognizes: the IC marker followed
/// by the component number, e.g. `IC_7_thresh.png`.
const COMPONENT_TOKEN_PATTERN: &str = r"IC_(\d+)";

/// Binary reference labels for the canned demo dataset, indexed by the
/// component number parsed from the filename (`IC_7` reads index 6).
/// 0 maps to the noise bucket, 1 to the SOZ review bucket.
pub const IC_REFERENCE_LABELS: [u8; 60] = [
    0, 1, 0, 0, 0, 1, 0, 0, 0, 0, //
    0, 0, 1, 0, 0, 0, 0, 1, 0, 0, //
    0, 0, 0, 0, 1, 0, 0, 0, 0, 0, //
    1, 0, 0, 0, 0, 0, 0, 1, 0, 0, //
    0, 0, 0, 1, 0, 0, 0, 0, 0, 0, //
    1, 0, 0, 0, 0, 0, 1, 0, 0, 0, //
];

/// Explanation text attached per category, mirroring the demo AI output.
pub fn ai_explanation(category: Category) -> &'static str {
    match category {
        Category::Rsn => "Clusters on grey matter.",
        Category::Noise => "Motion artifact detected.",
        Category::Soz => "Potential SOZ detected. Please review.",
    }
}

/// Outcome of labeling a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub category: Category,
    pub source: ClassificationSource,
    /// The component number the lookup table was indexed with, if any.
    pub source_index: Option<u64>,
}

/// The one capability a strategy provides: label a single file, given its
/// position in the batch.
pub trait LabelStrategy: Send + Sync {
    fn label(&self, file: &IngestedFile, position: usize) -> Label;
}

/// Draws uniformly from the three category profiles, independently per
/// file. Non-deterministic and blind to file content.
pub struct RandomStrategy;

impl LabelStrategy for RandomStrategy {
    fn label(&self, _file: &IngestedFile, _position: usize) -> Label {
        let category = CATEGORIES[rand::rng().random_range(0..CATEGORIES.len())];
        Label {
            category,
            source: ClassificationSource::Random,
            source_index: None,
        }
    }
}

/// Deterministic lookup against the reference label table, keyed by the
/// component number in the filename. Files without a usable number fall
/// back to their batch position modulo the table length; that fallback is
/// internal and never surfaced as an error.
pub struct LookupStrategy {
    pattern: Regex,
}

impl LookupStrategy {
    pub fn new() -> Result<LookupStrategy, regex::Error> {
        Ok(LookupStrategy {
            pattern: Regex::new(COMPONENT_TOKEN_PATTERN)?,
        })
    }
}

impl LabelStrategy for LookupStrategy {
    fn label(&self, file: &IngestedFile, position: usize) -> Label {
        let n = IC_REFERENCE_LABELS.len();
        match component_token(&self.pattern, &file.name) {
            Some(token) if token >= 1 && (token as usize) <= n => Label {
                category: category_for_label(IC_REFERENCE_LABELS[token as usize - 1]),
                source: ClassificationSource::Lookup,
                source_index: Some(token),
            },
            // No token, or one outside the table: positional default.
            _ => Label {
                category: category_for_label(IC_REFERENCE_LABELS[position % n]),
                source: ClassificationSource::Lookup,
                source_index: None,
            },
        }
    }
}

pub fn strategy_from_config(kind: StrategyKind) -> Result<Box<dyn LabelStrategy>, regex::Error> {
    Ok(match kind {
        StrategyKind::Random => Box::new(RandomStrategy),
        StrategyKind::Lookup => Box::new(LookupStrategy::new()?),
    })
}

/// Extracts the component number from a filename, if the pattern matches
/// and the digits fit an integer.
pub fn component_token(pattern: &Regex, name: &str) -> Option<u64> {
    pattern.captures(name)?.get(1)?.as_str().parse().ok()
}

fn category_for_label(value: u8) -> Category {
    match value {
        0 => Category::Noise,
        1 => Category::Soz,
        // Unreachable with the fixed table, handled anyway.
        _ => Category::Rsn,
    }
}

/// Partitions a batch into the three buckets. Insertion order within a
/// bucket follows the batch order; display sorting happens separately at
/// render time.
pub fn classify(files: Vec<IngestedFile>, strategy: &dyn LabelStrategy) -> Buckets {
    let mut buckets = Buckets::default();
    for (position, file) in files.into_iter().enumerate() {
        let label = strategy.label(&file, position);
        let classified = ClassifiedFile {
            category: label.category,
            ai_explanation: ai_explanation(label.category).to_string(),
            ai_heatmap: HEATMAP_REF.to_string(),
            source: label.source,
            source_index: label.source_index,
            approval: Approval::default(),
            clinician_explanation: None,
            file,
        };
        buckets.bucket_mut(label.category).push(classified);
    }
    buckets
}

/// Presentation order: ascending by the component number parsed from the
/// filename; names without one sort first, as number 0. Applied only when
/// rendering results, never during classification.
pub fn sort_for_display(buckets: &mut Buckets) -> Result<(), regex::Error> {
    let pattern = Regex::new(COMPONENT_TOKEN_PATTERN)?;
    for category in CATEGORIES {
        buckets
            .bucket_mut(category)
            .sort_by_key(|f| component_token(&pattern, &f.file.name).unwrap_or(0));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::file::Modality;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn named_file(name: &str) -> IngestedFile {
        IngestedFile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size: 1024,
            mime_type: "image/png".to_string(),
            last_modified: None,
            modality: Modality::Mri,
            clinical_note: None,
            spool_path: Default::default(),
        }
    }

    #[test]
    fn lookup_maps_component_numbers_through_the_table() {
        let strategy = LookupStrategy::new().unwrap();
        let batch = vec![
            named_file("IC_1_thresh.png"),
            named_file("IC_2_thresh.png"),
            named_file("IC_51_thresh.png"),
        ];
        let buckets = classify(batch, &strategy);

        // Table: index 0 -> 0 (noise), index 1 -> 1 (soz), index 50 -> 1 (soz).
        assert_eq!(buckets.noise.len(), 1);
        assert_eq!(buckets.noise[0].file.name, "IC_1_thresh.png");
        assert_eq!(buckets.noise[0].source_index, Some(1));
        assert_eq!(buckets.soz.len(), 2);
        assert_eq!(buckets.soz[0].file.name, "IC_2_thresh.png");
        assert_eq!(buckets.soz[1].file.name, "IC_51_thresh.png");
        assert_eq!(buckets.soz[1].source_index, Some(51));
        assert!(buckets.rsn.is_empty());
    }

    #[test]
    fn missing_token_falls_back_to_batch_position() {
        let strategy = LookupStrategy::new().unwrap();
        let batch = vec![named_file("sub-01.png"), named_file("sub-02.png")];
        let buckets = classify(batch, &strategy);

        // Positions 0 and 1 read table entries 0 and 1.
        assert_eq!(buckets.noise.len(), 1);
        assert_eq!(buckets.noise[0].file.name, "sub-01.png");
        assert_eq!(buckets.noise[0].source_index, None);
        assert_eq!(buckets.soz.len(), 1);
        assert_eq!(buckets.soz[0].file.name, "sub-02.png");
    }

    #[test]
    fn out_of_range_tokens_fall_back_to_batch_position() {
        let strategy = LookupStrategy::new().unwrap();
        let batch = vec![named_file("IC_0_thresh.png"), named_file("IC_9999_thresh.png")];
        let buckets = classify(batch, &strategy);

        assert_eq!(buckets.noise.len(), 1); // position 0 -> table[0] = 0
        assert_eq!(buckets.soz.len(), 1); // position 1 -> table[1] = 1
        assert!(buckets.iter_all().all(|f| f.source_index.is_none()));
    }

    #[test]
    fn lookup_is_deterministic_across_runs() {
        let strategy = LookupStrategy::new().unwrap();
        let names = ["IC_3_thresh.png", "no_token.png", "IC_13_thresh.png"];
        let first = classify(names.iter().map(|n| named_file(n)).collect(), &strategy);
        let second = classify(names.iter().map(|n| named_file(n)).collect(), &strategy);

        let shape = |b: &Buckets| {
            (
                b.rsn.iter().map(|f| f.file.name.clone()).collect::<Vec<_>>(),
                b.noise.iter().map(|f| f.file.name.clone()).collect::<Vec<_>>(),
                b.soz.iter().map(|f| f.file.name.clone()).collect::<Vec<_>>(),
            )
        };
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn classification_is_a_total_partition() {
        let batch: Vec<_> = (0..25).map(|i| named_file(&format!("scan_{i}.png"))).collect();
        let ids: HashSet<Uuid> = batch.iter().map(|f| f.id).collect();

        let buckets = classify(batch, &RandomStrategy);

        assert_eq!(buckets.len(), 25);
        let seen: HashSet<Uuid> = buckets.iter_all().map(|f| f.file.id).collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn empty_batch_yields_empty_buckets() {
        let strategy = LookupStrategy::new().unwrap();
        let buckets = classify(Vec::new(), &strategy);
        assert!(buckets.rsn.is_empty());
        assert!(buckets.noise.is_empty());
        assert!(buckets.soz.is_empty());
    }

    #[test]
    fn display_sort_orders_by_component_number() {
        let strategy = LookupStrategy::new().unwrap();
        // All three read label 0 and land in the noise bucket.
        let batch = vec![
            named_file("IC_4_thresh.png"),
            named_file("IC_1_thresh.png"),
            named_file("IC_3_thresh.png"),
        ];
        let mut buckets = classify(batch, &strategy);
        assert_eq!(buckets.noise.len(), 3);

        sort_for_display(&mut buckets).unwrap();
        let order: Vec<_> = buckets.noise.iter().map(|f| f.file.name.as_str()).collect();
        assert_eq!(order, ["IC_1_thresh.png", "IC_3_thresh.png", "IC_4_thresh.png"]);
    }

    #[test]
    fn names_without_tokens_sort_first() {
        let strategy = LookupStrategy::new().unwrap();
        let batch = vec![named_file("IC_6_thresh.png"), named_file("zz_unnumbered.png")];
        let mut buckets = classify(batch, &strategy);
        // IC_6 reads label 1; the unnumbered file at position 1 also reads
        // label 1, so both sit in the soz bucket.
        assert_eq!(buckets.soz.len(), 2);

        sort_for_display(&mut buckets).unwrap();
        assert_eq!(buckets.soz[0].file.name, "zz_unnumbered.png");
        assert_eq!(buckets.soz[1].file.name, "IC_6_thresh.png");
    }
}
