//! Page layout for the exported report.
//!
//! The layout pass is pure arithmetic over the buckets: it walks the
//! records with a vertical cursor measured top-down in millimetres, starts
//! a new page whenever the next record would cross the bottom margin, and
//! emits positioned text runs and image slots. The page total is only
//! known once every record is placed, so footers are stamped in a second
//! pass over the laid-out pages. Painting the result into a PDF is a
//! separate step.

use chrono::{DateTime, Utc};
use common::model::file::{Buckets, Category};
use uuid::Uuid;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const IMAGE_SIDE_MM: f32 = 24.0;

const MARGIN_LEFT_MM: f32 = 14.0;
const CURSOR_TOP_MM: f32 = 10.0;
/// No record may start below this line.
const BOTTOM_LIMIT_MM: f32 = 250.0;
const RECORD_HEIGHT_MM: f32 = 34.0;
const RECORD_GAP_MM: f32 = 8.0;
const HEADING_BLOCK_MM: f32 = 14.0;
const FOOTER_X_MM: f32 = 98.0;
const FOOTER_Y_MM: f32 = 290.0;

/// Character budgets for the fixed-width columns.
const NAME_BUDGET: usize = 32;
const NOTE_BUDGET: usize = 36;
const EXPLANATION_WRAP: usize = 52;
const EXPLANATION_MAX_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Regular,
    Bold,
    Italic,
}

/// A positioned text run; `y` is measured top-down.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: TextStyle,
    pub text: String,
}

/// Identifies which prepared artifact fills an image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKey {
    Thumbnail(Uuid),
    Heatmap(Uuid),
}

/// A slot where a per-file artifact is drawn, if it loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlot {
    pub x: f32,
    pub y: f32,
    pub artifact: ArtifactKey,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub texts: Vec<TextSpan>,
    pub images: Vec<ImageSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<PageLayout>,
}

/// Lays out the full report for the given buckets. Deterministic for fixed
/// inputs; only the timestamp argument varies between otherwise identical
/// reports.
pub fn lay_out(buckets: &Buckets, generated_at: DateTime<Utc>) -> ReportLayout {
    let mut pages: Vec<PageLayout> = Vec::new();
    let mut page = PageLayout::default();
    let mut y = CURSOR_TOP_MM;

    push_text(&mut page, MARGIN_LEFT_MM, y, 18.0, TextStyle::Bold, "NeuroTriage AI Report");
    y += 10.0;
    push_text(
        &mut page,
        MARGIN_LEFT_MM,
        y,
        12.0,
        TextStyle::Regular,
        &format!("Date: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    );

    for category in [Category::Rsn, Category::Noise, Category::Soz] {
        let files = buckets.bucket(category);
        if files.is_empty() {
            continue;
        }

        if y + HEADING_BLOCK_MM + RECORD_GAP_MM + RECORD_HEIGHT_MM > BOTTOM_LIMIT_MM {
            pages.push(std::mem::take(&mut page));
            y = CURSOR_TOP_MM;
        }
        y += 10.0;
        push_text(
            &mut page,
            MARGIN_LEFT_MM,
            y,
            14.0,
            TextStyle::Bold,
            &format!("{} ({})", category.label(), category.description()),
        );
        y += 4.0;

        for file in files {
            if y + RECORD_GAP_MM + RECORD_HEIGHT_MM > BOTTOM_LIMIT_MM {
                pages.push(std::mem::take(&mut page));
                y = CURSOR_TOP_MM;
            }
            y += RECORD_GAP_MM;
            lay_out_record(&mut page, y, file);
            y += RECORD_HEIGHT_MM;
        }
    }
    pages.push(page);

    // Second pass: the total is known only now that layout is done.
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        page.texts.push(TextSpan {
            x: FOOTER_X_MM,
            y: FOOTER_Y_MM,
            size: 9.0,
            style: TextStyle::Regular,
            text: format!("Page {} of {}", index + 1, total),
        });
    }

    ReportLayout { pages }
}

fn lay_out_record(page: &mut PageLayout, y: f32, file: &common::model::file::ClassifiedFile) {
    page.images.push(ImageSlot {
        x: MARGIN_LEFT_MM,
        y,
        artifact: ArtifactKey::Thumbnail(file.file.id),
    });
    page.images.push(ImageSlot {
        x: 40.0,
        y,
        artifact: ArtifactKey::Heatmap(file.file.id),
    });

    let regular = |x: f32, dy: f32, text: String| TextSpan {
        x,
        y: y + dy,
        size: 10.0,
        style: TextStyle::Regular,
        text,
    };

    page.texts.push(regular(
        70.0,
        6.0,
        format!("File: {}", truncate(&file.file.name, NAME_BUDGET)),
    ));
    page.texts
        .push(regular(70.0, 12.0, format!("Type: {}", file.file.modality.as_str())));
    page.texts
        .push(regular(70.0, 18.0, format!("Category: {}", file.category.label())));
    page.texts.push(regular(
        120.0,
        6.0,
        format!("Approval: {}", file.approval.label()),
    ));
    page.texts.push(regular(
        120.0,
        12.0,
        format!(
            "Clinical Note: {}",
            truncate(file.file.clinical_note.as_deref().unwrap_or("-"), NOTE_BUDGET)
        ),
    ));
    page.texts.push(regular(70.0, 24.0, "Explanation:".to_string()));

    for (line_index, line) in wrap(
        file.effective_explanation(),
        EXPLANATION_WRAP,
        EXPLANATION_MAX_LINES,
    )
    .into_iter()
    .enumerate()
    {
        page.texts.push(TextSpan {
            x: 90.0,
            y: y + 24.0 + 4.0 * line_index as f32,
            size: 10.0,
            style: TextStyle::Italic,
            text: line,
        });
    }
}

fn push_text(page: &mut PageLayout, x: f32, y: f32, size: f32, style: TextStyle, text: &str) {
    page.texts.push(TextSpan {
        x,
        y,
        size,
        style,
        text: text.to_string(),
    });
}

/// Truncates to `budget` characters, appending an ellipsis marker when
/// anything was cut.
pub fn truncate(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut out: String = text.chars().take(budget.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Greedy word wrap up to `max_lines`; whatever does not fit is dropped
/// silently.
pub fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            if lines.len() == max_lines {
                return lines;
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::model::file::{
        Approval, ClassificationSource, ClassifiedFile, IngestedFile, Modality,
    };

    fn classified(name: &str, category: Category) -> ClassifiedFile {
        ClassifiedFile {
            file: IngestedFile {
                id: Uuid::new_v4(),
                name: name.to_string(),
                size: 2048,
                mime_type: "image/png".to_string(),
                last_modified: None,
                modality: Modality::Mri,
                clinical_note: None,
                spool_path: Default::default(),
            },
            category,
            ai_explanation: "Clusters on grey matter.".to_string(),
            ai_heatmap: "/assets/ai_heatmap.png".to_string(),
            source: ClassificationSource::Lookup,
            source_index: None,
            approval: Approval::Pending,
            clinician_explanation: None,
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().unwrap()
    }

    fn buckets_with(count: usize) -> Buckets {
        let mut buckets = Buckets::default();
        for i in 0..count {
            buckets
                .noise
                .push(classified(&format!("IC_{}_thresh.png", i + 1), Category::Noise));
        }
        buckets
    }

    #[test]
    fn layout_is_deterministic_for_fixed_inputs() {
        let buckets = buckets_with(7);
        assert_eq!(lay_out(&buckets, fixed_time()), lay_out(&buckets, fixed_time()));
    }

    #[test]
    fn long_reports_paginate_with_consistent_footers() {
        let plan = lay_out(&buckets_with(14), fixed_time());
        assert!(plan.pages.len() >= 2, "14 records must not fit one page");

        let total = plan.pages.len();
        for (index, page) in plan.pages.iter().enumerate() {
            let footer = format!("Page {} of {}", index + 1, total);
            assert!(
                page.texts.iter().any(|t| t.text == footer),
                "page {} is missing its footer",
                index + 1
            );
        }
    }

    #[test]
    fn records_never_start_below_the_bottom_margin() {
        let plan = lay_out(&buckets_with(40), fixed_time());
        for page in &plan.pages {
            for slot in &page.images {
                assert!(slot.y >= CURSOR_TOP_MM);
                assert!(slot.y + RECORD_HEIGHT_MM <= BOTTOM_LIMIT_MM);
            }
        }
    }

    #[test]
    fn empty_buckets_still_produce_a_titled_page() {
        let plan = lay_out(&Buckets::default(), fixed_time());
        assert_eq!(plan.pages.len(), 1);
        let texts: Vec<_> = plan.pages[0].texts.iter().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"NeuroTriage AI Report"));
        assert!(texts.contains(&"Page 1 of 1"));
    }

    #[test]
    fn clinician_explanation_overrides_the_ai_text() {
        let mut buckets = Buckets::default();
        let mut file = classified("IC_9_thresh.png", Category::Soz);
        file.clinician_explanation = Some("Focal slowing near the lesion.".to_string());
        buckets.soz.push(file);

        let plan = lay_out(&buckets, fixed_time());
        let all_text: String = plan.pages[0]
            .texts
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(all_text.contains("Focal slowing near the lesion."));
        assert!(!all_text.contains("Potential SOZ detected."));
    }

    #[test]
    fn truncate_respects_the_character_budget() {
        assert_eq!(truncate("short.png", 32), "short.png");
        let long = "a_very_long_component_filename_that_overflows.png";
        let cut = truncate(long, 16);
        assert_eq!(cut.chars().count(), 16);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn wrap_caps_the_line_count_and_drops_the_rest() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap(text, 12, 2);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.chars().count() <= 12);
        }
        // Dropped words are gone, not wrapped onto extra lines.
        assert!(!lines.join(" ").contains("ten"));
    }

    #[test]
    fn wrap_of_empty_text_is_empty() {
        assert!(wrap("", 10, 3).is_empty());
    }
}
