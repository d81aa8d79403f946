//! Paints a computed layout into a PDF document.
//!
//! All positions arrive in top-down millimetres from the layout pass and
//! are flipped here into the PDF's bottom-left coordinate space.

use super::layout::{
    ArtifactKey, ImageSlot, PageLayout, ReportLayout, TextStyle, IMAGE_SIDE_MM, PAGE_HEIGHT_MM,
    PAGE_WIDTH_MM,
};
use image::imageops::FilterType;
use image::DynamicImage;
use printpdf::{
    BuiltinFont, Image as PdfImage, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfLayerReference,
};
use std::collections::HashMap;
use std::io::BufWriter;

/// Pixel edge for embedded artifacts; with the DPI below they print at the
/// layout's square slot size.
const IMAGE_SIDE_PX: u32 = 142;
const IMAGE_DPI: f32 = IMAGE_SIDE_PX as f32 * 25.4 / IMAGE_SIDE_MM;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

pub fn paint(
    plan: &ReportLayout,
    artifacts: &HashMap<ArtifactKey, DynamicImage>,
) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "NeuroTriage AI Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "report",
    );
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique)?,
    };

    for (index, page) in plan.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "report");
            doc.get_page(page_index).get_layer(layer_index)
        };
        paint_page(&layer, page, artifacts, &fonts);
    }

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))?;
    Ok(bytes)
}

fn paint_page(
    layer: &PdfLayerReference,
    page: &PageLayout,
    artifacts: &HashMap<ArtifactKey, DynamicImage>,
    fonts: &Fonts,
) {
    for span in &page.texts {
        let font = match span.style {
            TextStyle::Regular => &fonts.regular,
            TextStyle::Bold => &fonts.bold,
            TextStyle::Italic => &fonts.italic,
        };
        layer.use_text(
            span.text.clone(),
            span.size,
            Mm(span.x),
            Mm(PAGE_HEIGHT_MM - span.y),
            font,
        );
    }
    // A slot whose artifact did not load is simply left empty.
    for slot in &page.images {
        if let Some(img) = artifacts.get(&slot.artifact) {
            draw_image(layer, img, slot);
        }
    }
}

/// Squares the artifact to the slot, flattens any alpha channel over a
/// white background, and embeds it as RGB8.
fn draw_image(layer: &PdfLayerReference, img: &DynamicImage, slot: &ImageSlot) {
    let resized = img.resize_exact(IMAGE_SIDE_PX, IMAGE_SIDE_PX, FilterType::Lanczos3);
    let rgba = resized.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut background =
        image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    let flattened = DynamicImage::ImageRgba8(background).to_rgb8();

    let pdf_image = PdfImage::from_dynamic_image(&DynamicImage::ImageRgb8(flattened));
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(slot.x)),
            translate_y: Some(Mm(PAGE_HEIGHT_MM - slot.y - IMAGE_SIDE_MM)),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::super::layout::{lay_out, ArtifactKey};
    use super::*;
    use chrono::TimeZone;
    use common::model::file::{
        Approval, Buckets, Category, ClassificationSource, ClassifiedFile, IngestedFile, Modality,
    };
    use uuid::Uuid;

    fn one_file_buckets() -> Buckets {
        let mut buckets = Buckets::default();
        buckets.soz.push(ClassifiedFile {
            file: IngestedFile {
                id: Uuid::new_v4(),
                name: "IC_2_thresh.png".to_string(),
                size: 2048,
                mime_type: "image/png".to_string(),
                last_modified: None,
                modality: Modality::Mri,
                clinical_note: Some("History of focal seizures.".to_string()),
                spool_path: Default::default(),
            },
            category: Category::Soz,
            ai_explanation: "Potential SOZ detected. Please review.".to_string(),
            ai_heatmap: "/assets/ai_heatmap.png".to_string(),
            source: ClassificationSource::Lookup,
            source_index: Some(2),
            approval: Approval::Pending,
            clinician_explanation: None,
        });
        buckets
    }

    #[test]
    fn paints_a_valid_pdf_without_artifacts() {
        let buckets = one_file_buckets();
        let when = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().unwrap();
        let plan = lay_out(&buckets, when);

        let bytes = paint(&plan, &HashMap::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn paints_embedded_artifacts() {
        let buckets = one_file_buckets();
        let file_id = buckets.soz[0].file.id;
        let when = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().unwrap();
        let plan = lay_out(&buckets, when);

        let mut artifacts = HashMap::new();
        let pixels = image::RgbImage::from_pixel(64, 48, image::Rgb([120, 40, 200]));
        artifacts.insert(
            ArtifactKey::Thumbnail(file_id),
            DynamicImage::ImageRgb8(pixels),
        );

        let with_artifact = paint(&plan, &artifacts).unwrap();
        let without = paint(&plan, &HashMap::new()).unwrap();
        assert!(with_artifact.starts_with(b"%PDF"));
        assert!(with_artifact.len() > without.len());
    }
}
