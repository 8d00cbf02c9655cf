//! PDF fixtures for tests.

use lopdf::dictionary;
use lopdf::{Document, Object, Stream};

/// Lines of a plausible blood test report.
pub fn sample_report_lines() -> &'static [&'static str] {
    &[
        "Complete Blood Count",
        "Hemoglobin 11.2 g/dL (13.5 - 17.5)",
        "White Blood Cells 7.1 x10^3/uL (4.5 - 11.0)",
        "Platelets 250 x10^3/uL (150 - 400)",
        "Lipid Panel",
        "Total Cholesterol 242 mg/dL (< 200)",
        "Fasting Glucose 94 mg/dL (70 - 99)",
    ]
}

/// A single-page PDF whose text layer holds `lines`, one per row, in Helvetica.
pub fn sample_report_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut content = String::from("BT /F1 12 Tf 72 760 Td 16 TL");
    for line in lines {
        content.push_str(&format!(" ({}) Tj T*", escape_pdf_string(line)));
    }
    content.push_str(" ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("in-memory PDF write cannot fail");
    buffer
}

fn escape_pdf_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}
