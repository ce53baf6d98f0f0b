//! End-to-end tests: PDF file in, HTML file out.

mod common;

use base64::Engine;
use common::{png_payloads, write_pdf, PageFixture, IMAGE_HEIGHT, IMAGE_WIDTH};
use pdf2html::{
    Error, ErrorMode, HtmlConverter, OutputTarget, PageSelection, ParseOptions, Pdf2Html, RenderOptions,
};

fn three_pages() -> Vec<PageFixture> {
    vec![
        PageFixture::text(&["Hello <World> & more", "Second line"]),
        PageFixture::text(&["Middle page"]).with_image(),
        PageFixture::text(&["Last page"]).with_rule(),
    ]
}

#[test]
fn test_one_page_container_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "report.pdf", &three_pages(), None);

    let written = HtmlConverter::new()
        .convert_file(&pdf, OutputTarget::Dir(dir.path().join("out")))
        .unwrap();

    assert_eq!(written, dir.path().join("out").join("report.html"));
    let html = std::fs::read_to_string(&written).unwrap();
    assert_eq!(html.matches("class=\"pdf-page\"").count(), 3);
    for n in 1..=3 {
        assert!(html.contains(&format!("id=\"page-{}\"", n)));
        assert!(html.contains(&format!("<div class=\"page-number\">Page {}</div>", n)));
    }
    assert!(html.contains("<title>report</title>"));
}

#[test]
fn test_text_is_escaped() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "escape.pdf", &three_pages(), None);

    let html = pdf2html::to_html(&pdf).unwrap();

    assert!(html.contains("Hello &lt;World&gt; &amp; more"));
    assert!(!html.contains("<World>"));
    assert!(html.contains("Second line"));
    assert!(html.contains("<span class=\"text-span\">"));
}

#[test]
fn test_missing_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let err = HtmlConverter::new()
        .convert_file(dir.path().join("absent.pdf"), OutputTarget::Dir(out.clone()))
        .unwrap_err();

    assert!(matches!(err, Error::FileNotFound(_)));
    assert!(!out.exists());
}

#[test]
fn test_not_a_pdf_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, "just some text, not a PDF").unwrap();

    let err = pdf2html::convert_file(&path, Some(dir.path().join("notes.html"))).unwrap_err();

    assert!(matches!(err, Error::UnknownFormat));
    assert!(!dir.path().join("notes.html").exists());
}

#[test]
fn test_image_is_inlined_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "image.pdf", &three_pages(), None);

    let html = pdf2html::to_html(&pdf).unwrap();

    assert_eq!(html.matches("<img ").count(), 1);
    assert!(html.contains("alt=\"PDF Image 0\""));
    assert!(html.contains(&format!("width=\"{}\" height=\"{}\"", IMAGE_WIDTH, IMAGE_HEIGHT)));

    let payloads = png_payloads(&html);
    assert_eq!(payloads.len(), 1);
    let bytes = base64::engine::general_purpose::STANDARD.decode(payloads[0]).unwrap();

    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let reader = decoder.read_info().unwrap();
    assert_eq!(reader.info().width, IMAGE_WIDTH);
    assert_eq!(reader.info().height, IMAGE_HEIGHT);
}

#[test]
fn test_image_belongs_to_its_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "pages.pdf", &three_pages(), None);

    let doc = pdf2html::parse_file(&pdf).unwrap();

    assert_eq!(doc.image_count(), 1);
    assert!(doc.pages[0].images.is_empty());
    let image = &doc.pages[1].images[0];
    assert_eq!(image.page, 1);
    assert_eq!(image.rects.len(), 1);
    assert!((image.rects[0].width() - 100.0).abs() < 0.01);
    assert!((image.rects[0].height() - 150.0).abs() < 0.01);
}

#[test]
fn test_conversion_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "same.pdf", &three_pages(), Some("Jane Roe"));

    let first = HtmlConverter::new()
        .convert_file(&pdf, OutputTarget::Dir(dir.path().join("a")))
        .unwrap();
    let second = HtmlConverter::new()
        .convert_file(&pdf, OutputTarget::Dir(dir.path().join("b")))
        .unwrap();

    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn test_explicit_output_file_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "in.pdf", &[PageFixture::text(&["x"])], None);
    let target = dir.path().join("deep/nested/custom.html");

    let written = pdf2html::convert_file(&pdf, Some(target.clone())).unwrap();

    assert_eq!(written, target);
    assert!(target.is_file());
}

#[test]
fn test_plain_template() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "plain.pdf", &three_pages(), None);

    let html = Pdf2Html::new().plain().parse(&pdf).unwrap().to_html().unwrap();

    assert_eq!(html.matches("<div class=\"page\"").count(), 3);
    assert!(html.contains("<h2>Page 1</h2>"));
    assert!(html.contains("<pre>Hello &lt;World&gt; &amp; more"));
    assert!(!html.contains("pdf-title"));
    assert_eq!(png_payloads(&html).len(), 1);
}

#[test]
fn test_drawings_only_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "rule.pdf", &three_pages(), None);

    let html = pdf2html::to_html(&pdf).unwrap();
    assert!(!html.contains("class=\"drawing-element\""));

    let html = Pdf2Html::new().with_drawings(true).parse(&pdf).unwrap().to_html().unwrap();
    assert_eq!(html.matches("class=\"drawing-element\"").count(), 1);
    assert!(html.contains("border-color: #0000ff; border-width: 2px"));
    assert!(html.contains("left: 72px; top: 492px; width: 468px"));
}

#[test]
fn test_page_selection() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "select.pdf", &three_pages(), None);

    let options = RenderOptions::new().with_pages(PageSelection::parse("2-3").unwrap());
    let html = pdf2html::to_html_with_options(&pdf, &options).unwrap();

    assert_eq!(html.matches("class=\"pdf-page\"").count(), 2);
    assert!(!html.contains("id=\"page-1\""));
    assert!(html.contains("id=\"page-2\""));
    assert!(html.contains("Last page"));
    assert!(!html.contains("Second line"));
}

#[test]
fn test_metadata_meta_tags() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "meta.pdf", &three_pages(), Some("Smith & \"Sons\""));

    let html = pdf2html::to_html(&pdf).unwrap();
    assert!(html.contains("<meta name=\"author\" content=\"Smith &amp; &quot;Sons&quot;\">"));
    assert!(html.contains("<meta name=\"generator\" content=\"fixture\">"));

    let html = pdf2html::to_html_with_options(&pdf, &RenderOptions::new().with_metadata(false)).unwrap();
    assert!(!html.contains("name=\"author\""));
}

#[test]
fn test_unreadable_page_strict_and_lenient() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![PageFixture::text(&["Fine page"]), PageFixture::broken()];
    let pdf = write_pdf(dir.path(), "broken.pdf", &pages, None);

    assert!(pdf2html::parse_file(&pdf).is_err());

    let options = ParseOptions::new().with_error_mode(ErrorMode::Lenient);
    let doc = pdf2html::parse_file_with_options(&pdf, options).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert!(doc.pages[1].is_empty());

    let html = Pdf2Html::new().lenient().parse(&pdf).unwrap().to_html().unwrap();
    assert_eq!(html.matches("class=\"pdf-page\"").count(), 2);
    assert!(html.contains("Fine page"));
}

#[test]
fn test_images_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "noimg.pdf", &three_pages(), None);

    let html = Pdf2Html::new().with_images(false).parse(&pdf).unwrap().to_html().unwrap();
    assert!(!html.contains("<img "));
    assert!(html.contains("Middle page"));
}

#[test]
fn test_bytes_and_text_outputs() {
    let data = common::build_pdf(&three_pages(), None);

    let html = HtmlConverter::new().convert_bytes(&data, "From Memory").unwrap();
    assert!(html.contains("<title>From Memory</title>"));

    let result = Pdf2Html::new().parse_bytes(&data).unwrap();
    let text = result.to_text().unwrap();
    assert!(text.starts_with("Hello <World> & more"));
    assert_eq!(text.matches('\x0c').count(), 2);

    let json = result.to_json(pdf2html::JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["pages"].as_array().map(|p| p.len()), Some(3));
}

#[test]
fn test_page_attributes_inherited_from_page_tree() {
    let data = common::build_pdf_inherited(&["Inherited font", "Second"], [0, 0, 300, 400]);

    let doc = pdf2html::parse_bytes(&data).unwrap();
    assert_eq!(doc.page_count(), 1);
    let page = &doc.pages[0];
    assert_eq!(page.width, 300.0);
    assert_eq!(page.height, 400.0);

    let text = doc.plain_text();
    assert!(text.contains("Inherited font"));
    assert!(text.contains("Second"));
    let span = &page.text_blocks[0].lines[0].spans[0];
    assert_eq!(span.font, "Helvetica-Bold");
    assert!(span.bold);
    // Baseline at y=360 on a 400pt page.
    assert!(span.bbox.y0 < 40.0 && span.bbox.y1 > 40.0);

    let html = HtmlConverter::new().convert_bytes(&data, "inherited").unwrap();
    assert!(html.contains("Inherited font"));
}
