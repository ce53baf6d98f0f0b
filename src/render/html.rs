//! HTML rendering for PDF documents.

use html_escape::encode_quoted_attribute as escape;

use crate::error::Result;
use crate::model::{Document, DrawingRef, ImageRef, Line, PageContent, Span, TextBlock};

use super::css::{PLAIN_CSS, STYLED_CSS};
use super::{HtmlTemplate, RenderOptions};

/// Convert a document to a self-contained HTML string.
pub fn to_html(doc: &Document, options: &RenderOptions) -> Result<String> {
    HtmlRenderer::new(options.clone()).render(doc)
}

/// HTML renderer.
///
/// Output depends only on the document and options, so rendering the same
/// input twice yields identical bytes.
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    /// Create a new HTML renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to HTML.
    pub fn render(&self, doc: &Document) -> Result<String> {
        let title = self.options.title.as_deref().unwrap_or(&doc.title);
        let pages: Vec<&PageContent> = doc
            .pages
            .iter()
            .filter(|p| self.options.page_selection.includes(p.number()))
            .collect();

        let meta = if self.options.include_metadata {
            doc.metadata.html_meta_pairs()
        } else {
            Vec::new()
        };

        let html = match self.options.template {
            HtmlTemplate::Styled => self.render_styled(title, &meta, &pages),
            HtmlTemplate::Plain => self.render_plain(title, &meta, &pages),
        };
        Ok(html)
    }

    fn render_styled(&self, title: &str, meta: &[(&str, &str)], pages: &[&PageContent]) -> String {
        let title = escape(title);
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("    <meta charset=\"UTF-8\">\n");
        out.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        for (name, content) in meta {
            out.push_str(&format!("    <meta name=\"{}\" content=\"{}\">\n", name, escape(content)));
        }
        out.push_str(&format!("    <title>{}</title>\n", title));
        out.push_str("    <style>\n");
        out.push_str(STYLED_CSS);
        out.push_str("    </style>\n</head>\n<body>\n");
        out.push_str("    <div class=\"pdf-container\">\n");
        out.push_str(&format!("        <h1 class=\"pdf-title\">{}</h1>\n", title));

        for page in pages {
            self.render_styled_page(&mut out, page);
        }

        out.push_str("    </div>\n</body>\n</html>\n");
        out
    }

    fn render_styled_page(&self, out: &mut String, page: &PageContent) {
        let n = page.number();
        out.push_str(&format!("        <div class=\"pdf-page\" id=\"page-{}\">\n", n));
        out.push_str(&format!("            <div class=\"page-number\">Page {}</div>\n", n));

        for block in &page.text_blocks {
            render_text_block(out, block);
        }

        if self.options.include_images {
            for image in &page.images {
                render_styled_image(out, image);
            }
        }

        if self.options.include_drawings {
            for drawing in &page.drawings {
                render_drawing(out, drawing);
            }
        }

        out.push_str("        </div>\n");
    }

    fn render_plain(&self, title: &str, meta: &[(&str, &str)], pages: &[&PageContent]) -> String {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        for (name, content) in meta {
            out.push_str(&format!("<meta name=\"{}\" content=\"{}\">\n", name, escape(content)));
        }
        out.push_str(&format!("<title>{}</title>\n", escape(title)));
        out.push_str("<style>\n");
        out.push_str(PLAIN_CSS);
        out.push_str("</style>\n</head>\n<body>\n");

        for page in pages {
            let n = page.number();
            out.push_str(&format!("<div class=\"page\" id=\"page-{}\">\n", n));
            out.push_str(&format!("<h2>Page {}</h2>\n", n));

            let text = page.plain_text();
            if !text.trim().is_empty() {
                out.push_str(&format!("<div class=\"text-block\"><pre>{}</pre></div>\n", escape(&text)));
            }

            if self.options.include_images {
                for image in &page.images {
                    out.push_str(&format!(
                        "<div class=\"image-container\"><img src=\"{}\" alt=\"PDF Image {}\"></div>\n",
                        image.data_uri(),
                        image.index
                    ));
                }
            }

            out.push_str("</div>\n");
        }

        out.push_str("</body>\n</html>\n");
        out
    }
}

fn render_text_block(out: &mut String, block: &TextBlock) {
    out.push_str("            <div class=\"text-block\">\n");
    for line in &block.lines {
        if let Some(html) = render_line(line) {
            out.push_str(&html);
            out.push('\n');
        }
    }
    out.push_str("            </div>\n");
}

/// One line of adjacent `<span>`s, or `None` for a line without spans.
fn render_line(line: &Line) -> Option<String> {
    if line.spans.is_empty() {
        return None;
    }
    Some(line.spans.iter().map(render_span).collect())
}

fn render_span(span: &Span) -> String {
    let mut classes = vec!["text-span"];
    if span.bold {
        classes.push("bold");
    }
    if span.italic {
        classes.push("italic");
    }

    let mut styles = Vec::new();
    if span.has_custom_size() {
        styles.push(format!("font-size: {}px", format_number(span.size)));
    }
    if !span.color.is_black() {
        styles.push(format!("color: {}", span.color.to_hex()));
    }

    let style_attr = if styles.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", styles.join("; "))
    };

    format!(
        "<span class=\"{}\"{}>{}</span>",
        classes.join(" "),
        style_attr,
        escape(&span.text)
    )
}

fn render_styled_image(out: &mut String, image: &ImageRef) {
    out.push_str("            <div class=\"image-container\">\n");
    out.push_str(&format!(
        "                <img src=\"{}\" alt=\"PDF Image {}\" class=\"pdf-image\" width=\"{}\" height=\"{}\">\n",
        image.data_uri(),
        image.index,
        image.width,
        image.height
    ));
    out.push_str("            </div>\n");
}

fn render_drawing(out: &mut String, drawing: &DrawingRef) {
    let bbox = &drawing.bbox;
    let mut styles = vec![
        format!("left: {}px", format_number(bbox.x0)),
        format!("top: {}px", format_number(bbox.y0)),
        format!("width: {}px", format_number(bbox.width())),
        format!("height: {}px", format_number(bbox.height())),
    ];
    if let Some(stroke) = drawing.stroke_color {
        styles.push(format!("border-color: {}", stroke.to_hex()));
        styles.push(format!("border-width: {}px", format_number(drawing.width)));
    }
    if let Some(fill) = drawing.fill_color {
        styles.push(format!("background-color: {}", fill.to_hex()));
    }

    out.push_str(&format!(
        "            <div class=\"drawing-element\" style=\"{}\"></div>\n",
        styles.join("; ")
    ));
}

/// Format a length with at most two decimals and no trailing zeros.
fn format_number(value: f32) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
