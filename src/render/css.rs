//! Embedded stylesheets for the HTML templates.

/// Stylesheet of the styled template.
pub const STYLED_CSS: &str = r#"body {
    font-family: Arial, sans-serif;
    margin: 0;
    padding: 20px;
    background-color: #f5f5f5;
}

.pdf-container {
    max-width: 1200px;
    margin: 0 auto;
    background-color: white;
    box-shadow: 0 0 10px rgba(0, 0, 0, 0.1);
    border-radius: 8px;
    overflow: hidden;
}

.pdf-title {
    background-color: #2c3e50;
    color: white;
    padding: 20px;
    margin: 0;
    font-size: 24px;
    font-weight: bold;
}

.pdf-page {
    padding: 20px;
    border-bottom: 2px solid #ecf0f1;
    position: relative;
    min-height: 400px;
}

.pdf-page:last-child {
    border-bottom: none;
}

.page-number {
    position: absolute;
    top: 10px;
    right: 20px;
    background-color: #3498db;
    color: white;
    padding: 5px 10px;
    border-radius: 15px;
    font-size: 12px;
    font-weight: bold;
}

.text-block {
    margin: 10px 0;
    line-height: 1.4;
}

.text-span {
    display: inline;
}

.bold {
    font-weight: bold;
}

.italic {
    font-style: italic;
}

.pdf-image {
    max-width: 100%;
    height: auto;
    display: block;
    margin: 15px 0;
    border: 1px solid #ddd;
    border-radius: 4px;
}

.image-container {
    text-align: center;
    margin: 20px 0;
}

.drawing-element {
    position: absolute;
    border: 1px solid #ccc;
}

@media print {
    .pdf-container {
        box-shadow: none;
        border-radius: 0;
    }

    .pdf-page {
        page-break-after: always;
    }

    .pdf-page:last-child {
        page-break-after: auto;
    }
}
"#;

/// Stylesheet of the plain template.
pub const PLAIN_CSS: &str = r#"body { font-family: sans-serif; margin: 20px; }
.page { margin-bottom: 20px; border: 1px solid #eee; padding: 15px; }
.text-block { margin-bottom: 10px; }
.image-container { text-align: center; margin: 10px 0; }
img { max-width: 100%; height: auto; border: 1px solid #ddd; }
"#;
