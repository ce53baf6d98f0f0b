//! Rendering module for converting documents to various output formats.

mod css;
mod html;
mod json;
mod options;
mod text;

pub use css::{PLAIN_CSS, STYLED_CSS};
pub use html::{to_html, HtmlRenderer};
pub use json::{to_json, to_json_without_image_data, JsonFormat};
pub use options::{HtmlTemplate, PageSelection, RenderOptions};
pub use text::to_text;
