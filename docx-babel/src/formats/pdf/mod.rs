//! PDF export built on top of the HTML serializer + headless Chrome.
//!
//! The page is rendered with the HTML format, page-size CSS is injected, then a Chrome or
//! Chromium binary running headless prints it to PDF.
//!
//! Options: `page` (`a4`, the default, or `mobile`) plus the HTML options `title` and `css`.

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::formats::html::{serialize_to_html, HtmlFormat};
use crate::mdast::Root;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;
use url::Url;
use which::which;

const CHROME_ENV: &str = "DOCX_CHROME_BIN";

/// Format implementation that shells out to Chrome/Chromium to generate PDFs.
#[derive(Default)]
pub struct PdfFormat {
    html: HtmlFormat,
}

impl PdfFormat {
    pub fn new(html: HtmlFormat) -> Self {
        Self { html }
    }
}

impl Format for PdfFormat {
    fn name(&self) -> &str {
        "pdf"
    }

    fn description(&self) -> &str {
        "HTML-based PDF export via headless Chrome"
    }

    fn file_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn option_names(&self) -> &[&str] {
        &["page", "title", "css"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, _root: &Root) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(
            "PDF serialization produces binary output".to_string(),
        ))
    }

    fn serialize_with_options(
        &self,
        root: &Root,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.check_options(options)?;
        let mut html_options = options.clone();
        let profile = PageProfile::from_option(html_options.remove("page").as_deref())?;
        let html_options = self.html.options_from(&html_options)?;

        let html = serialize_to_html(root, &html_options)?;
        let final_html = inject_page_css(&html, profile.print_css());
        let pdf_bytes = render_html_to_pdf(&final_html, profile)?;
        Ok(SerializedDocument::Binary(pdf_bytes))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PageProfile {
    A4,
    Mobile,
}

impl PageProfile {
    fn from_option(value: Option<&str>) -> Result<Self, FormatError> {
        match value.map(str::to_lowercase).as_deref() {
            None | Some("") | Some("a4") => Ok(PageProfile::A4),
            Some("mobile") => Ok(PageProfile::Mobile),
            Some(other) => Err(FormatError::SerializationError(format!(
                "Unknown page profile '{other}' (expected 'a4' or 'mobile')"
            ))),
        }
    }

    fn print_css(&self) -> &'static str {
        match self {
            PageProfile::A4 => "@page { size: 210mm 297mm; margin: 18mm; }\nbody { margin: 0; }\n",
            PageProfile::Mobile => {
                "@page { size: 90mm 160mm; margin: 5mm; }\nbody { margin: 0; }\n.docx-document { max-width: calc(90mm - 10mm); padding: 0; }\n"
            }
        }
    }

    fn viewport(&self) -> (u32, u32) {
        match self {
            PageProfile::A4 => (1280, 960),
            PageProfile::Mobile => (450, 900),
        }
    }
}

fn inject_page_css(html: &str, css: &str) -> String {
    let style_tag = format!("<style data-docx-pdf>\n{css}</style>\n");
    match html.find("</head>") {
        Some(idx) => format!("{}{style_tag}{}", &html[..idx], &html[idx..]),
        None => format!("{style_tag}{html}"),
    }
}

fn render_html_to_pdf(html: &str, profile: PageProfile) -> Result<Vec<u8>, FormatError> {
    let chrome = resolve_chrome_binary()?;
    let temp_dir =
        tempdir().map_err(|e| FormatError::SerializationError(format!("Temp dir error: {e}")))?;
    let html_path = temp_dir.path().join("docx-export.html");
    fs::write(&html_path, html).map_err(|e| FormatError::SerializationError(e.to_string()))?;

    let pdf_path = temp_dir.path().join("docx-export.pdf");
    let file_url = Url::from_file_path(&html_path).map_err(|_| {
        FormatError::SerializationError(
            "Failed to construct file:// URL for HTML input".to_string(),
        )
    })?;

    let (width, height) = profile.viewport();
    log::debug!("printing {} with {}", file_url, chrome.display());

    let status = Command::new(&chrome)
        .arg("--headless")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--print-to-pdf-no-header")
        .arg(format!("--print-to-pdf={}", pdf_path.display()))
        .arg(format!("--window-size={width},{height}"))
        .arg(file_url.as_str())
        .status()
        .map_err(|e| {
            FormatError::SerializationError(format!(
                "Failed to launch Chrome ({}): {e}",
                chrome.display()
            ))
        })?;

    if !status.success() {
        return Err(FormatError::SerializationError(format!(
            "Chrome exited with status {status}"
        )));
    }

    fs::read(&pdf_path).map_err(|e| FormatError::SerializationError(e.to_string()))
}

fn resolve_chrome_binary() -> Result<PathBuf, FormatError> {
    for var in [CHROME_ENV, "GOOGLE_CHROME_BIN", "CHROME_BIN"] {
        if let Some(path) = env::var_os(var).filter(|path| !path.is_empty()) {
            return Ok(PathBuf::from(path));
        }
    }

    for candidate in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
        "msedge",
    ] {
        if let Ok(path) = which(candidate) {
            return Ok(path);
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidate =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    #[cfg(target_os = "windows")]
    {
        for candidate in [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ] {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    Err(FormatError::SerializationError(format!(
        "Unable to locate a Chrome/Chromium binary. Set {CHROME_ENV} to override the detection."
    )))
}
