//! Single-page upload form: state machine and HTML rendering.
//!
//! ```text
//! Idle ──select(pdf)──▶ FileSelected ──submit──▶ Submitting ──resolve──▶ Success
//!  ▲  ◀─select(other)─┘                                    └──reject───▶ Failed
//! ```
//!
//! A new selection is accepted from every state except `Submitting`.

use crate::error::AnalysisError;
use crate::schema::{AnalysisRecord, AnalysisResult, Document};

pub const INVALID_FILE_MESSAGE: &str = "Please select a PDF file";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze PDF. Please try again.";
pub const SERVICES_UNAVAILABLE_MESSAGE: &str = "Failed to connect to AWS services";

#[derive(Debug, Clone)]
pub enum PageState {
    Idle { error: Option<String> },
    FileSelected { document: Document },
    Submitting { file_name: String },
    Success { record: AnalysisRecord },
    Failed { message: String },
}

impl Default for PageState {
    fn default() -> Self {
        Self::Idle { error: None }
    }
}

impl PageState {
    /// Handle a file-select event. Non-PDF uploads drop back to `Idle` with
    /// an inline error; any earlier result is cleared.
    pub fn select_file(self, document: Document) -> Self {
        match self {
            Self::Submitting { .. } => self,
            _ if !document.is_pdf() => Self::Idle {
                error: Some(INVALID_FILE_MESSAGE.to_string()),
            },
            _ => Self::FileSelected { document },
        }
    }

    /// Handle a submit event. Only a selected file can be submitted; any other
    /// state is handed back unchanged as the error.
    pub fn submit(self) -> Result<(Self, Document), Self> {
        match self {
            Self::FileSelected { document } => {
                let next = Self::Submitting {
                    file_name: document.name.clone(),
                };
                Ok((next, document))
            }
            other => Err(other),
        }
    }

    /// Outstanding request finished successfully.
    pub fn resolve(self, result: AnalysisResult) -> Self {
        match self {
            Self::Submitting { file_name } => Self::Success {
                record: AnalysisRecord::new(file_name, result),
            },
            other => other,
        }
    }

    /// Outstanding request failed. Only the generic message is kept; the
    /// caller logs the detail.
    pub fn reject(self, _error: &AnalysisError) -> Self {
        match self {
            Self::Submitting { .. } => Self::Failed {
                message: ANALYSIS_FAILED_MESSAGE.to_string(),
            },
            other => other,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Idle { error } => error.as_deref(),
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&AnalysisRecord> {
        match self {
            Self::Success { record } => Some(record),
            _ => None,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the full page for `state`. `services_down` adds the connection
/// banner raised by a failed startup probe.
pub fn render(state: &PageState, services_down: bool) -> String {
    let mut banners = String::new();
    if services_down {
        banners.push_str(&error_banner(SERVICES_UNAVAILABLE_MESSAGE));
    }
    if let Some(message) = state.error_message() {
        banners.push_str(&error_banner(message));
    }

    let busy = state.is_submitting();
    let button_label = if busy {
        "Analyzing... This may take a moment"
    } else {
        "Analyze PDF"
    };
    let disabled = if busy { " disabled" } else { "" };

    let text_pane = match state.record() {
        Some(record) => format!("<pre class=\"output\">{}</pre>", escape_html(&record.extracted_text)),
        None => "<p class=\"placeholder\">Upload and analyze a PDF to see its contents here</p>"
            .to_string(),
    };

    let analysis_pane = match (busy, state.record()) {
        (true, _) => "<p class=\"placeholder\">Analyzing document... Please wait...</p>".to_string(),
        (false, Some(record)) => format!(
            "<pre class=\"output\">{}</pre>\n<p class=\"meta\">{} &middot; Analyzed on: {}</p>",
            escape_html(&record.summary),
            escape_html(&record.file_name),
            record.completed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ),
        (false, None) => "<p class=\"placeholder\">Analysis results will appear here</p>".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PDF Analysis</title>
<style>
body {{ font-family: sans-serif; max-width: 80rem; margin: 0 auto; padding: 1rem; }}
.error {{ background: #fef2f2; border-left: 4px solid #f87171; color: #b91c1c; padding: 1rem; margin-bottom: 1rem; }}
.panes {{ display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }}
.pane {{ box-shadow: 0 1px 3px #0002; border-radius: .5rem; padding: 1.5rem; }}
.output {{ white-space: pre-wrap; background: #f9fafb; padding: 1rem; font-size: .875rem; }}
.placeholder {{ color: #6b7280; font-style: italic; }}
.meta {{ color: #6b7280; font-size: .875rem; }}
button {{ width: 100%; padding: .5rem 1rem; }}
</style>
</head>
<body>
<h2>PDF Analysis</h2>
<form id="upload" method="post" action="/" enctype="multipart/form-data">
<label for="file">Upload PDF Document</label>
<input id="file" type="file" name="file" accept=".pdf,application/pdf" required>
<button id="submit" type="submit"{disabled}>{button_label}</button>
</form>
{banners}<div class="panes">
<section class="pane">
<h3>Document Text</h3>
{text_pane}
</section>
<section class="pane">
<h3>AI Analysis</h3>
{analysis_pane}
</section>
</div>
<script>
document.getElementById("upload").addEventListener("submit", function (e) {{
  var input = document.getElementById("file");
  var file = input.files[0];
  if (!file || file.type !== "application/pdf") {{
    e.preventDefault();
    alert("{invalid}");
    return;
  }}
  var button = document.getElementById("submit");
  button.disabled = true;
  button.textContent = "Analyzing... This may take a moment";
}});
</script>
</body>
</html>
"#,
        disabled = disabled,
        button_label = button_label,
        banners = banners,
        text_pane = text_pane,
        analysis_pane = analysis_pane,
        invalid = INVALID_FILE_MESSAGE,
    )
}

fn error_banner(message: &str) -> String {
    format!("<div class=\"error\" role=\"alert\">{}</div>\n", escape_html(message))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
