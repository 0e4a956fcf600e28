//! Typst Renderer
//!
//! Lays out a [`ReportDocument`] as Typst markup and compiles it to PDF with
//! the `typst` command-line tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use ecopack_report::{
//!     export::{ExportContext, TypstCompiler, export_pdf},
//!     loader::load_result_set,
//! };
//! # fn example(raw: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = load_result_set(raw);
//! let result_set = outcome.result_set().ok_or("nothing to export")?;
//!
//! let artifact = export_pdf(result_set, &ExportContext::now(), &TypstCompiler::default())?;
//!
//! artifact.write_into(std::path::Path::new("exports"))?;
//! # Ok(())
//! # }
//! ```

use std::{
    fmt::Write as _,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::debug;

use crate::export::pdf::{DocumentRenderer, RenderError, ReportDocument};

/// Brand green used for the title, table header and best panel heading.
const BRAND_GREEN: &str = "rgb(40, 167, 69)";

/// Background of the best-recommendation panel.
const PANEL_FILL: &str = "rgb(230, 244, 234)";

/// Render a report document to Typst markup.
///
/// All report text is emitted as Typst string literals, so user-supplied names
/// cannot inject markup.
pub fn typst_markup(document: &ReportDocument) -> String {
    let mut output = String::new();

    output.push_str("#set page(paper: \"a4\", margin: (x: 2cm, y: 2cm))\n");
    output.push_str("#set text(size: 10pt)\n\n");

    _ = writeln!(
        output,
        "#text(size: 20pt, fill: {BRAND_GREEN}, {})\n",
        quote(&document.title)
    );

    render_section_heading(&document.product.heading, &mut output);
    render_lines(&document.product.lines, &mut output);

    render_section_heading(&document.table_heading, &mut output);
    render_table(document, &mut output);

    render_section_heading(&document.statistics.heading, &mut output);
    render_lines(&document.statistics.lines, &mut output);

    _ = writeln!(
        output,
        "#block(fill: {PANEL_FILL}, inset: 10pt, width: 100%)[\n  #text(size: 12pt, fill: {BRAND_GREEN}, {}) \\\n  #text(size: 10pt, {})\n]\n",
        quote(&document.best.heading),
        quote(&document.best.text),
    );

    output.push_str("#place(bottom + left)[\n");

    for line in &document.footer {
        _ = writeln!(output, "  #text(size: 8pt, fill: gray, {}) \\", quote(line));
    }

    output.push_str("]\n");

    output
}

fn render_section_heading(heading: &str, output: &mut String) {
    _ = writeln!(output, "#text(size: 14pt, {})\n", quote(heading));
}

fn render_lines(lines: &[String], output: &mut String) {
    for line in lines {
        _ = writeln!(output, "#{} \\", quote(line));
    }

    output.push('\n');
}

fn render_table(document: &ReportDocument, output: &mut String) {
    let columns = document.table.head.len();

    _ = writeln!(output, "#table(");
    _ = writeln!(output, "  columns: {columns},");
    _ = writeln!(
        output,
        "  fill: (_, row) => if row == 0 {{ {BRAND_GREEN} }} else if calc.even(row) {{ luma(245) }},"
    );

    let head: Vec<String> = document
        .table
        .head
        .iter()
        .map(|cell| format!("text(fill: white, weight: \"bold\", {})", quote(cell)))
        .collect();

    _ = writeln!(output, "  table.header({}),", head.join(", "));

    for row in &document.table.rows {
        let cells: Vec<String> = row.iter().map(|cell| quote(cell)).collect();

        _ = writeln!(output, "  {},", cells.join(", "));
    }

    output.push_str(")\n\n");
}

/// Quote text as a Typst string literal.
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);

    quoted.push('"');

    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }

    quoted.push('"');

    quoted
}

/// Renders reports by running `typst compile` in a scratch directory.
#[derive(Debug, Clone)]
pub struct TypstCompiler {
    binary: PathBuf,
}

impl TypstCompiler {
    /// Use the given `typst` executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the `typst` executable.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for TypstCompiler {
    fn default() -> Self {
        Self::new("typst")
    }
}

impl DocumentRenderer for TypstCompiler {
    fn name(&self) -> &str {
        "typst"
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        let workdir = tempfile::tempdir()?;
        let source = workdir.path().join("report.typ");
        let target = workdir.path().join("report.pdf");

        fs::write(&source, typst_markup(document))?;

        debug!(binary = %self.binary.display(), source = %source.display(), "compiling report");

        let output = Command::new(&self.binary)
            .arg("compile")
            .arg(&source)
            .arg(&target)
            .output()
            .map_err(|spawn_error| {
                if spawn_error.kind() == ErrorKind::NotFound {
                    RenderError::Unavailable(self.binary.display().to_string())
                } else {
                    RenderError::Io(spawn_error)
                }
            })?;

        if !output.status.success() {
            return Err(RenderError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(fs::read(&target)?)
    }
}
