use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::{DiagnosisError, Result};
use crate::report::ReportDocument;

/// Writes a laid-out report to disk in some concrete format.
pub trait DocumentRenderer: Send + Sync {
    /// File extension (without the dot) of the produced files.
    fn extension(&self) -> &str;

    fn render(&self, document: &ReportDocument, path: &Path) -> Result<()>;
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 10.0;
const TITLE_SIZE_PT: f32 = 14.0;
const BODY_SIZE_PT: f32 = 12.0;
const PT_TO_MM: f32 = 0.3528;

/// Characters in 0x80..=0x9F of WinAnsiEncoding; the rest of the code page
/// matches Latin-1.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// Whether the built-in PDF fonts can show `c`.
fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}') || WIN_ANSI_EXTRAS.contains(c)
}

/// Single-page A4 PDF using the built-in Helvetica font.
///
/// Built-in fonts only cover WinAnsiEncoding; a report with any other
/// character fails with `Render` before anything is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn extension(&self) -> &str {
        "pdf"
    }

    fn render(&self, document: &ReportDocument, path: &Path) -> Result<()> {
        let unencodable = std::iter::once(&document.title)
            .chain(&document.lines)
            .find(|line| !line.chars().all(is_win_ansi));
        if let Some(line) = unencodable {
            return Err(DiagnosisError::Render(format!(
                "built-in PDF font cannot encode {:?}",
                line
            )));
        }

        let (doc, page, layer) = PdfDocument::new(
            &document.title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Report",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DiagnosisError::Render(e.to_string()))?;
        let canvas = doc.get_page(page).get_layer(layer);

        // Helvetica averages roughly half an em per glyph; close enough to centre the title.
        let title_width =
            document.title.chars().count() as f32 * TITLE_SIZE_PT * 0.5 * PT_TO_MM;
        let title_x = ((PAGE_WIDTH_MM - title_width) / 2.0).max(MARGIN_MM);
        let mut y = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM;
        canvas.use_text(&document.title, TITLE_SIZE_PT, Mm(title_x), Mm(y), &font);

        y -= 2.0 * LINE_HEIGHT_MM;
        for line in &document.lines {
            canvas.use_text(line, BODY_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
            y -= LINE_HEIGHT_MM;
        }

        let file = File::create(path).map_err(|e| DiagnosisError::io(path, e))?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| DiagnosisError::Render(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// Plain UTF-8 text, one report line per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl DocumentRenderer for TextRenderer {
    fn extension(&self) -> &str {
        "txt"
    }

    fn render(&self, document: &ReportDocument, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| DiagnosisError::io(path, e))?;
        let mut out = BufWriter::new(file);
        let write_all = |out: &mut BufWriter<File>| -> std::io::Result<()> {
            writeln!(out, "{}", document.title)?;
            writeln!(out)?;
            for line in &document.lines {
                writeln!(out, "{}", line)?;
            }
            out.flush()
        };
        write_all(&mut out).map_err(|e| DiagnosisError::io(path, e))
    }
}
