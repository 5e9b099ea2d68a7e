//! Word 2003 XML (WordprocessingML) report.
//!
//! A single flat XML file Word opens as a `.doc`. Formatting is applied
//! directly on runs so no style part is needed. The diagram travels as a
//! base64 `w:binData` picture.

use crate::markdown::{self, ParagraphStyle, Run};
use crate::report::{Block, CheckItem, Report};
use base64::Engine as _;
use pid_render::{escape_xml, rasterize};
use std::fmt::Write;

/// Usable page width in points (8.5in minus 1in margins).
const TEXT_WIDTH_PT: f64 = 468.0;
/// CSS pixels to points.
const PT_PER_PIXEL: f64 = 0.75;

const PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<?mso-application progid="Word.Document"?>
<w:wordDocument xmlns:w="http://schemas.microsoft.com/office/word/2003/wordml" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" xml:space="preserve">
<w:fonts><w:defaultFonts w:ascii="Arial" w:h-ansi="Arial" w:cs="Arial"/></w:fonts>
<w:body>
"#;

const EPILOGUE: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr>
</w:body>
</w:wordDocument>
"#;

/// Run formatting.
#[derive(Debug, Clone, Copy, Default)]
struct Fmt {
    bold: bool,
    italic: bool,
    mono: bool,
    /// Half-points; 0 keeps the default.
    size: u32,
    color: Option<&'static str>,
}

impl Fmt {
    const PLAIN: Fmt = Fmt {
        bold: false,
        italic: false,
        mono: false,
        size: 0,
        color: None,
    };

    fn bold() -> Self {
        Self {
            bold: true,
            ..Self::PLAIN
        }
    }

    fn heading(size: u32) -> Self {
        Self {
            bold: true,
            size,
            ..Self::PLAIN
        }
    }
}

pub fn render(report: &Report) -> String {
    let mut out = String::with_capacity(32 * 1024);
    out.push_str(PROLOGUE);

    paragraph(&mut out, "", &[(report.title.as_str(), Fmt::heading(36))]);
    for (label, value) in &report.meta {
        paragraph(
            &mut out,
            r#"<w:spacing w:after="0"/>"#,
            &[
                (format!("{label}: ").as_str(), Fmt::bold()),
                (value.as_str(), Fmt::PLAIN),
            ],
        );
    }

    for section in &report.sections {
        paragraph(
            &mut out,
            r#"<w:keepNext/><w:spacing w:before="360" w:after="120"/>"#,
            &[(section.title, Fmt::heading(28))],
        );
        for block in &section.blocks {
            write_block(&mut out, block, report);
        }
    }
    out.push_str(EPILOGUE);
    out
}

fn write_block(out: &mut String, block: &Block, report: &Report) {
    match block {
        Block::Markdown(md) => {
            for para in markdown::paragraphs(md) {
                let (ppr, size, prefix) = match para.style {
                    ParagraphStyle::Heading(1) => (r#"<w:keepNext/>"#, 28, None),
                    ParagraphStyle::Heading(_) => (r#"<w:keepNext/>"#, 24, None),
                    ParagraphStyle::Body => ("", 0, None),
                    ParagraphStyle::Bullet => (INDENT, 0, Some("•\t".to_string())),
                    ParagraphStyle::Numbered(n) => (INDENT, 0, Some(format!("{n}.\t"))),
                    ParagraphStyle::Code => (r#"<w:ind w:left="360"/>"#, 20, None),
                };
                let heading = matches!(para.style, ParagraphStyle::Heading(_));
                let code = para.style == ParagraphStyle::Code;
                let mut runs: Vec<(String, Fmt)> = Vec::new();
                if let Some(prefix) = prefix {
                    runs.push((prefix, Fmt::PLAIN));
                }
                runs.extend(
                    para.runs
                        .iter()
                        .map(|r| (r.text.clone(), run_fmt(r, heading || r.bold, code, size))),
                );
                let borrowed: Vec<(&str, Fmt)> =
                    runs.iter().map(|(t, f)| (t.as_str(), *f)).collect();
                paragraph(out, ppr, &borrowed);
            }
        }
        Block::Table { headers, rows } => {
            out.push_str(concat!(
                r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders>"#,
                r#"<w:top w:val="single" w:sz="4"/><w:left w:val="single" w:sz="4"/>"#,
                r#"<w:bottom w:val="single" w:sz="4"/><w:right w:val="single" w:sz="4"/>"#,
                r#"<w:insideH w:val="single" w:sz="4"/><w:insideV w:val="single" w:sz="4"/>"#,
                "</w:tblBorders></w:tblPr>\n"
            ));
            out.push_str(r#"<w:tr><w:trPr><w:tblHeader/></w:trPr>"#);
            for h in headers.iter() {
                cell(out, h, Fmt::bold(), Some("F1F5F9"));
            }
            out.push_str("</w:tr>\n");
            for row in rows {
                out.push_str("<w:tr>");
                for value in row {
                    cell(out, value, Fmt::PLAIN, None);
                }
                out.push_str("</w:tr>\n");
            }
            out.push_str("</w:tbl>\n");
            paragraph(out, "", &[]);
        }
        Block::Bullets(items) => {
            for item in items {
                paragraph(out, INDENT, &[("•\t", Fmt::PLAIN), (item.as_str(), Fmt::PLAIN)]);
            }
        }
        Block::Checklist(items) => {
            for item in items {
                write_check(out, item);
            }
        }
        Block::Diagram(scene) => match rasterize(scene, &report.raster) {
            Ok(image) => {
                let scale = f64::from(report.raster.scale);
                let mut width = f64::from(image.width) / scale * PT_PER_PIXEL;
                let mut height = f64::from(image.height) / scale * PT_PER_PIXEL;
                if width > TEXT_WIDTH_PT {
                    height *= TEXT_WIDTH_PT / width;
                    width = TEXT_WIDTH_PT;
                }
                let data = base64::engine::general_purpose::STANDARD.encode(&image.png);
                let _ = writeln!(
                    out,
                    r##"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:pict><w:binData w:name="wordml://pid-diagram.png">{data}</w:binData><v:shape id="pid-diagram" type="#_x0000_t75" style="width:{width:.1}pt;height:{height:.1}pt"><v:imagedata src="wordml://pid-diagram.png" o:title="{}"/></v:shape></w:pict></w:r></w:p>"##,
                    escape_xml(&report.title)
                );
            }
            Err(e) => {
                log::warn!("diagram left out of Word report: {e}");
                note(out, &format!("The diagram could not be embedded ({e})."));
            }
        },
        Block::Note(text) => note(out, text),
    }
}

const INDENT: &str = r#"<w:ind w:left="720" w:hanging="360"/><w:spacing w:after="60"/>"#;

fn run_fmt(run: &Run, bold: bool, code: bool, size: u32) -> Fmt {
    Fmt {
        bold,
        italic: run.italic,
        mono: run.code || code,
        size,
        color: None,
    }
}

fn write_check(out: &mut String, item: &CheckItem) {
    let (mark, color) = if item.compliant {
        ("✓", "16A34A")
    } else {
        ("✗", "DC2626")
    };
    let mark_fmt = Fmt {
        bold: true,
        color: Some(color),
        ..Fmt::PLAIN
    };
    paragraph(
        out,
        r#"<w:ind w:left="720" w:hanging="360"/><w:spacing w:after="0"/>"#,
        &[(mark, mark_fmt), ("\t", Fmt::PLAIN), (item.item.as_str(), Fmt::bold())],
    );
    let details = Fmt {
        size: 20,
        color: Some("64748B"),
        ..Fmt::PLAIN
    };
    paragraph(
        out,
        r#"<w:ind w:left="720"/><w:spacing w:after="120"/>"#,
        &[(item.details.as_str(), details)],
    );
}

fn note(out: &mut String, text: &str) {
    let fmt = Fmt {
        italic: true,
        color: Some("64748B"),
        ..Fmt::PLAIN
    };
    paragraph(out, "", &[(text, fmt)]);
}

fn cell(out: &mut String, text: &str, fmt: Fmt, shade: Option<&str>) {
    out.push_str("<w:tc>");
    if let Some(fill) = shade {
        let _ = write!(out, r#"<w:tcPr><w:shd w:val="clear" w:color="auto" w:fill="{fill}"/></w:tcPr>"#);
    }
    paragraph(out, r#"<w:spacing w:after="0"/>"#, &[(text, fmt)]);
    out.push_str("</w:tc>");
}

fn paragraph(out: &mut String, ppr: &str, runs: &[(&str, Fmt)]) {
    out.push_str("<w:p>");
    if !ppr.is_empty() {
        let _ = write!(out, "<w:pPr>{ppr}</w:pPr>");
    }
    for (text, fmt) in runs {
        run(out, text, *fmt);
    }
    out.push_str("</w:p>\n");
}

fn run(out: &mut String, text: &str, fmt: Fmt) {
    out.push_str("<w:r>");
    let has_props = fmt.bold || fmt.italic || fmt.mono || fmt.size > 0 || fmt.color.is_some();
    if has_props {
        out.push_str("<w:rPr>");
        if fmt.mono {
            out.push_str(r#"<w:rFonts w:ascii="Courier New" w:h-ansi="Courier New"/>"#);
        }
        if fmt.bold {
            out.push_str("<w:b/>");
        }
        if fmt.italic {
            out.push_str("<w:i/>");
        }
        if let Some(color) = fmt.color {
            let _ = write!(out, r#"<w:color w:val="{color}"/>"#);
        }
        if fmt.size > 0 {
            let _ = write!(out, r#"<w:sz w:val="{}"/>"#, fmt.size);
        }
        out.push_str("</w:rPr>");
    }
    // Tabs and line breaks are elements, not characters, in WordML.
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                let _ = write!(out, "<w:t>{}</w:t>", escape_xml(piece));
            }
        }
    }
    out.push_str("</w:r>");
}
