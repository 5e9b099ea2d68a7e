//! Rich Text Format report.
//!
//! Plain RTF 1.x: Arial body, bordered tables, the diagram embedded as a
//! `\pngblip` picture. Text outside 7-bit ASCII is written as `\uN?`.

use crate::markdown::{self, ParagraphStyle};
use crate::report::{Block, CheckItem, Report};
use pid_render::rasterize;
use std::fmt::Write;

/// Usable page width (8.5in minus 1in margins), in twips.
const TEXT_WIDTH_TWIPS: u32 = 9360;
/// Pixels to twips at 96 dpi.
const TWIPS_PER_PIXEL: f64 = 15.0;

const HEADER: &str = concat!(
    r"{\rtf1\ansi\ansicpg1252\deff0",
    r"{\fonttbl{\f0\fswiss Arial;}{\f1\fmodern Courier New;}}",
    r"{\colortbl;\red30\green41\blue59;\red22\green163\blue74;\red220\green38\blue38;\red100\green116\blue139;}",
    "\n",
    r"\paperw12240\paperh15840\margl1440\margr1440\margt1440\margb1440",
    r"\viewkind4\uc1\pard\sa120\f0\fs22\cf1",
    "\n",
);

pub fn render(report: &Report) -> String {
    let mut out = String::with_capacity(32 * 1024);
    out.push_str(HEADER);

    let _ = writeln!(out, r"\pard\sa60\b\fs36 {}\b0\fs22\par", escape(&report.title));
    for (label, value) in &report.meta {
        let _ = writeln!(out, r"\pard\sa0\b {label}:\b0  {}\par", escape(value));
    }

    for section in &report.sections {
        let _ = writeln!(
            out,
            r"\pard\sb360\sa120\keepn\b\fs28 {}\b0\fs22\par",
            escape(section.title)
        );
        for block in &section.blocks {
            write_block(&mut out, block, report);
        }
    }
    out.push('}');
    out
}

fn write_block(out: &mut String, block: &Block, report: &Report) {
    match block {
        Block::Markdown(md) => {
            for para in markdown::paragraphs(md) {
                let (prefix, size) = match para.style {
                    ParagraphStyle::Heading(1) => (r"\pard\sb240\sa120\keepn\b".to_string(), 28),
                    ParagraphStyle::Heading(_) => (r"\pard\sb200\sa100\keepn\b".to_string(), 24),
                    ParagraphStyle::Body => (r"\pard\sa120".to_string(), 22),
                    ParagraphStyle::Bullet => (r"\pard\fi-360\li720\sa60\bullet\tab".to_string(), 22),
                    ParagraphStyle::Numbered(n) => (format!(r"\pard\fi-360\li720\sa60 {n}.\tab"), 22),
                    ParagraphStyle::Code => (r"\pard\li360\sa120\f1".to_string(), 20),
                };
                let _ = write!(out, r"{prefix}\fs{size} ");
                for run in &para.runs {
                    out.push('{');
                    if run.bold {
                        out.push_str(r"\b");
                    }
                    if run.italic {
                        out.push_str(r"\i");
                    }
                    if run.code {
                        out.push_str(r"\f1");
                    }
                    out.push(' ');
                    out.push_str(&escape(&run.text));
                    out.push('}');
                }
                out.push_str("\\b0\\f0\\fs22\\par\n");
            }
        }
        Block::Table { headers, rows } => {
            let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
            write_row(out, &header, true);
            for row in rows {
                write_row(out, row, false);
            }
            out.push_str("\\pard\\sa120\\par\n");
        }
        Block::Bullets(items) => {
            for item in items {
                let _ = writeln!(out, r"\pard\fi-360\li720\sa60\bullet\tab {}\par", escape(item));
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
                let mut goal_w = (f64::from(image.width) / scale * TWIPS_PER_PIXEL).round();
                let mut goal_h = (f64::from(image.height) / scale * TWIPS_PER_PIXEL).round();
                if goal_w > f64::from(TEXT_WIDTH_TWIPS) {
                    goal_h *= f64::from(TEXT_WIDTH_TWIPS) / goal_w;
                    goal_w = f64::from(TEXT_WIDTH_TWIPS);
                }
                let _ = write!(
                    out,
                    "\\pard\\qc{{\\pict\\pngblip\\picw{}\\pich{}\\picwgoal{}\\pichgoal{}\n",
                    image.width, image.height, goal_w as u32, goal_h as u32
                );
                for chunk in image.png.chunks(64) {
                    for byte in chunk {
                        let _ = write!(out, "{byte:02x}");
                    }
                    out.push('\n');
                }
                out.push_str("}\\par\\ql\n");
            }
            Err(e) => {
                log::warn!("diagram left out of RTF report: {e}");
                write_note(out, &format!("The diagram could not be embedded ({e})."));
            }
        },
        Block::Note(text) => write_note(out, text),
    }
}

fn write_row(out: &mut String, cells: &[String], header: bool) {
    let columns = cells.len().max(1) as u32;
    let width = TEXT_WIDTH_TWIPS / columns;
    out.push_str(r"\trowd\trgaph108\trleft0");
    if header {
        out.push_str(r"\trhdr");
    }
    for i in 1..=columns {
        let _ = write!(
            out,
            r"\clbrdrt\brdrs\brdrw10\clbrdrl\brdrs\brdrw10\clbrdrb\brdrs\brdrw10\clbrdrr\brdrs\brdrw10\cellx{}",
            width * i
        );
    }
    out.push('\n');
    for cell in cells {
        if header {
            let _ = write!(out, r"\pard\intbl\b {}\b0\cell", escape(cell));
        } else {
            let _ = write!(out, r"\pard\intbl {}\cell", escape(cell));
        }
    }
    out.push_str("\\row\n");
}

fn write_check(out: &mut String, item: &CheckItem) {
    // U+2713 / U+2717 in green / red.
    let (color, mark) = if item.compliant {
        (2, r"\u10003?")
    } else {
        (3, r"\u10007?")
    };
    let _ = writeln!(
        out,
        r"\pard\fi-360\li720\sa0{{\cf{color}\b {mark}}}\tab\b {}\b0\par",
        escape(&item.item)
    );
    let _ = writeln!(
        out,
        r"\pard\li720\sa120{{\cf4\fs20 {}}}\par",
        escape(&item.details)
    );
}

fn write_note(out: &mut String, text: &str) {
    let _ = writeln!(out, r"\pard\sa120{{\i\cf4 {}}}\par", escape(text));
}

/// Escape text for an RTF body.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '\n' => out.push_str(r"\line "),
            '\t' => out.push_str(r"\tab "),
            '\r' => {}
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if c.is_ascii() => {}
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF control words take signed 16-bit values.
                    let _ = write!(out, r"\u{}?", *unit as i16);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters_and_unicode() {
        assert_eq!(escape(r"a{b}\c"), r"a\{b\}\\c");
        assert_eq!(escape("m³/day"), r"m\u179?/day");
        assert_eq!(escape("line\nbreak"), r"line\line break");
        // Above the BMP: a surrogate pair, high half negative.
        assert_eq!(escape("💧"), r"\u-10179?\u-9049?");
    }

    #[test]
    fn markup_characters_pass_through() {
        assert_eq!(escape("<b>&</b>"), "<b>&</b>");
    }
}
