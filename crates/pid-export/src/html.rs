//! Self-contained HTML report with the diagram inlined as sanitized SVG.

use crate::markdown;
use crate::report::{Block, CheckItem, Report};
use pid_render::{escape_xml, render_static};
use std::fmt::Write;

const STYLE: &str = "
body { font-family: Arial, Helvetica, sans-serif; color: #1e293b; max-width: 960px; margin: 2rem auto; padding: 0 1rem; line-height: 1.5; }
h1 { font-size: 1.6rem; margin-bottom: 0.25rem; }
h2 { font-size: 1.25rem; border-bottom: 2px solid #2563eb; padding-bottom: 0.25rem; margin-top: 2rem; }
dl.meta { display: grid; grid-template-columns: max-content auto; gap: 0.15rem 1rem; color: #475569; }
dl.meta dt { font-weight: bold; }
dl.meta dd { margin: 0; }
table { width: 100%; border-collapse: collapse; margin: 0.5rem 0; }
th, td { border: 1px solid #cbd5e1; padding: 0.4rem 0.6rem; text-align: left; vertical-align: top; }
th { background: #f1f5f9; font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.04em; }
ul.checklist { list-style: none; padding: 0; }
ul.checklist li { display: flex; gap: 0.6rem; margin-bottom: 0.6rem; }
.mark { flex-shrink: 0; width: 1.4rem; height: 1.4rem; border-radius: 50%; color: #fff; text-align: center; font-weight: bold; }
.mark.ok { background: #16a34a; }
.mark.fail { background: #dc2626; }
.details { color: #475569; font-size: 0.9rem; }
.diagram svg { width: 100%; height: auto; border: 1px solid #e2e8f0; }
.note { color: #64748b; font-style: italic; }
";

pub fn render(report: &Report) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let title = escape_xml(&report.title);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    let _ = writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>");
    let _ = writeln!(out, "<h1>{title}</h1>");

    out.push_str("<dl class=\"meta\">\n");
    for (label, value) in &report.meta {
        let _ = writeln!(out, "<dt>{label}</dt><dd>{}</dd>", escape_xml(value));
    }
    out.push_str("</dl>\n");

    for section in &report.sections {
        let _ = writeln!(out, "<section>\n<h2>{}</h2>", escape_xml(section.title));
        for block in &section.blocks {
            write_block(&mut out, block);
        }
        out.push_str("</section>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Markdown(md) => {
            out.push_str("<div class=\"summary\">\n");
            out.push_str(&markdown::to_html(md));
            out.push_str("</div>\n");
        }
        Block::Table { headers, rows } => {
            out.push_str("<table>\n<thead><tr>");
            for h in headers.iter() {
                let _ = write!(out, "<th>{h}</th>");
            }
            out.push_str("</tr></thead>\n<tbody>\n");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    let _ = write!(out, "<td>{}</td>", escape_xml(cell));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table>\n");
        }
        Block::Bullets(items) => {
            out.push_str("<ul>\n");
            for item in items {
                let _ = writeln!(out, "<li>{}</li>", escape_xml(item));
            }
            out.push_str("</ul>\n");
        }
        Block::Checklist(items) => {
            out.push_str("<ul class=\"checklist\">\n");
            for item in items {
                write_check(out, item);
            }
            out.push_str("</ul>\n");
        }
        Block::Diagram(scene) => {
            out.push_str("<div class=\"diagram\">\n");
            out.push_str(&render_static(scene, None));
            out.push_str("</div>\n");
        }
        Block::Note(text) => {
            let _ = writeln!(out, "<p class=\"note\">{}</p>", escape_xml(text));
        }
    }
}

fn write_check(out: &mut String, item: &CheckItem) {
    let (class, mark, label) = if item.compliant {
        ("ok", "&#10003;", "Compliant")
    } else {
        ("fail", "&#10007;", "Not compliant")
    };
    let _ = writeln!(
        out,
        "<li><span class=\"mark {class}\" title=\"{label}\">{mark}</span><div><strong>{}</strong><div class=\"details\">{}</div></div></li>",
        escape_xml(&item.item),
        escape_xml(&item.details)
    );
}
