//! Html report: caller-supplied header, one `<h2>` and `<table>` per
//! section, caller-supplied footer. No styling is computed here.

use super::Section;

pub const DEFAULT_HEADER: &str =
    "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body>\n";
pub const DEFAULT_FOOTER: &str = "</body>\n</html>\n";

pub fn render(sections: &[Section], header: &str, footer: &str) -> String {
    let mut output = String::from(header);

    for section in sections {
        output.push_str(&format!("<h2>{}</h2>\n", escape(section.heading)));
        output.push_str("<table>\n<thead>\n<tr>");
        for column in &section.columns {
            output.push_str(&format!("<th>{}</th>", escape(column)));
        }
        output.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in &section.rows {
            output.push_str("<tr>");
            for cell in row {
                output.push_str(&format!("<td>{}</td>", escape(cell)));
            }
            output.push_str("</tr>\n");
        }
        output.push_str("</tbody>\n</table>\n");
    }

    output.push_str(footer);
    output
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
