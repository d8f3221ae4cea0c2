//! Assembling extracted page text into txt, Markdown and HTML documents.
//!
//! The Markdown cleanup is a short list of deterministic passes, each a pure
//! `&str → String` function:
//!
//! 1. Normalise line endings (CRLF → LF)
//! 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 3. Trim trailing whitespace per line
//! 4. Turn PDF bullet glyphs into list markers
//! 5. Collapse 3+ consecutive blank lines down to 2
//! 6. Ensure the file ends with exactly one newline

use crate::config::PageSeparator;
use once_cell::sync::Lazy;
use regex::Regex;

/// Plain text: pages joined by the separator.
pub fn assemble_text(pages: &[String], separator: &PageSeparator) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator.render(i + 1));
        }
        out.push_str(&normalise_line_endings(page));
    }
    ensure_final_newline(&out)
}

/// Markdown: pages joined by the separator, then cleaned.
pub fn assemble_markdown(pages: &[String], separator: &PageSeparator) -> String {
    let cleaned: Vec<String> = pages.iter().map(|p| clean_page(p)).collect();
    let mut out = String::new();
    for (i, page) in cleaned.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator.render(i + 1));
        }
        out.push_str(page.trim_matches('\n'));
    }
    let out = collapse_blank_lines(&out);
    ensure_final_newline(&out)
}

fn clean_page(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    bullets_to_list_items(&s)
}

/// A standalone HTML document, one `<div class="page">` per page and one
/// `<p>` per paragraph.
pub fn assemble_html(title: &str, pages: &[String]) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out.push_str("</head>\n<body>\n");
    for (i, page) in pages.iter().enumerate() {
        out.push_str(&format!("<div class=\"page\" id=\"page-{}\">\n", i + 1));
        let text = trim_trailing_whitespace(&remove_invisible_chars(&normalise_line_endings(page)));
        for para in RE_PARAGRAPH_BREAK.split(&text) {
            let para = para.trim();
            if para.is_empty() {
                continue;
            }
            let lines: Vec<String> = para.lines().map(escape_html).collect();
            out.push_str(&format!("<p>{}</p>\n", lines.join("<br>\n")));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

pub fn escape_html(s: &str) -> String {
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

// ── Passes ───────────────────────────────────────────────────────────────────

static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

static RE_INVISIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{200B}\u{200C}\u{200D}\u{FEFF}\u{00AD}\u{2060}]").unwrap());

fn remove_invisible_chars(input: &str) -> String {
    RE_INVISIBLE.replace_all(input, "").to_string()
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[•▪◦●■‣∙][ \t]*").unwrap());

fn bullets_to_list_items(input: &str) -> String {
    RE_BULLET.replace_all(input, "$1- ").to_string()
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}
