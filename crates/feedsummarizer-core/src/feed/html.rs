//! Plain-text extraction from HTML fragments found in feed descriptions.
//!
//! This is a tolerant scanner rather than a full HTML parser: it only has to
//! find where markup starts and ends. Whatever it cannot recognize as markup
//! is kept as text, so the function never fails.

/// Elements whose content is raw text (no child tags, no character references)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Remove all markup from `html`, keeping text nodes in document order.
///
/// Character references are resolved (`&amp;` becomes `&`). Whitespace is
/// left exactly as it appears in the source.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = html[cursor..].find('<') {
        let open = cursor + offset;

        let Some(markup) = scan_markup(html, open) else {
            // Not markup: the '<' stays part of the pending text run
            cursor = open + 1;
            continue;
        };

        push_text(&mut out, &html[text_start..open]);
        cursor = markup.end;

        if let Some(element) = markup.raw_text_element {
            let (content_end, after) = find_raw_text_end(html, markup.end, element);
            out.push_str(&html[markup.end..content_end]);
            cursor = after;
        }

        text_start = cursor;
    }

    push_text(&mut out, &html[text_start..]);
    out
}

struct Markup {
    /// Byte offset just past the closing '>'
    end: usize,
    raw_text_element: Option<&'static str>,
}

fn push_text(out: &mut String, text: &str) {
    if !text.is_empty() {
        out.push_str(&html_escape::decode_html_entities(text));
    }
}

/// Recognize the markup construct starting at `open` (which holds a '<').
///
/// Returns `None` when the construct is not markup or never terminates.
fn scan_markup(html: &str, open: usize) -> Option<Markup> {
    let rest = &html[open..];

    if rest.starts_with("<!--") {
        let close = rest[4..].find("-->")?;
        return Some(Markup {
            end: open + 4 + close + 3,
            raw_text_element: None,
        });
    }

    if rest.starts_with("<!") || rest.starts_with("<?") {
        let close = rest.find('>')?;
        return Some(Markup {
            end: open + close + 1,
            raw_text_element: None,
        });
    }

    let (is_end_tag, name_start) = if rest.starts_with("</") { (true, 2) } else { (false, 1) };

    if !rest[name_start..].starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let name_len = rest[name_start..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
        .unwrap_or(rest.len() - name_start);
    let name = &rest[name_start..name_start + name_len];

    let close = find_tag_close(rest, name_start + name_len)?;
    let self_closing = rest[..close].ends_with('/');

    let raw_text_element = if is_end_tag || self_closing {
        None
    } else {
        RAW_TEXT_ELEMENTS
            .iter()
            .copied()
            .find(|element| element.eq_ignore_ascii_case(name))
    };

    Some(Markup {
        end: open + close + 1,
        raw_text_element,
    })
}

/// Find the '>' ending a tag, ignoring any inside quoted attribute values
fn find_tag_close(tag: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;

    for (idx, ch) in tag[from..].char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => return Some(from + idx),
            (None, _) => {}
        }
    }

    None
}

/// Locate the end of a raw text element's content.
///
/// Returns `(content_end, resume_at)`. An element that is never closed runs
/// to the end of the input.
fn find_raw_text_end(html: &str, start: usize, element: &str) -> (usize, usize) {
    let lowered = html[start..].to_ascii_lowercase();
    let closing = format!("</{}", element);

    match lowered.find(&closing) {
        Some(rel) => {
            let content_end = start + rel;
            let resume_at = html[content_end..]
                .find('>')
                .map(|gt| content_end + gt + 1)
                .unwrap_or(html.len());
            (content_end, resume_at)
        }
        None => (html.len(), html.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_resolves_entities() {
        assert_eq!(strip_tags("<p>Hello &amp; world</p>"), "Hello & world");
        assert_eq!(strip_tags("it&#39;s &#x27;quoted&#x27; &lt;b&gt;"), "it's 'quoted' <b>");
        assert_eq!(strip_tags("caf&eacute;&nbsp;au lait"), "café\u{a0}au lait");
    }

    #[test]
    fn test_concatenates_text_in_document_order() {
        let html = r#"<div class="a"><p>One</p><ul><li>Two</li><li><a href="https://x">Three</a></li></ul></div>"#;
        assert_eq!(strip_tags(html), "OneTwoThree");
    }

    #[test]
    fn test_preserves_whitespace() {
        assert_eq!(strip_tags("<p>\n  spaced   out  </p>\n"), "\n  spaced   out  \n");
        assert_eq!(strip_tags("line one<br/>line two"), "line oneline two");
    }

    #[test]
    fn test_quoted_gt_inside_attribute() {
        assert_eq!(strip_tags(r#"<a title="a > b" href='x>y'>link</a>"#), "link");
    }

    #[test]
    fn test_comments_and_declarations_dropped() {
        assert_eq!(strip_tags("<!DOCTYPE html><!-- note -->text<?xml version=\"1.0\"?>"), "text");
    }

    #[test]
    fn test_unterminated_markup_kept_as_text() {
        assert_eq!(strip_tags("<b>bold</b> and <i unfinished"), "bold and <i unfinished");
        assert_eq!(strip_tags("before <!-- never closed"), "before <!-- never closed");
        assert_eq!(strip_tags(r#"<a href="oops>text"#), r#"<a href="oops>text"#);
    }

    #[test]
    fn test_bare_angle_brackets_are_text() {
        assert_eq!(strip_tags("a < b and c > d"), "a < b and c > d");
        assert_eq!(strip_tags("1 <2"), "1 <2");
    }

    #[test]
    fn test_raw_text_elements_keep_content_verbatim() {
        assert_eq!(
            strip_tags("<p>x</p><script>if (a < b) { y(); } &amp;</script><p>z</p>"),
            "xif (a < b) { y(); } &amp;z"
        );
        assert_eq!(strip_tags("<STYLE>p { color: red }</Style>after"), "p { color: red }after");
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(strip_tags("<em>日本語</em> – ünïcode"), "日本語 – ünïcode");
    }

    #[test]
    fn test_idempotent_on_plain_text() {
        for plain in ["", "just words", "  padded\n\ttext  ", "a < b > c", "ünïcode → ok"] {
            let once = strip_tags(plain);
            assert_eq!(strip_tags(&once), once);
        }
    }
}
