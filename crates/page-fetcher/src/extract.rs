//! HTML flattening: document title and visible text

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Text of the first `<title>` element, entity-decoded and trimmed.
/// Empty when the document has none.
pub fn extract_title(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let Some(open) = lower.find("<title") else {
        return String::new();
    };
    let Some(gt) = lower[open..].find('>') else {
        return String::new();
    };
    let content_start = open + gt + 1;
    let Some(close) = lower[content_start..].find("</title") else {
        return String::new();
    };

    decode_entities(&html[content_start..content_start + close])
        .trim()
        .to_string()
}

/// Visible text of a document with whitespace collapsed to single spaces.
///
/// Tags and comments become word breaks; script, style, noscript and
/// template bodies are dropped entirely.
pub fn extract_text(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while pos < html.len() {
        let Some(offset) = lower[pos..].find('<') else {
            out.push_str(&html[pos..]);
            break;
        };
        let start = pos + offset;
        out.push_str(&html[pos..start]);
        out.push(' ');

        let tail = &lower[start..];
        pos = if tail.starts_with("<!--") {
            tail.find("-->").map_or(html.len(), |end| start + end + 3)
        } else if let Some(name) = SKIPPED_ELEMENTS.iter().find(|n| opens_element(tail, n)) {
            let close = format!("</{}", name);
            match tail.find(&close) {
                Some(end) => {
                    let closing = start + end;
                    lower[closing..]
                        .find('>')
                        .map_or(html.len(), |gt| closing + gt + 1)
                }
                None => html.len(),
            }
        } else {
            tail.find('>').map_or(html.len(), |end| start + end + 1)
        };
    }

    decode_entities(&out)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn opens_element(tail: &str, name: &str) -> bool {
    tail.strip_prefix('<')
        .and_then(|t| t.strip_prefix(name))
        .is_some_and(|rest| rest.starts_with(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace()))
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        let candidate = &rest[idx..];
        let decoded = candidate
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&candidate[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <TITLE>
      Market   Watch &amp; Co
    </TITLE>
    <style>body { color: red; }</style>
    <script type="text/javascript">var hidden = "<p>nope</p>";</script>
  </head>
  <body>
    <!-- banner -->
    <h1>Daily&nbsp;Summary</h1>
    <p>Index closed <b>up</b> 2&#37; at 2,100&#x21;</p>
    <noscript>Enable JS</noscript>
  </body>
</html>"#;

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title(PAGE), "Market   Watch & Co");
        assert_eq!(extract_title("<p>no title</p>"), "");
        assert_eq!(extract_title("<title>unterminated"), "");
    }

    #[test]
    fn test_extract_text_drops_hidden_content() {
        let text = extract_text(PAGE);
        assert_eq!(
            text,
            "Market Watch & Co Daily Summary Index closed up 2% at 2,100!"
        );
        assert!(!text.contains("color"));
        assert!(!text.contains("nope"));
        assert!(!text.contains("banner"));
        assert!(!text.contains("Enable JS"));
    }

    #[test]
    fn test_extract_text_plain_input() {
        assert_eq!(extract_text("  just\n\ttext  "), "just text");
        assert_eq!(extract_text(""), "");
    }

    #[test]
    fn test_script_prefix_is_not_a_script_tag() {
        assert_eq!(extract_text("<scripture>Psalm</scripture>"), "Psalm");
    }

    #[test]
    fn test_unknown_entities_are_kept() {
        assert_eq!(extract_text("A &bogus; B & C"), "A &bogus; B & C");
    }
}
