//! Script tag extraction from HTML pages.
//!
//! A small scanner, not an HTML parser: it finds `<script>` elements
//! outside comments, reads their attributes and inline bodies, and
//! ignores everything else.

/// One `<script>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTag {
    /// The `src` attribute.
    pub src: Option<String>,
    /// The `data-main` attribute (RequireJS entry point).
    pub data_main: Option<String>,
    /// Inline script text.
    pub body: String,
}

/// Whether a handle names a page that may load scripts.
pub fn is_page(handle: &str) -> bool {
    matches!(
        crate::store::paths::extension(handle),
        Some("html") | Some("htm")
    )
}

/// All script elements of a page, in document order.
pub fn script_tags(html: &str) -> Vec<ScriptTag> {
    let lower = html.to_ascii_lowercase();
    let mut tags = Vec::new();
    let mut pos = 0;

    while pos < html.len() {
        let Some(open) = lower[pos..].find('<').map(|i| pos + i) else {
            break;
        };

        if lower[open..].starts_with("<!--") {
            pos = match lower[open + 4..].find("-->") {
                Some(end) => open + 4 + end + 3,
                None => break,
            };
            continue;
        }

        if !is_script_open(&lower[open..]) {
            pos = open + 1;
            continue;
        }

        let attrs_start = open + "<script".len();
        let Some(tag_end) = find_tag_end(html, attrs_start) else {
            break;
        };
        let self_closing = html[..tag_end].ends_with('/');
        let attributes = parse_attributes(&html[attrs_start..tag_end]);

        let mut tag = ScriptTag::default();
        for (name, value) in attributes {
            match name.as_str() {
                "src" => tag.src = Some(value),
                "data-main" => tag.data_main = Some(value),
                _ => {}
            }
        }

        let body_start = tag_end + 1;
        if self_closing {
            pos = body_start;
        } else {
            match lower[body_start..].find("</script") {
                Some(close) => {
                    tag.body = html[body_start..body_start + close].to_string();
                    let after = body_start + close;
                    pos = lower[after..]
                        .find('>')
                        .map(|i| after + i + 1)
                        .unwrap_or(html.len());
                }
                None => {
                    tag.body = html[body_start..].to_string();
                    pos = html.len();
                }
            }
        }
        tags.push(tag);
    }

    tags
}

fn is_script_open(rest: &str) -> bool {
    rest.starts_with("<script")
        && rest["<script".len()..]
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_whitespace() || c == '>' || c == '/')
}

/// Index of the `>` closing an open tag, skipping quoted attribute values.
fn find_tag_end(html: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in html[from..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(from + i),
            None => {}
        }
    }
    None
}

fn parse_attributes(text: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut chars = text.trim_end_matches('/').chars().peekable();

    loop {
        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            chars.next();
        }
        if name.is_empty() {
            if chars.next().is_none() {
                break;
            }
            continue;
        }

        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }
        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            while chars.peek().map_or(false, |c| c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().copied() {
                Some(q) if q == '"' || q == '\'' => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == q {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }
        attributes.push((name, value));
    }

    attributes
}
