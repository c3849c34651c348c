//! HTML element classification for whitespace compression.

/// Void elements: never have children or a closing tag, so they are never
/// pushed onto the tag stack.
const VOID_ELEMENTS: &[&str] = &[
    "br", "img", "area", "hr", "param", "input", "embed", "col",
];

/// Elements whose descendant text is preformatted and left untouched.
const ISOLATED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "textarea", "pre",
];

/// Elements whose descendant whitespace is collapsed to a single space
/// instead of being removed.
const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "form", "ul", "ol", "li", "td", "th",
    "dl", "dt", "dd", "blockquote", "h1", "h2", "h3",
    "h4", "h5", "h6", "title",
];

const PARAGRAPH_BREAKERS: &[&str] = &[
    "div", "p", "form", "ul", "ol", "li", "table", "tr",
    "tbody", "thead", "tfoot", "td", "th", "dl", "dt", "dd",
    "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
];
const CELL_BREAKERS: &[&str] = &["td", "th", "tr", "tbody", "thead", "tfoot"];
const ROW_BREAKERS: &[&str] = &["tr", "tbody", "thead", "tfoot"];
const SECTION_BREAKERS: &[&str] = &["tbody", "thead", "tfoot"];
const DEFINITION_BREAKERS: &[&str] = &["dl", "dt", "dd"];

/// Breaking rules: `(open, openers)` means opening any of `openers` while
/// `open` is the innermost element implicitly closes `open`.
const BREAKING_RULES: &[(&str, &[&str])] = &[
    ("p", PARAGRAPH_BREAKERS),
    ("li", &["li"]),
    ("td", CELL_BREAKERS),
    ("th", CELL_BREAKERS),
    ("tr", ROW_BREAKERS),
    ("tbody", SECTION_BREAKERS),
    ("thead", SECTION_BREAKERS),
    ("tfoot", SECTION_BREAKERS),
    ("dd", DEFINITION_BREAKERS),
    ("dt", DEFINITION_BREAKERS),
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Markup declarations such as `<!DOCTYPE html>` or `<!-- ... -->`.
pub fn is_declaration(tag: &str) -> bool {
    tag.starts_with('!')
}

pub fn is_isolated_element(tag: &str) -> bool {
    ISOLATED_ELEMENTS.contains(&tag)
}

pub fn is_block_element(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

fn breaking_rule(open: &str) -> Option<&'static [&'static str]> {
    BREAKING_RULES
        .iter()
        .find(|(name, _)| *name == open)
        .map(|(_, openers)| *openers)
}

/// Elements without a breaking rule are strict: a misordered close tag
/// cannot skip over them.
pub fn has_breaking_rule(open: &str) -> bool {
    breaking_rule(open).is_some()
}

/// Whether opening `tag` implicitly closes the currently open `open`.
pub fn breaks(tag: &str, open: &str) -> bool {
    breaking_rule(open).is_some_and(|openers| openers.contains(&tag))
}

/// Whether any open element (innermost first) preserves its text verbatim.
pub fn is_isolated_ancestor<S: AsRef<str>>(stack: &[S]) -> bool {
    stack.iter().rev().any(|tag| is_isolated_element(tag.as_ref()))
}

/// Whether any open element (innermost first) is a block element.
pub fn is_block_ancestor<S: AsRef<str>>(stack: &[S]) -> bool {
    stack.iter().rev().any(|tag| is_block_element(tag.as_ref()))
}
