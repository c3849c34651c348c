use super::stack::TagStack;
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `<name` / `</name` plus trailing whitespace, or a bare `>` closing a tag
    static ref TAG_BOUNDARY: Regex = Regex::new(r"<(/?)(!?[a-zA-Z0-9_-]+)\s*|(>\s*)").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"[ \t\r\n]+").unwrap();
}

/// Output of one literal-text run, tracking whether the text written so far
/// leaves us inside a tag's attribute area.
#[derive(Default)]
struct Fragments {
    buffer: String,
    in_tag: bool,
}

impl Fragments {
    fn push(&mut self, fragment: &str) {
        if let Some(bracket) = fragment.chars().rev().find(|c| matches!(c, '<' | '>')) {
            self.in_tag = bracket == '<';
        }
        self.buffer.push_str(fragment);
    }

    /// Write text that sits between tag boundaries, compressed according to
    /// the elements currently open.
    fn write_data(&mut self, value: &str, stack: &TagStack) {
        if value.is_empty() {
            return;
        }
        if stack.is_isolated() {
            self.push(value);
            return;
        }

        let block = stack.is_block();
        if !block && !self.in_tag {
            let stripped = WHITESPACE.replace_all(value, "");
            self.push(&stripped);
        } else {
            let collapsed = WHITESPACE.replace_all(value, " ");
            if block {
                self.push(&collapsed);
            } else {
                self.push(&collapsed.replace("> ", ">"));
            }
        }
    }
}

/// Compress the whitespace of one literal-text run.
///
/// `stack` carries the open elements from the previous runs of the document
/// and is updated with every tag boundary found in `text`, which starts on
/// line `lineno` of the template.
pub fn normalize(text: &str, stack: &mut TagStack, lineno: usize) -> Result<String> {
    let mut output = Fragments {
        buffer: String::with_capacity(text.len()),
        in_tag: false,
    };
    let mut pos = 0;
    // Line of `text[counted..]`, advanced only over text not yet counted
    let mut line = lineno;
    let mut counted = 0;

    for caps in TAG_BOUNDARY.captures_iter(text) {
        let Some(boundary) = caps.get(0) else {
            continue;
        };
        output.write_data(&text[pos..boundary.start()], stack);

        if let Some(sole) = caps.get(3) {
            output.write_data(sole.as_str(), stack);
        } else {
            output.push(boundary.as_str());
            let tag = &caps[2];
            line += text[counted..boundary.start()].matches('\n').count();
            counted = boundary.start();
            if caps[1].is_empty() {
                stack.enter(tag, line)?;
            } else {
                stack.exit(tag, line)?;
            }
        }
        pos = boundary.end();
    }

    output.write_data(&text[pos..], stack);
    Ok(output.buffer)
}
