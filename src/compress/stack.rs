use crate::error::{ErrorKind, Result, StructuralError};
use crate::html;
use tracing::debug;

/// Elements currently open while scanning a document, innermost last.
///
/// Never holds void elements or declarations. Lives for one filtering pass
/// and accumulates across every literal-text token of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStack {
    tags: Vec<String>,
}

impl TagStack {
    pub fn new() -> Self {
        Self { tags: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Open element names, outermost first
    pub fn names(&self) -> &[String] {
        &self.tags
    }

    pub fn top(&self) -> Option<&str> {
        self.tags.last().map(String::as_str)
    }

    /// Inside `<pre>`, `<script>` and friends
    pub fn is_isolated(&self) -> bool {
        html::is_isolated_ancestor(&self.tags)
    }

    pub fn is_block(&self) -> bool {
        html::is_block_ancestor(&self.tags)
    }

    /// Open `tag`, first closing every innermost element its opening breaks.
    pub fn enter(&mut self, tag: &str, lineno: usize) -> Result<()> {
        while let Some(top) = self.top() {
            if !html::breaks(tag, top) {
                break;
            }
            let top = top.to_string();
            debug!(opening = tag, closed = %top, lineno, "implicitly closing element");
            self.exit(&top, lineno)?;
        }

        if !html::is_void_element(tag) && !html::is_declaration(tag) {
            self.tags.push(tag.to_string());
        }
        Ok(())
    }

    /// Close `tag`.
    ///
    /// Fails only when nothing is open. A tag that isn't innermost closes
    /// everything opened after it, unless the search meets an element
    /// without a breaking rule first, in which case the close is ignored.
    pub fn exit(&mut self, tag: &str, lineno: usize) -> Result<()> {
        let Some(top) = self.top() else {
            return Err(StructuralError::new(
                ErrorKind::UnmatchedClose,
                format!("Tried to leave \"{}\" but something closed it already", tag),
                lineno,
            )
            .with_help(format!("Remove the extra </{}> or open the element first", tag)));
        };

        if top == tag {
            self.tags.pop();
            return Ok(());
        }

        let mut found = None;
        for (depth, open) in self.tags.iter().rev().enumerate() {
            if open == tag {
                found = Some(depth);
                break;
            }
            if !html::has_breaking_rule(open) {
                debug!(closed = tag, blocked_by = %open, lineno, "ignoring misordered close tag");
                break;
            }
        }

        if let Some(depth) = found {
            debug!(closed = tag, implicit = depth, lineno, "closing misnested element");
            self.tags.truncate(self.tags.len() - depth - 1);
        }
        Ok(())
    }
}
