//! Anchor locators over raw text.
//!
//! A locator turns the current working text into a byte offset where a block
//! is spliced. Locators never mutate; they return `None` when the target no
//! longer looks like the format the recipe was written for.

/// How a step finds its insertion offset.
#[derive(Debug, Clone, Copy)]
pub enum Locator {
    /// End of the line holding the first matching anchor (alternatives tried in order).
    LineEnd(&'static [&'static str]),
    /// Start of the line holding the first matching anchor (alternatives tried in order).
    Before(&'static [&'static str]),
    /// `offset` bytes into `anchor`.
    Inside {
        anchor: &'static str,
        offset: usize,
    },
    /// End of the line holding the last `needle` that precedes `bound`.
    LastBefore {
        needle: &'static str,
        bound: &'static str,
    },
    /// End of the line that closes the call opened at `anchor`.
    AfterCall(&'static str),
}

impl Locator {
    /// Anchors this locator searches for, for diagnostics.
    pub fn anchors(&self) -> Vec<&'static str> {
        match *self {
            Locator::LineEnd(alts) | Locator::Before(alts) => alts.to_vec(),
            Locator::Inside { anchor, .. } => vec![anchor],
            Locator::LastBefore { needle, bound } => vec![needle, bound],
            Locator::AfterCall(anchor) => vec![anchor],
        }
    }

    /// Resolve the insertion offset in `text`.
    pub fn locate(&self, text: &str) -> Option<usize> {
        match *self {
            Locator::LineEnd(alts) => {
                let idx = first_match(text, alts)?;
                Some(line_end(text, idx))
            }
            Locator::Before(alts) => {
                let idx = first_match(text, alts)?;
                Some(line_start(text, idx))
            }
            Locator::Inside { anchor, offset } => {
                debug_assert!(offset <= anchor.len());
                text.find(anchor).map(|idx| idx + offset)
            }
            Locator::LastBefore { needle, bound } => {
                let end = text.find(bound)?;
                let idx = text[..end].rfind(needle)?;
                Some(line_end(text, idx))
            }
            Locator::AfterCall(anchor) => {
                let idx = text.find(anchor)?;
                let close = closing_paren(text, idx)?;
                Some(line_end(text, close))
            }
        }
    }
}

fn first_match(text: &str, alts: &[&str]) -> Option<usize> {
    alts.iter().find_map(|a| text.find(a))
}

/// Offset just past the newline ending the line that contains `idx`.
/// Falls back to the end of the text for an unterminated last line.
pub fn line_end(text: &str, idx: usize) -> usize {
    match text[idx..].find('\n') {
        Some(rel) => idx + rel + 1,
        None => text.len(),
    }
}

/// Offset of the first byte of the line that contains `idx`.
pub fn line_start(text: &str, idx: usize) -> usize {
    text[..idx].rfind('\n').map_or(0, |nl| nl + 1)
}

/// Offset of the `)` balancing the first `(` at or after `from`.
///
/// Plain depth counting: parentheses inside string literals are not special.
pub fn closing_paren(text: &str, from: usize) -> Option<usize> {
    let open = from + text[from..].find('(')?;
    let mut depth = 0usize;
    for (i, b) in text.as_bytes()[open..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Insert `block` into `text` at `at`.
pub fn splice(text: &str, at: usize, block: &str) -> String {
    let mut out = String::with_capacity(text.len() + block.len());
    out.push_str(&text[..at]);
    out.push_str(block);
    out.push_str(&text[at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_end_skips_past_newline() {
        let text = "import os\nfrom .utils import load\nx = 1\n";
        let at = Locator::LineEnd(&["from .utils import load"]).locate(text).unwrap();
        assert_eq!(&text[at..], "x = 1\n");
    }

    #[test]
    fn line_end_on_unterminated_last_line() {
        let text = "a\nmodel_cache = {}";
        let at = Locator::LineEnd(&["model_cache = {}"]).locate(text).unwrap();
        assert_eq!(at, text.len());
    }

    #[test]
    fn alternatives_are_tried_in_order() {
        let text = "model_cache: dict = {}\n";
        let loc = Locator::LineEnd(&["model_cache = {}", "model_cache: "]);
        assert_eq!(loc.locate(text), Some(text.len()));

        let text = "if __name__ == '__main__':\n@app.post(\"/unload\")\n";
        let loc = Locator::Before(&[
            "@app.get(\"/health\")",
            "@app.post(\"/unload\")",
            "if __name__",
        ]);
        assert_eq!(loc.locate(text), text.find("@app.post"));
    }

    #[test]
    fn before_keeps_anchor_indentation() {
        let text = "    def a(self):\n        pass\n\n    def handle_health_check(self):\n";
        let at = Locator::Before(&["def handle_health_check(self):"]).locate(text).unwrap();
        assert_eq!(&text[at..], "    def handle_health_check(self):\n");
    }

    #[test]
    fn last_before_picks_final_flush_in_region() {
        let text = "f()\nself.wfile.flush()\nmid\nself.wfile.flush()\nend\n\
                    def completion_usage_response\nself.wfile.flush()\n";
        let loc = Locator::LastBefore {
            needle: "self.wfile.flush()",
            bound: "def completion_usage_response",
        };
        let at = loc.locate(text).unwrap();
        assert!(text[at..].starts_with("end\n"));
    }

    #[test]
    fn last_before_needs_both_parts() {
        let loc = Locator::LastBefore {
            needle: "self.wfile.flush()",
            bound: "def completion_usage_response",
        };
        assert_eq!(loc.locate("self.wfile.flush()\n"), None);
        assert_eq!(loc.locate("def completion_usage_response\nself.wfile.flush()\n"), None);
    }

    #[test]
    fn after_call_balances_nested_parens() {
        let text = "app = FastAPI(\n    title=str(\"x\"),\n    version=v(),\n)\nmodel_cache = {}\n";
        let at = Locator::AfterCall("app = FastAPI(").locate(text).unwrap();
        assert_eq!(&text[at..], "model_cache = {}\n");
    }

    #[test]
    fn after_call_unbalanced_is_none() {
        let text = "app = FastAPI(\n    title=\"x\",\n";
        assert_eq!(Locator::AfterCall("app = FastAPI(").locate(text), None);
    }

    #[test]
    fn inside_offsets_into_anchor() {
        let text = "    self.handle_health_check()\n        else:\n";
        let loc = Locator::Inside {
            anchor: "self.handle_health_check()\n        else:",
            offset: "self.handle_health_check()\n".len(),
        };
        let at = loc.locate(text).unwrap();
        assert_eq!(&text[at..], "        else:\n");
    }

    #[test]
    fn splice_inserts_at_offset() {
        assert_eq!(splice("ac", 1, "b"), "abc");
        assert_eq!(splice("ab", 2, "c"), "abc");
    }
}
