//! Code fence and code span tracking.
//!
//! Directive syntax inside fenced code blocks and inline code spans is plain
//! text. The tokenizer asks these helpers which regions are opaque.

/// An open fenced code block: its marker byte and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    /// Parse an opening fence: up to three spaces of indentation, then three
    /// or more backticks or tildes. A backtick fence's info string may not
    /// contain backticks (that line is an inline code span).
    fn opening(line: &str) -> Option<Self> {
        let rest = strip_fence_indent(line)?;
        let marker = *rest.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }

        let len = marker_run(rest, marker);
        if len < 3 || (marker == b'`' && rest[len..].contains('`')) {
            return None;
        }
        Some(Self { marker, len })
    }

    /// Whether `line` closes this fence: same marker, at least as long, and
    /// nothing but whitespace after it.
    fn closed_by(self, line: &str) -> bool {
        let Some(rest) = strip_fence_indent(line) else {
            return false;
        };
        let len = marker_run(rest, self.marker);
        len >= self.len && rest[len..].trim().is_empty()
    }
}

/// `line` without its indentation, or `None` when indented four or more
/// columns (an indented code block line, never a fence).
fn strip_fence_indent(line: &str) -> Option<&str> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    (indent < 4).then(|| &line[indent..])
}

fn marker_run(s: &str, marker: u8) -> usize {
    s.bytes().take_while(|&b| b == marker).count()
}

/// Line-by-line fenced code block state.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns `true` when the line opens or closes a
    /// fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        match self.open {
            Some(fence) if fence.closed_by(line) => {
                self.open = None;
                true
            }
            Some(_) => false,
            None => {
                self.open = Fence::opening(line);
                self.open.is_some()
            }
        }
    }
}

/// Byte offset just past the inline code span starting at `start`.
///
/// `line[start..]` must begin with a backtick. A run of N backticks opens a
/// span that is closed by the next run of exactly N backticks on the same
/// line. Returns `None` when the run is never closed, in which case the
/// backticks are literal text.
pub(crate) fn code_span_end(line: &str, start: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let run = bytes[start..].iter().take_while(|&&b| b == b'`').count();
    let mut pos = start + run;

    while pos < bytes.len() {
        if bytes[pos] == b'`' {
            let len = bytes[pos..].iter().take_while(|&&b| b == b'`').count();
            if len == run {
                return Some(pos + len);
            }
            pos += len;
        } else {
            pos += 1;
        }
    }
    None
}
