//! Fixed-window text chunker.
//!
//! Splits document text into [`Chunk`]s of at most `window_chars`
//! characters. Windows are measured in Unicode scalar values, so a window
//! never splits a UTF-8 code point.
//!
//! # Algorithm
//!
//! 1. Take the first `window_chars` characters as a window.
//! 2. If that window reaches the end of the text, stop.
//! 3. Otherwise advance the start by `window_chars - overlap_chars`
//!    characters and repeat.
//!
//! With `overlap_chars = 0` (the default) windows are contiguous and
//! non-overlapping, and concatenating them reproduces the input exactly.
//! With an overlap `o`, every window after the first begins with the last
//! `o` characters of its predecessor. A final window shorter than
//! `window_chars` is kept, never padded or dropped. Empty text yields no
//! chunks.
//!
//! # Example
//!
//! ```rust
//! use pocket_rag_core::chunk::Chunker;
//!
//! let chunker = Chunker::new(4, 0);
//! let windows: Vec<&str> = chunker.windows("abcdefghij").collect();
//! assert_eq!(windows, vec!["abcd", "efgh", "ij"]);
//! ```

/// A contiguous substring of a document, the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the document's chunk sequence, starting at 0.
    pub index: usize,
    pub text: String,
}

/// Splitting policy: window size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    window_chars: usize,
    overlap_chars: usize,
}

impl Chunker {
    /// Create a chunker.
    ///
    /// `window_chars` is raised to at least 1 and `overlap_chars` is capped
    /// at `window_chars - 1`, so iteration always makes progress.
    pub fn new(window_chars: usize, overlap_chars: usize) -> Self {
        let window_chars = window_chars.max(1);
        Self {
            window_chars,
            overlap_chars: overlap_chars.min(window_chars - 1),
        }
    }

    pub fn window_chars(&self) -> usize {
        self.window_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }

    /// Lazily iterate over the windows of `text`.
    ///
    /// The iterator borrows `text`. Calling this again on the same input
    /// yields the same sequence.
    pub fn windows<'a>(&self, text: &'a str) -> Windows<'a> {
        Windows {
            rest: if text.is_empty() { None } else { Some(text) },
            window_chars: self.window_chars,
            step_chars: self.window_chars - self.overlap_chars,
        }
    }

    /// Split `text` into owned chunks with contiguous indices from 0.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.windows(text)
            .enumerate()
            .map(|(index, window)| Chunk {
                index,
                text: window.to_string(),
            })
            .collect()
    }
}

impl Default for Chunker {
    /// 1000-character windows, no overlap.
    fn default() -> Self {
        Self::new(1000, 0)
    }
}

/// Iterator returned by [`Chunker::windows`].
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    rest: Option<&'a str>,
    window_chars: usize,
    step_chars: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        let end = char_offset(rest, self.window_chars);
        let window = &rest[..end];

        self.rest = if end == rest.len() {
            None
        } else {
            Some(&rest[char_offset(rest, self.step_chars)..])
        };

        Some(window)
    }
}

impl std::iter::FusedIterator for Windows<'_> {}

/// Split `text` with a one-off [`Chunker`].
pub fn chunk_text(text: &str, window_chars: usize, overlap_chars: usize) -> Vec<Chunk> {
    Chunker::new(window_chars, overlap_chars).chunk(text)
}

/// Byte offset of the `n`th character of `s`, or `s.len()` if `s` is shorter.
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 100, 0).is_empty());
        assert_eq!(Chunker::new(10, 3).windows("").count(), 0);
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("The sky is blue. The grass is green.", 1000, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "The sky is blue. The grass is green.");
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let windows: Vec<&str> = Chunker::new(3, 0).windows("abcdef").collect();
        assert_eq!(windows, vec!["abc", "def"]);
    }

    #[test]
    fn test_partial_final_window_kept() {
        let windows: Vec<&str> = Chunker::new(4, 0).windows("abcdefghij").collect();
        assert_eq!(windows, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n\n".repeat(40);
        let chunks = chunk_text(&text, 97, 0);
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, text);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 97));
    }

    #[test]
    fn test_overlap_windows() {
        let windows: Vec<&str> = Chunker::new(4, 1).windows("abcdefghij").collect();
        assert_eq!(windows, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_overlap_coverage_after_trimming_overlap() {
        let text = "0123456789abcdefghijklmnopqrstuvwxyz";
        let overlap = 3;
        let chunks = chunk_text(text, 8, overlap);
        let mut rebuilt = chunks[0].text.clone();
        for c in &chunks[1..] {
            rebuilt.extend(c.text.chars().skip(overlap));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────┐ 日本語のテキスト │ héllo wörld";
        let chunks = chunk_text(text, 5, 0);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 5));
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_chunk_indices_contiguous() {
        let text = "x".repeat(1234);
        let chunks = chunk_text(&text, 100, 10);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i, "Index mismatch at position {}", i);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha\n\nBeta\n\nGamma\n\nDelta";
        let chunker = Chunker::new(5, 2);
        let c1 = chunker.chunk(text);
        let c2 = chunker.chunk(text);
        assert_eq!(c1, c2);

        let windows = chunker.windows(text);
        let again = windows.clone();
        assert!(windows.eq(again));
    }

    #[test]
    fn test_degenerate_policy_is_clamped() {
        let chunker = Chunker::new(0, 7);
        assert_eq!(chunker.window_chars(), 1);
        assert_eq!(chunker.overlap_chars(), 0);
        assert_eq!(chunker.windows("abc").count(), 3);

        let chunker = Chunker::new(4, 10);
        assert_eq!(chunker.overlap_chars(), 3);
        assert_eq!(chunker.windows("abcdef").collect::<Vec<_>>(), vec!["abcd", "bcde", "cdef"]);
    }
}
