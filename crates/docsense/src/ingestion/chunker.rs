//! Text chunking with bounded length and neighbour overlap

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::Result;

/// A chunk together with its byte range in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Chunk content (`source[start..end]`)
    pub text: String,
}

/// Smallest piece the chunker never splits: a sentence, or a word of an
/// over-long sentence.
#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    chars: usize,
}

/// Text chunker with configurable size and overlap
///
/// Sizes are measured in characters. Chunks are contiguous substrings of the
/// input; consecutive chunks share at most `overlap` characters and together
/// cover the whole input.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `overlap` must be positive and smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        }
        .validate()?;

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create from the chunking section of the config
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split text into ordered chunk strings
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_spans(text)
            .into_iter()
            .map(|span| span.text)
            .collect()
    }

    /// Split text into chunks, keeping their byte ranges
    pub fn split_spans(&self, text: &str) -> Vec<ChunkSpan> {
        let units = self.split_into_units(text);
        let mut spans = Vec::new();
        let mut first = 0usize;

        while first < units.len() {
            // Greedily take units until the next one would overflow.
            // A lone unit is always taken, even if it is over-long.
            let mut last = first;
            let mut len = 0usize;
            while last < units.len() && (last == first || len + units[last].chars <= self.chunk_size) {
                len += units[last].chars;
                last += 1;
            }

            let start = units[first].start;
            let end = units[last - 1].end;
            spans.push(ChunkSpan {
                start,
                end,
                text: text[start..end].to_string(),
            });

            if last == units.len() {
                break;
            }

            first = self.next_start(&units, first, last);
        }

        spans
    }

    /// Pick the first unit of the next chunk: step back over trailing units
    /// of the current chunk while they fit in the overlap, then drop leading
    /// overlap units until the next new unit fits as well.
    fn next_start(&self, units: &[Unit], first: usize, last: usize) -> usize {
        let mut next = last;
        let mut overlap_len = 0usize;

        while next > first + 1 && overlap_len + units[next - 1].chars <= self.overlap {
            next -= 1;
            overlap_len += units[next].chars;
        }

        while next < last && overlap_len + units[last].chars > self.chunk_size {
            overlap_len -= units[next].chars;
            next += 1;
        }

        next
    }

    /// Split text into sentences, breaking over-long sentences into words
    fn split_into_units(&self, text: &str) -> Vec<Unit> {
        let mut units = Vec::new();

        for (offset, sentence) in text.split_sentence_bound_indices() {
            let chars = sentence.chars().count();
            if chars <= self.chunk_size {
                units.push(Unit {
                    start: offset,
                    end: offset + sentence.len(),
                    chars,
                });
                continue;
            }

            for (word_offset, word) in sentence.split_word_bound_indices() {
                let start = offset + word_offset;
                units.push(Unit {
                    start,
                    end: start + word.len(),
                    chars: word.chars().count(),
                });
            }
        }

        units
    }
}
