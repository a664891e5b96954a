use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Standard Unicode tokenizer
///
/// Words come from Unicode word segmentation and are then split again on any
/// non-alphanumeric character, so "72.1" yields "72" and "1" and "T-rex"
/// yields "t" and "rex".
#[derive(Clone)]
pub struct StandardTokenizer {
    pub lowercase: bool,
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            lowercase: true,
            max_token_length: 255,
        }
    }
}

impl StandardTokenizer {
    /// Runs longer than `max_token_length` chars are emitted as consecutive chunks
    fn push_piece(&self, piece: &str, offset: usize, position: &mut u32, tokens: &mut Vec<Token>) {
        let limit = self.max_token_length.max(1);
        let mut chunk_start = 0;
        let mut chars = 0;

        for (i, _) in piece.char_indices() {
            if chars == limit {
                self.push_chunk(&piece[chunk_start..i], offset + chunk_start, position, tokens);
                chunk_start = i;
                chars = 0;
            }
            chars += 1;
        }
        self.push_chunk(&piece[chunk_start..], offset + chunk_start, position, tokens);
    }

    fn push_chunk(&self, chunk: &str, offset: usize, position: &mut u32, tokens: &mut Vec<Token>) {
        if chunk.is_empty() {
            return;
        }

        let text = if self.lowercase {
            chunk.to_lowercase()
        } else {
            chunk.to_string()
        };

        tokens.push(Token::new(text, *position, offset));
        *position += 1;
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for (word_offset, word) in text.unicode_word_indices() {
            let mut start = None;

            for (i, ch) in word.char_indices() {
                if ch.is_alphanumeric() {
                    if start.is_none() {
                        start = Some(i);
                    }
                } else if let Some(s) = start.take() {
                    self.push_piece(&word[s..i], word_offset + s, &mut position, &mut tokens);
                }
            }

            if let Some(s) = start {
                self.push_piece(&word[s..], word_offset + s, &mut position, &mut tokens);
            }
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }
}

/// Emits the whole trimmed input as a single token
#[derive(Clone, Default)]
pub struct KeywordTokenizer;

impl Tokenizer for KeywordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let offset = text.len() - text.trim_start().len();
        vec![Token::new(trimmed.to_string(), 0, offset)]
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
