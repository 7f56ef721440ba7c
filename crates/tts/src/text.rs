//! Text preparation before synthesis
//!
//! Input often comes straight from an LLM, so markdown is stripped before it
//! reaches the voice, and long text is split into sentence-aligned chunks
//! that fit a single upstream call.

use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    emphasis: Regex,
    heading: Regex,
    code: Regex,
    link: Regex,
    underline: Regex,
    whitespace: Regex,
    sentence_gap: Regex,
    sentence_end: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();

    PATTERNS.get_or_init(|| Patterns {
        emphasis: Regex::new(r"\*+").expect("must be valid regex"),
        heading: Regex::new(r"#+\s*").expect("must be valid regex"),
        code: Regex::new(r"`+").expect("must be valid regex"),
        link: Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("must be valid regex"),
        underline: Regex::new(r"_{2,}").expect("must be valid regex"),
        whitespace: Regex::new(r"\s+").expect("must be valid regex"),
        sentence_gap: Regex::new(r"([.!?])\s*([A-Z])").expect("must be valid regex"),
        sentence_end: Regex::new(r"[.!?]\s+").expect("must be valid regex"),
    })
}

/// Strip markdown artifacts and normalize spacing for speech
pub fn clean_text(text: &str) -> String {
    let p = patterns();

    let text = p.emphasis.replace_all(text, "");
    let text = p.heading.replace_all(&text, "");
    let text = p.code.replace_all(&text, "");
    let text = p.link.replace_all(&text, "$1");
    let text = p.underline.replace_all(&text, "");
    let text = p.whitespace.replace_all(&text, " ");
    let text = p.sentence_gap.replace_all(&text, "$1 $2");

    text.trim().to_string()
}

/// Clean `text` and split it into chunks of at most `max_chars` characters
///
/// Chunks break between sentences where possible, then between words, and
/// only split inside a word that is itself longer than `max_chars`. Returns
/// an empty vector when nothing speakable remains after cleaning.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = clean_text(text);

    if text.is_empty() {
        return Vec::new();
    }

    if char_len(&text) <= max_chars {
        return vec![text];
    }

    let mut chunks = Chunker::new(max_chars);

    for sentence in sentences(&text) {
        if char_len(sentence) > max_chars {
            chunks.flush();
            for word in sentence.split_whitespace() {
                chunks.push_word(word);
            }
            chunks.flush();
        } else {
            chunks.push(sentence);
        }
    }

    chunks.finish()
}

/// Split on whitespace that follows sentence punctuation
fn sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for gap in patterns().sentence_end.find_iter(text) {
        // the punctuation mark is a single ASCII byte
        sentences.push(&text[start..=gap.start()]);
        start = gap.end();
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Greedy packer joining pieces with single spaces
struct Chunker {
    max_chars: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl Chunker {
    const fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    /// Append a piece known to fit in an empty chunk
    fn push(&mut self, piece: &str) {
        let piece_len = char_len(piece);
        let joined_len = if self.current.is_empty() {
            piece_len
        } else {
            self.current_len + 1 + piece_len
        };

        if joined_len > self.max_chars {
            self.flush();
        }

        if !self.current.is_empty() {
            self.current.push(' ');
            self.current_len += 1;
        }

        self.current.push_str(piece);
        self.current_len += piece_len;
    }

    /// Append a word, hard-splitting it when it cannot fit any chunk
    fn push_word(&mut self, word: &str) {
        if char_len(word) <= self.max_chars {
            self.push(word);
            return;
        }

        self.flush();

        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(self.max_chars) {
            self.chunks.push(piece.iter().collect());
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}
