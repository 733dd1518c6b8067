//! Sentence segmentation for dictation lessons.
//!
//! Splitting is purely punctuation driven: `.`, `!` and `?` end a sentence and
//! stay attached to it. Abbreviations ("z.B.") and decimals ("3.5") are split
//! too; this is a known limitation of the heuristic.

/// Minimum trimmed length, in characters, of a passage that can be practiced.
pub const MIN_PASSAGE_CHARS: usize = 5;

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Returns true if `text` is long enough to start a lesson from.
#[must_use]
pub fn is_practicable(text: &str) -> bool {
    text.trim().chars().count() >= MIN_PASSAGE_CHARS
}

/// Split `text` into trimmed sentences.
///
/// A run of terminators (`?!`, `...`) stays with the sentence it ends. Text
/// after the last terminator becomes its own sentence. Pieces made only of
/// terminators are dropped. If nothing else remains, the whole trimmed text is
/// returned as a single sentence; blank input yields no sentences.
#[must_use]
pub fn segment(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if !is_terminator(ch) {
            continue;
        }
        while let Some(&next) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            current.push(next);
            chars.next();
        }
        push_piece(&mut sentences, &current);
        current.clear();
    }
    push_piece(&mut sentences, &current);

    if sentences.is_empty() {
        let whole = text.trim();
        if !whole.is_empty() {
            sentences.push(whole.to_owned());
        }
    }

    sentences
}

fn push_piece(sentences: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if piece.chars().any(|ch| !is_terminator(ch)) {
        sentences.push(piece.to_owned());
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
