//! Rule-based polarity scoring

use std::collections::HashMap;

/// Maps a piece of text to a polarity in `[-1, 1]`
pub trait SentimentScorer: Send + Sync {
    fn name(&self) -> &str;

    fn polarity(&self, text: &str) -> f64;
}

/// How far back a negation word reaches
const NEGATION_WINDOW: usize = 2;
/// Negated words keep half their strength with the sign flipped
const NEGATION_FACTOR: f64 = -0.5;

/// Word-list scorer in the style of pattern/TextBlob polarity: the text score
/// is the mean of matched word scores, with intensifiers and negations applied.
pub struct LexiconScorer {
    words: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let positive = [
            ("good", 0.7),
            ("great", 0.8),
            ("excellent", 1.0),
            ("best", 1.0),
            ("better", 0.5),
            ("strong", 0.43),
            ("positive", 0.23),
            ("success", 0.3),
            ("successful", 0.75),
            ("win", 0.8),
            ("wins", 0.8),
            ("gain", 0.4),
            ("gains", 0.4),
            ("growth", 0.3),
            ("profit", 0.4),
            ("profitable", 0.5),
            ("record", 0.3),
            ("rally", 0.5),
            ("rallies", 0.5),
            ("surge", 0.5),
            ("surges", 0.5),
            ("soar", 0.6),
            ("soars", 0.6),
            ("rise", 0.2),
            ("rises", 0.2),
            ("beat", 0.4),
            ("beats", 0.4),
            ("upgrade", 0.5),
            ("bullish", 0.6),
            ("optimistic", 0.5),
            ("boost", 0.4),
            ("new", 0.14),
            ("innovative", 0.5),
            ("happy", 0.8),
            ("love", 0.5),
            ("impressive", 1.0),
            ("high", 0.16),
            ("higher", 0.25),
            ("recovery", 0.3),
            ("outperform", 0.5),
        ];
        let negative = [
            ("bad", -0.7),
            ("worse", -0.4),
            ("worst", -1.0),
            ("poor", -0.4),
            ("weak", -0.38),
            ("negative", -0.3),
            ("loss", -0.4),
            ("losses", -0.4),
            ("lose", -0.5),
            ("fall", -0.3),
            ("falls", -0.3),
            ("drop", -0.3),
            ("drops", -0.3),
            ("decline", -0.4),
            ("declines", -0.4),
            ("plunge", -0.6),
            ("plunges", -0.6),
            ("crash", -0.8),
            ("slump", -0.5),
            ("miss", -0.4),
            ("misses", -0.4),
            ("downgrade", -0.5),
            ("bearish", -0.6),
            ("fear", -0.5),
            ("fears", -0.5),
            ("risk", -0.2),
            ("lawsuit", -0.4),
            ("fraud", -0.8),
            ("crisis", -0.6),
            ("warning", -0.4),
            ("concern", -0.3),
            ("concerns", -0.3),
            ("low", -0.2),
            ("lower", -0.25),
            ("cut", -0.3),
            ("cuts", -0.3),
            ("fail", -0.5),
            ("fails", -0.5),
            ("sad", -0.5),
            ("terrible", -1.0),
        ];
        let intensifiers = [
            ("very", 1.3),
            ("extremely", 1.6),
            ("highly", 1.3),
            ("really", 1.2),
            ("significantly", 1.3),
            ("sharply", 1.4),
            ("slightly", 0.6),
            ("somewhat", 0.7),
        ];
        let negations = vec![
            "not", "no", "never", "none", "nor", "cannot", "can't", "don't", "doesn't",
            "didn't", "isn't", "aren't", "wasn't", "won't", "hardly",
        ];

        Self {
            words: positive.into_iter().chain(negative).collect(),
            intensifiers: intensifiers.into_iter().collect(),
            negations,
        }
    }

    /// Lowercased tokens with surrounding punctuation stripped
    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect()
    }

    pub fn word_score(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.iter().any(|n| *n == word)
    }
}

impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> f64 {
        let tokens = Self::tokens(text);
        let mut scores = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(mut score) = self.word_score(token) else {
                continue;
            };
            if let Some(mult) = i
                .checked_sub(1)
                .and_then(|p| self.intensifiers.get(tokens[p].as_str()))
            {
                score *= mult;
            }
            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|w| self.is_negation(w)) {
                score *= NEGATION_FACTOR;
            }
            scores.push(score);
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}
