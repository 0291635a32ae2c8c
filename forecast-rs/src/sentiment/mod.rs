//! Headline sentiment and the price heuristic built on it

pub mod lexicon;
pub mod news;

pub use lexicon::*;
pub use news::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction implied by the predicted price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

/// A headline together with its polarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHeadline {
    pub headline: Headline,
    pub text: String,
    pub polarity: f64,
}

/// Keep the headlines mentioning `symbol` and score each one
pub fn score_headlines(
    headlines: Vec<Headline>,
    symbol: &str,
    scorer: &dyn SentimentScorer,
) -> Vec<ScoredHeadline> {
    headlines
        .into_iter()
        .filter(|h| h.mentions(symbol))
        .map(|headline| {
            let text = headline.text();
            let polarity = scorer.polarity(&text);
            ScoredHeadline {
                headline,
                text,
                polarity,
            }
        })
        .collect()
}

/// Last close plus the summed polarities; polarity is added as a raw price delta
pub fn predicted_price(last_close: f64, polarities: &[f64]) -> f64 {
    last_close + polarities.iter().sum::<f64>()
}

pub fn categorize(last_close: f64, predicted: f64) -> SentimentCategory {
    if predicted > last_close {
        SentimentCategory::Positive
    } else if predicted < last_close {
        SentimentCategory::Negative
    } else {
        SentimentCategory::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl SentimentScorer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn polarity(&self, _text: &str) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_positive_polarity_raises_price() {
        let predicted = predicted_price(100.0, &[0.5]);
        assert_eq!(predicted, 100.5);
        assert_eq!(categorize(100.0, predicted), SentimentCategory::Positive);
    }

    #[test]
    fn test_zero_polarity_is_neutral() {
        let predicted = predicted_price(100.0, &[]);
        assert_eq!(categorize(100.0, predicted), SentimentCategory::Neutral);
        assert_eq!(categorize(100.0, predicted_price(100.0, &[-0.2])), SentimentCategory::Negative);
        assert_eq!(SentimentCategory::Neutral.to_string(), "Neutral");
    }

    #[test]
    fn test_score_headlines_filters_mentions() {
        let headlines = vec![
            Headline::new("AAPL rallies", None),
            Headline::new("Oil slips", Some("crude down")),
            Headline::new("Tech", Some("AAPL and peers")),
        ];
        let scored = score_headlines(headlines, "AAPL", &Fixed(0.25));
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[1].text, "Tech. AAPL and peers");
        assert_eq!(scored[0].polarity, 0.25);
    }
}
