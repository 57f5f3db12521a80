//! Diary sentiment: lexicon scoring per entry and the trend across entries.

mod analyzer;
mod lexicon;
mod trend;

pub use analyzer::{analyze_text, tokenize, SentimentLabel, TextSentiment};
pub use lexicon::{is_negator, valence};
pub use trend::{
    analyze_trend, module_meta, negative_streak, SentimentEntry, SentimentTrend, Trend,
};
