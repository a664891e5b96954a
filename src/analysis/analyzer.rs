use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{KeywordTokenizer, StandardTokenizer, Tokenizer};
use crate::core::config::AnalyzerConfig;

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Normalized terms in input order; pure and deterministic
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|t| t.text).collect()
    }

    /// Unicode words split on non-alphanumerics, lower-cased, no stop words
    pub fn standard() -> Self {
        Analyzer::new("standard".to_string(),
                      Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
    }

    pub fn keyword() -> Self {
        Analyzer::new("keyword".to_string(), Box::new(KeywordTokenizer))
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let tokenizer = StandardTokenizer {
            lowercase: true,
            max_token_length: config.max_token_length,
        };
        let analyzer = Analyzer::new("standard".to_string(), Box::new(tokenizer))
            .add_filter(Box::new(LowercaseFilter));

        if config.stop_words.is_empty() {
            analyzer
        } else {
            analyzer.add_filter(Box::new(StopWordFilter::new(config.stop_words.clone())))
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_deterministic() {
        let analyzer = Analyzer::standard();
        let first = analyzer.tokenize("Biggest Dinosaur in EUROPE");
        let second = analyzer.tokenize("Biggest Dinosaur in EUROPE");
        assert_eq!(first, vec!["biggest", "dinosaur", "in", "europe"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_config_stop_words() {
        let config = AnalyzerConfig {
            stop_words: vec!["In".to_string()],
            max_token_length: 255,
        };
        let analyzer = Analyzer::from_config(&config);
        assert_eq!(analyzer.tokenize("biggest in Europe"), vec!["biggest", "europe"]);
    }

    #[test]
    fn test_keyword_analyzer() {
        assert_eq!(Analyzer::keyword().tokenize(" Europe "), vec!["Europe"]);
    }
}
