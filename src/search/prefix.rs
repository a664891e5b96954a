use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use crate::core::error::Result;

/// FST over one field's term dictionary, used to bound wildcard scans
#[derive(Debug, Default)]
pub struct PrefixIndex {
    /// Term → document frequency
    fst: Map<Vec<u8>>,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self { fst: Map::default() }
    }

    /// Build FST from terms, which must already be sorted and unique
    pub fn build<'a, I>(terms: I) -> Result<Self>
    where
        I: Iterator<Item = (&'a str, u32)>,
    {
        let mut builder = MapBuilder::memory();
        for (term, freq) in terms {
            builder.insert(term.as_bytes(), freq as u64)?;
        }

        Ok(Self { fst: builder.into_map() })
    }

    pub fn len(&self) -> usize {
        self.fst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fst.is_empty()
    }

    /// Find all terms with given prefix, in byte order
    pub fn search_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let prefix_bytes = prefix.as_bytes();

        let mut stream = self.fst.range().ge(prefix_bytes).into_stream();

        while let Some((term_bytes, _freq)) = stream.next() {
            if !term_bytes.starts_with(prefix_bytes) {
                break;
            }

            if let Ok(term) = std::str::from_utf8(term_bytes) {
                results.push(term.to_string());
            }
        }

        results
    }

    /// Every term of the field, in byte order
    pub fn all_terms(&self) -> Vec<String> {
        let mut results = Vec::with_capacity(self.fst.len());
        let mut stream = self.fst.stream();

        while let Some((term_bytes, _)) = stream.next() {
            if let Ok(term) = std::str::from_utf8(term_bytes) {
                results.push(term.to_string());
            }
        }

        results
    }

    pub fn doc_freq(&self, term: &str) -> Option<u32> {
        self.fst.get(term.as_bytes()).map(|freq| freq as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> PrefixIndex {
        let terms = vec![("stegosaurus", 1), ("triceratops", 2), ("tridens", 1), ("tyrannosaurus", 1)];
        PrefixIndex::build(terms.into_iter()).unwrap()
    }

    #[test]
    fn test_prefix_search() {
        let index = index();
        assert_eq!(index.search_prefix("tri"), vec!["triceratops", "tridens"]);
        assert!(index.search_prefix("x").is_empty());
        assert_eq!(index.search_prefix("").len(), 4);
    }

    #[test]
    fn test_all_terms_and_freq() {
        let index = index();
        assert_eq!(index.all_terms().len(), 4);
        assert_eq!(index.doc_freq("triceratops"), Some(2));
        assert_eq!(index.doc_freq("raptor"), None);
    }

    #[test]
    fn test_unsorted_input_fails() {
        let terms = vec![("b", 1), ("a", 1)];
        assert!(PrefixIndex::build(terms.into_iter()).is_err());
    }
}
