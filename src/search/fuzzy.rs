use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA};

/// Largest distance for which a DFA is built; beyond it the bounded
/// dynamic-programming distance is used
const MAX_DFA_DISTANCE: u8 = 2;

/// Automaton for fuzzy matching with Damerau-Levenshtein edit distance
pub struct FuzzyAutomaton {
    /// The target term to match
    term: String,

    /// Maximum allowed edit distance
    max_edit_distance: u8,

    /// Built DFA for matching
    dfa: Option<DFA>,
}

impl FuzzyAutomaton {
    pub fn new(term: &str, max_edit_distance: u8) -> Self {
        let dfa = if max_edit_distance <= MAX_DFA_DISTANCE {
            // Adjacent transpositions cost one edit
            let builder = LevenshteinAutomatonBuilder::new(max_edit_distance, true);
            Some(builder.build_dfa(term))
        } else {
            None
        };

        Self {
            term: term.to_string(),
            max_edit_distance,
            dfa,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn max_edit_distance(&self) -> u8 {
        self.max_edit_distance
    }

    /// Edit distance to `candidate` when it is within the bound
    pub fn distance(&self, candidate: &str) -> Option<u8> {
        match &self.dfa {
            Some(dfa) => {
                let mut state = dfa.initial_state();
                for &byte in candidate.as_bytes() {
                    state = dfa.transition(state, byte);
                }

                match dfa.distance(state) {
                    Distance::Exact(d) if d <= self.max_edit_distance => Some(d),
                    _ => None,
                }
            }
            None => bounded_edit_distance(&self.term, candidate, self.max_edit_distance as usize)
                .map(|d| d as u8),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.distance(candidate).is_some()
    }
}

/// Optimal-string-alignment distance between `a` and `b`, or None once it
/// provably exceeds `max`
pub fn bounded_edit_distance(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let d = a.len().max(b.len());
        return (d <= max).then_some(d);
    }

    let width = b.len() + 1;
    let mut before_prev: Vec<usize> = vec![0; width];
    let mut prev: Vec<usize> = (0..width).collect();
    let mut curr: Vec<usize> = vec![0; width];

    for i in 1..=a.len() {
        curr[0] = i;
        let mut row_min = curr[0];

        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };

            curr[j] = (prev[j] + 1)              // deletion
                .min(curr[j - 1] + 1)            // insertion
                .min(prev[j - 1] + cost);        // substitution

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                curr[j] = curr[j].min(before_prev[j - 2] + 1);
            }

            row_min = row_min.min(curr[j]);
        }

        // Distances never shrink row over row, so the bound is already lost
        if row_min > max {
            return None;
        }

        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    let d = prev[b.len()];
    (d <= max).then_some(d)
}
