//! Collapses citation lists by URL before display.
//!
//! The backend repeats a source once per chunk it retrieved from, so an
//! answer routinely cites the same page several times. Rendering wants each
//! page once, but inline citation markers still index into the original
//! list, hence the remapping table.

use std::collections::HashMap;

use crate::types::Source;

/// URL-unique view over a citation list. `filtered` keeps first-seen order;
/// `index_map` resolves every original index to the position of its
/// representative in `filtered`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredSources {
    pub filtered: Vec<Source>,
    pub index_map: HashMap<usize, usize>,
}

/// Total over any input, including the empty list. Never mutates its input;
/// callers recompute per message.
pub fn dedupe_sources(sources: &[Source]) -> FilteredSources {
    let mut filtered = Vec::new();
    let mut by_url: HashMap<&str, usize> = HashMap::new();
    let mut index_map = HashMap::new();

    for (i, source) in sources.iter().enumerate() {
        match by_url.get(source.url.as_str()) {
            Some(&canonical) => {
                index_map.insert(i, canonical);
            }
            None => {
                let position = filtered.len();
                by_url.insert(source.url.as_str(), position);
                index_map.insert(i, position);
                filtered.push(source.clone());
            }
        }
    }

    FilteredSources {
        filtered,
        index_map,
    }
}
