//! "Did you mean ...?" suggestions for undeclared-identifier diagnostics.

const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Find the closest candidate to `name` among `candidates` by
/// Jaro-Winkler similarity, if any clears [`SIMILARITY_THRESHOLD`].
pub fn find_similar_name<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        if candidate == name {
            continue;
        }
        let score = strsim::jaro_winkler(name, candidate);
        if score >= SIMILARITY_THRESHOLD && best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((candidate, score));
        }
    }
    best.map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_misspelling() {
        let candidates = ["length", "width", "height"];
        assert_eq!(find_similar_name("legnth", candidates), Some("length"));
    }

    #[test]
    fn no_suggestion_when_nothing_close() {
        let candidates = ["alpha", "beta"];
        assert_eq!(find_similar_name("zzzzzzzzzz", candidates), None);
    }
}
