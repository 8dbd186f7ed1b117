use std::collections::HashMap;

use crate::text::tokenize;

pub(crate) const DEFAULT_MAX_TERMS: usize = 5000;

/// Build one term-weighted vector per document: term frequency scaled by
/// smoothed inverse document frequency, L2-normalized. The vocabulary is
/// the `max_terms` most frequent terms across the batch; ties break
/// alphabetically so the same batch always vectorizes the same way.
///
/// Returns `None` when the batch yields no usable vocabulary (empty batch,
/// or every document empty after stop-word removal). That is the signal
/// for the caller to take its fallback path, never an error.
pub(crate) fn vectorize(texts: &[String], max_terms: usize) -> Option<Vec<Vec<f32>>> {
    if texts.is_empty() || max_terms == 0 {
        return None;
    }

    let docs: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

    let mut totals: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        for term in doc {
            *totals.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    if totals.is_empty() {
        return None;
    }

    let mut ranked: Vec<(&str, usize)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_terms);

    let vocab: HashMap<&str, usize> = ranked
        .iter()
        .enumerate()
        .map(|(ix, (term, _))| (*term, ix))
        .collect();

    // Document frequency over the bounded vocabulary.
    let mut df = vec![0usize; vocab.len()];
    for doc in &docs {
        let mut counted = vec![false; vocab.len()];
        for term in doc {
            if let Some(&ix) = vocab.get(term.as_str()) {
                if !counted[ix] {
                    counted[ix] = true;
                    df[ix] += 1;
                }
            }
        }
    }

    // Smoothed IDF: terms in every document weigh least, never zero.
    let n = docs.len() as f32;
    let idf: Vec<f32> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
        .collect();

    let vectors = docs
        .iter()
        .map(|doc| {
            let mut v = vec![0.0f32; vocab.len()];
            for term in doc {
                if let Some(&ix) = vocab.get(term.as_str()) {
                    v[ix] += 1.0;
                }
            }
            for (ix, w) in v.iter_mut().enumerate() {
                *w *= idf[ix];
            }
            let norm = v.iter().map(|w| w * w).sum::<f32>().sqrt();
            if norm > 0.0 {
                for w in v.iter_mut() {
                    *w /= norm;
                }
            }
            v
        })
        .collect();

    Some(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_batch_is_unavailable() {
        assert!(vectorize(&[], DEFAULT_MAX_TERMS).is_none());
    }

    #[test]
    fn test_all_stop_word_batch_is_unavailable() {
        let batch = texts(&["the and of", "", "a an"]);
        assert!(vectorize(&batch, DEFAULT_MAX_TERMS).is_none());
    }

    #[test]
    fn test_vectors_are_normalized() {
        let batch = texts(&["hydrogen electrolyzer plant", "ammonia shipping terminal"]);
        let vectors = vectorize(&batch, DEFAULT_MAX_TERMS).unwrap();
        for v in &vectors {
            let norm: f32 = v.iter().map(|w| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rare_terms_outweigh_ubiquitous_ones() {
        // "hydrogen" appears in every document, "kawasaki" in one.
        let batch = texts(&[
            "hydrogen kawasaki tanker",
            "hydrogen pipeline",
            "hydrogen subsidy",
        ]);
        let vectors = vectorize(&batch, DEFAULT_MAX_TERMS).unwrap();

        // Pre-normalization weights are tf * idf with tf = 1 for each term
        // in document 0, so the relative order survives normalization.
        let doc0 = &vectors[0];
        let mut weights: Vec<f32> = doc0.iter().copied().filter(|w| *w > 0.0).collect();
        weights.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(weights.len(), 3);
        // The smallest weight belongs to the everywhere-term "hydrogen".
        let hydrogen_weight = weights[0];
        assert!(weights[1] > hydrogen_weight);
    }

    #[test]
    fn test_vocabulary_cap_drops_rare_terms_silently() {
        let batch = texts(&[
            "hydrogen hydrogen hydrogen electrolyzer",
            "hydrogen ammonia",
        ]);
        // Cap of one keeps only the most frequent term.
        let vectors = vectorize(&batch, 1).unwrap();
        assert_eq!(vectors[0].len(), 1);
        assert!(vectors[0][0] > 0.0);
        assert!(vectors[1][0] > 0.0);
    }

    #[test]
    fn test_doc_outside_vocabulary_becomes_zero_vector() {
        let batch = texts(&["hydrogen hydrogen", "unrelated topic"]);
        let vectors = vectorize(&batch, 1).unwrap();
        assert!(vectors[1].iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_identical_documents_get_identical_vectors() {
        let batch = texts(&[
            "Linde announces electrolyzer expansion",
            "Linde announces electrolyzer expansion",
        ]);
        let vectors = vectorize(&batch, DEFAULT_MAX_TERMS).unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }
}
