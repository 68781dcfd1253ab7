//! Cosine similarity ranking.
//!
//! `cosine_similarity` keeps the historical contract of returning `0.0` for
//! pairs that cannot be compared. That value is indistinguishable from two
//! orthogonal vectors, so ranking goes through [`compare`], which says *why*
//! a pair is not comparable, and incomparable candidates are always excluded
//! regardless of the threshold.

use thiserror::Error;
use tracing::{debug, trace, warn};

use docseek_core::{chunk_id, RetrievedChunk};

use crate::ingest::EmbeddedChunk;

/// Why a query/candidate pair has no similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Incomparable {
    #[error("empty vector")]
    Empty,
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("zero magnitude vector")]
    ZeroMagnitude,
    #[error("non-finite vector component")]
    NonFinite,
    #[error("no embedding stored")]
    MissingEmbedding,
}

/// Cosine similarity of `query` and `candidate`, or the reason there is none.
///
/// `expected` in a dimension mismatch is the query's dimension.
pub fn compare(query: &[f32], candidate: &[f32]) -> Result<f32, Incomparable> {
    if query.is_empty() || candidate.is_empty() {
        return Err(Incomparable::Empty);
    }
    if query.len() != candidate.len() {
        return Err(Incomparable::DimensionMismatch {
            expected: query.len(),
            actual: candidate.len(),
        });
    }

    let dot: f32 = query.iter().zip(candidate).map(|(a, b)| a * b).sum();
    let mag_q: f32 = query.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_c: f32 = candidate.iter().map(|x| x * x).sum::<f32>().sqrt();

    if !dot.is_finite() || !mag_q.is_finite() || !mag_c.is_finite() {
        return Err(Incomparable::NonFinite);
    }
    if mag_q == 0.0 || mag_c == 0.0 {
        return Err(Incomparable::ZeroMagnitude);
    }

    // Rounding can push identical vectors a hair past 1.0.
    Ok((dot / (mag_q * mag_c)).clamp(-1.0, 1.0))
}

/// Cosine similarity in `[-1, 1]`; `0.0` when the pair is not comparable.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    compare(a, b).unwrap_or(0.0)
}

/// An item offered to the ranker with its (possibly absent) embedding.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a, T> {
    pub item: T,
    pub embedding: Option<&'a [f32]>,
}

impl<'a, T> Candidate<'a, T> {
    pub fn new(item: T, embedding: Option<&'a [f32]>) -> Self {
        Self { item, embedding }
    }
}

/// An item that passed the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub similarity: f32,
}

/// An item that could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Excluded<T> {
    pub item: T,
    pub reason: Incomparable,
}

/// Ranking output, including what was dropped as incomparable.
#[derive(Debug, Clone)]
pub struct Ranking<T> {
    /// Descending by similarity; ties keep input order.
    pub ranked: Vec<Ranked<T>>,
    pub excluded: Vec<Excluded<T>>,
    /// Comparable candidates that scored below the threshold.
    pub below_threshold: usize,
}

/// Score, filter and sort candidates, reporting exclusions to the caller.
///
/// Candidates are consumed lazily; only survivors are retained.
pub fn rank_with_exclusions<'a, T, I>(query: &[f32], candidates: I, threshold: f32) -> Ranking<T>
where
    I: IntoIterator<Item = Candidate<'a, T>>,
{
    let mut ranked = Vec::new();
    let mut excluded = Vec::new();
    let mut below_threshold = 0;

    for candidate in candidates {
        let score = match candidate.embedding {
            Some(embedding) => compare(query, embedding),
            None => Err(Incomparable::MissingEmbedding),
        };
        match score {
            Ok(similarity) if similarity >= threshold => {
                trace!(similarity, threshold, "Candidate kept");
                ranked.push(Ranked {
                    item: candidate.item,
                    similarity,
                });
            }
            Ok(similarity) => {
                trace!(similarity, threshold, "Candidate below threshold");
                below_threshold += 1;
            }
            Err(reason) => excluded.push(Excluded {
                item: candidate.item,
                reason,
            }),
        }
    }

    // `sort_by` is stable, so equal scores keep input order.
    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    debug!(
        subsystem = "search",
        component = "ranker",
        result_count = ranked.len(),
        excluded = excluded.len(),
        below_threshold,
        threshold,
        "Ranking complete"
    );

    Ranking {
        ranked,
        excluded,
        below_threshold,
    }
}

/// Score, filter and sort candidates.
///
/// Incomparable candidates are logged at `warn` with their position in the
/// input and dropped.
pub fn rank<'a, T, I>(query: &[f32], candidates: I, threshold: f32) -> Vec<Ranked<T>>
where
    I: IntoIterator<Item = Candidate<'a, T>>,
{
    let indexed = candidates
        .into_iter()
        .enumerate()
        .map(|(position, c)| Candidate::new((position, c.item), c.embedding));

    let ranking = rank_with_exclusions(query, indexed, threshold);
    for excluded in &ranking.excluded {
        warn!(
            subsystem = "search",
            component = "ranker",
            position = excluded.item.0,
            reason = %excluded.reason,
            "Candidate excluded from ranking"
        );
    }

    ranking
        .ranked
        .into_iter()
        .map(|r| Ranked {
            item: r.item.1,
            similarity: r.similarity,
        })
        .collect()
}

/// Rank embedded chunks against a query.
pub fn rank_chunks(
    query: &[f32],
    chunks: &[EmbeddedChunk],
    threshold: f32,
    limit: Option<usize>,
) -> Vec<RetrievedChunk> {
    let candidates = chunks
        .iter()
        .map(|c| Candidate::new(c, Some(c.embedding.as_slice())));

    let ranking = rank_with_exclusions(query, candidates, threshold);
    for excluded in &ranking.excluded {
        warn!(
            subsystem = "search",
            component = "ranker",
            doc_id = %excluded.item.doc_id,
            chunk_index = excluded.item.chunk_index,
            reason = %excluded.reason,
            "Chunk excluded from ranking"
        );
    }

    ranking
        .ranked
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|r| RetrievedChunk {
            doc_id: r.item.doc_id,
            filename: r.item.filename.clone(),
            chunk_id: chunk_id(r.item.doc_id, r.item.chunk_index),
            text: r.item.chunk.text.clone(),
            similarity: r.similarity,
            start_offset: r.item.chunk.start_offset,
            end_offset: r.item.chunk.end_offset,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseek_db::Chunk;
    use uuid::Uuid;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ==========================================================================
    // cosine_similarity / compare
    // ==========================================================================

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!(approx(cosine_similarity(&a, &a), 1.0));
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        // Orthogonal is a real score, not an exclusion.
        assert_eq!(compare(&[1.0, 0.0], &[0.0, 1.0]), Ok(0.0));
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        assert!(approx(cosine_similarity(&[1.0, 2.0, 3.0], &[-1.0, -2.0, -3.0]), -1.0));
    }

    #[test]
    fn test_cosine_similarity_known_value() {
        assert!(approx(cosine_similarity(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 0.974_631_8));
    }

    #[test]
    fn test_cosine_similarity_symmetric() {
        let a = [0.3, -1.2, 4.0];
        let b = [2.0, 0.5, -0.7];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_similarity_scale_invariant() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        assert!(approx(cosine_similarity(&a, &b), 1.0));
    }

    #[test]
    fn test_cosine_similarity_sentinels() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_compare_reasons() {
        assert_eq!(compare(&[], &[1.0]), Err(Incomparable::Empty));
        assert_eq!(
            compare(&[1.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(Incomparable::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(compare(&[0.0, 0.0], &[1.0, 1.0]), Err(Incomparable::ZeroMagnitude));
        assert_eq!(compare(&[f32::NAN, 1.0], &[1.0, 1.0]), Err(Incomparable::NonFinite));
    }

    #[test]
    fn test_compare_is_bounded() {
        let a = [0.1f32; 1536];
        let sim = compare(&a, &a).unwrap();
        assert!((-1.0..=1.0).contains(&sim));
    }

    // ==========================================================================
    // rank
    // ==========================================================================

    #[test]
    fn test_rank_filters_below_threshold() {
        let query = [1.0, 2.0, 3.0];
        let same = [1.0, 2.0, 3.0];
        let opposite = [-1.0, -2.0, -3.0];
        let candidates = vec![
            Candidate::new("same", Some(&same[..])),
            Candidate::new("opposite", Some(&opposite[..])),
        ];

        let ranked = rank(&query, candidates, 0.25);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item, "same");
        assert!(approx(ranked[0].similarity, 1.0));
    }

    #[test]
    fn test_rank_sorts_descending_and_stable() {
        let query = [1.0, 0.0];
        let high = [1.0, 0.1];
        let mid = [1.0, 1.0];
        let candidates = vec![
            Candidate::new("mid-a", Some(&mid[..])),
            Candidate::new("high", Some(&high[..])),
            Candidate::new("mid-b", Some(&mid[..])),
        ];

        let names: Vec<_> = rank(&query, candidates, 0.0)
            .into_iter()
            .map(|r| r.item)
            .collect();
        assert_eq!(names, vec!["high", "mid-a", "mid-b"]);
    }

    #[test]
    fn test_rank_excludes_incomparable_even_with_permissive_threshold() {
        let query = [1.0, 0.0];
        let good = [1.0, 0.0];
        let short = [1.0];
        let zero = [0.0, 0.0];
        let candidates = vec![
            Candidate::new("missing", None),
            Candidate::new("short", Some(&short[..])),
            Candidate::new("zero", Some(&zero[..])),
            Candidate::new("good", Some(&good[..])),
        ];

        let ranking = rank_with_exclusions(&query, candidates, -1.0);
        assert_eq!(ranking.ranked.len(), 1);
        assert_eq!(ranking.ranked[0].item, "good");

        let reasons: Vec<_> = ranking.excluded.iter().map(|e| (e.item, e.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                ("missing", Incomparable::MissingEmbedding),
                (
                    "short",
                    Incomparable::DimensionMismatch {
                        expected: 2,
                        actual: 1
                    }
                ),
                ("zero", Incomparable::ZeroMagnitude),
            ]
        );
    }

    #[test]
    fn test_rank_keeps_orthogonal_at_zero_threshold() {
        let query = [1.0, 0.0];
        let orth = [0.0, 1.0];
        let ranked = rank(&query, vec![Candidate::new(1, Some(&orth[..]))], 0.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].similarity, 0.0);
    }

    #[test]
    fn test_rank_consumes_lazy_iterator() {
        let query = [1.0, 0.0];
        let vectors: Vec<[f32; 2]> = (0..100).map(|i| [1.0, i as f32 / 10.0]).collect();
        let candidates = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| Candidate::new(i, Some(&v[..])));

        let ranked = rank(&query, candidates, 0.9);
        assert_eq!(ranked[0].item, 0);
        assert!(ranked.iter().all(|r| r.similarity >= 0.9));
        assert!(ranked.len() < 100);
    }

    // ==========================================================================
    // rank_chunks
    // ==========================================================================

    fn embedded(doc_id: Uuid, index: usize, text: &str, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            doc_id,
            filename: "doc.txt".to_string(),
            chunk_index: index,
            chunk: Chunk {
                text: text.to_string(),
                start_offset: index * 100,
                end_offset: index * 100 + text.len(),
            },
            embedding,
        }
    }

    #[test]
    fn test_rank_chunks_builds_retrieved_chunks() {
        let doc_id = Uuid::now_v7();
        let chunks = vec![
            embedded(doc_id, 0, "about cats", vec![0.0, 1.0]),
            embedded(doc_id, 1, "about rust", vec![1.0, 0.0]),
            embedded(doc_id, 2, "mostly rust", vec![1.0, 0.2]),
        ];

        let results = rank_chunks(&[1.0, 0.0], &chunks, 0.25, Some(1));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk_id, format!("{}:1", doc_id));
        assert_eq!(results[0].text, "about rust");
        assert_eq!(results[0].start_offset, 100);
        assert!(approx(results[0].similarity, 1.0));
    }

    #[test]
    fn test_rank_chunks_skips_mismatched_dimensions() {
        let doc_id = Uuid::now_v7();
        let chunks = vec![embedded(doc_id, 0, "three dims", vec![1.0, 0.0, 0.0])];
        assert!(rank_chunks(&[1.0, 0.0], &chunks, 0.0, None).is_empty());
    }
}
