use crate::models::TimelinePoint;

/// Mean interest per keyword over all timeline buckets, in keyword order.
/// Buckets flagged partial count like any other; a keyword with no usable
/// values yields `None`.
pub fn keyword_means(points: &[TimelinePoint], keyword_count: usize) -> Vec<Option<f64>> {
    let mut sums = vec![0.0f64; keyword_count];
    let mut counts = vec![0usize; keyword_count];
    for p in points {
        for (i, v) in p.value.iter().take(keyword_count).enumerate() {
            sums[i] += f64::from(*v);
            counts[i] += 1;
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, n)| if n > 0 { Some(sum / n as f64) } else { None })
        .collect()
}
