//! Small numeric reductions used by the aggregators. All of them are single
//! linear scans so that tie-breaking stays explicit.

use crate::model::Spread;

/// min / max / mean of `values`, or `None` when there are none.
pub(crate) fn spread(values: impl IntoIterator<Item = f64>) -> Option<Spread> {
    let mut iter = values.into_iter();
    let first = iter.next()?;

    let (mut min, mut max, mut sum, mut count) = (first, first, first, 1usize);
    for v in iter {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }

    Some(Spread {
        min,
        max,
        average: sum / count as f64,
    })
}

/// Arithmetic mean, 0 for an empty input.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    spread(values).map_or(0.0, |s| s.average)
}

pub(crate) fn max(values: impl IntoIterator<Item = f64>) -> f64 {
    spread(values).map_or(0.0, |s| s.max)
}

pub(crate) fn sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// Most frequent value. On a tie the value seen first wins.
pub(crate) fn mode<T: PartialEq + Copy>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();

    for v in values {
        match counts.iter_mut().find(|(seen, _)| *seen == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, n) in counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((value, n));
        }
    }

    best.map(|(value, _)| value)
}
