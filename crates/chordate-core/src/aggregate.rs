//! Small folds over record slices, used by the layout engines to turn
//! per-record fields into totals and flattened lists.

/// Sums `weight(item)` over the slice. Items where the accessor returns
/// `None` contribute nothing, so optional fields behave like zero weight.
pub fn sum_by<T, F>(items: &[T], weight: F) -> f64
where
    F: Fn(&T) -> Option<f64>,
{
    items.iter().filter_map(&weight).sum()
}

/// Concatenates `list(item)` slices in item order, skipping items where the
/// accessor returns `None`.
pub fn flatten_by<'a, T, U, F>(items: &'a [T], list: F) -> Vec<&'a U>
where
    F: Fn(&'a T) -> Option<&'a [U]>,
{
    let mut out = Vec::new();
    for item in items {
        if let Some(values) = list(item) {
            out.extend(values.iter());
        }
    }
    out
}

/// Maximum finite `value(item)` over the slice, or `None` when no item
/// contributes one.
pub fn max_by_value<T, F>(items: &[T], value: F) -> Option<f64>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut max: Option<f64> = None;
    for item in items {
        let Some(v) = value(item) else {
            continue;
        };
        if !v.is_finite() {
            continue;
        }
        max = Some(match max {
            Some(m) if m >= v => m,
            _ => v,
        });
    }
    max
}
