/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Round to two decimal places, the precision of every spooled statistic
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Map a value linearly onto the elements of `arr`
///
/// The bucket index is `round((val - vmin) / (vmax - vmin) * arr.len())`,
/// clamped into the array. Returns `None` for an empty array.
///
/// # Examples
/// ```
/// use comfy_days::utils::scale_onto_array;
///
/// let buckets: Vec<usize> = (0..20).collect();
/// assert_eq!(scale_onto_array(0.0, 365.0, 182.0, &buckets), Some(&10));
/// ```
pub fn scale_onto_array<T>(vmin: f64, vmax: f64, val: f64, arr: &[T]) -> Option<&T> {
    if arr.is_empty() {
        return None;
    }

    let last = arr.len() - 1;
    let span = vmax - vmin;
    if span <= 0.0 || !val.is_finite() {
        return arr.first();
    }

    let position = ((val - vmin) / span * arr.len() as f64).round();
    let index = if position <= 0.0 {
        0
    } else {
        (position as usize).min(last)
    };

    arr.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(365.0), 365.0);
        assert_eq!(round2(-4.256), -4.26);
    }

    #[test]
    fn test_scale_onto_array() {
        let arr: Vec<usize> = (0..20).collect();

        assert_eq!(scale_onto_array(0.0, 365.0, 1.0, &arr), Some(&0));
        assert_eq!(scale_onto_array(0.0, 365.0, 364.0, &arr), Some(&19));
        assert_eq!(scale_onto_array(0.0, 365.0, 182.0, &arr), Some(&10));
    }

    #[test]
    fn test_scale_onto_array_clamps() {
        let arr = ["cold", "mild", "hot"];

        assert_eq!(scale_onto_array(0.0, 10.0, -50.0, &arr), Some(&"cold"));
        assert_eq!(scale_onto_array(0.0, 10.0, 500.0, &arr), Some(&"hot"));
        assert_eq!(scale_onto_array(5.0, 5.0, 5.0, &arr), Some(&"cold"));

        let empty: [u8; 0] = [];
        assert_eq!(scale_onto_array(0.0, 1.0, 0.5, &empty), None);
    }
}
