/// Trailing moving average with a window that shrinks at the start of the series.
///
/// Element `i` is the mean of `values[i + 1 - window..=i]`, clipped to the start of
/// the slice, so the output always has the same length as the input. A window of
/// zero is treated as one.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut smoothed = Vec::with_capacity(values.len());
    let mut running_sum = 0.0;

    for (index, value) in values.iter().enumerate() {
        running_sum += value;
        if index >= window {
            running_sum -= values[index - window];
        }
        let span = (index + 1).min(window);
        smoothed.push(running_sum / span as f64);
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::rolling_average;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "expected {e}, got {a}");
        }
    }

    #[test]
    fn empty_series_stays_empty() {
        assert!(rolling_average(&[], 7).is_empty());
    }

    #[test]
    fn short_series_averages_everything_seen_so_far() {
        let smoothed = rolling_average(&[2.0, 4.0, 9.0], 7);
        assert_close(&smoothed, &[2.0, 3.0, 5.0]);
    }

    #[test]
    fn full_window_trails_the_current_element() {
        let smoothed = rolling_average(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
        assert_close(&smoothed, &[1.0, 1.5, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn output_length_matches_input_for_any_window() {
        let values: Vec<f64> = (0..40).map(|i| (i % 9) as f64 * 13.5).collect();
        for window in [0, 1, 2, 7, 39, 40, 100] {
            assert_eq!(rolling_average(&values, window).len(), values.len());
        }
    }

    #[test]
    fn single_spike_is_dampened() {
        let mut values = vec![100.0; 14];
        values[10] = 800.0;

        let smoothed = rolling_average(&values, 7);

        assert_eq!(smoothed[10], 200.0);
        assert!(smoothed.iter().all(|value| *value <= 200.0));
    }
}
