/// Running sum with Neumaier compensation, so long series of small trip
/// values do not drift the way a naive `f64` fold can.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Divides `numerator` by `denominator`, returning 0.0 when the denominator
/// is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_of(values: impl IntoIterator<Item = f64>) -> f64 {
        let mut acc = CompensatedSum::new();
        for v in values {
            acc.add(v);
        }
        acc.total()
    }

    #[test]
    fn test_ratio_with_zero_denominator() {
        assert_eq!(ratio(20.0, 0.0), 0.0);
        assert_eq!(ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_ratio_normal_values() {
        assert_eq!(ratio(150.0, 15.0), 10.0);
        assert_eq!(ratio(40.0, 8.0), 5.0);
    }

    #[test]
    fn test_empty_sum_is_zero() {
        assert_eq!(CompensatedSum::new().total(), 0.0);
    }

    #[test]
    fn test_compensation_recovers_lost_low_bits() {
        // 1.0 + 1e100 + 1.0 - 1e100 is 0.0 with a naive fold.
        assert_eq!(sum_of([1.0, 1e100, 1.0, -1e100]), 2.0);
    }

    #[test]
    fn test_many_tenths_sum_exactly() {
        assert!((sum_of(std::iter::repeat_n(0.1, 10_000)) - 1000.0).abs() < 1e-9);
    }
}
