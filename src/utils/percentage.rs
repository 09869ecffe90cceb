use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    pub fn zero() -> Percentage {
        Percentage(0.)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` covered by `value`. Wholes that are not positive yield 0%.
pub fn share_percentage(value: f64, whole: f64) -> Percentage {
    if whole <= 0. || !whole.is_finite() {
        return Percentage::zero();
    }
    Percentage::new_opt(value / whole * 100.).unwrap_or_else(Percentage::zero)
}

#[cfg(test)]
mod tests {
    use super::share_percentage;

    #[test]
    fn test_share_of_working_day() {
        assert_eq!(*share_percentage(2., 8.), 25.);
        assert_eq!(share_percentage(2., 8.).to_string(), "25%");
    }

    #[test]
    fn test_share_of_empty_day_is_zero() {
        assert_eq!(*share_percentage(3., 0.), 0.);
        assert_eq!(*share_percentage(3., -1.), 0.);
    }
}
