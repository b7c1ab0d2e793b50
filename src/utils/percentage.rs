use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
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
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `value` in `whole`. An empty whole is treated as 0%.
pub fn count_percentage(value: u64, whole: u64) -> Percentage {
    if whole == 0 {
        return Percentage(0.);
    }
    Percentage::new_opt(value as f64 / whole as f64 * 100.)
        .unwrap_or(Percentage(0.))
}

#[cfg(test)]
mod tests {
    use super::count_percentage;

    #[test]
    fn count_percentage_basic() {
        assert_eq!(*count_percentage(1, 4), 25.);
        assert_eq!(count_percentage(2, 3).to_string(), "66.7%");
        assert_eq!(*count_percentage(3, 0), 0.);
    }
}
