use std::{fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl FromStr for Percentage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // This means that 100%% also works, but I think I'm fine with that
        let s = s.trim_end_matches("%");
        let v = s.parse::<f64>()?;
        Percentage::new_opt(v).ok_or_else(|| anyhow!("Can't parse {s} into percentage"))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `part` seconds within `whole` seconds. A whole of zero means there is
/// nothing to take a share of, so the share is zero.
pub fn seconds_share(part: u64, whole: u64) -> Percentage {
    if whole == 0 {
        return Percentage(0.);
    }
    Percentage::new_opt(part as f64 / whole as f64 * 100.)
        .expect("Percentage should always be at least 0")
}

#[cfg(test)]
mod tests {
    use super::{seconds_share, Percentage};

    #[test]
    fn test_parse() {
        assert_eq!("15%".parse::<Percentage>().unwrap(), Percentage(15.));
        assert_eq!("2.5".parse::<Percentage>().unwrap(), Percentage(2.5));
        assert!("-3%".parse::<Percentage>().is_err());
    }

    #[test]
    fn test_seconds_share() {
        assert_eq!(*seconds_share(25, 100), 25.);
        assert_eq!(*seconds_share(0, 0), 0.);
    }
}
