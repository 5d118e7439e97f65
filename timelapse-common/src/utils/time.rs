use std::{fmt, str::FromStr, time::Duration};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Seconds,
    Minutes,
    Hours,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TimeError {
    #[error("unknown time unit '{0}', expected seconds, minutes or hours")]
    UnknownUnit(String),
    #[error("'{0}' is not a positive number")]
    NotPositive(String),
}

impl Unit {
    pub fn seconds(self) -> f64 {
        match self {
            Unit::Seconds => 1.0,
            Unit::Minutes => 60.0,
            Unit::Hours => 3600.0,
        }
    }
}

impl FromStr for Unit {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(Unit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(Unit::Minutes),
            "h" | "hour" | "hours" => Ok(Unit::Hours),
            _ => Err(TimeError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Unit::Seconds => "seconds",
            Unit::Minutes => "minutes",
            Unit::Hours => "hours",
        };
        write!(f, "{name}")
    }
}

/// A strictly positive amount of time as entered by a user, e.g. `1.5 hours`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Amount {
    value: f64,
    unit: Unit,
}

impl Amount {
    pub fn new(value: f64, unit: Unit) -> Result<Self, TimeError> {
        let fits = Duration::try_from_secs_f64(value * unit.seconds()).is_ok();
        if value.is_finite() && value > 0.0 && fits {
            Ok(Self { value, unit })
        } else {
            Err(TimeError::NotPositive(value.to_string()))
        }
    }

    pub fn parse(value: &str, unit: &str) -> Result<Self, TimeError> {
        let unit: Unit = unit.parse()?;
        let value: f64 = value
            .parse()
            .map_err(|_| TimeError::NotPositive(value.to_string()))?;
        Self::new(value, unit)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.value * self.unit.seconds()
    }

    pub fn to_duration(self) -> Duration {
        Duration::from_secs_f64(self.as_secs_f64())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// How many shots, one every `interval`, fit in `total`. Rounds down.
pub fn shot_count(total: Duration, interval: Duration) -> u64 {
    if interval.is_zero() {
        return 0;
    }
    (total.as_secs_f64() / interval.as_secs_f64()).floor() as u64
}

#[macro_export]
macro_rules! duration {
    ($hour:literal H) => {
        std::time::Duration::from_secs(3600 * $hour)
    };
    ($min:literal M) => {
        std::time::Duration::from_secs(60 * $min)
    };
    ($sec:literal S) => {
        std::time::Duration::from_secs($sec)
    };
    ($milli:literal MS) => {
        std::time::Duration::from_millis($milli)
    };
    ($time:literal $unit:ident , $($rest:tt)*) => {
        $crate::duration!($time $unit) + $crate::duration!($($rest)*)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn count_from_units() {
        let interval = Amount::parse("1", "s").unwrap().to_duration();
        let total = Amount::parse("1", "hours").unwrap().to_duration();
        assert_eq!(3600, shot_count(total, interval));

        let interval = Amount::parse("7", "min").unwrap().to_duration();
        let total = Amount::parse("1", "h").unwrap().to_duration();
        assert_eq!(8, shot_count(total, interval));
    }

    #[test]
    fn count_rounds_down_to_zero() {
        assert_eq!(0, shot_count(duration!(30 S), duration!(1 M)));
        assert_eq!(0, shot_count(duration!(30 S), Duration::ZERO));
    }

    #[test]
    fn bad_amounts() {
        assert_eq!(
            Err(TimeError::NotPositive("0".to_string())),
            Amount::parse("0", "s")
        );
        assert!(Amount::parse("-1", "s").is_err());
        assert!(Amount::parse("abc", "s").is_err());
        assert!(Amount::parse("inf", "s").is_err());
        assert_eq!(
            Err(TimeError::UnknownUnit("days".to_string())),
            Amount::parse("1", "days")
        );
    }

    #[test]
    fn macro_adds_up() {
        assert_eq!(Duration::from_secs(3661), duration!(1 H, 1 M, 1 S));
        assert_eq!(Duration::from_millis(2500), duration!(2 S, 500 MS));
    }
}
