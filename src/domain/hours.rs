use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};

use super::errors::DomainError;

/// Minutes before opening or closing that count as "soon".
pub const SOON_WINDOW_MINUTES: i64 = 120;

/// Opening schedule of a restaurant: the same hours on every working day.
///
/// A closing time at or before the opening time means the restaurant closes
/// on the following day (`18:00`-`02:00`, or `18:00`-`00:00` for midnight).
/// Equal times mean open around the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingHours {
    pub days: Vec<Weekday>,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
}

/// Where the current moment falls relative to a restaurant's schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoursStatus {
    ClosedToday {
        next_working_day: Option<Weekday>,
        opens_at: NaiveTime,
    },
    NotYetOpen {
        opens_at: NaiveTime,
    },
    OpeningSoon {
        minutes: i64,
    },
    Open,
    ClosingSoon {
        minutes: i64,
    },
    ClosedAfterHours {
        next_working_day: Option<Weekday>,
        opens_at: NaiveTime,
    },
}

impl WorkingHours {
    /// Parses day names (`"Monday"`, `"tue"`, any case) and `HH:MM` times.
    /// `24:00` is accepted as midnight.
    pub fn parse<S: AsRef<str>>(days: &[S], start: &str, end: &str) -> Result<Self, DomainError> {
        let days = days
            .iter()
            .map(|d| {
                d.as_ref()
                    .trim()
                    .parse::<Weekday>()
                    .map_err(|_| DomainError::InvalidHours(format!("unknown day '{}'", d.as_ref())))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let opens_at = parse_time(start)?;
        let closes_at = parse_time(end)?;
        Ok(Self {
            days,
            opens_at,
            closes_at,
        })
    }

    pub fn is_working_day(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// First working day strictly after `today`, looking one week ahead.
    pub fn next_working_day(&self, today: Weekday) -> Option<Weekday> {
        let mut day = today;
        for _ in 0..7 {
            day = day.succ();
            if self.is_working_day(day) {
                return Some(day);
            }
        }
        None
    }

    /// Length of one opening window.
    fn span(&self) -> Duration {
        let span = self.closes_at.signed_duration_since(self.opens_at);
        if span > Duration::zero() {
            span
        } else {
            span + Duration::days(1)
        }
    }

    pub fn classify(&self, now: NaiveDateTime) -> HoursStatus {
        let today = now.weekday();
        let opened_today = now.date().and_time(self.opens_at);

        // The window opened yesterday may still be running.
        let opened_yesterday = opened_today - Duration::days(1);
        let windows = [
            (today.pred(), opened_yesterday),
            (today, opened_today),
        ];
        for (day, start) in windows {
            let end = start + self.span();
            if self.is_working_day(day) && start <= now && now < end {
                let minutes = end.signed_duration_since(now).num_minutes();
                return if minutes <= SOON_WINDOW_MINUTES {
                    HoursStatus::ClosingSoon { minutes }
                } else {
                    HoursStatus::Open
                };
            }
        }

        if !self.is_working_day(today) {
            return HoursStatus::ClosedToday {
                next_working_day: self.next_working_day(today),
                opens_at: self.opens_at,
            };
        }

        if now < opened_today {
            let minutes = opened_today.signed_duration_since(now).num_minutes();
            if minutes <= SOON_WINDOW_MINUTES {
                HoursStatus::OpeningSoon { minutes }
            } else {
                HoursStatus::NotYetOpen {
                    opens_at: self.opens_at,
                }
            }
        } else {
            HoursStatus::ClosedAfterHours {
                next_working_day: self.next_working_day(today),
                opens_at: self.opens_at,
            }
        }
    }
}

impl HoursStatus {
    /// Only an open restaurant (possibly about to close) accepts orders.
    pub fn accepts_orders(&self) -> bool {
        matches!(self, HoursStatus::Open | HoursStatus::ClosingSoon { .. })
    }

    pub fn message(&self) -> String {
        match self {
            HoursStatus::ClosedToday {
                next_working_day,
                opens_at,
            } => format!("Closed today. {}", reopening(*next_working_day, *opens_at)),
            HoursStatus::NotYetOpen { opens_at } => {
                format!("Not open yet. Opens at {}.", opens_at.format("%H:%M"))
            }
            HoursStatus::OpeningSoon { minutes } => format!("Opening in {minutes} minutes."),
            HoursStatus::Open => "Open now.".to_string(),
            HoursStatus::ClosingSoon { minutes } => format!("Closing in {minutes} minutes."),
            HoursStatus::ClosedAfterHours {
                next_working_day,
                opens_at,
            } => format!(
                "Closed for today. {}",
                reopening(*next_working_day, *opens_at)
            ),
        }
    }
}

fn reopening(next_working_day: Option<Weekday>, opens_at: NaiveTime) -> String {
    match next_working_day {
        Some(day) => format!(
            "Opens again on {} at {}.",
            day_name(day),
            opens_at.format("%H:%M")
        ),
        None => "No upcoming working days.".to_string(),
    }
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, DomainError> {
    let raw = raw.trim();
    if raw == "24:00" || raw == "24:00:00" {
        return Ok(NaiveTime::MIN);
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| DomainError::InvalidHours(format!("'{raw}': {e}")))
}
