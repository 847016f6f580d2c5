//! Five-field cron expressions evaluated in a timezone.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use vermeer_error::{ScheduleError, ScheduleErrorKind, VermeerResult};

/// How far back to search for the previous occurrence, widening each time.
const LOOKBACK_WINDOWS_HOURS: [i64; 6] = [1, 24, 24 * 7, 24 * 32, 24 * 366, 24 * 366 * 4];

/// Longest run of skipped local time a zone transition can produce.
const MAX_GAP_MINUTES: i64 = 48 * 60;

/// A validated cron expression bound to a timezone.
///
/// The expression uses the standard five fields (minute, hour, day of month,
/// month, day of week, with 0 or 7 for Sunday). When both day fields are
/// restricted a day matches if either does, as in classic cron.
///
/// Occurrences are matched against local wall-clock time, so a "09:00"
/// schedule stays at 09:00 across DST changes. A local time skipped by a
/// spring-forward change fires when the gap ends; a local time repeated by a
/// fall-back change fires once, at its first occurrence.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use vermeer_scheduler::CronSchedule;
///
/// let schedule = CronSchedule::parse("0 9 * * *", "UTC").unwrap();
/// let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
///
/// let next = schedule.next_after(now).unwrap();
/// assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    timezone: Tz,
    /// Evaluated on naive local time; two entries when either day field may match.
    schedules: Vec<::cron::Schedule>,
}

impl CronSchedule {
    /// Validate and parse a five-field expression in the named timezone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCron` for anything but a well-formed five-field
    /// expression and `InvalidTimezone` for unknown zone names.
    pub fn parse(expression: &str, timezone: &str) -> VermeerResult<Self> {
        let tz = timezone.parse::<Tz>().map_err(|_| {
            ScheduleError::new(ScheduleErrorKind::InvalidTimezone(timezone.to_string()))
        })?;

        let invalid = |reason: String| {
            ScheduleError::new(ScheduleErrorKind::InvalidCron {
                expression: expression.to_string(),
                reason,
            })
        };

        let fields: Vec<&str> = expression.split_whitespace().collect();
        let [minute, hour, day_of_month, month, day_of_week] = fields[..] else {
            return Err(invalid(format!("expected 5 fields, found {}", fields.len())).into());
        };
        let day_of_week = translate_day_of_week(day_of_week).map_err(invalid)?;

        // The cron crate wants a leading seconds field.
        let build = |dom: &str, dow: &str| {
            ::cron::Schedule::from_str(&format!("0 {minute} {hour} {dom} {month} {dow}"))
                .map_err(|e| invalid(e.to_string()))
        };
        let schedules = if is_restricted(day_of_month) && is_restricted(&day_of_week) {
            vec![build(day_of_month, "*")?, build("*", &day_of_week)?]
        } else {
            vec![build(day_of_month, &day_of_week)?]
        };

        Ok(Self {
            expression: expression.to_string(),
            timezone: tz,
            schedules,
        })
    }

    /// The expression as written.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The timezone occurrences are computed in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First occurrence strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.occurrences(after).next()
    }

    /// The next `count` occurrences strictly after `after`, in order.
    pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.occurrences(after).take(count).collect()
    }

    /// Latest occurrence at or before `now`: the slot that just elapsed.
    ///
    /// Searches up to four years back and returns `None` past that.
    pub fn previous(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        LOOKBACK_WINDOWS_HOURS.iter().find_map(|hours| {
            let start = now - Duration::hours(*hours);
            self.occurrences(start).take_while(|t| *t <= now).last()
        })
    }

    /// Fire instants strictly after `after`, strictly increasing.
    fn occurrences(&self, after: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        let mut cursor = after.with_timezone(&self.timezone).naive_local();
        let mut last = after;
        std::iter::from_fn(move || {
            loop {
                let local = self.next_local(cursor)?;
                cursor = local;
                let at = self.resolve(local)?;
                // Gap times collapse onto one instant and repeated times may
                // already lie behind `after`.
                if at > last {
                    last = at;
                    return Some(at);
                }
            }
        })
    }

    /// Next matching wall-clock time strictly after `after`.
    fn next_local(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let anchor = Utc.from_utc_datetime(&after);
        self.schedules
            .iter()
            .filter_map(|schedule| schedule.after(&anchor).next())
            .min()
            .map(|t| t.naive_utc())
    }

    /// The instant a wall-clock time fires at in this zone.
    fn resolve(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        let mut candidate = local;
        for _ in 0..=MAX_GAP_MINUTES {
            if let Some(at) = self.timezone.from_local_datetime(&candidate).earliest() {
                return Some(at.with_timezone(&Utc));
            }
            candidate += Duration::minutes(1);
        }
        None
    }
}

/// Whether a day field narrows the days at all.
fn is_restricted(field: &str) -> bool {
    !(field.starts_with('*') || field == "?")
}

/// Check an expression and timezone without keeping the schedule.
///
/// Also rejects expressions that never fire again after `now`.
pub fn validate_schedule(expression: &str, timezone: &str, now: DateTime<Utc>) -> VermeerResult<()> {
    let schedule = CronSchedule::parse(expression, timezone)?;
    if schedule.next_after(now).is_none() {
        return Err(
            ScheduleError::new(ScheduleErrorKind::NoUpcomingRun(expression.to_string())).into(),
        );
    }
    Ok(())
}

/// Rewrite a standard day-of-week field (0-7, Sunday = 0 or 7) into the
/// cron crate's numbering (1-7, Sunday = 1).
fn translate_day_of_week(field: &str) -> Result<String, String> {
    let mut parts = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (part, None),
        };
        let suffix = step.map(|s| format!("/{s}")).unwrap_or_default();

        if range == "*" || range == "?" {
            parts.push(format!("{range}{suffix}"));
            continue;
        }

        match range.split_once('-') {
            Some((start, end)) => {
                let start = day_token(start)?;
                let end_is_seven = end == "7";
                let end = day_token(end)?;
                if end_is_seven && start != "1" && step.is_none() {
                    // "n-7" runs through Saturday and wraps to Sunday.
                    parts.push(format!("{start}-7"));
                    parts.push("1".to_string());
                } else if end_is_seven {
                    parts.push(format!("{start}-7{suffix}"));
                } else {
                    parts.push(format!("{start}-{end}{suffix}"));
                }
            }
            None => parts.push(format!("{}{suffix}", day_token(range)?)),
        }
    }
    Ok(parts.join(","))
}

fn day_token(token: &str) -> Result<String, String> {
    if token.chars().all(|c| c.is_ascii_digit()) && !token.is_empty() {
        let day: u32 = token
            .parse()
            .map_err(|_| format!("invalid day of week '{token}'"))?;
        if day > 7 {
            return Err(format!("day of week {day} out of range 0-7"));
        }
        Ok(((day % 7) + 1).to_string())
    } else {
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sunday_is_zero_or_seven() {
        assert_eq!(translate_day_of_week("0").unwrap(), "1");
        assert_eq!(translate_day_of_week("7").unwrap(), "1");
        assert_eq!(translate_day_of_week("1-5").unwrap(), "2-6");
        assert_eq!(translate_day_of_week("0-6").unwrap(), "1-7");
    }

    #[test]
    fn ranges_ending_on_seven_wrap_to_sunday() {
        assert_eq!(translate_day_of_week("5-7").unwrap(), "6-7,1");
        assert_eq!(translate_day_of_week("0-7").unwrap(), "1-7");
    }

    #[test]
    fn names_and_steps_pass_through() {
        assert_eq!(translate_day_of_week("MON-FRI").unwrap(), "MON-FRI");
        assert_eq!(translate_day_of_week("*/2").unwrap(), "*/2");
        assert_eq!(translate_day_of_week("1,3").unwrap(), "2,4");
    }

    #[test]
    fn out_of_range_days_are_rejected() {
        assert!(translate_day_of_week("8").is_err());
    }
}
