use crate::error::{BotResult, Error};
use super::draft::DraftEvent;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The only raw date/time layout accepted from chat input
pub const DATE_TIME_FORMAT: &str = "%Y/%m/%d-%H:%M:%S";

/// Raw input shorter than this cannot possibly match the layout
pub const MIN_RAW_LENGTH: usize = 11;

/// Parse a raw `yyyy/MM/dd-HH:mm:ss` string as a local time in the given
/// zone. Fails with `MalformedDateTime` if the string does not match the
/// layout, names an invalid calendar date, or does not exist as a single
/// instant in the zone (DST gaps/folds).
pub fn parse_datetime(raw: &str, tz: Tz) -> BotResult<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), DATE_TIME_FORMAT)
        .map_err(|_| Error::MalformedDateTime(raw.to_string()))?;

    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        _ => Err(Error::MalformedDateTime(raw.to_string())),
    }
}

/// True iff the candidate resolves to an instant not later than now
pub fn in_past(candidate: DateTime<Tz>) -> bool {
    candidate <= Utc::now()
}

/// True iff the draft already has an end time and the candidate start is
/// not strictly before it
pub fn start_after_end(candidate_start: DateTime<Tz>, draft: &DraftEvent) -> bool {
    match draft.end_time {
        Some(end) => candidate_start >= end,
        None => false,
    }
}

/// True iff the draft already has a start time and the candidate end is
/// not strictly after it
pub fn end_before_start(candidate_end: DateTime<Tz>, draft: &DraftEvent) -> bool {
    match draft.start_time {
        Some(start) => candidate_end <= start,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn utc() -> Tz {
        "UTC".parse().unwrap()
    }

    #[test]
    fn test_parse_datetime_valid() {
        let dt = parse_datetime("2099/01/10-09:00:00", utc()).unwrap();
        assert_eq!(dt.format(DATE_TIME_FORMAT).to_string(), "2099/01/10-09:00:00");

        // Surrounding whitespace is tolerated, the layout is not relaxed
        assert!(parse_datetime(" 2099/01/10-09:00:00 ", utc()).is_ok());
    }

    #[test]
    fn test_parse_datetime_zone_aware() {
        let helsinki: Tz = "Europe/Helsinki".parse().unwrap();
        let dt = parse_datetime("2099/06/01-12:00:00", helsinki).unwrap();
        // Helsinki summer time is UTC+3
        assert_eq!(dt.with_timezone(&chrono::Utc).format("%H:%M").to_string(), "09:00");
    }

    #[test]
    fn test_parse_datetime_rejects_bad_layout() {
        assert!(parse_datetime("2099-01-10 09:00:00", utc()).is_err());
        assert!(parse_datetime("2099/01/10", utc()).is_err());
        assert!(parse_datetime("2099/01/10-09:00", utc()).is_err());
        assert!(parse_datetime("2099/01/10-09:00:00 extra", utc()).is_err());
        assert!(parse_datetime("not a date", utc()).is_err());
        assert!(parse_datetime("", utc()).is_err());
    }

    #[test]
    fn test_parse_datetime_rejects_invalid_calendar_date() {
        assert!(parse_datetime("2099/02/30-09:00:00", utc()).is_err());
        assert!(parse_datetime("2099/13/01-09:00:00", utc()).is_err());
        assert!(parse_datetime("2099/01/10-25:00:00", utc()).is_err());
    }

    #[test]
    fn test_in_past() {
        let past = parse_datetime("2001/01/01-00:00:00", utc()).unwrap();
        let future = parse_datetime("2099/01/01-00:00:00", utc()).unwrap();
        assert!(in_past(past));
        assert!(!in_past(future));
    }

    #[test]
    fn test_ordering_checks() {
        let tz = utc();
        let mut draft = DraftEvent::new(1, "calendar".to_string(), tz);

        let nine = parse_datetime("2099/01/10-09:00:00", tz).unwrap();
        let ten = parse_datetime("2099/01/10-10:00:00", tz).unwrap();

        // Nothing to compare against yet
        assert!(!start_after_end(ten, &draft));
        assert!(!end_before_start(nine, &draft));

        draft.set_end_time(ten);
        assert!(start_after_end(ten, &draft)); // equal counts as violation
        assert!(start_after_end(parse_datetime("2099/01/10-11:00:00", tz).unwrap(), &draft));
        assert!(!start_after_end(nine, &draft));

        let mut draft = DraftEvent::new(1, "calendar".to_string(), tz);
        draft.set_start_time(nine);
        assert!(end_before_start(nine, &draft)); // equal counts as violation
        assert!(end_before_start(parse_datetime("2099/01/10-08:00:00", tz).unwrap(), &draft));
        assert!(!end_before_start(ten, &draft));
    }
}
