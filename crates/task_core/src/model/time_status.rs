use crate::error::AppError;
use serde::Serialize;
use std::fmt;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Window within which a due date counts as due soon and a reminder as
/// upcoming. Both edges are inclusive.
pub const REMINDER_WINDOW: Duration = Duration::hours(24);

/// Rendering of an absent timestamp.
pub const MISSING_DATETIME: &str = "---";

/// Derived urgency of a task relative to "now".
///
/// Variants are declared in ascending urgency so the derived ordering gives
/// `Overdue > DueSoon > Upcoming > Normal`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeStatus {
    #[default]
    Normal,
    Upcoming,
    DueSoon,
    Overdue,
}

impl TimeStatus {
    /// Classifies a pending task. Completion is handled by the caller.
    ///
    /// A due date equal to `now` is not before it and therefore lands in
    /// `DueSoon`; only strictly past due dates are `Overdue`.
    pub fn classify(
        due_date: Option<OffsetDateTime>,
        reminder: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Self {
        let Some(due_date) = due_date else {
            return Self::Normal;
        };

        if due_date < now {
            return Self::Overdue;
        }

        if due_date - now <= REMINDER_WINDOW {
            return Self::DueSoon;
        }

        match reminder {
            Some(reminder) if reminder > now && reminder - now <= REMINDER_WINDOW => {
                Self::Upcoming
            }
            _ => Self::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Upcoming => "Upcoming",
            Self::DueSoon => "Due Soon",
            Self::Overdue => "Overdue",
        }
    }

    pub fn color_code(self) -> &'static str {
        match self {
            Self::Normal => "\x1b[0m",
            Self::Upcoming => "\x1b[0;34m",
            Self::DueSoon => "\x1b[0;33m",
            Self::Overdue => "\x1b[0;31m",
        }
    }
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fails when both timestamps are present and the reminder is strictly
/// after the due date.
pub fn validate_time_order(
    due_date: Option<OffsetDateTime>,
    reminder: Option<OffsetDateTime>,
) -> Result<(), AppError> {
    match (due_date, reminder) {
        (Some(due_date), Some(reminder)) if reminder > due_date => Err(AppError::InvalidTimeOrder),
        _ => Ok(()),
    }
}

/// Parses a user supplied date and time, interpreting it in `offset`.
///
/// Formats are tried in order and the first match wins:
/// `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM`, `YYYY/MM/DD HH:MM`,
/// `DD/MM/YYYY HH:MM`, `DD-MM-YYYY HH:MM`.
pub fn parse_datetime(input: &str, offset: UtcOffset) -> Result<OffsetDateTime, AppError> {
    let trimmed = input.trim();
    let formats = [
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]/[month]/[day] [hour]:[minute]"),
        format_description!("[day]/[month]/[year] [hour]:[minute]"),
        format_description!("[day]-[month]-[year] [hour]:[minute]"),
    ];

    let mut first_error = None;
    for format in formats {
        match PrimitiveDateTime::parse(trimmed, format) {
            Ok(parsed) => return Ok(parsed.assume_offset(offset)),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }

    let detail = first_error
        .map(|err| format!("{trimmed:?}: {err}"))
        .unwrap_or_else(|| format!("{trimmed:?}"));
    Err(AppError::InvalidDateFormat(detail))
}

/// `YYYY-MM-DD HH:MM`, or `---` when absent.
pub fn format_datetime(value: Option<OffsetDateTime>) -> String {
    let Some(value) = value else {
        return MISSING_DATETIME.to_string();
    };
    value
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| MISSING_DATETIME.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        MISSING_DATETIME, REMINDER_WINDOW, TimeStatus, format_datetime, parse_datetime,
        validate_time_order,
    };
    use rstest::rstest;
    use time::macros::{datetime, offset};
    use time::{Duration, OffsetDateTime, UtcOffset};

    const NOW: OffsetDateTime = datetime!(2025-06-10 12:00 UTC);

    #[test]
    fn no_due_date_is_normal_even_with_near_reminder() {
        let reminder = Some(NOW + Duration::hours(1));
        assert_eq!(TimeStatus::classify(None, reminder, NOW), TimeStatus::Normal);
    }

    #[rstest]
    #[case::past(-Duration::hours(1), TimeStatus::Overdue)]
    #[case::one_second_ago(-Duration::seconds(1), TimeStatus::Overdue)]
    #[case::exactly_now(Duration::ZERO, TimeStatus::DueSoon)]
    #[case::within_window(Duration::hours(3), TimeStatus::DueSoon)]
    #[case::window_edge(REMINDER_WINDOW, TimeStatus::DueSoon)]
    #[case::just_past_window(REMINDER_WINDOW + Duration::seconds(1), TimeStatus::Normal)]
    #[case::far_future(Duration::days(10), TimeStatus::Normal)]
    fn due_date_boundaries(#[case] offset_from_now: Duration, #[case] expected: TimeStatus) {
        let due = Some(NOW + offset_from_now);
        assert_eq!(TimeStatus::classify(due, None, NOW), expected);
    }

    #[test]
    fn near_reminder_with_distant_due_date_is_upcoming() {
        let due = Some(NOW + Duration::days(3));
        let reminder = Some(NOW + Duration::hours(2));
        assert_eq!(TimeStatus::classify(due, reminder, NOW), TimeStatus::Upcoming);
    }

    #[test]
    fn reminder_at_window_edge_is_upcoming() {
        let due = Some(NOW + Duration::days(3));
        let reminder = Some(NOW + REMINDER_WINDOW);
        assert_eq!(TimeStatus::classify(due, reminder, NOW), TimeStatus::Upcoming);
    }

    #[test]
    fn past_or_distant_reminder_is_not_upcoming() {
        let due = Some(NOW + Duration::days(3));
        let past = Some(NOW - Duration::minutes(5));
        let exactly_now = Some(NOW);
        let distant = Some(NOW + Duration::days(2));

        assert_eq!(TimeStatus::classify(due, past, NOW), TimeStatus::Normal);
        assert_eq!(TimeStatus::classify(due, exactly_now, NOW), TimeStatus::Normal);
        assert_eq!(TimeStatus::classify(due, distant, NOW), TimeStatus::Normal);
    }

    #[test]
    fn due_soon_wins_over_upcoming_reminder() {
        let due = Some(NOW + Duration::hours(5));
        let reminder = Some(NOW + Duration::hours(1));
        assert_eq!(TimeStatus::classify(due, reminder, NOW), TimeStatus::DueSoon);
    }

    #[test]
    fn urgency_ordering() {
        assert!(TimeStatus::Overdue > TimeStatus::DueSoon);
        assert!(TimeStatus::DueSoon > TimeStatus::Upcoming);
        assert!(TimeStatus::Upcoming > TimeStatus::Normal);
    }

    #[test]
    fn validate_time_order_rules() {
        let due = NOW + Duration::days(1);

        assert!(validate_time_order(None, None).is_ok());
        assert!(validate_time_order(Some(due), None).is_ok());
        assert!(validate_time_order(None, Some(due)).is_ok());
        assert!(validate_time_order(Some(due), Some(due)).is_ok());
        assert!(validate_time_order(Some(due), Some(due - Duration::hours(1))).is_ok());

        let err = validate_time_order(Some(due), Some(due + Duration::minutes(1))).unwrap_err();
        assert_eq!(err.code(), "invalid_time_order");
    }

    #[rstest]
    #[case("2024-01-20 15:00")]
    #[case("2024-01-20T15:00")]
    #[case("2024/01/20 15:00")]
    #[case("20/01/2024 15:00")]
    #[case("20-01-2024 15:00")]
    fn parse_datetime_accepts_every_format(#[case] input: &str) {
        let parsed = parse_datetime(input, UtcOffset::UTC).unwrap();
        assert_eq!(parsed, datetime!(2024-01-20 15:00 UTC));
    }

    #[test]
    fn parse_datetime_applies_offset() {
        let parsed = parse_datetime("2024-01-20 15:00", offset!(+2)).unwrap();
        assert_eq!(parsed, datetime!(2024-01-20 15:00 +2));
        assert_eq!(parsed, datetime!(2024-01-20 13:00 UTC));
    }

    #[test]
    fn parse_datetime_first_matching_format_wins() {
        // 01/02/2024 only fits the day-first slash format.
        let parsed = parse_datetime("01/02/2024 08:15", UtcOffset::UTC).unwrap();
        assert_eq!(parsed, datetime!(2024-02-01 08:15 UTC));
    }

    #[rstest]
    #[case("")]
    #[case("tomorrow")]
    #[case("2024-01-20")]
    #[case("2024-13-01 10:00")]
    #[case("2024-01-20 25:00")]
    fn parse_datetime_rejects_bad_input(#[case] input: &str) {
        let err = parse_datetime(input, UtcOffset::UTC).unwrap_err();
        assert_eq!(err.code(), "invalid_date_format");
    }

    #[test]
    fn format_datetime_renders_minutes_or_placeholder() {
        assert_eq!(format_datetime(None), MISSING_DATETIME);
        assert_eq!(
            format_datetime(Some(datetime!(2024-01-05 07:09:59 UTC))),
            "2024-01-05 07:09"
        );
    }
}
