//! Behavioral checks for the follow-up cadence engine through its public API.
//!
//! The engine is a pure function of `(status, base_date, today)`, so every
//! scenario here builds its inputs directly and asserts on the returned values.

use chrono::{Days, NaiveDate, TimeZone, Utc};
use huntpilot::workflows::applications::ApplicationStatus;
use huntpilot::workflows::followups::{
    cadence_days, cadence_days_for_label, classify_urgency, classify_urgency_at, compute_due_at,
    evaluate_follow_up, FollowUpUrgency, UrgencyKind,
};
use proptest::prelude::*;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn any_status() -> impl Strategy<Value = ApplicationStatus> {
    prop_oneof![
        Just(ApplicationStatus::Applied),
        Just(ApplicationStatus::Oa),
        Just(ApplicationStatus::Interview),
        Just(ApplicationStatus::Offer),
        Just(ApplicationStatus::Rejected),
    ]
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    // 2000-01-01 plus up to ~60 years.
    (0u64..22_000).prop_map(|offset| date(2000, 1, 1) + Days::new(offset))
}

#[test]
fn due_dates_follow_the_cadence_table() {
    let base = date(2024, 1, 1);

    assert_eq!(compute_due_at(ApplicationStatus::Applied, base), Some(date(2024, 1, 8)));
    assert_eq!(compute_due_at(ApplicationStatus::Oa, base), Some(date(2024, 1, 4)));
    assert_eq!(compute_due_at(ApplicationStatus::Interview, base), Some(date(2024, 1, 3)));
    assert_eq!(compute_due_at(ApplicationStatus::Offer, base), Some(date(2024, 1, 2)));
    assert_eq!(compute_due_at(ApplicationStatus::Rejected, base), None);
}

#[test]
fn two_days_past_due_is_overdue_by_two() {
    let urgency = classify_urgency(date(2024, 1, 8), date(2024, 1, 10));

    assert_eq!(urgency, FollowUpUrgency::Overdue { days_past: 2 });
    assert_eq!(urgency.kind(), UrgencyKind::Overdue);
    assert_eq!(urgency.magnitude(), 2);
    assert_eq!(urgency.label(), "Overdue by 2 days");
}

#[test]
fn unknown_status_labels_use_the_applied_cadence() {
    assert_eq!(cadence_days_for_label("GHOSTED"), Some(7));
    assert_eq!(cadence_days_for_label("INTERVIEW"), Some(2));
    assert_eq!(cadence_days_for_label("REJECTED"), None);
    // Any other spelling is an unknown label.
    assert_eq!(cadence_days_for_label("rejected"), Some(7));
    assert_eq!(cadence_days_for_label(" interview "), Some(7));
}

#[test]
fn evaluation_combines_due_date_and_urgency() {
    let due = evaluate_follow_up(ApplicationStatus::Oa, date(2024, 2, 27), date(2024, 3, 1))
        .expect("oa applications have a cadence");

    // 2024 is a leap year: Feb 27 + 3 days lands on Mar 1.
    assert_eq!(due.due_at, date(2024, 3, 1));
    assert_eq!(due.urgency, FollowUpUrgency::DueToday);
    assert!(evaluate_follow_up(ApplicationStatus::Rejected, date(2024, 2, 27), date(2024, 3, 1))
        .is_none());
}

proptest! {
    #[test]
    fn due_date_is_exactly_cadence_days_after_base(status in any_status(), base in any_date()) {
        match cadence_days(status) {
            Some(days) => {
                let due = compute_due_at(status, base).expect("cadence defined");
                prop_assert_eq!(due.signed_duration_since(base).num_days(), i64::from(days));
            }
            None => {
                prop_assert_eq!(status, ApplicationStatus::Rejected);
                prop_assert!(compute_due_at(status, base).is_none());
            }
        }
    }

    #[test]
    fn rejected_never_has_a_due_date(base in any_date(), today in any_date()) {
        prop_assert!(compute_due_at(ApplicationStatus::Rejected, base).is_none());
        prop_assert!(evaluate_follow_up(ApplicationStatus::Rejected, base, today).is_none());
    }

    #[test]
    fn same_calendar_day_is_due_today_regardless_of_time(
        day in any_date(),
        due_seconds in 0u32..86_400,
        now_seconds in 0u32..86_400,
    ) {
        let due_at = day.and_hms_opt(0, 0, 0).expect("midnight exists")
            + chrono::Duration::seconds(i64::from(due_seconds));
        let now = day.and_hms_opt(0, 0, 0).expect("midnight exists")
            + chrono::Duration::seconds(i64::from(now_seconds));

        let urgency = classify_urgency_at(
            &Utc.from_utc_datetime(&due_at),
            &Utc.from_utc_datetime(&now),
        );
        prop_assert_eq!(urgency, FollowUpUrgency::DueToday);
    }

    #[test]
    fn only_same_day_classifies_as_due_today(due_at in any_date(), today in any_date()) {
        let urgency = classify_urgency(due_at, today);
        prop_assert_eq!(urgency == FollowUpUrgency::DueToday, due_at == today);
    }

    #[test]
    fn advancing_today_never_leaves_overdue(due_at in any_date(), today in any_date()) {
        let before = classify_urgency(due_at, today);
        let after = classify_urgency(due_at, today + Days::new(1));

        if before.is_overdue() {
            prop_assert!(after.is_overdue());
            prop_assert_eq!(after.magnitude(), before.magnitude() + 1);
        }
        if after.kind() == UrgencyKind::Upcoming {
            prop_assert_eq!(before.kind(), UrgencyKind::Upcoming);
        }
    }
}
