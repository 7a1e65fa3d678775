//! Trigger expansion: one calendar instant per window edge.
//!
//! launchd's `StartCalendarInterval` fires on exact day/hour/minute matches
//! only (no range form), so every window edge becomes its own trigger
//! record.

use autoblock_types::{MINUTES_PER_WEEK, TriggerAction, TriggerInstant};

use crate::{InternalConsistencyFault, NormalizedInterval};

/// Expand validated windows into the ordered trigger instant list.
///
/// Each window yields a `Start` at its opening minute, carrying the full
/// wraparound-aware duration so SelfControl self-terminates even if the
/// stop trigger never fires, and a `Stop` at its closing minute. Instants
/// are ordered by minute of week; where one window closes exactly as
/// another opens, both records are kept and the Stop sorts first, so a
/// runner processing them in order preserves continuity.
///
/// Total over anything [`crate::normalize`] produces; the fault path only
/// exists to turn a broken validator invariant into a loud defect instead
/// of a bad trigger set.
pub fn expand(
    intervals: &[NormalizedInterval],
) -> Result<Vec<TriggerInstant>, InternalConsistencyFault> {
    let mut instants = Vec::with_capacity(intervals.len() * 2);

    for iv in intervals {
        let duration = iv.duration_minutes();
        if iv.start() >= MINUTES_PER_WEEK || duration == 0 {
            return Err(InternalConsistencyFault {
                detail: format!(
                    "window [{}, {}) escaped validation",
                    iv.start(),
                    iv.end()
                ),
            });
        }
        instants.push(TriggerInstant::at(
            iv.start(),
            TriggerAction::Start {
                duration_minutes: duration,
            },
        ));
        instants.push(TriggerInstant::at(iv.end(), TriggerAction::Stop));
    }

    instants.sort_by_key(|instant| (instant.minute_of_week(), rank(instant.action)));
    Ok(instants)
}

fn rank(action: TriggerAction) -> u8 {
    match action {
        TriggerAction::Stop => 0,
        TriggerAction::Start { .. } => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::normalize;
    use autoblock_types::{BlockSchedule, Weekday};

    fn expand_entries(entries: &[BlockSchedule]) -> Vec<TriggerInstant> {
        expand(&normalize(entries).unwrap()).unwrap()
    }

    #[test]
    fn test_simple_window_yields_start_and_stop() {
        let triggers = expand_entries(&[BlockSchedule::new(
            Some(Weekday::Monday),
            (9, 0),
            (17, 0),
        )]);
        assert_eq!(
            triggers,
            vec![
                TriggerInstant {
                    weekday: Weekday::Monday,
                    hour: 9,
                    minute: 0,
                    action: TriggerAction::Start { duration_minutes: 480 },
                },
                TriggerInstant {
                    weekday: Weekday::Monday,
                    hour: 17,
                    minute: 0,
                    action: TriggerAction::Stop,
                },
            ]
        );
    }

    #[test]
    fn test_wraparound_duration_is_not_split() {
        // Sunday 23:00-05:00: one Start with the true 360-minute duration,
        // the Stop folded onto Monday.
        let triggers = expand_entries(&[BlockSchedule::new(
            Some(Weekday::Sunday),
            (23, 0),
            (5, 0),
        )]);
        assert_eq!(triggers.len(), 2);
        assert_eq!(
            triggers[1],
            TriggerInstant {
                weekday: Weekday::Sunday,
                hour: 23,
                minute: 0,
                action: TriggerAction::Start { duration_minutes: 360 },
            }
        );
        assert_eq!(
            triggers[0],
            TriggerInstant {
                weekday: Weekday::Monday,
                hour: 5,
                minute: 0,
                action: TriggerAction::Stop,
            }
        );
    }

    #[test]
    fn test_every_day_window_yields_seven_pairs() {
        let triggers =
            expand_entries(&[BlockSchedule::new(None, (9, 0), (17, 30))]);
        assert_eq!(triggers.len(), 14);
        for day in Weekday::ALL {
            let starts: Vec<_> = triggers
                .iter()
                .filter(|t| {
                    t.weekday == day
                        && t.action
                            == TriggerAction::Start {
                                duration_minutes: 510,
                            }
                })
                .collect();
            assert_eq!(starts.len(), 1, "{day} should open exactly once");
            assert!(triggers.iter().any(|t| t.weekday == day
                && (t.hour, t.minute) == (17, 30)
                && t.action == TriggerAction::Stop));
        }
    }

    #[test]
    fn test_adjacent_windows_keep_both_records_stop_first() {
        let triggers = expand_entries(&[
            BlockSchedule::new(Some(Weekday::Monday), (9, 0), (17, 0)),
            BlockSchedule::new(Some(Weekday::Monday), (17, 0), (18, 0)),
        ]);
        assert_eq!(triggers.len(), 4);
        let at_1700: Vec<_> = triggers
            .iter()
            .filter(|t| (t.hour, t.minute) == (17, 0))
            .collect();
        assert_eq!(at_1700.len(), 2);
        assert_eq!(at_1700[0].action, TriggerAction::Stop);
        assert_eq!(
            at_1700[1].action,
            TriggerAction::Start { duration_minutes: 60 }
        );
    }

    #[test]
    fn test_durations_sum_to_covered_minutes() {
        // Round-trip property: Start durations add up to the total minutes
        // the original windows cover.
        let entries = [
            BlockSchedule::new(None, (6, 30), (7, 15)),
            BlockSchedule::new(Some(Weekday::Sunday), (23, 0), (5, 0)),
            BlockSchedule::new(Some(Weekday::Wednesday), (12, 0), (13, 0)),
        ];
        let expected: u32 = 7 * 45 + 360 + 60;
        let total: u32 = expand_entries(&entries)
            .iter()
            .filter_map(|t| match t.action {
                TriggerAction::Start { duration_minutes } => Some(duration_minutes),
                TriggerAction::Stop => None,
            })
            .sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn test_expander_is_ordered_by_minute_of_week() {
        let entries = [
            BlockSchedule::new(Some(Weekday::Saturday), (10, 0), (12, 0)),
            BlockSchedule::new(Some(Weekday::Tuesday), (22, 0), (6, 0)),
            BlockSchedule::new(Some(Weekday::Monday), (0, 0), (1, 0)),
        ];
        let triggers = expand_entries(&entries);
        let offsets: Vec<u32> = triggers.iter().map(|t| t.minute_of_week()).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }
}
