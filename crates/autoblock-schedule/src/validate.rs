//! Schedule validation: weekday expansion, offset normalization and the
//! overlap sweep.

use autoblock_types::{BlockSchedule, MINUTES_PER_DAY, MINUTES_PER_WEEK, Weekday};

use crate::{NormalizedInterval, ScheduleError};

/// Normalize raw config entries into a disjoint window set sorted by
/// opening minute.
///
/// Entries without a weekday are expanded into seven concrete ones first.
/// A window whose end time is not after its start time wraps into the next
/// day; one starting late on Sunday folds back onto Monday. Overlap is
/// checked on split pieces so folded windows collide correctly with Monday
/// windows.
pub fn normalize(entries: &[BlockSchedule]) -> Result<Vec<NormalizedInterval>, ScheduleError> {
    let mut intervals = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        check_time(index, "start", entry.start_hour, entry.start_minute)?;
        check_time(index, "end", entry.end_hour, entry.end_minute)?;

        let start_in_day = entry.start_hour * 60 + entry.start_minute;
        let end_in_day = entry.end_hour * 60 + entry.end_minute;
        if start_in_day == end_in_day {
            return Err(ScheduleError::DegenerateInterval {
                entry: index,
                hour: entry.start_hour,
                minute: entry.start_minute,
            });
        }

        let days: &[Weekday] = match entry.weekday {
            Some(ref day) => std::slice::from_ref(day),
            None => &Weekday::ALL,
        };
        for &day in days {
            let start = day.minute_offset() + start_in_day;
            let mut end = day.minute_offset() + end_in_day;
            if end <= start {
                // Overnight window: the end belongs to the following day.
                end += MINUTES_PER_DAY;
            }
            intervals.push(NormalizedInterval {
                start,
                end: end % MINUTES_PER_WEEK,
                source: index,
            });
        }
    }

    check_disjoint(&intervals)?;

    intervals.sort_by_key(|iv| iv.start());
    Ok(intervals)
}

fn check_time(
    entry: usize,
    field: &'static str,
    hour: u32,
    minute: u32,
) -> Result<(), ScheduleError> {
    if hour > 23 || minute > 59 {
        return Err(ScheduleError::InvalidTime {
            entry,
            field,
            hour,
            minute,
        });
    }
    Ok(())
}

/// Pairwise sweep over the windows' pieces on the plain `[0, 10080)` line.
/// Wrapping windows contribute two pieces, so a Sunday-night tail is
/// compared against Monday-morning windows like any other range.
fn check_disjoint(intervals: &[NormalizedInterval]) -> Result<(), ScheduleError> {
    let mut pieces: Vec<(u32, u32, usize)> = Vec::with_capacity(intervals.len() * 2);
    for (index, iv) in intervals.iter().enumerate() {
        if iv.start() < iv.end() {
            pieces.push((iv.start(), iv.end(), index));
        } else {
            pieces.push((iv.start(), MINUTES_PER_WEEK, index));
            pieces.push((0, iv.end(), index));
        }
    }
    pieces.sort_by_key(|&(start, end, _)| (start, end));

    for pair in pieces.windows(2) {
        let (_, prev_end, prev_index) = pair[0];
        let (next_start, _, next_index) = pair[1];
        if next_start < prev_end {
            return Err(overlap_error(
                intervals[prev_index],
                intervals[next_index],
            ));
        }
    }
    Ok(())
}

fn overlap_error(a: NormalizedInterval, b: NormalizedInterval) -> ScheduleError {
    // Report in config order so the same pair always names the same entries.
    let (first, second) = if (a.source(), a.start()) <= (b.source(), b.start()) {
        (a, b)
    } else {
        (b, a)
    };
    ScheduleError::Overlap {
        first: first.source(),
        first_window: first.describe(),
        second: second.source(),
        second_window: second.describe(),
    }
}
