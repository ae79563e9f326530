//! Round-robin selection of the next eligible assignee.

use chrono::NaiveDate;

use crate::error::{Result, RotaError};
use crate::model::{Group, SkipWeek};

/// The selector's decision: who gets the period and where the cursor lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub user_id: String,
    pub new_cursor: usize,
}

/// Pick the next eligible member for `target_period`.
///
/// Members are scanned in `order_position` order starting at the group's
/// cursor. A candidate is eligible unless a skip week matches
/// `(user_id, group.id, target_period)`. The cursor lands one past the
/// assignee, so skipped candidates permanently consume their turn rather
/// than being re-queued -- that is the rotation policy, not a side effect.
///
/// Pure: the group is not mutated. On `AllSkipped` the caller's cursor and
/// state are exactly as passed in.
pub fn select_next(
    group: &Group,
    skip_weeks: &[SkipWeek],
    target_period: NaiveDate,
) -> Result<Selection> {
    let members = group.sorted_members();
    let n = members.len();
    if n == 0 {
        return Err(RotaError::EmptyGroup(group.id.clone()));
    }

    let start = group.cursor % n;
    for k in 0..n {
        let idx = (start + k) % n;
        let candidate = members[idx];

        let skipped = skip_weeks.iter().any(|s| {
            s.user_id == candidate.user_id
                && s.group_id == group.id
                && s.period_start == target_period
        });
        if skipped {
            continue;
        }

        return Ok(Selection {
            user_id: candidate.user_id.clone(),
            new_cursor: (idx + 1) % n,
        });
    }

    Err(RotaError::AllSkipped {
        group_id: group.id.clone(),
        period_start: target_period,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupMember, VisitSchedule};
    use chrono::Utc;
    use proptest::prelude::*;

    fn make_group(member_ids: &[&str], cursor: usize) -> Group {
        Group {
            id: "g1".to_string(),
            name: "Test group".to_string(),
            description: None,
            members: member_ids
                .iter()
                .enumerate()
                .map(|(i, id)| GroupMember {
                    user_id: (*id).to_string(),
                    order_position: i as u32,
                })
                .collect(),
            schedule: VisitSchedule {
                day_of_week: 0,
                time_of_day: "10:00".to_string(),
            },
            cursor,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn skip(user_id: &str, period: NaiveDate) -> SkipWeek {
        SkipWeek {
            user_id: user_id.to_string(),
            group_id: "g1".to_string(),
            period_start: period,
            reason: None,
            created_at: Utc::now(),
        }
    }

    fn period() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    #[test]
    fn picks_member_at_cursor() {
        let group = make_group(&["a", "b", "c"], 1);
        let selection = select_next(&group, &[], period()).unwrap();
        assert_eq!(selection.user_id, "b");
        assert_eq!(selection.new_cursor, 2);
    }

    #[test]
    fn wraps_around_the_roster() {
        let group = make_group(&["a", "b", "c"], 2);
        let selection = select_next(&group, &[], period()).unwrap();
        assert_eq!(selection.user_id, "c");
        assert_eq!(selection.new_cursor, 0);
    }

    #[test]
    fn skipped_candidate_consumes_their_turn() {
        // Cursor points at b, b is skipped: c gets the period and the
        // cursor wraps past both. A second period with no skips then
        // assigns a -- b's turn is gone.
        let group = make_group(&["a", "b", "c"], 1);
        let skips = vec![skip("b", period())];

        let first = select_next(&group, &skips, period()).unwrap();
        assert_eq!(first.user_id, "c");
        assert_eq!(first.new_cursor, 0);

        let mut group = group;
        group.cursor = first.new_cursor;
        let next_period = NaiveDate::from_ymd_opt(2026, 2, 23).unwrap();
        let second = select_next(&group, &[], next_period).unwrap();
        assert_eq!(second.user_id, "a");
    }

    #[test]
    fn skip_for_other_period_is_ignored() {
        let group = make_group(&["a", "b"], 0);
        let other = NaiveDate::from_ymd_opt(2026, 2, 23).unwrap();
        let skips = vec![skip("a", other)];
        let selection = select_next(&group, &skips, period()).unwrap();
        assert_eq!(selection.user_id, "a");
    }

    #[test]
    fn empty_group_fails() {
        let group = make_group(&[], 0);
        assert!(matches!(
            select_next(&group, &[], period()),
            Err(RotaError::EmptyGroup(_))
        ));
    }

    #[test]
    fn sole_skipped_member_yields_all_skipped() {
        let group = make_group(&["a"], 0);
        let skips = vec![skip("a", period())];
        assert!(matches!(
            select_next(&group, &skips, period()),
            Err(RotaError::AllSkipped { .. })
        ));
        // Pure function: the caller's group is untouched by construction.
        assert_eq!(group.cursor, 0);
    }

    proptest! {
        /// With no skips, n consecutive selections visit every member exactly
        /// once, in order_position order starting from the cursor.
        #[test]
        fn full_cycle_visits_every_member_once(n in 1usize..8, cursor in 0usize..32) {
            let ids: Vec<String> = (0..n).map(|i| format!("u{i}")).collect();
            let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let mut group = make_group(&id_refs, cursor);

            let mut seen = Vec::new();
            for _ in 0..n {
                let selection = select_next(&group, &[], period()).unwrap();
                group.cursor = selection.new_cursor;
                seen.push(selection.user_id);
            }

            let start = cursor % n;
            for (i, user_id) in seen.iter().enumerate() {
                prop_assert_eq!(user_id, &format!("u{}", (start + i) % n));
            }

            let mut unique = seen.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), n);
        }
    }
}
