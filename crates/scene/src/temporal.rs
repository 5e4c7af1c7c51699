use foundation::time::Year;

use crate::feature::PropertySnapshot;

/// Resolves the visible snapshot for a query year: the most recent snapshot
/// at or before `year`.
///
/// Snapshots without a valid year are skipped. The remaining snapshots are
/// stable-sorted ascending by year, so when two snapshots share a year the
/// later-inserted one wins. Returns `None` when every snapshot is dated
/// after the query year — callers treat that as "not visible yet", not as
/// an error.
pub fn resolve(snapshots: &[PropertySnapshot], year: Year) -> Option<&PropertySnapshot> {
    let mut dated: Vec<(Year, &PropertySnapshot)> = snapshots
        .iter()
        .filter_map(|s| s.year.map(|y| (y, s)))
        .collect();
    dated.sort_by_key(|(y, _)| *y);

    let mut current = None;
    for (y, snapshot) in dated {
        if y <= year {
            current = Some(snapshot);
        } else {
            break;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use foundation::time::Year;

    use super::resolve;
    use crate::feature::PropertySnapshot;

    fn snap(year: i32, name: &str) -> PropertySnapshot {
        PropertySnapshot::new(Year(year), name, "")
    }

    #[test]
    fn picks_nearest_past_snapshot() {
        let snaps = vec![snap(1800, "X"), snap(1900, "Y")];
        assert_eq!(resolve(&snaps, Year(1850)).unwrap().name, "X");
        assert_eq!(resolve(&snaps, Year(1900)).unwrap().name, "Y");
        assert_eq!(resolve(&snaps, Year(1700)), None);
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let snaps = vec![snap(1900, "Y"), snap(1800, "X")];
        assert_eq!(resolve(&snaps, Year(1850)).unwrap().name, "X");
    }

    #[test]
    fn undated_snapshots_never_resolve() {
        let snaps = vec![
            PropertySnapshot {
                year: None,
                name: "undated".to_string(),
                description: String::new(),
            },
            snap(1900, "Y"),
        ];
        assert_eq!(resolve(&snaps, Year(1850)), None);
        assert_eq!(resolve(&snaps, Year(1950)).unwrap().name, "Y");
    }

    #[test]
    fn same_year_ties_go_to_the_later_inserted_snapshot() {
        let snaps = vec![snap(1900, "first"), snap(1900, "second")];
        assert_eq!(resolve(&snaps, Year(1950)).unwrap().name, "second");
    }

    #[test]
    fn resolution_is_monotone_in_the_query_year() {
        let snaps = vec![snap(1800, "a"), snap(1850, "b"), snap(1900, "c")];
        let years = [1700, 1799, 1800, 1825, 1850, 1875, 1900, 2000];
        for w in years.windows(2) {
            let (y1, y2) = (Year(w[0]), Year(w[1]));
            match (resolve(&snaps, y1), resolve(&snaps, y2)) {
                (None, _) => {}
                (Some(a), Some(b)) => assert!(a.year.unwrap() <= b.year.unwrap()),
                (Some(_), None) => panic!("visibility must not regress as the year advances"),
            }
        }
    }

    #[test]
    fn empty_input_resolves_to_none() {
        assert_eq!(resolve(&[], Year(2000)), None);
    }
}
