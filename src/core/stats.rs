//! # Stats Engine
//!
//! Pure derivation of the stat cards from a [`Snapshot`]. No I/O, no state
//! carried between calls, and no errors: empty or odd input degrades to
//! zeros and the `"None"` sentinel.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::core::dataset::{CONTINENT_COUNT, CountryDataset};
use crate::store::types::{CountryCode, Snapshot, User, UserId, VisitedCountry};

/// Name reported when nobody has traveled yet.
pub const NO_TRAVELER: &str = "None";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TopTraveler {
    pub name: String,
    pub count: usize,
}

impl TopTraveler {
    pub fn none() -> Self {
        Self {
            name: NO_TRAVELER.to_string(),
            count: 0,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub continents_count: usize,
    pub continents_total: usize,
    /// Already rounded to one decimal.
    pub percent_explored: f64,
    pub top_traveler: TopTraveler,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            continents_count: 0,
            continents_total: CONTINENT_COUNT,
            percent_explored: 0.0,
            top_traveler: TopTraveler::none(),
        }
    }
}

impl Stats {
    /// "12.3" style label for the explored card.
    pub fn percent_label(&self) -> String {
        format_percent(self.percent_explored)
    }
}

/// Computes every stat card from scratch.
pub fn compute(snapshot: &Snapshot, dataset: &CountryDataset) -> Stats {
    Stats {
        continents_count: continents_covered(&snapshot.countries, dataset),
        continents_total: CONTINENT_COUNT,
        percent_explored: percent_explored(
            snapshot.countries.len(),
            snapshot.total_world_countries,
        ),
        top_traveler: top_traveler(&snapshot.users, &snapshot.all_user_visits),
    }
}

/// Distinct continents among `codes`. Codes missing from the dataset are skipped.
pub fn continents_covered(codes: &[CountryCode], dataset: &CountryDataset) -> usize {
    codes
        .iter()
        .filter_map(|code| dataset.continent_of(code))
        .collect::<HashSet<_>>()
        .len()
}

/// `visited / total * 100`, rounded to one decimal. Zero when `total` is zero.
pub fn percent_explored(visited: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = visited as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}")
}

/// The user with the most visit records across everyone.
///
/// Users are ranked in the order they first appear in `visits`, and the
/// leader only changes on a strictly greater count, so ties go to whoever
/// showed up first. Returns the sentinel when there is nothing to rank or
/// the leader is not among `users`.
pub fn top_traveler(users: &[User], visits: &[VisitedCountry]) -> TopTraveler {
    if users.is_empty() || visits.is_empty() {
        return TopTraveler::none();
    }

    let mut counts: Vec<(UserId, usize)> = Vec::new();
    let mut slot: HashMap<UserId, usize> = HashMap::new();
    for visit in visits {
        match slot.get(&visit.user_id) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                slot.insert(visit.user_id, counts.len());
                counts.push((visit.user_id, 1));
            }
        }
    }

    let mut leader: Option<(UserId, usize)> = None;
    for &(user_id, count) in &counts {
        if leader.is_none_or(|(_, best)| count > best) {
            leader = Some((user_id, count));
        }
    }

    leader
        .and_then(|(user_id, count)| {
            users.iter().find(|u| u.id == user_id).map(|u| TopTraveler {
                name: u.name.clone(),
                count,
            })
        })
        .unwrap_or_else(TopTraveler::none)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Color;

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId(id),
            name: name.to_string(),
            color: Color::Green,
        }
    }

    fn visit(code: &str, user_id: i64) -> VisitedCountry {
        VisitedCountry {
            country_code: CountryCode::new(code),
            user_id: UserId(user_id),
        }
    }

    fn codes(list: &[&str]) -> Vec<CountryCode> {
        list.iter().map(|c| CountryCode::new(c)).collect()
    }

    #[test]
    fn test_percent_explored_bounds() {
        assert_eq!(format_percent(percent_explored(0, 195)), "0.0");
        assert_eq!(format_percent(percent_explored(195, 195)), "100.0");
    }

    #[test]
    fn test_percent_explored_rounds_to_one_decimal() {
        // 1 / 195 = 0.5128...%
        assert_eq!(percent_explored(1, 195), 0.5);
        // 10 / 195 = 5.128...%
        assert_eq!(format_percent(percent_explored(10, 195)), "5.1");
        // 2 / 3 = 66.666...%
        assert_eq!(format_percent(percent_explored(2, 3)), "66.7");
    }

    #[test]
    fn test_percent_explored_zero_total() {
        assert_eq!(percent_explored(5, 0), 0.0);
        assert_eq!(format_percent(percent_explored(0, 0)), "0.0");
    }

    #[test]
    fn test_continents_covered_counts_distinct() {
        let dataset = CountryDataset::builtin();
        // France + Germany share Europe; Japan is Asia; Brazil is South America
        let visited = codes(&["FR", "DE", "JP", "BR"]);
        assert_eq!(continents_covered(&visited, &dataset), 3);
    }

    #[test]
    fn test_continents_covered_ignores_unknown_codes() {
        let dataset = CountryDataset::builtin();
        let visited = codes(&["XX", "AQ", "KE"]);
        assert_eq!(continents_covered(&visited, &dataset), 1);
        assert_eq!(continents_covered(&[], &dataset), 0);
    }

    #[test]
    fn test_top_traveler_tie_goes_to_first_seen() {
        let users = vec![user(1, "Angela"), user(2, "Jack")];
        let visits = vec![visit("FR", 1), visit("FR", 2), visit("JP", 2), visit("JP", 1)];
        let top = top_traveler(&users, &visits);
        assert_eq!(top, TopTraveler { name: "Angela".to_string(), count: 2 });
    }

    #[test]
    fn test_top_traveler_tie_order_follows_records_not_ids() {
        let users = vec![user(1, "Angela"), user(2, "Jack")];
        let visits = vec![visit("FR", 2), visit("FR", 1), visit("JP", 1), visit("JP", 2)];
        assert_eq!(top_traveler(&users, &visits).name, "Jack");
    }

    #[test]
    fn test_top_traveler_strict_leader() {
        let users = vec![user(1, "Angela"), user(2, "Jack"), user(3, "Kim")];
        let visits = vec![
            visit("FR", 1),
            visit("FR", 3),
            visit("JP", 3),
            visit("PE", 3),
            visit("JP", 2),
        ];
        assert_eq!(
            top_traveler(&users, &visits),
            TopTraveler { name: "Kim".to_string(), count: 3 }
        );
    }

    #[test]
    fn test_top_traveler_sentinels() {
        assert_eq!(top_traveler(&[], &[visit("FR", 1)]), TopTraveler::none());
        assert_eq!(top_traveler(&[user(1, "Angela")], &[]), TopTraveler::none());
        // Leader id not among users
        assert_eq!(
            top_traveler(&[user(1, "Angela")], &[visit("FR", 9)]),
            TopTraveler::none()
        );
        assert_eq!(TopTraveler::none().name, "None");
    }

    #[test]
    fn test_compute_from_snapshot() {
        let dataset = CountryDataset::builtin();
        let snapshot = Snapshot {
            countries: codes(&["FR", "JP"]),
            all_user_visits: vec![visit("FR", 1), visit("JP", 1), visit("US", 2)],
            total_world_countries: dataset.len(),
            users: vec![user(1, "Angela"), user(2, "Jack")],
            current_user_id: Some(UserId(1)),
            ..Default::default()
        };
        let stats = compute(&snapshot, &dataset);
        assert_eq!(stats.continents_count, 2);
        assert_eq!(stats.continents_total, 6);
        assert_eq!(stats.percent_label(), "1.0");
        assert_eq!(stats.top_traveler.name, "Angela");
        assert_eq!(stats.top_traveler.count, 2);
    }

    #[test]
    fn test_compute_from_lowercase_wire_codes() {
        let dataset = CountryDataset::builtin();
        let json = r#"{
            "countries": ["fr", "jp", "br"],
            "allVisits": [],
            "allUserVisits": [],
            "totalWorldCountries": 195,
            "users": [],
            "currentUserId": null
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(continents_covered(&snapshot.countries, &dataset), 3);
        assert_eq!(compute(&snapshot, &dataset).continents_count, 3);
    }

    #[test]
    fn test_compute_empty_snapshot() {
        let stats = compute(&Snapshot::default(), &CountryDataset::builtin());
        assert_eq!(stats, Stats::default());
        assert_eq!(stats.percent_label(), "0.0");
    }
}
