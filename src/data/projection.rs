//! Roster projection: filter by role, then sort.
//!
//! The projection owns no state. It is recomputed from the roster snapshot
//! and the user's criteria on every call; rosters are tens of records, so a
//! full sort per render is cheap.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use wellwatch_types::StaffRecord;

/// Column to sort the roster by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Severity rank: Critical, High, Normal.
    #[default]
    Status,
    Name,
    /// Mental wellness index.
    Mwi,
    /// Heart rate.
    Hr,
    Hrv,
    SleepIndex,
    Steadiness,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Status,
        SortKey::Name,
        SortKey::Mwi,
        SortKey::Hr,
        SortKey::Hrv,
        SortKey::SleepIndex,
        SortKey::Steadiness,
    ];

    /// Direction a freshly selected key starts in: most concerning value first.
    pub const fn default_direction(&self) -> SortDirection {
        match self {
            SortKey::Status | SortKey::Name | SortKey::Hr => SortDirection::Ascending,
            SortKey::Mwi | SortKey::Hrv | SortKey::SleepIndex | SortKey::Steadiness => {
                SortDirection::Descending
            }
        }
    }

    /// Status has a single defined order and cannot be reversed.
    pub const fn is_toggleable(&self) -> bool {
        !matches!(self, SortKey::Status)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            SortKey::Status => "status",
            SortKey::Name => "name",
            SortKey::Mwi => "mwi",
            SortKey::Hr => "hr",
            SortKey::Hrv => "hrv",
            SortKey::SleepIndex => "sleep_index",
            SortKey::Steadiness => "steadiness",
        }
    }

    /// Cycle to the next sort key.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn numeric_value(&self, record: &StaffRecord) -> Option<f64> {
        match self {
            SortKey::Mwi => record.mental_wellness_index,
            SortKey::Hr => record.current_heart_rate.map(f64::from),
            SortKey::Hrv => record.current_hrv.map(f64::from),
            SortKey::SleepIndex => record.current_sleep_index,
            SortKey::Steadiness => record.current_steadiness,
            SortKey::Status | SortKey::Name => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SortKey::ALL
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown sort key: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active sort key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortKey::default())
    }
}

impl SortState {
    /// Start sorting by `key` in its default direction.
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            direction: key.default_direction(),
        }
    }

    /// Apply a user's sort-key selection.
    ///
    /// Selecting the active key again flips the direction; selecting a
    /// different key resets to that key's default direction.
    pub fn select(&mut self, key: SortKey) {
        if key == self.key {
            if key.is_toggleable() {
                self.direction = self.direction.flip();
            }
        } else {
            *self = Self::new(key);
        }
    }

    /// Compare two records under this sort, including the name tie-break.
    pub fn compare(&self, a: &StaffRecord, b: &StaffRecord) -> Ordering {
        let primary = match self.key {
            SortKey::Status => a.stress_level.rank().cmp(&b.stress_level.rank()),
            SortKey::Name => self.directed(a.name.cmp(&b.name)),
            _ => {
                let va = self.key.numeric_value(a);
                let vb = self.key.numeric_value(b);
                match (va, vb) {
                    (Some(x), Some(y)) => self.directed(x.total_cmp(&y)),
                    // Missing data never ranks as best: always last.
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
        };

        primary.then_with(|| a.name.cmp(&b.name))
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Role filter for the roster view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Role(String),
}

impl RoleFilter {
    pub const ALL_LABEL: &'static str = "All";

    pub fn matches(&self, record: &StaffRecord) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::Role(role) => record.role == *role,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RoleFilter::All => Self::ALL_LABEL,
            RoleFilter::Role(role) => role,
        }
    }

    /// Cycle All -> first role -> ... -> last role -> All.
    pub fn next(&self, roles: &[String]) -> Self {
        match self {
            RoleFilter::All => roles.first().cloned().map(RoleFilter::Role).unwrap_or_default(),
            RoleFilter::Role(current) => {
                let idx = roles.iter().position(|r| r == current);
                match idx.and_then(|i| roles.get(i + 1)) {
                    Some(next) => RoleFilter::Role(next.clone()),
                    None => RoleFilter::All,
                }
            }
        }
    }
}

impl From<&str> for RoleFilter {
    fn from(s: &str) -> Self {
        if s == Self::ALL_LABEL {
            RoleFilter::All
        } else {
            RoleFilter::Role(s.to_string())
        }
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the ordered subset of records to display.
pub fn project<'a, I>(records: I, filter: &RoleFilter, sort: SortState) -> Vec<&'a StaffRecord>
where
    I: IntoIterator<Item = &'a StaffRecord>,
{
    let mut rows: Vec<&StaffRecord> = records.into_iter().filter(|r| filter.matches(r)).collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}

/// Distinct roles present in the roster, sorted.
pub fn available_roles<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a StaffRecord>,
{
    let mut roles: Vec<String> = records.into_iter().map(|r| r.role.clone()).collect();
    roles.sort();
    roles.dedup();
    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellwatch_types::StressLevel;

    fn staff(id: u64, name: &str, role: &str, level: StressLevel) -> StaffRecord {
        StaffRecord::new(id, name, role).with_stress_level(level)
    }

    fn ids(rows: &[&StaffRecord]) -> Vec<u64> {
        rows.iter().map(|r| r.id).collect()
    }

    fn roster() -> Vec<StaffRecord> {
        vec![
            staff(1, "Dana", "Nurse", StressLevel::Normal).with_heart_rate(80).with_mwi(70.0),
            staff(2, "Ari", "Doctor", StressLevel::Critical).with_heart_rate(130),
            staff(3, "Cole", "Nurse", StressLevel::High).with_heart_rate(80).with_mwi(40.0),
            staff(4, "Bea", "Technician", StressLevel::Normal).with_mwi(90.0),
        ]
    }

    #[test]
    fn end_to_end_status_then_role_filter() {
        let roster = vec![
            staff(1, "Nina", "Nurse", StressLevel::Critical),
            staff(2, "Dmitri", "Doctor", StressLevel::Normal),
        ];
        let sort = SortState::new(SortKey::Status);

        let rows = project(&roster, &RoleFilter::All, sort);
        assert_eq!(ids(&rows), vec![1, 2]);

        let rows = project(&roster, &RoleFilter::from("Doctor"), sort);
        assert_eq!(ids(&rows), vec![2]);
    }

    #[test]
    fn filter_keeps_only_matching_role() {
        let roster = roster();
        let rows = project(&roster, &RoleFilter::Role("Nurse".into()), SortState::default());
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.role == "Nurse"));
    }

    #[test]
    fn all_filter_keeps_everything() {
        let roster = roster();
        let rows = project(&roster, &RoleFilter::All, SortState::default());
        assert_eq!(rows.len(), roster.len());
    }

    #[test]
    fn status_sorts_by_severity_then_name() {
        let roster = roster();
        let rows = project(&roster, &RoleFilter::All, SortState::new(SortKey::Status));
        assert_eq!(ids(&rows), vec![2, 3, 4, 1]);
    }

    #[test]
    fn status_direction_cannot_toggle() {
        let mut sort = SortState::new(SortKey::Status);
        sort.select(SortKey::Status);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn selecting_same_key_flips_direction() {
        let mut sort = SortState::new(SortKey::Status);
        sort.select(SortKey::Hr);
        assert_eq!(sort.direction, SortDirection::Ascending);
        sort.select(SortKey::Hr);
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn new_key_resets_to_its_own_default() {
        let mut sort = SortState::new(SortKey::Name);
        sort.select(SortKey::Name);
        assert_eq!(sort.direction, SortDirection::Descending);

        sort.select(SortKey::Hr);
        assert_eq!(sort, SortState { key: SortKey::Hr, direction: SortDirection::Ascending });

        sort.select(SortKey::Mwi);
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn default_directions() {
        let expected = [
            (SortKey::Status, SortDirection::Ascending),
            (SortKey::Name, SortDirection::Ascending),
            (SortKey::Mwi, SortDirection::Descending),
            (SortKey::Hr, SortDirection::Ascending),
            (SortKey::Hrv, SortDirection::Descending),
            (SortKey::SleepIndex, SortDirection::Descending),
            (SortKey::Steadiness, SortDirection::Descending),
        ];
        for (key, dir) in expected {
            assert_eq!(SortState::new(key).direction, dir, "{}", key);
        }
    }

    #[test]
    fn name_sort_toggles() {
        let roster = roster();
        let mut sort = SortState::new(SortKey::Name);
        let rows = project(&roster, &RoleFilter::All, sort);
        assert_eq!(ids(&rows), vec![2, 4, 3, 1]);

        sort.select(SortKey::Name);
        let rows = project(&roster, &RoleFilter::All, sort);
        assert_eq!(ids(&rows), vec![1, 3, 4, 2]);
    }

    #[test]
    fn numeric_ties_break_by_name_in_both_directions() {
        let roster = roster();
        let mut sort = SortState::new(SortKey::Hr);
        let rows = project(&roster, &RoleFilter::All, sort);
        // Cole and Dana tie at 80; Bea has no heart rate.
        assert_eq!(ids(&rows), vec![3, 1, 2, 4]);

        sort.select(SortKey::Hr);
        let rows = project(&roster, &RoleFilter::All, sort);
        assert_eq!(ids(&rows), vec![2, 3, 1, 4]);
    }

    #[test]
    fn missing_values_sort_last_regardless_of_direction() {
        let roster = roster();
        let mut sort = SortState::new(SortKey::Mwi);
        let rows = project(&roster, &RoleFilter::All, sort);
        assert_eq!(ids(&rows), vec![4, 1, 3, 2]);

        sort.select(SortKey::Mwi);
        let rows = project(&roster, &RoleFilter::All, sort);
        assert_eq!(ids(&rows), vec![3, 1, 4, 2]);
    }

    #[test]
    fn adjacent_pairs_respect_direction() {
        let roster = roster();
        for key in SortKey::ALL.into_iter().filter(|k| !matches!(k, SortKey::Status | SortKey::Name)) {
            for sort in [SortState::new(key), {
                let mut s = SortState::new(key);
                s.select(key);
                s
            }] {
                let rows = project(&roster, &RoleFilter::All, sort);
                for pair in rows.windows(2) {
                    let (x, y) = (key.numeric_value(pair[0]), key.numeric_value(pair[1]));
                    match (x, y) {
                        (Some(x), Some(y)) => match sort.direction {
                            SortDirection::Ascending => assert!(x <= y),
                            SortDirection::Descending => assert!(x >= y),
                        },
                        (None, Some(_)) => panic!("missing value ranked ahead for {}", key),
                        _ => {}
                    }
                }
            }
        }
    }

    #[test]
    fn roles_are_distinct_and_sorted() {
        let roster = roster();
        assert_eq!(available_roles(&roster), vec!["Doctor", "Nurse", "Technician"]);
    }

    #[test]
    fn role_filter_cycles_back_to_all() {
        let roles = vec!["Doctor".to_string(), "Nurse".to_string()];
        let f = RoleFilter::All.next(&roles);
        assert_eq!(f, RoleFilter::Role("Doctor".into()));
        let f = f.next(&roles);
        assert_eq!(f, RoleFilter::Role("Nurse".into()));
        assert_eq!(f.next(&roles), RoleFilter::All);
        assert_eq!(RoleFilter::All.next(&[]), RoleFilter::All);
    }

    #[test]
    fn sort_key_parses_labels() {
        assert_eq!("sleep_index".parse::<SortKey>().unwrap(), SortKey::SleepIndex);
        assert!("pulse".parse::<SortKey>().is_err());
    }
}
