//! Ordered badge selection with toggle semantics.

use crate::badge::Badge;

/// Badges chosen by the user, in the order they were (re)selected.
///
/// Identifiers are unique. The only mutation is [`toggle`](Self::toggle),
/// which removes a selected badge or appends an unselected one, so the
/// order reflects recency of selection rather than catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    badges: Vec<Badge>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new selection with `badge` removed if present, or appended
    /// at the end if absent.
    #[must_use]
    pub fn toggle(&self, badge: &Badge) -> Self {
        let mut badges = self.badges.clone();
        match badges.iter().position(|b| b.id() == badge.id()) {
            Some(index) => {
                badges.remove(index);
            }
            None => badges.push(badge.clone()),
        }
        Self { badges }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id() == id)
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter()
    }

    /// Selected identifiers in selection order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.badges.iter().map(Badge::id).collect()
    }
}

impl FromIterator<Badge> for SelectionSet {
    /// Toggles each badge in turn, so repeated identifiers cancel out.
    fn from_iter<I: IntoIterator<Item = Badge>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SelectionSet::new(), |set, badge| set.toggle(&badge))
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Badge;
    type IntoIter = std::slice::Iter<'a, Badge>;

    fn into_iter(self) -> Self::IntoIter {
        self.badges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(id: &str) -> Badge {
        Badge::new(id, "<svg/>")
    }

    #[test]
    fn toggle_twice_restores_selection() {
        // B absent, or selected most recently.
        let b = badge("React");
        let sets = [
            SelectionSet::new(),
            SelectionSet::new().toggle(&badge("Go")),
            SelectionSet::new().toggle(&badge("Go")).toggle(&b),
        ];
        for set in sets {
            assert_eq!(set.toggle(&b).toggle(&b), set);
        }
    }

    #[test]
    fn round_trip_of_earlier_badge_reorders() {
        // Removing and re-adding moves B behind later selections.
        let b = badge("B");
        let set = SelectionSet::new().toggle(&b).toggle(&badge("Go"));
        let round_trip = set.toggle(&b).toggle(&b);
        assert_eq!(round_trip.identifiers(), ["Go", "B"]);
        assert!(round_trip.contains("B"));
        assert_eq!(round_trip.len(), set.len());
    }

    #[test]
    fn toggle_appends_in_selection_order() {
        let set = SelectionSet::new().toggle(&badge("B")).toggle(&badge("C"));
        assert_eq!(set.identifiers(), ["B", "C"]);
    }

    #[test]
    fn reselected_badge_moves_to_end() {
        let b = badge("B");
        let set = SelectionSet::new().toggle(&b).toggle(&badge("C"));
        let set = set.toggle(&b).toggle(&b);
        assert_eq!(set.identifiers(), ["C", "B"]);
    }

    #[test]
    fn toggle_does_not_mutate_original() {
        let original = SelectionSet::new().toggle(&badge("Go"));
        let _ = original.toggle(&badge("Go"));
        assert!(original.contains("Go"));
        assert_eq!(original.len(), 1);
    }

    #[test]
    fn collect_cancels_repeats() {
        let set: SelectionSet = [badge("A"), badge("B"), badge("A")].into_iter().collect();
        assert_eq!(set.identifiers(), ["B"]);
    }
}
