//! Technology badges and the startup catalog.

use std::sync::Arc;

use crate::layer::SvgSource;

/// A selectable technology badge.
///
/// Badges are immutable and compared by identifier only.
#[derive(Debug, Clone, Eq)]
pub struct Badge {
    id: Arc<str>,
    label: Arc<str>,
    glyph: SvgSource,
}

impl Badge {
    /// Creates a badge whose label equals its identifier.
    pub fn new(id: impl Into<String>, glyph: impl Into<SvgSource>) -> Self {
        let id: Arc<str> = Arc::from(id.into());
        Self {
            label: Arc::clone(&id),
            id,
            glyph: glyph.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Arc::from(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Text shown inside the badge pill.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn glyph(&self) -> &SvgSource {
        &self.glyph
    }
}

impl PartialEq for Badge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::hash::Hash for Badge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The fixed set of badges offered to the user, in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BadgeCatalog {
    badges: Vec<Badge>,
}

impl BadgeCatalog {
    /// Builds a catalog, dropping later entries whose identifier repeats.
    pub fn new(badges: impl IntoIterator<Item = Badge>) -> Self {
        let mut unique: Vec<Badge> = Vec::new();
        for badge in badges {
            if unique.contains(&badge) {
                tracing::warn!(badge = badge.id(), "duplicate catalog entry ignored");
                continue;
            }
            unique.push(badge);
        }
        Self { badges: unique }
    }

    /// Looks up a badge by identifier (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&Badge> {
        self.badges
            .iter()
            .find(|badge| badge.id().eq_ignore_ascii_case(id.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter()
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

impl<'a> IntoIterator for &'a BadgeCatalog {
    type Item = &'a Badge;
    type IntoIter = std::slice::Iter<'a, Badge>;

    fn into_iter(self) -> Self::IntoIter {
        self.badges.iter()
    }
}

const REACT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><g fill="none" stroke="#000000" stroke-width="1.2"><ellipse cx="12" cy="12" rx="11" ry="4.2"/><ellipse cx="12" cy="12" rx="11" ry="4.2" transform="rotate(60 12 12)"/><ellipse cx="12" cy="12" rx="11" ry="4.2" transform="rotate(120 12 12)"/></g><circle cx="12" cy="12" r="2" fill="#000000"/></svg>"##;
const NEXT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><circle cx="12" cy="12" r="10.5" fill="none" stroke="#000000" stroke-width="1.5"/><path d="M8 17V7l9 11M16 7v7" fill="none" stroke="#000000" stroke-width="1.6"/></svg>"##;
const TYPESCRIPT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><rect x="1.5" y="1.5" width="21" height="21" rx="3" fill="none" stroke="#000000" stroke-width="1.5"/><path d="M6 11h7M9.5 11v8M20 12c-1-1-4-1.2-4 .8s4 1.4 4 3.6-3.4 2.2-4.4 1" fill="none" stroke="#000000" stroke-width="1.6"/></svg>"##;
const REDUX: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><g fill="none" stroke="#000000" stroke-width="1.6"><path d="M15.5 16.5c2.5-3 2.6-8-1-10.5"/><path d="M6.5 9.5c-2 3.3-.8 8 3.5 9.5 2.6.9 5 .2 6.6-1.4"/><path d="M8 6.6c2-2.4 6.6-3 9.4.5 1.6 2 2 4.4 1.2 6.5"/></g><circle cx="15.6" cy="17" r="1.6" fill="#000000"/><circle cx="7" cy="9" r="1.6" fill="#000000"/><circle cx="18.6" cy="13.6" r="1.6" fill="#000000"/></svg>"##;
const TAILWIND: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path d="M12 6c-2.7 0-4.3 1.3-5 4 1-1.3 2.2-1.8 3.5-1.5.8.2 1.3.7 1.9 1.4 1 1 2 2.1 4.3 2.1 2.7 0 4.3-1.3 5-4-1 1.3-2.2 1.8-3.5 1.5-.8-.2-1.3-.7-1.9-1.4C15.3 7.1 14.3 6 12 6zM7 12c-2.7 0-4.3 1.3-5 4 1-1.3 2.2-1.8 3.5-1.5.8.2 1.3.7 1.9 1.4 1 1 2 2.1 4.3 2.1 2.7 0 4.3-1.3 5-4-1 1.3-2.2 1.8-3.5 1.5-.8-.2-1.3-.7-1.9-1.4C10.3 13.1 9.3 12 7 12z" fill="#000000"/></svg>"##;
const MATERIAL_UI: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path d="M1 4.5l6 3.5v7l-6-3.5zM7 8l6-3.5v7L7 15zM13 4.5l6-3.5v7l-6 3.5zM19 8l4-2.3v7L19 15zM7 15l6 3.5 6-3.5v3.5L13 22l-6-3.5z" fill="#000000"/></svg>"##;
const PRISMIC: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path d="M4 4h10a6 6 0 0 1 0 12H9v4H4z" fill="none" stroke="#000000" stroke-width="2"/></svg>"##;
const GO: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path d="M1 10h5M2 13h4M11 8a4 4 0 1 0 3.5 6H11" fill="none" stroke="#000000" stroke-width="1.6"/><circle cx="19" cy="12" r="4" fill="none" stroke="#000000" stroke-width="1.6"/></svg>"##;

impl BadgeCatalog {
    /// The built-in technology catalog.
    pub fn builtin() -> Self {
        Self::new([
            Badge::new("React", REACT),
            Badge::new("Next.js", NEXT),
            Badge::new("Typescript", TYPESCRIPT),
            Badge::new("Redux", REDUX),
            Badge::new("Tailwind CSS", TAILWIND),
            Badge::new("Material UI", MATERIAL_UI),
            Badge::new("Prismic", PRISMIC),
            Badge::new("Go", GO),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_lookup() {
        let catalog = BadgeCatalog::builtin();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get("react").unwrap().id(), "React");
        assert_eq!(catalog.get("Tailwind CSS").unwrap().label(), "Tailwind CSS");
        assert!(catalog.get("Cobol").is_none());
    }

    #[test]
    fn badges_compare_by_identifier() {
        let a = Badge::new("Go", "<svg/>");
        let b = Badge::new("Go", "<svg></svg>").with_label("Golang");
        assert_eq!(a, b);
        assert_eq!(b.label(), "Golang");
    }

    #[test]
    fn catalog_drops_duplicate_identifiers() {
        let catalog = BadgeCatalog::new([
            Badge::new("Go", "<svg/>"),
            Badge::new("Rust", "<svg/>"),
            Badge::new("Go", "<svg/>"),
        ]);
        let ids: Vec<_> = catalog.iter().map(Badge::id).collect();
        assert_eq!(ids, ["Go", "Rust"]);
    }

    #[test]
    fn builtin_glyphs_render() {
        let rasterizer = crate::layer::SvgRasterizer::new(false);
        for badge in &BadgeCatalog::builtin() {
            let glyph = rasterizer.render_glyph(badge.glyph(), 16, Some("#ffffff"));
            assert!(glyph.is_some(), "{} glyph should render", badge.id());
        }
    }
}
