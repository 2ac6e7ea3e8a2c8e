use super::*;
use crate::types::{Content, Entry, MemoryId};

mod common {
    use super::*;

    /// Registry holding `texts` oldest → newest; names starting with `*` are favorites.
    pub(super) fn registry_with(texts: &[&str]) -> (Registry, Vec<EntryId>) {
        let mut registry = Registry::new();
        let ids = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let favorite = text.starts_with('*');
                let content = Content::text(text.trim_start_matches('*')).unwrap();
                let (id, _) = registry.insert_newest(Entry::new(MemoryId(i as u64 + 1), content));
                registry.set_favorite(id, favorite);
                id
            })
            .collect();
        (registry, ids)
    }

    pub(super) fn labels(window: &PaginationWindow, registry: &Registry) -> Vec<String> {
        window
            .slots()
            .iter()
            .map(|id| registry.get(*id).unwrap().content().as_text().to_string())
            .collect()
    }
}

mod binding {
    use super::common::{labels, registry_with};
    use super::*;

    #[test]
    fn test_bind_front_puts_newest_on_top() {
        let (registry, ids) = registry_with(&["a", "b", "c"]);
        let mut window = PaginationWindow::new(5);
        for id in &ids {
            window.bind_front(*id);
        }

        assert_eq!(labels(&window, &registry), ["c", "b", "a"]);
    }

    #[test]
    fn test_bind_front_of_bound_entry_moves_it() {
        let (registry, ids) = registry_with(&["a", "b", "c"]);
        let mut window = PaginationWindow::new(5);
        window.fill(&registry);

        window.bind_front(ids[0]);

        assert_eq!(labels(&window, &registry), ["a", "c", "b"]);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_reclaim_releases_slots_beyond_one_page() {
        let (registry, ids) = registry_with(&["a", "b", "c", "d"]);
        let mut window = PaginationWindow::new(2);
        for id in &ids[..3] {
            window.bind_front(*id);
        }
        assert_eq!(window.len(), 3);

        window.bind_front(ids[3]);

        assert_eq!(labels(&window, &registry), ["d", "c"]);
    }

    #[test]
    fn test_unbind_and_restore() {
        let (registry, ids) = registry_with(&["a", "*f", "b", "c"]);
        let mut window = PaginationWindow::new(2);
        window.bind_front(ids[3]);

        assert!(!window.restore(&registry));
        assert!(window.unbind(ids[3]));
        assert!(!window.unbind(ids[3]));
        assert!(window.is_empty());

        assert!(window.restore(&registry));
        assert_eq!(labels(&window, &registry), ["c", "b"]);
    }

    #[test]
    fn test_fill_skips_favorites() {
        let (registry, _) = registry_with(&["a", "b", "*f", "c"]);
        let mut window = PaginationWindow::new(10);
        window.fill(&registry);

        assert_eq!(labels(&window, &registry), ["c", "b", "a"]);
    }

    #[test]
    fn test_restore_on_empty_registry_binds_nothing() {
        let registry = Registry::new();
        let mut window = PaginationWindow::new(3);

        assert!(!window.restore(&registry));
        assert!(window.is_empty());
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(PaginationWindow::new(0).page_size(), 1);
    }
}

mod paging {
    use super::common::{labels, registry_with};
    use super::*;

    #[test]
    fn test_step_older_walks_to_next_page() {
        let (registry, _) = registry_with(&["a", "b", "c", "d", "e", "f"]);
        let mut window = PaginationWindow::new(2);
        window.fill(&registry);
        assert_eq!(labels(&window, &registry), ["f", "e"]);

        assert!(window.step_older(&registry));
        assert_eq!(labels(&window, &registry), ["d", "c"]);

        assert!(window.step_older(&registry));
        assert_eq!(labels(&window, &registry), ["b", "a"]);
    }

    #[test]
    fn test_step_older_wraps_to_newest() {
        let (registry, _) = registry_with(&["a", "b", "c", "d"]);
        let mut window = PaginationWindow::new(2);
        window.fill(&registry);
        window.step_older(&registry);

        window.step_older(&registry);

        assert_eq!(labels(&window, &registry), ["d", "c"]);
    }

    #[test]
    fn test_step_newer_is_inverse_of_step_older() {
        let (registry, _) = registry_with(&["a", "b", "c", "d", "e", "f"]);
        let mut window = PaginationWindow::new(2);
        window.fill(&registry);
        window.step_older(&registry);

        assert!(window.step_newer(&registry));

        assert_eq!(labels(&window, &registry), ["f", "e"]);
    }

    #[test]
    fn test_paging_skips_favorites() {
        let (registry, _) = registry_with(&["a", "*x", "b", "*y", "c", "d"]);
        let mut window = PaginationWindow::new(2);
        window.fill(&registry);

        window.step_older(&registry);

        assert_eq!(labels(&window, &registry), ["b", "a"]);
    }

    #[test]
    fn test_paging_stops_on_wrap_with_short_history() {
        let (registry, _) = registry_with(&["*x", "a", "*y"]);
        let mut window = PaginationWindow::new(3);
        window.fill(&registry);

        assert!(!window.step_older(&registry));
        assert!(!window.step_newer(&registry));
        assert_eq!(labels(&window, &registry), ["a"]);
    }

    #[test]
    fn test_paging_does_not_change_registry_order() {
        let (registry, _) = registry_with(&["a", "b", "c", "d", "e"]);
        let before: Vec<_> = registry.iter().map(|(id, _)| id).collect();
        let mut window = PaginationWindow::new(2);
        window.fill(&registry);

        window.step_older(&registry);
        window.step_newer(&registry);
        window.step_newer(&registry);

        let after: Vec<_> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_paging_empty_window_is_noop() {
        let (registry, _) = registry_with(&["a"]);
        let mut window = PaginationWindow::new(2);

        assert!(!window.step_older(&registry));
        assert!(!window.step_newer(&registry));
    }
}
