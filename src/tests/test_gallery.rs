#[cfg(test)]
mod tests {
    use crate::animation::TimedAnimation;
    use crate::config::AppConfig;
    use crate::events::StateChange;
    use crate::favorites::FavoritesStore;
    use crate::routing::{Navigator, Route};
    use crate::tests::common::{ms, starter_catalog, TestGallery};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn animated(config: AppConfig) -> TestGallery {
        let gate = Arc::new(TimedAnimation::from_settings(&config.animation));
        TestGallery::build(starter_catalog(), "/", gate, config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_random_list_loads_on_start() {
        let config = AppConfig {
            random_count: 2,
            ..AppConfig::default()
        };
        let mut gallery = TestGallery::build(
            starter_catalog().with_delay("random", 200),
            "/",
            Arc::new(crate::animation::NoAnimation),
            config,
        );

        gallery.app.start();
        assert!(gallery.app.is_loading());
        gallery.pump(ms(500)).await;

        assert!(!gallery.app.is_loading());
        let ids: Vec<u32> = gallery.app.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 25]);
        assert_eq!(gallery.app.displayed().len(), 2);
        assert_eq!(
            gallery.render.changes(),
            vec![StateChange::List, StateChange::List]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_random_load_clears_loading() {
        let mut gallery = TestGallery::new(starter_catalog().failing("random"), "/");
        gallery.app.start();
        gallery.pump(ms(500)).await;

        assert!(!gallery.app.is_loading());
        assert!(gallery.app.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_gates_navigation() {
        let mut gallery = animated(AppConfig::default());
        gallery.app.start();
        gallery.pump(ms(100)).await;

        gallery.app.go_to_details("Pikachu");
        assert!(gallery.app.show_animation());
        assert_eq!(gallery.nav.current(), Route::List);

        gallery.pump(ms(1000)).await;
        assert!(gallery.app.show_animation());
        assert_eq!(gallery.nav.current(), Route::List);
        assert!(gallery.modal.ops().is_empty());

        gallery.pump(ms(1000)).await;
        assert!(!gallery.app.show_animation());
        assert_eq!(gallery.nav.current(), Route::detail("pikachu"));
        assert_eq!(gallery.visible(), vec!["pikachu"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_card_click_replaces_pending_transition() {
        let mut gallery = animated(AppConfig::default());
        gallery.app.start();

        gallery.app.go_to_details("pikachu");
        gallery.pump(ms(500)).await;
        gallery.app.go_to_details("eevee");
        gallery.pump(ms(3000)).await;

        assert_eq!(gallery.nav.current(), Route::detail("eevee"));
        assert_eq!(gallery.visible(), vec!["eevee"]);
        // "/" then "/pokemon/eevee"; the first click never navigated.
        assert_eq!(gallery.nav.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_during_animation_drops_pending_detail() {
        let config = AppConfig::default();
        let gate = Arc::new(TimedAnimation::from_settings(&config.animation));
        let mut gallery = TestGallery::build(starter_catalog(), "/pokemon/pikachu", gate, config);
        gallery.app.start();
        gallery.pump(ms(200)).await;
        assert_eq!(gallery.visible(), vec!["pikachu"]);

        gallery.app.go_to_details("eevee");
        gallery.pump(ms(300)).await;
        assert!(gallery.modal.dismiss());
        gallery.pump(ms(3000)).await;

        assert!(!gallery.app.show_animation());
        assert_eq!(gallery.nav.current(), Route::List);
        assert!(gallery.visible().is_empty());
        assert_eq!(gallery.catalog.calls_to("record"), vec!["pikachu"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_animation_tasks_are_reaped() {
        let mut gallery = TestGallery::new(starter_catalog(), "/");
        gallery.app.start();
        gallery.pump(ms(100)).await;

        for name in ["bulbasaur", "pikachu", "eevee"] {
            gallery.app.go_to_details(name);
            gallery.pump(ms(100)).await;
        }
        assert_eq!(gallery.app.task_count(), 1);
        assert_eq!(gallery.nav.current(), Route::detail("eevee"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_results_replace_the_list_view() {
        let mut gallery = TestGallery::new(starter_catalog(), "/");
        gallery.app.start();
        gallery.pump(ms(100)).await;
        assert_eq!(gallery.app.displayed().len(), 3);

        gallery.app.search_input("Eevee");
        gallery.pump(ms(1000)).await;
        let shown: Vec<&str> = gallery
            .app
            .displayed()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(shown, vec!["eevee"]);
        assert!(gallery.render.changes().contains(&StateChange::Search));

        gallery.app.search_input("");
        gallery.pump(ms(1000)).await;
        assert_eq!(gallery.app.displayed().len(), 3);
    }

    #[tokio::test]
    async fn test_favorites_toggle_and_persist() {
        let mut gallery = TestGallery::new(starter_catalog(), "/");

        assert!(gallery.app.toggle_favorite(25));
        assert!(gallery.app.toggle_favorite(133));
        assert!(gallery.app.is_favorite(25));
        assert_eq!(gallery.store.load().unwrap(), vec![25, 133]);

        assert!(!gallery.app.toggle_favorite(25));
        assert_eq!(gallery.app.favorites().ids(), &[133]);
        assert_eq!(gallery.store.raw().as_deref(), Some("[133]"));
        assert_eq!(
            gallery.render.changes(),
            vec![StateChange::Favorites; 3]
        );
    }
}
