//! Effective-theme inheritance across the element tree.

use dusk_runtime::{FakeColorsProvider, ThemeManager};
use dusk_tree::theme::{EffectiveTheme, ElementTheme, ThemeKey, ThemePreference};

fn started_manager() -> (ThemeManager, FakeColorsProvider) {
    let provider = FakeColorsProvider::new();
    let mut manager = ThemeManager::new(Box::new(provider.clone()));
    manager.initialize();
    manager.startup_complete().unwrap();
    (manager, provider)
}

#[test]
fn default_elements_follow_application_theme() {
    for (preference, expected) in [
        (ThemePreference::Light, EffectiveTheme::Light),
        (ThemePreference::Dark, EffectiveTheme::Dark),
    ] {
        let (mut manager, _provider) = started_manager();
        manager.set_application_theme(Some(preference)).unwrap();

        let root = manager.create_element(None).unwrap();
        let child = manager.create_element(Some(root)).unwrap();
        let leaf = manager.create_element(Some(child)).unwrap();

        for id in [root, child, leaf] {
            assert_eq!(manager.actual_theme(id).unwrap(), Some(expected));
        }
    }
}

#[test]
fn dark_override_wins_regardless_of_application_theme() {
    for preference in [ThemePreference::Light, ThemePreference::Dark] {
        let (mut manager, _provider) = started_manager();
        manager.set_application_theme(Some(preference)).unwrap();

        let root = manager.create_element(None).unwrap();
        let element = manager.create_element(Some(root)).unwrap();
        manager
            .set_requested_theme(element, ElementTheme::Dark)
            .unwrap();
        manager.element_ready(element).unwrap();

        assert_eq!(
            manager.actual_theme(element).unwrap(),
            Some(EffectiveTheme::Dark)
        );
    }
}

#[test]
fn override_cascades_to_default_descendants() {
    let (mut manager, _provider) = started_manager();

    let root = manager.create_element(None).unwrap();
    let branch = manager.create_element(Some(root)).unwrap();
    let leaf = manager.create_element(Some(branch)).unwrap();
    manager.element_ready(branch).unwrap();
    manager
        .set_requested_theme(branch, ElementTheme::Dark)
        .unwrap();

    assert_eq!(
        manager.actual_theme(root).unwrap(),
        Some(EffectiveTheme::Light)
    );
    assert_eq!(
        manager.actual_theme(branch).unwrap(),
        Some(EffectiveTheme::Dark)
    );
    assert_eq!(
        manager.actual_theme(leaf).unwrap(),
        Some(EffectiveTheme::Dark)
    );
}

#[test]
fn nested_override_shadows_outer_override() {
    let (mut manager, _provider) = started_manager();

    let outer = manager.create_element(None).unwrap();
    let inner = manager.create_element(Some(outer)).unwrap();
    let leaf = manager.create_element(Some(inner)).unwrap();
    for id in [outer, inner, leaf] {
        manager.element_ready(id).unwrap();
    }
    manager
        .set_requested_theme(outer, ElementTheme::Dark)
        .unwrap();
    manager
        .set_requested_theme(inner, ElementTheme::Light)
        .unwrap();

    assert_eq!(
        manager.actual_theme(outer).unwrap(),
        Some(EffectiveTheme::Dark)
    );
    assert_eq!(
        manager.actual_theme(inner).unwrap(),
        Some(EffectiveTheme::Light)
    );
    assert_eq!(
        manager.actual_theme(leaf).unwrap(),
        Some(EffectiveTheme::Light)
    );
}

#[test]
fn clearing_override_re_inherits() {
    let (mut manager, _provider) = started_manager();

    let root = manager.create_element(None).unwrap();
    manager.element_ready(root).unwrap();
    manager
        .set_requested_theme(root, ElementTheme::Dark)
        .unwrap();
    assert_eq!(
        manager.actual_theme(root).unwrap(),
        Some(EffectiveTheme::Dark)
    );

    manager
        .set_requested_theme(root, ElementTheme::Default)
        .unwrap();
    assert_eq!(
        manager.actual_theme(root).unwrap(),
        Some(EffectiveTheme::Light)
    );
}

#[test]
fn reparenting_re_resolves_the_moved_subtree() {
    let (mut manager, _provider) = started_manager();

    let dark_host = manager.create_element(None).unwrap();
    manager.element_ready(dark_host).unwrap();
    manager
        .set_requested_theme(dark_host, ElementTheme::Dark)
        .unwrap();
    let plain_host = manager.create_element(None).unwrap();

    let widget = manager.create_element(Some(dark_host)).unwrap();
    assert_eq!(
        manager.actual_theme(widget).unwrap(),
        Some(EffectiveTheme::Dark)
    );

    manager.reparent_element(widget, Some(plain_host)).unwrap();
    assert_eq!(
        manager.actual_theme(widget).unwrap(),
        Some(EffectiveTheme::Light)
    );
}

#[test]
fn application_theme_change_swaps_element_dictionaries() {
    let (mut manager, _provider) = started_manager();

    let element = manager.create_element(None).unwrap();
    manager.set_has_theme_resources(element, true).unwrap();
    manager.element_ready(element).unwrap();
    let scope = manager.element_scope(element).unwrap().unwrap();
    assert_eq!(scope.with(|d| d.active_theme()), Some(ThemeKey::Light));

    manager
        .set_application_theme(Some(ThemePreference::Dark))
        .unwrap();

    assert_eq!(scope.with(|d| d.active_theme()), Some(ThemeKey::Dark));
    assert_eq!(
        manager.actual_theme(element).unwrap(),
        Some(EffectiveTheme::Dark)
    );
}

#[test]
fn overridden_elements_keep_their_dictionary_on_app_theme_change() {
    let (mut manager, _provider) = started_manager();

    let element = manager.create_element(None).unwrap();
    manager
        .set_requested_theme(element, ElementTheme::Dark)
        .unwrap();
    manager.set_has_theme_resources(element, true).unwrap();
    manager.element_ready(element).unwrap();
    let scope = manager.element_scope(element).unwrap().unwrap();
    assert_eq!(scope.with(|d| d.active_theme()), Some(ThemeKey::Dark));

    manager
        .set_application_theme(Some(ThemePreference::Dark))
        .unwrap();
    manager
        .set_application_theme(Some(ThemePreference::Light))
        .unwrap();

    // The override pins the element to Dark through both app changes.
    assert_eq!(scope.with(|d| d.active_theme()), Some(ThemeKey::Dark));
    assert_eq!(
        manager.actual_theme(element).unwrap(),
        Some(EffectiveTheme::Dark)
    );
}
