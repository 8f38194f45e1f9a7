// ── Rendering seam ──

use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Local};

use crate::board::{CompanyOptions, DeviceBoard};

/// What the dashboard needs from a front end.
///
/// Implementations own all presentation state (skeleton blocks, toast
/// timers, cosmetic decorations). Nothing flows back from the view into
/// the dashboard's state.
pub trait DashboardView {
    /// Replace the company selector entries.
    fn render_company_options(&mut self, options: &CompanyOptions);

    /// Replace the card grid, summary and empty-state notice.
    fn render_devices(&mut self, board: &DeviceBoard);

    /// Show or hide the loading skeletons. Showing also hides the card grid.
    fn set_loading(&mut self, show: bool);

    /// Queue a transient notice.
    fn toast(&mut self, message: String);

    /// Record when device data was last applied.
    fn set_last_updated(&mut self, at: DateTime<Local>);

    /// Label of the pause control (`Pause` or `Resume`).
    fn set_pause_label(&mut self, label: &'static str);
}

/// Holds the loading indicator up for as long as it lives.
///
/// Dropping the guard hides the indicator, so it is released on every exit
/// path: success, `?` propagation and future cancellation alike.
pub struct LoadingGuard<'a, V: DashboardView + ?Sized> {
    view: &'a mut V,
}

impl<'a, V: DashboardView + ?Sized> LoadingGuard<'a, V> {
    /// Show the indicator and take responsibility for hiding it.
    pub fn acquire(view: &'a mut V) -> Self {
        view.set_loading(true);
        Self { view }
    }

    /// Take responsibility for an indicator that is already showing.
    pub fn adopt(view: &'a mut V) -> Self {
        Self { view }
    }
}

impl<V: DashboardView + ?Sized> Deref for LoadingGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view
    }
}

impl<V: DashboardView + ?Sized> DerefMut for LoadingGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view
    }
}

impl<V: DashboardView + ?Sized> Drop for LoadingGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Loading(Vec<bool>);

    impl DashboardView for Loading {
        fn render_company_options(&mut self, _: &CompanyOptions) {}
        fn render_devices(&mut self, _: &DeviceBoard) {}
        fn set_loading(&mut self, show: bool) {
            self.0.push(show);
        }
        fn toast(&mut self, _: String) {}
        fn set_last_updated(&mut self, _: DateTime<Local>) {}
        fn set_pause_label(&mut self, _: &'static str) {}
    }

    fn fails(view: &mut Loading) -> Result<(), &'static str> {
        let _guard = LoadingGuard::acquire(view);
        let fetched: Result<u8, &'static str> = Err("boom");
        fetched?;
        Ok(())
    }

    #[test]
    fn guard_releases_on_error_path() {
        let mut view = Loading::default();
        assert!(fails(&mut view).is_err());
        assert_eq!(view.0, vec![true, false]);
    }

    #[test]
    fn adopted_guard_only_releases() {
        let mut view = Loading::default();
        drop(LoadingGuard::adopt(&mut view));
        assert_eq!(view.0, vec![false]);
    }
}
