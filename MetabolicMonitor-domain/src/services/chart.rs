use std::ops::RangeInclusive;

use chrono::NaiveDate;
use metabolic_monitor_data::{ApiError, HealthApiTrait};
use tracing::{debug, info, warn};

use crate::entities::chart::{
    ChartPoint, DomainBound, HealthStatus, Selection, ValueBound, ZoomWindow, VALUE_AXIS_PADDING,
};
use crate::entities::conversions::{convert_to_domain_readings, parse_reading_date};
use crate::entities::reading::Reading;
use crate::services::insights::categorize_hba1c;
use crate::services::refresh::{RefreshToken, RefreshTracker};

/// Project readings into the plotted HbA1c series
///
/// Readings without an HbA1c value or with an unreadable date are dropped.
/// The result is strictly ascending by date; when two readings share a date
/// the later one in the input wins.
pub fn project_series(readings: &[Reading]) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = readings
        .iter()
        .filter_map(|reading| {
            let value = reading.values.hba1c?;
            match parse_reading_date(&reading.date) {
                Some(date) => Some(ChartPoint::new(date, value)),
                None => {
                    warn!(date = %reading.date, "Skipping reading with unreadable date");
                    None
                }
            }
        })
        .collect();

    // Stable, so duplicates keep their input order
    points.sort_by_key(|point| point.date);

    let mut series: Vec<ChartPoint> = Vec::with_capacity(points.len());
    for point in points {
        match series.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => series.push(point),
        }
    }
    series
}

/// Load the full reading history and project it
pub async fn load_series(api: &dyn HealthApiTrait) -> Result<Vec<ChartPoint>, ApiError> {
    let readings = convert_to_domain_readings(api.get_readings().await?);
    let series = project_series(&readings);
    debug!(readings = readings.len(), points = series.len(), "Series loaded");
    Ok(series)
}

/// State of the HbA1c time-series chart
///
/// Holds the plotted series, the committed view window, and the drag
/// selection in progress. The status always reflects the last point of the
/// full series, whatever the window shows.
#[derive(Debug, Default)]
pub struct ChartState {
    points: Vec<ChartPoint>,
    window: ZoomWindow,
    selection: Selection,
    loading: bool,
    last_error: Option<String>,
    refresh: RefreshTracker,
}

impl ChartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn window(&self) -> ZoomWindow {
        self.window
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed refresh, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Classification of the latest value in the full series
    pub fn status(&self) -> HealthStatus {
        categorize_hba1c(self.points.last().map(|point| point.value))
    }

    /// Start a refresh; only the returned token's result will be applied
    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.loading = true;
        self.refresh.issue()
    }

    /// Apply a refresh result; returns `false` if it was superseded
    pub fn apply_refresh(
        &mut self,
        token: RefreshToken,
        result: Result<Vec<ChartPoint>, ApiError>,
    ) -> bool {
        if !self.refresh.is_current(token) {
            debug!(token = token.value(), "Discarding stale chart refresh");
            return false;
        }

        self.loading = false;
        match result {
            Ok(points) => {
                self.replace_series(points);
                self.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Chart refresh failed, keeping previous series");
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Replace the series wholesale
    pub fn replace_series(&mut self, points: Vec<ChartPoint>) {
        info!(points = points.len(), status = %categorize_hba1c(points.last().map(|p| p.value)), "Chart series replaced");
        self.points = points;
    }

    /// Index of a date in the series
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by_key(&date, |point| point.date).ok()
    }

    /// Date of the point at `index`
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.points.get(index).map(|point| point.date)
    }

    /// Pointer pressed over `date`, or outside any point
    pub fn pointer_down(&mut self, date: Option<NaiveDate>) {
        self.selection = Selection {
            left: date,
            right: None,
        };
    }

    /// Pointer dragged over `date`
    pub fn pointer_move(&mut self, date: Option<NaiveDate>) {
        if self.selection.is_active() && date.is_some() {
            self.selection.right = date;
        }
    }

    /// Pointer released; returns whether a new window was committed
    pub fn pointer_up(&mut self) -> bool {
        let selection = std::mem::take(&mut self.selection);
        let (left, right) = match (selection.left, selection.right) {
            (Some(left), Some(right)) if left != right => (left, right),
            _ => return false,
        };

        let (left_index, right_index) = match (self.index_of(left), self.index_of(right)) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                debug!(%left, %right, "Selection anchor no longer in series");
                return false;
            }
        };

        let (first, last) = if left_index <= right_index {
            (left, right)
        } else {
            (right, left)
        };
        self.window = ZoomWindow {
            left: DomainBound::Date(first),
            right: DomainBound::Date(last),
            bottom: ValueBound::Auto,
            top: ValueBound::Auto,
        };
        debug!(%first, %last, "Zoom window committed");
        true
    }

    /// Abandon the selection in progress, keeping the window
    pub fn cancel_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Restore the full range and drop any selection in progress
    pub fn reset_zoom(&mut self) {
        self.window = ZoomWindow::FULL_RANGE;
        self.selection = Selection::default();
    }

    /// Index range covered by the window
    ///
    /// A bound whose date has vanished from the series falls back to the
    /// series extent on that side.
    pub fn visible_range(&self) -> Option<RangeInclusive<usize>> {
        let last = self.points.len().checked_sub(1)?;
        let resolve = |bound: DomainBound, fallback: usize| match bound {
            DomainBound::Auto => fallback,
            DomainBound::Date(date) => self.index_of(date).unwrap_or(fallback),
        };
        let start = resolve(self.window.left, 0);
        let end = resolve(self.window.right, last);
        Some(start.min(end)..=start.max(end))
    }

    pub fn visible_points(&self) -> &[ChartPoint] {
        match self.visible_range() {
            Some(range) => &self.points[range],
            None => &[],
        }
    }

    /// First and last visible dates
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let visible = self.visible_points();
        Some((visible.first()?.date, visible.last()?.date))
    }

    /// Value axis bounds for the visible points
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let visible = self.visible_points();
        if visible.is_empty() {
            return None;
        }
        let min = visible.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = visible.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);

        let bottom = match self.window.bottom {
            ValueBound::Auto => min - VALUE_AXIS_PADDING,
            ValueBound::Value(v) => v,
        };
        let top = match self.window.top {
            ValueBound::Auto => max + VALUE_AXIS_PADDING,
            ValueBound::Value(v) => v,
        };
        Some((bottom, top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::reading::BiomarkerValues;
    use metabolic_monitor_data::repository::tests::{sample_readings, unavailable, MockHealthApi};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn reading(date: &str, hba1c: Option<f64>) -> Reading {
        Reading::new(
            date,
            BiomarkerValues {
                hba1c,
                ..Default::default()
            },
        )
    }

    fn state_with(values: &[(u32, f64)]) -> ChartState {
        let mut state = ChartState::new();
        state.replace_series(values.iter().map(|(d, v)| ChartPoint::new(day(*d), *v)).collect());
        state
    }

    #[test]
    fn test_projection_filters_and_sorts() {
        let readings = vec![
            reading("2024-03-01", Some(6.0)),
            reading("2024-01-01", Some(5.0)),
            reading("2024-02-01", None),
            reading("garbage", Some(9.9)),
        ];
        let series = project_series(&readings);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 5.0);
        assert_eq!(series[1].value, 6.0);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_projection_duplicate_date_last_wins() {
        let readings = vec![
            reading("2024-01-05", Some(5.0)),
            reading("2024-01-01", Some(4.0)),
            reading("2024-01-05T09:00:00Z", Some(7.0)),
        ];
        let series = project_series(&readings);

        assert_eq!(series.len(), 2);
        assert_eq!(series[1].date, day(5));
        assert_eq!(series[1].value, 7.0);
    }

    #[test]
    fn test_status_from_full_series_not_window() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2), (3, 6.8)]);
        state.pointer_down(Some(day(1)));
        state.pointer_move(Some(day(2)));
        assert!(state.pointer_up());

        assert_eq!(state.visible_points().len(), 2);
        assert_eq!(state.status(), HealthStatus::High);
    }

    #[test]
    fn test_empty_series_has_no_data_status() {
        let state = ChartState::new();
        assert_eq!(state.status(), HealthStatus::NoData);
        assert!(state.visible_points().is_empty());
        assert_eq!(state.value_bounds(), None);
    }

    #[test]
    fn test_equal_anchors_are_a_noop() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2)]);
        state.pointer_down(Some(day(2)));
        state.pointer_move(Some(day(2)));

        assert!(!state.pointer_up());
        assert!(state.window().is_full_range());
        assert!(!state.selection().is_active());
    }

    #[test]
    fn test_missing_right_anchor_is_a_noop() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2)]);
        state.pointer_down(Some(day(1)));
        assert!(!state.pointer_up());
        assert!(state.window().is_full_range());
    }

    #[test]
    fn test_move_without_anchor_is_ignored() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2)]);
        state.pointer_down(None);
        state.pointer_move(Some(day(2)));
        assert_eq!(state.selection(), Selection::default());
    }

    #[test]
    fn test_reverse_drag_orders_anchors() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2), (3, 5.4), (4, 5.6)]);
        state.pointer_down(Some(day(3)));
        state.pointer_move(Some(day(4)));
        state.pointer_move(Some(day(2)));
        assert!(state.pointer_up());

        assert_eq!(state.window().left, DomainBound::Date(day(2)));
        assert_eq!(state.window().right, DomainBound::Date(day(3)));
        assert_eq!(state.window().bottom, ValueBound::Auto);
        assert_eq!(state.date_bounds(), Some((day(2), day(3))));
    }

    #[test]
    fn test_vanished_anchor_keeps_prior_window() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2), (3, 5.4)]);
        state.pointer_down(Some(day(1)));
        state.pointer_move(Some(day(9)));
        assert!(!state.pointer_up());
        assert!(state.window().is_full_range());
    }

    #[test]
    fn test_reset_restores_sentinels() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2), (3, 5.4)]);
        state.pointer_down(Some(day(1)));
        state.pointer_move(Some(day(2)));
        state.pointer_up();
        state.pointer_down(Some(day(2)));

        state.reset_zoom();

        assert_eq!(state.window(), ZoomWindow::FULL_RANGE);
        assert!(!state.selection().is_active());
        assert_eq!(state.visible_points().len(), 3);
    }

    #[test]
    fn test_value_bounds_are_padded() {
        let state = state_with(&[(1, 5.0), (2, 6.5)]);
        assert_eq!(state.value_bounds(), Some((4.0, 7.5)));
    }

    #[test]
    fn test_window_degrades_when_date_vanishes() {
        let mut state = state_with(&[(1, 5.0), (2, 5.2), (3, 5.4), (4, 5.6)]);
        state.pointer_down(Some(day(2)));
        state.pointer_move(Some(day(3)));
        state.pointer_up();

        state.replace_series(vec![
            ChartPoint::new(day(1), 5.0),
            ChartPoint::new(day(2), 5.2),
            ChartPoint::new(day(4), 5.6),
        ]);

        assert_eq!(state.date_bounds(), Some((day(2), day(4))));
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let mut state = ChartState::new();
        let stale = state.begin_refresh();
        let current = state.begin_refresh();

        assert!(state.apply_refresh(current, Ok(vec![ChartPoint::new(day(2), 6.0)])));
        assert!(!state.apply_refresh(stale, Ok(vec![ChartPoint::new(day(1), 5.0)])));

        assert_eq!(state.points().len(), 1);
        assert_eq!(state.points()[0].date, day(2));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_failed_refresh_keeps_series() {
        let mut state = state_with(&[(1, 5.0)]);
        let token = state.begin_refresh();
        assert!(state.apply_refresh(token, Err(unavailable("GET /api/readings"))));

        assert_eq!(state.points().len(), 1);
        assert!(state.last_error().is_some());
    }

    #[tokio::test]
    async fn test_load_series_from_api() {
        let mut api = MockHealthApi::new();
        api.expect_get_readings()
            .times(1)
            .returning(|| Ok(sample_readings()));

        let series = load_series(&api).await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Jan 5, 2024");
        assert_eq!(series[1].label, "Mar 10, 2024");
    }
}
