use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    Direction, DirectionalTimelineSpan, FRACTIONS_PER_BEAT, TimelineSettings, TimelineSpan,
};

/// Scale used to strip binary floating-point drift from pixel/time ratios.
/// Nine decimal digits is finer than any fraction unit yet coarse enough to
/// swallow the error of a handful of float multiplications.
const PRECISION: f64 = 1e9;

/// Rounds `value` to nine decimal digits.
///
/// Ratios such as `margin / beat_width` land a hair below or above an integer
/// at some zoom levels, which makes a plain `floor` pick the wrong beat.
pub fn round_to_precision(value: f64) -> f64 {
    (value * PRECISION).round() / PRECISION
}

/// Which grid line a position should be moved to when snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// Nearest grid line.
    #[default]
    Round,
    /// Grid line at or before the position.
    Floor,
    /// Grid line at or after the position.
    Ceil,
}

/// A point in musical time as `measure.beat.fraction`, 1-indexed, with 1000
/// fraction units per beat.
///
/// `measure` and `beat` may leave their nominal ranges in the middle of a
/// computation; [`TimelinePosition::normalize`] brings them back. The derived
/// `PartialEq` compares fields; use [`TimelinePosition::equals`] to compare
/// absolute time under a given time signature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePosition {
    pub measure: i64,
    pub beat: i64,
    pub fraction: f64,
}

impl TimelinePosition {
    /// The timeline origin, `1.1.0`.
    pub const START: Self = Self {
        measure: 1,
        beat: 1,
        fraction: 0.0,
    };

    pub fn new(measure: i64, beat: i64, fraction: f64) -> Self {
        Self {
            measure,
            beat,
            fraction,
        }
    }

    pub fn start() -> Self {
        Self::START
    }

    /// Linear position in fraction units from the origin. This is the only
    /// basis for ordering and equality.
    pub fn to_fraction(&self, settings: &TimelineSettings) -> f64 {
        settings.fractions_per_measure() * (self.measure - 1) as f64
            + (self.beat - 1) as f64 * FRACTIONS_PER_BEAT
            + self.fraction
    }

    /// Decomposes a signed scalar into whole measures, whole beats and a
    /// fraction remainder under the current time signature.
    pub fn fraction_to_span(value: f64, settings: &TimelineSettings) -> DirectionalTimelineSpan {
        let direction = Direction::from_sign(value);
        let magnitude = value.abs();
        let per_measure = settings.fractions_per_measure();

        let measures = (magnitude / per_measure).floor();
        let rest = magnitude - measures * per_measure;
        let beats = (rest / FRACTIONS_PER_BEAT).floor();
        let fraction = round_to_precision(rest - beats * FRACTIONS_PER_BEAT);

        DirectionalTimelineSpan::new(
            TimelineSpan::new(measures as i64, beats as i64, fraction),
            direction,
        )
    }

    /// The absolute position reached by applying `span` to the origin.
    pub fn from_span(span: DirectionalTimelineSpan, settings: &TimelineSettings) -> Self {
        Self::START.translated(span, settings)
    }

    /// This position as a displacement from the origin.
    pub fn to_span(&self, settings: &TimelineSettings) -> DirectionalTimelineSpan {
        Self::fraction_to_span(self.to_fraction(settings), settings)
    }

    /// Carries fraction overflow into beats and beat overflow into measures.
    /// Floor division keeps negative intermediates correct: beat 0 becomes the
    /// last beat of the previous measure.
    pub fn normalize(&mut self, settings: &TimelineSettings) -> &mut Self {
        self.fraction = round_to_precision(self.fraction);
        let carry = (self.fraction / FRACTIONS_PER_BEAT).floor();
        self.fraction -= carry * FRACTIONS_PER_BEAT;
        self.beat += carry as i64;

        let beats_per_measure = settings.beats_per_measure();
        // A zero-beat signature is a caller error; leave the beat uncarried.
        if beats_per_measure > 0 {
            let zero_based = self.beat - 1;
            self.measure += zero_based.div_euclid(beats_per_measure);
            self.beat = zero_based.rem_euclid(beats_per_measure) + 1;
        }
        self
    }

    pub fn normalized(mut self, settings: &TimelineSettings) -> Self {
        self.normalize(settings);
        self
    }

    /// Moves this position forward by `span` in place.
    pub fn add(&mut self, span: TimelineSpan, settings: &TimelineSettings) -> &mut Self {
        self.fraction += span.fraction;
        self.beat += span.beats;
        self.measure += span.measures;
        self.normalize(settings)
    }

    /// Moves this position backward by `span` in place.
    pub fn subtract(&mut self, span: TimelineSpan, settings: &TimelineSettings) -> &mut Self {
        self.measure -= span.measures;
        self.beat -= span.beats;
        self.fraction -= span.fraction;
        self.normalize(settings)
    }

    pub fn translate(
        &mut self,
        span: DirectionalTimelineSpan,
        settings: &TimelineSettings,
    ) -> &mut Self {
        match span.direction {
            Direction::Forward => self.add(span.span, settings),
            Direction::Backward => self.subtract(span.span, settings),
        }
    }

    pub fn added(mut self, span: TimelineSpan, settings: &TimelineSettings) -> Self {
        self.add(span, settings);
        self
    }

    pub fn subtracted(mut self, span: TimelineSpan, settings: &TimelineSettings) -> Self {
        self.subtract(span, settings);
        self
    }

    pub fn translated(mut self, span: DirectionalTimelineSpan, settings: &TimelineSettings) -> Self {
        self.translate(span, settings);
        self
    }

    /// The signed span that takes `other` to `self`.
    pub fn diff(&self, other: &Self, settings: &TimelineSettings) -> DirectionalTimelineSpan {
        Self::fraction_to_span(
            self.to_fraction(settings) - other.to_fraction(settings),
            settings,
        )
    }

    pub fn compare(&self, other: &Self, settings: &TimelineSettings) -> Ordering {
        self.to_fraction(settings)
            .partial_cmp(&other.to_fraction(settings))
            .unwrap_or(Ordering::Equal)
    }

    pub fn equals(&self, other: &Self, settings: &TimelineSettings) -> bool {
        self.compare(other, settings) == Ordering::Equal
    }

    pub fn max<'a>(positions: &'a [Self], settings: &TimelineSettings) -> Option<&'a Self> {
        positions.iter().max_by(|a, b| a.compare(b, settings))
    }

    pub fn min<'a>(positions: &'a [Self], settings: &TimelineSettings) -> Option<&'a Self> {
        positions.iter().min_by(|a, b| a.compare(b, settings))
    }

    /// Moves this position onto the grid defined by `grid_size`. A zero grid
    /// disables snapping.
    pub fn snap(
        &mut self,
        grid_size: TimelineSpan,
        mode: SnapMode,
        settings: &TimelineSettings,
    ) -> &mut Self {
        let size = Self::from_span(grid_size.forward(), settings).to_fraction(settings);
        if size > 0.0 {
            let ratio = round_to_precision(self.to_fraction(settings) / size);
            let steps = match mode {
                SnapMode::Round => ratio.round(),
                SnapMode::Floor => ratio.floor(),
                SnapMode::Ceil => ratio.ceil(),
            };
            *self = Self::from_span(Self::fraction_to_span(steps * size, settings), settings);
        }
        self
    }

    pub fn snapped(
        mut self,
        grid_size: TimelineSpan,
        mode: SnapMode,
        settings: &TimelineSettings,
    ) -> Self {
        self.snap(grid_size, mode, settings);
        self
    }

    /// Horizontal pixel offset of this position from the origin.
    pub fn to_margin(&self, settings: &TimelineSettings) -> f64 {
        let beat_width = settings.beat_width();
        let measure_width = settings.measure_width();
        let DirectionalTimelineSpan { span, direction } = self.to_span(settings);

        let margin = span.measures as f64 * measure_width
            + span.beats as f64 * beat_width
            + span.fraction / FRACTIONS_PER_BEAT * beat_width;
        round_to_precision(direction.signum() * margin)
    }

    /// Inverse of [`TimelinePosition::to_margin`].
    pub fn from_margin(margin: f64, settings: &TimelineSettings) -> Self {
        let beat_width = settings.beat_width();
        let measure_width = settings.measure_width();
        let direction = Direction::from_sign(margin);
        let magnitude = margin.abs();

        let measures = round_to_precision(magnitude / measure_width).floor();
        let rest = magnitude - measures * measure_width;
        let beats = round_to_precision(rest / beat_width).floor();
        let rest = rest - beats * beat_width;
        let fraction = round_to_precision(rest / beat_width * FRACTIONS_PER_BEAT);

        Self::from_span(
            DirectionalTimelineSpan::new(
                TimelineSpan::new(measures as i64, beats as i64, fraction),
                direction,
            ),
            settings,
        )
    }

    /// Wall-clock offset from the origin. Tempo counts quarter notes, so beats
    /// are scaled by the note value first.
    pub fn to_seconds(&self, settings: &TimelineSettings) -> f64 {
        let beats = self.to_fraction(settings) / FRACTIONS_PER_BEAT;
        let quarter_notes = beats * settings.time_signature.quarter_notes_per_beat();
        quarter_notes / settings.beats_per_second()
    }
}

impl Default for TimelinePosition {
    fn default() -> Self {
        Self::START
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn four_four() -> TimelineSettings {
        TimelineSettings::new(1.0, (4, 4), 120.0)
    }

    fn sample_positions() -> Vec<TimelinePosition> {
        vec![
            TimelinePosition::START,
            TimelinePosition::new(1, 1, 1.0),
            TimelinePosition::new(1, 3, 999.0),
            TimelinePosition::new(2, 1, 0.0),
            TimelinePosition::new(3, 2, 500.0),
            TimelinePosition::new(17, 3, 250.0),
        ]
    }

    #[test]
    fn test_to_fraction() {
        let settings = four_four();
        let pos = TimelinePosition::new(3, 2, 500.0);
        assert_eq!(pos.to_fraction(&settings), 9500.0);
        assert_eq!(TimelinePosition::START.to_fraction(&settings), 0.0);
    }

    #[test]
    fn test_to_fraction_uses_current_signature() {
        let pos = TimelinePosition::new(2, 1, 0.0);
        assert_eq!(pos.to_fraction(&TimelineSettings::new(1.0, (3, 4), 120.0)), 3000.0);
        assert_eq!(pos.to_fraction(&TimelineSettings::new(1.0, (7, 8), 120.0)), 7000.0);
    }

    #[test]
    fn test_add_carries_fraction_and_beats() {
        let settings = four_four();
        let mut pos = TimelinePosition::new(1, 4, 900.0);
        pos.add(TimelineSpan::fraction(200.0), &settings);
        assert_eq!(pos, TimelinePosition::new(2, 1, 100.0));

        pos.add(TimelineSpan::new(1, 7, 0.0), &settings);
        assert_eq!(pos, TimelinePosition::new(4, 4, 100.0));
    }

    #[test]
    fn test_subtract_borrows_into_previous_measure() {
        let settings = four_four();
        let mut pos = TimelinePosition::new(2, 1, 0.0);
        pos.subtract(TimelineSpan::beats(1), &settings);
        assert_eq!(pos, TimelinePosition::new(1, 4, 0.0));

        let mut pos = TimelinePosition::new(1, 2, 0.0);
        pos.subtract(TimelineSpan::fraction(250.0), &settings);
        assert_eq!(pos, TimelinePosition::new(1, 1, 750.0));
    }

    #[test]
    fn test_subtract_past_origin_goes_below_measure_one() {
        let settings = four_four();
        let pos = TimelinePosition::START.subtracted(TimelineSpan::beats(1), &settings);
        assert_eq!(pos, TimelinePosition::new(0, 4, 0.0));
        assert_eq!(pos.to_fraction(&settings), -1000.0);
    }

    #[test]
    fn test_normalize_beat_zero() {
        let settings = TimelineSettings::new(1.0, (3, 4), 120.0);
        let mut pos = TimelinePosition::new(5, 0, 0.0);
        pos.normalize(&settings);
        assert_eq!(pos, TimelinePosition::new(4, 3, 0.0));

        let pos = TimelinePosition::new(1, 8, 1500.0).normalized(&settings);
        assert_eq!(pos, TimelinePosition::new(3, 3, 500.0));
    }

    #[test]
    fn test_normalize_with_zero_beat_signature_does_not_panic() {
        let settings = TimelineSettings::new(1.0, (0, 4), 120.0);
        let pos = TimelinePosition::new(1, 5, 0.0).normalized(&settings);
        assert_eq!(pos.beat, 5);
    }

    #[test]
    fn test_add_then_subtract_is_identity() {
        let spans = [
            TimelineSpan::zero(),
            TimelineSpan::fraction(999.0),
            TimelineSpan::new(0, 5, 1.0),
            TimelineSpan::new(3, 2, 750.0),
            TimelineSpan::new(12, 0, 0.0),
        ];
        for signature in [(4, 4), (3, 4), (7, 8)] {
            let settings = TimelineSettings::new(1.0, signature, 120.0);
            for pos in sample_positions() {
                let pos = pos.normalized(&settings);
                for span in spans {
                    let mut moved = pos;
                    moved.add(span, &settings).subtract(span, &settings);
                    assert!(
                        moved.equals(&pos, &settings),
                        "{pos:?} + {span:?} - {span:?} gave {moved:?} in {signature:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_pure_variants_leave_receiver_untouched() {
        let settings = four_four();
        let pos = TimelinePosition::new(2, 2, 0.0);
        let moved = pos.added(TimelineSpan::beats(1), &settings);
        let back = pos.subtracted(TimelineSpan::beats(1), &settings);

        assert_eq!(pos, TimelinePosition::new(2, 2, 0.0));
        assert_eq!(moved, TimelinePosition::new(2, 3, 0.0));
        assert_eq!(back, TimelinePosition::new(2, 1, 0.0));
    }

    #[test]
    fn test_in_place_variants_chain() {
        let settings = four_four();
        let mut pos = TimelinePosition::START;
        pos.add(TimelineSpan::measures(2), &settings)
            .add(TimelineSpan::beats(1), &settings)
            .subtract(TimelineSpan::fraction(500.0), &settings);
        assert_eq!(pos, TimelinePosition::new(3, 1, 500.0));
    }

    #[test]
    fn test_translate_respects_direction() {
        let settings = four_four();
        let span = TimelineSpan::new(1, 1, 0.0);
        let pos = TimelinePosition::new(3, 3, 0.0);
        assert_eq!(pos.translated(span.forward(), &settings), TimelinePosition::new(4, 4, 0.0));
        assert_eq!(pos.translated(span.backward(), &settings), TimelinePosition::new(2, 2, 0.0));
    }

    #[test]
    fn test_fraction_to_span_and_back() {
        let settings = TimelineSettings::new(1.0, (3, 4), 120.0);
        let span = TimelinePosition::fraction_to_span(7250.0, &settings);
        assert_eq!(span, TimelineSpan::new(2, 1, 250.0).forward());

        let negative = TimelinePosition::fraction_to_span(-1500.0, &settings);
        assert_eq!(negative, TimelineSpan::new(0, 1, 500.0).backward());

        let pos = TimelinePosition::from_span(span, &settings);
        assert_eq!(pos, TimelinePosition::new(3, 2, 250.0));
        assert_eq!(pos.to_fraction(&settings), 7250.0);
    }

    #[test]
    fn test_diff_is_signed() {
        let settings = four_four();
        let a = TimelinePosition::new(3, 1, 0.0);
        let b = TimelinePosition::new(1, 3, 500.0);

        assert_eq!(a.diff(&b, &settings), TimelineSpan::new(1, 1, 500.0).forward());
        assert_eq!(b.diff(&a, &settings), TimelineSpan::new(1, 1, 500.0).backward());
        assert_eq!(b.translated(a.diff(&b, &settings), &settings), a);
    }

    #[test]
    fn test_ordering_matches_scalar() {
        let settings = TimelineSettings::new(1.0, (5, 8), 120.0);
        let positions = sample_positions();
        for a in &positions {
            for b in &positions {
                let forward = a.compare(b, &settings);
                let backward = b.compare(a, &settings);
                assert_eq!(forward, backward.reverse());
                assert_eq!(
                    forward == Ordering::Greater,
                    a.to_fraction(&settings) > b.to_fraction(&settings)
                );
            }
        }
    }

    #[test]
    fn test_equals_ignores_representation() {
        let settings = four_four();
        let canonical = TimelinePosition::new(2, 1, 0.0);
        let overflowing = TimelinePosition::new(1, 5, 0.0);
        assert!(canonical.equals(&overflowing, &settings));
        assert_ne!(canonical, overflowing);
    }

    #[test]
    fn test_max_min() {
        let settings = four_four();
        let positions = sample_positions();
        assert_eq!(
            TimelinePosition::max(&positions, &settings),
            Some(&TimelinePosition::new(17, 3, 250.0))
        );
        assert_eq!(
            TimelinePosition::min(&positions, &settings),
            Some(&TimelinePosition::START)
        );
        assert_eq!(TimelinePosition::max(&[], &settings), None);
    }

    #[test]
    fn test_snap_modes() {
        let settings = four_four();
        let grid = TimelineSpan::beats(1);
        let pos = TimelinePosition::new(1, 2, 300.0);

        assert_eq!(pos.snapped(grid, SnapMode::Round, &settings), TimelinePosition::new(1, 2, 0.0));
        assert_eq!(pos.snapped(grid, SnapMode::Floor, &settings), TimelinePosition::new(1, 2, 0.0));
        assert_eq!(pos.snapped(grid, SnapMode::Ceil, &settings), TimelinePosition::new(1, 3, 0.0));

        let late = TimelinePosition::new(1, 2, 600.0);
        assert_eq!(late.snapped(grid, SnapMode::Round, &settings), TimelinePosition::new(1, 3, 0.0));
    }

    #[test]
    fn test_snap_modes_before_origin() {
        let settings = four_four();
        let grid = TimelineSpan::beats(1);

        // 0.4.300 sits 700 fractions before the origin
        let pos = TimelinePosition::new(0, 4, 300.0);
        assert_eq!(pos.snapped(grid, SnapMode::Floor, &settings), TimelinePosition::new(0, 4, 0.0));
        assert_eq!(pos.snapped(grid, SnapMode::Ceil, &settings), TimelinePosition::START);
        assert_eq!(pos.snapped(grid, SnapMode::Round, &settings), TimelinePosition::new(0, 4, 0.0));

        let near = TimelinePosition::new(0, 4, 700.0);
        assert_eq!(near.snapped(grid, SnapMode::Round, &settings), TimelinePosition::START);

        // -6750 fractions: floor and ceil borrow across two measures
        let far = TimelinePosition::new(-1, 2, 250.0);
        assert_eq!(far.snapped(grid, SnapMode::Floor, &settings), TimelinePosition::new(-1, 2, 0.0));
        assert_eq!(far.snapped(grid, SnapMode::Ceil, &settings), TimelinePosition::new(-1, 3, 0.0));
    }

    #[test]
    fn test_snap_to_measure_carries() {
        let settings = TimelineSettings::new(1.0, (3, 4), 120.0);
        let pos = TimelinePosition::new(2, 3, 600.0);
        let snapped = pos.snapped(TimelineSpan::measures(1), SnapMode::Round, &settings);
        assert_eq!(snapped, TimelinePosition::new(3, 1, 0.0));
    }

    #[test]
    fn test_snap_zero_grid_is_noop() {
        let settings = four_four();
        let pos = TimelinePosition::new(4, 3, 123.0);
        assert_eq!(pos.snapped(TimelineSpan::zero(), SnapMode::Ceil, &settings), pos);
    }

    #[test]
    fn test_snap_is_idempotent() {
        let grids = [
            TimelineSpan::fraction(250.0),
            TimelineSpan::beats(1),
            TimelineSpan::new(0, 3, 0.0),
            TimelineSpan::measures(2),
        ];
        for signature in [(4, 4), (6, 8), (5, 4)] {
            let settings = TimelineSettings::new(1.0, signature, 120.0);
            for pos in sample_positions() {
                for grid in grids {
                    let once = pos.snapped(grid, SnapMode::Round, &settings);
                    let twice = once.snapped(grid, SnapMode::Round, &settings);
                    assert_eq!(once, twice, "{pos:?} on {grid:?} in {signature:?}");
                }
            }
        }
    }

    #[test]
    fn test_to_margin() {
        let settings = four_four();
        let pos = TimelinePosition::new(3, 2, 500.0);
        // two measures of 200px, one beat of 50px, half a beat
        assert_relative_eq!(pos.to_margin(&settings), 475.0);
        assert_relative_eq!(TimelinePosition::new(0, 4, 0.0).to_margin(&settings), -50.0);
    }

    #[test]
    fn test_margin_round_trip_across_zoom_levels() {
        for scale in [0.01, 0.3, 1.0, 7.77, 25.0] {
            for signature in [(4, 4), (7, 8), (3, 2)] {
                let settings = TimelineSettings::new(scale, signature, 120.0);
                for pos in sample_positions() {
                    let pos = pos.normalized(&settings);
                    let back = TimelinePosition::from_margin(pos.to_margin(&settings), &settings);
                    assert_eq!(back.measure, pos.measure, "{pos:?} at {scale} in {signature:?}");
                    assert_eq!(back.beat, pos.beat, "{pos:?} at {scale} in {signature:?}");
                    assert_relative_eq!(back.fraction, pos.fraction, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_from_margin_on_exact_boundaries() {
        let settings = four_four();
        let below_measure = 3.0 * settings.measure_width() - 1e-12;
        let pos = TimelinePosition::from_margin(below_measure, &settings);
        assert_eq!(pos, TimelinePosition::new(4, 1, 0.0));

        let below_beat = 3.0 * settings.beat_width() - 1e-12;
        let pos = TimelinePosition::from_margin(below_beat, &settings);
        assert_eq!(pos, TimelinePosition::new(1, 4, 0.0));
    }

    #[test]
    fn test_from_margin_negative() {
        let settings = four_four();
        let pos = TimelinePosition::from_margin(-75.0, &settings);
        assert_eq!(pos, TimelinePosition::new(0, 3, 500.0));
    }

    #[test]
    fn test_to_seconds() {
        let pos = TimelinePosition::new(2, 1, 0.0);
        assert_relative_eq!(pos.to_seconds(&four_four()), 2.0);
        assert_relative_eq!(pos.to_seconds(&TimelineSettings::new(1.0, (6, 8), 120.0)), 1.5);
        assert_relative_eq!(pos.to_seconds(&TimelineSettings::new(1.0, (4, 4), 60.0)), 4.0);
    }

    #[test]
    fn test_serde_json() {
        let pos = TimelinePosition::new(3, 2, 500.0);
        let json = serde_json::to_string(&pos).unwrap();
        let decoded: TimelinePosition = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, pos);
        assert_eq!(serde_json::to_string(&SnapMode::Ceil).unwrap(), "\"ceil\"");
    }
}
