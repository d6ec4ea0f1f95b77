//! A one-shot timeline of "to" tweens on a position.
//!
//! A tween records the current value of each axis it animates on the first frame the
//! timeline reaches its start time, then eases towards its targets with `power1.out`.
//! Tweens that overlap on an axis are written in start order, so the later one wins.

use cgmath::Point3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn get(self, point: &Point3<f32>) -> f32 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
            Axis::Z => point.z,
        }
    }

    fn set(self, point: &mut Point3<f32>, value: f32) {
        match self {
            Axis::X => point.x = value,
            Axis::Y => point.y = value,
            Axis::Z => point.z = value,
        }
    }
}

/// `1 - (1 - p)^2`
pub fn power1_out(progress: f32) -> f32 {
    let inv = 1.0 - progress.clamp(0.0, 1.0);
    1.0 - inv * inv
}

#[derive(Clone, Debug)]
pub struct Tween {
    targets: Vec<(Axis, f32)>,
    duration: f32,
    start: f32,
    from: Option<Vec<f32>>,
    done: bool,
}

impl Tween {
    pub fn to(targets: &[(Axis, f32)], duration: f32) -> Self {
        Self {
            targets: targets.to_vec(),
            duration: duration.max(0.0),
            start: 0.0,
            from: None,
            done: false,
        }
    }

    /// Place the tween at an absolute time on the timeline.
    pub fn at(mut self, start: f32) -> Self {
        self.start = start.max(0.0);
        self
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    fn progress(&self, time: f32) -> f32 {
        if self.duration == 0.0 {
            return 1.0;
        }
        ((time - self.start) / self.duration).clamp(0.0, 1.0)
    }

    fn write(&self, from: &[f32], eased: f32, position: &mut Point3<f32>) {
        for ((axis, target), start) in self.targets.iter().zip(from) {
            let value = if eased >= 1.0 {
                *target
            } else {
                start + (target - start) * eased
            };
            axis.set(position, value);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Timeline {
    tweens: Vec<Tween>,
    time: f32,
}

impl Timeline {
    pub fn new(mut tweens: Vec<Tween>) -> Self {
        // stable, so tweens sharing a start time keep their declaration order
        tweens.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { tweens, time: 0.0 }
    }

    /// End time of the last tween.
    pub fn duration(&self) -> f32 {
        self.tweens.iter().map(Tween::end).fold(0.0, f32::max)
    }

    pub fn is_complete(&self) -> bool {
        self.tweens.iter().all(|tween| tween.done)
    }

    /// Move the play head by `dt` seconds and write every active tween into `position`.
    pub fn advance(&mut self, dt: f32, position: &mut Point3<f32>) {
        if self.is_complete() {
            return;
        }
        self.time += dt.max(0.0);
        let time = self.time;

        for tween in self.tweens.iter_mut() {
            if tween.from.is_none() && time >= tween.start {
                let from = tween.targets.iter().map(|(axis, _)| axis.get(position)).collect();
                tween.from = Some(from);
            }
        }

        for tween in self.tweens.iter_mut().filter(|tween| !tween.done) {
            let Some(from) = tween.from.as_deref() else {
                continue;
            };
            let progress = tween.progress(time);
            tween.write(from, power1_out(progress), position);
            if progress >= 1.0 {
                tween.done = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn flythrough() -> (Timeline, Point3<f32>) {
        let config = CameraConfig::default();
        (Timeline::new(config.flythrough), config.position)
    }

    #[test]
    fn easing_starts_fast_and_lands_on_target() {
        assert_eq!(power1_out(0.0), 0.0);
        assert_eq!(power1_out(0.5), 0.75);
        assert_eq!(power1_out(1.0), 1.0);
    }

    #[test]
    fn nothing_moves_before_the_first_tween() {
        let (mut timeline, mut position) = flythrough();
        let before = position;
        timeline.advance(1.9, &mut position);
        assert_eq!(position, before);
        assert!(!timeline.is_complete());
    }

    #[test]
    fn overlapping_axis_is_written_by_the_later_tween() {
        let (mut timeline, mut position) = flythrough();
        timeline.advance(2.0, &mut position);
        timeline.advance(1.5, &mut position);

        // x only belongs to the first tween, halfway through its 3 s
        assert!((position.x - -15.0).abs() < 1e-4);
        // y is shared, the second tween (5 s) has the last word
        let expected_y = 2.0 + 48.0 * power1_out(0.3);
        assert!((position.y - expected_y).abs() < 1e-4);
    }

    #[test]
    fn runs_once_and_ends_on_the_final_pose() {
        let (mut timeline, mut position) = flythrough();
        assert_eq!(timeline.duration(), 25.0);

        for _ in 0..(26 * 60) {
            timeline.advance(1.0 / 60.0, &mut position);
        }
        assert!(timeline.is_complete());
        assert!((position.x - -40.0).abs() < 1e-4);
        assert!((position.y - 13.0).abs() < 1e-4);
        assert!((position.z - -20.0).abs() < 1e-4);

        let settled = position;
        timeline.advance(5.0, &mut position);
        assert_eq!(position, settled);
    }

    #[test]
    fn a_long_frame_still_lands_every_target() {
        let (mut timeline, mut position) = flythrough();
        timeline.advance(100.0, &mut position);
        assert!(timeline.is_complete());
        assert_eq!(position, Point3::new(-40.0, 13.0, -20.0));
    }
}
