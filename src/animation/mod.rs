//! Keyframe clips and their playback.
//!
//! A clip is a set of tracks, each writing one TRS component of one scene-graph node.
//! Clips are immutable once loaded and shared between graphs through `Arc`, which is
//! only sound because every cloned graph keeps the node ids of its template.

pub mod mixer;

use std::{
    ops::{Add, Mul},
    sync::Arc,
};

use cgmath::{InnerSpace, Quaternion, Vector3};

use crate::data_structures::scene_graph::{NodeId, SceneGraph};

pub use mixer::{AnimationAction, AnimationMixer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    /// Values are stored as `(in-tangent, value, out-tangent)` triplets.
    CubicSpline,
}

pub trait Animatable: Copy + Add<Output = Self> + Mul<f32, Output = Self> {
    fn interpolate(a: Self, b: Self, t: f32) -> Self;

    fn normalized(self) -> Self {
        self
    }
}

impl Animatable for Vector3<f32> {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Animatable for Quaternion<f32> {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        // take the short way around
        let b = if a.dot(b) < 0.0 { -b } else { b };
        a.slerp(b, t)
    }

    fn normalized(self) -> Self {
        self.normalize()
    }
}

#[derive(Clone, Debug)]
pub struct Keyframes<T> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: Interpolation,
}

impl<T: Animatable> Keyframes<T> {
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    pub fn end(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    fn value(&self, key: usize) -> Option<T> {
        match self.interpolation {
            Interpolation::CubicSpline => self.values.get(key * 3 + 1).copied(),
            _ => self.values.get(key).copied(),
        }
    }

    /// Value at `time`, held constant outside the keyed range.
    pub fn sample(&self, time: f32) -> Option<T> {
        let last = self.times.len().checked_sub(1)?;
        if time <= self.times[0] {
            return self.value(0);
        }
        if time >= self.times[last] {
            return self.value(last);
        }

        let next = self.times.partition_point(|&t| t <= time);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let t = if span > 0.0 {
            (time - self.times[prev]) / span
        } else {
            0.0
        };

        match self.interpolation {
            Interpolation::Step => self.value(prev),
            Interpolation::Linear => Some(T::interpolate(self.value(prev)?, self.value(next)?, t)),
            Interpolation::CubicSpline => {
                let v0 = *self.values.get(prev * 3 + 1)?;
                let out0 = *self.values.get(prev * 3 + 2)?;
                let in1 = *self.values.get(next * 3)?;
                let v1 = *self.values.get(next * 3 + 1)?;
                let t2 = t * t;
                let t3 = t2 * t;
                let value = v0 * (2.0 * t3 - 3.0 * t2 + 1.0)
                    + out0 * ((t3 - 2.0 * t2 + t) * span)
                    + v1 * (-2.0 * t3 + 3.0 * t2)
                    + in1 * ((t3 - t2) * span);
                Some(value.normalized())
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum Channel {
    Translation(Keyframes<Vector3<f32>>),
    Rotation(Keyframes<Quaternion<f32>>),
    Scale(Keyframes<Vector3<f32>>),
}

impl Channel {
    fn end(&self) -> f32 {
        match self {
            Channel::Translation(keys) | Channel::Scale(keys) => keys.end(),
            Channel::Rotation(keys) => keys.end(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Track {
    pub node: NodeId,
    pub channel: Channel,
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Duration is taken from the latest keyframe of any track.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|track| track.channel.end())
            .fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    pub fn find_by_name(clips: &[Arc<AnimationClip>], name: &str) -> Option<Arc<AnimationClip>> {
        clips.iter().find(|clip| clip.name == name).cloned()
    }

    /// Write the pose at `time` into the local transforms of `graph`.
    pub fn apply(&self, time: f32, graph: &mut SceneGraph) {
        for track in &self.tracks {
            let Some(node) = graph.node_mut(track.node) else {
                continue;
            };
            match &track.channel {
                Channel::Translation(keys) => {
                    if let Some(v) = keys.sample(time) {
                        node.local.translation = v;
                    }
                }
                Channel::Rotation(keys) => {
                    if let Some(q) = keys.sample(time) {
                        node.local.rotation = q;
                    }
                }
                Channel::Scale(keys) => {
                    if let Some(v) = keys.sample(time) {
                        node.local.scale = v;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    #[test]
    fn linear_sampling_clamps_outside_the_keys() {
        let keys = Keyframes::new(
            vec![1.0, 2.0],
            vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(10.0, 0.0, 0.0)],
            Interpolation::Linear,
        );
        assert_eq!(keys.sample(0.0), Some(Vector3::new(0.0, 0.0, 0.0)));
        assert_eq!(keys.sample(1.25), Some(Vector3::new(2.5, 0.0, 0.0)));
        assert_eq!(keys.sample(9.0), Some(Vector3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn step_holds_the_previous_key() {
        let keys = Keyframes::new(
            vec![0.0, 1.0],
            vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 2.0, 2.0)],
            Interpolation::Step,
        );
        assert_eq!(keys.sample(0.99), Some(Vector3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn cubic_spline_hits_keys_exactly() {
        let zero = Vector3::new(0.0, 0.0, 0.0);
        let keys = Keyframes::new(
            vec![0.0, 1.0],
            vec![zero, zero, zero, zero, Vector3::new(4.0, 0.0, 0.0), zero],
            Interpolation::CubicSpline,
        );
        assert_eq!(keys.sample(1.0), Some(Vector3::new(4.0, 0.0, 0.0)));
        let mid = keys.sample(0.5).unwrap();
        assert!((mid.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_is_slerped() {
        let a = Quaternion::from_angle_y(Deg(0.0));
        let b = Quaternion::from_angle_y(Deg(90.0));
        let keys = Keyframes::new(vec![0.0, 1.0], vec![a, b], Interpolation::Linear);
        let mid = keys.sample(0.5).unwrap();
        let expected = Quaternion::from_angle_y(Deg(45.0));
        assert!((mid - expected).magnitude() < 1e-5);
    }

    #[test]
    fn empty_tracks_sample_to_nothing() {
        let keys: Keyframes<Vector3<f32>> = Keyframes::new(vec![], vec![], Interpolation::Linear);
        assert_eq!(keys.sample(0.3), None);
    }

    #[test]
    fn clip_duration_spans_all_tracks() {
        let clip = AnimationClip::new(
            "Take 001",
            vec![
                Track {
                    node: 0,
                    channel: Channel::Translation(Keyframes::new(
                        vec![0.0, 1.5],
                        vec![Vector3::new(0.0, 0.0, 0.0); 2],
                        Interpolation::Linear,
                    )),
                },
                Track {
                    node: 1,
                    channel: Channel::Scale(Keyframes::new(
                        vec![0.0, 2.5],
                        vec![Vector3::new(1.0, 1.0, 1.0); 2],
                        Interpolation::Linear,
                    )),
                },
            ],
        );
        assert_eq!(clip.duration, 2.5);
        let clips = vec![Arc::new(clip)];
        assert!(AnimationClip::find_by_name(&clips, "Take 001").is_some());
        assert!(AnimationClip::find_by_name(&clips, "Take 002").is_none());
    }
}
