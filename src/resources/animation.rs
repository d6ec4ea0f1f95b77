use cgmath::{Quaternion, Vector3};
use gltf::animation::util::ReadOutputs;

use crate::animation::{AnimationClip, Channel, Interpolation, Keyframes, Track};

fn interpolation(sampler: &gltf::animation::Sampler) -> Interpolation {
    match sampler.interpolation() {
        gltf::animation::Interpolation::Linear => Interpolation::Linear,
        gltf::animation::Interpolation::Step => Interpolation::Step,
        gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
    }
}

/// Read every animation of `document` into a clip. Track targets keep glTF node indices.
pub fn read_animations(document: &gltf::Document, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    document
        .animations()
        .map(|animation| {
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("animation_{}", animation.index()));
            let mut tracks = Vec::new();
            for channel in animation.channels() {
                let reader =
                    channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let Some(inputs) = reader.read_inputs() else {
                    log::warn!("{name}: channel {} has no keyframe times", channel.index());
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                let interpolation = interpolation(&channel.sampler());

                let channel_data = match reader.read_outputs() {
                    Some(ReadOutputs::Translations(values)) => Channel::Translation(
                        Keyframes::new(times, values.map(Vector3::from).collect(), interpolation),
                    ),
                    Some(ReadOutputs::Rotations(values)) => Channel::Rotation(Keyframes::new(
                        times,
                        values
                            .into_f32()
                            .map(|[x, y, z, w]| Quaternion::new(w, x, y, z))
                            .collect(),
                        interpolation,
                    )),
                    Some(ReadOutputs::Scales(values)) => Channel::Scale(Keyframes::new(
                        times,
                        values.map(Vector3::from).collect(),
                        interpolation,
                    )),
                    Some(ReadOutputs::MorphTargetWeights(_)) => {
                        log::warn!("{name}: morph target channels are not played");
                        continue;
                    }
                    None => {
                        log::warn!("{name}: channel {} has no keyframe values", channel.index());
                        continue;
                    }
                };
                tracks.push(Track {
                    node: channel.target().node().index(),
                    channel: channel_data,
                });
            }
            AnimationClip::new(name, tracks)
        })
        .collect()
}
