use std::sync::Arc;

use crate::{animation::AnimationClip, data_structures::scene_graph::SceneGraph};

/// Playback state of one clip on one mixer.
#[derive(Clone, Debug)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,
    time: f32,
    time_scale: f32,
    start_time: Option<f32>,
    running: bool,
    started: bool,
}

impl AnimationAction {
    fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            start_time: None,
            running: false,
            started: false,
        }
    }

    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    pub fn play(&mut self) -> &mut Self {
        self.running = true;
        self
    }

    /// Hold the action until the mixer's clock reaches `mixer_time`.
    pub fn start_at(&mut self, mixer_time: f32) -> &mut Self {
        self.start_time = Some(mixer_time);
        self
    }

    pub fn set_time_scale(&mut self, time_scale: f32) -> &mut Self {
        self.time_scale = time_scale;
        self
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Play head within the clip.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Running and past its delayed start.
    pub fn is_active(&self) -> bool {
        self.running && self.started
    }

    fn update(&mut self, mixer_time: f32, dt: f32) {
        if !self.running {
            return;
        }
        let mut dt = dt;
        if let Some(start) = self.start_time {
            let running_for = mixer_time - start;
            if running_for < 0.0 {
                return;
            }
            // the part of this frame that lies past the start
            self.start_time = None;
            dt = running_for;
        }
        self.started = true;

        let duration = self.clip.duration;
        self.time += dt * self.time_scale;
        if duration > 0.0 {
            self.time = self.time.rem_euclid(duration);
        } else {
            self.time = 0.0;
        }
    }
}

/// Drives the actions bound to one scene graph.
#[derive(Clone, Debug)]
pub struct AnimationMixer {
    time: f32,
    pub time_scale: f32,
    actions: Vec<AnimationAction>,
}

impl Default for AnimationMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            time_scale: 1.0,
            actions: Vec::new(),
        }
    }

    /// The action for `clip`, created on first request.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>) -> &mut AnimationAction {
        let index = match self
            .actions
            .iter()
            .position(|action| Arc::ptr_eq(&action.clip, &clip))
        {
            Some(index) => index,
            None => {
                self.actions.push(AnimationAction::new(clip));
                self.actions.len() - 1
            }
        };
        &mut self.actions[index]
    }

    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance the mixer clock and every action by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = dt * self.time_scale;
        self.time += dt;
        let time = self.time;
        for action in self.actions.iter_mut() {
            action.update(time, dt);
        }
    }

    /// Pose `graph` with every active action. Later actions overwrite earlier ones.
    pub fn apply(&self, graph: &mut SceneGraph) {
        for action in self.actions.iter().filter(|action| action.is_active()) {
            action.clip.apply(action.time, graph);
        }
    }
}
