//! Entrance animation math: easing curves and deterministic tween plans.
//!
//! A plan is a list of tween steps sampled against elapsed time. Sampling is
//! pure, so the editor drives it from whatever clock the host provides.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::f32::consts::PI;
use std::str::FromStr;

/// Identity of one running animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    #[default]
    None,
    FadeJiggle,
    SlideInLeft,
    ZoomIn,
}

impl AnimationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationKind::None => "none",
            AnimationKind::FadeJiggle => "fade_jiggle",
            AnimationKind::SlideInLeft => "slide_in_left",
            AnimationKind::ZoomIn => "zoom_in",
        }
    }

    /// Whether the effect moves the node, so its resting position must be
    /// saved and restored on cancel.
    pub fn moves_node(self) -> bool {
        matches!(self, AnimationKind::FadeJiggle | AnimationKind::SlideInLeft)
    }

    /// The tween plan for this kind, ending at `rest`. `None` for
    /// [`AnimationKind::None`].
    pub fn plan(self, rest: Pose, width: f32) -> Option<AnimationPlan> {
        let steps: SmallVec<[TweenStep; 2]> = match self {
            AnimationKind::None => return None,
            AnimationKind::FadeJiggle => smallvec![
                TweenStep {
                    duration_ms: 500.0,
                    easing: Easing::EaseIn,
                    from: PoseTarget {
                        opacity: Some(0.0),
                        ..PoseTarget::default()
                    },
                    to: PoseTarget {
                        opacity: Some(rest.opacity),
                        ..PoseTarget::default()
                    },
                },
                TweenStep {
                    duration_ms: 800.0,
                    easing: Easing::ElasticEaseOut,
                    from: PoseTarget {
                        y: Some(rest.y),
                        ..PoseTarget::default()
                    },
                    to: PoseTarget {
                        y: Some(rest.y - 10.0),
                        ..PoseTarget::default()
                    },
                },
            ],
            AnimationKind::SlideInLeft => smallvec![TweenStep {
                duration_ms: 600.0,
                easing: Easing::EaseOut,
                from: PoseTarget {
                    x: Some(-width),
                    opacity: Some(0.0),
                    ..PoseTarget::default()
                },
                to: PoseTarget {
                    x: Some(rest.x),
                    opacity: Some(rest.opacity),
                    ..PoseTarget::default()
                },
            }],
            AnimationKind::ZoomIn => smallvec![TweenStep {
                duration_ms: 500.0,
                easing: Easing::BackEaseOut,
                from: PoseTarget {
                    scale_x: Some(0.1),
                    scale_y: Some(0.1),
                    opacity: Some(0.0),
                    ..PoseTarget::default()
                },
                to: PoseTarget {
                    scale_x: Some(rest.scale_x),
                    scale_y: Some(rest.scale_y),
                    opacity: Some(rest.opacity),
                    ..PoseTarget::default()
                },
            }],
        };
        Some(AnimationPlan { rest, steps })
    }
}

impl FromStr for AnimationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(AnimationKind::None),
            "fade_jiggle" => Ok(AnimationKind::FadeJiggle),
            "slide_in_left" => Ok(AnimationKind::SlideInLeft),
            "zoom_in" => Ok(AnimationKind::ZoomIn),
            _ => Err(()),
        }
    }
}

// ─── Easing ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    ElasticEaseOut,
    BackEaseOut,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] to eased progress. Overshooting
    /// curves may leave [0, 1] in between but hit 0 and 1 exactly.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => -t * (t - 2.0),
            Easing::ElasticEaseOut => {
                let period = 0.3;
                let shift = period / 4.0;
                2f32.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / period).sin() + 1.0
            }
            Easing::BackEaseOut => {
                let s = 1.70158;
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
        }
    }
}

// ─── Poses and plans ─────────────────────────────────────────────────────

/// The animated subset of a node's attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub opacity: f32,
}

/// Partial pose: only the fields a step animates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseTarget {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub opacity: Option<f32>,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn blend(slot: &mut f32, from: Option<f32>, to: Option<f32>, t: f32) {
    if let (Some(a), Some(b)) = (from, to) {
        *slot = lerp(a, b, t);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenStep {
    pub duration_ms: f64,
    pub easing: Easing,
    pub from: PoseTarget,
    pub to: PoseTarget,
}

impl TweenStep {
    fn write(&self, pose: &mut Pose, t: f32) {
        let e = self.easing.apply(t);
        blend(&mut pose.x, self.from.x, self.to.x, e);
        blend(&mut pose.y, self.from.y, self.to.y, e);
        blend(&mut pose.scale_x, self.from.scale_x, self.to.scale_x, e);
        blend(&mut pose.scale_y, self.from.scale_y, self.to.scale_y, e);
        blend(&mut pose.opacity, self.from.opacity, self.to.opacity, e);
    }
}

/// Steps played back to back, then a snap to the resting pose.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlan {
    pub rest: Pose,
    pub steps: SmallVec<[TweenStep; 2]>,
}

impl AnimationPlan {
    pub fn total_ms(&self) -> f64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    /// Pose at `elapsed_ms` and whether the plan has finished.
    pub fn sample(&self, elapsed_ms: f64) -> (Pose, bool) {
        if elapsed_ms >= self.total_ms() {
            return (self.rest, true);
        }
        let mut pose = self.rest;
        let mut start = 0.0;
        for step in &self.steps {
            let end = start + step.duration_ms;
            if elapsed_ms < end {
                let t = ((elapsed_ms - start).max(0.0) / step.duration_ms) as f32;
                step.write(&mut pose, t);
                return (pose, false);
            }
            step.write(&mut pose, 1.0);
            start = end;
        }
        (self.rest, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest() -> Pose {
        Pose {
            x: 50.0,
            y: 150.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn easings_hit_endpoints() {
        for e in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::ElasticEaseOut,
            Easing::BackEaseOut,
        ] {
            assert_eq!(e.apply(0.0), 0.0, "{e:?}");
            assert_eq!(e.apply(1.0), 1.0, "{e:?}");
        }
        assert!(Easing::BackEaseOut.apply(0.6) > 1.0);
    }

    #[test]
    fn fade_jiggle_fades_then_jiggles_then_settles() {
        let plan = AnimationKind::FadeJiggle.plan(rest(), 100.0).unwrap();
        assert_eq!(plan.total_ms(), 1300.0);

        let (start, done) = plan.sample(0.0);
        assert!(!done);
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.y, 150.0);

        let (mid, _) = plan.sample(250.0);
        assert!((mid.opacity - 0.25).abs() < 1e-5);

        let (jiggle, _) = plan.sample(700.0);
        assert_eq!(jiggle.opacity, 1.0);
        assert!(jiggle.y < 150.0);

        assert_eq!(plan.sample(1300.0), (rest(), true));
    }

    #[test]
    fn slide_in_left_starts_off_stage() {
        let plan = AnimationKind::SlideInLeft.plan(rest(), 120.0).unwrap();
        let (start, _) = plan.sample(0.0);
        assert_eq!(start.x, -120.0);
        assert_eq!(start.y, 150.0);
        let (half, _) = plan.sample(300.0);
        assert!(half.x > 0.0 && half.x < 50.0);
        assert_eq!(plan.sample(600.0).0, rest());
    }

    #[test]
    fn zoom_in_scales_from_a_tenth() {
        let plan = AnimationKind::ZoomIn.plan(rest(), 10.0).unwrap();
        let (start, _) = plan.sample(0.0);
        assert_eq!((start.scale_x, start.scale_y), (0.1, 0.1));
        assert_eq!(plan.sample(10_000.0), (rest(), true));
    }

    #[test]
    fn none_has_no_plan() {
        assert_eq!(AnimationKind::None.plan(rest(), 1.0), None);
        assert_eq!("slide_in_left".parse(), Ok(AnimationKind::SlideInLeft));
        assert!("spin".parse::<AnimationKind>().is_err());
    }
}
