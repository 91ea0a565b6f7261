// src/motion/block.rs - Feasible durations of a single DOF
//
// Step 1 yields the fastest profile of a DOF, but a DOF with a non-resting
// target may be unable to finish within certain longer durations as well. Those
// durations form at most two open intervals, each bounded above by a valid
// (slower) extremal profile.

use super::profile::Profile;

/// Open interval `(left, right)` of durations no profile can achieve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub left: f64,
    pub right: f64,
    /// Profile valid for a duration of exactly `right`
    pub profile: Profile,
}

impl Interval {
    fn between(left: &Profile, right: &Profile) -> Self {
        Self { left: left.duration(), right: right.duration(), profile: *right }
    }

    fn contains(&self, t: f64) -> bool {
        self.left < t && t < self.right
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Block {
    pub p_min: Profile,
    pub t_min: f64,
    pub a: Option<Interval>,
    pub b: Option<Interval>,
}

impl Block {
    /// Block of a DOF that is trivially satisfied by `profile` at any duration.
    pub fn single(profile: Profile) -> Self {
        Self { p_min: profile, t_min: profile.duration(), a: None, b: None }
    }

    /// Classifies the extremal profiles of Step 1. Returns `None` when the
    /// candidates cannot be arranged into a minimum plus blocked intervals.
    pub fn calculate(profiles: &mut Vec<Profile>, zero_final: bool) -> Option<Self> {
        profiles.sort_unstable_by(|a, b| a.duration().total_cmp(&b.duration()));
        profiles.dedup_by(|later, earlier| {
            let d = later.duration();
            (d - earlier.duration()).abs() < 1e-12 * d.max(1.0)
        });

        let first = *profiles.first()?;
        let mut block = Self::single(first);
        if zero_final {
            return Some(block);
        }

        match profiles.len() {
            1 => {}
            2 => block.a = Some(Interval::between(&profiles[0], &profiles[1])),
            3 => block.a = Some(Interval::between(&profiles[1], &profiles[2])),
            5 => {
                block.a = Some(Interval::between(&profiles[1], &profiles[2]));
                block.b = Some(Interval::between(&profiles[3], &profiles[4]));
            }
            _ => return None,
        }
        Some(block)
    }

    pub fn is_blocked(&self, t: f64) -> bool {
        t < self.t_min || self.a.is_some_and(|a| a.contains(t)) || self.b.is_some_and(|b| b.contains(t))
    }

    /// Durations at which this block has a ready-made profile: the minimum and
    /// the right end of each blocked interval.
    pub fn candidate_durations(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.t_min).chain(self.a.map(|a| a.right)).chain(self.b.map(|b| b.right))
    }

    /// Ready-made profile for a duration of exactly `t`, if any.
    pub fn profile_for(&self, t: f64) -> Option<&Profile> {
        let close = |d: f64| (d - t).abs() < 1e-12 * t.abs().max(1.0);
        if close(self.t_min) {
            return Some(&self.p_min);
        }
        [self.a.as_ref(), self.b.as_ref()].into_iter().flatten().find(|i| close(i.right)).map(|i| &i.profile)
    }
}
