// src/motion/velocity_step1.rs - Minimum-time profile of a velocity-controlled DOF

use super::profile::{Profile, ReachedLimits};

const EPS: f64 = f64::EPSILON;

/// Minimum-time solver for a DOF that only has to reach a target velocity
/// and acceleration. Profiles use phases 0 to 2: a jerk ramp, an optional
/// acceleration plateau and a second jerk ramp.
#[derive(Debug, Clone)]
pub struct VelocityStep1 {
    a0: f64,
    af: f64,
    vd: f64,
    a_max: f64,
    a_min: f64,
    j_max: f64,
}

impl VelocityStep1 {
    pub fn new(v0: f64, a0: f64, vf: f64, af: f64, a_max: f64, a_min: f64, j_max: f64) -> Self {
        Self { a0, af, vd: vf - v0, a_max, a_min, j_max }
    }

    /// Pushes the valid profiles (at most one per heading) into `found`.
    /// Returns whether the target needs no motion at all.
    pub fn get_profiles(&self, template: &Profile, found: &mut Vec<Profile>) -> bool {
        found.clear();
        if self.vd.abs() < EPS && self.a0.abs() < EPS && self.af.abs() < EPS {
            let mut profile = *template;
            profile.t = [0.0; 7];
            profile.check_for_velocity(ReachedLimits::None, self.j_max, -self.j_max, self.a_max, self.a_min);
            found.push(profile);
            return true;
        }

        self.time_all(template, self.a_max, self.a_min, self.j_max, found);
        self.time_all(template, self.a_min, self.a_max, -self.j_max, found);
        false
    }

    fn time_all(&self, template: &Profile, a_max: f64, a_min: f64, j: f64, found: &mut Vec<Profile>) {
        let (a0, af, vd) = (self.a0, self.af, self.vd);
        let h = j * vd + (a0 * a0 + af * af) / 2.0;
        if h < 0.0 {
            return;
        }

        let mut a_peak = h.sqrt().copysign(j);
        let mut t1 = 0.0;
        let mut limits = ReachedLimits::None;
        if a_peak.abs() > a_max.abs() {
            a_peak = a_max;
            t1 = (vd - (2.0 * a_peak * a_peak - a0 * a0 - af * af) / (2.0 * j)) / a_peak;
            limits = ReachedLimits::Acc0;
        }

        let mut profile = *template;
        profile.t = [(a_peak - a0) / j, t1, (a_peak - af) / j, 0.0, 0.0, 0.0, 0.0];
        if profile.check_for_velocity(limits, j, -j, a_max, a_min) {
            found.push(profile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_target_velocity() {
        let step = VelocityStep1::new(0.0, 0.0, 0.3, 0.0, 1.0, -1.0, 1.0);
        let template = Profile::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.0);
        let mut found = Vec::new();
        assert!(!step.get_profiles(&template, &mut found));
        assert_eq!(found.len(), 1);
        // Two ramps of sqrt(0.3)
        assert!((found[0].duration() - 2.0 * 0.3_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn plateau_on_acceleration_limit() {
        let step = VelocityStep1::new(0.0, 0.0, 3.0, 0.0, 1.0, -1.0, 1.0);
        let template = Profile::new(0.0, 0.0, 0.0, 0.0, 3.0, 0.0);
        let mut found = Vec::new();
        step.get_profiles(&template, &mut found);
        assert_eq!(found[0].limits, ReachedLimits::Acc0);
        assert!((found[0].duration() - 4.0).abs() < 1e-12);
    }
}
