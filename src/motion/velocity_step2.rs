// src/motion/velocity_step2.rs - Fixed-duration profile of a velocity-controlled DOF

use super::profile::{Profile, ReachedLimits};

#[derive(Debug, Clone)]
pub struct VelocityStep2 {
    tf: f64,
    a0: f64,
    af: f64,
    vd: f64,
    a_max: f64,
    a_min: f64,
    j_max: f64,
}

impl VelocityStep2 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(tf: f64, v0: f64, a0: f64, vf: f64, af: f64, a_max: f64, a_min: f64, j_max: f64) -> Self {
        Self { tf, a0, af, vd: vf - v0, a_max, a_min, j_max }
    }

    /// Fills `profile` with a three-phase profile lasting exactly `tf`.
    pub fn get_profile(&self, profile: &mut Profile) -> bool {
        [(self.a_max, self.a_min, self.j_max), (self.a_min, self.a_max, -self.j_max)]
            .into_iter()
            .any(|(a_max, a_min, j)| self.time_peak(profile, a_max, a_min, j) || self.time_ramp(profile, a_max, a_min, j))
    }

    fn fits(&self, profile: &Profile) -> bool {
        (profile.phase_duration() - self.tf).abs() < 1e-12 * self.tf.max(1.0)
    }

    /// Ramp up to a peak acceleration, hold it, ramp back down.
    fn time_peak(&self, profile: &mut Profile, a_max: f64, a_min: f64, j: f64) -> bool {
        let (a0, af, tf) = (self.a0, self.af, self.tf);
        let b = -(j * tf + a0 + af);
        let c = (a0 * a0 + af * af) / 2.0 + j * self.vd;
        let disc = b * b - 4.0 * c;
        if disc < 0.0 {
            return false;
        }

        let r = disc.sqrt();
        for a_peak in [(-b - r) / 2.0, (-b + r) / 2.0] {
            let t0 = (a_peak - a0) / j;
            let t2 = (a_peak - af) / j;
            profile.t = [t0, tf - t0 - t2, t2, 0.0, 0.0, 0.0, 0.0];
            if profile.check_for_velocity(ReachedLimits::None, j, -j, a_max, a_min) && self.fits(profile) {
                return true;
            }
        }
        false
    }

    /// Monotonic acceleration change with a plateau in between.
    fn time_ramp(&self, profile: &mut Profile, a_max: f64, a_min: f64, j: f64) -> bool {
        let (a0, af, tf) = (self.a0, self.af, self.tf);
        let t1 = tf - (af - a0) / j;
        if t1 <= 0.0 {
            return false;
        }

        let a_plateau = (self.vd - (af * af - a0 * a0) / (2.0 * j)) / t1;
        profile.t = [(a_plateau - a0) / j, t1, (af - a_plateau) / j, 0.0, 0.0, 0.0, 0.0];
        profile.check_for_velocity(ReachedLimits::None, j, j, a_max, a_min) && self.fits(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretches_to_requested_duration() {
        let step = VelocityStep2::new(2.0, 0.0, 0.0, 0.3, 0.0, 1.0, -1.0, 1.0);
        let mut profile = Profile::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.0);
        assert!(step.get_profile(&mut profile));
        assert!((profile.duration() - 2.0).abs() < 1e-12);
        let (_, v, a, _) = profile.state_at(2.0);
        assert!((v - 0.3).abs() < 1e-8 && a.abs() < 1e-10);
    }

    #[test]
    fn ramp_between_accelerations() {
        // 0.5 -> 0.0 over 3 s while gaining velocity: monotonic ramp
        let step = VelocityStep2::new(3.0, 0.0, 0.5, 0.5, 0.0, 1.0, -1.0, 1.0);
        let mut profile = Profile::new(0.0, 0.0, 0.5, 0.0, 0.5, 0.0);
        assert!(step.get_profile(&mut profile));
        let (_, v, a, _) = profile.state_at(3.0);
        assert!((v - 0.5).abs() < 1e-8 && a.abs() < 1e-10);
    }
}
