// src/motion/brake.rs - Brake pre-trajectory for states outside the kinematic limits
//
// A position-controlled DOF may start with a velocity or acceleration beyond its
// limits, or with an acceleration that will carry the velocity past them. The
// brake brings such a state into the safe set with at most two segments: a
// constant-jerk ramp followed by a constant-acceleration hold.

/// Up to two brake segments preceding the seven main phases of a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrakeProfile {
    /// Total brake duration (s)
    pub duration: f64,
    /// Segment durations: jerk ramp, acceleration hold
    pub t: [f64; 2],
    /// Segment jerks (the hold always has zero jerk)
    pub j: [f64; 2],
    pub a: [f64; 2],
    pub v: [f64; 2],
    pub p: [f64; 2],
}

/// Velocity reached after braking down to a standstill in acceleration.
fn settled_velocity(v: f64, a: f64, j: f64) -> f64 {
    if a == 0.0 { v } else { v + a * a.abs() / (2.0 * j) }
}

fn in_safe_set(v: f64, a: f64, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j: f64) -> bool {
    let v_z = settled_velocity(v, a, j);
    (a_min..=a_max).contains(&a) && (v_min..=v_max).contains(&v) && (v_min..=v_max).contains(&v_z)
}

fn velocity_after(v0: f64, a0: f64, j: f64, t: f64) -> f64 {
    v0 + t * (a0 + j * t / 2.0)
}

/// Gap kept to the velocity limit a brake ends on. Long brakes accumulate
/// rounding on the order of the largest velocity they pass through.
fn landing_margin(v: f64) -> f64 {
    64.0 * f64::EPSILON * v.abs().max(1.0)
}

/// The settled velocity overshoots `v_max`: ramp acceleration down, holding
/// the lowest acceleration that still lets the velocity settle above `v_min`.
/// Ends just inside `v_max`.
fn down_brake(v0: f64, a0: f64, v_max: f64, v_min: f64, a_min: f64, j: f64) -> (f64, f64, f64) {
    let a_star = a_min.max(-(j * (v_max - v_min)).sqrt());
    if a0 >= a_star {
        let t_ramp = (a0 - a_star) / j;
        let v_end = v_max - landing_margin(v0.abs() + a0 * a0 / j);
        let t_v = (a0 + (a0 * a0 + 2.0 * j * (v0 - v_end)).max(0.0).sqrt()) / j;
        let t_v = t_v.max(a0.max(0.0) / j);
        if t_v <= t_ramp {
            return (t_v, -j, 0.0);
        }
        return (t_ramp, -j, hold_duration(v0, a0, -j, t_ramp, v_max));
    }

    let t_ramp = (a_star - a0) / j;
    (t_ramp, j, hold_duration(v0, a0, j, t_ramp, v_max))
}

/// Duration of the acceleration hold after a ramp of `t_ramp` with jerk `j`.
/// Uses the acceleration the ramp actually ends on, which may differ from the
/// intended one in the last bit; over a long hold that difference adds up.
fn hold_duration(v0: f64, a0: f64, j: f64, t_ramp: f64, v_max: f64) -> f64 {
    let v_ramp = velocity_after(v0, a0, j, t_ramp);
    let a_ramp = a0 + t_ramp * j;
    let v_end = v_max - landing_margin(v_ramp);
    ((v_ramp - v_end) / -a_ramp).max(0.0)
}

/// Velocity settles inside the range but the acceleration is too large (or
/// the velocity is still below `v_min`): reduce the acceleration only.
fn settle_brake(v0: f64, a0: f64, v_min: f64, a_max: f64, j: f64) -> (f64, f64, f64) {
    let mut t = ((a0 - a_max) / j).max(0.0);
    if v0 < v_min {
        t = t.max((a0 - (a0 * a0 + 2.0 * j * (v0 - v_min)).max(0.0).sqrt()) / j);
    }
    (t.min(a0 / j), -j, 0.0)
}

impl BrakeProfile {
    /// Computes the brake segments for a position-controlled DOF starting at
    /// `(v0, a0)`. Leaves an empty brake when the state is already safe.
    pub fn position_brake(&mut self, v0: f64, a0: f64, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) {
        *self = Self::default();
        if j_max <= 0.0 || in_safe_set(v0, a0, v_max, v_min, a_max, a_min, j_max) {
            return;
        }

        let v_z = settled_velocity(v0, a0, j_max);
        let (t_jerk, jerk, t_hold) = if v_z > v_max {
            down_brake(v0, a0, v_max, v_min, a_min, j_max)
        } else if v_z < v_min {
            let (t, jerk, hold) = down_brake(-v0, -a0, -v_min, -v_max, -a_max, j_max);
            (t, -jerk, hold)
        } else if a0 > 0.0 {
            settle_brake(v0, a0, v_min, a_max, j_max)
        } else {
            let (t, jerk, hold) = settle_brake(-v0, -a0, -v_max, -a_min, j_max);
            (t, -jerk, hold)
        };

        self.t = [t_jerk, t_hold];
        self.j = [jerk, 0.0];
    }

    /// Stores the segment start states and advances `(p, v, a)` to the end of
    /// the brake.
    pub fn finalize(&mut self, p: &mut f64, v: &mut f64, a: &mut f64) {
        self.duration = self.t[0] + self.t[1];
        if self.duration <= 0.0 {
            self.duration = 0.0;
            return;
        }

        for i in 0..2 {
            self.p[i] = *p;
            self.v[i] = *v;
            self.a[i] = *a;
            let (t, j) = (self.t[i], self.j[i]);
            *p += t * (*v + t * (*a / 2.0 + t * j / 6.0));
            *v += t * (*a + t * j / 2.0);
            *a += t * j;
        }
    }

    /// State `(p, v, a, j)` at `t` within `[0, duration)`.
    pub fn state_at(&self, t: f64) -> (f64, f64, f64, f64) {
        let (i, dt) = if t < self.t[0] { (0, t) } else { (1, t - self.t[0]) };
        let j = self.j[i];
        (
            self.p[i] + dt * (self.v[i] + dt * (self.a[i] / 2.0 + dt * j / 6.0)),
            self.v[i] + dt * (self.a[i] + dt * j / 2.0),
            self.a[i] + dt * j,
            j,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn braked(v0: f64, a0: f64, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j: f64) -> (f64, f64) {
        let mut brake = BrakeProfile::default();
        brake.position_brake(v0, a0, v_max, v_min, a_max, a_min, j);
        let (mut p, mut v, mut a) = (0.0, v0, a0);
        brake.finalize(&mut p, &mut v, &mut a);
        (v, a)
    }

    fn assert_safe(v: f64, a: f64, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j: f64) {
        let tol = 1e-9 * (1.0 + v_max.abs() + a_max.abs());
        assert!(a >= a_min - tol && a <= a_max + tol, "a = {a}");
        assert!(v >= v_min - tol && v <= v_max + tol, "v = {v}");
        let v_z = settled_velocity(v, a, j);
        assert!(v_z >= v_min - tol && v_z <= v_max + tol, "settled v = {v_z}");
    }

    #[test]
    fn safe_state_needs_no_brake() {
        let mut brake = BrakeProfile::default();
        brake.position_brake(0.5, 0.2, 1.0, -1.0, 1.0, -1.0, 1.0);
        let (mut p, mut v, mut a) = (0.0, 0.5, 0.2);
        brake.finalize(&mut p, &mut v, &mut a);
        assert_eq!(brake.duration, 0.0);
        assert_eq!((p, v, a), (0.0, 0.5, 0.2));
    }

    #[test]
    fn overspeed_is_braked_into_range() {
        let (v, a) = braked(1200.0, 0.0, 800.0, -800.0, 40000.0, -40000.0, 200000.0);
        assert_safe(v, a, 800.0, -800.0, 40000.0, -40000.0, 200000.0);
    }

    #[test]
    fn large_negative_acceleration_is_reduced() {
        let (v, a) = braked(0.0, -3.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        assert_safe(v, a, 1.0, -1.0, 1.0, -1.0, 1.0);
    }

    #[test]
    fn random_states_end_in_safe_set() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5000 {
            let v_max = rng.random_range(0.1..10.0);
            let a_max = rng.random_range(0.1..10.0);
            let j = rng.random_range(0.1..10.0);
            let v0 = rng.random_range(-3.0 * v_max..3.0 * v_max);
            let a0 = rng.random_range(-3.0 * a_max..3.0 * a_max);
            let (v, a) = braked(v0, a0, v_max, -v_max, a_max, -a_max, j);
            assert_safe(v, a, v_max, -v_max, a_max, -a_max, j);
        }
    }

    #[test]
    fn long_brakes_end_inside_the_limits() {
        // Tiny jerk against a large acceleration: the brake runs for hours
        let cases = [
            (12.8273, -95.4867, 12.8273, -12.8273, 95.4867, -95.4867, 0.14593),
            (0.0, 50.878, 0.1766, -0.1766, 91.66, -55.57, 0.01588),
            (-3.3184941323, 128.3098500670, 2.6775031047, -2.6775031047, 61.1164089726, -61.1164089726, 0.0224449105),
        ];
        for (v0, a0, v_max, v_min, a_max, a_min, j) in cases {
            let (v, a) = braked(v0, a0, v_max, v_min, a_max, a_min, j);
            assert!(v > v_min && v < v_max, "v = {v}");
            assert!(a >= a_min && a <= a_max, "a = {a}");
        }
    }
}
