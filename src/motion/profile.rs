// src/motion/profile.rs - Seven-phase jerk-limited profile of a single DOF

use serde::{Deserialize, Serialize};

use super::brake::BrakeProfile;

/// Final position tolerance of a valid profile
pub const P_PRECISION: f64 = 1e-8;
/// Relative final position tolerance, for positions whose float spacing
/// approaches `P_PRECISION`
const P_RELATIVE_PRECISION: f64 = 1e-13;
/// Final velocity tolerance of a valid profile
pub const V_PRECISION: f64 = 1e-8;
/// Final acceleration tolerance of a valid profile
pub const A_PRECISION: f64 = 1e-10;

const V_EPS: f64 = 1e-12;
const A_EPS: f64 = 1e-12;
const J_EPS: f64 = 1e-12;
const T_NEGATIVE_TOLERANCE: f64 = 1e-12;

/// Longest duration a profile may have (s)
pub const T_MAX: f64 = 1e12;

/// Final position tolerance of a motion from `p0` to `pf`.
pub fn position_precision(p0: f64, pf: f64) -> f64 {
    P_PRECISION.max(P_RELATIVE_PRECISION * p0.abs().max(pf.abs()))
}

/// Which kinematic limits are structurally active in a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReachedLimits {
    Acc0Acc1Vel,
    Vel,
    Acc0,
    Acc1,
    Acc0Acc1,
    Acc0Vel,
    Acc1Vel,
    #[default]
    None,
}

impl ReachedLimits {
    pub fn reaches_velocity(self) -> bool {
        matches!(self, Self::Acc0Acc1Vel | Self::Acc0Vel | Self::Acc1Vel | Self::Vel)
    }

    pub fn reaches_acc0(self) -> bool {
        matches!(self, Self::Acc0 | Self::Acc0Acc1 | Self::Acc0Vel | Self::Acc0Acc1Vel)
    }

    pub fn reaches_acc1(self) -> bool {
        matches!(self, Self::Acc1 | Self::Acc0Acc1 | Self::Acc1Vel | Self::Acc0Acc1Vel)
    }
}

/// Jerk sign sequence over the four jerk phases (0, 2, 4, 6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JerkSigns {
    /// up, down, down, up
    #[default]
    Uddu,
    /// up, down, up, down
    Udud,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Up,
    Down,
}

/// Minimum and maximum position reached along a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PositionExtrema {
    pub min: f64,
    pub max: f64,
    pub t_min: f64,
    pub t_max: f64,
}

impl PositionExtrema {
    fn at(p: f64, t: f64) -> Self {
        Self { min: p, max: p, t_min: t, t_max: t }
    }

    fn add(&mut self, p: f64, t: f64) {
        if p < self.min {
            self.min = p;
            self.t_min = t;
        }
        if p > self.max {
            self.max = p;
            self.t_max = t;
        }
    }

    /// Includes the extrema of one constant-jerk segment starting at `t0`.
    fn add_segment(&mut self, t0: f64, duration: f64, p: f64, v: f64, a: f64, j: f64) {
        let pos = |dt: f64| p + dt * (v + dt * (a / 2.0 + dt * j / 6.0));
        self.add(pos(duration), t0 + duration);

        // Velocity roots of v + a t + j t^2 / 2 inside the segment
        let mut check = |dt: f64| {
            if dt > 0.0 && dt < duration {
                self.add(pos(dt), t0 + dt);
            }
        };
        if j.abs() > f64::EPSILON {
            let disc = a * a - 2.0 * j * v;
            if disc >= 0.0 {
                let s = disc.sqrt();
                check((-a + s) / j);
                check((-a - s) / j);
            }
        } else if a.abs() > f64::EPSILON {
            check(-v / a);
        }
    }
}

/// One candidate trajectory of a single DOF: an optional brake, then seven
/// phases of constant jerk. Kinematic states at the phase boundaries are cached
/// for evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Profile {
    /// Phase durations
    pub t: [f64; 7],
    /// Cumulative phase end times (brake excluded)
    pub t_sum: [f64; 7],
    /// Jerk of each phase
    pub j: [f64; 7],
    /// Acceleration at the start of each phase, plus the final one
    pub a: [f64; 8],
    /// Velocity at the start of each phase, plus the final one
    pub v: [f64; 8],
    /// Position at the start of each phase, plus the final one
    pub p: [f64; 8],
    /// Target state
    pub pf: f64,
    pub vf: f64,
    pub af: f64,
    pub limits: ReachedLimits,
    pub direction: Direction,
    pub jerk_signs: JerkSigns,
    pub brake: BrakeProfile,
}

impl Profile {
    /// Profile starting at `(p0, v0, a0)` heading for `(pf, vf, af)`.
    pub fn new(p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64) -> Self {
        let mut profile = Self::default();
        profile.set_boundary(p0, v0, a0, pf, vf, af);
        profile
    }

    pub fn set_boundary(&mut self, p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64) {
        self.p[0] = p0;
        self.v[0] = v0;
        self.a[0] = a0;
        self.pf = pf;
        self.vf = vf;
        self.af = af;
    }

    /// Duration of the seven main phases.
    pub fn phase_duration(&self) -> f64 {
        self.t_sum[6]
    }

    /// Total duration including the brake.
    pub fn duration(&self) -> f64 {
        self.brake.duration + self.t_sum[6]
    }

    /// Clamps tiny negative durations to zero and refreshes `t_sum`.
    /// Rejects NaN and clearly negative durations.
    fn accept_durations(&mut self) -> bool {
        for t in self.t.iter_mut() {
            if !(*t >= -T_NEGATIVE_TOLERANCE) {
                return false;
            }
            if *t < 0.0 {
                *t = 0.0;
            }
        }
        self.t_sum[0] = self.t[0];
        for i in 0..6 {
            self.t_sum[i + 1] = self.t_sum[i] + self.t[i + 1];
        }
        self.t_sum[6] <= T_MAX
    }

    fn integrate_phase(&mut self, i: usize) {
        let (t, j) = (self.t[i], self.j[i]);
        self.a[i + 1] = self.a[i] + t * j;
        self.v[i + 1] = self.v[i] + t * (self.a[i] + t * j / 2.0);
        self.p[i + 1] = self.p[i] + t * (self.v[i] + t * (self.a[i] / 2.0 + t * j / 6.0));
    }

    fn reaches_target(&self) -> bool {
        (self.p[7] - self.pf).abs() < position_precision(self.p[0], self.pf)
            && (self.v[7] - self.vf).abs() < V_PRECISION
            && (self.a[7] - self.af).abs() < A_PRECISION
    }

    /// Validates the durations in `t` for a position-interface profile with
    /// jerk `jf`, filling jerks and boundary states.
    ///
    /// The limits are given in the profile's direction: `v_max > 0` means the
    /// profile heads up. Every phase's velocity extremum and every boundary
    /// velocity and acceleration must stay within them, and the final state
    /// must match the target.
    #[allow(clippy::too_many_arguments)]
    pub fn check(
        &mut self,
        signs: JerkSigns,
        limits: ReachedLimits,
        jf: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
    ) -> bool {
        if !self.accept_durations() {
            return false;
        }

        let eps = f64::EPSILON;
        if limits.reaches_velocity() && self.t[3] < eps {
            return false;
        }
        if matches!(limits, ReachedLimits::Acc0 | ReachedLimits::Acc0Acc1) && self.t[1] < eps {
            return false;
        }
        if matches!(limits, ReachedLimits::Acc1 | ReachedLimits::Acc0Acc1) && self.t[5] < eps {
            return false;
        }

        let signed = |t: f64, j: f64| if t > 0.0 { j } else { 0.0 };
        self.j = match signs {
            JerkSigns::Uddu => [
                signed(self.t[0], jf),
                0.0,
                signed(self.t[2], -jf),
                0.0,
                signed(self.t[4], -jf),
                0.0,
                signed(self.t[6], jf),
            ],
            JerkSigns::Udud => [
                signed(self.t[0], jf),
                0.0,
                signed(self.t[2], -jf),
                0.0,
                signed(self.t[4], jf),
                0.0,
                signed(self.t[6], -jf),
            ],
        };

        let up = v_max > 0.0;
        self.direction = if up { Direction::Up } else { Direction::Down };
        let v_upp = if up { v_max } else { v_min } + V_EPS;
        let v_low = if up { v_min } else { v_max } - V_EPS;

        for i in 0..7 {
            self.integrate_phase(i);
            if limits.reaches_velocity() && i == 2 {
                self.a[3] = 0.0;
            }

            if self.a[i + 1] * self.a[i] < -eps && self.j[i] != 0.0 {
                let v_a_zero = self.v[i] - self.a[i] * self.a[i] / (2.0 * self.j[i]);
                if v_a_zero > v_upp || v_a_zero < v_low {
                    return false;
                }
            }
        }

        self.jerk_signs = signs;
        self.limits = limits;

        let a_upp = if up { a_max } else { a_min } + A_EPS;
        let a_low = if up { a_min } else { a_max } - A_EPS;
        let acc_ok = [1, 3, 5].iter().all(|&i| self.a[i] >= a_low && self.a[i] <= a_upp);
        let vel_ok = (1..7).all(|i| self.v[i] >= v_low && self.v[i] <= v_upp);
        self.reaches_target() && acc_ok && vel_ok
    }

    /// As [`Profile::check`], for a jerk `jf` that was solved for and must not
    /// exceed `j_max` in magnitude.
    #[allow(clippy::too_many_arguments)]
    pub fn check_with_jerk_limit(
        &mut self,
        signs: JerkSigns,
        limits: ReachedLimits,
        jf: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
        j_max: f64,
    ) -> bool {
        jf.abs() < j_max.abs() + J_EPS && self.check(signs, limits, jf, v_max, v_min, a_max, a_min)
    }

    /// Validates a velocity-interface profile living in phases 0..=2 with
    /// jerks `j0` and `j2`. Only the final velocity and acceleration matter.
    pub fn check_for_velocity(&mut self, limits: ReachedLimits, j0: f64, j2: f64, a_max: f64, a_min: f64) -> bool {
        if !self.accept_durations() {
            return false;
        }

        let signed = |t: f64, j: f64| if t > 0.0 { j } else { 0.0 };
        self.j = [signed(self.t[0], j0), 0.0, signed(self.t[2], j2), 0.0, 0.0, 0.0, 0.0];
        for i in 0..7 {
            self.integrate_phase(i);
        }

        let up = a_max > 0.0;
        self.direction = if up { Direction::Up } else { Direction::Down };
        self.jerk_signs = if j0 * j2 < 0.0 { JerkSigns::Uddu } else { JerkSigns::Udud };
        self.limits = limits;
        let a_upp = if up { a_max } else { a_min } + A_EPS;
        let a_low = if up { a_min } else { a_max } - A_EPS;

        (self.v[7] - self.vf).abs() < V_PRECISION
            && (self.a[7] - self.af).abs() < A_PRECISION
            && self.a[1] >= a_low
            && self.a[1] <= a_upp
    }

    /// Adopts the phase timing of `reference` with all jerks scaled by
    /// `scale`, then validates the result against this DOF's own limits.
    /// Used for phase synchronization of collinear motions.
    #[allow(clippy::too_many_arguments)]
    pub fn check_scaled(
        &mut self,
        reference: &Profile,
        scale: f64,
        check_position: bool,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
        j_max: f64,
    ) -> bool {
        self.t = reference.t;
        self.t_sum = reference.t_sum;
        self.limits = reference.limits;
        self.jerk_signs = reference.jerk_signs;
        self.direction = if scale >= 0.0 { reference.direction } else {
            match reference.direction {
                Direction::Up => Direction::Down,
                Direction::Down => Direction::Up,
            }
        };
        for i in 0..7 {
            self.j[i] = reference.j[i] * scale;
            if self.j[i].abs() > j_max + J_EPS {
                return false;
            }
            self.integrate_phase(i);
        }

        let v_upp = v_max + V_EPS;
        let v_low = v_min - V_EPS;
        let a_upp = a_max + A_EPS;
        let a_low = a_min - A_EPS;
        for i in 0..7 {
            if !(self.a[i + 1] >= a_low && self.a[i + 1] <= a_upp) {
                return false;
            }
            if check_position {
                if !(self.v[i + 1] >= v_low && self.v[i + 1] <= v_upp) {
                    return false;
                }
                if self.a[i + 1] * self.a[i] < -f64::EPSILON && self.j[i] != 0.0 {
                    let v_a_zero = self.v[i] - self.a[i] * self.a[i] / (2.0 * self.j[i]);
                    if v_a_zero > v_upp || v_a_zero < v_low {
                        return false;
                    }
                }
            }
        }

        if check_position {
            self.reaches_target()
        } else {
            (self.v[7] - self.vf).abs() < V_PRECISION && (self.a[7] - self.af).abs() < A_PRECISION
        }
    }

    /// Zero-duration profile that holds the start state (acceleration is
    /// kept constant when evaluated past the end).
    pub fn set_hold(&mut self) {
        self.t = [0.0; 7];
        self.t_sum = [0.0; 7];
        self.j = [0.0; 7];
        for i in 1..8 {
            self.p[i] = self.p[0];
            self.v[i] = self.v[0];
            self.a[i] = self.a[0];
        }
        self.limits = ReachedLimits::None;
    }

    /// State `(p, v, a, j)` at time `t` since the start of the profile
    /// (brake included). Past the end the final acceleration is held.
    pub fn state_at(&self, t: f64) -> (f64, f64, f64, f64) {
        let t = t.max(0.0);
        if t < self.brake.duration {
            return self.brake.state_at(t);
        }

        let t = t - self.brake.duration;
        match self.t_sum.iter().position(|&ts| t < ts) {
            Some(i) => {
                let dt = t - (self.t_sum[i] - self.t[i]);
                let j = self.j[i];
                (
                    self.p[i] + dt * (self.v[i] + dt * (self.a[i] / 2.0 + dt * j / 6.0)),
                    self.v[i] + dt * (self.a[i] + dt * j / 2.0),
                    self.a[i] + dt * j,
                    j,
                )
            }
            None => {
                let dt = t - self.t_sum[6];
                (
                    self.p[7] + dt * (self.v[7] + dt * self.a[7] / 2.0),
                    self.v[7] + dt * self.a[7],
                    self.a[7],
                    0.0,
                )
            }
        }
    }

    /// Position extrema over the brake and the seven phases.
    pub fn position_extrema(&self) -> PositionExtrema {
        let mut ext;
        let mut t0 = 0.0;
        if self.brake.duration > 0.0 {
            ext = PositionExtrema::at(self.brake.p[0], 0.0);
            for i in 0..2 {
                let b = &self.brake;
                ext.add_segment(t0, b.t[i], b.p[i], b.v[i], b.a[i], b.j[i]);
                t0 += b.t[i];
            }
        } else {
            ext = PositionExtrema::at(self.p[0], 0.0);
        }

        for i in 0..7 {
            if self.t[i] > 0.0 {
                ext.add_segment(t0, self.t[i], self.p[i], self.v[i], self.a[i], self.j[i]);
            }
            t0 += self.t[i];
        }
        ext
    }
}
