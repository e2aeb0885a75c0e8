use enum_dispatch::enum_dispatch;

/// Exploration rate update applied once per finished episode.
#[enum_dispatch]
pub trait EpsilonSchedule {
    fn next_epsilon(&mut self, epsilon: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Constant;

impl EpsilonSchedule for Constant {
    fn next_epsilon(&mut self, epsilon: f64) -> f64 {
        epsilon
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecay {
    pub decay: f64,
    pub final_epsilon: f64,
}

impl LinearDecay {
    pub fn new(decay: f64, final_epsilon: f64) -> Self {
        Self {
            decay,
            final_epsilon,
        }
    }
}

impl EpsilonSchedule for LinearDecay {
    fn next_epsilon(&mut self, epsilon: f64) -> f64 {
        (epsilon - self.decay).max(self.final_epsilon.min(epsilon))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    pub factor: f64,
    pub min_epsilon: f64,
}

impl ExponentialDecay {
    pub fn new(factor: f64, min_epsilon: f64) -> Self {
        Self {
            factor,
            min_epsilon,
        }
    }
}

impl EpsilonSchedule for ExponentialDecay {
    fn next_epsilon(&mut self, epsilon: f64) -> f64 {
        (epsilon * self.factor).max(self.min_epsilon.min(epsilon))
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(EpsilonSchedule)]
pub enum EnumEpsilonSchedule {
    Constant(Constant),
    LinearDecay(LinearDecay),
    ExponentialDecay(ExponentialDecay),
}

impl Default for EnumEpsilonSchedule {
    fn default() -> Self {
        Constant.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_keeps_epsilon() {
        let mut schedule = EnumEpsilonSchedule::default();
        assert_eq!(schedule.next_epsilon(0.1), 0.1);
    }

    #[test]
    fn test_linear_decay_stops_at_final() {
        let mut schedule: EnumEpsilonSchedule = LinearDecay::new(0.25, 0.3).into();
        let mut epsilon = 1.0;
        epsilon = schedule.next_epsilon(epsilon);
        assert_eq!(epsilon, 0.75);
        epsilon = schedule.next_epsilon(epsilon);
        epsilon = schedule.next_epsilon(epsilon);
        assert_eq!(epsilon, 0.3);
        assert_eq!(schedule.next_epsilon(epsilon), 0.3);
    }

    #[test]
    fn test_exponential_decay_clamps_to_min() {
        let mut schedule: EnumEpsilonSchedule = ExponentialDecay::new(0.5, 0.2).into();
        assert_eq!(schedule.next_epsilon(1.0), 0.5);
        assert_eq!(schedule.next_epsilon(0.25), 0.2);
        assert_eq!(schedule.next_epsilon(0.2), 0.2);
    }

    #[test]
    fn test_decay_never_raises_epsilon() {
        let mut schedule: EnumEpsilonSchedule = LinearDecay::new(0.1, 0.5).into();
        assert_eq!(schedule.next_epsilon(0.2), 0.2);
    }
}
