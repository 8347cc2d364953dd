//! Parameter automation: breakpoint timelines with WebAudio ramp semantics.
//!
//! Every time-varying control (gain envelopes, filter sweeps, pitch glides,
//! live settings) is an [`Automation`]: a default value plus a sorted list of
//! events evaluated against the audio clock in seconds.

/// How the timeline reaches an event's value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    /// Jump to the value at the event time.
    Set,
    /// Linear ramp from the previous event.
    Linear,
    /// Exponential ramp from the previous event.
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Event {
    curve: Curve,
    time: f64,
    value: f64,
}

/// An automatable parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Automation {
    default: f64,
    /// Start point for a ramp scheduled before any other event.
    anchor: f64,
    events: Vec<Event>,
}

impl Automation {
    /// A parameter holding `value` until events say otherwise.
    pub fn new(value: f64) -> Self {
        Automation {
            default: value,
            anchor: 0.0,
            events: Vec::new(),
        }
    }

    /// Jump to `value` at `time`.
    pub fn set_value_at(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Curve::Set, value, time)
    }

    /// Ramp linearly from the previous event to `value`, arriving at `time`.
    pub fn linear_ramp_to(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Curve::Linear, value, time)
    }

    /// Ramp exponentially from the previous event to `value`, arriving at
    /// `time`. If either endpoint is non-positive the previous value holds
    /// until `time`, as in WebAudio.
    pub fn exponential_ramp_to(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Curve::Exponential, value, time)
    }

    /// Glide from whatever the parameter reads at `now` to `target` over
    /// `duration` seconds, discarding anything scheduled after `now`.
    pub fn ramp_to(&mut self, target: f64, now: f64, duration: f64) {
        let current = self.value_at(now);
        self.events.retain(|e| e.time <= now);
        self.set_value_at(current, now);
        self.linear_ramp_to(target, now + duration.max(0.0));
        self.prune_before(now);
    }

    /// Drop events that can no longer influence values at or after `time`.
    pub fn prune_before(&mut self, time: f64) {
        let idx = self.events.partition_point(|e| e.time <= time);
        if idx >= 2 {
            self.events.drain(..idx - 1);
        }
    }

    /// Evaluate the timeline at `time` (seconds).
    pub fn value_at(&self, time: f64) -> f64 {
        let idx = self.events.partition_point(|e| e.time <= time);
        let (t0, v0) = match idx {
            0 => (self.anchor, self.default),
            _ => {
                let prev = self.events[idx - 1];
                (prev.time, prev.value)
            }
        };

        let Some(next) = self.events.get(idx) else {
            return v0;
        };
        let span = next.time - t0;
        if span <= 0.0 {
            return match next.curve {
                Curve::Set => v0,
                _ => next.value,
            };
        }
        let progress = ((time - t0) / span).clamp(0.0, 1.0);
        match next.curve {
            Curve::Set => v0,
            Curve::Linear => v0 + (next.value - v0) * progress,
            Curve::Exponential => {
                if v0 <= 0.0 || next.value <= 0.0 {
                    v0
                } else {
                    v0 * (next.value / v0).powf(progress)
                }
            }
        }
    }

    /// Time of the last scheduled event.
    pub fn end_time(&self) -> f64 {
        self.events.last().map(|e| e.time).unwrap_or(self.anchor)
    }

    /// Value the timeline settles on after its last event.
    pub fn final_value(&self) -> f64 {
        self.events.last().map(|e| e.value).unwrap_or(self.default)
    }

    /// True if nothing is scheduled.
    pub fn is_static(&self) -> bool {
        self.events.is_empty()
    }

    fn insert(&mut self, curve: Curve, value: f64, time: f64) -> &mut Self {
        let idx = self.events.partition_point(|e| e.time <= time);
        self.events.insert(idx, Event { curve, time, value });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_default_without_events() {
        let p = Automation::new(0.7);
        assert_eq!(p.value_at(0.0), 0.7);
        assert_eq!(p.value_at(100.0), 0.7);
        assert!(p.is_static());
    }

    #[test]
    fn attack_then_exponential_decay() {
        let mut gain = Automation::new(0.0);
        gain.set_value_at(0.0, 1.0)
            .linear_ramp_to(0.05, 1.01)
            .exponential_ramp_to(0.001, 1.5);

        assert_eq!(gain.value_at(0.5), 0.0);
        assert!((gain.value_at(1.005) - 0.025).abs() < 1e-9, "halfway up the attack");
        assert!((gain.value_at(1.01) - 0.05).abs() < 1e-12);
        let mid = gain.value_at(1.255);
        assert!(mid < 0.05 && mid > 0.001, "decay in progress, got {mid}");
        assert!((gain.value_at(2.0) - 0.001).abs() < 1e-12);
        assert_eq!(gain.end_time(), 1.5);
        assert_eq!(gain.final_value(), 0.001);
    }

    #[test]
    fn exponential_from_zero_holds() {
        let mut p = Automation::new(0.0);
        p.set_value_at(0.0, 0.0).exponential_ramp_to(1.0, 1.0);
        assert_eq!(p.value_at(0.5), 0.0);
        assert_eq!(p.value_at(1.0), 1.0);
    }

    #[test]
    fn exponential_is_geometric() {
        let mut p = Automation::new(100.0);
        p.set_value_at(100.0, 0.0).exponential_ramp_to(400.0, 2.0);
        assert!((p.value_at(1.0) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn ramp_to_anchors_at_current_value() {
        let mut p = Automation::new(0.5);
        p.ramp_to(0.0, 10.0, 0.1);
        assert_eq!(p.value_at(10.0), 0.5, "no jump at the start of a live ramp");
        assert!((p.value_at(10.05) - 0.25).abs() < 1e-9);
        assert_eq!(p.value_at(10.2), 0.0);

        // Redirect mid-ramp.
        p.ramp_to(1.0, 10.05, 0.1);
        assert!((p.value_at(10.05) - 0.25).abs() < 1e-9);
        assert_eq!(p.value_at(11.0), 1.0);
    }

    #[test]
    fn prune_keeps_ramp_origin() {
        let mut p = Automation::new(0.0);
        p.set_value_at(0.0, 0.0)
            .linear_ramp_to(1.0, 1.0)
            .linear_ramp_to(0.0, 2.0);
        p.prune_before(1.5);
        assert!((p.value_at(1.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn values_stay_between_endpoints() {
        let mut p = Automation::new(0.0);
        p.set_value_at(0.0, 0.0)
            .linear_ramp_to(0.3, 0.05)
            .exponential_ramp_to(0.001, 2.0);
        for i in 0..2000 {
            let v = p.value_at(i as f64 * 0.001);
            assert!((0.0..=0.3).contains(&v), "automation out of range: {v}");
        }
    }
}
