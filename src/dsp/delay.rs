//! Delay: ring-buffer delay lines with feedback.
//!
//! [`DelayLine`] is the mono primitive (fractional read, used for the
//! per-voice chorus as well); [`FeedbackDelay`] is the stereo echo on the
//! signal graph's delay send.

/// A mono ring buffer that can be read at a fractional delay.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// A line able to hold `max_delay_samples` of history.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1) + 2],
            write_pos: 0,
        }
    }

    /// Longest delay this line can produce, in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 2
    }

    /// Read `delay_samples` behind the next write position, interpolating
    /// between neighbours. Delays shorter than one sample read one sample.
    #[inline]
    pub fn read(&self, delay_samples: f64) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1.0, self.capacity() as f64);
        let whole = delay as usize;
        let frac = (delay - whole as f64) as f32;

        let pos0 = (self.write_pos + len - whole) % len;
        let pos1 = (pos0 + len - 1) % len;
        let s0 = self.buffer[pos0];
        let s1 = self.buffer[pos1];
        s0 + frac * (s1 - s0)
    }

    /// Push one sample and advance.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }
}

/// A stereo echo: `out = line(in + feedback * out)`.
///
/// Time and feedback are passed per sample so they can follow automation.
#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    left: DelayLine,
    right: DelayLine,
    sample_rate: f64,
    max_delay: f64,
}

impl FeedbackDelay {
    /// Create a delay holding up to `max_delay_seconds`.
    pub fn new(sample_rate: f64, max_delay_seconds: f64) -> Self {
        let capacity = (sample_rate * max_delay_seconds).ceil() as usize;
        Self {
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            sample_rate,
            max_delay: max_delay_seconds,
        }
    }

    /// Process one stereo frame, returning the delayed (wet) signal.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32, delay_time: f64, feedback: f64) -> (f32, f32) {
        let delay_samples = delay_time.clamp(0.0, self.max_delay) * self.sample_rate;
        let feedback = feedback.clamp(0.0, 0.99) as f32;

        let wet_l = self.left.read(delay_samples);
        let wet_r = self.right.read(delay_samples);
        self.left.write(left + wet_l * feedback);
        self.right.write(right + wet_r * feedback);
        (wet_l, wet_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_line_reads_back_after_n_samples() {
        let mut line = DelayLine::new(16);
        line.write(1.0);
        for _ in 0..4 {
            line.write(0.0);
        }
        assert_eq!(line.read(5.0), 1.0);
        assert_eq!(line.read(4.0), 0.0);
        assert!((line.read(4.5) - 0.5).abs() < 1e-6, "fractional read interpolates");
    }

    #[test]
    fn echo_appears_after_delay_time() {
        let sample_rate = 44100.0;
        let delay_time = 0.01; // 441 samples
        let mut delay = FeedbackDelay::new(sample_rate, 1.0);

        let (first, _) = delay.process(1.0, 1.0, delay_time, 0.0);
        assert_eq!(first, 0.0, "nothing comes out before the echo");

        let delay_samples = (delay_time * sample_rate) as usize;
        for _ in 1..delay_samples {
            let (out_l, _) = delay.process(0.0, 0.0, delay_time, 0.0);
            assert!(out_l.abs() < 1e-6);
        }

        let (out_l, out_r) = delay.process(0.0, 0.0, delay_time, 0.0);
        assert!((out_l - 1.0).abs() < 1e-6);
        assert!((out_r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn feedback_repeats_attenuated() {
        let sample_rate = 1000.0;
        let delay_time = 0.01; // 10 samples
        let mut delay = FeedbackDelay::new(sample_rate, 1.0);

        delay.process(1.0, 1.0, delay_time, 0.5);
        for _ in 1..10 {
            delay.process(0.0, 0.0, delay_time, 0.5);
        }
        let (first_echo, _) = delay.process(0.0, 0.0, delay_time, 0.5);
        assert!((first_echo - 1.0).abs() < 1e-6);

        for _ in 1..10 {
            delay.process(0.0, 0.0, delay_time, 0.5);
        }
        let (second_echo, _) = delay.process(0.0, 0.0, delay_time, 0.5);
        assert!((second_echo - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delay_time_is_capped_at_maximum() {
        let mut delay = FeedbackDelay::new(100.0, 2.0);
        delay.process(1.0, 1.0, 10.0, 0.0);
        let mut heard_at = None;
        for i in 1..400 {
            let (l, _) = delay.process(0.0, 0.0, 10.0, 0.0);
            if l > 0.5 {
                heard_at = Some(i);
                break;
            }
        }
        assert_eq!(heard_at, Some(200), "a 10 s request plays at the 2 s cap");
    }
}
