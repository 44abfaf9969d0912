// src/classify/convert.rs
//! Raw value to physical unit conversions

/// Raw value corresponding to full scale
pub const ADC_FULL_SCALE_COUNTS: f64 = 2048.0;
/// Volts at full scale for spike waveforms
pub const SPIKE_FULL_SCALE_VOLTS: f64 = 3.0;
/// Volts at full scale for continuous A/D samples
pub const CONTINUOUS_FULL_SCALE_VOLTS: f64 = 5.0;

/// Seconds since the start of acquisition for a tick count
pub fn ticks_to_seconds(ticks: u64, ad_frequency: i32) -> f64 {
    ticks as f64 / ad_frequency as f64
}

/// Spike waveform value in volts; `gain` must be non-zero
pub fn spike_volts(raw: i16, gain: i32) -> f64 {
    f64::from(raw) * SPIKE_FULL_SCALE_VOLTS / ADC_FULL_SCALE_COUNTS / f64::from(gain)
}

/// Continuous A/D value in volts; `gain` must be non-zero
pub fn continuous_volts(raw: i16, gain: i32) -> f64 {
    f64::from(raw) * CONTINUOUS_FULL_SCALE_VOLTS / ADC_FULL_SCALE_COUNTS / f64::from(gain)
}

/// Ticks between consecutive samples of a slow channel (integer division).
///
/// `None` unless both frequencies are positive.
pub fn ticks_per_sample(ad_frequency: i32, channel_frequency: i32) -> Option<u64> {
    if ad_frequency <= 0 || channel_frequency <= 0 {
        return None;
    }
    Some((ad_frequency / channel_frequency) as u64)
}

/// Tick of sample `index` in a block whose first sample is at `first`
pub fn sample_ticks(first: u64, index: usize, ticks_per_sample: u64) -> u64 {
    first + index as u64 * ticks_per_sample
}
