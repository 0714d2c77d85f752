//! Piecewise-linear color ramps.
//!
//! A gradient with `N` stops splits `[0, 1]` into `N - 1` equal segments;
//! an intensity is mapped to its segment and blended linearly between the
//! two stops bounding it.

use palette::Srgb;

use crate::error::ColorError;
use crate::utils::interpolate_channel;

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<Srgb<u8>>,
}

impl Gradient {
    pub fn new(stops: Vec<Srgb<u8>>) -> Result<Self, ColorError> {
        if stops.len() < 2 {
            return Err(ColorError::TooFewStops(stops.len()));
        }
        Ok(Gradient { stops })
    }

    /// Color at intensity `t`. The end stops are returned verbatim for
    /// `t <= 0` and `t >= 1`; NaN maps to the first stop.
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let last = self.stops.len() - 1;
        if !(t > 0.0) {
            return channels(self.stops[0]);
        }
        if t >= 1.0 {
            return channels(self.stops[last]);
        }

        let position = t * last as f64;
        let index = (position.floor() as usize).min(last - 1);
        let fraction = (position - index as f64).min(1.0);

        let (from, to) = (self.stops[index], self.stops[index + 1]);
        [
            interpolate_channel(from.red, to.red, fraction),
            interpolate_channel(from.green, to.green, fraction),
            interpolate_channel(from.blue, to.blue, fraction),
        ]
    }
}

fn channels(color: Srgb<u8>) -> [u8; 3] {
    [color.red, color.green, color.blue]
}
