//! Bin-domain to physical unit conversions.

use crate::prelude::RadarParameters;

pub const NMI_PER_KM: f64 = 0.539957;
pub const KNOTS_PER_MPS: f64 = 1.94384;

/// Subunits per bin in the Q2 fixed-point track fields.
const Q2_SCALE: f64 = 4.0;

pub fn km_to_nmi(km: f64) -> f64 {
    km * NMI_PER_KM
}

pub fn mps_to_knots(mps: f64) -> f64 {
    mps * KNOTS_PER_MPS
}

/// Stateless converter bound to one radar configuration.
#[derive(Debug, Clone, Copy)]
pub struct UnitConverter<'a> {
    params: &'a RadarParameters,
}

impl<'a> UnitConverter<'a> {
    pub fn new(params: &'a RadarParameters) -> Self {
        Self { params }
    }

    pub fn range_bin_to_km(&self, bin: f64) -> f64 {
        bin / self.params.range_bins as f64 * self.params.max_range_km
    }

    /// Velocity for a Doppler bin centred on `N_DOPPLER / 2`.
    ///
    /// `prf_index` wraps over the three configured PRFs.
    pub fn doppler_bin_to_mps(&self, bin: f64, prf_index: usize) -> f64 {
        let doppler_bins = self.params.doppler_bins as f64;
        let centered = bin - doppler_bins / 2.0;
        let prf = self.params.prf_hz[prf_index % self.params.prf_hz.len()];
        let doppler_hz = centered * prf / doppler_bins;
        doppler_hz * self.params.wavelength_m / 2.0
    }

    /// Removes Q2 scaling from a raw track field when the variant uses it.
    pub fn raw_to_bin(&self, raw: i64) -> f64 {
        if self.params.q2_fixed_point {
            raw as f64 / Q2_SCALE
        } else {
            raw as f64
        }
    }

    pub fn raw_range_to_km(&self, raw: i64) -> f64 {
        self.range_bin_to_km(self.raw_to_bin(raw))
    }

    pub fn raw_range_to_nmi(&self, raw: i64) -> f64 {
        km_to_nmi(self.raw_range_to_km(raw))
    }

    /// Uses the first PRF; the logs carry no PRF tag.
    pub fn raw_doppler_to_mps(&self, raw: i64) -> f64 {
        self.doppler_bin_to_mps(self.raw_to_bin(raw), 0)
    }

    pub fn raw_doppler_to_knots(&self, raw: i64) -> f64 {
        mps_to_knots(self.raw_doppler_to_mps(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::LogVariant;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn range_scales_to_max_range() {
        let params = RadarParameters::default();
        let units = UnitConverter::new(&params);
        assert!(close(units.range_bin_to_km(0.0), 0.0));
        assert!(close(units.range_bin_to_km(512.0), 60.0));
        assert!(close(units.range_bin_to_km(1024.0), 120.0));
    }

    #[test]
    fn centre_doppler_bin_is_zero_velocity() {
        let params = RadarParameters::default();
        let units = UnitConverter::new(&params);
        assert!(close(units.doppler_bin_to_mps(64.0, 0), 0.0));
        // one bin at 8 kHz over 128 bins at 0.1 m -> 3.125 m/s
        assert!(close(units.doppler_bin_to_mps(65.0, 0), 3.125));
        assert!(close(units.doppler_bin_to_mps(65.0, 1), 3.515625));
        assert!(close(
            units.doppler_bin_to_mps(65.0, 3),
            units.doppler_bin_to_mps(65.0, 0)
        ));
    }

    #[test]
    fn q2_fields_are_divided_before_conversion() {
        let params = RadarParameters::for_variant(LogVariant::Quick);
        let units = UnitConverter::new(&params);
        assert!(close(units.raw_to_bin(400), 100.0));
        assert!(close(units.raw_range_to_km(256), 60.0));
        assert!(close(units.raw_doppler_to_mps(64), 0.0));

        let full = RadarParameters::default();
        assert!(close(UnitConverter::new(&full).raw_to_bin(400), 400.0));
    }

    #[test]
    fn nautical_conversions() {
        assert!(close(km_to_nmi(100.0), 53.9957));
        assert!(close(mps_to_knots(10.0), 19.4384));
    }
}
