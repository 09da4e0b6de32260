//! Echo timing for a transmitter/receiver transducer pair.

/// Straight-line distance between two transducers offset by `dx_m` and
/// `dy_m`, in metres.
pub fn path_length_m(dx_m: f32, dy_m: f32) -> f32 {
    libm::hypotf(dx_m, dy_m)
}

/// Time of flight over the diagonal path, in nanoseconds
pub fn time_of_flight_ns(dx_m: f32, dy_m: f32, speed_m_s: f32) -> u32 {
    let seconds = path_length_m(dx_m, dy_m) / speed_m_s;
    libm::roundf(seconds * 1e9) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts;

    #[test]
    fn test_path_length() {
        assert!((path_length_m(3.0, 4.0) - 5.0).abs() < 1e-4);
        assert!((path_length_m(0.03, 0.03) - 0.042_426).abs() < 1e-5);
        assert_eq!(path_length_m(0.0, 0.0), 0.0);
        // squares would overflow f32
        assert!((path_length_m(3e20, 4e20) / 5e20 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_time_of_flight() {
        let tof = time_of_flight_ns(
            consts::TRANSDUCER_DX_M,
            consts::TRANSDUCER_DY_M,
            consts::SPEED_OF_SOUND_M_S,
        );
        // 0.0424 m / 343 m/s ~= 123.7 us
        assert!((123_600..=123_800).contains(&tof), "tof = {}", tof);
    }
}
