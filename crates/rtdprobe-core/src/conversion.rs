//! RTD count → resistance → temperature
//!
//! The ADC result is a 15-bit ratio of the RTD resistance to the reference
//! resistor. Above 0 °C the Callendar–Van Dusen equation is inverted in
//! closed form; below 0 °C a 5th-degree polynomial fit is used instead.
//!
//! Nothing here clamps or validates. A resistance outside the physical range
//! can make the quadratic's radicand negative, in which case the result is
//! NaN and is returned as such.

/// Full-scale count of the 15-bit RTD reading
pub const RTD_FULL_SCALE: f64 = 32768.0;

/// Callendar–Van Dusen coefficient A
pub const RTD_A: f64 = 3.9083e-3;

/// Callendar–Van Dusen coefficient B
pub const RTD_B: f64 = -5.775e-7;

/// Polynomial fit for T < 0 °C, lowest order first
const POLY: [f64; 6] = [
    -242.02,
    2.2228,
    2.5859e-3,
    -4.8260e-6,
    -2.8183e-8,
    1.5243e-10,
];

/// Convert a 15-bit RTD reading to ohms
#[inline]
pub fn rtd_to_resistance(raw: u16, ref_resistor: f64) -> f64 {
    raw as f64 / RTD_FULL_SCALE * ref_resistor
}

/// Convert an RTD resistance to degrees Celsius
///
/// `rtd_nominal` is the element's resistance at 0 °C (100 Ω for PT100,
/// 1000 Ω for PT1000).
pub fn resistance_to_celsius(resistance: f64, rtd_nominal: f64) -> f64 {
    let temp = quadratic_celsius(resistance, rtd_nominal);
    // A negative radicand stays NaN instead of falling through to the fit
    if temp >= 0.0 || temp.is_nan() {
        return temp;
    }
    polynomial_celsius(resistance)
}

/// Closed-form inverse of R(T) = R0 (1 + A T + B T²)
pub fn quadratic_celsius(resistance: f64, rtd_nominal: f64) -> f64 {
    let z1 = -RTD_A;
    let z2 = RTD_A * RTD_A - 4.0 * RTD_B;
    let z3 = 4.0 * RTD_B / rtd_nominal;
    let z4 = 2.0 * RTD_B;

    (libm::sqrt(z2 + z3 * resistance) + z1) / z4
}

/// Empirical fit for sub-zero temperatures
///
/// The fit is taken on the raw resistance, it is not normalised to a
/// 100 Ω element.
pub fn polynomial_celsius(resistance: f64) -> f64 {
    let mut temp = 0.0;
    let mut rpoly = 1.0;
    for coeff in POLY {
        temp += coeff * rpoly;
        rpoly *= resistance;
    }
    temp
}

/// Convert degrees Celsius to Fahrenheit
#[inline]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
