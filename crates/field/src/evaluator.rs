//! Two-well height field.

/// Divisor applied to the squared time oscillation.
const OSCILLATION_DIVISOR: f32 = 21.0;
/// Angular frequency of the time oscillation.
const OSCILLATION_FREQUENCY: f32 = 10.0;
/// Horizontal offset of each well from the origin.
const WELL_OFFSET: f32 = 1.5;
/// Divisor shared by both well distance terms.
const WELL_DIVISOR: f32 = 1.5;

/// Evaluates the height field at `(x, y)` for the already scaled time `t`.
///
/// The landscape is the product of the squared distances to the wells at
/// `(±1.5, 0)`, lifted by a small `cos(10t)^2 / 21` oscillation:
///
/// ```text
/// z = ( ((x-1.5)^2 + y^2)/1.5 * ((x+1.5)^2 + y^2)/1.5 + k ) / 2
/// ```
///
/// Total over finite input; `t = 0` is valid.
pub fn evaluate_field(x: f32, y: f32, t: f32) -> f32 {
    let oscillation = (OSCILLATION_FREQUENCY * t).cos();
    let k = oscillation * oscillation / OSCILLATION_DIVISOR;

    let right = well_distance(x - WELL_OFFSET, y);
    let left = well_distance(x + WELL_OFFSET, y);

    (right * left + k) / 2.0
}

fn well_distance(dx: f32, dy: f32) -> f32 {
    (dx * dx + dy * dy) / WELL_DIVISOR
}
