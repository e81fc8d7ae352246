//! Round-number tick selection for range rings and distance scales.

/// Picks a drawing interval for an axis or ring set spanning `range`
/// units, snapping to the conventional ladder of round values. A span of
/// exactly 360 is treated as degrees around a circle.
pub fn tick_interval(range: f64) -> f64 {
    let r = range.abs();
    if r <= 0.01 {
        0.002
    } else if r <= 0.02 {
        0.005
    } else if r <= 0.05 {
        0.01
    } else if r <= 0.1 {
        0.02
    } else if r <= 0.2 {
        0.05
    } else if r <= 0.5 {
        0.1
    } else if r <= 1.0 {
        0.25
    } else if r <= 2.0 {
        0.5
    } else if r <= 5.0 {
        1.0
    } else if r <= 10.0 {
        2.0
    } else if r <= 30.0 {
        5.0
    } else if r <= 50.0 {
        10.0
    } else if r <= 100.0 {
        20.0
    } else if r <= 300.0 {
        50.0
    } else if r == 360.0 {
        90.0
    } else if r <= 1500.0 {
        100.0
    } else if r <= 3000.0 {
        200.0
    } else if r <= 7500.0 {
        500.0
    } else if r <= 15000.0 {
        1000.0
    } else if r <= 30000.0 {
        2000.0
    } else {
        5000.0
    }
}
