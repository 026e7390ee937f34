/// Defines the factor to convert Joule to electron-volt (eV)
pub const JOULE_TO_EV: f64 = 6.24150974e18;

/// Defines the default length scale of the problem (m)
pub const DEFAULT_LENGTH_SCALE: f64 = 1.0e-9;

/// Defines the default pressure scale of the problem (Pa)
pub const DEFAULT_PRESSURE_SCALE: f64 = 1.0e6;

/// Defines the minimum value of the sum of interpolation weights
///
/// The sum is clamped to this value before normalization to avoid divisions by zero
/// when no grain is active at a point.
pub const INTERP_WEIGHT_TOL: f64 = 1.0e-10;

/// Defines the default stiffness of the fully damaged material (residual stiffness factor)
pub const DEFAULT_KDAMAGE: f64 = 1.0e-6;

/// Defines the slip systems of face-centered cubic (FCC) crystals
///
/// Each row holds the slip plane normal (first three values) and the slip direction (last three values).
/// Systems sharing the same normal belong to the same slip plane.
pub const FCC_SLIP_SYSTEMS: [[f64; 6]; 12] = [
    [1.0, 1.0, 1.0, 0.0, 1.0, -1.0],
    [1.0, 1.0, 1.0, 1.0, 0.0, -1.0],
    [1.0, 1.0, 1.0, 1.0, -1.0, 0.0],
    [-1.0, 1.0, 1.0, 0.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0, 1.0, 0.0, 1.0],
    [-1.0, 1.0, 1.0, 1.0, 1.0, 0.0],
    [1.0, -1.0, 1.0, 0.0, 1.0, 1.0],
    [1.0, -1.0, 1.0, 1.0, 0.0, -1.0],
    [1.0, -1.0, 1.0, 1.0, 1.0, 0.0],
    [1.0, 1.0, -1.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, -1.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, -1.0, 1.0, -1.0, 0.0],
];
