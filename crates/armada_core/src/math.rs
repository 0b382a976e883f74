//! Fixed-point math utilities for deterministic simulation.
//!
//! All combat resolution uses fixed-point arithmetic so every peer
//! computes bit-identical results. This includes the trigonometry used for
//! headings and homing, which is evaluated with fixed-length series instead
//! of the platform float library.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// PI in 32.32 fixed point.
pub const PI: Fixed = Fixed::from_bits(13_493_037_705);

/// PI / 2 in 32.32 fixed point.
pub const FRAC_PI_2: Fixed = Fixed::from_bits(6_746_518_852);

/// 2 * PI in 32.32 fixed point.
pub const TAU: Fixed = Fixed::from_bits(26_986_075_409);

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for hand-authored catalog numbers.
///
/// Data files are written with decimal literals (`speed: 4.5`). The value is
/// converted to fixed point exactly once, at load time, so every process
/// loading the same file holds the same bits.
pub mod decimal_serde {
    use super::Fixed;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_num::<f64>())
    }

    /// Deserialize a decimal into a fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| D::Error::custom(format!("{value} is out of fixed-point range")))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Vector of the given length pointing along `angle` (radians).
    #[must_use]
    pub fn from_angle(angle: Fixed, length: Fixed) -> Self {
        Self::new(fixed_cos(angle) * length, fixed_sin(angle) * length)
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    ///
    /// Saturates at `Fixed::MAX` instead of overflowing, which happens
    /// once points are about 46,000 units apart.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x.saturating_sub(other.x);
        let dy = self.y.saturating_sub(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Squared length, saturating like [`Self::distance_squared`].
    #[must_use]
    pub fn length_squared(self) -> Fixed {
        self.distance_squared(Self::ZERO)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[must_use]
    pub fn cross(self, other: Self) -> Fixed {
        self.x * other.y - self.y * other.x
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> Fixed {
        let largest = self.x.saturating_abs().max(self.y.saturating_abs());
        if largest <= SQUARE_SAFE {
            return fixed_sqrt(self.dot(self));
        }
        // Scale into the unit square so the squares cannot overflow.
        let unit = Self::new(self.x / largest, self.y / largest);
        fixed_sqrt(unit.dot(unit)).saturating_mul(largest)
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }

    /// Heading (radians) of the direction from `self` towards `other`.
    #[must_use]
    pub fn heading_to(self, other: Self) -> Fixed {
        let diff = other - self;
        fixed_atan2(diff.y, diff.x)
    }
}

/// Largest component magnitude whose square sums fit in [`Fixed`].
const SQUARE_SAFE: Fixed = Fixed::from_bits(30_000_i64 << 32);

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..64 {
        let mid = low + (high - low) / 2_i64;
        if mid == low {
            break;
        }
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Wrap an angle into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: Fixed) -> Fixed {
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// Sine of an angle in radians.
#[must_use]
pub fn fixed_sin(angle: Fixed) -> Fixed {
    let mut x = wrap_angle(angle);
    // Fold into [-PI/2, PI/2] where the series converges quickly.
    if x > FRAC_PI_2 {
        x = PI - x;
    } else if x < -FRAC_PI_2 {
        x = -PI - x;
    }

    let x2 = x * x;
    let mut acc = Fixed::ONE;
    for divisor in [156_i64, 110, 72, 42, 20, 6] {
        acc = Fixed::ONE - x2 / divisor * acc;
    }
    x * acc
}

/// Cosine of an angle in radians.
#[must_use]
pub fn fixed_cos(angle: Fixed) -> Fixed {
    fixed_sin(angle + FRAC_PI_2)
}

/// Arctangent of `z` for `0 <= z <= 1`.
fn atan_unit(z: Fixed) -> Fixed {
    // Half-angle reduction keeps the series argument below tan(PI/8).
    let reduced = z / (Fixed::ONE + fixed_sqrt(Fixed::ONE + z * z));
    let r2 = reduced * reduced;

    let mut acc = Fixed::ZERO;
    for denominator in [15_i64, 13, 11, 9, 7, 5, 3] {
        acc = Fixed::ONE / denominator - r2 * acc;
    }
    let series = reduced * (Fixed::ONE - r2 * acc);
    series * 2_i64
}

/// Four-quadrant arctangent, returning radians in `(-PI, PI]`.
#[must_use]
pub fn fixed_atan2(y: Fixed, x: Fixed) -> Fixed {
    if x == Fixed::ZERO && y == Fixed::ZERO {
        return Fixed::ZERO;
    }

    let ax = x.abs();
    let ay = y.abs();
    let mut angle = if ax >= ay {
        atan_unit(ay / ax)
    } else {
        FRAC_PI_2 - atan_unit(ax / ay)
    };

    if x < Fixed::ZERO {
        angle = PI - angle;
    }
    if y < Fixed::ZERO {
        angle = -angle;
    }
    angle
}

/// Rotate `current` towards `desired` by at most `max_turn` radians.
///
/// Turns through the shortest arc. When the desired heading is exactly
/// opposite, the turn is positive (counter-clockwise). Shared by unit
/// steering and missile homing.
#[must_use]
pub fn rotate_toward(current: Fixed, desired: Fixed, max_turn: Fixed) -> Fixed {
    let diff = wrap_angle(desired - current);
    if diff.abs() <= max_turn {
        wrap_angle(desired)
    } else if diff > Fixed::ZERO {
        wrap_angle(current + max_turn)
    } else {
        wrap_angle(current - max_turn)
    }
}

/// Whether two circles overlap (touching counts).
#[must_use]
pub fn circles_overlap(a: Vec2Fixed, a_radius: Fixed, b: Vec2Fixed, b_radius: Fixed) -> bool {
    let reach = a_radius.saturating_add(b_radius);
    a.distance_squared(b) <= reach.saturating_mul(reach)
}

/// Whether a ray from `origin` along `heading` passes through the circle
/// at `target` with `radius`.
///
/// Exact tangent-line test: the circle is in front of the origin and its
/// centre lies within `radius` of the ray.
#[must_use]
pub fn is_facing(origin: Vec2Fixed, heading: Fixed, target: Vec2Fixed, radius: Fixed) -> bool {
    let to_target = target - origin;
    if to_target.length_squared() <= radius.saturating_mul(radius) {
        return true;
    }

    let forward = Vec2Fixed::from_angle(heading, Fixed::ONE);
    if forward.dot(to_target) <= Fixed::ZERO {
        return false;
    }
    forward.cross(to_target).abs() <= radius
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::AddAssign for Vec2Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
