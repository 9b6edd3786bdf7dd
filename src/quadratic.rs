//! Quadratic root selection

/// Which of the two roots of a quadratic equation to pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

#[derive(Debug, thiserror::Error)]
pub enum QuadraticError {
    #[error("sign must be +1 or -1, found {0}")]
    Sign(f64),
}
pub type Result<T> = std::result::Result<T, QuadraticError>;

impl Sign {
    /// Sign of a non-zero number, [`Sign::Plus`] for `v>0`
    pub fn of(v: f64) -> Self {
        if v < 0f64 {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }
    pub fn value(&self) -> f64 {
        match self {
            Sign::Plus => 1f64,
            Sign::Minus => -1f64,
        }
    }
}
impl TryFrom<f64> for Sign {
    type Error = QuadraticError;
    fn try_from(value: f64) -> Result<Self> {
        if value == 1f64 {
            Ok(Sign::Plus)
        } else if value == -1f64 {
            Ok(Sign::Minus)
        } else {
            Err(QuadraticError::Sign(value))
        }
    }
}
impl TryFrom<i32> for Sign {
    type Error = QuadraticError;
    fn try_from(value: i32) -> Result<Self> {
        Sign::try_from(value as f64)
    }
}

/// Solves $ax^2+bx+c=0$ for the root
/// $$x = \frac{-b \pm \sqrt{b^2-4ac}}{2a}$$
/// with the sign given by `sign`
///
/// Returns `None` if the discriminant is negative or if `a` is zero.
pub fn solve(sign: Sign, a: f64, b: f64, c: f64) -> Option<f64> {
    if a == 0f64 {
        log::trace!("degenerate quadratic: a=0");
        return None;
    }
    let discriminant = b * b - 4f64 * a * c;
    if discriminant < 0f64 {
        log::trace!("negative discriminant: {:e}", discriminant);
        return None;
    }
    Some((-b + sign.value() * discriminant.sqrt()) / (2f64 * a))
}
