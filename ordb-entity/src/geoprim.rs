//! 2-D affine transforms over [`Rational`] coordinates, and the eight-element
//! dihedral group D4 of axis-aligned rotations/mirrors used for cell/pin
//! orientation.

use crate::rational::Rational;
use std::fmt;

/// A point or displacement in the plane.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Vec2R {
    pub x: Rational,
    pub y: Rational,
}

impl Vec2R {
    pub fn new(x: Rational, y: Rational) -> Self {
        Vec2R { x, y }
    }
}

impl std::ops::Add for Vec2R {
    type Output = Vec2R;
    fn add(self, rhs: Vec2R) -> Vec2R {
        Vec2R::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// An axis-aligned rectangle, `lx <= ux` and `ly <= uy`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rect4R {
    pub lx: Rational,
    pub ly: Rational,
    pub ux: Rational,
    pub uy: Rational,
}

impl Rect4R {
    /// Construct a rectangle, panicking if the bound ordering invariant is
    /// violated — callers that cannot guarantee ordering should sort their
    /// corners first.
    pub fn new(lx: Rational, ly: Rational, ux: Rational, uy: Rational) -> Self {
        assert!(lx <= ux && ly <= uy, "Rect4R corners out of order");
        Rect4R { lx, ly, ux, uy }
    }

    pub fn lower_left(&self) -> Vec2R {
        Vec2R::new(self.lx, self.ly)
    }

    pub fn upper_right(&self) -> Vec2R {
        Vec2R::new(self.ux, self.uy)
    }
}

/// An affine transform: a linear part (one of eight D4 linear maps) plus a
/// translation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TD4 {
    flip_xy: bool,
    neg_x: bool,
    neg_y: bool,
    trans: Vec2R,
}

impl TD4 {
    pub fn new(flip_xy: bool, neg_x: bool, neg_y: bool, trans: Vec2R) -> Self {
        TD4 {
            flip_xy,
            neg_x,
            neg_y,
            trans,
        }
    }

    pub fn translation(trans: Vec2R) -> Self {
        TD4::new(false, false, false, trans)
    }

    pub fn identity() -> Self {
        TD4::translation(Vec2R::new(Rational::from_int(0), Rational::from_int(0)))
    }

    /// The 2x2 linear part as `(a, b, c, d)` with `x' = a*x + b*y`,
    /// `y' = c*x + d*y`.
    fn linear(&self) -> (i64, i64, i64, i64) {
        let sx = if self.neg_x { -1 } else { 1 };
        let sy = if self.neg_y { -1 } else { 1 };
        if self.flip_xy {
            (0, sy, sx, 0)
        } else {
            (sx, 0, 0, sy)
        }
    }

    pub fn apply_vec(&self, v: Vec2R) -> Vec2R {
        let (a, b, c, d) = self.linear();
        let x = Rational::from_int(a) * v.x + Rational::from_int(b) * v.y;
        let y = Rational::from_int(c) * v.x + Rational::from_int(d) * v.y;
        Vec2R::new(x, y) + self.trans
    }

    pub fn apply_rect(&self, r: Rect4R) -> Rect4R {
        let p0 = self.apply_vec(r.lower_left());
        let p1 = self.apply_vec(r.upper_right());
        let (lx, ux) = if p0.x <= p1.x { (p0.x, p1.x) } else { (p1.x, p0.x) };
        let (ly, uy) = if p0.y <= p1.y { (p0.y, p1.y) } else { (p1.y, p0.y) };
        Rect4R::new(lx, ly, ux, uy)
    }

    /// `-1` if this transform reverses orientation (a mirror), `+1` if it
    /// preserves it (a rotation).
    pub fn det(&self) -> i64 {
        let (a, b, c, d) = self.linear();
        a * d - b * c
    }

    pub fn is_flipped(&self) -> bool {
        self.det() < 0
    }

    /// Compose two transforms: `(self.then(other)).apply(p) == self.apply(other.apply(p))`.
    pub fn then(&self, other: &TD4) -> TD4 {
        let (a1, b1, c1, d1) = self.linear();
        let (a2, b2, c2, d2) = other.linear();
        let a = a1 * a2 + b1 * c2;
        let b = a1 * b2 + b1 * d2;
        let c = c1 * a2 + d1 * c2;
        let d = c1 * b2 + d1 * d2;
        let trans = self.apply_vec(other.trans);
        TD4 {
            flip_xy: false,
            neg_x: false,
            neg_y: false,
            trans,
        }
        .with_linear(a, b, c, d)
    }

    /// Rebuild the `flip_xy`/`neg_x`/`neg_y` triple from an explicit linear
    /// matrix; the matrix must be one of the eight D4 linear maps.
    fn with_linear(self, a: i64, b: i64, c: i64, d: i64) -> TD4 {
        let (flip_xy, neg_x, neg_y) = if a == 0 && d == 0 {
            (true, c < 0, b < 0)
        } else {
            (false, a < 0, d < 0)
        };
        TD4 {
            flip_xy,
            neg_x,
            neg_y,
            trans: self.trans,
        }
    }

    pub fn inv(&self) -> TD4 {
        let (a, b, c, d) = self.linear();
        // Every D4 linear map is its own inverse or its transpose; since
        // det is +-1 the inverse matrix is (d,-b,-c,a)/det.
        let det = self.det();
        let (ia, ib, ic, id) = (d * det, -b * det, -c * det, a * det);
        let neg_trans = Vec2R::new(-self.trans.x, -self.trans.y);
        let inv_lin = TD4 {
            flip_xy: false,
            neg_x: false,
            neg_y: false,
            trans: Vec2R::new(Rational::from_int(0), Rational::from_int(0)),
        }
        .with_linear(ia, ib, ic, id);
        let trans = inv_lin.apply_vec(neg_trans);
        TD4 { trans, ..inv_lin }
    }

    pub fn trans(&self) -> Vec2R {
        self.trans
    }
}

/// The eight-element dihedral group of axis-aligned orientations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum D4 {
    R0,
    R90,
    R180,
    R270,
    MX,
    MY,
    MX90,
    MY90,
}

impl D4 {
    pub const ALL: [D4; 8] = [
        D4::R0,
        D4::R90,
        D4::R180,
        D4::R270,
        D4::MX,
        D4::MY,
        D4::MX90,
        D4::MY90,
    ];

    /// North/East/South/West are the conventional aliases for the four pure
    /// rotations, matching LEF/DEF orientation naming.
    pub const NORTH: D4 = D4::R0;
    pub const EAST: D4 = D4::R270;
    pub const SOUTH: D4 = D4::R180;
    pub const WEST: D4 = D4::R90;

    pub fn to_td4(self) -> TD4 {
        let z = Rational::from_int(0);
        let t = Vec2R::new(z, z);
        match self {
            D4::R0 => TD4::new(false, false, false, t),
            D4::R90 => TD4::new(true, false, true, t),
            D4::R180 => TD4::new(false, true, true, t),
            D4::R270 => TD4::new(true, true, false, t),
            D4::MX => TD4::new(false, false, true, t),
            D4::MY => TD4::new(false, true, false, t),
            D4::MX90 => TD4::new(true, false, false, t),
            D4::MY90 => TD4::new(true, true, true, t),
        }
    }

    pub fn det(self) -> i64 {
        self.to_td4().det()
    }

    pub fn is_flipped(self) -> bool {
        self.det() < 0
    }

    /// The canonical non-flipped representative with the same rotation
    /// component; for a pure rotation this is a no-op. Derived from
    /// [`Self::flip`], which preserves the image of `Vec2R(0, 1)`.
    pub fn unflip(self) -> D4 {
        match self {
            D4::R0 | D4::R90 | D4::R180 | D4::R270 => self,
            D4::MX => D4::R180,
            D4::MY => D4::R0,
            D4::MX90 => D4::R270,
            D4::MY90 => D4::R90,
        }
    }

    /// The orientation with reversed handedness that agrees with `self`
    /// on `Vec2R(0, 1)`.
    pub fn flip(self) -> D4 {
        match self {
            D4::R0 => D4::MY,
            D4::R180 => D4::MX,
            D4::R270 => D4::MX90,
            D4::R90 => D4::MY90,
            already_flipped => already_flipped,
        }
    }

    /// The element `d` with `d * self == self * d == D4::R0`.
    pub fn inv(self) -> D4 {
        let target = self.to_td4().inv();
        D4::ALL
            .into_iter()
            .find(|d| d.to_td4() == target)
            .expect("D4 is closed under inverse")
    }

    /// LEF/DEF orientation code.
    pub fn lefdef(self) -> &'static str {
        match self {
            D4::R0 => "N",
            D4::R90 => "W",
            D4::R180 => "S",
            D4::R270 => "E",
            D4::MX => "FN",
            D4::MY => "FS",
            D4::MX90 => "FW",
            D4::MY90 => "FE",
        }
    }
}

impl fmt::Display for D4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lefdef())
    }
}
