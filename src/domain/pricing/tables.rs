//! Static price tables, in paise (1/100 INR).
//!
//! Lookups are exact-match: a combination that is not listed here cannot be
//! ordered.

use super::{Binding, ColorMode, Lamination, PaperSize, PaperType, Sides};

use super::Binding as B;
use super::ColorMode::{BlackWhite as Bw, Color as Cl};
use super::Lamination as L;
use super::PaperSize::{A0, A1, A2, A3, A4, A5};
use super::PaperType as P;
use super::Sides::{Double as Dbl, Single as Sgl};

/// Per printed page, keyed by (size, color, sides).
pub const BOOK_PRINTOUTS: &[((PaperSize, ColorMode, Sides), i64)] = &[
    ((A5, Bw, Sgl), 100),
    ((A5, Bw, Dbl), 160),
    ((A5, Cl, Sgl), 500),
    ((A5, Cl, Dbl), 900),
    ((A4, Bw, Sgl), 150),
    ((A4, Bw, Dbl), 250),
    ((A4, Cl, Sgl), 800),
    ((A4, Cl, Dbl), 1400),
    ((A3, Bw, Sgl), 300),
    ((A3, Bw, Dbl), 500),
    ((A3, Cl, Sgl), 1600),
    ((A3, Cl, Dbl), 2800),
];

/// Per bound copy, keyed by (binding, size).
pub const BOOK_BINDINGS: &[((Binding, PaperSize), i64)] = &[
    ((B::None, A5), 0),
    ((B::None, A4), 0),
    ((B::None, A3), 0),
    ((B::Staple, A5), 500),
    ((B::Staple, A4), 500),
    ((B::Staple, A3), 1000),
    ((B::Spiral, A5), 3000),
    ((B::Spiral, A4), 4000),
    ((B::Spiral, A3), 7000),
    ((B::Softcover, A5), 6000),
    ((B::Softcover, A4), 8000),
    ((B::Hardcover, A5), 15000),
    ((B::Hardcover, A4), 20000),
];

/// Cover lamination per copy, keyed by (lamination, size).
pub const BOOK_LAMINATION: &[((Lamination, PaperSize), i64)] = &[
    ((L::None, A5), 0),
    ((L::None, A4), 0),
    ((L::None, A3), 0),
    ((L::Matte, A5), 1500),
    ((L::Matte, A4), 2000),
    ((L::Matte, A3), 4000),
    ((L::Gloss, A5), 1500),
    ((L::Gloss, A4), 2000),
    ((L::Gloss, A3), 4000),
];

/// Per sheet, keyed by (size, paper type).
pub const MAP_PRODUCTS: &[((PaperSize, PaperType), i64)] = &[
    ((A3, P::Standard), 6000),
    ((A3, P::Glossy), 8000),
    ((A3, P::Matte), 8000),
    ((A2, P::Standard), 12000),
    ((A2, P::Glossy), 15000),
    ((A2, P::Matte), 15000),
    ((A1, P::Standard), 22000),
    ((A1, P::Glossy), 28000),
    ((A1, P::Matte), 28000),
    ((A0, P::Glossy), 45000),
    ((A0, P::Matte), 45000),
];

/// Per sheet, keyed by (lamination, size).
pub const MAP_LAMINATION: &[((Lamination, PaperSize), i64)] = &[
    ((L::None, A3), 0),
    ((L::None, A2), 0),
    ((L::None, A1), 0),
    ((L::None, A0), 0),
    ((L::Matte, A3), 4000),
    ((L::Matte, A2), 7000),
    ((L::Matte, A1), 12000),
    ((L::Gloss, A3), 4000),
    ((L::Gloss, A2), 7000),
    ((L::Gloss, A1), 12000),
    ((L::Gloss, A0), 20000),
];
