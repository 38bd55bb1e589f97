//! A wrapper around [`nalgebra::Matrix`] interpreting it as a polynomial.
//!
//! The fitter uses it to evaluate a segment's first and second derivative
//! while searching for the closest point.

use nalgebra::allocator::Allocator;
use nalgebra::dimension::{Const, Dim, DimDiff, DimName, DimSub, U1};
use nalgebra::storage::{RawStorage, Storage, StorageMut};
use nalgebra::{DefaultAllocator, Field, Matrix, OMatrix, OVector, Owned, Scalar};
use std::fmt;

/// Wrapper around [`nalgebra::Matrix`] interpreting it as a polynomial:
/// $p: \R \to \R^r $ where $r$ is the number of rows i.e. the generic `R` parameter
///
/// This means rows are the polynomials for each coordinate
/// and columns are the different powers' coefficents.
pub struct Polynomial<T, R, C, S>(pub Matrix<T, R, C, S>);

impl<T: Scalar, R: DimName, C: Dim, S: Storage<T, R, C>> Polynomial<T, R, C, S> {
    /// Evaluate `self` at position `x` and store the result into `out`.
    pub fn evaluate_to<S2>(&self, x: T, out: &mut Matrix<T, R, U1, S2>)
    where
        T: Field,
        S2: StorageMut<T, R, U1>,
    {
        out.fill(T::zero());
        if self.0.ncols() == 0 {
            return;
        }
        for i in 0..self.0.ncols() - 1 {
            let i = self.0.ncols() - 1 - i;
            *out += self.0.column(i);
            *out *= x.clone();
        }
        *out += self.0.column(0);
    }

    /// Evaluate `self` at position `x`.
    pub fn evaluate(&self, x: T) -> OVector<T, R>
    where
        T: Field,
        DefaultAllocator: Allocator<T, R>,
    {
        let mut out = OVector::from_element(T::zero());
        self.evaluate_to(x, &mut out);
        out
    }

    /// Calculate `self`'s derivative and store the result into `out`.
    pub fn derive_to<S2>(&self, out: &mut Matrix<T, R, DimDiff<C, U1>, S2>)
    where
        T: Field,
        C: DimSub<U1>,
        S2: StorageMut<T, R, DimDiff<C, U1>>,
    {
        let mut exponent = T::one();
        for i in 1..self.0.ncols() {
            out.set_column(i - 1, &self.0.column(i));
            *&mut out.column_mut(i - 1) *= exponent.clone();
            exponent += T::one();
        }
    }

    /// Calculate `self`'s derivative.
    pub fn derive(&self) -> Polynomial<T, R, DimDiff<C, U1>, Owned<T, R, DimDiff<C, U1>>>
    where
        T: Field,
        C: DimSub<U1>,
        DefaultAllocator: Allocator<T, R, DimDiff<C, U1>>,
    {
        let (r, c) = self.0.shape_generic();
        let mut out = OMatrix::zeros_generic(r, c.sub(Const::<1>));
        self.derive_to(&mut out);
        Polynomial(out)
    }
}

impl<T: Scalar, R: Dim, R2: Dim, C: Dim, C2: Dim, S, S2> PartialEq<Polynomial<T, R2, C2, S2>>
    for Polynomial<T, R, C, S>
where
    S: RawStorage<T, R, C>,
    S2: RawStorage<T, R2, C2>,
{
    #[inline]
    fn eq(&self, rhs: &Polynomial<T, R2, C2, S2>) -> bool {
        self.0 == rhs.0
    }
}
impl<T, R, C, S: fmt::Debug> fmt::Debug for Polynomial<T, R, C, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.0.data.fmt(formatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix2x3, RowVector2, RowVector3, Vector2};

    #[test]
    fn derive() {
        assert_eq!(
            Polynomial(RowVector3::new(1.0, 2.0, 3.0)).derive(),
            Polynomial(RowVector2::new(2.0, 6.0))
        );
    }

    #[test]
    fn evaluate() {
        // x(t) = 1 + 2t + 3t^2, y(t) = -t^2
        let p = Polynomial(Matrix2x3::new(1.0, 2.0, 3.0, 0.0, 0.0, -1.0));
        assert_eq!(p.evaluate(0.0), Vector2::new(1.0, 0.0));
        assert_eq!(p.evaluate(2.0), Vector2::new(17.0, -4.0));
        assert_eq!(p.derive().evaluate(2.0), Vector2::new(14.0, -4.0));
    }
}
