//! Vectores y matrices cuadradas con la convención de CTL: los
//! vectores son filas y se multiplican por la izquierda.

use core::ops::{Add, Index, IndexMut, Mul};

/// Tolerancia bajo la cual una matriz se considera singular.
pub const EPSILON: f32 = f32::EPSILON;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn lerp(self, other: Vec3, t: f32) -> Self {
        Vec3 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            z: lerp(self.z, other.z, t),
        }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Self {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, other: Vec3) -> Self::Output {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

/// Matriz de `N` por `N`, fila mayor.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mat<const N: usize>(pub [[f32; N]; N]);

impl<const N: usize> Mat<N> {
    pub fn identity() -> Self {
        let mut m = Mat([[0.0; N]; N]);
        for i in 0..N {
            m[(i, i)] = 1.0;
        }

        m
    }

    pub fn transpose(&self) -> Self {
        let mut r = *self;
        for i in 0..N {
            for j in 0..N {
                r[(j, i)] = self[(i, j)];
            }
        }

        r
    }

    pub fn scale(&self, factor: f32) -> Self {
        let mut r = *self;
        r.0.iter_mut().flatten().for_each(|value| *value *= factor);
        r
    }

    /// Inversa por eliminación de Gauss-Jordan con pivoteo parcial.
    /// Retorna `None` si la matriz es singular.
    pub fn invert(&self) -> Option<Self> {
        let mut a = *self;
        let mut r = Mat::identity();

        for col in 0..N {
            let pivot = (col..N).max_by(|&i, &j| {
                a[(i, col)]
                    .abs()
                    .partial_cmp(&a[(j, col)].abs())
                    .unwrap_or(core::cmp::Ordering::Equal)
            })?;

            if a[(pivot, col)].abs() <= EPSILON {
                return None;
            }

            a.0.swap(col, pivot);
            r.0.swap(col, pivot);

            let inverse = 1.0 / a[(col, col)];
            for j in 0..N {
                a[(col, j)] *= inverse;
                r[(col, j)] *= inverse;
            }

            for row in (0..N).filter(|&row| row != col) {
                let factor = a[(row, col)];
                for j in 0..N {
                    a[(row, j)] -= factor * a[(col, j)];
                    r[(row, j)] -= factor * r[(col, j)];
                }
            }
        }

        Some(r)
    }

    /// Como [`Mat::invert`], pero una matriz singular produce la
    /// identidad.
    pub fn invert_or_identity(&self) -> Self {
        self.invert().unwrap_or_else(Mat::identity)
    }
}

impl<const N: usize> Default for Mat<N> {
    fn default() -> Self {
        Mat::identity()
    }
}

impl<const N: usize> Index<(usize, usize)> for Mat<N> {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        check_indices::<N>(row, col);
        &self.0[row][col]
    }
}

impl<const N: usize> IndexMut<(usize, usize)> for Mat<N> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        check_indices::<N>(row, col);
        &mut self.0[row][col]
    }
}

impl<const N: usize> Mul for Mat<N> {
    type Output = Mat<N>;

    fn mul(self, other: Mat<N>) -> Self::Output {
        let mut r = Mat([[0.0; N]; N]);
        for i in 0..N {
            for j in 0..N {
                r[(i, j)] = (0..N).map(|k| self[(i, k)] * other[(k, j)]).sum();
            }
        }

        r
    }
}

impl<const N: usize> Add for Mat<N> {
    type Output = Mat<N>;

    fn add(self, other: Mat<N>) -> Self::Output {
        let mut r = self;
        for i in 0..N {
            for j in 0..N {
                r[(i, j)] += other[(i, j)];
            }
        }

        r
    }
}

impl Mul<Mat<3>> for Vec3 {
    type Output = Vec3;

    fn mul(self, m: Mat<3>) -> Self::Output {
        let column = |j| self.x * m[(0, j)] + self.y * m[(1, j)] + self.z * m[(2, j)];
        Vec3::new(column(0), column(1), column(2))
    }
}

/// Transformación homogénea, con división entre `w`.
impl Mul<Mat<4>> for Vec3 {
    type Output = Vec3;

    fn mul(self, m: Mat<4>) -> Self::Output {
        let column = |j| self.x * m[(0, j)] + self.y * m[(1, j)] + self.z * m[(2, j)] + m[(3, j)];
        let w = column(3);

        Vec3::new(column(0) / w, column(1) / w, column(2) / w)
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn check_indices<const N: usize>(row: usize, col: usize) {
    assert!(
        row < N && col < N,
        "Matrix index [{}, {}] is out of bounds for {}x{}",
        row,
        col,
        N,
        N
    );
}

#[cfg(test)]
mod test {
    use super::*;

    fn close<const N: usize>(a: &Mat<N>, b: &Mat<N>) -> bool {
        a.0.iter()
            .flatten()
            .zip(b.0.iter().flatten())
            .all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn inversion_round_trip() {
        let m = Mat([[2.0, 0.5, 0.0], [1.0, 3.0, 0.25], [0.0, 1.0, 4.0]]);
        let inverse = m.invert().unwrap();

        assert!(close(&(m * inverse), &Mat::identity()));
        assert!(close(&(inverse * m), &Mat::identity()));

        let m = Mat([
            [0.4124, 0.2126, 0.0193, 0.0],
            [0.3576, 0.7152, 0.1192, 0.0],
            [0.1805, 0.0722, 0.9505, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        assert!(close(&(m * m.invert_or_identity()), &Mat::identity()));
    }

    #[test]
    fn singular_falls_back_to_identity() {
        let m = Mat([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 1.0]]);

        assert_eq!(m.invert(), None);
        assert_eq!(m.invert_or_identity(), Mat::identity());
    }

    #[test]
    fn row_vectors() {
        let swap = Mat([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(Vec3::new(1.0, 2.0, 3.0) * swap, Vec3::new(2.0, 1.0, 3.0));

        let mut translate = Mat::<4>::identity();
        translate[(3, 0)] = 1.0;
        assert_eq!(Vec3::new(1.0, 2.0, 3.0) * translate, Vec3::new(2.0, 2.0, 3.0));
        assert_eq!(swap.transpose(), swap);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn bounds() {
        let m = Mat::<3>::identity();
        let _ = m[(3, 0)];
    }
}
