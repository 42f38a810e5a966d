//! Búsquedas en tablas muestreadas uniformemente e interpolación en
//! tablas de pares `(x, y)` ordenadas por `x`.

use crate::matrix::{lerp, Vec3};

fn position(p: f32, min: f32, max: f32, last: usize) -> f32 {
    (p.max(min).min(max) - min) / (max - min) * last as f32
}

/// Búsqueda lineal en una tabla que muestrea `[min, max]`.
pub fn lookup_1d(table: &[f32], min: f32, max: f32, p: f32) -> f32 {
    let last = match table.len() {
        0 => return 0.0,
        len => len - 1,
    };

    let r = position(p, min, max, last);
    let i = r as usize;

    lerp(table[i], table[(i + 1).min(last)], r - i as f32)
}

/// Búsqueda con interpolación de Hermite cúbica.
pub fn lookup_cubic_1d(table: &[f32], min: f32, max: f32, p: f32) -> f32 {
    if table.len() < 3 {
        return lookup_1d(table, min, max, p);
    }

    let last = table.len() - 1;
    let r = position(p, min, max, last);
    if r >= last as f32 {
        return table[last];
    }

    let i = r as usize;
    let dy = table[i + 1] - table[i];
    let (m0, m1) = if i < last - 1 {
        let m1 = (dy + (table[i + 2] - table[i + 1])) * 0.5;
        let m0 = if i > 0 {
            (dy + (table[i] - table[i - 1])) * 0.5
        } else {
            (3.0 * dy - m1) * 0.5
        };

        (m0, m1)
    } else {
        let m0 = (dy + (table[i] - table[i - 1])) * 0.5;
        (m0, (3.0 * dy - m0) * 0.5)
    };

    hermite(table[i], table[i + 1], m0, m1, r - i as f32)
}

/// Búsqueda trilineal en un cubo de `size` muestras de tres canales,
/// con el índice `z` variando más rápido.
pub fn lookup_3d(table: &[Vec3], size: [usize; 3], min: Vec3, max: Vec3, p: Vec3) -> Vec3 {
    if size.iter().any(|&n| n == 0) || table.len() < size.iter().product() {
        return Vec3::default();
    }

    let axis = |p: f32, min: f32, max: f32, n: usize| {
        let r = position(p, min, max, n - 1);
        let i = r as usize;
        (i, (i + 1).min(n - 1), r - i as f32)
    };

    let (i, i1, u) = axis(p.x, min.x, max.x, size[0]);
    let (j, j1, v) = axis(p.y, min.y, max.y, size[1]);
    let (k, k1, w) = axis(p.z, min.z, max.z, size[2]);
    let at = |i: usize, j: usize, k: usize| table[(i * size[1] + j) * size[2] + k];

    let near = at(i, j, k).lerp(at(i1, j, k), u).lerp(at(i, j1, k).lerp(at(i1, j1, k), u), v);
    let far = at(i, j, k1).lerp(at(i1, j, k1), u).lerp(at(i, j1, k1).lerp(at(i1, j1, k1), u), v);

    near.lerp(far, w)
}

/// Interpolación lineal por tramos.
pub fn interpolate_1d(table: &[[f32; 2]], p: f32) -> f32 {
    match segment(table, p) {
        Segment::Empty => 0.0,
        Segment::Exact(y) => y,
        Segment::Between(i) => {
            let ([x0, y0], [x1, y1]) = (table[i], table[i + 1]);
            lerp(y0, y1, (p - x0) / (x1 - x0))
        }
    }
}

/// Interpolación cúbica de Hermite por tramos.
pub fn interpolate_cubic_1d(table: &[[f32; 2]], p: f32) -> f32 {
    if table.len() < 3 {
        return interpolate_1d(table, p);
    }

    let i = match segment(table, p) {
        Segment::Empty => return 0.0,
        Segment::Exact(y) => return y,
        Segment::Between(i) => i,
    };

    let ([x0, y0], [x1, y1]) = (table[i], table[i + 1]);
    let (dx, dy) = (x1 - x0, y1 - y0);

    let mut m0 = 0.0;
    let mut m1 = 0.0;
    if i > 0 {
        let [xp, yp] = table[i - 1];
        m0 = 0.5 * (dy + dx * (y0 - yp) / (x0 - xp));
    }

    if i < table.len() - 2 {
        let [xn, yn] = table[i + 2];
        m1 = 0.5 * (dy + dx * (yn - y1) / (xn - x1));
    }

    if i == 0 {
        m0 = 0.5 * (3.0 * dy - m1);
    }

    if i >= table.len() - 2 {
        m1 = 0.5 * (3.0 * dy - m0);
    }

    hermite(y0, y1, m0, m1, (p - x0) / dx)
}

enum Segment {
    Empty,
    Exact(f32),
    Between(usize),
}

/// Tramo de la tabla que contiene a `p`, por búsqueda binaria.
fn segment(table: &[[f32; 2]], p: f32) -> Segment {
    let (first, last) = match (table.first(), table.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Segment::Empty,
    };

    if p < first[0] {
        return Segment::Exact(first[1]);
    } else if p >= last[0] {
        return Segment::Exact(last[1]);
    }

    let (mut i, mut j) = (0, table.len());
    while i + 1 < j {
        let k = (i + j) / 2;
        if table[k][0] == p {
            return Segment::Exact(table[k][1]);
        } else if table[k][0] < p {
            i = k;
        } else {
            j = k;
        }
    }

    Segment::Between(i)
}

fn hermite(y0: f32, y1: f32, m0: f32, m1: f32, t: f32) -> f32 {
    let (t2, t3) = (t * t, t * t * t);

    y0 * (2.0 * t3 - 3.0 * t2 + 1.0) + m0 * (t3 - 2.0 * t2 + t) + y1 * (3.0 * t2 - 2.0 * t3) + m1 * (t3 - t2)
}

#[cfg(test)]
mod test {
    use super::*;

    fn identity_cube(n: usize) -> Vec<Vec3> {
        let step = |i: usize| i as f32 / (n - 1) as f32;
        let mut table = Vec::with_capacity(n * n * n);

        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    table.push(Vec3::new(step(i), step(j), step(k)));
                }
            }
        }

        table
    }

    #[test]
    fn trilinear_identity_cube() {
        let table = identity_cube(2);
        let (min, max) = (Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

        let mid = Vec3::new(0.5, 0.5, 0.5);
        assert_eq!(lookup_3d(&table, [2, 2, 2], min, max, mid), mid);

        let p = Vec3::new(0.25, 0.75, 0.1);
        let q = lookup_3d(&identity_cube(5), [5, 5, 5], min, max, p);
        assert!((q.x - p.x).abs() < 1e-6 && (q.y - p.y).abs() < 1e-6 && (q.z - p.z).abs() < 1e-6);

        // Fuera de rango se satura
        let high = lookup_3d(&table, [2, 2, 2], min, max, Vec3::new(2.0, -1.0, 0.5));
        assert_eq!(high, Vec3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn one_dimensional_lookups() {
        let table = [0.0, 10.0, 20.0, 40.0];

        assert_eq!(lookup_1d(&table, 0.0, 3.0, 1.5), 15.0);
        assert_eq!(lookup_1d(&table, 0.0, 3.0, -5.0), 0.0);
        assert_eq!(lookup_1d(&table, 0.0, 3.0, 9.0), 40.0);
        assert_eq!(lookup_1d(&[], 0.0, 1.0, 0.5), 0.0);

        assert_eq!(lookup_cubic_1d(&table, 0.0, 3.0, 1.0), 10.0);
        assert_eq!(lookup_cubic_1d(&table, 0.0, 3.0, 3.0), 40.0);

        let linear = [0.0, 1.0, 2.0, 3.0];
        assert!((lookup_cubic_1d(&linear, 0.0, 3.0, 1.25) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn pair_interpolation() {
        let table = [[0.0, 0.0], [1.0, 2.0], [3.0, 4.0]];

        assert_eq!(interpolate_1d(&table, 0.5), 1.0);
        assert_eq!(interpolate_1d(&table, 2.0), 3.0);
        assert_eq!(interpolate_1d(&table, -1.0), 0.0);
        assert_eq!(interpolate_1d(&table, 7.0), 4.0);
        assert_eq!(interpolate_1d(&table, 1.0), 2.0);

        assert_eq!(interpolate_cubic_1d(&table, 1.0), 2.0);
        assert_eq!(interpolate_cubic_1d(&table[..2], 0.5), 1.0);
    }
}
