//! Conversiones entre espacios de color CIE.

use crate::matrix::{Mat, Vec3};

/// Cromaticidades `xy` de los primarios y del blanco de un espacio RGB.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Chromaticities {
    pub red: [f32; 2],
    pub green: [f32; 2],
    pub blue: [f32; 2],
    pub white: [f32; 2],
}

/// Primarios de Rec. 709 con blanco D65.
pub const REC709: Chromaticities = Chromaticities {
    red: [0.64, 0.33],
    green: [0.30, 0.60],
    blue: [0.15, 0.06],
    white: [0.3127, 0.3290],
};

/// Matriz de RGB a XYZ, escalada para que el blanco tenga luminancia `y`.
pub fn rgb_to_xyz(chroma: &Chromaticities, y: f32) -> Mat<4> {
    let ([rx, ry], [gx, gy], [bx, by], [wx, wy]) = (chroma.red, chroma.green, chroma.blue, chroma.white);

    let x = wx * y / wy;
    let z = (1.0 - wx - wy) * y / wy;
    let d = rx * (by - gy) + bx * (gy - ry) + gx * (ry - by);

    let sr = (x * (by - gy) - gx * (y * (by - 1.0) + by * (x + z)) + bx * (y * (gy - 1.0) + gy * (x + z))) / d;
    let sg = (x * (ry - by) + rx * (y * (by - 1.0) + by * (x + z)) - bx * (y * (ry - 1.0) + ry * (x + z))) / d;
    let sb = (x * (gy - ry) - rx * (y * (gy - 1.0) + gy * (x + z)) + gx * (y * (ry - 1.0) + ry * (x + z))) / d;

    Mat([
        [sr * rx, sr * ry, sr * (1.0 - rx - ry), 0.0],
        [sg * gx, sg * gy, sg * (1.0 - gx - gy), 0.0],
        [sb * bx, sb * by, sb * (1.0 - bx - by), 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

pub fn xyz_to_rgb(chroma: &Chromaticities, y: f32) -> Mat<4> {
    rgb_to_xyz(chroma, y).invert_or_identity()
}

pub fn xyz_to_luv(xyz: Vec3, white: Vec3) -> Vec3 {
    let l = 116.0 * f(xyz.y / white.y) - 16.0;
    let u = 13.0 * l * (u_prime(xyz) - u_prime(white));
    let v = 13.0 * l * (v_prime(xyz) - v_prime(white));

    Vec3::new(l, u, v)
}

pub fn luv_to_xyz(luv: Vec3, white: Vec3) -> Vec3 {
    let (un, vn) = (u_prime(white), v_prime(white));
    let y = white.y * f_inverse((luv.x + 16.0) / 116.0);
    let d = 4.0 * (13.0 * luv.x * vn + luv.z);

    let x = 9.0 * (13.0 * luv.x * un + luv.y) * y / d;
    let z = -(3.0 * luv.y + 13.0 * luv.x * (-12.0 + 3.0 * un + 20.0 * vn) + 20.0 * luv.z) * y / d;

    Vec3::new(x, y, z)
}

pub fn xyz_to_lab(xyz: Vec3, white: Vec3) -> Vec3 {
    let fy = f(xyz.y / white.y);

    Vec3::new(
        116.0 * fy - 16.0,
        500.0 * (f(xyz.x / white.x) - fy),
        200.0 * (fy - f(xyz.z / white.z)),
    )
}

pub fn lab_to_xyz(lab: Vec3, white: Vec3) -> Vec3 {
    let fy = (lab.x + 16.0) / 116.0;
    let fx = lab.y / 500.0 + fy;
    let fz = fy - lab.z / 200.0;

    Vec3::new(white.x * f_inverse(fx), white.y * f_inverse(fy), white.z * f_inverse(fz))
}

fn f(x: f32) -> f32 {
    if x > 0.008856 {
        x.powf(1.0 / 3.0)
    } else {
        7.787 * x + 16.0 / 116.0
    }
}

fn f_inverse(t: f32) -> f32 {
    if t > 0.206892 {
        t * t * t
    } else {
        (t - 16.0 / 116.0) / 7.787
    }
}

fn u_prime(xyz: Vec3) -> f32 {
    4.0 * xyz.x / (xyz.x + 15.0 * xyz.y + 3.0 * xyz.z)
}

fn v_prime(xyz: Vec3) -> f32 {
    9.0 * xyz.y / (xyz.x + 15.0 * xyz.y + 3.0 * xyz.z)
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: Vec3, b: Vec3, tolerance: f32) -> bool {
        (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance && (a.z - b.z).abs() < tolerance
    }

    #[test]
    fn white_maps_to_white() {
        let m = rgb_to_xyz(&REC709, 1.0);
        let white = Vec3::new(1.0, 1.0, 1.0) * m;

        assert!((white.y - 1.0).abs() < 1e-4);
        assert!((white.x - 0.3127 / 0.3290).abs() < 1e-4);

        let back = white * xyz_to_rgb(&REC709, 1.0);
        assert!(close(back, Vec3::new(1.0, 1.0, 1.0), 1e-4));
    }

    #[test]
    fn perceptual_round_trips() {
        let white = Vec3::new(0.9505, 1.0, 1.089);
        let color = Vec3::new(0.3, 0.4, 0.2);

        assert!(close(luv_to_xyz(xyz_to_luv(color, white), white), color, 1e-4));
        assert!(close(lab_to_xyz(xyz_to_lab(color, white), white), color, 1e-4));

        let lab = xyz_to_lab(white, white);
        assert!(close(lab, Vec3::new(100.0, 0.0, 0.0), 1e-3));
    }
}
