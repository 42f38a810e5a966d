//! Interfaz pública con la convención de llamada de C.
//!
//! Cada función replica una función de la biblioteca estándar de CTL
//! con el prefijo `ctl_`. Los vectores y matrices se pasan por valor
//! con la misma disposición que los tipos `ctl_vec3f_t` y
//! `ctl_mat33f_t`/`ctl_mat44f_t` de C; las tablas, por puntero y
//! tamaño.

#![allow(non_snake_case)]

use core::slice;

use crate::{
    color::{self, Chromaticities},
    lookup,
    matrix::{Mat, Vec3},
};

#[no_mangle]
pub extern "C" fn ctl_mult_f33_f33(a: Mat<3>, b: Mat<3>) -> Mat<3> {
    a * b
}

#[no_mangle]
pub extern "C" fn ctl_mult_f44_f44(a: Mat<4>, b: Mat<4>) -> Mat<4> {
    a * b
}

/// Una matriz singular produce la identidad.
#[no_mangle]
pub extern "C" fn ctl_invert_f33(a: Mat<3>) -> Mat<3> {
    a.invert_or_identity()
}

#[no_mangle]
pub extern "C" fn ctl_invert_f44(a: Mat<4>) -> Mat<4> {
    a.invert_or_identity()
}

#[no_mangle]
pub extern "C" fn ctl_transpose_f44(a: Mat<4>) -> Mat<4> {
    a.transpose()
}

#[no_mangle]
pub extern "C" fn ctl_mult_f3_f44(a: Vec3, b: Mat<4>) -> Vec3 {
    a * b
}

#[no_mangle]
pub extern "C" fn ctl_RGBtoXYZ(chroma: Chromaticities, y: f32) -> Mat<4> {
    color::rgb_to_xyz(&chroma, y)
}

#[no_mangle]
pub extern "C" fn ctl_XYZtoLab(xyz: Vec3, white: Vec3) -> Vec3 {
    color::xyz_to_lab(xyz, white)
}

#[no_mangle]
pub extern "C" fn ctl_XYZtoLuv(xyz: Vec3, white: Vec3) -> Vec3 {
    color::xyz_to_luv(xyz, white)
}

/// # Safety
/// `table` debe apuntar a `size` valores válidos.
#[no_mangle]
pub unsafe extern "C" fn ctl_lookup1D(table: *const f32, size: i32, min: f32, max: f32, p: f32) -> f32 {
    lookup::lookup_1d(table_slice(table, size.max(0) as usize), min, max, p)
}

/// # Safety
/// `table` debe apuntar a `size` valores válidos.
#[no_mangle]
pub unsafe extern "C" fn ctl_lookupCubic1D(table: *const f32, size: i32, min: f32, max: f32, p: f32) -> f32 {
    lookup::lookup_cubic_1d(table_slice(table, size.max(0) as usize), min, max, p)
}

/// Equivalente a `ctl_vec3i_t`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Size3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// # Safety
/// `table` debe apuntar al producto de `size` muestras de tres
/// canales.
#[no_mangle]
pub unsafe extern "C" fn ctl_lookup3D_f3(table: *const Vec3, size: Size3, min: Vec3, max: Vec3, p: Vec3) -> Vec3 {
    let size = [size.x, size.y, size.z].map(|n| n.max(0) as usize);
    let table = table_slice(table, size.iter().product());

    lookup::lookup_3d(table, size, min, max, p)
}

/// # Safety
/// `table` debe apuntar a `size` pares válidos.
#[no_mangle]
pub unsafe extern "C" fn ctl_interpolate1D(table: *const [f32; 2], size: i32, p: f32) -> f32 {
    lookup::interpolate_1d(table_slice(table, size.max(0) as usize), p)
}

unsafe fn table_slice<'a, T>(table: *const T, len: usize) -> &'a [T] {
    if table.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(table, len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookups_through_pointers() {
        let table = [0.0, 1.0, 4.0];
        let value = unsafe { ctl_lookup1D(table.as_ptr(), 3, 0.0, 1.0, 0.75) };
        assert_eq!(value, 2.5);

        let empty = unsafe { ctl_lookup1D(core::ptr::null(), 0, 0.0, 1.0, 0.5) };
        assert_eq!(empty, 0.0);

        let pairs = [[0.0, 0.0], [2.0, 1.0]];
        assert_eq!(unsafe { ctl_interpolate1D(pairs.as_ptr(), 2, 1.0) }, 0.5);
    }

    #[test]
    fn singular_inverse_is_identity() {
        assert_eq!(ctl_invert_f33(Mat([[0.0; 3]; 3])), Mat::identity());
    }
}
