//! Complex-to-real buffer reinterpretation.
//!
//! `num_complex::Complex<T>` is `#[repr(C)]` with fields `re, im`, so a
//! `[Complex<T>]` of length `n` has exactly the layout of a `[T]` of length
//! `2n` with interleaved components. This is the only module that relies on
//! that fact; native calls take complex buffers as raw pointers without
//! casting element types.

use core::mem::{align_of, size_of};

use num_complex::Complex;

const _: () = assert!(size_of::<Complex<f32>>() == 2 * size_of::<f32>());
const _: () = assert!(align_of::<Complex<f32>>() == align_of::<f32>());
const _: () = assert!(size_of::<Complex<f64>>() == 2 * size_of::<f64>());
const _: () = assert!(align_of::<Complex<f64>>() == align_of::<f64>());

/// View a complex slice as interleaved `[re, im, ...]` components.
#[inline]
pub fn complex_as_real<T>(slice: &[Complex<T>]) -> &[T] {
    // SAFETY: Complex<T> is repr(C) { re: T, im: T } with no padding, so the
    // memory of n complex values is 2n contiguous T values with the same
    // alignment. The lifetime is tied to the input borrow.
    unsafe { core::slice::from_raw_parts(slice.as_ptr().cast::<T>(), 2 * slice.len()) }
}

/// Mutable variant of [`complex_as_real`].
#[inline]
pub fn complex_as_real_mut<T>(slice: &mut [Complex<T>]) -> &mut [T] {
    // SAFETY: as in `complex_as_real`; the exclusive borrow is carried over.
    unsafe { core::slice::from_raw_parts_mut(slice.as_mut_ptr().cast::<T>(), 2 * slice.len()) }
}
