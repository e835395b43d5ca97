use super::*;

#[test]
fn blur_sigma_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0.0), src);
}

#[test]
fn kernel_sums_to_one_in_q16() {
    for sigma in [0.5f32, 1.0, 2.5, 7.0] {
        let k = gaussian_kernel_q16(radius_for_sigma(sigma), sigma);
        assert_eq!(k.iter().sum::<u32>(), 1 << 16);
        assert_eq!(k.len() as u32, radius_for_sigma(sigma) * 2 + 1);
    }
}

#[test]
fn interior_of_constant_image_is_unchanged() {
    let (w, h) = (16u32, 16u32);
    let px = [10u8, 20, 30, 40];
    let src = px.repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 1.0);
    // radius is 3, so pixels at least 3 away from every edge see a full kernel.
    let center = ((8 * w + 8) * 4) as usize;
    assert_eq!(&out[center..center + 4], &px);
}

#[test]
fn edges_fade_towards_transparent() {
    let (w, h) = (8u32, 8u32);
    let src = [0u8, 0, 0, 255].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 1.5);
    let corner_a = out[3];
    let center_a = out[((4 * w + 4) * 4 + 3) as usize];
    assert!(corner_a < center_a);
    assert!(corner_a > 0);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((4 * w + 4) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 1.0);

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);

    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 8);
}
