use crate::foundation::core::Rgba8Premul;
use crate::foundation::math::mul_div255_u8;

/// Source-over for one premultiplied pixel.
pub(crate) fn premul_over_px(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = src[c].saturating_add(mul_div255_u8(u16::from(dst[c]), inv));
    }
    out
}

/// Source-over of two equally sized premultiplied buffers.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = premul_over_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
}

/// Source-over of `src` placed at integer offset `(dx, dy)` inside `dst`.
///
/// Parts of `src` that fall outside `dst` are dropped.
pub(crate) fn blit_over(
    dst: &mut [u8],
    dst_size: (u32, u32),
    src: &[u8],
    src_size: (u32, u32),
    dx: i64,
    dy: i64,
) {
    let (dw, dh) = (i64::from(dst_size.0), i64::from(dst_size.1));
    let (sw, sh) = (i64::from(src_size.0), i64::from(src_size.1));

    let x0 = dx.max(0);
    let y0 = dy.max(0);
    let x1 = (dx + sw).min(dw);
    let y1 = (dy + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let row_px = (x1 - x0) as usize;
    for y in y0..y1 {
        let sy = y - dy;
        let s_start = ((sy * sw + (x0 - dx)) * 4) as usize;
        let d_start = ((y * dw + x0) * 4) as usize;
        over_in_place(
            &mut dst[d_start..d_start + row_px * 4],
            &src[s_start..s_start + row_px * 4],
        );
    }
}

/// Scale every pixel of `layer` by the alpha of the matching `mask` pixel.
pub(crate) fn mask_alpha_in_place(layer: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(layer.len(), mask.len());
    for (px, m) in layer.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        if w == 255 {
            continue;
        }
        for c in px.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), w);
        }
    }
}

/// Shadow footprint: `color` scaled by the alpha of each `layer` pixel.
pub(crate) fn tint_by_alpha(layer: &[u8], color: Rgba8Premul) -> Vec<u8> {
    let rgba = color.to_array();
    let mut out = vec![0u8; layer.len()];
    for (o, px) in out.chunks_exact_mut(4).zip(layer.chunks_exact(4)) {
        let a = u16::from(px[3]);
        for c in 0..4 {
            o[c] = mul_div255_u8(u16::from(rgba[c]), a);
        }
    }
    out
}

/// Move buffer contents by `(dx, dy)` whole pixels, filling uncovered pixels with transparency.
pub(crate) fn shift(src: &[u8], size: (u32, u32), dx: i64, dy: i64) -> Vec<u8> {
    if dx == 0 && dy == 0 {
        return src.to_vec();
    }
    let mut out = vec![0u8; src.len()];
    blit_over(&mut out, size, src, size, dx, dy);
    out
}

/// Overwrite every pixel with `rgba`.
pub(crate) fn fill_solid(dst: &mut [u8], rgba: [u8; 4]) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}
