use super::*;
use crate::foundation::core::Rgba8Premul;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(Surface::transparent(w, h))
}

fn solid(w: u32, h: u32, color: Color) -> Surface {
    let mut c = canvas(w, h);
    c.set_fill_color(color);
    c.fill_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
    c.into_surface()
}

fn px(c: &Canvas, x: u32, y: u32) -> [u8; 4] {
    c.surface().pixel(x, y).unwrap().to_array()
}

#[test]
fn aligned_fill_rect_is_exact() {
    let mut c = canvas(4, 4);
    c.set_fill_color(Color::rgba8(255, 0, 0, 255));
    c.fill_rect(Rect::new(1.0, 1.0, 3.0, 3.0));
    assert_eq!(px(&c, 1, 1), [255, 0, 0, 255]);
    assert_eq!(px(&c, 2, 2), [255, 0, 0, 255]);
    assert_eq!(px(&c, 0, 0), [0, 0, 0, 0]);
    assert_eq!(px(&c, 3, 3), [0, 0, 0, 0]);
}

#[test]
fn fill_rect_outside_bounds_is_cropped() {
    let mut c = canvas(3, 3);
    c.set_fill_color(Color::rgba8(0, 0, 255, 255));
    c.fill_rect(Rect::new(-10.0, -10.0, 1.0, 100.0));
    assert_eq!(px(&c, 0, 2), [0, 0, 255, 255]);
    assert_eq!(px(&c, 1, 0), [0, 0, 0, 0]);
}

#[test]
fn translucent_fill_blends_over_existing_pixels() {
    let mut c = Canvas::new(solid(1, 1, Color::rgba8(0, 0, 255, 255)));
    c.set_fill_color(Color::rgba8(255, 0, 0, 128));
    c.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(px(&c, 0, 0), [128, 0, 127, 255]);
}

#[test]
fn integer_draw_surface_copies_pixels() {
    let src = solid(2, 2, Color::rgba8(0, 255, 0, 255));
    let mut c = canvas(4, 4);
    c.draw_surface(&src, 2.0, 1.0);
    assert_eq!(px(&c, 2, 1), [0, 255, 0, 255]);
    assert_eq!(px(&c, 3, 2), [0, 255, 0, 255]);
    assert_eq!(px(&c, 1, 1), [0, 0, 0, 0]);
    assert_eq!(px(&c, 2, 3), [0, 0, 0, 0]);
}

#[test]
fn negative_draw_offset_crops_source() {
    let mut src = canvas(4, 1);
    src.set_fill_color(Color::rgba8(255, 255, 255, 255));
    src.fill_rect(Rect::new(2.0, 0.0, 3.0, 1.0));
    let src = src.into_surface();

    let mut c = canvas(2, 1);
    c.draw_surface(&src, -2.0, 0.0);
    assert_eq!(px(&c, 0, 0), [255, 255, 255, 255]);
    assert_eq!(px(&c, 1, 0), [0, 0, 0, 0]);
}

#[test]
fn fractional_draw_surface_still_covers_interior() {
    let src = solid(8, 8, Color::rgba8(255, 0, 0, 255));
    let mut c = canvas(16, 16);
    c.draw_surface(&src, 4.5, 4.5);
    assert!(px(&c, 8, 8)[3] > 0);
    assert_eq!(px(&c, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn clip_restricts_later_draws() {
    let mut c = canvas(20, 20);
    let mut clip = BezPath::new();
    clip.move_to((0.0, 0.0));
    clip.line_to((10.0, 0.0));
    clip.line_to((10.0, 20.0));
    clip.line_to((0.0, 20.0));
    clip.close_path();
    c.clip_path(&clip);

    c.set_fill_color(Color::rgba8(255, 255, 255, 255));
    c.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
    assert_eq!(px(&c, 4, 10)[3], 255);
    assert_eq!(px(&c, 15, 10), [0, 0, 0, 0]);
}

#[test]
fn shadow_lands_at_offset_behind_shape() {
    let mut c = canvas(10, 10);
    c.set_shadow(Shadow {
        color: Color::rgba8(0, 0, 0, 255),
        blur: 0.0,
        offset_x: 4.0,
        offset_y: 0.0,
    });
    c.set_fill_color(Color::rgba8(255, 0, 0, 255));
    c.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));

    assert_eq!(px(&c, 0, 0), [255, 0, 0, 255]);
    assert_eq!(px(&c, 4, 0), [0, 0, 0, 255]);
    assert_eq!(px(&c, 2, 0), [0, 0, 0, 0]);
}

#[test]
fn blurred_shadow_spreads_past_the_shape() {
    let mut c = canvas(20, 20);
    c.set_shadow(Shadow {
        color: Color::rgba8(0, 0, 0, 255),
        blur: 4.0,
        ..Shadow::default()
    });
    c.set_fill_color(Color::rgba8(255, 255, 255, 255));
    c.fill_rect(Rect::new(8.0, 8.0, 12.0, 12.0));

    assert_eq!(px(&c, 10, 10), [255, 255, 255, 255]);
    assert!(px(&c, 6, 10)[3] > 0);
    assert_eq!(px(&c, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn transparent_shadow_is_ignored() {
    let shadow = Shadow {
        color: Color::TRANSPARENT,
        blur: 10.0,
        offset_x: 3.0,
        offset_y: 3.0,
    };
    assert!(!shadow.is_visible());
    assert!(!Shadow::default().is_visible());
}

#[test]
fn empty_canvas_accepts_every_draw() {
    let mut c = canvas(0, 0);
    c.set_fill_color(Color::BLACK);
    c.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    c.draw_surface(&solid(2, 2, Color::BLACK), 0.5, 0.0);
    c.fill_text("hi", 0.0, 0.0);
    let mut clip = BezPath::new();
    clip.move_to((0.0, 0.0));
    clip.line_to((1.0, 1.0));
    c.clip_path(&clip);
    assert!(c.surface().is_empty());
}

#[test]
fn empty_text_draws_nothing() {
    let mut c = canvas(4, 4);
    c.fill_text("", 0.0, 0.0);
    assert!(c.surface().data().iter().all(|&b| b == 0));
    assert_eq!(
        c.surface().pixel(0, 0),
        Some(Rgba8Premul::transparent())
    );
}

#[test]
fn keywords_deserialize_lowercase() {
    let align: TextAlign = serde_json::from_str("\"center\"").unwrap();
    let baseline: TextBaseline = serde_json::from_str("\"ideographic\"").unwrap();
    assert_eq!(align, TextAlign::Center);
    assert_eq!(baseline, TextBaseline::Ideographic);
    assert!(serde_json::from_str::<TextAlign>("\"justify\"").is_err());
}
