use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("retouch-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn resolves_base64_png_data_uri() {
    let uri = format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_bytes(3, 2, [255, 0, 0, 255]))
    );
    let img = UriResolver::default().resolve(&uri).unwrap();
    assert_eq!((img.width, img.height), (3, 2));
    assert_eq!(&img.rgba8_premul[..4], &[255, 0, 0, 255]);
}

#[test]
fn resolves_percent_encoded_svg_data_uri() {
    let uri = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%225%22%20height%3D%227%22%2F%3E";
    let img = UriResolver::default().resolve(uri).unwrap();
    assert_eq!((img.width, img.height), (5, 7));
}

#[test]
fn parse_data_uri_extracts_mime_and_payload() {
    let (mime, bytes) = parse_data_uri("text/plain;charset=utf-8,a%20b").unwrap();
    assert_eq!(mime.as_deref(), Some("text/plain"));
    assert_eq!(bytes, b"a b");

    let (mime, bytes) = parse_data_uri(";base64,aGk=").unwrap();
    assert_eq!(mime, None);
    assert_eq!(bytes, b"hi");

    assert!(parse_data_uri("image/png;base64").is_err());
    assert!(parse_data_uri("image/png,%zz").is_err());
}

#[test]
fn resolves_file_paths_relative_to_root() {
    let dir = temp_dir("root");
    std::fs::write(dir.join("px.png"), png_bytes(4, 4, [0, 0, 255, 255])).unwrap();

    let resolver = UriResolver::new(ResolverOpts::default().with_root(&dir));
    let img = resolver.resolve("px.png").unwrap();
    assert_eq!((img.width, img.height), (4, 4));

    let url = format!("file://{}", dir.join("px.png").display());
    let img = UriResolver::default().resolve(&url).unwrap();
    assert_eq!((img.width, img.height), (4, 4));
}

#[test]
fn missing_file_and_network_sources_fail_with_load_error() {
    let err = UriResolver::default()
        .resolve("/definitely/not/here.png")
        .unwrap_err();
    assert_eq!(err.uri, "/definitely/not/here.png");
    assert!(err.reason.contains("stat source file"));

    let err = UriResolver::default()
        .resolve("https://example.com/a.png")
        .unwrap_err();
    assert!(err.reason.contains("network sources are not supported"));

    assert!(UriResolver::default().resolve("   ").is_err());
}

#[test]
fn size_limit_is_enforced() {
    let uri = format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_bytes(8, 8, [1, 2, 3, 255]))
    );
    let resolver = UriResolver::new(ResolverOpts::default().with_max_source_bytes(16));
    let err = resolver.resolve(&uri).unwrap_err();
    assert!(err.reason.contains("limit is 16"));
}

#[test]
fn closures_are_resolvers() {
    let resolver = |uri: &str| -> Result<SourceImage, LoadError> {
        if uri == "solid" {
            Ok(SourceImage::from_premul(1, 1, vec![9, 9, 9, 255]).unwrap())
        } else {
            Err(LoadError::new(uri, "unknown"))
        }
    };
    assert_eq!(resolver.resolve("solid").unwrap().width, 1);
    assert!(resolver.resolve("other").is_err());
}
