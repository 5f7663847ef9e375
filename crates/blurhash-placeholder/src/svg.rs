//! Wraps a decoded raster in a blurred SVG and turns it into a data URI.
//!
//! The raster is scaled up by the browser, so a tiny Gaussian blur smooths
//! the pixel edges, and a discrete alpha transfer snaps the blurred border
//! back to fully opaque.

use base64::{engine::general_purpose, Engine as _};

/// Scheme prefix of every URI produced by [`svg_to_uri`].
pub const DATA_URI_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";

/// Build the blurred SVG document for a PNG of `width` x `height` pixels.
///
/// ```
/// let svg = blurhash_placeholder::svg::svg_filter(b"png", 13, 8);
/// assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 13.00 8.00">"#));
/// assert!(svg.contains("data:image/png;base64,cG5n"));
/// ```
pub fn svg_filter(png: &[u8], width: u32, height: u32) -> String {
    let href = format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png)
    );
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width:.2} {height:.2}">"#,
            r#"<filter id="a" color-interpolation-filters="sRGB">"#,
            r#"<feGaussianBlur stdDeviation=".2"></feGaussianBlur>"#,
            r#"<feComponentTransfer><feFuncA type="discrete" tableValues="1 1"></feFuncA></feComponentTransfer>"#,
            r#"</filter>"#,
            r#"<image filter="url(#a)" x="0" y="0" width="100%" height="100%" href="{href}"></image>"#,
            r#"</svg>"#,
        ),
        width = width as f64,
        height = height as f64,
        href = href,
    )
}

/// Percent-encode an SVG document into a `data:` URI.
///
/// `/`, `:` and `=` are put back unescaped to keep the URI short; spaces
/// stay as `%20`.
///
/// ```
/// use blurhash_placeholder::svg::svg_to_uri;
/// assert_eq!(
///     svg_to_uri(r#"<a b="c/d"> </a>"#),
///     "data:image/svg+xml;charset=utf-8,%3Ca%20b=%22c/d%22%3E%20%3C/a%3E"
/// );
/// ```
pub fn svg_to_uri(svg: &str) -> String {
    let encoded = urlencoding::encode(svg)
        .replace("%2F", "/")
        .replace("%3A", ":")
        .replace("%3D", "=");
    format!("{DATA_URI_PREFIX}{encoded}")
}

/// Blurred placeholder URI for a PNG of `width` x `height` pixels.
pub fn uri(png: &[u8], width: u32, height: u32) -> String {
    svg_to_uri(&svg_filter(png, width, height))
}
