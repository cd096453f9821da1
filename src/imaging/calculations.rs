//! Pure calculation functions for image dimensions.

/// Dimensions of a preview `target_width` pixels wide with the source
/// aspect ratio.
///
/// Height is rounded down, like integer pixel math, but never reaches zero
/// so very wide banners still produce a valid image.
///
/// ```
/// # use book_build::imaging::preview_dimensions;
/// assert_eq!(preview_dimensions((800, 600), 100), (100, 75));
/// assert_eq!(preview_dimensions((300, 1000), 100), (100, 333));
/// ```
pub fn preview_dimensions(source: (u32, u32), target_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return (target_width, 1);
    }
    let height = (u64::from(src_h) * u64::from(target_width) / u64::from(src_w)).max(1);
    (target_width, u32::try_from(height).unwrap_or(u32::MAX))
}
