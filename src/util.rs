/// Copies as much of `src` as fits into `dst`, returning the number of bytes copied.
pub fn copy_prefix(src: &[u8], dst: &mut [u8]) -> usize {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    n
}
