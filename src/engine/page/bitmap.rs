/// Per-record null bitmap: bit `i` set means column `i` is null.
pub struct NullBitmap;

impl NullBitmap {
    pub fn set_bit(bitmap: &mut [u8], index: usize) {
        let byte = index / 8;
        let bit = index % 8;
        bitmap[byte] |= 1 << bit;
    }

    pub fn clear_bit(bitmap: &mut [u8], index: usize) {
        let byte = index / 8;
        let bit = index % 8;
        bitmap[byte] &= !(1 << bit);
    }

    pub fn is_null(bitmap: &[u8], index: usize) -> bool {
        let byte = index / 8;
        let bit = index % 8;
        (bitmap[byte] & (1 << bit)) != 0
    }

    /// Bytes needed for one record of `column_count` columns.
    pub fn size_for(column_count: usize) -> usize {
        column_count.div_ceil(8)
    }
}
