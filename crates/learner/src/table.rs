use thiserror::Error;

/// Leading bytes of a serialized table.
pub const TABLE_MAGIC: [u8; 4] = *b"XRQT";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table blob is {len} bytes, too short for a header")]
    Truncated { len: usize },
    #[error("table blob has an unknown header {found:?}")]
    BadMagic { found: [u8; 4] },
    #[error("table blob is {found_rows}x{found_cols}, expected {rows}x{cols}")]
    ShapeMismatch { rows: usize, cols: usize, found_rows: usize, found_cols: usize },
    #[error("table blob holds {found} value bytes, header promises {expected}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Integer fields hold little-endian bit patterns.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlobHeader {
    magic: [u8; 4],
    rows: u32,
    cols: u32,
}

const HEADER_LEN: usize = std::mem::size_of::<BlobHeader>();

/// Dense row-major `rows x cols` table of action values.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueTable {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl ValueTable {
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, values: vec![0.0; rows * cols] }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.values[row * self.cols + col] = value;
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Column of the largest value in `row`; the lowest index wins ties.
    #[must_use]
    pub fn argmax(&self, row: usize) -> usize {
        let mut best = 0;
        for (col, &value) in self.row(row).iter().enumerate().skip(1) {
            if value > self.row(row)[best] {
                best = col;
            }
        }
        best
    }

    #[must_use]
    pub fn max(&self, row: usize) -> f32 {
        self.row(row).iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Overwrites every entry with `other`'s. Shapes must match.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn copy_from(&mut self, other: &ValueTable) {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols), "table shape mismatch");
        self.values.copy_from_slice(&other.values);
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Serializes as a 12-byte header (magic, rows, cols) followed by the
    /// values in row-major order, all little-endian regardless of host.
    ///
    /// # Panics
    ///
    /// Panics if a dimension does not fit in `u32`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = BlobHeader {
            magic: TABLE_MAGIC,
            rows: u32::try_from(self.rows).expect("row count fits in u32").to_le(),
            cols: u32::try_from(self.cols).expect("column count fits in u32").to_le(),
        };
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.values.len() * 4);
        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend(self.values.iter().flat_map(|v| v.to_le_bytes()));
        bytes
    }

    /// Parses a blob written by [`ValueTable::to_bytes`], requiring the given
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the blob is truncated, carries the wrong
    /// header, or its shape or length disagree with the expected shape.
    pub fn from_bytes(bytes: &[u8], rows: usize, cols: usize) -> Result<Self, TableError> {
        if bytes.len() < HEADER_LEN {
            return Err(TableError::Truncated { len: bytes.len() });
        }
        let header: BlobHeader = bytemuck::pod_read_unaligned(&bytes[..HEADER_LEN]);
        if header.magic != TABLE_MAGIC {
            return Err(TableError::BadMagic { found: header.magic });
        }
        let (found_rows, found_cols) =
            (u32::from_le(header.rows) as usize, u32::from_le(header.cols) as usize);
        if (found_rows, found_cols) != (rows, cols) {
            return Err(TableError::ShapeMismatch { rows, cols, found_rows, found_cols });
        }
        let body = &bytes[HEADER_LEN..];
        let expected = rows * cols * 4;
        if body.len() != expected {
            return Err(TableError::LengthMismatch { expected, found: body.len() });
        }
        let values = body
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(bytemuck::pod_read_unaligned(chunk)))
            .collect();
        Ok(Self { rows, cols, values })
    }
}
