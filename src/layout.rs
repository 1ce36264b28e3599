//! Field layout of RSA key blobs.
//!
//! The byte length of every variable field is derived from the key's bit
//! length, never from a length prefix in the stream. Each modulus-sized field
//! takes `bitLength / 8` bytes while each CRT field takes half of that. The
//! layout is computed up front so that no field is read before the whole
//! buffer is known to be large enough.

use crate::consts::{BLOB_HEADER_LEN, RSA_PUBKEY_LEN};
use crate::error::DecodeError;

/// Variable-length fields following `RSAPUBKEY`, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Modulus,
    Prime1,
    Prime2,
    Exponent1,
    Exponent2,
    Coefficient,
    PrivateExponent,
}

/// Which key blob the layout is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Width {
    /// `bitLength / 8` bytes
    Full,
    /// `bitLength / 16` bytes
    Half,
}

const PUBLIC_FIELDS: &[(Field, Width)] = &[(Field::Modulus, Width::Full)];

const PRIVATE_FIELDS: &[(Field, Width)] = &[
    (Field::Modulus, Width::Full),
    (Field::Prime1, Width::Half),
    (Field::Prime2, Width::Half),
    (Field::Exponent1, Width::Half),
    (Field::Exponent2, Width::Half),
    (Field::Coefficient, Width::Half),
    (Field::PrivateExponent, Width::Full),
];

/// Position of a single field, relative to the start of the blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpan {
    pub field: Field,
    pub offset: usize,
    pub len: usize,
}

impl FieldSpan {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Ordered field positions for one key blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    spans: Vec<FieldSpan>,
    total_len: usize,
}

impl Layout {
    /// Computes the layout of a key blob with the given bit length.
    ///
    /// Fails with [`DecodeError::UnsupportedAlgorithm`] if `bit_length` is zero
    /// or not a multiple of 16, since the CRT fields would not have an integral
    /// byte length.
    pub fn new(kind: KeyKind, bit_length: u32) -> Result<Self, DecodeError> {
        if bit_length == 0 || bit_length % 16 != 0 {
            return Err(DecodeError::UnsupportedAlgorithm);
        }
        let full = bit_length as usize / 8;
        let half = bit_length as usize / 16;

        let fields = match kind {
            KeyKind::Public => PUBLIC_FIELDS,
            KeyKind::Private => PRIVATE_FIELDS,
        };

        let mut offset = BLOB_HEADER_LEN + RSA_PUBKEY_LEN;
        let spans = fields
            .iter()
            .map(|&(field, width)| {
                let len = match width {
                    Width::Full => full,
                    Width::Half => half,
                };
                let span = FieldSpan { field, offset, len };
                offset += len;
                span
            })
            .collect();

        Ok(Layout {
            spans,
            total_len: offset,
        })
    }

    pub fn spans(&self) -> &[FieldSpan] {
        &self.spans
    }

    pub fn span(&self, field: Field) -> Option<&FieldSpan> {
        self.spans.iter().find(|span| span.field == field)
    }

    /// Total blob length, header included.
    pub fn total_len(&self) -> usize {
        self.total_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_1024() {
        let layout = Layout::new(KeyKind::Private, 1024).unwrap();
        let lens: Vec<_> = layout.spans().iter().map(|s| (s.field, s.len)).collect();
        assert_eq!(
            lens,
            vec![
                (Field::Modulus, 128),
                (Field::Prime1, 64),
                (Field::Prime2, 64),
                (Field::Exponent1, 64),
                (Field::Exponent2, 64),
                (Field::Coefficient, 64),
                (Field::PrivateExponent, 128),
            ]
        );
        assert_eq!(layout.span(Field::Modulus).unwrap().offset, 20);
        assert_eq!(layout.span(Field::Prime1).unwrap().offset, 148);
        assert_eq!(layout.span(Field::PrivateExponent).unwrap().offset, 468);
        assert_eq!(layout.total_len(), 20 + 128 * 2 + 64 * 5);
    }

    #[test]
    fn spans_are_contiguous() {
        let layout = Layout::new(KeyKind::Private, 2048).unwrap();
        for pair in layout.spans().windows(2) {
            assert_eq!(pair[0].range().end, pair[1].offset);
        }
        assert_eq!(layout.spans().last().unwrap().range().end, layout.total_len());
    }

    #[test]
    fn public_2048() {
        let layout = Layout::new(KeyKind::Public, 2048).unwrap();
        assert_eq!(layout.spans().len(), 1);
        assert_eq!(layout.total_len(), 20 + 256);
        assert_eq!(layout.span(Field::Prime1), None);
    }

    #[test]
    fn odd_bit_lengths() {
        assert_eq!(
            Layout::new(KeyKind::Private, 1000),
            Err(DecodeError::UnsupportedAlgorithm)
        );
        assert_eq!(
            Layout::new(KeyKind::Public, 1028),
            Err(DecodeError::UnsupportedAlgorithm)
        );
        assert_eq!(
            Layout::new(KeyKind::Public, 0),
            Err(DecodeError::UnsupportedAlgorithm)
        );
    }
}
