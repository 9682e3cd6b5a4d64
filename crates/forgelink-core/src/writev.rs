//! Vectored write-all over a borrowed byte-range list.

use std::io::{self, ErrorKind, IoSlice, Write};

/// Write every byte of `segments`, in order, to `writer`.
///
/// Each attempt issues one vectored write over the not-yet-exhausted
/// segments; partial progress shrinks the first unfinished segment in place
/// and advances past completed ones, so no byte is sent twice and none is
/// dropped.
///
/// Interruption is never retried: a half-completed vectored write cannot be
/// reissued blindly without risking double delivery, so `Interrupted` is
/// returned to the caller whether or not progress was made. Any other error
/// after partial progress reports the byte count delivered so far; with no
/// progress the error itself is returned.
pub fn write_all_vectored<W: Write + ?Sized>(
    writer: &mut W,
    segments: &mut [&[u8]],
) -> io::Result<usize> {
    let mut first = 0;
    let mut total = 0usize;
    while first < segments.len() {
        while first < segments.len() && segments[first].is_empty() {
            first += 1;
        }
        if first == segments.len() {
            break;
        }
        let slices: Vec<IoSlice<'_>> = segments[first..]
            .iter()
            .map(|seg| IoSlice::new(seg))
            .collect();
        match writer.write_vectored(&slices) {
            Ok(0) => {
                return if total > 0 {
                    Ok(total)
                } else {
                    Err(io::Error::new(
                        ErrorKind::WriteZero,
                        "stream accepted zero bytes of a vectored write",
                    ))
                };
            }
            Ok(written) => {
                total += written;
                let mut remaining = written;
                while remaining > 0 {
                    let seg = segments[first];
                    if remaining >= seg.len() {
                        remaining -= seg.len();
                        segments[first] = &[];
                        first += 1;
                    } else {
                        segments[first] = &seg[remaining..];
                        remaining = 0;
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => return Err(err),
            Err(err) => {
                return if total > 0 { Ok(total) } else { Err(err) };
            }
        }
    }
    Ok(total)
}
