use std::io::{self, Read};

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::PipelineError;

/// A run of complete records. The last byte is always `\n`.
#[derive(Debug, PartialEq, Eq)]
pub struct Chunk {
    bytes: Vec<u8>,
}

impl Chunk {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Totals reported by [`split_chunks`] once the source is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitStats {
    pub chunks: usize,
    pub bytes_sent: u64,
    /// Length of the unterminated trailing line that was discarded, if any.
    pub bytes_dropped: u64,
}

/// Reads `source` in blocks of `chunk_size` bytes and sends line-aligned
/// [`Chunk`]s to `tx`, blocking while the queue is full.
///
/// The partial line at the end of each block is carried into the next chunk.
/// An unterminated final line is dropped. The queue is closed when this
/// returns, since `tx` is consumed.
pub fn split_chunks<R: Read>(
    mut source: R,
    chunk_size: usize,
    tx: Sender<Chunk>,
) -> Result<SplitStats, PipelineError> {
    let mut stats = SplitStats::default();
    let mut leftover: Vec<u8> = Vec::new();

    loop {
        let mut buf = Vec::with_capacity(leftover.len() + chunk_size);
        buf.append(&mut leftover);
        let carried = buf.len();

        let n = read_block(&mut source, &mut buf, chunk_size).map_err(PipelineError::Read)?;
        if n == 0 {
            // what's left in `buf` is exactly the carried partial line
            stats.bytes_dropped = carried as u64;
            break;
        }

        // only the fresh bytes can hold a newline, the carried prefix has none
        let Some(last_newline) = buf[carried..].iter().rposition(|b| *b == b'\n') else {
            leftover = buf;
            continue;
        };
        leftover = buf.split_off(carried + last_newline + 1);

        debug_assert_eq!(Some(&b'\n'), buf.last());
        stats.chunks += 1;
        stats.bytes_sent += buf.len() as u64;
        debug!(chunk = stats.chunks, len = buf.len(), "chunk ready");
        tx.send(Chunk { bytes: buf })
            .map_err(|_| PipelineError::ChunkQueueClosed)?;
    }

    if stats.bytes_dropped > 0 {
        warn!(
            bytes = stats.bytes_dropped,
            "input does not end with a newline, dropping the trailing partial line"
        );
    }
    Ok(stats)
}

/// Appends up to `limit` bytes to `buf`, stopping early only at EOF.
fn read_block<R: Read>(source: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<usize> {
    source.by_ref().take(limit as u64).read_to_end(buf)
}

#[cfg(test)]
mod test {
    use std::io::{self, Cursor, Read};

    use crossbeam_channel::{bounded, unbounded};

    use super::*;

    fn collect(input: &[u8], chunk_size: usize) -> (Vec<Chunk>, SplitStats) {
        let (tx, rx) = unbounded();
        let stats = split_chunks(Cursor::new(input), chunk_size, tx).unwrap();
        (rx.into_iter().collect(), stats)
    }

    const INPUT: &str = "Hamburg;12.0\nBulawayo;8.9\nPalembang;38.8\nSt. John's;15.2\n\
                         Cracow;12.6\nBridgetown;26.9\nIstanbul;6.2\nRoseau;34.4\n\
                         Conakry;31.2\nIstanbul;23.0\n";

    #[test]
    fn chunks_are_line_aligned_for_any_chunk_size() {
        for chunk_size in 1..=INPUT.len() + 3 {
            let (chunks, stats) = collect(INPUT.as_bytes(), chunk_size);

            let mut joined = Vec::new();
            for chunk in &chunks {
                assert!(!chunk.is_empty());
                assert_eq!(Some(&b'\n'), chunk.as_bytes().last(), "chunk_size {chunk_size}");
                // every record in the chunk is whole
                for line in chunk.as_bytes()[..chunk.len() - 1].split(|b| *b == b'\n') {
                    assert_eq!(1, line.iter().filter(|b| **b == b';').count());
                }
                joined.extend_from_slice(chunk.as_bytes());
            }
            assert_eq!(INPUT.as_bytes(), &joined[..], "chunk_size {chunk_size}");
            assert_eq!(chunks.len(), stats.chunks);
            assert_eq!(INPUT.len() as u64, stats.bytes_sent);
            assert_eq!(0, stats.bytes_dropped);
        }
    }

    #[test]
    fn trailing_partial_line_is_dropped() {
        let input = "a;1.0\nb;2.0\nc;3";
        for chunk_size in [1, 4, 6, 7, 64] {
            let (chunks, stats) = collect(input.as_bytes(), chunk_size);
            let joined: Vec<u8> = chunks.iter().flat_map(|c| c.as_bytes().to_vec()).collect();
            assert_eq!(b"a;1.0\nb;2.0\n", &joined[..], "chunk_size {chunk_size}");
            assert_eq!(3, stats.bytes_dropped);
        }
    }

    #[test]
    fn empty_input_sends_nothing() {
        let (chunks, stats) = collect(b"", 16);
        assert!(chunks.is_empty());
        assert_eq!(SplitStats::default(), stats);
    }

    #[test]
    fn large_block_holds_many_lines() {
        let (chunks, _) = collect(INPUT.as_bytes(), 1024);
        assert_eq!(1, chunks.len());
        assert_eq!(INPUT.as_bytes(), chunks[0].as_bytes());
    }

    /// Hands out at most three bytes per call and is interrupted every other call.
    struct Trickle<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(3).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn short_and_interrupted_reads_fill_blocks() {
        let (tx, rx) = unbounded();
        let source = Trickle {
            data: INPUT.as_bytes(),
            interrupt: false,
        };
        split_chunks(source, 40, tx).unwrap();
        let chunks: Vec<_> = rx.into_iter().collect();
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.as_bytes().to_vec()).collect();
        assert_eq!(INPUT.as_bytes(), &joined[..]);
        // 40 byte blocks over ~150 bytes of input
        assert!(chunks.len() >= 3, "got {} chunks", chunks.len());
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn read_errors_are_fatal() {
        let (tx, _rx) = unbounded();
        let err = split_chunks(Failing, 16, tx).unwrap_err();
        assert!(matches!(err, PipelineError::Read(_)), "{err:?}");
    }

    #[test]
    fn closed_queue_stops_the_reader() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let err = split_chunks(Cursor::new(INPUT.as_bytes()), 16, tx).unwrap_err();
        assert!(matches!(err, PipelineError::ChunkQueueClosed), "{err:?}");
    }
}
