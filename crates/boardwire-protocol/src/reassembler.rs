//! Per-connection stream reassembly.
//!
//! A stream transport hands us bytes in whatever chunks it likes: half a
//! header, three frames glued together, a payload split across reads. The
//! [`Reassembler`] keeps every byte it has not yet turned into a frame and
//! hands frames out in order, one at a time.
//!
//! ```ignore
//! reassembler.extend(&chunk);
//! while let Some(frame) = reassembler.next_frame()? {
//!     session.dispatch(frame);
//! }
//! ```

use bytes::{Buf, BytesMut};

use crate::codec::{self, Decoded};
use crate::{Frame, ProtocolError};

const INITIAL_CAPACITY: usize = 4 * 1024;

/// Accumulates transport chunks and extracts complete frames.
#[derive(Debug)]
pub struct Reassembler {
    /// Unconsumed bytes, oldest first.
    buffer: BytesMut,
    /// Set after an unrecoverable error; the stream is dead from here on.
    poisoned: bool,
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            poisoned: false,
        }
    }

    /// Appends a chunk. Chunks arriving after a protocol error are dropped.
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.poisoned {
            tracing::trace!(len = chunk.len(), "dropping chunk after error");
            return;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Takes the next complete frame off the front of the buffer.
    ///
    /// Returns `Ok(None)` when the buffered bytes end mid-frame (they stay
    /// put for the next chunk) or when the buffer is empty.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidType`] when the next frame has an unknown
    /// tag. All buffered bytes are discarded and the reassembler stops
    /// producing frames.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        if self.poisoned {
            return Ok(None);
        }
        match codec::decode(&self.buffer) {
            Ok(Decoded::Frame { frame, consumed }) => {
                self.buffer.advance(consumed);
                Ok(Some(frame))
            }
            Ok(Decoded::NeedMoreData) => Ok(None),
            Err(e) => {
                tracing::debug!(
                    discarded = self.buffer.len(),
                    error = %e,
                    "discarding buffered stream"
                );
                self.buffer.clear();
                self.poisoned = true;
                Err(e)
            }
        }
    }

    /// Appends a chunk and returns an iterator over the frames it
    /// completes.
    ///
    /// The iterator yields at most one `Err`, as its last item.
    pub fn push(&mut self, chunk: &[u8]) -> Frames<'_> {
        self.extend(chunk);
        Frames {
            reassembler: self,
            done: false,
        }
    }

    /// Number of bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// `true` once a protocol error has been seen.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`Reassembler::push`].
pub struct Frames<'a> {
    reassembler: &'a mut Reassembler,
    done: bool,
}

impl Iterator for Frames<'_> {
    type Item = Result<Frame, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reassembler.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use boardwire_engine::{Board, Player};

    use super::*;
    use crate::MessageType;

    /// A mixed conversation: empty text, long text, boards.
    fn sample_frames() -> Vec<Frame> {
        let mut board = Board::new();
        board.assign(1, 1, Player::One);
        let mut later = board;
        later.assign(0, 2, Player::Two);
        vec![
            Frame::text("Go easy on me, okay?").unwrap(),
            Frame::board_state(&board),
            Frame::text("").unwrap(),
            Frame::text("x".repeat(700)).unwrap(),
            Frame::board_state(&later),
        ]
    }

    fn stream_of(frames: &[Frame]) -> Vec<u8> {
        frames.iter().flat_map(Frame::encode).collect()
    }

    /// Feeds `stream` in the given chunk sizes (cycled) and collects
    /// every frame produced.
    fn feed(stream: &[u8], sizes: &[usize]) -> Vec<Frame> {
        let mut r = Reassembler::new();
        let mut out = Vec::new();
        let mut offset = 0;
        for &size in sizes.iter().cycle() {
            if offset >= stream.len() {
                break;
            }
            let end = offset.saturating_add(size).min(stream.len());
            for frame in r.push(&stream[offset..end]) {
                out.push(frame.expect("valid stream"));
            }
            offset = end;
        }
        assert_eq!(r.buffered(), 0, "no bytes left over");
        out
    }

    #[test]
    fn test_single_chunk_yields_all_frames_in_order() {
        let frames = sample_frames();
        assert_eq!(feed(&stream_of(&frames), &[usize::MAX]), frames);
    }

    #[test]
    fn test_single_byte_chunks_yield_same_frames() {
        let frames = sample_frames();
        assert_eq!(feed(&stream_of(&frames), &[1]), frames);
    }

    #[test]
    fn test_every_two_way_split_yields_same_frames() {
        let frames = sample_frames();
        let stream = stream_of(&frames);
        for cut in 1..stream.len() {
            let mut r = Reassembler::new();
            let mut got: Vec<Frame> =
                r.push(&stream[..cut]).map(|f| f.unwrap()).collect();
            got.extend(r.push(&stream[cut..]).map(|f| f.unwrap()));
            assert_eq!(got, frames, "split at byte {cut}");
        }
    }

    #[test]
    fn test_irregular_chunk_sizes_yield_same_frames() {
        let frames = sample_frames();
        let stream = stream_of(&frames);
        for sizes in [&[2, 5, 1][..], &[3], &[4, 1, 7, 13], &[64, 1]] {
            assert_eq!(feed(&stream, sizes), frames, "sizes {sizes:?}");
        }
    }

    #[test]
    fn test_partial_frame_is_retained() {
        let bytes = Frame::text("hello").unwrap().encode();
        let mut r = Reassembler::new();
        assert!(r.push(&bytes[..4]).next().is_none());
        assert_eq!(r.buffered(), 4);

        let frame = r.push(&bytes[4..]).next().unwrap().unwrap();
        assert_eq!(frame.payload().as_ref(), b"hello");
        assert_eq!(r.buffered(), 0);
    }

    #[test]
    fn test_trailing_partial_frame_waits_after_complete_ones() {
        let mut stream = Frame::text("one").unwrap().encode();
        let second = Frame::text("two").unwrap().encode();
        stream.extend_from_slice(&second[..2]);

        let mut r = Reassembler::new();
        let got: Vec<_> = r.push(&stream).collect();
        assert_eq!(got.len(), 1);
        assert_eq!(r.buffered(), 2);

        let got: Vec<_> = r.push(&second[2..]).collect();
        assert_eq!(got[0].as_ref().unwrap().text_lossy(), "two");
    }

    #[test]
    fn test_invalid_type_stops_and_discards() {
        let mut stream = Frame::text("ok").unwrap().encode();
        stream.extend_from_slice(&[7, 0, 1, 0xaa]);
        stream.extend(Frame::text("never").unwrap().encode());

        let mut r = Reassembler::new();
        let got: Vec<_> = r.push(&stream).collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].as_ref().unwrap().kind(), MessageType::Text);
        assert_eq!(got[1], Err(ProtocolError::InvalidType(7)));
        assert_eq!(r.buffered(), 0);
        assert!(r.is_poisoned());
    }

    #[test]
    fn test_poisoned_reassembler_ignores_later_chunks() {
        let mut r = Reassembler::new();
        assert!(r.next_frame().unwrap().is_none());
        r.extend(&[200, 0, 0]);
        assert!(r.next_frame().is_err());

        let later = Frame::text("late").unwrap().encode();
        assert!(r.push(&later).next().is_none());
        assert_eq!(r.buffered(), 0);
    }
}
