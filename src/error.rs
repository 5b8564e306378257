use thiserror::Error;

/// Resumable condition returned by a decode call that did not fail.
///
/// `ShortRead` and `ShortWrite` are ordinary control flow, not errors: the
/// caller refills the input cursor or drains the output cursor and calls
/// again. The decoder keeps its exact logical position in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a suspended decode must be resumed or abandoned explicitly"]
pub enum Status {
    /// The stream is complete: the final block's end-of-block symbol was
    /// consumed.
    Finished,
    /// Input exhausted before the next decodable unit was available.
    ShortRead,
    /// Output capacity exhausted before the next symbol could be emitted.
    ShortWrite,
}

impl Status {
    pub fn is_finished(self) -> bool {
        self == Status::Finished
    }

    pub fn is_suspension(self) -> bool {
        !self.is_finished()
    }
}

/// Terminal decode failures.
///
/// Any of these permanently disables the decoder instance that produced it;
/// further calls report `Disabled` until `reset()`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("bad block type")]
    BadBlockType,

    #[error("bad stored block length")]
    BadStoredBlockLength,

    #[error("bad code length count")]
    BadCodeLengthCount,

    #[error("bad code length repetition")]
    BadCodeLengthRepetition,

    #[error("over-subscribed Huffman code")]
    OverSubscribedCode,

    #[error("under-subscribed Huffman code")]
    UnderSubscribedCode,

    #[error("bad minimum code length")]
    BadMinimumCodeLength,

    #[error("bad Huffman code")]
    BadHuffmanCode,

    #[error("bad distance")]
    BadDistance,

    #[error("missing end-of-block code")]
    MissingEndOfBlock,

    #[error("bad zlib header")]
    BadZlibHeader,

    #[error("bad gzip header")]
    BadGzipHeader,

    #[error("missing preset dictionary")]
    MissingDictionary,

    #[error("bad checksum")]
    BadChecksum,

    #[error("bad workbuf length")]
    BadWorkbufLength,

    #[error("truncated input")]
    TruncatedInput,

    #[error("insufficient output space")]
    InsufficientSpace,

    #[error("interleaved decode calls")]
    InterleavedCalls,

    #[error("disabled by previous error")]
    Disabled,

    #[error("internal error: inconsistent bit count")]
    InconsistentBitCount,

    #[error("internal error: inconsistent decoder state")]
    InconsistentDecoderState,

    #[error("internal error: inconsistent distance")]
    InconsistentDistance,
}

impl Error {
    /// Internal-invariant violations, as opposed to malformed input. Both
    /// are terminal; wrappers only use the distinction for diagnostics.
    pub fn is_internal(self) -> bool {
        matches!(
            self,
            Error::InconsistentBitCount
                | Error::InconsistentDecoderState
                | Error::InconsistentDistance
        )
    }
}
