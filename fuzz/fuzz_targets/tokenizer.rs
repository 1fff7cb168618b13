#![no_main]

use arbitrary::Arbitrary;
use binunit_core::{U8, U32_BE, bytes};
use binunit_reader::UnitReader;
use binunit_tokenizer::{BufferTokenizer, ReadOptions, StreamTokenizer, Tokenizer};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Clone, Copy, Debug)]
enum Target {
    Near(u16),
    Far(u64),
}

impl Target {
    fn position(self) -> u64 {
        match self {
            Self::Near(p) => u64::from(p),
            Self::Far(p) => p,
        }
    }
}

#[derive(Arbitrary, Debug)]
enum Op {
    Read { position: Option<Target>, length: u8, offset: u8, may_be_less: bool },
    Peek { position: Option<Target>, length: u8, offset: u8, may_be_less: bool },
    Ignore(u16),
    ReadU8,
    PeekU32,
    ReadBytes(u8),
}

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    ops: Vec<Op>,
}

// Fuzz target: arbitrary operation sequences against both tokenizers.
//
// Catches bugs in:
// - Position bookkeeping across peeks, reads and skips
// - Peek buffer reuse in the stream tokenizer
// - Range validation of ReadOptions
// - Gap handling for targets far beyond the end of the source
//
// Both tokenizers see the same bytes, so every result must agree.
fuzz_target!(|input: Input| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    runtime.block_on(async {
        let mut memory = BufferTokenizer::new(input.data.clone());
        let mut stream = StreamTokenizer::new(std::io::Cursor::new(input.data));

        for op in input.ops {
            let (a, b) = match op {
                Op::Read { position, length, offset, may_be_less }
                | Op::Peek { position, length, offset, may_be_less } => {
                    let peek = matches!(op, Op::Peek { .. });
                    let mut options = ReadOptions::new()
                        .with_length(usize::from(length))
                        .with_offset(usize::from(offset))
                        .with_may_be_less(may_be_less);
                    if let Some(p) = position {
                        options = options.with_position(p.position());
                    }
                    let mut dst_a = vec![0u8; 256];
                    let mut dst_b = vec![0u8; 256];
                    let (ra, rb) = if peek {
                        (
                            memory.peek_buffer(&mut dst_a, options).await,
                            stream.peek_buffer(&mut dst_b, options).await,
                        )
                    } else {
                        (
                            memory.read_buffer(&mut dst_a, options).await,
                            stream.read_buffer(&mut dst_b, options).await,
                        )
                    };
                    if let (Ok(_), Ok(_)) = (&ra, &rb) {
                        assert_eq!(dst_a, dst_b);
                    }
                    (ra.ok(), rb.ok())
                }
                Op::Ignore(n) => (
                    memory.ignore(u64::from(n)).await.ok().map(|v| v as usize),
                    stream.ignore(u64::from(n)).await.ok().map(|v| v as usize),
                ),
                Op::ReadU8 => (
                    memory.read_unit(&U8).await.ok().map(usize::from),
                    stream.read_unit(&U8).await.ok().map(usize::from),
                ),
                Op::PeekU32 => (
                    memory.peek_unit(&U32_BE).await.ok().map(|v| v as usize),
                    stream.peek_unit(&U32_BE).await.ok().map(|v| v as usize),
                ),
                Op::ReadBytes(n) => {
                    let unit = bytes(usize::from(n));
                    (
                        memory.read_unit(&unit).await.ok().map(|v| v.len()),
                        stream.read_unit(&unit).await.ok().map(|v| v.len()),
                    )
                }
            };
            assert_eq!(a, b, "{op:?}");
            assert_eq!(memory.position(), stream.position());
        }
    });
});
