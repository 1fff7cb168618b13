//! Shared fixtures for the binunit integration tests and benchmarks.
//!
//! The record units here are shaped after real audio metadata headers so
//! the tests exercise the combinators the way a tag parser would.

#![warn(clippy::pedantic)]

use std::sync::Once;

use binunit_core::{
    F80_BE, I16_BE, StructUnit, U8, U32_BE, U32_LE, Unit, UnitError, UnitExt, latin1, magic,
    sequence_map, sequence_to_struct,
};

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber that writes through the test harness.
/// Safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

// ── IFF / AIFF ────────────────────────────────────────────────────────

/// Eight-byte IFF chunk header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: String,
    pub size: u32,
}

pub fn chunk_header() -> impl Unit<Output = ChunkHeader, Error = UnitError> + Send + Sync {
    sequence_map((latin1(4), U32_BE), |(id, size)| Ok(ChunkHeader { id, size }))
}

/// Body of an AIFF `COMM` chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AiffComm {
    pub channels: i16,
    pub sample_frames: u32,
    pub sample_size: i16,
    pub sample_rate: f64,
}

impl AiffComm {
    /// Duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        f64::from(self.sample_frames) / self.sample_rate
    }
}

#[must_use]
pub fn aiff_comm() -> StructUnit<AiffComm> {
    sequence_to_struct::<AiffComm>()
        .field(I16_BE, |c, v| c.channels = v)
        .field(U32_BE, |c, v| c.sample_frames = v)
        .field(I16_BE, |c, v| c.sample_size = v)
        .field(F80_BE, |c, v| c.sample_rate = v)
        .build()
}

// ── ID3v2 ─────────────────────────────────────────────────────────────

/// Ten-byte ID3v2 tag header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Id3v2Header {
    pub major: u8,
    pub revision: u8,
    pub flags: u8,
    /// Tag size excluding this header.
    pub size: u32,
}

/// 28-bit integer stored as four 7-bit bytes.
pub fn syncsafe_u32() -> impl Unit<Output = u32, Error = UnitError> + Send + Sync {
    U32_BE.map(|v| {
        if v & 0x8080_8080 != 0 {
            return Err(UnitError::invalid(format!("not a syncsafe integer: {v:#010x}")));
        }
        Ok(((v & 0x7F00_0000) >> 3) | ((v & 0x007F_0000) >> 2) | ((v & 0x0000_7F00) >> 1) | (v & 0x7F))
    })
}

pub fn id3v2_header() -> impl Unit<Output = Id3v2Header, Error = UnitError> + Send + Sync {
    sequence_map(
        (magic(b"ID3"), U8, U8, U8, syncsafe_u32()),
        |((), major, revision, flags, size)| {
            if !(2..=4).contains(&major) {
                return Err(UnitError::InvalidDiscriminant {
                    name: "id3v2 major version",
                    value: u64::from(major),
                });
            }
            Ok(Id3v2Header {
                major,
                revision,
                flags,
                size,
            })
        },
    )
}

// ── APEv2 ─────────────────────────────────────────────────────────────

/// 32-byte APEv2 tag footer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApeFooter {
    pub version: u32,
    /// Tag size including this footer but excluding the header.
    pub size: u32,
    pub item_count: u32,
    pub flags: u32,
}

impl ApeFooter {
    pub const SIZE: usize = 32;

    /// Bit 31: the tag carries a header as well.
    #[must_use]
    pub fn has_header(&self) -> bool {
        self.flags & (1 << 31) != 0
    }
}

#[must_use]
pub fn ape_footer() -> StructUnit<ApeFooter> {
    sequence_to_struct::<ApeFooter>()
        .ignore(magic(b"APETAGEX"))
        .field(U32_LE, |f, v| f.version = v)
        .field(U32_LE, |f, v| f.size = v)
        .field(U32_LE, |f, v| f.item_count = v)
        .field(U32_LE, |f, v| f.flags = v)
        .skip(8)
        .build()
}

// ── Byte builders ─────────────────────────────────────────────────────

/// Encode an integral sample rate as an 80-bit extended float.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn extended(rate: u32) -> [u8; 10] {
    let mut out = [0u8; 10];
    if rate == 0 {
        return out;
    }
    let shift = rate.leading_zeros();
    let exponent = 16383 + 31 - shift;
    let mantissa = u64::from(rate) << (32 + shift);
    out[..2].copy_from_slice(&(exponent as u16).to_be_bytes());
    out[2..].copy_from_slice(&mantissa.to_be_bytes());
    out
}

/// A minimal AIFF file: `FORM` header, `COMM`, and an empty `SSND`.
#[must_use]
pub fn aiff_file(channels: i16, sample_frames: u32, sample_size: i16, rate: u32) -> Vec<u8> {
    let mut comm = Vec::with_capacity(18);
    comm.extend_from_slice(&channels.to_be_bytes());
    comm.extend_from_slice(&sample_frames.to_be_bytes());
    comm.extend_from_slice(&sample_size.to_be_bytes());
    comm.extend_from_slice(&extended(rate));

    let ssnd = [0u8; 8];

    let mut out = Vec::new();
    out.extend_from_slice(b"FORM");
    out.extend_from_slice(&(4 + 12 + 26 + 16u32).to_be_bytes());
    out.extend_from_slice(b"AIFF");
    // Unknown chunk ahead of COMM, to make the walker skip.
    out.extend_from_slice(b"FVER");
    out.extend_from_slice(&4u32.to_be_bytes());
    out.extend_from_slice(&0xA280_5140u32.to_be_bytes());
    out.extend_from_slice(b"COMM");
    out.extend_from_slice(&18u32.to_be_bytes());
    out.extend_from_slice(&comm);
    out.extend_from_slice(b"SSND");
    out.extend_from_slice(&8u32.to_be_bytes());
    out.extend_from_slice(&ssnd);
    out
}

/// An APEv2 footer with the given fields.
#[must_use]
pub fn ape_footer_bytes(footer: &ApeFooter) -> [u8; ApeFooter::SIZE] {
    let mut out = [0u8; ApeFooter::SIZE];
    out[..8].copy_from_slice(b"APETAGEX");
    out[8..12].copy_from_slice(&footer.version.to_le_bytes());
    out[12..16].copy_from_slice(&footer.size.to_le_bytes());
    out[16..20].copy_from_slice(&footer.item_count.to_le_bytes());
    out[20..24].copy_from_slice(&footer.flags.to_le_bytes());
    out
}
