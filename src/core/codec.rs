//! G.711 µ-law codec for the telephony wire format.
//!
//! Media streams carry 8 kHz mono audio, one µ-law byte per sample. Everything
//! past the transport boundary works on linear 16-bit PCM, so inbound payloads
//! are decoded on arrival and synthesized speech is encoded right before it is
//! framed for playback.
//!
//! The conversion follows the ITU-T G.711 companding tables (bias 0x84,
//! clip at 32635). It is stateless and lossy: only values that were produced
//! by [`encode`] survive a decode/encode round trip byte-for-byte.

/// Sample rate of the wire audio in Hz.
pub const SAMPLE_RATE: u32 = 8000;

/// Samples (and wire bytes) in one 20 ms media frame.
pub const FRAME_SAMPLES: usize = 160;

const BIAS: i32 = 0x84;
const CLIP: i32 = 32635;

/// Decode a single µ-law byte into a linear 16-bit sample.
#[inline]
pub fn decode_sample(byte: u8) -> i16 {
    let byte = !byte;
    let exponent = (byte >> 4) & 0x07;
    let mantissa = (byte & 0x0F) as i32;

    let magnitude = (((mantissa << 3) + BIAS) << exponent) - BIAS;
    if byte & 0x80 != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

/// Encode a linear 16-bit sample into a single µ-law byte.
#[inline]
pub fn encode_sample(sample: i16) -> u8 {
    let mut pcm = sample as i32;
    let sign: u8 = if pcm < 0 {
        pcm = -pcm;
        0x80
    } else {
        0x00
    };
    pcm = pcm.min(CLIP) + BIAS;

    let mut exponent: u8 = 7;
    let mut mask: i32 = 0x4000;
    while exponent > 0 && pcm & mask == 0 {
        exponent -= 1;
        mask >>= 1;
    }
    let mantissa = ((pcm >> (exponent + 3)) & 0x0F) as u8;

    !(sign | (exponent << 4) | mantissa)
}

/// Decode a wire chunk into PCM samples.
pub fn decode(chunk: &[u8]) -> Vec<i16> {
    chunk.iter().map(|&b| decode_sample(b)).collect()
}

/// Encode PCM samples into a wire chunk.
pub fn encode(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| encode_sample(s)).collect()
}

/// Number of samples covering `ms` milliseconds of wire audio.
#[inline]
pub fn ms_to_samples(ms: u64) -> usize {
    (ms * SAMPLE_RATE as u64 / 1000) as usize
}

/// Duration in milliseconds of `samples` samples of wire audio.
#[inline]
pub fn samples_to_ms(samples: usize) -> u64 {
    samples as u64 * 1000 / SAMPLE_RATE as u64
}
