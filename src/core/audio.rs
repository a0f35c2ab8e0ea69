//! PCM helpers shared by the speech provider clients.

use std::io::Cursor;

use audioadapter_buffers::direct::SequentialSliceOfVecs;
use rubato::{Async, FixedAsync, PolynomialDegree, Resampler};
use thiserror::Error;

/// Wrap mono 16-bit PCM in a WAV container.
pub fn to_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        let mut pcm = writer.get_i16_writer(samples.len() as u32);
        for &sample in samples {
            pcm.write_sample(sample);
        }
        pcm.flush()?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Interpret raw little-endian 16-bit PCM. A trailing odd byte is dropped.
pub fn pcm16le_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Errors raised while converting sample rates.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("resampler setup failed: {0}")]
    Setup(String),
    #[error("resampler buffer does not fit {0} frames")]
    Buffer(usize),
    #[error("resampling failed: {0}")]
    Process(String),
}

/// Input frames handed to the resampler per call.
const RESAMPLE_CHUNK_FRAMES: usize = 1024;

/// Resample mono 16-bit PCM from `from_rate` to `to_rate`.
///
/// The tail is zero-padded to a whole chunk and the result is trimmed to the
/// length the rate change implies.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Result<Vec<i16>, ResampleError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = Async::<f32>::new_poly(
        ratio,
        1.0,
        PolynomialDegree::Septic,
        RESAMPLE_CHUNK_FRAMES,
        1,
        FixedAsync::Input,
    )
    .map_err(|e| ResampleError::Setup(e.to_string()))?;

    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    let max_output = resampler.output_frames_max();
    let mut input = vec![Vec::with_capacity(RESAMPLE_CHUNK_FRAMES)];
    let mut output = vec![vec![0.0f32; max_output]];
    let mut resampled = Vec::with_capacity(expected + max_output);

    for chunk in samples.chunks(RESAMPLE_CHUNK_FRAMES) {
        input[0].clear();
        input[0].extend(chunk.iter().map(|&s| s as f32 / 32768.0));
        input[0].resize(RESAMPLE_CHUNK_FRAMES, 0.0);

        let input_adapter = SequentialSliceOfVecs::new(&input, 1, RESAMPLE_CHUNK_FRAMES)
            .map_err(|_| ResampleError::Buffer(RESAMPLE_CHUNK_FRAMES))?;
        let written = {
            let mut output_adapter = SequentialSliceOfVecs::new_mut(&mut output, 1, max_output)
                .map_err(|_| ResampleError::Buffer(max_output))?;
            let (_, written) = resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| ResampleError::Process(e.to_string()))?;
            written
        };

        resampled.extend(output[0][..written].iter().map(|&s| {
            (s * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
        }));
    }

    resampled.truncate(expected);
    Ok(resampled)
}
