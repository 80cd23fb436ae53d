//! WAV 容器构建与解析
//!
//! 合成得到的 PCM 字节在这里装进标准 RIFF/WAVE 容器返回给客户端。
//! 输出必须逐字节符合规范，任意 WAV 客户端都要能解析。
//! 解析函数用于测试中的 round-trip 校验。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("Invalid WAV: {0}")]
    Invalid(String),
}

/// PCM 参数，取自合成结果的第一个音频块
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmSpec {
    /// 声道数
    pub channels: u16,
    /// 每个样本的字节数（s16le 为 2）
    pub sample_width: u16,
    /// 采样率 (Hz)
    pub sample_rate: u32,
}

/// 构建 WAV 文件字节流
///
/// RIFF 头 + 16 字节 PCM `fmt ` 块 + `data` 块（样本原样写入）。
/// `byte_rate` / `block_align` 按规范从参数推导，全部小端。
pub fn build_wav(spec: PcmSpec, samples: &[u8]) -> Vec<u8> {
    let bits_per_sample = spec.sample_width * 8;
    let byte_rate = spec.sample_rate * spec.channels as u32 * spec.sample_width as u32;
    let block_align = spec.channels * spec.sample_width;

    let data_size = samples.len();
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&spec.channels.to_le_bytes());
    wav.extend_from_slice(&spec.sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());
    wav.extend_from_slice(samples);

    wav
}

/// 解析结果
#[derive(Debug)]
pub struct ParsedWav {
    pub spec: PcmSpec,
    pub data: Vec<u8>,
}

/// 解析 WAV 字节流，提取 PCM 参数和 data 块内容
pub fn parse_wav(data: &[u8]) -> Result<ParsedWav, WavError> {
    if data.len() < 44 {
        return Err(WavError::Invalid("WAV data too short".to_string()));
    }
    if &data[0..4] != b"RIFF" {
        return Err(WavError::Invalid("missing RIFF header".to_string()));
    }
    if &data[8..12] != b"WAVE" {
        return Err(WavError::Invalid("missing WAVE identifier".to_string()));
    }

    let mut pos = 12;
    let mut spec: Option<PcmSpec> = None;
    let mut pcm: Option<Vec<u8>> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size =
            u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                as usize;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || pos + 8 + 16 > data.len() {
                    return Err(WavError::Invalid("invalid fmt chunk size".to_string()));
                }
                let fmt = &data[pos + 8..pos + 8 + 16];
                let bits_per_sample = u16::from_le_bytes([fmt[14], fmt[15]]);
                spec = Some(PcmSpec {
                    channels: u16::from_le_bytes([fmt[2], fmt[3]]),
                    sample_width: bits_per_sample / 8,
                    sample_rate: u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]),
                });
            }
            b"data" => {
                if pos + 8 + chunk_size > data.len() {
                    return Err(WavError::Invalid("data chunk truncated".to_string()));
                }
                pcm = Some(data[pos + 8..pos + 8 + chunk_size].to_vec());
            }
            _ => {}
        }

        pos += 8 + chunk_size;
        // 对齐到偶数字节
        if chunk_size % 2 != 0 {
            pos += 1;
        }
    }

    let spec = spec.ok_or_else(|| WavError::Invalid("missing fmt chunk".to_string()))?;
    let data = pcm.ok_or_else(|| WavError::Invalid("missing data chunk".to_string()))?;

    Ok(ParsedWav { spec, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: PcmSpec = PcmSpec {
        channels: 1,
        sample_width: 2,
        sample_rate: 22050,
    };

    #[test]
    fn test_header_fields_exact() {
        let samples = [0u8; 8];
        let wav = build_wav(SPEC, &samples);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 8);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        // PCM format tag
        assert_eq!(u16::from_le_bytes(wav[20..22].try_into().unwrap()), 1);
        // byte_rate = 22050 * 1 * 2
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 44100);
        // block_align = 1 * 2
        assert_eq!(u16::from_le_bytes(wav[32..34].try_into().unwrap()), 2);
        // bits_per_sample
        assert_eq!(u16::from_le_bytes(wav[34..36].try_into().unwrap()), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 8);
        assert_eq!(wav.len(), 44 + 8);
    }

    #[test]
    fn test_round_trip() {
        let samples: Vec<u8> = (0..=255).collect();
        let spec = PcmSpec {
            channels: 2,
            sample_width: 2,
            sample_rate: 16000,
        };
        let wav = build_wav(spec, &samples);

        let parsed = parse_wav(&wav).unwrap();
        assert_eq!(parsed.spec, spec);
        assert_eq!(parsed.data, samples);
    }

    #[test]
    fn test_empty_samples() {
        let wav = build_wav(SPEC, &[]);
        let parsed = parse_wav(&wav).unwrap();
        assert_eq!(parsed.spec, SPEC);
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_wav(b"not a wav").is_err());
        assert!(parse_wav(&[0u8; 64]).is_err());
    }
}
