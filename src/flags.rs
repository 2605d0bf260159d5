use crate::foundation::error::{FfgraphError, FfgraphResult};

/// One ffmpeg command-line unit: a flag with its value, or a bare positional path.
///
/// The same vocabulary is used for global options and for per-output options; the
/// container a unit is placed in decides where its tokens land in the final argv.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FlagUnit {
    /// `-i <path>` per path, in order.
    Input(Vec<String>),
    /// `-y`
    Overwrite,
    /// `-loglevel <level>`
    LogLevel(String),
    /// `-progress <target>`
    ProgressSink(String),
    /// `-c:v <codec>`
    VideoCodec(String),
    /// `-c:a <codec>`
    AudioCodec(String),
    /// `-crf <n>`, 0..=51.
    Crf(i32),
    /// `-b:v <rate>`
    Bitrate(String),
    /// `-b:a <rate>`
    AudioBitrate(String),
    /// `-preset <name>`
    Preset(String),
    /// `-f <format>`
    Format(String),
    /// `-ar <hz>`
    SampleRate(i32),
    /// `-ac <n>`, 1..=8.
    Channels(i32),
    /// `-map <stream>`
    Map(String),
    /// Bare output path; must be the last unit of its output.
    File(String),
}

impl FlagUnit {
    pub fn input<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Input(paths.into_iter().map(Into::into).collect())
    }

    pub fn log_level(level: impl Into<String>) -> Self {
        Self::LogLevel(level.into())
    }

    pub fn progress_sink(target: impl Into<String>) -> Self {
        Self::ProgressSink(target.into())
    }

    pub fn video_codec(codec: impl Into<String>) -> Self {
        Self::VideoCodec(codec.into())
    }

    pub fn audio_codec(codec: impl Into<String>) -> Self {
        Self::AudioCodec(codec.into())
    }

    pub fn bitrate(rate: impl Into<String>) -> Self {
        Self::Bitrate(rate.into())
    }

    pub fn audio_bitrate(rate: impl Into<String>) -> Self {
        Self::AudioBitrate(rate.into())
    }

    pub fn preset(name: impl Into<String>) -> Self {
        Self::Preset(name.into())
    }

    pub fn format(format: impl Into<String>) -> Self {
        Self::Format(format.into())
    }

    pub fn map(stream: impl Into<String>) -> Self {
        Self::Map(stream.into())
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    /// Short kind name used to attribute validation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Overwrite => "overwrite",
            Self::LogLevel(_) => "loglevel",
            Self::ProgressSink(_) => "progress",
            Self::VideoCodec(_) => "video codec",
            Self::AudioCodec(_) => "audio codec",
            Self::Crf(_) => "crf",
            Self::Bitrate(_) => "bitrate",
            Self::AudioBitrate(_) => "audio bitrate",
            Self::Preset(_) => "preset",
            Self::Format(_) => "format",
            Self::SampleRate(_) => "sample rate",
            Self::Channels(_) => "channels",
            Self::Map(_) => "map",
            Self::File(_) => "file",
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn validate(&self) -> FfgraphResult<()> {
        match self {
            Self::Input(_)
            | Self::Overwrite
            | Self::LogLevel(_)
            | Self::ProgressSink(_)
            | Self::VideoCodec(_)
            | Self::AudioCodec(_) => Ok(()),
            Self::Crf(n) => {
                if !(0..=51).contains(n) {
                    return Err(FfgraphError::validation(format!(
                        "crf: must be between 0 and 51, got {n}"
                    )));
                }
                Ok(())
            }
            Self::Bitrate(s) => non_empty(s, "bitrate: cannot be empty"),
            Self::AudioBitrate(s) => non_empty(s, "audio bitrate: cannot be empty"),
            Self::Preset(s) => non_empty(s, "preset: cannot be empty"),
            Self::Format(s) => non_empty(s, "format: cannot be empty"),
            Self::SampleRate(n) => {
                if *n <= 0 {
                    return Err(FfgraphError::validation(format!(
                        "sample rate: must be positive, got {n}"
                    )));
                }
                Ok(())
            }
            Self::Channels(n) => {
                if !(1..=8).contains(n) {
                    return Err(FfgraphError::validation(format!(
                        "channels: must be between 1 and 8, got {n}"
                    )));
                }
                Ok(())
            }
            Self::Map(s) => non_empty(s, "map: stream mapping cannot be empty"),
            Self::File(s) => non_empty(s, "file: path cannot be empty"),
        }
    }

    /// Tokens for this unit. Only meaningful after [`FlagUnit::validate`] succeeded.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(2);
        self.render_into(&mut out);
        out
    }

    pub(crate) fn render_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Input(paths) => {
                for path in paths {
                    out.push("-i".to_string());
                    out.push(path.clone());
                }
            }
            Self::Overwrite => out.push("-y".to_string()),
            Self::LogLevel(level) => push_pair(out, "-loglevel", level),
            Self::ProgressSink(target) => push_pair(out, "-progress", target),
            Self::VideoCodec(codec) => push_pair(out, "-c:v", codec),
            Self::AudioCodec(codec) => push_pair(out, "-c:a", codec),
            Self::Crf(n) => push_pair(out, "-crf", &n.to_string()),
            Self::Bitrate(rate) => push_pair(out, "-b:v", rate),
            Self::AudioBitrate(rate) => push_pair(out, "-b:a", rate),
            Self::Preset(name) => push_pair(out, "-preset", name),
            Self::Format(format) => push_pair(out, "-f", format),
            Self::SampleRate(n) => push_pair(out, "-ar", &n.to_string()),
            Self::Channels(n) => push_pair(out, "-ac", &n.to_string()),
            Self::Map(stream) => push_pair(out, "-map", stream),
            Self::File(path) => out.push(path.clone()),
        }
    }
}

fn non_empty(value: &str, msg: &'static str) -> FfgraphResult<()> {
    if value.is_empty() {
        return Err(FfgraphError::validation(msg));
    }
    Ok(())
}

fn push_pair(out: &mut Vec<String>, flag: &str, value: &str) {
    out.push(flag.to_string());
    out.push(value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crf_accepts_only_0_through_51() {
        for n in [-1, 52, 100, i32::MIN] {
            assert!(FlagUnit::Crf(n).validate().is_err(), "crf {n}");
        }
        for n in [0, 23, 51] {
            assert!(FlagUnit::Crf(n).validate().is_ok(), "crf {n}");
        }
    }

    #[test]
    fn channels_and_sample_rate_bounds() {
        assert!(FlagUnit::Channels(0).validate().is_err());
        assert!(FlagUnit::Channels(9).validate().is_err());
        assert!(FlagUnit::Channels(1).validate().is_ok());
        assert!(FlagUnit::Channels(8).validate().is_ok());

        assert!(FlagUnit::SampleRate(0).validate().is_err());
        assert!(FlagUnit::SampleRate(-44100).validate().is_err());
        assert!(FlagUnit::SampleRate(48000).validate().is_ok());
    }

    #[test]
    fn empty_strings_are_rejected_where_required() {
        for unit in [
            FlagUnit::bitrate(""),
            FlagUnit::audio_bitrate(""),
            FlagUnit::preset(""),
            FlagUnit::format(""),
            FlagUnit::map(""),
            FlagUnit::file(""),
        ] {
            let err = unit.validate().unwrap_err();
            assert!(err.is_validation());
            assert!(err.to_string().contains(unit.kind()), "{err}");
        }
        assert!(FlagUnit::video_codec("").validate().is_ok());
        assert!(FlagUnit::log_level("").validate().is_ok());
    }

    #[test]
    fn renders_expected_tokens() {
        assert_eq!(
            FlagUnit::input(["a.mp4", "b.wav"]).render(),
            vec!["-i", "a.mp4", "-i", "b.wav"]
        );
        assert!(FlagUnit::input(Vec::<String>::new()).render().is_empty());
        assert_eq!(FlagUnit::Overwrite.render(), vec!["-y"]);
        assert_eq!(FlagUnit::log_level("error").render(), vec!["-loglevel", "error"]);
        assert_eq!(
            FlagUnit::progress_sink("pipe:2").render(),
            vec!["-progress", "pipe:2"]
        );
        assert_eq!(FlagUnit::audio_codec("aac").render(), vec!["-c:a", "aac"]);
        assert_eq!(FlagUnit::Crf(23).render(), vec!["-crf", "23"]);
        assert_eq!(FlagUnit::bitrate("2M").render(), vec!["-b:v", "2M"]);
        assert_eq!(FlagUnit::audio_bitrate("128k").render(), vec!["-b:a", "128k"]);
        assert_eq!(FlagUnit::format("mp4").render(), vec!["-f", "mp4"]);
        assert_eq!(FlagUnit::SampleRate(48000).render(), vec!["-ar", "48000"]);
        assert_eq!(FlagUnit::Channels(2).render(), vec!["-ac", "2"]);
        assert_eq!(FlagUnit::map("[scaled]").render(), vec!["-map", "[scaled]"]);
        assert_eq!(FlagUnit::file("out.mp4").render(), vec!["out.mp4"]);
    }

    #[test]
    fn json_shape_is_tagged_by_kind() {
        let json = serde_json::to_value(FlagUnit::Crf(18)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "crf", "value": 18}));

        let unit: FlagUnit = serde_json::from_str(r#"{"kind":"overwrite"}"#).unwrap();
        assert_eq!(unit, FlagUnit::Overwrite);
    }
}
