//! Ready-made [`FlagUnit`] values for common codecs, encoder presets, and quality levels.

use crate::flags::FlagUnit;

pub fn h264() -> FlagUnit {
    FlagUnit::video_codec("libx264")
}

pub fn h265() -> FlagUnit {
    FlagUnit::video_codec("libx265")
}

pub fn vp9() -> FlagUnit {
    FlagUnit::video_codec("libvpx-vp9")
}

pub fn av1() -> FlagUnit {
    FlagUnit::video_codec("libaom-av1")
}

pub fn aac() -> FlagUnit {
    FlagUnit::audio_codec("aac")
}

pub fn mp3() -> FlagUnit {
    FlagUnit::audio_codec("libmp3lame")
}

pub fn opus() -> FlagUnit {
    FlagUnit::audio_codec("libopus")
}

pub fn ultrafast() -> FlagUnit {
    FlagUnit::preset("ultrafast")
}

pub fn fast() -> FlagUnit {
    FlagUnit::preset("fast")
}

pub fn medium() -> FlagUnit {
    FlagUnit::preset("medium")
}

pub fn slow() -> FlagUnit {
    FlagUnit::preset("slow")
}

pub fn veryslow() -> FlagUnit {
    FlagUnit::preset("veryslow")
}

pub fn crf_high_quality() -> FlagUnit {
    FlagUnit::Crf(18)
}

pub fn crf_good_quality() -> FlagUnit {
    FlagUnit::Crf(23)
}

pub fn crf_medium_quality() -> FlagUnit {
    FlagUnit::Crf(28)
}

pub fn crf_low_quality() -> FlagUnit {
    FlagUnit::Crf(35)
}

/// `-progress pipe:1`: key=value progress blocks on the child's stdout.
pub fn progress_stdout() -> FlagUnit {
    FlagUnit::progress_sink("pipe:1")
}

/// `-progress pipe:2`: key=value progress blocks on the child's stderr.
pub fn progress_stderr() -> FlagUnit {
    FlagUnit::progress_sink("pipe:2")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates() {
        let all = [
            h264(),
            h265(),
            vp9(),
            av1(),
            aac(),
            mp3(),
            opus(),
            ultrafast(),
            fast(),
            medium(),
            slow(),
            veryslow(),
            crf_high_quality(),
            crf_good_quality(),
            crf_medium_quality(),
            crf_low_quality(),
            progress_stdout(),
            progress_stderr(),
        ];
        for unit in all {
            assert!(unit.validate().is_ok(), "{unit:?}");
        }
    }

    #[test]
    fn presets_render_expected_values() {
        assert_eq!(h264().render(), vec!["-c:v", "libx264"]);
        assert_eq!(mp3().render(), vec!["-c:a", "libmp3lame"]);
        assert_eq!(veryslow().render(), vec!["-preset", "veryslow"]);
        assert_eq!(crf_good_quality().render(), vec!["-crf", "23"]);
        assert_eq!(progress_stdout().render(), vec!["-progress", "pipe:1"]);
    }
}
