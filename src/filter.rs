use crate::foundation::error::{FfgraphError, FfgraphResult};

/// ffmpeg `transpose` modes, numbered exactly as ffmpeg numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TransposeMode {
    /// 90° clockwise, then vertical flip.
    ClockwiseFlip = 0,
    /// 90° clockwise.
    Clockwise = 1,
    /// 90° counter-clockwise.
    CounterClockwise = 2,
    /// 90° counter-clockwise, then vertical flip.
    CounterClockwiseFlip = 3,
}

impl TransposeMode {
    pub const ROTATE_90: Self = Self::Clockwise;

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::ClockwiseFlip),
            1 => Some(Self::Clockwise),
            2 => Some(Self::CounterClockwise),
            3 => Some(Self::CounterClockwiseFlip),
            _ => None,
        }
    }
}

impl From<TransposeMode> for i32 {
    fn from(mode: TransposeMode) -> Self {
        mode as i32
    }
}

/// Preset output sizes for [`FilterNode::scale_preset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// 1280x720
    Hd,
    /// 1920x1080
    Fhd,
    /// 854x480
    Sd480,
}

impl ScaleMode {
    pub fn dims(self) -> (i32, i32) {
        match self {
            Self::Hd => (1280, 720),
            Self::Fhd => (1920, 1080),
            Self::Sd480 => (854, 480),
        }
    }
}

/// One chain of a `-filter_complex` graph.
///
/// Labels are opaque; nothing checks that an input label was produced by an
/// earlier node.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterNode {
    /// Verbatim filter expression, e.g. `scale=1280:-2`.
    Raw { expr: String },
    /// `[in1][in2]expr[out1][out2]`
    Chain {
        #[serde(default)]
        inputs: Vec<String>,
        expr: String,
        #[serde(default)]
        outputs: Vec<String>,
    },
    /// `[input]scale=w:h[output]`
    Scale {
        input: String,
        output: String,
        width: i32,
        height: i32,
    },
    /// `[input]crop=w:h:x:y[output]`
    Crop {
        input: String,
        output: String,
        width: i32,
        height: i32,
        x: i32,
        y: i32,
    },
    /// `[input]transpose=mode[output]`; `mode` is a raw [`TransposeMode`] code.
    Rotate {
        input: String,
        output: String,
        mode: i32,
    },
    /// `[input]split=n[out0]...[out{n-1}]`
    Split {
        input: String,
        n: i32,
        outputs: Vec<String>,
    },
}

impl FilterNode {
    pub fn raw(expr: impl Into<String>) -> Self {
        Self::Raw { expr: expr.into() }
    }

    pub fn labeled<I, O, S, T>(inputs: I, expr: impl Into<String>, outputs: O) -> Self
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::Chain {
            inputs: inputs.into_iter().map(Into::into).collect(),
            expr: expr.into(),
            outputs: outputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Single-label chain; a blank `input` or `output` is left out entirely.
    pub fn chain(input: &str, expr: impl Into<String>, output: &str) -> Self {
        let label = |s: &str| {
            if s.trim().is_empty() {
                Vec::new()
            } else {
                vec![s.to_string()]
            }
        };
        Self::Chain {
            inputs: label(input),
            expr: expr.into(),
            outputs: label(output),
        }
    }

    pub fn scale(
        input: impl Into<String>,
        output: impl Into<String>,
        width: i32,
        height: i32,
    ) -> Self {
        Self::Scale {
            input: input.into(),
            output: output.into(),
            width,
            height,
        }
    }

    pub fn scale_preset(
        input: impl Into<String>,
        output: impl Into<String>,
        mode: ScaleMode,
    ) -> Self {
        let (width, height) = mode.dims();
        Self::scale(input, output, width, height)
    }

    pub fn crop(
        input: impl Into<String>,
        output: impl Into<String>,
        width: i32,
        height: i32,
        x: i32,
        y: i32,
    ) -> Self {
        Self::Crop {
            input: input.into(),
            output: output.into(),
            width,
            height,
            x,
            y,
        }
    }

    pub fn rotate(
        input: impl Into<String>,
        output: impl Into<String>,
        mode: impl Into<i32>,
    ) -> Self {
        Self::Rotate {
            input: input.into(),
            output: output.into(),
            mode: mode.into(),
        }
    }

    pub fn split<O, T>(input: impl Into<String>, n: i32, outputs: O) -> Self
    where
        O: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Split {
            input: input.into(),
            n,
            outputs: outputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Split with outputs labelled `1`, `2`, ..., `n`.
    pub fn split_numbered(input: impl Into<String>, n: i32) -> Self {
        let outputs = (1..=n.max(0)).map(|i| i.to_string()).collect::<Vec<_>>();
        Self::split(input, n, outputs)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Raw { .. } => "filter",
            Self::Chain { .. } => "chain",
            Self::Scale { .. } => "scale",
            Self::Crop { .. } => "crop",
            Self::Rotate { .. } => "rotate",
            Self::Split { .. } => "split",
        }
    }

    pub fn validate(&self) -> FfgraphResult<()> {
        match self {
            Self::Raw { expr } => {
                if is_blank(expr) {
                    return Err(FfgraphError::validation(
                        "filter: expression cannot be empty",
                    ));
                }
            }
            Self::Chain {
                inputs,
                expr,
                outputs,
            } => {
                if is_blank(expr) {
                    return Err(FfgraphError::validation("chain: expression cannot be empty"));
                }
                if inputs.iter().any(|l| is_blank(l)) {
                    return Err(FfgraphError::validation("chain: input label cannot be empty"));
                }
                if outputs.iter().any(|l| is_blank(l)) {
                    return Err(FfgraphError::validation(
                        "chain: output label cannot be empty",
                    ));
                }
            }
            Self::Scale {
                input,
                output,
                width,
                height,
            } => {
                io_labels("scale", input, output)?;
                // -1 and -2 ask ffmpeg to keep the aspect ratio (-2: and keep it even).
                let valid = |v: i32| v > 0 || v == -1 || v == -2;
                if !valid(*width) {
                    return Err(FfgraphError::validation(format!(
                        "scale: width must be >0 or -1 or -2, got {width}"
                    )));
                }
                if !valid(*height) {
                    return Err(FfgraphError::validation(format!(
                        "scale: height must be >0 or -1 or -2, got {height}"
                    )));
                }
            }
            Self::Crop {
                input,
                output,
                width,
                height,
                x,
                y,
            } => {
                io_labels("crop", input, output)?;
                if *width <= 0 || *height <= 0 {
                    return Err(FfgraphError::validation(format!(
                        "crop: width and height must be positive, got {width}x{height}"
                    )));
                }
                if *x < 0 || *y < 0 {
                    return Err(FfgraphError::validation(format!(
                        "crop: x and y must be non-negative, got {x},{y}"
                    )));
                }
            }
            Self::Rotate {
                input,
                output,
                mode,
            } => {
                io_labels("rotate", input, output)?;
                if TransposeMode::from_code(*mode).is_none() {
                    return Err(FfgraphError::validation(format!(
                        "rotate: invalid transpose mode {mode} (expected 0..3)"
                    )));
                }
            }
            Self::Split { input, n, outputs } => {
                if is_blank(input) {
                    return Err(FfgraphError::validation("split: input label cannot be empty"));
                }
                if *n < 2 {
                    return Err(FfgraphError::validation(format!(
                        "split: n must be >= 2, got {n}"
                    )));
                }
                if usize::try_from(*n).ok() != Some(outputs.len()) {
                    return Err(FfgraphError::validation(format!(
                        "split: number of outputs ({}) must match n ({n})",
                        outputs.len()
                    )));
                }
                if let Some(idx) = outputs.iter().position(|l| is_blank(l)) {
                    return Err(FfgraphError::validation(format!(
                        "split: output label at index {idx} cannot be empty"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The chain text. Only meaningful after [`FilterNode::validate`] succeeded.
    pub fn render(&self) -> String {
        match self {
            Self::Raw { expr } => expr.clone(),
            Self::Chain {
                inputs,
                expr,
                outputs,
            } => {
                let mut s = String::with_capacity(expr.len() + 8 * (inputs.len() + outputs.len()));
                push_labels(&mut s, inputs);
                s.push_str(expr);
                push_labels(&mut s, outputs);
                s
            }
            Self::Scale {
                input,
                output,
                width,
                height,
            } => format!("[{input}]scale={width}:{height}[{output}]"),
            Self::Crop {
                input,
                output,
                width,
                height,
                x,
                y,
            } => format!("[{input}]crop={width}:{height}:{x}:{y}[{output}]"),
            Self::Rotate {
                input,
                output,
                mode,
            } => format!("[{input}]transpose={mode}[{output}]"),
            Self::Split { input, n, outputs } => {
                let mut s = format!("[{input}]split={n}");
                push_labels(&mut s, outputs);
                s
            }
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn io_labels(kind: &str, input: &str, output: &str) -> FfgraphResult<()> {
    if is_blank(input) {
        return Err(FfgraphError::validation(format!(
            "{kind}: input label cannot be empty"
        )));
    }
    if is_blank(output) {
        return Err(FfgraphError::validation(format!(
            "{kind}: output label cannot be empty"
        )));
    }
    Ok(())
}

fn push_labels(s: &mut String, labels: &[String]) {
    for label in labels {
        s.push('[');
        s.push_str(label);
        s.push(']');
    }
}
