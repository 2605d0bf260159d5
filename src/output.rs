use crate::{
    flags::FlagUnit,
    foundation::error::{FfgraphError, FfgraphResult},
};

/// Options scoped to one output target, ending with the output path.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OutputSpec {
    flags: Vec<FlagUnit>,
}

impl OutputSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// An output that is just a path.
    pub fn to_file(path: impl Into<String>) -> Self {
        Self::new().with(FlagUnit::file(path))
    }

    pub fn push(&mut self, flag: FlagUnit) {
        self.flags.push(flag);
    }

    pub fn with(mut self, flag: FlagUnit) -> Self {
        self.push(flag);
        self
    }

    pub fn flags(&self) -> &[FlagUnit] {
        &self.flags
    }

    /// The path of the trailing `File` unit, if any.
    pub fn path(&self) -> Option<&str> {
        match self.flags.last() {
            Some(FlagUnit::File(path)) => Some(path),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Validates each unit in order and concatenates their tokens.
    ///
    /// A `File` unit anywhere but last is rejected: ffmpeg would bind the
    /// following flags to the next output instead.
    pub fn validate_and_render(&self) -> FfgraphResult<Vec<String>> {
        let last = self.flags.len().saturating_sub(1);
        let mut out = Vec::with_capacity(self.flags.len() * 2);
        for (idx, flag) in self.flags.iter().enumerate() {
            flag.validate()?;
            if flag.is_file() && idx != last {
                return Err(FfgraphError::validation(format!(
                    "file: output path must be the last unit of its output \
                     (found at index {idx} of {})",
                    self.flags.len()
                )));
            }
            flag.render_into(&mut out);
        }
        Ok(out)
    }
}

impl FromIterator<FlagUnit> for OutputSpec {
    fn from_iter<T: IntoIterator<Item = FlagUnit>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}
