use crate::{flags::FlagUnit, foundation::error::FfgraphResult};

/// Global options, rendered before the filter graph and every output.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    flags: Vec<FlagUnit>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
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

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Validates each flag in order and concatenates their tokens; the first
    /// invalid flag aborts with its error.
    pub fn validate_and_render(&self) -> FfgraphResult<Vec<String>> {
        render_flags(&self.flags)
    }
}

impl FromIterator<FlagUnit> for OptionSet {
    fn from_iter<T: IntoIterator<Item = FlagUnit>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

fn render_flags(flags: &[FlagUnit]) -> FfgraphResult<Vec<String>> {
    let mut out = Vec::with_capacity(flags.len() * 2);
    for flag in flags {
        flag.validate()?;
        flag.render_into(&mut out);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_insertion_order_without_dedup() {
        let set = OptionSet::new()
            .with(FlagUnit::input(["in.mp4"]))
            .with(FlagUnit::Overwrite)
            .with(FlagUnit::Overwrite)
            .with(FlagUnit::log_level("error"));
        assert_eq!(
            set.validate_and_render().unwrap(),
            vec!["-i", "in.mp4", "-y", "-y", "-loglevel", "error"]
        );
    }

    #[test]
    fn first_invalid_flag_aborts() {
        let set: OptionSet = [FlagUnit::Overwrite, FlagUnit::Crf(99), FlagUnit::format("")]
            .into_iter()
            .collect();
        let err = set.validate_and_render().unwrap_err();
        assert!(err.to_string().contains("crf"), "{err}");
    }

    #[test]
    fn empty_set_renders_nothing() {
        assert!(OptionSet::new().validate_and_render().unwrap().is_empty());
    }
}
