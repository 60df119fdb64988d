use crate::Variant;

/// Stage of the capture cycle; the `2` suffix marks the reflections variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    #[default]
    Capture,
    Infer,
    Filter,
    Capture2,
    Infer2,
    Filter2,
}

/// What a stage does, regardless of the variant it works on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Capture,
    Infer,
    Filter,
}

impl Stage {
    pub fn variant(self) -> Variant {
        match self {
            Stage::Capture | Stage::Infer | Stage::Filter => Variant::Primary,

            Stage::Capture2 | Stage::Infer2 | Stage::Filter2 => {
                Variant::Reflections
            }
        }
    }

    pub fn step(self) -> Step {
        match self {
            Stage::Capture | Stage::Capture2 => Step::Capture,
            Stage::Infer | Stage::Infer2 => Step::Infer,
            Stage::Filter | Stage::Filter2 => Step::Filter,
        }
    }

    /// Returns the stage that follows this one.
    ///
    /// The reflections half of the cycle is entered only if it's active at
    /// the moment the primary half finishes; once entered, it always runs to
    /// completion.
    pub fn next(self, reflections_active: bool) -> Self {
        match self {
            Stage::Capture => Stage::Infer,
            Stage::Infer => Stage::Filter,

            Stage::Filter => {
                if reflections_active {
                    Stage::Capture2
                } else {
                    Stage::Capture
                }
            }

            Stage::Capture2 => Stage::Infer2,
            Stage::Infer2 => Stage::Filter2,
            Stage::Filter2 => Stage::Capture,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Capture => "capture",
            Stage::Infer => "infer",
            Stage::Filter => "filter",
            Stage::Capture2 => "capture2",
            Stage::Infer2 => "infer2",
            Stage::Filter2 => "filter2",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scheduler {
    stage: Stage,
}

impl Scheduler {
    /// Stage the next tick will execute.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn advance(&mut self, reflections_active: bool) -> Stage {
        self.stage = self.stage.next(reflections_active);
        self.stage
    }
}
