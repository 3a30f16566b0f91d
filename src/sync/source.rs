/// How a parameter edit was produced. Picks the outbound flow-control policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// Discrete choices and toggles: send right away.
    Immediate,
    /// Continuous drags: throttled, with a trailing send.
    Slider,
    /// Typed input: debounced until typing pauses.
    Text,
}

impl ChangeSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Slider => "slider",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
