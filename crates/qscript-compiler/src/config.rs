//! Compiler settings.

/// Knobs for [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Deepest statement/expression nesting accepted before compilation
    /// fails with `NestingTooDeep`. Nested function bodies count towards the
    /// same limit as the code around them.
    pub max_nesting_depth: usize,
}

impl CompilerConfig {
    /// Fits an unoptimized build on a 2 MiB thread stack.
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = CompilerConfig::new().with_max_nesting_depth(8);
        assert_eq!(config.max_nesting_depth, 8);
        assert_eq!(CompilerConfig::default().max_nesting_depth, 128);
    }
}
