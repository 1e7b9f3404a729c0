/// Traversal strategy used by [`Graph::backward`](crate::autograd::Graph::backward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackwardStrategy {
    /// Depth-first recursion with per-call visited sets. Every operation runs exactly once,
    /// but recursion depth grows with graph depth.
    #[default]
    Recursive,
    /// Explicit stack, no visited set. Bounded call-stack usage on deep (e.g. unrolled
    /// recurrent) graphs; an operation runs once per incoming path.
    Iterative,
}

/// Per-graph autograd settings.
///
/// Replaces a process-wide "training mode" switch: each [`Graph`](crate::autograd::Graph)
/// carries its own configuration, so independent graphs never observe each other's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutogradConfig {
    /// When `false`, invocations never record graph edges (inference mode).
    pub training: bool,
    /// Strategy used by `Graph::backward`.
    pub strategy: BackwardStrategy,
    /// When `false`, gradients of non-leaf values are dropped once `backward` finishes.
    pub retain_grad: bool,
}

impl Default for AutogradConfig {
    fn default() -> Self {
        AutogradConfig {
            training: true,
            strategy: BackwardStrategy::Recursive,
            retain_grad: true,
        }
    }
}

impl AutogradConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_training(mut self, training: bool) -> Self {
        self.training = training;
        self
    }

    pub fn with_strategy(mut self, strategy: BackwardStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_retain_grad(mut self, retain_grad: bool) -> Self {
        self.retain_grad = retain_grad;
        self
    }
}
