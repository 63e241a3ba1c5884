const STACK_DEPTH_VAR: &str = "MPILEAKS_STACK_DEPTH";
const DEFAULT_STACK_DEPTH: i32 = 1;

/// Process-wide configuration, read once at `on_init` time.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Maximum number of frames to retain past the chop point, or `-1` for
    /// unlimited; defaults to `1` (single frame). Ported from the
    /// original's bare `atoi(getenv(...))` on `MPILEAKS_STACK_DEPTH`, but
    /// unlike the original (which silently yields `0` on a non-numeric
    /// value) a parse failure is logged before falling back to the
    /// default.
    pub stack_depth: i32,
}

impl Config {
    pub fn from_env() -> Self {
        let stack_depth = match std::env::var(STACK_DEPTH_VAR) {
            Ok(value) => value.trim().parse().unwrap_or_else(|_| {
                tracing::error!(
                    "mpileaks: Internal Error: {STACK_DEPTH_VAR}={value:?} is not an integer, using default {DEFAULT_STACK_DEPTH}"
                );
                DEFAULT_STACK_DEPTH
            }),
            Err(_) => DEFAULT_STACK_DEPTH,
        };
        Config { stack_depth }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stack_depth: DEFAULT_STACK_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_frame_depth() {
        assert_eq!(Config::default().stack_depth, 1);
    }
}
