use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    pub const fn char(self) -> char {
        match self {
            FenceKind::Backticks => Fence::TICK,
            FenceKind::Tildes => Fence::TILDE,
        }
    }
}

/// A code fence long enough that nothing in the content can close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    pub kind: FenceKind,
    pub len: usize,
}

impl Fence {
    pub const TICK: char = '`';
    pub const TILDE: char = '~';
    /// Shortest fence CommonMark recognizes.
    pub const MIN_LEN: usize = 3;

    /// Picks the fence for `content`: backticks unless the content's longest
    /// backtick run is longer than its longest tilde run, then one longer
    /// than the chosen character's longest run (at least three).
    pub fn for_content(content: &str) -> Self {
        let ticks = longest_run(content, Self::TICK);
        let tildes = longest_run(content, Self::TILDE);

        let (kind, run) = if ticks <= tildes {
            (FenceKind::Backticks, ticks)
        } else {
            (FenceKind::Tildes, tildes)
        };

        Self {
            kind,
            len: Self::MIN_LEN.max(run + 1),
        }
    }
}

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.kind.char();
        for _ in 0..self.len {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Length of the longest run of consecutive `c` in `s` (0 if absent).
pub fn longest_run(s: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in s.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", '`', 0)]
    #[case("no ticks", '`', 0)]
    #[case("a`b", '`', 1)]
    #[case("``a```b`", '`', 3)]
    #[case("~~~~ and ~", '~', 4)]
    fn longest_runs(#[case] s: &str, #[case] c: char, #[case] expected: usize) {
        assert_eq!(longest_run(s, c), expected);
    }

    #[test]
    fn plain_content_gets_three_backticks() {
        let fence = Fence::for_content("fn main() {}");
        assert_eq!(fence.kind, FenceKind::Backticks);
        assert_eq!(fence.to_string(), "```");
    }

    #[test]
    fn backtick_fence_in_content_switches_to_tildes() {
        let fence = Fence::for_content("```\ncode\n```");
        assert_eq!(fence.kind, FenceKind::Tildes);
        assert_eq!(fence.to_string(), "~~~");
    }

    #[test]
    fn equal_runs_prefer_longer_backticks() {
        let fence = Fence::for_content("```\n~~~");
        assert_eq!(fence.kind, FenceKind::Backticks);
        assert_eq!(fence.to_string(), "````");
    }

    #[test]
    fn tildes_only_keeps_backticks() {
        let fence = Fence::for_content("~~~~~");
        assert_eq!(fence, Fence { kind: FenceKind::Backticks, len: 3 });
    }
}
