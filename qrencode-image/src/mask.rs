//! The eight data masks and the penalty score used to pick one.

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Whether `mask` flips the module at column `x`, row `y`.
pub(crate) fn is_flipped(mask: u8, x: usize, y: usize) -> bool {
    match mask {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => x * y % 2 + x * y % 3 == 0,
        6 => (x * y % 2 + x * y % 3) % 2 == 0,
        7 => ((x + y) % 2 + x * y % 3) % 2 == 0,
        _ => unreachable!("mask out of range"),
    }
}

/// Penalty score of a square module grid stored row by row. Lower is better.
///
/// Adds up runs of five or more same-colored modules in a row or column,
/// 2×2 same-colored blocks, finder-like 1:1:3:1:1 patterns, and the
/// imbalance between dark and light modules.
pub(crate) fn penalty_score(size: usize, modules: &[bool]) -> i32 {
    debug_assert_eq!(modules.len(), size * size);
    let at = |x: usize, y: usize| modules[y * size + x];
    let mut result: i32 = 0;

    for y in 0..size {
        result += line_penalty(size, (0..size).map(|x| at(x, y)));
    }
    for x in 0..size {
        result += line_penalty(size, (0..size).map(|y| at(x, y)));
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color = at(x, y);
            if color == at(x + 1, y) && color == at(x, y + 1) && color == at(x + 1, y + 1) {
                result += PENALTY_N2;
            }
        }
    }

    let dark = modules.iter().filter(|&&m| m).count() as i32;
    let total = (size * size) as i32;
    // Smallest k such that the dark share is within (5 + 5k)% of 50%.
    let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result += k * PENALTY_N4;
    result
}

/// Run-length and finder-pattern penalties of a single row or column.
fn line_penalty(size: usize, line: impl Iterator<Item = bool>) -> i32 {
    let mut result = 0;
    let mut history = RunHistory::new(size as i32);
    let mut run_color = false;
    let mut run_len: i32 = 0;
    for color in line {
        if color == run_color {
            run_len += 1;
            if run_len == 5 {
                result += PENALTY_N1;
            } else if run_len > 5 {
                result += 1;
            }
        } else {
            history.push(run_len);
            if !run_color {
                result += history.count_patterns() * PENALTY_N3;
            }
            run_color = color;
            run_len = 1;
        }
    }
    result + history.terminate_and_count(run_color, run_len) * PENALTY_N3
}

/// The last seven run lengths of a line, newest first. The light border
/// outside the symbol counts as part of the first and last light runs.
struct RunHistory {
    size: i32,
    runs: [i32; 7],
}

impl RunHistory {
    fn new(size: i32) -> Self {
        RunHistory { size, runs: [0; 7] }
    }

    fn push(&mut self, mut run_len: i32) {
        if self.runs[0] == 0 {
            run_len += self.size;
        }
        self.runs.copy_within(0..6, 1);
        self.runs[0] = run_len;
    }

    /// 0, 1 or 2 depending on how many sides of a dark 1:1:3:1:1 core
    /// are bordered by a light run of at least four units.
    fn count_patterns(&self) -> i32 {
        let r = &self.runs;
        let n = r[1];
        let core = n > 0 && r[2] == n && r[3] == n * 3 && r[4] == n && r[5] == n;
        i32::from(core && r[0] >= n * 4 && r[6] >= n) + i32::from(core && r[6] >= n * 4 && r[0] >= n)
    }

    fn terminate_and_count(mut self, run_color: bool, mut run_len: i32) -> i32 {
        if run_color {
            self.push(run_len);
            run_len = 0;
        }
        run_len += self.size;
        self.push(run_len);
        self.count_patterns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_predicates_at_origin_and_neighbours() {
        // Every mask flips (0, 0).
        for mask in 0..8 {
            assert!(is_flipped(mask, 0, 0));
        }
        assert!(!is_flipped(0, 1, 0));
        assert!(is_flipped(1, 1, 0));
        assert!(!is_flipped(1, 0, 1));
        assert!(!is_flipped(2, 1, 0));
        assert!(is_flipped(2, 3, 5));
        assert!(!is_flipped(4, 3, 0));
        assert!(is_flipped(4, 3, 2));
    }

    #[test]
    fn line_runs() {
        // One run of 7 light modules: 3 for the first five, 1 for each extra.
        assert_eq!(line_penalty(7, std::iter::repeat(false).take(7)), 5);
        // Alternating colors never make a run.
        assert_eq!(line_penalty(6, (0..6).map(|i| i % 2 == 0)), 0);
    }

    #[test]
    fn finder_like_pattern_is_penalized() {
        // dark 1:1:3:1:1 core with light margins on both sides.
        let line: Vec<bool> = "0000101110100000".chars().map(|c| c == '1').collect();
        let with_pattern = line_penalty(line.len(), line.iter().copied());
        // The two light margins are runs of 4 and 5: only the second one costs N1.
        assert_eq!(with_pattern, PENALTY_N1 + 2 * PENALTY_N3);
    }

    #[test]
    fn balance_and_blocks() {
        // All light 2×2: one block, both rows and columns short, 0% dark.
        let score = penalty_score(2, &[false; 4]);
        assert_eq!(score, PENALTY_N2 + 9 * PENALTY_N4);
        // 3×3 checkerboard: no blocks, no runs, 5 of 9 dark.
        let checker: Vec<bool> = (0..9).map(|i| (i % 3 + i / 3) % 2 == 0).collect();
        assert_eq!(penalty_score(3, &checker), PENALTY_N4);
    }
}
