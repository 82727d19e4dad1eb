//! Line-oriented helpers for slicing ORCA output. Every function here expects
//! lines that have already been trimmed.

/// A way of recognizing a marker line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker<'a> {
    /// the line ends with the string. ORCA centers its banners, so this
    /// is how banners like `INPUT FILE` are matched
    EndsWith(&'a str),
    Contains(&'a str),
}

impl Marker<'_> {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Marker::EndsWith(s) => line.ends_with(s),
            Marker::Contains(s) => line.contains(s),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

/// Slice `lines` between two markers. `start` is searched for from the bottom
/// of the file, so the most recent section wins, and `end` is searched for
/// forward from there. `None` for `start` means the beginning of the file, and
/// `None` for `end` (or an `end` that never shows up) means the end of it. The
/// offsets are added to the marker positions to skip banner decorations, with
/// the start inclusive and the end exclusive. If `start` is given but never
/// found, the slice is empty.
pub fn cut<'a>(
    lines: &'a [&'a str],
    start: Option<Marker>,
    start_offset: isize,
    end: Option<Marker>,
    end_offset: isize,
) -> &'a [&'a str] {
    let len = lines.len() as isize;
    let i = match start {
        None => 0,
        Some(m) => match lines.iter().rposition(|l| m.matches(l)) {
            Some(i) => i,
            None => return &[],
        },
    };
    let j = end
        .and_then(|m| lines[i..].iter().position(|l| m.matches(l)))
        .map_or(lines.len(), |p| i + p);
    let lo = (i as isize + start_offset).clamp(0, len);
    let hi = (j as isize + end_offset).clamp(lo, len);
    &lines[lo as usize..hi as usize]
}

/// return the first line in `lines` starting with `prefix`, or the last one if
/// `dir` is [Direction::Reverse]
pub fn find<'a>(
    lines: &[&'a str],
    prefix: &str,
    dir: Direction,
    case: Case,
) -> Option<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    let pred = |line: &&&'a str| match case {
        Case::Sensitive => line.starts_with(prefix),
        Case::Insensitive => line.to_lowercase().starts_with(&prefix_lower),
    };
    match dir {
        Direction::Forward => lines.iter().find(pred).copied(),
        Direction::Reverse => lines.iter().rev().find(pred).copied(),
    }
}

/// the `n`th whitespace-separated field of `line`. negative values count from
/// the end, so -1 is the last field
pub fn field(line: &str, n: isize) -> Option<&str> {
    if n >= 0 {
        line.split_whitespace().nth(n as usize)
    } else {
        line.split_whitespace().rev().nth((-n - 1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    const LINES: [&str; 9] = [
        "header", "BEGIN", "a", "b", "END", "BEGIN", "c", "d", "END",
    ];

    #[test]
    fn cut_last_section() {
        let got = cut(
            &LINES,
            Some(Marker::Contains("BEGIN")),
            1,
            Some(Marker::Contains("END")),
            0,
        );
        assert_eq!(got, ["c", "d"]);
    }

    #[test]
    fn cut_no_start() {
        let got = cut(&LINES, None, 0, Some(Marker::EndsWith("END")), 0);
        assert_eq!(got, &LINES[..4]);
    }

    #[test]
    fn cut_no_end() {
        let got = cut(&LINES, Some(Marker::Contains("BEGIN")), 0, None, 0);
        assert_eq!(got, ["BEGIN", "c", "d", "END"]);
    }

    #[test]
    fn cut_missing_start() {
        let got = cut(&LINES, Some(Marker::Contains("nope")), 0, None, 0);
        assert!(got.is_empty());
    }

    #[test]
    fn cut_missing_end() {
        let got = cut(
            &LINES,
            Some(Marker::Contains("BEGIN")),
            1,
            Some(Marker::Contains("nope")),
            0,
        );
        assert_eq!(got, ["c", "d", "END"]);
    }

    #[test]
    fn cut_offsets_clamp() {
        let got = cut(
            &LINES,
            Some(Marker::Contains("header")),
            -5,
            Some(Marker::Contains("BEGIN")),
            20,
        );
        assert_eq!(got, &LINES[..]);
        let got = cut(
            &LINES,
            Some(Marker::Contains("BEGIN")),
            3,
            Some(Marker::Contains("END")),
            -3,
        );
        assert!(got.is_empty());
    }

    #[test_case("%pal", Direction::Forward, Case::Sensitive, Some("%pal nprocs 4 end"))]
    #[test_case("%PAL", Direction::Forward, Case::Sensitive, None)]
    #[test_case("%PAL", Direction::Forward, Case::Insensitive, Some("%pal nprocs 4 end"))]
    #[test_case("!", Direction::Forward, Case::Sensitive, Some("! opt"))]
    #[test_case("!", Direction::Reverse, Case::Sensitive, Some("! freq"))]
    fn finds(
        prefix: &str,
        dir: Direction,
        case: Case,
        want: Option<&str>,
    ) {
        let lines = ["! opt", "%pal nprocs 4 end", "! freq"];
        assert_eq!(find(&lines, prefix, dir, case), want);
    }

    #[test_case(0, Some("Total"))]
    #[test_case(-1, Some("Eh"))]
    #[test_case(-2, Some("-76.24705412"))]
    #[test_case(5, None)]
    #[test_case(-6, None)]
    fn fields(n: isize, want: Option<&str>) {
        let line = "Total enthalpy ... -76.24705412 Eh";
        assert_eq!(field(line, n), want);
    }
}
