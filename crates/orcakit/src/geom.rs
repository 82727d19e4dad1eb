use std::{fmt::Display, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    /// NaN when the field isn't a number. only the symbol matters for
    /// [Xyz::row_counts]
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Atom {
    pub fn new(symbol: &str, x: f64, y: f64, z: f64) -> Self {
        Self {
            symbol: symbol.to_owned(),
            x,
            y,
            z,
        }
    }

    /// the periodic table row of `self`
    pub fn row(&self) -> Row {
        Row::of(&self.symbol)
    }
}

/// An XYZ geometry. The first line holds the atom count and the second line is
/// a free-form comment. Every later line with exactly four fields is an atom,
/// even when its coordinates aren't numbers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub comment: String,
    pub atoms: Vec<Atom>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum GeomError {
    ReadFileError(String, std::io::ErrorKind),
}

impl Display for GeomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeomError::ReadFileError(file, kind) => {
                write!(f, "failed to read {file}: {kind}")
            }
        }
    }
}

impl std::error::Error for GeomError {}

/// parse a coordinate, accepting Fortran-style `D` exponents
fn coordinate(field: &str) -> Option<f64> {
    field
        .parse()
        .ok()
        .or_else(|| field.replace(['D', 'd'], "E").parse().ok())
}

impl FromStr for Xyz {
    type Err = GeomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();
        // atom count. not trusted, the atoms are counted as they are read
        lines.next();
        let comment = lines.next().unwrap_or("").trim().to_owned();
        let mut atoms = Vec::new();
        for (i, line) in lines.enumerate() {
            let fields: Vec<_> = line.split_whitespace().collect();
            let [symbol, x, y, z] = fields[..] else {
                continue;
            };
            let [x, y, z] =
                [x, y, z].map(|c| coordinate(c).unwrap_or(f64::NAN));
            if [x, y, z].iter().any(|c| c.is_nan()) {
                log::debug!("non-numeric coordinates on line {}", i + 3);
            }
            atoms.push(Atom::new(symbol, x, y, z));
        }
        Ok(Self { comment, atoms })
    }
}

impl Display for Xyz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.atoms.len())?;
        writeln!(f, "{}", self.comment)?;
        for atom in &self.atoms {
            writeln!(
                f,
                "{:5}{:15.10}{:15.10}{:15.10}",
                atom.symbol, atom.x, atom.y, atom.z,
            )?;
        }
        Ok(())
    }
}

impl Xyz {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeomError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GeomError::ReadFileError(path.display().to_string(), e.kind())
        })?;
        contents.parse()
    }

    /// the number of atoms in each periodic table row, indexed by
    /// [Row::index]
    pub fn row_counts(&self) -> [usize; 6] {
        let mut ret = [0; 6];
        for atom in &self.atoms {
            ret[atom.row().index()] += 1;
        }
        ret
    }
}

/// Rows of the periodic table. Rows 6 and 7 share a bucket with anything that
/// isn't recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Row {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Heavy,
}

const FIRST: [&str; 2] = ["H", "He"];
const SECOND: [&str; 8] = ["Li", "Be", "B", "C", "N", "O", "F", "Ne"];
const THIRD: [&str; 8] = ["Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar"];
#[rustfmt::skip]
const FOURTH: [&str; 18] = [
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga",
    "Ge", "As", "Se", "Br", "Kr",
];
#[rustfmt::skip]
const FIFTH: [&str; 18] = [
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe",
];

impl Row {
    pub fn of(symbol: &str) -> Self {
        if FIRST.contains(&symbol) {
            Row::First
        } else if SECOND.contains(&symbol) {
            Row::Second
        } else if THIRD.contains(&symbol) {
            Row::Third
        } else if FOURTH.contains(&symbol) {
            Row::Fourth
        } else if FIFTH.contains(&symbol) {
            Row::Fifth
        } else {
            Row::Heavy
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}
