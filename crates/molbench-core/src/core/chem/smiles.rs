use phf::phf_set;
use std::collections::HashMap;
use thiserror::Error;

static ELEMENTS: phf::Set<&'static str> = phf_set! {
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga",
    "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd",
    "Ag", "Cd", "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
    "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os",
    "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa",
    "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg",
    "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
};

static AROMATIC_BRACKET: phf::Set<&'static str> = phf_set! {
    "b", "c", "n", "o", "p", "s", "se", "as", "te",
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SmilesError {
    #[error("Empty SMILES string")]
    Empty,
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Unexpected end of SMILES string")]
    UnexpectedEnd,
    #[error("Invalid bracket atom at position {pos}: {reason}")]
    InvalidBracketAtom { pos: usize, reason: &'static str },
    #[error("Bond at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },
    #[error("Unmatched ')' at position {pos}")]
    UnmatchedCloseBranch { pos: usize },
    #[error("Empty branch at position {pos}")]
    EmptyBranch { pos: usize },
    #[error("{count} branch(es) left open")]
    UnclosedBranch { count: usize },
    #[error("Ring closure {ring} is never closed")]
    UnclosedRing { ring: u16 },
    #[error("Ring closure {ring} at position {pos} bonds an atom to itself")]
    RingBondToSelf { ring: u16, pos: usize },
    #[error("Ring closure {ring} at position {pos} has conflicting bond orders")]
    ConflictingRingBond { ring: u16, pos: usize },
    #[error("Atoms {a} and {b} are bonded twice")]
    DuplicateBond { a: usize, b: usize },
    #[error("Atom {index} ('{symbol}') has valence {valence}, allowed at most {max}")]
    ValenceExceeded {
        index: usize,
        symbol: String,
        valence: u8,
        max: u8,
    },
    #[error("Aromatic atom {index} ('{symbol}') is not part of an aromatic system")]
    IsolatedAromaticAtom { index: usize, symbol: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    fn valence_contribution(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }

    fn implicit(left_aromatic: bool, right_aromatic: bool) -> Self {
        if left_aromatic && right_aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmilesAtom {
    pub symbol: String,
    pub aromatic: bool,
    pub bracket: bool,
    pub isotope: Option<u16>,
    pub hydrogens: u8,
    pub charge: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmilesBond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

/// Connectivity recovered from a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSmiles {
    atoms: Vec<SmilesAtom>,
    bonds: Vec<SmilesBond>,
    components: usize,
}

impl ParsedSmiles {
    pub fn atoms(&self) -> &[SmilesAtom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[SmilesBond] {
        &self.bonds
    }

    pub fn num_components(&self) -> usize {
        self.components
    }

    /// Number of independent cycles (cyclomatic number of the molecular graph).
    pub fn ring_count(&self) -> usize {
        (self.bonds.len() + self.components).saturating_sub(self.atoms.len())
    }
}

/// Parses and validates a SMILES string.
pub fn parse(input: &str) -> Result<ParsedSmiles, SmilesError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::Empty);
    }
    let parsed = Parser::new(trimmed).run()?;
    check_valences(&parsed)?;
    Ok(parsed)
}

pub fn is_valid(input: &str) -> bool {
    parse(input).is_ok()
}

/// Normalized form used to compare generated molecules. Returns `None` for invalid input.
///
/// This is a textual normalization (surrounding whitespace removed), not a graph
/// canonicalization: two spellings of the same molecule compare unequal.
pub fn canonicalize(input: &str) -> Option<String> {
    parse(input).ok().map(|_| input.trim().to_string())
}

#[derive(Debug, Clone, Copy)]
struct RingOpening {
    atom: usize,
    bond: Option<BondOrder>,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    atoms: Vec<SmilesAtom>,
    bonds: Vec<SmilesBond>,
    current: Option<usize>,
    pending_bond: Option<(BondOrder, usize)>,
    branches: Vec<(usize, usize, usize)>,
    rings: HashMap<u16, RingOpening>,
    components: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            current: None,
            pending_bond: None,
            branches: Vec::new(),
            rings: HashMap::new(),
            components: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn unexpected(&self, ch: char) -> SmilesError {
        SmilesError::UnexpectedChar { ch, pos: self.pos }
    }

    fn run(mut self) -> Result<ParsedSmiles, SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                '-' | '=' | '#' | '$' | ':' | '/' | '\\' => self.bond(ch)?,
                '(' => self.open_branch()?,
                ')' => self.close_branch()?,
                '.' => self.dot()?,
                '0'..='9' | '%' => self.ring_closure()?,
                '[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom);
                }
                _ => {
                    let atom = self.organic_atom().ok_or_else(|| self.unexpected(ch))?;
                    self.add_atom(atom);
                }
            }
        }

        if let Some((_, pos)) = self.pending_bond {
            return Err(SmilesError::DanglingBond { pos });
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnclosedBranch {
                count: self.branches.len(),
            });
        }
        if let Some(ring) = self.rings.keys().min() {
            return Err(SmilesError::UnclosedRing { ring: *ring });
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }
        if self.current.is_none() {
            return Err(SmilesError::UnexpectedEnd);
        }

        Ok(ParsedSmiles {
            atoms: self.atoms,
            bonds: self.bonds,
            components: self.components,
        })
    }

    fn bond(&mut self, ch: char) -> Result<(), SmilesError> {
        if self.current.is_none() || self.pending_bond.is_some() {
            return Err(self.unexpected(ch));
        }
        let order = match ch {
            '=' => BondOrder::Double,
            '#' => BondOrder::Triple,
            '$' => BondOrder::Quadruple,
            ':' => BondOrder::Aromatic,
            _ => BondOrder::Single,
        };
        self.pending_bond = Some((order, self.pos));
        self.pos += 1;
        Ok(())
    }

    fn open_branch(&mut self) -> Result<(), SmilesError> {
        let opener = self.current.ok_or_else(|| self.unexpected('('))?;
        if let Some((_, pos)) = self.pending_bond {
            return Err(SmilesError::DanglingBond { pos });
        }
        self.branches.push((opener, self.atoms.len(), self.pos));
        self.pos += 1;
        Ok(())
    }

    fn close_branch(&mut self) -> Result<(), SmilesError> {
        let (opener, atoms_at_open, open_pos) = self
            .branches
            .pop()
            .ok_or(SmilesError::UnmatchedCloseBranch { pos: self.pos })?;
        if let Some((_, pos)) = self.pending_bond {
            return Err(SmilesError::DanglingBond { pos });
        }
        if self.atoms.len() == atoms_at_open {
            return Err(SmilesError::EmptyBranch { pos: open_pos });
        }
        self.current = Some(opener);
        self.pos += 1;
        Ok(())
    }

    fn dot(&mut self) -> Result<(), SmilesError> {
        if self.current.is_none() || self.pending_bond.is_some() || !self.branches.is_empty() {
            return Err(self.unexpected('.'));
        }
        self.current = None;
        self.components += 1;
        self.pos += 1;
        Ok(())
    }

    fn ring_closure(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let atom = self
            .current
            .ok_or_else(|| self.unexpected(self.chars[start]))?;
        let ring = if self.chars[start] == '%' {
            match (self.peek_at(1), self.peek_at(2)) {
                (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
                    self.pos += 3;
                    (digit(d1) * 10 + digit(d2)) as u16
                }
                _ => return Err(self.unexpected('%')),
            }
        } else {
            self.pos += 1;
            digit(self.chars[start]) as u16
        };
        let bond = self.pending_bond.take().map(|(order, _)| order);

        match self.rings.remove(&ring) {
            None => {
                self.rings.insert(ring, RingOpening { atom, bond });
            }
            Some(opening) => {
                if opening.atom == atom {
                    return Err(SmilesError::RingBondToSelf { ring, pos: start });
                }
                let order = match (opening.bond, bond) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(SmilesError::ConflictingRingBond { ring, pos: start });
                    }
                    (Some(a), _) | (None, Some(a)) => a,
                    (None, None) => BondOrder::implicit(
                        self.atoms[opening.atom].aromatic,
                        self.atoms[atom].aromatic,
                    ),
                };
                self.push_bond(opening.atom, atom, order)?;
            }
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Option<SmilesAtom> {
        let first = self.peek()?;
        let second = self.peek_at(1);
        let (symbol, aromatic, width) = match (first, second) {
            ('C', Some('l')) => ("Cl", false, 2),
            ('B', Some('r')) => ("Br", false, 2),
            ('B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I', _) => {
                (symbol_str(first), false, 1)
            }
            ('b' | 'c' | 'n' | 'o' | 'p' | 's', _) => (symbol_str(first), true, 1),
            ('*', _) => ("*", false, 1),
            _ => return None,
        };
        self.pos += width;
        Some(SmilesAtom {
            symbol: symbol.to_string(),
            aromatic,
            bracket: false,
            isotope: None,
            hydrogens: 0,
            charge: 0,
        })
    }

    fn bracket_atom(&mut self) -> Result<SmilesAtom, SmilesError> {
        let open = self.pos;
        self.pos += 1;
        let invalid = |reason| SmilesError::InvalidBracketAtom { pos: open, reason };

        let isotope = self.number();
        let isotope = match isotope {
            Some(value) => Some(u16::try_from(value).map_err(|_| invalid("isotope out of range"))?),
            None => None,
        };

        let (symbol, aromatic) = self.bracket_symbol().ok_or_else(|| invalid("unknown element"))?;

        if self.peek() == Some('@') {
            self.pos += 1;
            if self.peek() == Some('@') {
                self.pos += 1;
            } else if let (Some(a), Some(b)) = (self.peek(), self.peek_at(1)) {
                if matches!((a, b), ('T', 'H') | ('A', 'L') | ('S', 'P') | ('T', 'B') | ('O', 'H')) {
                    self.pos += 2;
                    if self.number().is_none() {
                        return Err(invalid("chirality class without index"));
                    }
                }
            }
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some('H') {
            self.pos += 1;
            hydrogens = match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.pos += 1;
                    digit(d) as u8
                }
                _ => 1,
            };
        }

        let mut charge = 0i8;
        if let Some(sign @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let unit: i8 = if sign == '+' { 1 } else { -1 };
            charge = unit;
            if let Some(magnitude) = self.number() {
                if magnitude > 15 {
                    return Err(invalid("charge out of range"));
                }
                charge = unit * magnitude as i8;
            } else {
                while self.peek() == Some(sign) {
                    self.pos += 1;
                    charge = charge.saturating_add(unit);
                }
            }
        }

        if self.peek() == Some(':') {
            self.pos += 1;
            if self.number().is_none() {
                return Err(invalid("atom class without index"));
            }
        }

        match self.peek() {
            Some(']') => {
                self.pos += 1;
            }
            Some(_) => return Err(invalid("unexpected token before ']'")),
            None => return Err(invalid("missing ']'")),
        }

        Ok(SmilesAtom {
            symbol,
            aromatic,
            bracket: true,
            isotope,
            hydrogens,
            charge,
        })
    }

    fn bracket_symbol(&mut self) -> Option<(String, bool)> {
        let first = self.peek()?;
        if first == '*' {
            self.pos += 1;
            return Some(("*".to_string(), false));
        }
        let second = self.peek_at(1).filter(|c| c.is_ascii_lowercase());
        if first.is_ascii_uppercase() {
            if let Some(second) = second {
                let two: String = [first, second].iter().collect();
                if ELEMENTS.contains(two.as_str()) {
                    self.pos += 2;
                    return Some((two, false));
                }
            }
            let one = first.to_string();
            if ELEMENTS.contains(one.as_str()) {
                self.pos += 1;
                return Some((one, false));
            }
            return None;
        }
        if first.is_ascii_lowercase() {
            if let Some(second) = second {
                let two: String = [first, second].iter().collect();
                if AROMATIC_BRACKET.contains(two.as_str()) {
                    self.pos += 2;
                    return Some((two, true));
                }
            }
            let one = first.to_string();
            if AROMATIC_BRACKET.contains(one.as_str()) {
                self.pos += 1;
                return Some((one, true));
            }
        }
        None
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().filter(char::is_ascii_digit) {
            value = value.saturating_mul(10).saturating_add(digit(d));
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn add_atom(&mut self, atom: SmilesAtom) {
        let index = self.atoms.len();
        let aromatic = atom.aromatic;
        self.atoms.push(atom);
        if let Some(prev) = self.current {
            let order = self
                .pending_bond
                .take()
                .map(|(order, _)| order)
                .unwrap_or_else(|| BondOrder::implicit(self.atoms[prev].aromatic, aromatic));
            self.bonds.push(SmilesBond {
                a: prev,
                b: index,
                order,
            });
        }
        self.current = Some(index);
    }

    fn push_bond(&mut self, a: usize, b: usize, order: BondOrder) -> Result<(), SmilesError> {
        let exists = self
            .bonds
            .iter()
            .any(|bond| (bond.a == a && bond.b == b) || (bond.a == b && bond.b == a));
        if exists {
            return Err(SmilesError::DuplicateBond {
                a: a.min(b),
                b: a.max(b),
            });
        }
        self.bonds.push(SmilesBond { a, b, order });
        Ok(())
    }
}

fn digit(c: char) -> u32 {
    c as u32 - '0' as u32
}

fn symbol_str(c: char) -> &'static str {
    match c {
        'B' => "B",
        'C' => "C",
        'N' => "N",
        'O' => "O",
        'P' => "P",
        'S' => "S",
        'F' => "F",
        'I' => "I",
        'b' => "b",
        'c' => "c",
        'n' => "n",
        'o' => "o",
        'p' => "p",
        _ => "s",
    }
}

fn max_default_valence(symbol: &str) -> Option<u8> {
    match symbol.to_ascii_uppercase().as_str() {
        "B" => Some(3),
        "C" => Some(4),
        "N" => Some(5),
        "O" => Some(2),
        "P" => Some(5),
        "S" => Some(6),
        "F" | "CL" | "BR" | "I" => Some(1),
        _ => None,
    }
}

fn check_valences(parsed: &ParsedSmiles) -> Result<(), SmilesError> {
    let n = parsed.atoms.len();
    let mut valence = vec![0u8; n];
    let mut aromatic_neighbors = vec![0usize; n];
    for bond in &parsed.bonds {
        let contribution = bond.order.valence_contribution();
        valence[bond.a] = valence[bond.a].saturating_add(contribution);
        valence[bond.b] = valence[bond.b].saturating_add(contribution);
        if bond.order == BondOrder::Aromatic {
            aromatic_neighbors[bond.a] += 1;
            aromatic_neighbors[bond.b] += 1;
        }
    }

    for (index, atom) in parsed.atoms.iter().enumerate() {
        if atom.aromatic && aromatic_neighbors[index] < 2 {
            return Err(SmilesError::IsolatedAromaticAtom {
                index,
                symbol: atom.symbol.clone(),
            });
        }
        // Only aliphatic organic-subset atoms are held to a default valence.
        if atom.bracket || atom.aromatic {
            continue;
        }
        let Some(max) = max_default_valence(&atom.symbol) else {
            continue;
        };
        let used = valence[index];
        if used > max {
            return Err(SmilesError::ValenceExceeded {
                index,
                symbol: atom.symbol.clone(),
                valence: used,
                max,
            });
        }
    }
    Ok(())
}
