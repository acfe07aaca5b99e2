use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Chemical elements, discriminant is the atomic number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum ElementType {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
}

const ELEMENTS: [ElementType; 18] = [
    ElementType::H,
    ElementType::He,
    ElementType::Li,
    ElementType::Be,
    ElementType::B,
    ElementType::C,
    ElementType::N,
    ElementType::O,
    ElementType::F,
    ElementType::Ne,
    ElementType::Na,
    ElementType::Mg,
    ElementType::Al,
    ElementType::Si,
    ElementType::P,
    ElementType::S,
    ElementType::Cl,
    ElementType::Ar,
];

impl ElementType {
    pub fn atomic_number(self) -> u32 {
        self as u32
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ElementType::H => "H",
            ElementType::He => "He",
            ElementType::Li => "Li",
            ElementType::Be => "Be",
            ElementType::B => "B",
            ElementType::C => "C",
            ElementType::N => "N",
            ElementType::O => "O",
            ElementType::F => "F",
            ElementType::Ne => "Ne",
            ElementType::Na => "Na",
            ElementType::Mg => "Mg",
            ElementType::Al => "Al",
            ElementType::Si => "Si",
            ElementType::P => "P",
            ElementType::S => "S",
            ElementType::Cl => "Cl",
            ElementType::Ar => "Ar",
        }
    }
}

impl TryFrom<u32> for ElementType {
    type Error = UnknownElement;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ELEMENTS
            .iter()
            .copied()
            .find(|element| element.atomic_number() == value)
            .ok_or_else(|| UnknownElement(value.to_string()))
    }
}

impl FromStr for ElementType {
    type Err = UnknownElement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ELEMENTS
            .iter()
            .copied()
            .find(|element| element.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownElement(s.to_owned()))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownElement(pub String);

impl fmt::Display for UnknownElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown element {:?}", self.0)
    }
}

impl std::error::Error for UnknownElement {}
