//! Derivation path parsing
//!
//! Grammar: `m` or `M`, followed by zero or more `/`-separated segments of the
//! form `\d+'?`. A trailing `'` marks the segment as hardened.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The hardened flag in a raw BIP-32 child index
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// One step of a derivation path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildNumber {
    index: u32,
    hardened: bool,
}

impl ChildNumber {
    /// Create a child number; `index` must be below 2^31
    pub fn new(index: u32, hardened: bool) -> Result<Self> {
        if index >= HARDENED_BIT {
            return Err(Error::InvalidIndex(index));
        }
        Ok(Self { index, hardened })
    }

    /// Create a non-hardened child number
    pub fn normal(index: u32) -> Result<Self> {
        Self::new(index, false)
    }

    /// Create a hardened child number
    pub fn hardened(index: u32) -> Result<Self> {
        Self::new(index, true)
    }

    /// Split a raw 32-bit index into index and hardened flag
    pub fn from_raw(raw: u32) -> Self {
        Self {
            index: raw & !HARDENED_BIT,
            hardened: raw & HARDENED_BIT != 0,
        }
    }

    /// The index without the hardened flag
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The raw 32-bit index with the hardened flag applied
    pub fn to_raw(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_BIT
        } else {
            self.index
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    fn from_str(segment: &str) -> Result<Self> {
        let malformed = || Error::MalformedPath {
            segment: segment.to_string(),
        };

        let (digits, hardened) = match segment.strip_suffix('\'') {
            Some(digits) => (digits, true),
            None => (segment, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        // All digits, so a parse failure can only mean overflow.
        let index: u32 = digits.parse().map_err(|_| Error::IndexOutOfRange {
            segment: segment.to_string(),
        })?;
        if index >= HARDENED_BIT {
            return Err(Error::IndexOutOfRange {
                segment: segment.to_string(),
            });
        }

        Ok(Self { index, hardened })
    }
}

/// An ordered sequence of child numbers from the master key
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    children: Vec<ChildNumber>,
}

impl DerivationPath {
    /// The empty path, addressing the master key itself
    pub fn master() -> Self {
        Self::default()
    }

    /// Parse a textual path such as `m/44'/60'/0'/0/0`
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = text.trim().split('/');

        match segments.next().unwrap_or_default() {
            "m" | "M" => {}
            root => {
                return Err(Error::MalformedPath {
                    segment: root.to_string(),
                })
            }
        }

        let children = segments
            .map(ChildNumber::from_str)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { children })
    }

    /// The BIP-44 path `m/44'/coin'/account'/change/index`
    pub fn bip44(coin_type: u32, account: u32, change: u32, index: u32) -> Result<Self> {
        Ok(Self {
            children: vec![
                ChildNumber::hardened(44)?,
                ChildNumber::hardened(coin_type)?,
                ChildNumber::hardened(account)?,
                ChildNumber::normal(change)?,
                ChildNumber::normal(index)?,
            ],
        })
    }

    /// Extend this path by one child
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut children = self.children.clone();
        children.push(child);
        Self { children }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChildNumber> {
        self.children.iter()
    }

    pub fn as_slice(&self) -> &[ChildNumber] {
        &self.children
    }

    /// Number of segments, which equals the depth of the derived key
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(children: Vec<ChildNumber>) -> Self {
        Self { children }
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildNumber;
    type IntoIter = std::slice::Iter<'a, ChildNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for child in &self.children {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}
