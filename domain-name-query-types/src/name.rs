use std::convert::TryFrom;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

// https://datatracker.ietf.org/doc/html/rfc1035#section-2.3.4
pub const MAX_LABEL_LENGTH: usize = 63;
pub const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("empty label in domain name '{0}'")]
    EmptyLabel(String),

    #[error("label longer than 63 octets")]
    LabelTooLong,

    #[error("domain name longer than 255 octets")]
    NameTooLong,

    #[error("dangling escape in domain name '{0}'")]
    DanglingEscape(String),

    #[error("bad decimal escape in domain name '{0}'")]
    BadEscape(String),
}

/// A domain name stored as raw labels, without the root label.
///
/// Comparison and hashing ignore ASCII case, the labels themselves keep
/// the case they were created with so a question can be echoed verbatim.
#[derive(Clone, Debug, Default)]
pub struct Name {
    labels: Vec<Vec<u8>>,
}

impl Name {
    pub fn root() -> Self {
        Self { labels: vec![] }
    }

    pub fn from_labels(labels: Vec<Vec<u8>>) -> Result<Self, NameError> {
        for label in &labels {
            if label.is_empty() {
                return Err(NameError::EmptyLabel(String::from_utf8_lossy(label).to_string()));
            }
            if label.len() > MAX_LABEL_LENGTH {
                return Err(NameError::LabelTooLong);
            }
        }

        let name = Self { labels };
        if name.wire_length() > MAX_NAME_LENGTH {
            return Err(NameError::NameTooLong);
        }

        Ok(name)
    }

    /// Parses presentation format, `\.` and `\\` escape a literal character
    /// inside a label and `\DDD` is a decimal octet. A single trailing dot is
    /// accepted.
    pub fn from_ascii(s: &str) -> Result<Self, NameError> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        let mut labels: Vec<Vec<u8>> = Vec::new();
        let mut current: Vec<u8> = Vec::new();
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| NameError::DanglingEscape(s.to_string()))?;
                    if let Some(first) = escaped.to_digit(10) {
                        let mut value = first;
                        for _ in 0..2 {
                            let digit = chars
                                .next()
                                .and_then(|d| d.to_digit(10))
                                .ok_or_else(|| NameError::BadEscape(s.to_string()))?;
                            value = value * 10 + digit;
                        }
                        let octet = u8::try_from(value).map_err(|_| NameError::BadEscape(s.to_string()))?;
                        current.push(octet);
                    } else {
                        let mut buf = [0u8; 4];
                        current.extend_from_slice(escaped.encode_utf8(&mut buf).as_bytes());
                    }
                }
                '.' => {
                    if current.is_empty() {
                        return Err(NameError::EmptyLabel(s.to_string()));
                    }
                    labels.push(std::mem::take(&mut current));
                }
                _ => {
                    let mut buf = [0u8; 4];
                    current.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }

        if !current.is_empty() {
            labels.push(current);
        }

        Self::from_labels(labels)
    }

    /// Builds `<label>.<self>`, the label may contain dots (mailbox local part).
    pub fn prepend_label(&self, label: &[u8]) -> Result<Self, NameError> {
        let mut labels = Vec::with_capacity(self.labels.len() + 1);
        labels.push(label.to_vec());
        labels.extend(self.labels.iter().cloned());

        Self::from_labels(labels)
    }

    pub fn labels(&self) -> &[Vec<u8>] {
        &self.labels
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Octets used on the wire without compression, root label included.
    pub fn wire_length(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// True when `self` equals `zone` or sits below it.
    pub fn is_subdomain_of(&self, zone: &Name) -> bool {
        if zone.labels.len() > self.labels.len() {
            return false;
        }

        let skip = self.labels.len() - zone.labels.len();
        self.labels[skip..]
            .iter()
            .zip(zone.labels.iter())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(other.labels.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.labels.len().hash(state);
        for label in &self.labels {
            label.to_ascii_lowercase().hash(state);
        }
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ascii(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }

        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            for &b in label {
                match b {
                    b'.' | b'\\' => write!(f, "\\{}", b as char)?,
                    0x21..=0x7e => write!(f, "{}", b as char)?,
                    _ => write!(f, "\\{:03}", b)?,
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let name = Name::from_ascii("blackhole.romulan.zone.").unwrap();
        assert_eq!(name.labels().len(), 3);
        assert_eq!(name.to_string(), "blackhole.romulan.zone");
        assert_eq!(name.wire_length(), 24);
    }

    #[test]
    fn root_name() {
        assert!(Name::from_ascii(".").unwrap().is_root());
        assert!(Name::from_ascii("").unwrap().is_root());
        assert_eq!(Name::root().to_string(), ".");
    }

    #[test]
    fn empty_label_is_rejected() {
        assert!(matches!(Name::from_ascii("a..b"), Err(NameError::EmptyLabel(_))));
        assert!(matches!(Name::from_ascii(".a"), Err(NameError::EmptyLabel(_))));
    }

    #[test]
    fn long_label_is_rejected() {
        let label = "x".repeat(64);
        assert_eq!(Name::from_ascii(&label), Err(NameError::LabelTooLong));
        assert!(Name::from_ascii(&"x".repeat(63)).is_ok());
    }

    #[test]
    fn long_name_is_rejected() {
        let label = "x".repeat(63);
        let s = format!("{0}.{0}.{0}.{0}", label);
        assert_eq!(Name::from_ascii(&s), Err(NameError::NameTooLong));
    }

    #[test]
    fn comparison_ignores_case() {
        let a = Name::from_ascii("BlackHole.Romulan.ZONE").unwrap();
        let b = Name::from_ascii("blackhole.romulan.zone").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "BlackHole.Romulan.ZONE");

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn subdomain() {
        let zone = Name::from_ascii("romulan.zone").unwrap();
        assert!(Name::from_ascii("romulan.zone").unwrap().is_subdomain_of(&zone));
        assert!(Name::from_ascii("a.b.ROMULAN.zone").unwrap().is_subdomain_of(&zone));
        assert!(!Name::from_ascii("notromulan.zone").unwrap().is_subdomain_of(&zone));
        assert!(!Name::from_ascii("zone").unwrap().is_subdomain_of(&zone));
    }

    #[test]
    fn escaped_dot_stays_in_label() {
        let base = Name::from_ascii("romulan.zone").unwrap();
        let mailbox = base.prepend_label(b"first.last").unwrap();
        assert_eq!(mailbox.labels().len(), 3);
        assert_eq!(mailbox.to_string(), "first\\.last.romulan.zone");

        let parsed = Name::from_ascii("first\\.last.romulan.zone").unwrap();
        assert_eq!(parsed, mailbox);
    }

    #[test]
    fn decimal_escape_round_trips() {
        let name = Name::from_labels(vec![b"a b".to_vec(), b"zone".to_vec()]).unwrap();
        assert_eq!(name.to_string(), "a\\032b.zone");

        let parsed = Name::from_ascii(&name.to_string()).unwrap();
        assert_eq!(parsed.labels()[0], b"a b".to_vec());
        assert_eq!(parsed, name);
    }

    #[test]
    fn bad_decimal_escape_is_rejected() {
        assert!(matches!(Name::from_ascii("a\\03"), Err(NameError::BadEscape(_))));
        assert!(matches!(Name::from_ascii("a\\256.zone"), Err(NameError::BadEscape(_))));
    }
}
