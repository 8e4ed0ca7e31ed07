use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

pub const UNKNOWN_PROTOCOL: &str = "unknown";

pub type ProtocolNumber = u8;

// IANA Assigned Internet Protocol Numbers
// https://www.iana.org/assignments/protocol-numbers
#[derive(Clone, Debug, EnumIter, PartialEq)]
pub enum IanaProtocol {
    Icmp,
    Tcp,
    Udp,
}

impl IanaProtocol {
    pub fn number(&self) -> ProtocolNumber {
        match self {
            Self::Icmp => 1,
            Self::Tcp => 6,
            Self::Udp => 17,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Icmp => "icmp",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl TryFrom<ProtocolNumber> for IanaProtocol {
    type Error = ();

    fn try_from(value: ProtocolNumber) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|protocol| protocol.number() == value)
            .ok_or(())
    }
}

/// Protocol number to protocol name mapping. <br>
/// Built once before parsing and only read afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ProtocolRegistry {
    names: HashMap<ProtocolNumber, String>,
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        let names = IanaProtocol::iter()
            .map(|protocol| (protocol.number(), protocol.name().to_string()))
            .collect();

        Self { names }
    }
}

impl ProtocolRegistry {
    pub fn empty() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Adds or overrides a name. Names are stored lowercase, as lookup keys are.
    pub fn with(mut self, number: ProtocolNumber, name: &str) -> Self {
        self.names.insert(number, name.trim().to_lowercase());
        self
    }

    /// Total: numbers outside the registry, including ones that
    /// can't be an IP protocol number at all, resolve to `unknown`.
    pub fn name(&self, number: i64) -> &str {
        ProtocolNumber::try_from(number)
            .ok()
            .and_then(|number| self.names.get(&number))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PROTOCOL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
