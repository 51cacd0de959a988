//! Charity fund registry and donation call planning.

use crate::domain::error::CharitySwapError;
use alloy_primitives::{Address, U256, address};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Decimals of ether.
pub const ETHER_DECIMALS: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fund {
    /// The Charity contract picks the recipient.
    Random,
    GiveWell,
    WaterProject,
    BestFriends,
    WildfireEmergency,
    FeedTheHungry,
    EaFunds,
}

impl Fund {
    pub const ALL: [Fund; 7] = [
        Fund::Random,
        Fund::GiveWell,
        Fund::WaterProject,
        Fund::BestFriends,
        Fund::WildfireEmergency,
        Fund::FeedTheHungry,
        Fund::EaFunds,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fund::Random => "Random",
            Fund::GiveWell => "GiveWell",
            Fund::WaterProject => "Water Project",
            Fund::BestFriends => "Best Friends",
            Fund::WildfireEmergency => "Wildfire Emergency",
            Fund::FeedTheHungry => "Feed the Hungry",
            Fund::EaFunds => "EA Funds",
        }
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            Fund::Random => None,
            Fund::GiveWell => Some(address!("546d012aa7f54afa701be51406902b2e57c000b7")),
            Fund::WaterProject => Some(address!("7cF2eBb5Ca55A8bd671A020F8BDbAF07f60F26C1")),
            Fund::BestFriends => Some(address!("897fe74d43CDA5003dB8917DFC53eA770D12ef71")),
            Fund::WildfireEmergency => Some(address!("c7D8F5f7bEfF6F69d97AFC3cE01196272E47E9B0")),
            Fund::FeedTheHungry => Some(address!("C61799b2604A2c4b34376BdAD040754031AC5822")),
            Fund::EaFunds => Some(address!("530aCBD13f321984B8a04bdf63Df8749Dba5E8cf")),
        }
    }

    /// Case-insensitive lookup by display name; spaces, dashes and underscores are ignored.
    pub fn from_name(name: &str) -> Result<Fund, CharitySwapError> {
        let wanted = normalize(name);
        Fund::ALL
            .into_iter()
            .find(|f| normalize(f.name()) == wanted)
            .ok_or_else(|| CharitySwapError::UnknownFund(name.trim().to_string()))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for Fund {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fund {
    type Err = CharitySwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fund::from_name(s)
    }
}

/// Fund entry as listed by the CLI and the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundListing {
    pub name: &'static str,
    pub address: Option<Address>,
}

pub fn list_funds() -> Vec<FundListing> {
    Fund::ALL
        .iter()
        .map(|f| FundListing {
            name: f.name(),
            address: f.address(),
        })
        .collect()
}

/// Payable call on the Charity contract that carries a donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationCall {
    Donate { value: U256 },
    DonateTo { recipient: Address, value: U256 },
}

impl DonationCall {
    pub fn for_fund(fund: Fund, value: U256) -> Result<Self, CharitySwapError> {
        if value.is_zero() {
            return Err(CharitySwapError::InvalidAmount {
                value: value.to_string(),
                reason: "donation must be greater than zero".into(),
            });
        }
        Ok(match fund.address() {
            None => DonationCall::Donate { value },
            Some(recipient) => DonationCall::DonateTo { recipient, value },
        })
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            DonationCall::Donate { .. } => "donate",
            DonationCall::DonateTo { .. } => "donateTo",
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            DonationCall::Donate { value } | DonationCall::DonateTo { value, .. } => *value,
        }
    }
}

impl fmt::Display for DonationCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DonationCall::Donate { value } => write!(f, "donate() value={value} wei"),
            DonationCall::DonateTo { recipient, value } => {
                write!(f, "donateTo({recipient}) value={value} wei")
            }
        }
    }
}

/// Parse a decimal ether amount (`"0.5"`, `"1,25"`) into wei.
pub fn parse_ether(input: &str) -> Result<U256, CharitySwapError> {
    let cleaned = input.trim().replace(',', ".");
    let invalid = |reason: &str| CharitySwapError::InvalidAmount {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let (whole, frac) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected a decimal number"));
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(invalid("more than 18 fractional digits"));
    }

    let digits = format!("{whole}{frac:0<width$}", width = ETHER_DECIMALS);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| invalid("amount out of range"))
}
